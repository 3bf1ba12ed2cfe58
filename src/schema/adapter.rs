//! Adapter for converting `sessions` rows into validated sessions
//!
//! Handles the two input encodings the CLI and FFI accept (JSON array and
//! NDJSON) and the strict / lenient conversion policies.

use crate::error::AnalyticsError;
use crate::schema::record::{SessionRecord, ValidationError};
use crate::types::Session;
use tracing::{debug, warn};

/// Adapter for converting raw rows to sessions
pub struct RecordAdapter;

impl RecordAdapter {
    /// Parse a JSON string containing an array of rows
    pub fn parse_array(json: &str) -> Result<Vec<SessionRecord>, AnalyticsError> {
        let records: Vec<SessionRecord> = serde_json::from_str(json)?;
        Ok(records)
    }

    /// Parse NDJSON (newline-delimited JSON) containing rows
    pub fn parse_ndjson(ndjson: &str) -> Result<Vec<SessionRecord>, AnalyticsError> {
        let mut records = Vec::new();
        for (line_num, line) in ndjson.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            match serde_json::from_str::<SessionRecord>(trimmed) {
                Ok(record) => records.push(record),
                Err(e) => {
                    return Err(AnalyticsError::ParseError(format!(
                        "Failed to parse line {}: {}",
                        line_num + 1,
                        e
                    )));
                }
            }
        }
        Ok(records)
    }

    /// Convert rows to sessions, failing on the first malformed row
    pub fn to_sessions(records: Vec<SessionRecord>) -> Result<Vec<Session>, AnalyticsError> {
        let mut sessions = Vec::with_capacity(records.len());
        for (index, record) in records.into_iter().enumerate() {
            let session_id = record.session_id.clone();
            let session = record.into_session().map_err(|e| {
                AnalyticsError::ParseError(format!(
                    "Invalid record {} (index {}): {}",
                    session_id, index, e
                ))
            })?;
            sessions.push(session);
        }
        debug!(count = sessions.len(), "converted session records");
        Ok(sessions)
    }

    /// Convert rows to sessions, skipping malformed rows.
    ///
    /// Returns the valid sessions together with a report of every rejected row.
    pub fn to_sessions_lenient(records: Vec<SessionRecord>) -> (Vec<Session>, Vec<ValidationResult>) {
        let mut sessions = Vec::with_capacity(records.len());
        let mut rejected = Vec::new();

        for (index, record) in records.into_iter().enumerate() {
            let session_id = record.session_id.clone();
            match record.into_session() {
                Ok(session) => sessions.push(session),
                Err(error) => {
                    warn!(%session_id, index, %error, "skipping invalid session record");
                    rejected.push(ValidationResult {
                        index,
                        session_id,
                        error,
                    });
                }
            }
        }

        (sessions, rejected)
    }

    /// Validate a batch of rows, returning only the failures
    pub fn validate_records(records: &[SessionRecord]) -> Vec<ValidationResult> {
        records
            .iter()
            .enumerate()
            .filter_map(|(index, record)| {
                record.validate().err().map(|error| ValidationResult {
                    index,
                    session_id: record.session_id.clone(),
                    error,
                })
            })
            .collect()
    }
}

/// A rejected row
#[derive(Debug, Clone)]
pub struct ValidationResult {
    pub index: usize,
    pub session_id: String,
    pub error: ValidationError,
}
