//! Session and view export
//!
//! CSV output uses the `sessions` column names as header. Absent values are
//! written as empty fields and fields containing a delimiter, quote or line
//! break are quoted.

use crate::error::AnalyticsError;
use crate::schema::SESSION_COLUMNS;
use crate::types::Session;
use serde::Serialize;
use tracing::debug;

/// Export format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Json,
}

/// Export sessions in the given format
pub fn export_sessions(sessions: &[Session], format: ExportFormat) -> Result<String, AnalyticsError> {
    match format {
        ExportFormat::Csv => sessions_to_csv(sessions),
        ExportFormat::Json => sessions_to_json(sessions),
    }
}

/// Sessions as CSV, one row per session in input order
pub fn sessions_to_csv(sessions: &[Session]) -> Result<String, AnalyticsError> {
    if sessions.is_empty() {
        return Err(AnalyticsError::ExportError("No data to export".to_string()));
    }

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(SESSION_COLUMNS).map_err(csv_error)?;

    for session in sessions {
        writer
            .write_record([
                session.session_id.clone(),
                session.user_id.clone(),
                session.timestamp.to_rfc3339(),
                session.stress_score.to_string(),
                session.language.clone().unwrap_or_default(),
                session.intervention.clone().unwrap_or_default(),
                session
                    .effectiveness
                    .map(|e| e.to_string())
                    .unwrap_or_default(),
            ])
            .map_err(csv_error)?;
    }

    debug!(rows = sessions.len(), "exported sessions as csv");
    finish(writer)
}

/// Sessions as a pretty-printed JSON array
pub fn sessions_to_json(sessions: &[Session]) -> Result<String, AnalyticsError> {
    if sessions.is_empty() {
        return Err(AnalyticsError::ExportError("No data to export".to_string()));
    }
    Ok(serde_json::to_string_pretty(sessions)?)
}

/// Any flat view (rows of scalar fields) as CSV with a header from the field names
pub fn view_to_csv<T: Serialize>(rows: &[T]) -> Result<String, AnalyticsError> {
    if rows.is_empty() {
        return Err(AnalyticsError::ExportError("No data to export".to_string()));
    }

    let mut writer = csv::Writer::from_writer(Vec::new());
    for row in rows {
        writer.serialize(row).map_err(csv_error)?;
    }
    finish(writer)
}

fn finish(writer: csv::Writer<Vec<u8>>) -> Result<String, AnalyticsError> {
    let bytes = writer
        .into_inner()
        .map_err(|e| AnalyticsError::ExportError(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| AnalyticsError::ExportError(e.to_string()))
}

fn csv_error(e: csv::Error) -> AnalyticsError {
    AnalyticsError::ExportError(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::stress_distribution;
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;

    fn make_session(id: &str) -> Session {
        let ts = Utc.with_ymd_and_hms(2024, 1, 15, 9, 30, 0).unwrap();
        Session::new(id, "user-1", ts, 0.42)
    }

    #[test]
    fn test_csv_header_and_absent_fields() {
        let csv = sessions_to_csv(&[make_session("s1")]).unwrap();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(
            lines[0],
            "session_id,user_id,timestamp,stress_score,language,intervention,effectiveness"
        );
        assert_eq!(lines[1], "s1,user-1,2024-01-15T09:30:00+00:00,0.42,,,");
    }

    #[test]
    fn test_csv_quotes_commas() {
        let session = make_session("s1")
            .with_language("en")
            .with_intervention("Breathing, then music")
            .with_effectiveness(0.25);
        let csv = sessions_to_csv(&[session]).unwrap();

        assert!(csv.contains(",en,\"Breathing, then music\",0.25"));
    }

    #[test]
    fn test_empty_export_is_an_error() {
        assert!(matches!(
            sessions_to_csv(&[]),
            Err(AnalyticsError::ExportError(_))
        ));
        assert!(sessions_to_json(&[]).is_err());
    }

    #[test]
    fn test_json_is_pretty() {
        let json = export_sessions(&[make_session("s1")], ExportFormat::Json).unwrap();
        assert!(json.starts_with("[\n  {"));

        let parsed: Vec<Session> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, vec![make_session("s1")]);
    }

    #[test]
    fn test_view_to_csv() {
        let bins = stress_distribution(&[make_session("s1")]);
        let csv = view_to_csv(&bins).unwrap();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines[0], "range,count");
        assert_eq!(lines[1], "very_low,0");
        assert_eq!(lines[3], "medium,1");
        assert_eq!(lines.len(), 6);
    }
}
