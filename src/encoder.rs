//! Report encoding
//!
//! Wraps a [`DashboardReport`] in an envelope carrying producer and provenance
//! metadata, then serializes it to JSON.

use crate::error::AnalyticsError;
use crate::schema::SESSIONS_TABLE;
use crate::types::DashboardReport;
use crate::{PRODUCER_NAME, ZEN_VERSION};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Current report envelope version
pub const REPORT_VERSION: &str = "1.0.0";

/// Who produced a report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportProducer {
    pub name: String,
    pub version: String,
    pub instance_id: String,
}

/// Where a report's data came from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportProvenance {
    pub source_table: String,
    pub session_count: usize,
    pub computed_at_utc: String,
}

/// Report plus metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportEnvelope {
    pub report_version: String,
    pub producer: ReportProducer,
    pub provenance: ReportProvenance,
    pub report: DashboardReport,
}

/// Encoder for dashboard reports
pub struct ReportEncoder {
    instance_id: String,
}

impl Default for ReportEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportEncoder {
    /// Create a new encoder with a unique instance ID
    pub fn new() -> Self {
        Self {
            instance_id: Uuid::new_v4().to_string(),
        }
    }

    /// Create an encoder with a specific instance ID
    pub fn with_instance_id(instance_id: String) -> Self {
        Self { instance_id }
    }

    pub fn instance_id(&self) -> &str {
        &self.instance_id
    }

    pub fn encode(&self, report: &DashboardReport) -> ReportEnvelope {
        ReportEnvelope {
            report_version: REPORT_VERSION.to_string(),
            producer: ReportProducer {
                name: PRODUCER_NAME.to_string(),
                version: ZEN_VERSION.to_string(),
                instance_id: self.instance_id.clone(),
            },
            provenance: ReportProvenance {
                source_table: SESSIONS_TABLE.to_string(),
                session_count: report.summary.total_sessions,
                computed_at_utc: Utc::now().to_rfc3339(),
            },
            report: report.clone(),
        }
    }

    /// Encode to a pretty-printed JSON string
    pub fn encode_to_json(&self, report: &DashboardReport) -> Result<String, AnalyticsError> {
        let envelope = self.encode(report);
        serde_json::to_string_pretty(&envelope).map_err(AnalyticsError::JsonError)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AnalyticsConfig;
    use crate::pipeline::build_report;
    use crate::types::Session;
    use chrono::TimeZone;

    #[test]
    fn test_envelope_metadata() {
        let ts = Utc.with_ymd_and_hms(2024, 1, 15, 9, 0, 0).unwrap();
        let sessions = vec![Session::new("s1", "u1", ts, 0.4), Session::new("s2", "u1", ts, 0.6)];
        let report = build_report(&sessions, &AnalyticsConfig::default());

        let encoder = ReportEncoder::with_instance_id("test-instance".to_string());
        let envelope = encoder.encode(&report);

        assert_eq!(envelope.report_version, REPORT_VERSION);
        assert_eq!(envelope.producer.name, PRODUCER_NAME);
        assert_eq!(envelope.producer.instance_id, "test-instance");
        assert_eq!(envelope.provenance.source_table, "sessions");
        assert_eq!(envelope.provenance.session_count, 2);
        assert_eq!(envelope.report, report);
    }

    #[test]
    fn test_encode_to_json() {
        let report = build_report(&[], &AnalyticsConfig::default());
        let json = ReportEncoder::new().encode_to_json(&report).unwrap();

        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["producer"]["name"], "zen-analytics");
        assert_eq!(parsed["report"]["summary"]["total_sessions"], 0);
        assert_eq!(parsed["report"]["stress_by_weekday"].as_array().unwrap().len(), 7);
        assert!(parsed["report"]["latest_stress"].is_null());
    }
}
