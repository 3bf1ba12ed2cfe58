//! `sessions` row schema
//!
//! Rows arrive with every column nullable. Validation turns a row into a
//! [`Session`], rejecting rows that lack the fields every aggregate needs
//! (`timestamp`, `stress_score`) and keeping absent optional columns absent.

use crate::types::Session;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Logical table the records are read from
pub const SESSIONS_TABLE: &str = "sessions";

/// Column names in schema order
pub const SESSION_COLUMNS: [&str; 7] = [
    "session_id",
    "user_id",
    "timestamp",
    "stress_score",
    "language",
    "intervention",
    "effectiveness",
];

/// Raw `sessions` row as delivered by the data source
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub session_id: String,
    pub user_id: String,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub stress_score: Option<f64>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub intervention: Option<String>,
    #[serde(default)]
    pub effectiveness: Option<f64>,
}

impl SessionRecord {
    /// Validate the record schema
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.timestamp.is_none() {
            return Err(ValidationError::MissingField {
                field: "timestamp".to_string(),
            });
        }

        match self.stress_score {
            None => {
                return Err(ValidationError::MissingField {
                    field: "stress_score".to_string(),
                })
            }
            Some(score) => check_fraction("stress_score", score)?,
        }

        if let Some(effectiveness) = self.effectiveness {
            check_fraction("effectiveness", effectiveness)?;
        }

        Ok(())
    }

    /// Validate and convert into a [`Session`]
    pub fn into_session(self) -> Result<Session, ValidationError> {
        self.validate()?;

        let (Some(timestamp), Some(stress_score)) = (self.timestamp, self.stress_score) else {
            // validate() has already rejected both cases
            return Err(ValidationError::MissingField {
                field: "timestamp".to_string(),
            });
        };

        Ok(Session {
            session_id: self.session_id,
            user_id: self.user_id,
            timestamp,
            stress_score,
            language: self.language,
            intervention: self.intervention,
            effectiveness: self.effectiveness,
        })
    }
}

impl From<Session> for SessionRecord {
    fn from(session: Session) -> Self {
        SessionRecord {
            session_id: session.session_id,
            user_id: session.user_id,
            timestamp: Some(session.timestamp),
            stress_score: Some(session.stress_score),
            language: session.language,
            intervention: session.intervention,
            effectiveness: session.effectiveness,
        }
    }
}

fn check_fraction(field: &str, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::NotFinite {
            field: field.to_string(),
        });
    }
    if !(0.0..=1.0).contains(&value) {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            value,
        });
    }
    Ok(())
}

/// Validation errors for session records
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("Missing required field: {field}")]
    MissingField { field: String },

    #[error("Field {field} out of range [0, 1]: {value}")]
    OutOfRange { field: String, value: f64 },

    #[error("Field {field} is not a finite number")]
    NotFinite { field: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_record() -> SessionRecord {
        SessionRecord {
            session_id: "session_1705311000000".to_string(),
            user_id: "user-1".to_string(),
            timestamp: Some("2024-01-15T09:30:00Z".parse().unwrap()),
            stress_score: Some(0.62),
            language: Some("kn".to_string()),
            intervention: Some("Breathing Exercise".to_string()),
            effectiveness: Some(0.35),
        }
    }

    #[test]
    fn test_deserialize_row_with_nulls() {
        let json = r#"{
            "session_id": "s-1",
            "user_id": "u-1",
            "timestamp": "2024-01-15T08:30:00Z",
            "stress_score": 0.4,
            "language": null,
            "intervention": null,
            "effectiveness": null
        }"#;

        let record: SessionRecord = serde_json::from_str(json).unwrap();
        assert!(record.validate().is_ok());

        let session = record.into_session().unwrap();
        assert_eq!(session.language, None);
        assert_eq!(session.intervention, None);
        assert_eq!(session.effectiveness, None);
    }

    #[test]
    fn test_deserialize_row_with_missing_optional_columns() {
        let json = r#"{"session_id":"s-2","user_id":"u-1","timestamp":"2024-01-15T08:30:00Z","stress_score":0.4}"#;
        let record: SessionRecord = serde_json::from_str(json).unwrap();
        assert!(record.into_session().is_ok());
    }

    #[test]
    fn test_missing_timestamp_rejected() {
        let record = SessionRecord {
            timestamp: None,
            ..valid_record()
        };
        assert_eq!(
            record.validate(),
            Err(ValidationError::MissingField {
                field: "timestamp".to_string()
            })
        );
    }

    #[test]
    fn test_missing_stress_score_rejected() {
        let record = SessionRecord {
            stress_score: None,
            ..valid_record()
        };
        assert!(matches!(
            record.into_session(),
            Err(ValidationError::MissingField { field }) if field == "stress_score"
        ));
    }

    #[test]
    fn test_out_of_range_values_rejected() {
        let record = SessionRecord {
            stress_score: Some(1.2),
            ..valid_record()
        };
        assert!(matches!(
            record.validate(),
            Err(ValidationError::OutOfRange { .. })
        ));

        let record = SessionRecord {
            effectiveness: Some(f64::NAN),
            ..valid_record()
        };
        assert!(matches!(
            record.validate(),
            Err(ValidationError::NotFinite { .. })
        ));
    }

    #[test]
    fn test_effectiveness_without_intervention_is_valid() {
        let record = SessionRecord {
            intervention: None,
            ..valid_record()
        };
        let session = record.into_session().unwrap();
        assert_eq!(session.intervention_key(), "unknown");
        assert_eq!(session.effectiveness, Some(0.35));
    }

    #[test]
    fn test_session_round_trips_to_record() {
        let session = valid_record().into_session().unwrap();
        let record = SessionRecord::from(session.clone());
        assert_eq!(record.into_session().unwrap(), session);
    }
}
