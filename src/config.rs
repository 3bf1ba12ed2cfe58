//! Analytics configuration
//!
//! Settings are read from an optional TOML file. Every key has a default, so an
//! empty file (or no file) yields the reference dashboard behaviour.

use crate::error::AnalyticsError;
use crate::types::Severity;
use chrono::{FixedOffset, Offset, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default effectiveness threshold for a successful intervention
pub const DEFAULT_SUCCESS_THRESHOLD: f64 = 0.3;

/// Default number of intervention sessions fed to the timeline
pub const DEFAULT_TIMELINE_LIMIT: usize = 20;

/// Default number of sessions fed to the stress trend
pub const DEFAULT_TREND_LIMIT: usize = 10;

/// Default number of rows in the sessions table
pub const DEFAULT_TABLE_LIMIT: usize = 50;

const MAX_OFFSET_MINUTES: i32 = 24 * 60;

/// Severity assigned to intervention labels that contain no severity keyword
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnmatchedSeverity {
    #[default]
    Mild,
    Moderate,
    High,
    /// Leave unmatched labels out of the timeline
    Skip,
}

impl UnmatchedSeverity {
    pub fn severity(&self) -> Option<Severity> {
        match self {
            UnmatchedSeverity::Mild => Some(Severity::Mild),
            UnmatchedSeverity::Moderate => Some(Severity::Moderate),
            UnmatchedSeverity::High => Some(Severity::High),
            UnmatchedSeverity::Skip => None,
        }
    }
}

/// Root configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsConfig {
    /// Effectiveness above this counts as a successful intervention (0-1)
    #[serde(default = "default_success_threshold")]
    pub success_threshold: f64,

    /// Offset from UTC defining local time for weekday/hour/date bucketing
    #[serde(default)]
    pub utc_offset_minutes: i32,

    #[serde(default)]
    pub unmatched_severity: UnmatchedSeverity,

    #[serde(default = "default_timeline_limit")]
    pub timeline_limit: usize,

    #[serde(default = "default_trend_limit")]
    pub trend_limit: usize,

    #[serde(default = "default_table_limit")]
    pub table_limit: usize,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            success_threshold: default_success_threshold(),
            utc_offset_minutes: 0,
            unmatched_severity: UnmatchedSeverity::default(),
            timeline_limit: default_timeline_limit(),
            trend_limit: default_trend_limit(),
            table_limit: default_table_limit(),
        }
    }
}

fn default_success_threshold() -> f64 {
    DEFAULT_SUCCESS_THRESHOLD
}

fn default_timeline_limit() -> usize {
    DEFAULT_TIMELINE_LIMIT
}

fn default_trend_limit() -> usize {
    DEFAULT_TREND_LIMIT
}

fn default_table_limit() -> usize {
    DEFAULT_TABLE_LIMIT
}

impl AnalyticsConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self, AnalyticsError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            AnalyticsError::ConfigError(format!("Cannot read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string
    pub fn from_toml_str(content: &str) -> Result<Self, AnalyticsError> {
        let config: AnalyticsConfig = toml::from_str(content)
            .map_err(|e| AnalyticsError::ConfigError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to TOML
    pub fn to_toml_string(&self) -> Result<String, AnalyticsError> {
        toml::to_string_pretty(self).map_err(|e| AnalyticsError::ConfigError(e.to_string()))
    }

    /// Check value ranges
    pub fn validate(&self) -> Result<(), AnalyticsError> {
        if !(0.0..=1.0).contains(&self.success_threshold) {
            return Err(AnalyticsError::ConfigError(format!(
                "success_threshold must be within [0, 1], got {}",
                self.success_threshold
            )));
        }
        if self.utc_offset_minutes.unsigned_abs() >= MAX_OFFSET_MINUTES.unsigned_abs() {
            return Err(AnalyticsError::ConfigError(format!(
                "utc_offset_minutes must be within ±{}, got {}",
                MAX_OFFSET_MINUTES - 1,
                self.utc_offset_minutes
            )));
        }
        Ok(())
    }

    /// Local offset used for time bucketing
    pub fn offset(&self) -> FixedOffset {
        self.utc_offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .unwrap_or_else(|| Utc.fix())
    }
}
