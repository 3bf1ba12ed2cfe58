//! Zen Analytics - session aggregation engine for voice-derived stress assessments
//!
//! Zen turns the collection of recorded stress sessions into every view the
//! dashboard shows: summary statistics, per-intervention and per-language
//! groupings, weekday / period-of-day / calendar-date buckets, a stress
//! histogram, before/after comparisons and outcome tiers.
//!
//! ## Modules
//!
//! - **Analytics**: pure, stateless aggregations over validated sessions
//! - **Schema**: `sessions` row parsing and validation
//! - **Pipeline**: full report in one call, plus a processor that keeps the
//!   latest report in step with a session source
//! - **Export / FFI / CLI**: CSV and JSON output, C bindings, the `zen` tool

pub mod analytics;
pub mod config;
pub mod encoder;
pub mod error;
pub mod estimator;
pub mod export;
pub mod pipeline;
pub mod query;
pub mod schema;
pub mod source;
pub mod types;

// FFI bindings for C interop (always available for cdylib/staticlib builds)
pub mod ffi;

pub use config::AnalyticsConfig;
pub use encoder::ReportEncoder;
pub use error::AnalyticsError;
pub use pipeline::{build_report, report_from_json, DashboardProcessor};
pub use query::{SessionQuery, SortOrder};
pub use source::{ChangeEvent, ChangeFeed, MemorySource, SessionSource};
pub use types::{DashboardReport, Session};

// Schema exports
pub use schema::{RecordAdapter, SessionRecord, ValidationError, SESSION_COLUMNS};

/// Library version embedded in every report
pub const ZEN_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name for reports
pub const PRODUCER_NAME: &str = "zen-analytics";
