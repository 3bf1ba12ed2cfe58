//! Pipeline orchestration
//!
//! This module provides the public API for Zen Analytics. [`build_report`]
//! computes every dashboard view from one session collection; the
//! [`DashboardProcessor`] keeps the latest report in step with a
//! [`SessionSource`] as change notifications arrive.

use crate::analytics::{
    before_after_by_intervention, effectiveness_by_intervention, intervention_timeline,
    language_distribution, latest_stress, stress_by_date, stress_by_period, stress_by_weekday,
    stress_distribution, stress_trend, summarize, tier_breakdown,
};
use crate::analytics::temporal::distinct_users;
use crate::config::AnalyticsConfig;
use crate::encoder::ReportEncoder;
use crate::error::AnalyticsError;
use crate::query::{sessions_table, SessionQuery};
use crate::schema::RecordAdapter;
use crate::source::{ChangeEvent, SessionSource};
use crate::types::{DashboardReport, Session};
use tracing::{debug, info, warn};

/// Compute every dashboard view from one session collection.
///
/// The before/after comparison only sees sessions carrying both an
/// intervention and a measured effectiveness, matching the query the
/// dashboard issues for that chart.
///
/// # Example
/// ```ignore
/// let report = build_report(&sessions, &AnalyticsConfig::default());
/// println!("{}", report.summary.success_rate);
/// ```
pub fn build_report(sessions: &[Session], config: &AnalyticsConfig) -> DashboardReport {
    let offset = config.offset();
    let compared = SessionQuery::all()
        .with_intervention()
        .with_effectiveness()
        .apply(sessions);

    debug!(sessions = sessions.len(), compared = compared.len(), "building dashboard report");

    DashboardReport {
        summary: summarize(sessions, config.success_threshold),
        latest_stress: latest_stress(sessions),
        stress_trend: stress_trend(sessions, None, config.trend_limit),
        users: distinct_users(sessions),
        effectiveness_by_intervention: effectiveness_by_intervention(sessions),
        before_after: before_after_by_intervention(&compared),
        language_distribution: language_distribution(sessions),
        stress_by_weekday: stress_by_weekday(sessions, offset),
        stress_by_period: stress_by_period(sessions, offset),
        stress_by_date: stress_by_date(sessions, offset),
        stress_distribution: stress_distribution(sessions),
        effect_tiers: tier_breakdown(sessions),
        intervention_timeline: intervention_timeline(
            sessions,
            offset,
            config.timeline_limit,
            config.unmatched_severity,
        ),
        recent_sessions: sessions_table(sessions, None, None, config.table_limit),
    }
}

/// Parse a JSON array of `sessions` rows and build the report.
///
/// Any invalid row fails the whole call.
pub fn report_from_json(
    sessions_json: &str,
    config: &AnalyticsConfig,
) -> Result<DashboardReport, AnalyticsError> {
    let records = RecordAdapter::parse_array(sessions_json)?;
    let sessions = RecordAdapter::to_sessions(records)?;
    Ok(build_report(&sessions, config))
}

/// Handle for one in-flight refresh
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RefreshTicket(u64);

/// Stateful processor keeping the latest dashboard report.
///
/// Refreshes are numbered as they begin. A completed refresh is applied only
/// if no later-numbered refresh has been applied already, so a slow fetch can
/// never overwrite a newer view. A failed refresh leaves the last good report
/// in place.
pub struct DashboardProcessor {
    config: AnalyticsConfig,
    encoder: ReportEncoder,
    last_report: Option<DashboardReport>,
    issued: u64,
    applied: u64,
}

impl Default for DashboardProcessor {
    fn default() -> Self {
        Self::new(AnalyticsConfig::default())
    }
}

impl DashboardProcessor {
    pub fn new(config: AnalyticsConfig) -> Self {
        Self {
            config,
            encoder: ReportEncoder::new(),
            last_report: None,
            issued: 0,
            applied: 0,
        }
    }

    pub fn config(&self) -> &AnalyticsConfig {
        &self.config
    }

    /// Most recently applied report
    pub fn last_report(&self) -> Option<&DashboardReport> {
        self.last_report.as_ref()
    }

    /// Start a refresh. Pass the ticket back to [`complete_refresh`] or
    /// [`fail_refresh`] once the fetch finishes.
    ///
    /// [`complete_refresh`]: DashboardProcessor::complete_refresh
    /// [`fail_refresh`]: DashboardProcessor::fail_refresh
    pub fn begin_refresh(&mut self) -> RefreshTicket {
        self.issued += 1;
        RefreshTicket(self.issued)
    }

    /// Recompute from freshly fetched sessions.
    ///
    /// Returns `false` when the ticket was superseded and the result discarded.
    pub fn complete_refresh(&mut self, ticket: RefreshTicket, sessions: &[Session]) -> bool {
        if ticket.0 <= self.applied {
            warn!(
                ticket = ticket.0,
                applied = self.applied,
                "discarding superseded refresh"
            );
            return false;
        }

        let report = build_report(sessions, &self.config);
        info!(
            ticket = ticket.0,
            sessions = report.summary.total_sessions,
            "dashboard refreshed"
        );
        self.applied = ticket.0;
        self.last_report = Some(report);
        true
    }

    /// Record a failed fetch; the last good report stays in place
    pub fn fail_refresh(&self, ticket: RefreshTicket, error: &AnalyticsError) {
        warn!(
            ticket = ticket.0,
            %error,
            has_report = self.last_report.is_some(),
            "refresh failed, keeping last good report"
        );
    }

    /// Fetch the full collection from `source` and recompute
    pub fn refresh<S>(&mut self, source: &S) -> Result<&DashboardReport, AnalyticsError>
    where
        S: SessionSource + ?Sized,
    {
        let ticket = self.begin_refresh();
        match source.fetch(&SessionQuery::all()) {
            Ok(sessions) => {
                self.complete_refresh(ticket, &sessions);
            }
            Err(e) => {
                self.fail_refresh(ticket, &e);
                return Err(e);
            }
        }

        self.last_report
            .as_ref()
            .ok_or_else(|| AnalyticsError::SourceError("no report available".to_string()))
    }

    /// React to a change notification by refetching everything
    pub fn on_change<S>(
        &mut self,
        event: &ChangeEvent,
        source: &S,
    ) -> Result<&DashboardReport, AnalyticsError>
    where
        S: SessionSource + ?Sized,
    {
        debug!(kind = ?event.kind, session_id = ?event.session_id(), "change notification");
        self.refresh(source)
    }

    /// Encode the last report with producer metadata
    pub fn last_report_json(&self) -> Result<String, AnalyticsError> {
        let report = self
            .last_report
            .as_ref()
            .ok_or_else(|| AnalyticsError::SourceError("no report available".to_string()))?;
        self.encoder.encode_to_json(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MemorySource;
    use crate::types::{StressLevel, Weekday};
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;

    fn make_session(id: &str, day: u32, stress: f64) -> Session {
        let ts = Utc.with_ymd_and_hms(2024, 1, day, 10, 0, 0).unwrap();
        Session::new(id, "u1", ts, stress)
    }

    fn sample() -> Vec<Session> {
        vec![
            make_session("a", 15, 0.8)
                .with_language("en")
                .with_intervention("Breathing Exercise")
                .with_effectiveness(0.5),
            make_session("b", 16, 0.4)
                .with_language("hi")
                .with_intervention("Calming Music"),
            make_session("c", 17, 0.2).with_effectiveness(0.1),
        ]
    }

    struct FailingSource;

    impl SessionSource for FailingSource {
        fn fetch(&self, _query: &SessionQuery) -> Result<Vec<Session>, AnalyticsError> {
            Err(AnalyticsError::SourceError("connection reset".to_string()))
        }
    }

    #[test]
    fn test_build_report() {
        let report = build_report(&sample(), &AnalyticsConfig::default());

        assert_eq!(report.summary.total_sessions, 3);
        assert_eq!(report.summary.intervention_count, 2);
        assert_eq!(report.summary.success_rate, 50.0);
        assert_eq!(report.users, vec!["u1"]);
        assert_eq!(report.stress_by_weekday.len(), 7);
        assert_eq!(report.stress_by_weekday[Weekday::Monday.index()].sessions, 1);
        assert_eq!(report.stress_by_date.len(), 3);
        assert_eq!(report.intervention_timeline.len(), 2);
        assert_eq!(report.recent_sessions[0].session_id, "c");

        let latest = report.latest_stress.as_ref().unwrap();
        assert_eq!(latest.session_id, "c");
        assert_eq!(latest.level, StressLevel::Low);
    }

    #[test]
    fn test_before_after_only_sees_complete_sessions() {
        let report = build_report(&sample(), &AnalyticsConfig::default());

        assert_eq!(report.before_after.len(), 1);
        assert_eq!(report.before_after[0].key, "Breathing Exercise");
        assert!((report.before_after[0].reduction_pct - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_build_report_is_idempotent() {
        let sessions = sample();
        let config = AnalyticsConfig::default();
        assert_eq!(build_report(&sessions, &config), build_report(&sessions, &config));
    }

    #[test]
    fn test_build_report_empty() {
        let report = build_report(&[], &AnalyticsConfig::default());

        assert_eq!(report.summary.total_sessions, 0);
        assert_eq!(report.summary.average_stress, 0.0);
        assert!(report.latest_stress.is_none());
        assert_eq!(report.stress_distribution.len(), 5);
        assert!(report.stress_by_date.is_empty());
        assert!(report.before_after.is_empty());
    }

    #[test]
    fn test_report_from_json_rejects_invalid_rows() {
        let json = r#"[{"session_id":"a","user_id":"u","timestamp":"2024-01-15T10:00:00Z"}]"#;
        assert!(report_from_json(json, &AnalyticsConfig::default()).is_err());

        let json = r#"[{"session_id":"a","user_id":"u","timestamp":"2024-01-15T10:00:00Z","stress_score":0.5}]"#;
        let report = report_from_json(json, &AnalyticsConfig::default()).unwrap();
        assert_eq!(report.summary.total_sessions, 1);
    }

    #[test]
    fn test_processor_refresh_on_change() {
        let mut source = MemorySource::new(sample());
        let mut processor = DashboardProcessor::default();

        let total = processor.refresh(&source).unwrap().summary.total_sessions;
        assert_eq!(total, 3);

        let event = ChangeEvent::delete("a");
        source.apply(&event).unwrap();
        let report = processor.on_change(&event, &source).unwrap();
        assert_eq!(report.summary.total_sessions, 2);
    }

    #[test]
    fn test_processor_keeps_last_good_report() {
        let mut processor = DashboardProcessor::default();
        processor.refresh(&MemorySource::new(sample())).unwrap();

        assert!(processor.refresh(&FailingSource).is_err());
        assert_eq!(processor.last_report().unwrap().summary.total_sessions, 3);
    }

    #[test]
    fn test_processor_discards_superseded_refresh() {
        let mut processor = DashboardProcessor::default();
        let sessions = sample();

        let older = processor.begin_refresh();
        let newer = processor.begin_refresh();

        assert!(processor.complete_refresh(newer, &sessions[..1]));
        assert!(!processor.complete_refresh(older, &sessions));
        assert_eq!(processor.last_report().unwrap().summary.total_sessions, 1);
    }

    #[test]
    fn test_processor_applies_earlier_ticket_first() {
        let mut processor = DashboardProcessor::default();
        let sessions = sample();

        let older = processor.begin_refresh();
        let newer = processor.begin_refresh();

        assert!(processor.complete_refresh(older, &sessions[..1]));
        assert!(processor.complete_refresh(newer, &sessions));
        assert_eq!(processor.last_report().unwrap().summary.total_sessions, 3);
    }

    #[test]
    fn test_last_report_json() {
        let mut processor = DashboardProcessor::default();
        assert!(processor.last_report_json().is_err());

        processor.refresh(&MemorySource::new(sample())).unwrap();
        let json = processor.last_report_json().unwrap();
        assert!(json.contains("\"producer\""));
        assert!(json.contains("\"session_count\": 3"));
    }
}
