//! Core types for Zen Analytics
//!
//! This module defines the validated session record that every aggregation
//! consumes, the fixed bucket enumerations, and the derived views produced by
//! the analytics components.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Key used when a categorical field is absent
pub const UNKNOWN_KEY: &str = "unknown";

/// Convert a 0-1 fraction to a percentage.
///
/// The result is snapped to 1e-9 so that decimal inputs such as `0.3` map to
/// exactly `30.0` and compare correctly against bucket boundaries.
pub fn to_percent(fraction: f64) -> f64 {
    (fraction * 100.0 * 1e9).round() / 1e9
}

/// One completed stress-assessment event.
///
/// Sessions are only constructed from validated records, so `timestamp` and
/// `stress_score` are always present and `stress_score` lies in 0-1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Opaque unique identifier
    pub session_id: String,
    /// Subject identifier
    pub user_id: String,
    /// When the session occurred (UTC)
    pub timestamp: DateTime<Utc>,
    /// Raw stress measurement (0-1)
    pub stress_score: f64,
    /// Spoken language code (e.g. "en", "hi")
    #[serde(default)]
    pub language: Option<String>,
    /// Remedial action suggested after the session
    #[serde(default)]
    pub intervention: Option<String>,
    /// Fractional stress reduction attributed to the intervention (0-1)
    #[serde(default)]
    pub effectiveness: Option<f64>,
}

impl Session {
    pub fn new(
        session_id: impl Into<String>,
        user_id: impl Into<String>,
        timestamp: DateTime<Utc>,
        stress_score: f64,
    ) -> Self {
        Self {
            session_id: session_id.into(),
            user_id: user_id.into(),
            timestamp,
            stress_score,
            language: None,
            intervention: None,
            effectiveness: None,
        }
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn with_intervention(mut self, intervention: impl Into<String>) -> Self {
        self.intervention = Some(intervention.into());
        self
    }

    pub fn with_effectiveness(mut self, effectiveness: f64) -> Self {
        self.effectiveness = Some(effectiveness);
        self
    }

    /// Language grouping key, `"unknown"` when absent
    pub fn language_key(&self) -> &str {
        self.language.as_deref().unwrap_or(UNKNOWN_KEY)
    }

    /// Intervention grouping key, `"unknown"` when absent
    pub fn intervention_key(&self) -> &str {
        self.intervention.as_deref().unwrap_or(UNKNOWN_KEY)
    }

    /// Stress score as a percentage (0-100)
    pub fn stress_pct(&self) -> f64 {
        to_percent(self.stress_score)
    }
}

/// Day of week, in canonical Sunday-first order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Weekday {
    Sunday,
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
}

impl Weekday {
    pub const ALL: [Weekday; 7] = [
        Weekday::Sunday,
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
        Weekday::Saturday,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Weekday::Sunday => "Sunday",
            Weekday::Monday => "Monday",
            Weekday::Tuesday => "Tuesday",
            Weekday::Wednesday => "Wednesday",
            Weekday::Thursday => "Thursday",
            Weekday::Friday => "Friday",
            Weekday::Saturday => "Saturday",
        }
    }

    /// Position in the Sunday-first ordering (Sunday = 0)
    pub fn index(&self) -> usize {
        *self as usize
    }
}

impl From<chrono::Weekday> for Weekday {
    fn from(day: chrono::Weekday) -> Self {
        Weekday::ALL[day.num_days_from_sunday() as usize]
    }
}

/// Period of the day, half-open hour ranges
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayPeriod {
    /// 06:00-12:00
    Morning,
    /// 12:00-18:00
    Afternoon,
    /// 18:00-24:00
    Evening,
    /// 00:00-06:00
    Night,
}

impl DayPeriod {
    pub const ALL: [DayPeriod; 4] = [
        DayPeriod::Morning,
        DayPeriod::Afternoon,
        DayPeriod::Evening,
        DayPeriod::Night,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            DayPeriod::Morning => "Morning (6-12)",
            DayPeriod::Afternoon => "Afternoon (12-18)",
            DayPeriod::Evening => "Evening (18-24)",
            DayPeriod::Night => "Night (0-6)",
        }
    }
}

/// Fixed-width stress histogram bin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StressRange {
    /// [0, 20)
    VeryLow,
    /// [20, 40)
    Low,
    /// [40, 60)
    Medium,
    /// [60, 80)
    High,
    /// [80, 100]
    VeryHigh,
}

impl StressRange {
    pub const ALL: [StressRange; 5] = [
        StressRange::VeryLow,
        StressRange::Low,
        StressRange::Medium,
        StressRange::High,
        StressRange::VeryHigh,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            StressRange::VeryLow => "0-20%",
            StressRange::Low => "20-40%",
            StressRange::Medium => "40-60%",
            StressRange::High => "60-80%",
            StressRange::VeryHigh => "80-100%",
        }
    }
}

/// Intervention outcome tier by measured reduction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectTier {
    /// Reduction above 30%
    Effective,
    /// Reduction within 10-30% inclusive
    Moderate,
    /// Reduction below 10%
    Ineffective,
}

impl EffectTier {
    pub const ALL: [EffectTier; 3] = [
        EffectTier::Effective,
        EffectTier::Moderate,
        EffectTier::Ineffective,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            EffectTier::Effective => "Effective (>30%)",
            EffectTier::Moderate => "Moderate (10-30%)",
            EffectTier::Ineffective => "Ineffective (<10%)",
        }
    }
}

/// Gauge-style stress magnitude
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StressLevel {
    Low,
    Moderate,
    High,
}

impl StressLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            StressLevel::Low => "Low",
            StressLevel::Moderate => "Moderate",
            StressLevel::High => "High",
        }
    }
}

/// Intervention severity derived from the intervention label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Mild,
    Moderate,
    High,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Mild => "mild",
            Severity::Moderate => "moderate",
            Severity::High => "high",
        }
    }
}

/// Headline statistics over a session collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryStats {
    pub total_sessions: usize,
    /// Mean stress score (0-1)
    pub average_stress: f64,
    /// Mean stress score as a percentage (0-100)
    pub average_stress_pct: f64,
    /// Sessions with a measured effectiveness
    pub intervention_count: usize,
    /// Percentage of measured interventions above the success threshold
    pub success_rate: f64,
    pub distinct_languages: usize,
    pub distinct_users: usize,
}

/// Mean effectiveness for one intervention group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupEffectiveness {
    pub key: String,
    /// Mean effectiveness (0-1) over contributing sessions
    pub mean_effectiveness: f64,
    pub count: usize,
}

/// Before/after stress comparison for one intervention group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupComparison {
    pub key: String,
    pub mean_before: f64,
    pub mean_after: f64,
    pub reduction_pct: f64,
    pub count: usize,
}

/// Session count for one categorical key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCount {
    pub key: String,
    pub count: usize,
}

/// Mean stress for one weekday
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayOfWeekBucket {
    pub day: Weekday,
    /// Mean stress percentage, 0 when empty
    pub avg_stress: f64,
    pub sessions: usize,
}

/// Mean stress for one period of the day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayPeriodBucket {
    pub period: DayPeriod,
    /// Mean stress percentage, 0 when empty
    pub avg_stress: f64,
    pub sessions: usize,
}

/// Mean stress for one local calendar date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DateBucket {
    pub date: NaiveDate,
    pub avg_stress: f64,
    /// `avg_stress` rounded to the nearest integer percent
    pub avg_stress_rounded: u32,
    pub sessions: usize,
}

/// Histogram bin count
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeBin {
    pub range: StressRange,
    pub count: usize,
}

/// Per-session before/after stress
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EffectComparison {
    pub before: f64,
    pub after: f64,
    pub reduction_pct: f64,
}

/// Share of measured interventions in one tier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierShare {
    pub tier: EffectTier,
    pub count: usize,
    /// Rounded percentage of all measured interventions
    pub share_pct: u32,
}

/// Per-date severity counts for the intervention timeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineEntry {
    pub date: NaiveDate,
    pub mild: usize,
    pub moderate: usize,
    pub high: usize,
}

/// Single point in the stress trend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub session_id: String,
    pub user_id: String,
    pub timestamp: DateTime<Utc>,
    pub stress_pct: f64,
}

/// Most recent stress reading with its gauge level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatestStress {
    pub session_id: String,
    pub timestamp: DateTime<Utc>,
    pub stress_score: f64,
    pub level: StressLevel,
}

/// Every dashboard view computed from one session collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardReport {
    pub summary: SummaryStats,
    pub latest_stress: Option<LatestStress>,
    pub stress_trend: Vec<TrendPoint>,
    pub users: Vec<String>,
    pub effectiveness_by_intervention: Vec<GroupEffectiveness>,
    pub before_after: Vec<GroupComparison>,
    pub language_distribution: Vec<CategoryCount>,
    pub stress_by_weekday: Vec<DayOfWeekBucket>,
    pub stress_by_period: Vec<DayPeriodBucket>,
    pub stress_by_date: Vec<DateBucket>,
    pub stress_distribution: Vec<RangeBin>,
    pub effect_tiers: Vec<TierShare>,
    pub intervention_timeline: Vec<TimelineEntry>,
    /// Newest sessions first
    pub recent_sessions: Vec<Session>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_to_percent_snaps_boundaries() {
        assert_eq!(to_percent(0.3), 30.0);
        assert_eq!(to_percent(0.1), 10.0);
        assert_eq!(to_percent(0.7), 70.0);
        assert_eq!(to_percent(1.0), 100.0);
    }

    #[test]
    fn test_absent_keys_map_to_unknown() {
        let ts = Utc.with_ymd_and_hms(2024, 1, 15, 9, 0, 0).unwrap();
        let session = Session::new("s1", "u1", ts, 0.5);
        assert_eq!(session.language_key(), UNKNOWN_KEY);
        assert_eq!(session.intervention_key(), UNKNOWN_KEY);

        let session = session.with_language("hi").with_intervention("Breathing Exercise");
        assert_eq!(session.language_key(), "hi");
        assert_eq!(session.intervention_key(), "Breathing Exercise");
    }

    #[test]
    fn test_weekday_from_chrono() {
        assert_eq!(Weekday::from(chrono::Weekday::Sun), Weekday::Sunday);
        assert_eq!(Weekday::from(chrono::Weekday::Sat), Weekday::Saturday);
        assert_eq!(Weekday::Wednesday.index(), 3);
    }

    #[test]
    fn test_session_serde_field_names() {
        let ts = Utc.with_ymd_and_hms(2024, 1, 15, 9, 0, 0).unwrap();
        let session = Session::new("s1", "u1", ts, 0.42).with_effectiveness(0.2);
        let json = serde_json::to_string(&session).unwrap();

        assert!(json.contains("\"session_id\":\"s1\""));
        assert!(json.contains("\"stress_score\":0.42"));
        assert!(json.contains("\"intervention\":null"));
    }
}
