//! Summary statistics
//!
//! Headline numbers shown at the top of the dashboard.

use crate::analytics::classify::stress_level;
use crate::analytics::Accumulator;
use crate::types::{to_percent, LatestStress, Session, SummaryStats};
use std::collections::HashSet;
use tracing::debug;

/// Number of sessions
pub fn count(sessions: &[Session]) -> usize {
    sessions.len()
}

/// Mean stress score (0-1), 0 for an empty collection
pub fn average_stress(sessions: &[Session]) -> f64 {
    let mut acc = Accumulator::default();
    for session in sessions {
        acc.add(session.stress_score);
    }
    acc.mean()
}

/// Number of sessions with a measured effectiveness
pub fn intervention_count(sessions: &[Session]) -> usize {
    sessions.iter().filter(|s| s.effectiveness.is_some()).count()
}

/// Percentage of measured interventions with effectiveness above `threshold`.
///
/// Sessions without effectiveness are excluded from the denominator. Returns 0
/// when no session carries an effectiveness value.
pub fn success_rate(sessions: &[Session], threshold: f64) -> f64 {
    let measured: Vec<f64> = sessions.iter().filter_map(|s| s.effectiveness).collect();
    if measured.is_empty() {
        return 0.0;
    }

    let successful = measured.iter().filter(|&&e| e > threshold).count();
    (successful as f64 / measured.len() as f64) * 100.0
}

/// Number of distinct language keys (absent counts as `"unknown"`)
pub fn distinct_language_count(sessions: &[Session]) -> usize {
    sessions
        .iter()
        .map(|s| s.language_key())
        .collect::<HashSet<_>>()
        .len()
}

/// Number of distinct users
pub fn distinct_user_count(sessions: &[Session]) -> usize {
    sessions
        .iter()
        .map(|s| s.user_id.as_str())
        .collect::<HashSet<_>>()
        .len()
}

/// Compute every summary statistic in one pass over the collection
pub fn summarize(sessions: &[Session], success_threshold: f64) -> SummaryStats {
    let average = average_stress(sessions);
    let stats = SummaryStats {
        total_sessions: count(sessions),
        average_stress: average,
        average_stress_pct: to_percent(average),
        intervention_count: intervention_count(sessions),
        success_rate: success_rate(sessions, success_threshold),
        distinct_languages: distinct_language_count(sessions),
        distinct_users: distinct_user_count(sessions),
    };

    debug!(
        sessions = stats.total_sessions,
        interventions = stats.intervention_count,
        "computed summary statistics"
    );

    stats
}

/// Most recent session's stress reading, `None` for an empty collection.
///
/// Ties on timestamp resolve to the later element of the slice.
pub fn latest_stress(sessions: &[Session]) -> Option<LatestStress> {
    sessions
        .iter()
        .max_by_key(|s| s.timestamp)
        .map(|s| LatestStress {
            session_id: s.session_id.clone(),
            timestamp: s.timestamp,
            stress_score: s.stress_score,
            level: stress_level(s.stress_score),
        })
}
