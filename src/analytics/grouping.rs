//! Categorical grouping
//!
//! Groups sessions by intervention or language. Groups are emitted in the order
//! their key is first seen in the input; keys are returned raw; display
//! formatting such as [`capitalize`] is left to the caller.

use crate::analytics::effect::compare;
use crate::analytics::Accumulator;
use crate::types::{CategoryCount, GroupComparison, GroupEffectiveness, Session};
use std::collections::HashMap;

/// Categorical dimension to group by
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupKey {
    Intervention,
    Language,
}

impl GroupKey {
    /// Grouping key for a session, `"unknown"` when the field is absent
    pub fn key<'a>(&self, session: &'a Session) -> &'a str {
        match self {
            GroupKey::Intervention => session.intervention_key(),
            GroupKey::Language => session.language_key(),
        }
    }
}

/// Group sessions by key, preserving first-seen key order
pub fn group_by<'a, I>(sessions: I, key: GroupKey) -> Vec<(String, Vec<&'a Session>)>
where
    I: IntoIterator<Item = &'a Session>,
{
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<(String, Vec<&Session>)> = Vec::new();

    for session in sessions {
        let k = key.key(session);
        match index.get(k) {
            Some(&i) => groups[i].1.push(session),
            None => {
                index.insert(k, groups.len());
                groups.push((k.to_string(), vec![session]));
            }
        }
    }

    groups
}

/// Mean effectiveness per intervention.
///
/// Only sessions with a measured effectiveness contribute, to both the mean
/// and the count; an intervention with no measured session produces no group.
pub fn effectiveness_by_intervention(sessions: &[Session]) -> Vec<GroupEffectiveness> {
    let measured = sessions.iter().filter(|s| s.effectiveness.is_some());

    group_by(measured, GroupKey::Intervention)
        .into_iter()
        .map(|(key, members)| {
            let mut acc = Accumulator::default();
            for session in members {
                if let Some(effectiveness) = session.effectiveness {
                    acc.add(effectiveness);
                }
            }
            GroupEffectiveness {
                key,
                mean_effectiveness: acc.mean(),
                count: acc.count,
            }
        })
        .collect()
}

/// Mean before/after stress per intervention.
///
/// Callers are expected to pass only sessions with a measured effectiveness;
/// an absent effectiveness is treated as no reduction.
pub fn before_after_by_intervention(sessions: &[Session]) -> Vec<GroupComparison> {
    group_by(sessions, GroupKey::Intervention)
        .into_iter()
        .map(|(key, members)| {
            let mut before = Accumulator::default();
            let mut after = Accumulator::default();
            for session in &members {
                let effect = compare(session.stress_score, session.effectiveness.unwrap_or(0.0));
                before.add(effect.before);
                after.add(effect.after);
            }

            let mean_before = before.mean();
            let mean_after = after.mean();
            let reduction_pct = if mean_before > 0.0 {
                (mean_before - mean_after) / mean_before * 100.0
            } else {
                0.0
            };

            GroupComparison {
                key,
                mean_before,
                mean_after,
                reduction_pct,
                count: members.len(),
            }
        })
        .collect()
}

/// Session count per language
pub fn language_distribution(sessions: &[Session]) -> Vec<CategoryCount> {
    group_by(sessions, GroupKey::Language)
        .into_iter()
        .map(|(key, members)| CategoryCount {
            key,
            count: members.len(),
        })
        .collect()
}

/// Upper-case the first character of a group key for display
pub fn capitalize(key: &str) -> String {
    let mut chars = key.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Human-readable language name for a language code
pub fn language_display_name(code: &str) -> String {
    match code {
        "en" => "English".to_string(),
        "hi" => "Hindi".to_string(),
        "kn" => "Kannada".to_string(),
        "ta" => "Tamil".to_string(),
        "te" => "Telugu".to_string(),
        "ur" => "Urdu".to_string(),
        other => other.to_uppercase(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;

    fn make_session(id: &str, stress: f64, intervention: Option<&str>, eff: Option<f64>) -> Session {
        let ts = Utc.with_ymd_and_hms(2024, 1, 15, 10, 0, 0).unwrap();
        let mut session = Session::new(id, "u1", ts, stress);
        session.intervention = intervention.map(str::to_string);
        session.effectiveness = eff;
        session
    }

    #[test]
    fn test_group_by_preserves_first_seen_order() {
        let sessions = vec![
            make_session("a", 0.5, Some("music"), None),
            make_session("b", 0.5, Some("breathing"), None),
            make_session("c", 0.5, Some("music"), None),
            make_session("d", 0.5, None, None),
        ];
        let keys: Vec<String> = group_by(&sessions, GroupKey::Intervention)
            .into_iter()
            .map(|(k, _)| k)
            .collect();
        assert_eq!(keys, vec!["music", "breathing", "unknown"]);
    }

    #[test]
    fn test_effectiveness_by_intervention_excludes_unmeasured() {
        let sessions = vec![
            make_session("a", 0.5, Some("breathing"), Some(0.4)),
            make_session("b", 0.5, Some("breathing"), None),
            make_session("c", 0.5, Some("breathing"), Some(0.2)),
            make_session("d", 0.5, Some("music"), None),
            make_session("e", 0.5, None, Some(0.5)),
        ];
        let groups = effectiveness_by_intervention(&sessions);

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].key, "breathing");
        assert_eq!(groups[0].count, 2);
        assert!((groups[0].mean_effectiveness - 0.3).abs() < 1e-9);
        assert_eq!(groups[1].key, "unknown");
        assert_eq!(groups[1].count, 1);
    }

    #[test]
    fn test_before_after_by_intervention() {
        let sessions = vec![
            make_session("a", 0.8, Some("breathing"), Some(0.25)),
            make_session("b", 0.4, Some("breathing"), Some(0.5)),
        ];
        let groups = before_after_by_intervention(&sessions);

        assert_eq!(groups.len(), 1);
        let group = &groups[0];
        // before: (80 + 40) / 2, after: (60 + 20) / 2
        assert!((group.mean_before - 60.0).abs() < 1e-9);
        assert!((group.mean_after - 40.0).abs() < 1e-9);
        assert!((group.reduction_pct - 100.0 / 3.0).abs() < 1e-9);
        assert_eq!(group.count, 2);
    }

    #[test]
    fn test_before_after_zero_stress_has_zero_reduction() {
        let sessions = vec![make_session("a", 0.0, Some("music"), Some(0.5))];
        let groups = before_after_by_intervention(&sessions);
        assert_eq!(groups[0].reduction_pct, 0.0);
        assert!(!groups[0].reduction_pct.is_nan());
    }

    #[test]
    fn test_language_distribution() {
        let sessions = vec![
            make_session("a", 0.5, None, None).with_language("kn"),
            make_session("b", 0.5, None, None),
            make_session("c", 0.5, None, None).with_language("kn"),
        ];
        assert_eq!(
            language_distribution(&sessions),
            vec![
                CategoryCount { key: "kn".to_string(), count: 2 },
                CategoryCount { key: "unknown".to_string(), count: 1 },
            ]
        );
    }

    #[test]
    fn test_display_helpers() {
        assert_eq!(capitalize("breathing exercise"), "Breathing exercise");
        assert_eq!(capitalize(""), "");
        assert_eq!(language_display_name("te"), "Telugu");
        assert_eq!(language_display_name("fr"), "FR");
    }
}
