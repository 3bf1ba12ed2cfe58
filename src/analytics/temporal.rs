//! Temporal bucketing
//!
//! Timestamps are converted to local time with a fixed UTC offset before
//! extracting the weekday, hour or calendar date. Weekday and period buckets
//! are dense (every bucket present); date buckets are sparse.

use crate::analytics::classify::classify_severity;
use crate::analytics::Accumulator;
use crate::config::UnmatchedSeverity;
use crate::types::{
    DateBucket, DayOfWeekBucket, DayPeriod, DayPeriodBucket, Session, Severity, TimelineEntry,
    TrendPoint, Weekday,
};
use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, Timelike};
use std::collections::{BTreeMap, BTreeSet};

impl DayPeriod {
    /// Period containing the given hour (0-23)
    pub fn from_hour(hour: u32) -> DayPeriod {
        match hour {
            6..=11 => DayPeriod::Morning,
            12..=17 => DayPeriod::Afternoon,
            18..=23 => DayPeriod::Evening,
            _ => DayPeriod::Night,
        }
    }
}

fn local_time(session: &Session, offset: FixedOffset) -> DateTime<FixedOffset> {
    session.timestamp.with_timezone(&offset)
}

/// Local calendar date of a session
pub fn local_date(session: &Session, offset: FixedOffset) -> NaiveDate {
    local_time(session, offset).date_naive()
}

/// Mean stress per weekday, Sunday through Saturday
pub fn stress_by_weekday(sessions: &[Session], offset: FixedOffset) -> Vec<DayOfWeekBucket> {
    let mut buckets = [Accumulator::default(); 7];
    for session in sessions {
        let day = Weekday::from(local_time(session, offset).weekday());
        buckets[day.index()].add(session.stress_pct());
    }

    Weekday::ALL
        .iter()
        .zip(buckets)
        .map(|(&day, acc)| DayOfWeekBucket {
            day,
            avg_stress: acc.mean(),
            sessions: acc.count,
        })
        .collect()
}

/// Mean stress per period of the day, Morning through Night
pub fn stress_by_period(sessions: &[Session], offset: FixedOffset) -> Vec<DayPeriodBucket> {
    let mut buckets = [Accumulator::default(); 4];
    for session in sessions {
        let period = DayPeriod::from_hour(local_time(session, offset).hour());
        buckets[period as usize].add(session.stress_pct());
    }

    DayPeriod::ALL
        .iter()
        .zip(buckets)
        .map(|(&period, acc)| DayPeriodBucket {
            period,
            avg_stress: acc.mean(),
            sessions: acc.count,
        })
        .collect()
}

/// Mean stress per local calendar date, ascending, dates without sessions omitted
pub fn stress_by_date(sessions: &[Session], offset: FixedOffset) -> Vec<DateBucket> {
    let mut by_date: BTreeMap<NaiveDate, Accumulator> = BTreeMap::new();
    for session in sessions {
        by_date
            .entry(local_date(session, offset))
            .or_default()
            .add(session.stress_pct());
    }

    by_date
        .into_iter()
        .map(|(date, acc)| {
            let avg_stress = acc.mean();
            DateBucket {
                date,
                avg_stress,
                avg_stress_rounded: avg_stress.round() as u32,
                sessions: acc.count,
            }
        })
        .collect()
}

/// Severity counts per date for the earliest `limit` sessions with an intervention.
///
/// Dates appear in chronological order. Labels without a severity keyword
/// are counted under `unmatched` (or dropped when it is `Skip`).
pub fn intervention_timeline(
    sessions: &[Session],
    offset: FixedOffset,
    limit: usize,
    unmatched: UnmatchedSeverity,
) -> Vec<TimelineEntry> {
    let mut with_intervention: Vec<&Session> =
        sessions.iter().filter(|s| s.intervention.is_some()).collect();
    with_intervention.sort_by_key(|s| s.timestamp);
    with_intervention.truncate(limit);

    let mut entries: Vec<TimelineEntry> = Vec::new();
    for session in with_intervention {
        let date = local_date(session, offset);
        let index = match entries.iter().position(|e| e.date == date) {
            Some(i) => i,
            None => {
                entries.push(TimelineEntry {
                    date,
                    mild: 0,
                    moderate: 0,
                    high: 0,
                });
                entries.len() - 1
            }
        };

        let entry = &mut entries[index];
        match classify_severity(session.intervention.as_deref(), unmatched) {
            Some(Severity::Mild) => entry.mild += 1,
            Some(Severity::Moderate) => entry.moderate += 1,
            Some(Severity::High) => entry.high += 1,
            None => {}
        }
    }

    entries
}

/// Earliest `limit` sessions as trend points, optionally restricted to one user
pub fn stress_trend(sessions: &[Session], user_id: Option<&str>, limit: usize) -> Vec<TrendPoint> {
    let mut selected: Vec<&Session> = sessions
        .iter()
        .filter(|s| user_id.map_or(true, |u| s.user_id == u))
        .collect();
    selected.sort_by_key(|s| s.timestamp);

    selected
        .into_iter()
        .take(limit)
        .map(|s| TrendPoint {
            session_id: s.session_id.clone(),
            user_id: s.user_id.clone(),
            timestamp: s.timestamp,
            stress_pct: s.stress_pct(),
        })
        .collect()
}

/// Distinct user ids, sorted
pub fn distinct_users(sessions: &[Session]) -> Vec<String> {
    sessions
        .iter()
        .map(|s| s.user_id.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;

    fn utc() -> FixedOffset {
        FixedOffset::east_opt(0).unwrap()
    }

    fn at(y: i32, m: u32, d: u32, h: u32, stress: f64) -> Session {
        let ts = Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap();
        Session::new(format!("s-{y}{m:02}{d:02}{h:02}"), "u1", ts, stress)
    }

    #[test]
    fn test_period_boundaries() {
        assert_eq!(DayPeriod::from_hour(0), DayPeriod::Night);
        assert_eq!(DayPeriod::from_hour(5), DayPeriod::Night);
        assert_eq!(DayPeriod::from_hour(6), DayPeriod::Morning);
        assert_eq!(DayPeriod::from_hour(12), DayPeriod::Afternoon);
        assert_eq!(DayPeriod::from_hour(18), DayPeriod::Evening);
        assert_eq!(DayPeriod::from_hour(23), DayPeriod::Evening);
    }

    #[test]
    fn test_empty_input_dense_buckets() {
        let days = stress_by_weekday(&[], utc());
        let periods = stress_by_period(&[], utc());

        assert_eq!(days.len(), 7);
        assert_eq!(periods.len(), 4);
        assert!(days.iter().all(|d| d.avg_stress == 0.0 && d.sessions == 0));
        assert!(periods.iter().all(|p| p.avg_stress == 0.0 && p.sessions == 0));
        assert_eq!(days[0].day, Weekday::Sunday);
        assert_eq!(periods[3].period, DayPeriod::Night);
    }

    #[test]
    fn test_stress_by_weekday() {
        // 2024-01-15 is a Monday
        let sessions = vec![
            at(2024, 1, 15, 9, 0.4),
            at(2024, 1, 15, 20, 0.8),
            at(2024, 1, 14, 9, 0.3),
        ];
        let days = stress_by_weekday(&sessions, utc());

        assert_eq!(days[0].day, Weekday::Sunday);
        assert_eq!(days[0].sessions, 1);
        assert!((days[0].avg_stress - 30.0).abs() < 1e-9);
        assert_eq!(days[1].sessions, 2);
        assert!((days[1].avg_stress - 60.0).abs() < 1e-9);
        assert_eq!(days[2].sessions, 0);
    }

    #[test]
    fn test_stress_by_period_uses_offset() {
        // 03:00 UTC is 08:30 at +05:30
        let sessions = vec![at(2024, 1, 15, 3, 0.5)];
        let ist = FixedOffset::east_opt(330 * 60).unwrap();

        let utc_periods = stress_by_period(&sessions, utc());
        let ist_periods = stress_by_period(&sessions, ist);

        assert_eq!(utc_periods[3].sessions, 1);
        assert_eq!(ist_periods[0].sessions, 1);
        assert!((ist_periods[0].avg_stress - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_stress_by_date_is_sparse() {
        let sessions = vec![
            at(2024, 1, 17, 9, 0.2),
            at(2024, 1, 15, 9, 0.4),
            at(2024, 1, 15, 21, 0.45),
            at(2024, 1, 20, 9, 0.9),
        ];
        let dates = stress_by_date(&sessions, utc());

        assert_eq!(dates.len(), 3);
        assert_eq!(dates[0].date, NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
        assert_eq!(dates[0].sessions, 2);
        assert_eq!(dates[0].avg_stress_rounded, 43);
        assert_eq!(dates[2].avg_stress_rounded, 90);
    }

    #[test]
    fn test_intervention_timeline() {
        let sessions = vec![
            at(2024, 1, 16, 9, 0.5).with_intervention("High intensity breathing"),
            at(2024, 1, 15, 9, 0.5).with_intervention("Mild stretch"),
            at(2024, 1, 15, 10, 0.5).with_intervention("Calming Music"),
            at(2024, 1, 15, 11, 0.5),
            at(2024, 1, 17, 9, 0.5).with_intervention("Moderate walk"),
        ];
        let timeline = intervention_timeline(&sessions, utc(), 3, UnmatchedSeverity::Mild);

        assert_eq!(
            timeline,
            vec![
                TimelineEntry {
                    date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
                    mild: 2,
                    moderate: 0,
                    high: 0,
                },
                TimelineEntry {
                    date: NaiveDate::from_ymd_opt(2024, 1, 16).unwrap(),
                    mild: 0,
                    moderate: 0,
                    high: 1,
                },
            ]
        );
    }

    #[test]
    fn test_intervention_timeline_skip_unmatched() {
        let sessions = vec![at(2024, 1, 15, 9, 0.5).with_intervention("Calming Music")];
        let timeline = intervention_timeline(&sessions, utc(), 20, UnmatchedSeverity::Skip);

        assert_eq!(timeline.len(), 1);
        assert_eq!(timeline[0].mild + timeline[0].moderate + timeline[0].high, 0);
    }

    #[test]
    fn test_stress_trend() {
        let mut other = at(2024, 1, 14, 9, 0.9);
        other.user_id = "u2".to_string();
        let sessions = vec![at(2024, 1, 16, 9, 0.4), other, at(2024, 1, 15, 9, 0.6)];

        let all = stress_trend(&sessions, None, 2);
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].user_id, "u2");

        let mine = stress_trend(&sessions, Some("u1"), 10);
        assert_eq!(mine.len(), 2);
        assert!((mine[0].stress_pct - 60.0).abs() < 1e-9);

        assert_eq!(distinct_users(&sessions), vec!["u1", "u2"]);
    }
}
