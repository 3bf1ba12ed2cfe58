//! Stress distribution binning

use crate::types::{RangeBin, Session, StressRange};

impl StressRange {
    /// Bin for a stress percentage. Bins are `[lo, hi)` except the last,
    /// which also includes 100.
    pub fn from_percent(stress_pct: f64) -> StressRange {
        if stress_pct < 20.0 {
            StressRange::VeryLow
        } else if stress_pct < 40.0 {
            StressRange::Low
        } else if stress_pct < 60.0 {
            StressRange::Medium
        } else if stress_pct < 80.0 {
            StressRange::High
        } else {
            StressRange::VeryHigh
        }
    }
}

/// Five-bin stress histogram; every bin is present, in ascending order
pub fn stress_distribution(sessions: &[Session]) -> Vec<RangeBin> {
    let mut counts = [0usize; 5];
    for session in sessions {
        counts[StressRange::from_percent(session.stress_pct()) as usize] += 1;
    }

    StressRange::ALL
        .iter()
        .zip(counts)
        .map(|(&range, count)| RangeBin { range, count })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn sessions_with(scores: &[f64]) -> Vec<Session> {
        scores
            .iter()
            .enumerate()
            .map(|(i, &s)| Session::new(format!("s{i}"), "u", Utc::now(), s))
            .collect()
    }

    #[test]
    fn test_bin_boundaries() {
        assert_eq!(StressRange::from_percent(0.0), StressRange::VeryLow);
        assert_eq!(StressRange::from_percent(19.99), StressRange::VeryLow);
        assert_eq!(StressRange::from_percent(20.0), StressRange::Low);
        assert_eq!(StressRange::from_percent(60.0), StressRange::High);
        assert_eq!(StressRange::from_percent(80.0), StressRange::VeryHigh);
        assert_eq!(StressRange::from_percent(100.0), StressRange::VeryHigh);
    }

    #[test]
    fn test_empty_input_has_five_zero_bins() {
        let bins = stress_distribution(&[]);
        assert_eq!(bins.len(), 5);
        assert!(bins.iter().all(|b| b.count == 0));
        assert_eq!(bins[0].range, StressRange::VeryLow);
        assert_eq!(bins[4].range, StressRange::VeryHigh);
    }

    #[test]
    fn test_bins_sum_to_count() {
        let sessions = sessions_with(&[0.05, 0.2, 0.39, 0.4, 0.6, 0.79, 0.8, 1.0, 0.55]);
        let bins = stress_distribution(&sessions);
        let counts: Vec<usize> = bins.iter().map(|b| b.count).collect();

        assert_eq!(counts, vec![1, 2, 2, 2, 2]);
        assert_eq!(counts.iter().sum::<usize>(), sessions.len());
    }
}
