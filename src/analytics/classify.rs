//! Classification into named tiers
//!
//! Three independent classifiers with deliberately different boundaries:
//! - intervention outcome tiers over effectiveness percent (>30 / 10-30 / <10)
//! - gauge stress level over the raw score (<0.3 / <0.6 / else)
//! - intervention severity by keyword in the intervention label

use crate::config::UnmatchedSeverity;
use crate::types::{to_percent, EffectTier, Session, Severity, StressLevel, TierShare};

impl EffectTier {
    /// Tier for a reduction percentage; both 10 and 30 are `Moderate`
    pub fn from_percent(reduction_pct: f64) -> EffectTier {
        if reduction_pct > 30.0 {
            EffectTier::Effective
        } else if reduction_pct >= 10.0 {
            EffectTier::Moderate
        } else {
            EffectTier::Ineffective
        }
    }

    /// Tier for an effectiveness fraction (0-1)
    pub fn from_effectiveness(effectiveness: f64) -> EffectTier {
        Self::from_percent(to_percent(effectiveness))
    }
}

/// Share of measured interventions per outcome tier.
///
/// Each share is rounded independently against the total number of measured
/// sessions, so the shares need not add up to exactly 100.
pub fn tier_breakdown(sessions: &[Session]) -> Vec<TierShare> {
    let mut counts = [0usize; 3];
    let mut total = 0usize;

    for effectiveness in sessions.iter().filter_map(|s| s.effectiveness) {
        counts[EffectTier::from_effectiveness(effectiveness) as usize] += 1;
        total += 1;
    }

    EffectTier::ALL
        .iter()
        .zip(counts)
        .map(|(&tier, count)| TierShare {
            tier,
            count,
            share_pct: share(count, total),
        })
        .collect()
}

fn share(count: usize, total: usize) -> u32 {
    if total == 0 {
        0
    } else {
        ((count as f64 / total as f64) * 100.0).round() as u32
    }
}

impl StressLevel {
    pub fn from_score(stress_score: f64) -> StressLevel {
        if stress_score < 0.3 {
            StressLevel::Low
        } else if stress_score < 0.6 {
            StressLevel::Moderate
        } else {
            StressLevel::High
        }
    }
}

/// Gauge level for a raw stress score (0-1)
pub fn stress_level(stress_score: f64) -> StressLevel {
    StressLevel::from_score(stress_score)
}

impl Severity {
    /// Severity keyword contained in the label, matched case-insensitively
    /// in the order mild, moderate, high
    pub fn from_label(label: &str) -> Option<Severity> {
        let lower = label.to_lowercase();
        if lower.contains("mild") {
            Some(Severity::Mild)
        } else if lower.contains("moderate") {
            Some(Severity::Moderate)
        } else if lower.contains("high") {
            Some(Severity::High)
        } else {
            None
        }
    }
}

/// Severity for an intervention label, falling back to the configured default
/// for absent labels and labels without a keyword
pub fn classify_severity(label: Option<&str>, unmatched: UnmatchedSeverity) -> Option<Severity> {
    label
        .and_then(Severity::from_label)
        .or_else(|| unmatched.severity())
}
