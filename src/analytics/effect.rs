//! Before/after effect computation
//!
//! `before` is the session stress as a percentage; `after` scales it by the
//! measured effectiveness.

use crate::types::{to_percent, EffectComparison, Session};

/// Compare stress before and after an intervention with the given effectiveness
pub fn compare(stress_score: f64, effectiveness: f64) -> EffectComparison {
    let before = to_percent(stress_score);
    let after = before * (1.0 - effectiveness);
    EffectComparison {
        before,
        after,
        reduction_pct: reduction_pct(before, after),
    }
}

/// Relative reduction in percent, 0 when `before` is 0
pub fn reduction_pct(before: f64, after: f64) -> f64 {
    if before == 0.0 {
        0.0
    } else {
        (before - after) / before * 100.0
    }
}

/// Before/after for one session, `None` when no effectiveness was measured
pub fn session_effect(session: &Session) -> Option<EffectComparison> {
    session
        .effectiveness
        .map(|effectiveness| compare(session.stress_score, effectiveness))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_compare() {
        let effect = compare(0.8, 0.25);
        assert!((effect.before - 80.0).abs() < 1e-9);
        assert!((effect.after - 60.0).abs() < 1e-9);
        assert!((effect.reduction_pct - 25.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_before() {
        let effect = compare(0.0, 0.5);
        assert_eq!(effect.before, 0.0);
        assert_eq!(effect.reduction_pct, 0.0);
    }

    #[test]
    fn test_session_effect_requires_effectiveness() {
        let session = Session::new("s", "u", Utc::now(), 0.6);
        assert!(session_effect(&session).is_none());

        let effect = session_effect(&session.with_effectiveness(1.0)).unwrap();
        assert_eq!(effect.after, 0.0);
        assert!((effect.reduction_pct - 100.0).abs() < 1e-9);
    }
}
