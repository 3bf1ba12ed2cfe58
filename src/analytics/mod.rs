//! Session aggregation components
//!
//! Each component is a set of pure functions over a slice of validated
//! sessions. None of them keeps state between calls, so any view can be
//! recomputed from the latest collection at any time and from any thread.
//!
//! - **stats**: counts, mean stress, success rate, distinct cardinalities
//! - **grouping**: per-intervention and per-language aggregates
//! - **temporal**: weekday, period-of-day and calendar-date buckets
//! - **distribution**: fixed five-bin stress histogram
//! - **effect**: per-session before/after stress
//! - **classify**: outcome tiers, gauge levels, intervention severity

pub mod classify;
pub mod distribution;
pub mod effect;
pub mod grouping;
pub mod stats;
pub mod temporal;

pub use classify::{classify_severity, tier_breakdown};
pub use distribution::stress_distribution;
pub use effect::session_effect;
pub use grouping::{before_after_by_intervention, effectiveness_by_intervention, language_distribution};
pub use stats::{average_stress, count, latest_stress, success_rate, summarize};
pub use temporal::{intervention_timeline, stress_by_date, stress_by_period, stress_by_weekday, stress_trend};

/// Running total used by every mean-per-bucket aggregate
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub(crate) struct Accumulator {
    pub total: f64,
    pub count: usize,
}

impl Accumulator {
    pub fn add(&mut self, value: f64) {
        self.total += value;
        self.count += 1;
    }

    /// Arithmetic mean, 0 when nothing was added
    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.total / self.count as f64
        }
    }
}
