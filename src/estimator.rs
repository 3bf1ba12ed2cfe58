//! Stress estimation
//!
//! A [`StressEstimator`] turns a mono audio buffer into a stress score in 0-1.
//! Only a mock implementation ships here; a real voice model plugs in behind
//! the same trait.

use crate::error::AnalyticsError;
use crate::types::Session;
use chrono::{DateTime, Duration, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

/// Intervention suggested for high stress
pub const HIGH_STRESS_INTERVENTION: &str = "Breathing Exercise";

/// Intervention suggested otherwise
pub const DEFAULT_INTERVENTION: &str = "Calming Music";

/// Language codes the voice pipeline recognises
pub const SUPPORTED_LANGUAGES: [&str; 5] = ["en", "hi", "kn", "ta", "te"];

/// Samples per simulated recording
const SIMULATED_BUFFER_LEN: usize = 1600;

/// Source of stress scores
pub trait StressEstimator {
    /// Estimate stress (0-1) from mono PCM samples
    fn estimate(&mut self, audio: &[f32]) -> Result<f64, AnalyticsError>;
}

/// Intervention for a stress score: strictly above 0.6 gets breathing
pub fn suggest_intervention(stress_score: f64) -> &'static str {
    if stress_score > 0.6 {
        HIGH_STRESS_INTERVENTION
    } else {
        DEFAULT_INTERVENTION
    }
}

/// Random estimator for demos and tests.
///
/// Scores are uniform in [0.2, 0.9) and effectiveness in [0.6, 1.0).
pub struct MockEstimator {
    rng: StdRng,
}

impl Default for MockEstimator {
    fn default() -> Self {
        Self::new(None)
    }
}

impl MockEstimator {
    /// Seeded for reproducible output, entropy-seeded otherwise
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_entropy(),
        };
        Self { rng }
    }

    /// Effectiveness of a simulated intervention
    pub fn mock_effectiveness(&mut self) -> f64 {
        self.rng.gen_range(0.6..1.0)
    }

    fn synthetic_audio(&mut self) -> Vec<f32> {
        (0..SIMULATED_BUFFER_LEN)
            .map(|_| self.rng.gen_range(-1.0f32..1.0f32))
            .collect()
    }

    fn pick<'a>(&mut self, items: &'a [String]) -> Option<&'a String> {
        if items.is_empty() {
            None
        } else {
            Some(&items[self.rng.gen_range(0..items.len())])
        }
    }

    /// Generate sessions the way the recording flow would
    pub fn simulate(&mut self, plan: &SimulationPlan) -> Result<Vec<Session>, AnalyticsError> {
        if plan.users.is_empty() {
            return Err(AnalyticsError::InvalidValue(
                "simulation needs at least one user".to_string(),
            ));
        }

        let mut sessions = Vec::with_capacity(plan.count);
        let mut timestamp = plan.start;

        for _ in 0..plan.count {
            let audio = self.synthetic_audio();
            let stress_score = self.estimate(&audio)?;
            let user_id = self.pick(&plan.users).cloned().unwrap_or_default();

            let mut session = Session::new(
                format!("session_{}", timestamp.timestamp_millis()),
                user_id,
                timestamp,
                stress_score,
            )
            .with_intervention(suggest_intervention(stress_score))
            .with_effectiveness(self.mock_effectiveness());
            session.language = self.pick(&plan.languages).cloned();

            sessions.push(session);
            timestamp += Duration::minutes(self.rng.gen_range(30..=plan.max_gap_minutes.max(30)));
        }

        debug!(count = sessions.len(), "simulated sessions");
        Ok(sessions)
    }
}

impl StressEstimator for MockEstimator {
    fn estimate(&mut self, audio: &[f32]) -> Result<f64, AnalyticsError> {
        if audio.is_empty() {
            return Err(AnalyticsError::EstimatorError("empty audio buffer".to_string()));
        }
        if audio.iter().any(|s| !s.is_finite()) {
            return Err(AnalyticsError::EstimatorError(
                "audio buffer contains non-finite samples".to_string(),
            ));
        }
        Ok(self.rng.gen_range(0.2..0.9))
    }
}

/// Parameters for [`simulate_sessions`]
#[derive(Debug, Clone)]
pub struct SimulationPlan {
    pub count: usize,
    pub start: DateTime<Utc>,
    pub users: Vec<String>,
    pub languages: Vec<String>,
    /// Upper bound on the random gap between consecutive sessions
    pub max_gap_minutes: i64,
}

impl SimulationPlan {
    pub fn new(count: usize, start: DateTime<Utc>) -> Self {
        Self {
            count,
            start,
            users: vec!["user-1".to_string(), "user-2".to_string(), "user-3".to_string()],
            languages: SUPPORTED_LANGUAGES.iter().map(|l| l.to_string()).collect(),
            max_gap_minutes: 12 * 60,
        }
    }
}

/// Simulate sessions with a fresh [`MockEstimator`]
pub fn simulate_sessions(plan: &SimulationPlan, seed: Option<u64>) -> Result<Vec<Session>, AnalyticsError> {
    MockEstimator::new(seed).simulate(plan)
}
