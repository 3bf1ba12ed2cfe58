//! Build a dashboard report from simulated sessions

use chrono::{TimeZone, Utc};
use zen_analytics::estimator::{simulate_sessions, SimulationPlan};
use zen_analytics::{build_report, AnalyticsConfig, ReportEncoder};

fn main() {
    let start = Utc.with_ymd_and_hms(2024, 1, 15, 8, 0, 0).unwrap();
    let plan = SimulationPlan::new(30, start);

    let sessions = match simulate_sessions(&plan, Some(42)) {
        Ok(sessions) => sessions,
        Err(e) => {
            eprintln!("Error: {e}");
            return;
        }
    };

    let report = build_report(&sessions, &AnalyticsConfig::default());
    match ReportEncoder::new().encode_to_json(&report) {
        Ok(json) => println!("{json}"),
        Err(e) => eprintln!("Error: {e}"),
    }
}
