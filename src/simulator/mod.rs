//! Synthetic datalog generator.
//!
//! Each scenario sweeps a fixed number of samples. For sample `i` of `n` the
//! progress ratio is `p = i / (n - 1)`, and every channel is a function of `p`.
//! Output text uses the same header and column order the validator expects,
//! with per-channel precision: time 3 decimals, MAP/AFR 2, ignition/duty 1,
//! RPM as a whole number.

pub mod scenario;

pub use scenario::{catalogue, Scenario, ScenarioDescriptor};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::datalog::{channel, DatalogRow};

/// Exact header line emitted for simulated logs
pub const CSV_HEADER: &str = r#"Time,RPM,MAP,AFR,"Ignition Total","Injector Duty""#;

/// RPM window in which the knock scenario retards timing (exclusive)
pub const KNOCK_WINDOW_RPM: (f64, f64) = (5400.0, 5800.0);

/// Degrees of timing pulled inside the knock window
pub const KNOCK_RETARD_DEG: f64 = 6.0;

#[inline]
fn lerp(start: f64, end: f64, progress: f64) -> f64 {
    start + (end - start) * progress
}

/// Rows generated by one simulation call
#[derive(Clone, Debug, PartialEq)]
pub struct SimulatedRun {
    pub scenario: Scenario,
    pub rows: Vec<DatalogRow>,
}

/// Channel values of one simulated sample before formatting
struct Sample {
    time: f64,
    rpm: f64,
    map: f64,
    afr: f64,
    ignition: f64,
    duty: f64,
}

impl Sample {
    fn into_row(self) -> DatalogRow {
        DatalogRow::from_channels([
            (channel::TIME, Some(self.time)),
            (channel::RPM, Some(self.rpm.round())),
            (channel::MAP, Some(self.map)),
            (channel::AFR, Some(self.afr)),
            (channel::IGNITION_TOTAL, Some(self.ignition)),
            (channel::INJECTOR_DUTY, Some(self.duty)),
        ])
    }
}

fn lean_wot(p: f64) -> Sample {
    Sample {
        time: 5.0 * p,
        rpm: lerp(2500.0, 7500.0, p),
        map: 14.5,
        afr: lerp(12.5, 14.5, p),
        ignition: lerp(20.0, 15.0, p),
        duty: lerp(40.0, 85.0, p),
    }
}

fn rich_cruise<R: Rng + ?Sized>(i: usize, rng: &mut R) -> Sample {
    let rpm_jitter = ((rng.gen::<f64>() - 0.5) * 50.0).round();
    let afr_jitter = (rng.gen::<f64>() - 0.5) * 0.5;

    Sample {
        time: 0.1 * i as f64,
        rpm: 3000.0 + rpm_jitter,
        map: -8.5,
        afr: 12.8 + afr_jitter,
        ignition: 38.0,
        duty: 15.0,
    }
}

fn high_injector_duty(p: f64) -> Sample {
    Sample {
        time: 4.0 * p,
        rpm: lerp(5000.0, 8500.0, p),
        map: 15.0,
        afr: 11.5,
        ignition: 18.0,
        duty: lerp(75.0, 99.0, p),
    }
}

fn knock_event(p: f64) -> Sample {
    let rpm = lerp(4000.0, 6500.0, p);
    let mut ignition = lerp(25.0, 30.0, p);
    if rpm > KNOCK_WINDOW_RPM.0 && rpm < KNOCK_WINDOW_RPM.1 {
        ignition -= KNOCK_RETARD_DEG;
    }

    Sample {
        time: 3.0 * p,
        rpm,
        map: 12.0,
        afr: 11.8,
        ignition,
        duty: lerp(60.0, 80.0, p),
    }
}

fn format_value(value: Option<f64>, decimals: usize) -> String {
    value
        .map(|v| format!("{:.*}", decimals, v))
        .unwrap_or_default()
}

impl SimulatedRun {
    /// Generate a run, drawing jitter from `rng`
    pub fn generate<R: Rng + ?Sized>(scenario: Scenario, rng: &mut R) -> Self {
        let count = scenario.sample_count();
        let last = (count - 1) as f64;

        let rows = (0..count)
            .map(|i| {
                let progress = i as f64 / last;
                let sample = match scenario {
                    Scenario::LeanWideOpenThrottle => lean_wot(progress),
                    Scenario::RichCruise => rich_cruise(i, rng),
                    Scenario::HighInjectorDuty => high_injector_duty(progress),
                    Scenario::KnockEvent => knock_event(progress),
                };
                sample.into_row()
            })
            .collect::<Vec<_>>();

        tracing::debug!("Simulated {} samples for {}", rows.len(), scenario);

        Self { scenario, rows }
    }

    /// Render the run as datalog CSV text
    pub fn to_csv(&self) -> String {
        let mut lines = Vec::with_capacity(self.rows.len() + 1);
        lines.push(CSV_HEADER.to_string());

        for row in &self.rows {
            lines.push(format!(
                "{},{},{},{},{},{}",
                format_value(row.time(), 3),
                format_value(row.rpm(), 0),
                format_value(row.map(), 2),
                format_value(row.afr(), 2),
                format_value(row.ignition_total(), 1),
                format_value(row.injector_duty(), 1),
            ));
        }

        lines.join("\n")
    }
}

/// Simulate a scenario with entropy-seeded jitter
pub fn simulate(scenario: Scenario) -> String {
    let mut rng = StdRng::from_entropy();
    SimulatedRun::generate(scenario, &mut rng).to_csv()
}

/// Simulate a scenario reproducibly from `seed`
pub fn simulate_seeded(scenario: Scenario, seed: u64) -> String {
    let mut rng = StdRng::seed_from_u64(seed);
    SimulatedRun::generate(scenario, &mut rng).to_csv()
}
