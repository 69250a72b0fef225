use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoEnumIterator};

/// Synthetic fault patterns the simulator can produce
#[derive(
    AsRefStr,
    Clone,
    Copy,
    Debug,
    Display,
    EnumIter,
    EnumString,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "camelCase")]
#[serde(rename_all = "camelCase")]
pub enum Scenario {
    /// WOT pull that leans out as RPM climbs
    #[strum(to_string = "leanWideOpenThrottle", serialize = "leanWot")]
    LeanWideOpenThrottle,
    /// Steady cruise with a rich mixture
    RichCruise,
    /// High RPM pull that drives the injectors toward 100% duty
    #[strum(to_string = "highInjectorDuty", serialize = "highDuty")]
    HighInjectorDuty,
    /// Pull with a sudden ignition retard
    #[strum(to_string = "knockEvent", serialize = "knock")]
    KnockEvent,
}

/// Display identity of a scenario
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct ScenarioDescriptor {
    pub scenario: Scenario,
    pub name: &'static str,
    pub description: &'static str,
}

impl Scenario {
    pub fn descriptor(&self) -> ScenarioDescriptor {
        let (name, description) = match self {
            Scenario::LeanWideOpenThrottle => (
                "Lean WOT Pull",
                "Simulates a WOT run with a dangerously lean air-fuel ratio.",
            ),
            Scenario::RichCruise => (
                "Rich Cruise",
                "Simulates steady cruising with an excessively rich mixture.",
            ),
            Scenario::HighInjectorDuty => (
                "High Injector Duty",
                "Simulates a high-RPM pull where injectors are maxed out.",
            ),
            Scenario::KnockEvent => (
                "Potential Knock Event",
                "Simulates a timing drop characteristic of a knock event.",
            ),
        };

        ScenarioDescriptor {
            scenario: *self,
            name,
            description,
        }
    }

    /// Number of rows one run of this scenario produces
    pub fn sample_count(&self) -> usize {
        match self {
            Scenario::LeanWideOpenThrottle => 101,
            Scenario::RichCruise => 51,
            Scenario::HighInjectorDuty => 81,
            Scenario::KnockEvent => 61,
        }
    }

    /// Whether RPM sweeps upward across the run
    pub fn is_sweep(&self) -> bool {
        !matches!(self, Scenario::RichCruise)
    }
}

/// Descriptors for every scenario, in menu order
pub fn catalogue() -> Vec<ScenarioDescriptor> {
    Scenario::iter().map(|s| s.descriptor()).collect()
}
