//! Prompt construction for tuning analysis.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

use super::AnalysisError;
use crate::datalog::{ChannelSummary, Datalog};

/// JSON shape the model is asked to reply with
pub const RESPONSE_SCHEMA: &str = r#"{
    "summary": "string",
    "fuelAdjustments": [{ "rpmRange": "string", "loadCondition": "string", "currentAFR": "string", "targetAFR": "string", "suggestion": "string", "reason": "string" }],
    "ignitionAdjustments": [{ "rpmRange": "string", "loadCondition": "string", "suggestion": "string", "reason": "string" }],
    "otherObservations": [{ "observation": "string", "recommendation": "string" }]
}"#;

/// Injector duty above which the model is asked to flag a problem (%)
pub const MAX_SAFE_INJECTOR_DUTY: f64 = 85.0;

/// Induction type of the engine being tuned
#[derive(
    AsRefStr, Clone, Copy, Debug, Default, Display, EnumString, PartialEq, Eq, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum EngineType {
    /// Naturally aspirated
    #[default]
    Na,
    /// Turbocharged or supercharged
    Boosted,
}

impl EngineType {
    pub fn is_boosted(&self) -> bool {
        matches!(self, EngineType::Boosted)
    }

    pub fn description(&self) -> &'static str {
        match self {
            EngineType::Na => "Naturally Aspirated",
            EngineType::Boosted => "Boosted (Forced Induction)",
        }
    }

    /// Target AFR band at wide-open throttle
    pub fn target_wot_afr(&self) -> &'static str {
        match self {
            EngineType::Na => "12.8-13.2",
            EngineType::Boosted => "11.0-11.5",
        }
    }
}

/// User's description of the engine hardware
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HardwareSetup {
    pub engine_type: EngineType,
    /// Free-text engine details (displacement, cams, injectors, ...)
    pub engine_setup: String,
    /// Free-text turbo or induction details
    pub turbo_setup: String,
}

impl HardwareSetup {
    fn engine_details(&self) -> &str {
        if self.engine_setup.trim().is_empty() {
            "Not specified."
        } else {
            self.engine_setup.trim()
        }
    }

    fn induction_details(&self) -> &str {
        if !self.turbo_setup.trim().is_empty() {
            self.turbo_setup.trim()
        } else if self.engine_type.is_boosted() {
            "Boosted setup not specified."
        } else {
            "Naturally Aspirated."
        }
    }
}

/// A validated datalog ready to be sent for analysis
#[derive(Clone, Debug)]
pub struct AnalysisRequest {
    /// Raw CSV text as supplied by the user or the simulator
    pub csv: String,
    pub setup: HardwareSetup,
    /// Per-channel summaries of the running samples
    pub channels: Vec<ChannelSummary>,
    /// Number of running samples in the log
    pub samples: usize,
}

impl AnalysisRequest {
    /// Validate `csv` and build a request from it.
    ///
    /// Fails when the text is not a datalog or when no running sample
    /// survives filtering, so analysis is never requested on empty data.
    pub fn new(csv: impl Into<String>, setup: HardwareSetup) -> Result<Self, AnalysisError> {
        let csv = csv.into();
        let log = Datalog::parse(&csv)?;
        if log.is_empty() {
            return Err(AnalysisError::EmptyDatalog);
        }

        Ok(Self {
            channels: log.summarize(),
            samples: log.len(),
            csv,
            setup,
        })
    }

    /// Generate the prompt text
    pub fn to_prompt_text(&self) -> String {
        let engine_type = self.setup.engine_type;
        let mut prompt = String::new();

        prompt.push_str(
            "You are an expert engine tuner for Hondata systems. Your task is to analyze the \
             provided CSV datalog based on the user's hardware.\n",
        );
        prompt.push_str("Provide actionable tuning advice for the Hondata SManager software.\n");
        prompt.push_str(
            "Your entire response must be a single, valid JSON object, without any markdown \
             formatting, comments, or extra text.\n",
        );
        prompt.push_str("The JSON object must conform to this structure: ");
        prompt.push_str(RESPONSE_SCHEMA);
        prompt.push_str("\n\n");

        prompt.push_str("Tuning Goals:\n");
        prompt.push_str("- Safety first, then performance.\n");
        prompt.push_str("- Idle/Cruise AFR: ~14.7\n");
        prompt.push_str(&format!(
            "- WOT AFR for {}: {}\n",
            engine_type.description(),
            engine_type.target_wot_afr()
        ));
        prompt.push_str("- Identify risky ignition timing.\n");
        prompt.push_str(&format!(
            "- Check for high injector duty cycle (>{:.0}%).\n",
            MAX_SAFE_INJECTOR_DUTY
        ));
        prompt.push_str("- Correlate issues with the user's provided hardware.\n\n");

        prompt.push_str("User Hardware Information:\n");
        prompt.push_str(&format!(
            "- Engine Details: {}\n",
            self.setup.engine_details()
        ));
        prompt.push_str(&format!(
            "- Turbo/Induction Setup: {}\n\n",
            self.setup.induction_details()
        ));

        prompt.push_str(&format!("CHANNEL SUMMARY ({} samples):\n", self.samples));
        for ch in &self.channels {
            prompt.push_str(&format!(
                "- {}: min={:.2} max={:.2} avg={:.2} last={:.2}\n",
                ch.name, ch.min, ch.max, ch.avg, ch.last
            ));
        }
        prompt.push('\n');

        prompt.push_str("Analyze this datalog:\n```csv\n");
        prompt.push_str(self.csv.trim_end());
        prompt.push_str("\n```\n");

        prompt
    }
}
