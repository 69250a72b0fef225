//! Tuning analysis request flow.
//!
//! An analysis turns a validated datalog plus the user's hardware description
//! into a prompt, hands it to an [`AnalysisBackend`], and parses the reply into
//! [`TuningSuggestions`]. The AI configuration is passed in explicitly as an
//! [`AiSettings`] value and checked before any backend is called.
//!
//! Backends that talk to hosted or local inference servers live outside this
//! crate; [`OfflineBackend`] answers with canned suggestions so the whole flow
//! can run without network access.

pub mod prompt;
pub mod suggestions;

pub use prompt::{AnalysisRequest, EngineType, HardwareSetup};
pub use suggestions::{
    extract_json, parse_suggestions, Adjustment, Observation, TuningSuggestions,
};

use std::path::PathBuf;
use thiserror::Error;

use crate::datalog::DatalogError;
use crate::settings::{AiProvider, AiSettings};

/// Errors that can occur during analysis
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// The supplied text is not a usable datalog
    #[error(transparent)]
    Datalog(#[from] DatalogError),

    /// The datalog has no running samples to analyze
    #[error("Please upload or generate a datalog file first.")]
    EmptyDatalog,

    #[error("Gemini API key not configured")]
    MissingApiKey,

    #[error("Local AI model not found{}", .0.as_ref().map(|p| format!(": {}", p.display())).unwrap_or_default())]
    ModelNotFound(Option<PathBuf>),

    /// The backend failed to produce a reply
    #[error("AI backend error: {0}")]
    Backend(String),

    /// The reply could not be parsed into suggestions
    #[error("AI response was invalid or could not be parsed: {0}")]
    InvalidResponse(String),

    /// The reply was an error object
    #[error("AI reported an error: {0}")]
    Reported(String),
}

/// Something that can answer an analysis prompt with raw text
pub trait AnalysisBackend {
    /// Name for logs
    fn name(&self) -> &str;

    /// Produce the model's raw reply for `request`
    fn complete(&self, request: &AnalysisRequest) -> Result<String, AnalysisError>;
}

/// Backend that answers with fixed suggestions for the engine type
#[derive(Clone, Copy, Debug, Default)]
pub struct OfflineBackend;

impl OfflineBackend {
    pub fn suggestions(engine_type: EngineType) -> TuningSuggestions {
        let boosted = engine_type.is_boosted();

        TuningSuggestions {
            summary: if boosted {
                "Your boosted setup shows good overall health with minor tuning opportunities for optimization."
            } else {
                "Your naturally aspirated setup is running well with some areas for fine-tuning."
            }
            .to_string(),
            fuel_adjustments: vec![Adjustment {
                rpm_range: "3000-4500 RPM".to_string(),
                load_condition: "Wide Open Throttle".to_string(),
                current_afr: Some("12.2".to_string()),
                target_afr: Some(if boosted { "11.5" } else { "13.0" }.to_string()),
                suggestion: if boosted {
                    "Slightly richen mixture"
                } else {
                    "Lean out slightly for better efficiency"
                }
                .to_string(),
                reason: if boosted {
                    "Current AFR is on the safe side but could use more fuel for power"
                } else {
                    "Current AFR is slightly rich for NA application"
                }
                .to_string(),
            }],
            ignition_adjustments: vec![Adjustment {
                rpm_range: "4500-6500 RPM".to_string(),
                load_condition: "High Load".to_string(),
                suggestion: "Add 1-2 degrees timing".to_string(),
                reason: "Conservative timing leaves power on the table".to_string(),
                current_afr: None,
                target_afr: None,
            }],
            other_observations: vec![Observation {
                observation: "Injector duty cycle peaks at 75%".to_string(),
                recommendation: "Good headroom remaining, no immediate concerns".to_string(),
            }],
        }
    }
}

impl AnalysisBackend for OfflineBackend {
    fn name(&self) -> &str {
        "offline"
    }

    fn complete(&self, request: &AnalysisRequest) -> Result<String, AnalysisError> {
        serde_json::to_string(&Self::suggestions(request.setup.engine_type))
            .map_err(|e| AnalysisError::Backend(e.to_string()))
    }
}

/// Runs analysis requests against the configured provider
pub struct Analyst<'a> {
    settings: &'a AiSettings,
}

impl<'a> Analyst<'a> {
    pub fn new(settings: &'a AiSettings) -> Self {
        Self { settings }
    }

    /// Check that the current provider has what it needs
    pub fn check_ready(&self) -> Result<(), AnalysisError> {
        match self.settings.provider() {
            AiProvider::Cloud => {
                if !self.settings.has_gemini_key() {
                    return Err(AnalysisError::MissingApiKey);
                }
            }
            AiProvider::Local => {
                if !self.settings.has_local_model() {
                    return Err(AnalysisError::ModelNotFound(
                        self.settings.local_model_path().map(PathBuf::from),
                    ));
                }
            }
        }
        Ok(())
    }

    /// Run `request` through `backend` and parse the reply
    pub fn run(
        &self,
        request: &AnalysisRequest,
        backend: &dyn AnalysisBackend,
    ) -> Result<TuningSuggestions, AnalysisError> {
        self.check_ready()?;

        tracing::info!(
            "Running AI analysis with provider {} via {} backend ({} samples)",
            self.settings.provider(),
            backend.name(),
            request.samples
        );

        let reply = backend.complete(request).map_err(|e| {
            tracing::error!("AI analysis failed: {}", e);
            e
        })?;

        parse_suggestions(&reply)
    }
}
