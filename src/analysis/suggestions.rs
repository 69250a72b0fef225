//! Structured tuning suggestions and parsing of model replies.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

use super::AnalysisError;

/// One suggested change to a fuel or ignition table region
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Adjustment {
    pub rpm_range: String,
    pub load_condition: String,
    pub suggestion: String,
    pub reason: String,
    /// Only present on fuel adjustments
    #[serde(rename = "currentAFR", default, skip_serializing_if = "Option::is_none")]
    pub current_afr: Option<String>,
    #[serde(rename = "targetAFR", default, skip_serializing_if = "Option::is_none")]
    pub target_afr: Option<String>,
}

/// Finding that is not tied to a table cell
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Observation {
    pub observation: String,
    pub recommendation: String,
}

/// Complete analysis result
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TuningSuggestions {
    pub summary: String,
    #[serde(default)]
    pub fuel_adjustments: Vec<Adjustment>,
    #[serde(default)]
    pub ignition_adjustments: Vec<Adjustment>,
    #[serde(default)]
    pub other_observations: Vec<Observation>,
}

impl TuningSuggestions {
    pub fn is_empty(&self) -> bool {
        self.fuel_adjustments.is_empty()
            && self.ignition_adjustments.is_empty()
            && self.other_observations.is_empty()
    }
}

fn write_adjustment(f: &mut fmt::Formatter<'_>, adjustment: &Adjustment) -> fmt::Result {
    writeln!(
        f,
        "  {} @ {}",
        adjustment.rpm_range, adjustment.load_condition
    )?;
    if let (Some(current), Some(target)) = (&adjustment.current_afr, &adjustment.target_afr) {
        writeln!(f, "    AFR: {} -> {}", current, target)?;
    }
    writeln!(f, "    Suggestion: {}", adjustment.suggestion)?;
    writeln!(f, "    Reason: {}", adjustment.reason)
}

impl fmt::Display for TuningSuggestions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Summary: {}", self.summary)?;

        if !self.fuel_adjustments.is_empty() {
            writeln!(f, "\nFuel adjustments:")?;
            for adjustment in &self.fuel_adjustments {
                write_adjustment(f, adjustment)?;
            }
        }

        if !self.ignition_adjustments.is_empty() {
            writeln!(f, "\nIgnition adjustments:")?;
            for adjustment in &self.ignition_adjustments {
                write_adjustment(f, adjustment)?;
            }
        }

        if !self.other_observations.is_empty() {
            writeln!(f, "\nOther observations:")?;
            for observation in &self.other_observations {
                writeln!(f, "  {}", observation.observation)?;
                writeln!(f, "    Recommendation: {}", observation.recommendation)?;
            }
        }

        Ok(())
    }
}

fn fenced_json_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| {
        Regex::new(r"(?s)```json\s*(.*?)\s*```").expect("Failed to compile regex")
    })
}

/// Pull the JSON object out of a model reply.
///
/// A ```json fenced block wins; otherwise the span from the first `{` to the
/// last `}`; otherwise the reply unchanged.
pub fn extract_json(reply: &str) -> &str {
    if let Some(captures) = fenced_json_regex().captures(reply) {
        if let Some(body) = captures.get(1) {
            if !body.as_str().is_empty() {
                return body.as_str();
            }
        }
    }

    if let (Some(first), Some(last)) = (reply.find('{'), reply.rfind('}')) {
        if last > first {
            return &reply[first..=last];
        }
    }

    reply
}

/// Parse a raw model reply into suggestions
pub fn parse_suggestions(reply: &str) -> Result<TuningSuggestions, AnalysisError> {
    if reply.trim().is_empty() {
        return Err(AnalysisError::InvalidResponse(
            "response was empty".to_string(),
        ));
    }

    let json = extract_json(reply);
    let value: serde_json::Value = serde_json::from_str(json).map_err(|e| {
        tracing::debug!("Unparseable reply: {}", reply);
        AnalysisError::InvalidResponse(e.to_string())
    })?;

    if let Some(message) = value.get("error").and_then(|e| e.as_str()) {
        return Err(AnalysisError::Reported(message.to_string()));
    }

    serde_json::from_value(value).map_err(|e| AnalysisError::InvalidResponse(e.to_string()))
}
