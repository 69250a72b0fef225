//! Tests for the analysis flow
//!
//! Tests cover:
//! - Provider prerequisites
//! - Offline backend suggestions
//! - Reply extraction and parsing

#[path = "../common/mod.rs"]
mod common;

use std::cell::Cell;

use common::simulated;
use hondatune::analysis::{
    extract_json, parse_suggestions, AnalysisBackend, AnalysisError, AnalysisRequest, Analyst,
    EngineType, HardwareSetup, OfflineBackend,
};
use hondatune::settings::{AiProvider, AiSettings};
use hondatune::simulator::Scenario;
use tempfile::NamedTempFile;

/// Backend that counts calls and replies with fixed text
struct ScriptedBackend {
    reply: Result<String, String>,
    calls: Cell<usize>,
}

impl ScriptedBackend {
    fn replying(reply: &str) -> Self {
        Self {
            reply: Ok(reply.to_string()),
            calls: Cell::new(0),
        }
    }

    fn failing(message: &str) -> Self {
        Self {
            reply: Err(message.to_string()),
            calls: Cell::new(0),
        }
    }
}

impl AnalysisBackend for ScriptedBackend {
    fn name(&self) -> &str {
        "scripted"
    }

    fn complete(&self, _request: &AnalysisRequest) -> Result<String, AnalysisError> {
        self.calls.set(self.calls.get() + 1);
        self.reply.clone().map_err(AnalysisError::Backend)
    }
}

fn request(engine_type: EngineType) -> AnalysisRequest {
    AnalysisRequest::new(
        simulated(Scenario::LeanWideOpenThrottle),
        HardwareSetup {
            engine_type,
            ..HardwareSetup::default()
        },
    )
    .unwrap()
}

fn cloud_settings() -> AiSettings {
    let mut settings = AiSettings::new();
    settings.set_gemini_key("AIza-test").unwrap();
    settings
}

// ============================================
// Prerequisite Tests
// ============================================

#[test]
fn test_cloud_without_key_never_calls_backend() {
    let backend = ScriptedBackend::replying("{}");
    let err = Analyst::new(&AiSettings::new())
        .run(&request(EngineType::Na), &backend)
        .unwrap_err();

    assert!(matches!(err, AnalysisError::MissingApiKey));
    assert_eq!(backend.calls.get(), 0);
}

#[test]
fn test_blank_key_from_file_never_calls_backend() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("settings.json");
    std::fs::write(&path, r#"{"provider": "cloud", "gemini_api_key": ""}"#).unwrap();
    let settings = AiSettings::load_from(&path);

    let backend = ScriptedBackend::replying("{}");
    let err = Analyst::new(&settings)
        .run(&request(EngineType::Na), &backend)
        .unwrap_err();

    assert!(matches!(err, AnalysisError::MissingApiKey));
    assert_eq!(backend.calls.get(), 0);
}

#[test]
fn test_local_without_model_never_calls_backend() {
    let mut settings = AiSettings::new();
    settings.set_provider(AiProvider::Local);

    let backend = ScriptedBackend::replying("{}");
    let err = Analyst::new(&settings)
        .run(&request(EngineType::Na), &backend)
        .unwrap_err();

    assert!(matches!(err, AnalysisError::ModelNotFound(None)));
    assert_eq!(backend.calls.get(), 0);
}

#[test]
fn test_local_with_model_on_disk() {
    let model = NamedTempFile::new().unwrap();
    let mut settings = AiSettings::new();
    settings.set_provider(AiProvider::Local);
    settings.set_local_model_path(model.path());

    assert!(Analyst::new(&settings).check_ready().is_ok());
}

// ============================================
// Offline Backend Tests
// ============================================

#[test]
fn test_offline_suggestions_follow_engine_type() {
    let settings = cloud_settings();
    let analyst = Analyst::new(&settings);

    let na = analyst.run(&request(EngineType::Na), &OfflineBackend).unwrap();
    assert!(na.summary.contains("naturally aspirated"));
    assert_eq!(na.fuel_adjustments[0].target_afr.as_deref(), Some("13.0"));

    let boosted = analyst
        .run(&request(EngineType::Boosted), &OfflineBackend)
        .unwrap();
    assert!(boosted.summary.contains("boosted"));
    assert_eq!(boosted.fuel_adjustments[0].target_afr.as_deref(), Some("11.5"));

    assert_eq!(na.ignition_adjustments, boosted.ignition_adjustments);
    assert_eq!(na.ignition_adjustments[0].current_afr, None);
}

#[test]
fn test_offline_reply_is_valid_json() {
    let reply = OfflineBackend.complete(&request(EngineType::Na)).unwrap();
    let value: serde_json::Value = serde_json::from_str(&reply).unwrap();

    assert!(value["fuelAdjustments"][0]["currentAFR"].is_string());
    assert!(value["ignitionAdjustments"][0].get("currentAFR").is_none());
}

// ============================================
// Reply Handling Tests
// ============================================

#[test]
fn test_reply_with_prose_and_fence() {
    let settings = cloud_settings();
    let backend = ScriptedBackend::replying(
        "Here is my analysis.\n```json\n{\"summary\": \"Lean up top\", \"fuelAdjustments\": []}\n```\nDrive safe!",
    );

    let suggestions = Analyst::new(&settings)
        .run(&request(EngineType::Na), &backend)
        .unwrap();
    assert_eq!(suggestions.summary, "Lean up top");
    assert_eq!(backend.calls.get(), 1);
}

#[test]
fn test_backend_failure_propagates() {
    let settings = cloud_settings();
    let backend = ScriptedBackend::failing("connection refused");

    let err = Analyst::new(&settings)
        .run(&request(EngineType::Na), &backend)
        .unwrap_err();
    assert!(matches!(err, AnalysisError::Backend(ref m) if m == "connection refused"));
}

#[test]
fn test_reported_error_object() {
    let err = parse_suggestions("```json\n{\"error\": \"quota exceeded\"}\n```").unwrap_err();
    assert_eq!(err.to_string(), "AI reported an error: quota exceeded");
}

#[test]
fn test_extract_json_prefers_fenced_block() {
    let reply = "{\"ignored\": true}\n```json\n{\"summary\": \"x\"}\n```";
    assert_eq!(extract_json(reply), "{\"summary\": \"x\"}");
}
