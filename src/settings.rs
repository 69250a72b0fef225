//! AI configuration persistence.
//!
//! Holds the provider selection and credentials used at analysis time. The
//! settings value is created at startup, changed only through its setters and
//! passed explicitly to whatever issues an analysis request.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use strum::{AsRefStr, Display, EnumString};
use thiserror::Error;

/// Where tuning analysis runs
#[derive(
    AsRefStr, Clone, Copy, Debug, Default, Display, EnumString, PartialEq, Eq, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum AiProvider {
    /// Hosted large-language-model API
    #[default]
    Cloud,
    /// Model running on this machine
    Local,
}

/// Errors from loading, saving or updating settings
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Failed to access settings file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize settings: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Invalid API key")]
    InvalidApiKey,

    #[error("Invalid provider: {0}")]
    InvalidProvider(String),
}

/// What the current settings allow, without exposing the key itself
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AiConfigStatus {
    pub has_gemini_key: bool,
    pub has_local_model: bool,
    pub current_provider: AiProvider,
}

/// AI settings that persist across sessions
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AiSettings {
    /// Settings file version for migration support
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    provider: AiProvider,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    gemini_api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    local_model_path: Option<PathBuf>,
}

fn default_version() -> u32 {
    1
}

impl Default for AiSettings {
    fn default() -> Self {
        Self {
            version: 1,
            provider: AiProvider::default(),
            gemini_api_key: None,
            local_model_path: None,
        }
    }
}

impl AiSettings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the config directory path
    pub fn get_config_dir() -> Option<PathBuf> {
        #[cfg(target_os = "macos")]
        {
            dirs::data_dir().map(|p| p.join("HondaTune"))
        }
        #[cfg(target_os = "windows")]
        {
            dirs::config_dir().map(|p| p.join("HondaTune"))
        }
        #[cfg(not(any(target_os = "macos", target_os = "windows")))]
        {
            dirs::config_dir().map(|p| p.join("hondatune"))
        }
    }

    /// Get the path to the settings JSON file
    pub fn get_settings_path() -> Option<PathBuf> {
        Self::get_config_dir().map(|p| p.join("settings.json"))
    }

    /// Load settings from the default location
    pub fn load() -> Self {
        match Self::get_settings_path() {
            Some(path) => Self::load_from(&path),
            None => Self::new(),
        }
    }

    /// Load settings from `path`, falling back to defaults if the file is
    /// missing or unreadable
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            return Self::new();
        }

        match std::fs::read_to_string(path) {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(settings) => settings,
                Err(e) => {
                    tracing::warn!("Ignoring malformed settings file {:?}: {}", path, e);
                    Self::new()
                }
            },
            Err(e) => {
                tracing::warn!("Failed to read settings file {:?}: {}", path, e);
                Self::new()
            }
        }
    }

    /// Save settings to the default location
    pub fn save(&self) -> Result<PathBuf, SettingsError> {
        let path = Self::get_settings_path().ok_or(SettingsError::NoConfigDir)?;
        self.save_to(&path)?;
        Ok(path)
    }

    /// Save settings to `path`, creating parent directories as needed
    pub fn save_to(&self, path: &Path) -> Result<(), SettingsError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;

        tracing::info!("Saved settings to {:?}", path);
        Ok(())
    }

    pub fn provider(&self) -> AiProvider {
        self.provider
    }

    /// Configured key, ignoring a blank value from a hand-edited file
    pub fn gemini_api_key(&self) -> Option<&str> {
        self.gemini_api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
    }

    pub fn has_gemini_key(&self) -> bool {
        self.gemini_api_key().is_some()
    }

    pub fn local_model_path(&self) -> Option<&Path> {
        self.local_model_path.as_deref()
    }

    pub fn set_gemini_key(&mut self, api_key: &str) -> Result<(), SettingsError> {
        let api_key = api_key.trim();
        if api_key.is_empty() {
            return Err(SettingsError::InvalidApiKey);
        }

        self.gemini_api_key = Some(api_key.to_string());
        tracing::info!("Gemini API key configured");
        Ok(())
    }

    pub fn set_provider(&mut self, provider: AiProvider) {
        self.provider = provider;
        tracing::info!("AI provider set to: {}", provider);
    }

    /// Set the provider from its name (`cloud` or `local`)
    pub fn set_provider_name(&mut self, name: &str) -> Result<(), SettingsError> {
        let provider = name
            .parse::<AiProvider>()
            .map_err(|_| SettingsError::InvalidProvider(name.to_string()))?;
        self.set_provider(provider);
        Ok(())
    }

    pub fn set_local_model_path(&mut self, path: impl Into<PathBuf>) {
        self.local_model_path = Some(path.into());
    }

    /// Whether a local model is configured and present on disk
    pub fn has_local_model(&self) -> bool {
        self.local_model_path
            .as_deref()
            .is_some_and(|p| p.exists())
    }

    pub fn status(&self) -> AiConfigStatus {
        AiConfigStatus {
            has_gemini_key: self.has_gemini_key(),
            has_local_model: self.has_local_model(),
            current_provider: self.provider,
        }
    }
}
