//! Configuration loading.
//!
//! Configuration is loaded from a TOML file with the following resolution order:
//! 1. `--config <path>` (CLI flag)
//! 2. `~/.textlabel/config.toml` (user)
//! 3. built-in defaults
//!
//! The API key is resolved separately:
//! 1. `~/.textlabel/secrets.toml` (user, must be 0600)
//! 2. `OPENAI_API_KEY` from the environment, after loading a `.env` file from
//!    the working directory

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::debug;

use crate::extract::FallbackPolicy;
use crate::types::ChatOptions;
use crate::{Error, Result};

/// Environment variable holding the API key.
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Tool configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub batch: BatchConfig,
    #[serde(default)]
    pub fallback: FallbackPolicy,
    #[serde(default)]
    pub report: ReportConfig,
}

/// Model service settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ModelConfig {
    /// Model name (default: gpt-4o-mini).
    #[serde(default = "default_model")]
    pub name: String,
    /// Service base URL (default: https://api.openai.com).
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Sampling temperature (default: 0.1).
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Request timeout in seconds (default: 60).
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            name: default_model(),
            base_url: default_base_url(),
            temperature: default_temperature(),
            timeout_secs: default_timeout(),
        }
    }
}

impl ModelConfig {
    /// Chat options for extraction requests.
    pub fn chat_options(&self) -> ChatOptions {
        ChatOptions::new(&self.name).temperature(self.temperature)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_base_url() -> String {
    crate::providers::openai::DEFAULT_BASE_URL.to_string()
}

fn default_temperature() -> f32 {
    0.1
}

fn default_timeout() -> u64 {
    60
}

/// Batch pacing.
#[derive(Debug, Clone, Deserialize)]
pub struct BatchConfig {
    /// Pause after every this many calls; 0 disables pausing (default: 3).
    #[serde(default = "default_pause_every")]
    pub pause_every: usize,
    /// Length of each pause in seconds (default: 2).
    #[serde(default = "default_pause_secs")]
    pub pause_secs: u64,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            pause_every: default_pause_every(),
            pause_secs: default_pause_secs(),
        }
    }
}

impl BatchConfig {
    pub fn pause(&self) -> Duration {
        Duration::from_secs(self.pause_secs)
    }
}

fn default_pause_every() -> usize {
    3
}

fn default_pause_secs() -> u64 {
    2
}

/// Report output.
#[derive(Debug, Clone, Deserialize)]
pub struct ReportConfig {
    /// Directory for charts and the statistics report (default: ner_analysis).
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// Entities shown in the top-entities chart (default: 15).
    #[serde(default = "default_top_n")]
    pub top_n: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            top_n: default_top_n(),
        }
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("ner_analysis")
}

fn default_top_n() -> usize {
    15
}

impl Config {
    /// Load configuration from the standard locations.
    ///
    /// An explicit path must exist. Without one, `~/.textlabel/config.toml`
    /// is used when present and defaults otherwise.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        match Self::resolve_config_path(explicit_path)? {
            Some(path) => Self::load_from_file(&path),
            None => {
                debug!("no config file found, using defaults");
                Ok(Config::default())
            }
        }
    }

    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            Error::Configuration(format!("Failed to read config file {path:?}: {e}"))
        })?;
        toml::from_str(&content).map_err(|e| {
            Error::Configuration(format!("Failed to parse config file {path:?}: {e}"))
        })
    }

    fn resolve_config_path(explicit_path: Option<&Path>) -> Result<Option<PathBuf>> {
        if let Some(path) = explicit_path {
            if path.exists() {
                return Ok(Some(path.to_path_buf()));
            }
            return Err(Error::Configuration(format!(
                "Config file not found: {path:?}"
            )));
        }

        if let Some(home) = dirs::home_dir() {
            let user_config = home.join(".textlabel").join("config.toml");
            if user_config.exists() {
                return Ok(Some(user_config));
            }
        }

        Ok(None)
    }
}

/// Secrets file contents.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Secrets {
    #[serde(default)]
    pub openai: Option<ApiKeySecret>,
}

/// A single API key secret.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiKeySecret {
    pub api_key: String,
}

impl Secrets {
    /// Load secrets from `~/.textlabel/secrets.toml` with a permission check.
    ///
    /// Returns empty secrets if no file exists (the key may come from the
    /// environment).
    pub fn load() -> Result<Self> {
        if let Some(home) = dirs::home_dir() {
            let user_secrets = home.join(".textlabel").join("secrets.toml");
            if user_secrets.exists() {
                Self::check_permissions(&user_secrets)?;
                return Self::load_from_file(&user_secrets);
            }
        }

        Ok(Secrets::default())
    }

    fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            Error::Configuration(format!("Failed to read secrets file {path:?}: {e}"))
        })?;
        toml::from_str(&content).map_err(|e| {
            Error::Configuration(format!("Failed to parse secrets file {path:?}: {e}"))
        })
    }

    /// Check that the secrets file has secure permissions (0600 or 0400).
    #[cfg(unix)]
    fn check_permissions(path: &Path) -> Result<()> {
        use std::os::unix::fs::PermissionsExt;

        let metadata = fs::metadata(path).map_err(|e| {
            Error::Configuration(format!("Failed to stat secrets file {path:?}: {e}"))
        })?;

        let mode = metadata.permissions().mode();
        // Reject if group or other bits are set
        if mode & 0o077 != 0 {
            return Err(Error::Configuration(format!(
                "Secrets file {path:?} has insecure permissions {:o}. Must be 0600 or 0400.",
                mode & 0o777
            )));
        }

        Ok(())
    }

    #[cfg(not(unix))]
    fn check_permissions(_path: &Path) -> Result<()> {
        Ok(())
    }

    /// API key from the secrets file, falling back to the environment.
    ///
    /// A `.env` file in the working directory is loaded first; variables that
    /// are already set are not overridden.
    pub fn api_key(&self) -> Option<String> {
        self.api_key_or_else(env_api_key)
    }

    /// Like [`Secrets::api_key`], but a missing key is a configuration error.
    pub fn require_api_key(&self) -> Result<String> {
        self.require_api_key_or_else(env_api_key)
    }

    /// The secrets file key, or whatever `lookup` finds. Blank keys count as
    /// missing; `lookup` is only called without a secrets file key.
    fn api_key_or_else(&self, lookup: impl FnOnce() -> Option<String>) -> Option<String> {
        if let Some(secret) = &self.openai {
            return Some(secret.api_key.clone());
        }
        lookup().filter(|k| !k.trim().is_empty())
    }

    fn require_api_key_or_else(&self, lookup: impl FnOnce() -> Option<String>) -> Result<String> {
        self.api_key_or_else(lookup).ok_or_else(|| {
            Error::Configuration(format!(
                "{API_KEY_ENV} is not set. Export it, add it to a .env file, or put it in ~/.textlabel/secrets.toml"
            ))
        })
    }
}

fn env_api_key() -> Option<String> {
    if let Ok(path) = dotenvy::dotenv() {
        debug!(path = %path.display(), "loaded .env file");
    }
    std::env::var(API_KEY_ENV).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_expected_values() {
        let config = Config::default();
        assert_eq!(config.model.name, "gpt-4o-mini");
        assert_eq!(config.model.base_url, "https://api.openai.com");
        assert!((config.model.temperature - 0.1).abs() < f32::EPSILON);
        assert_eq!(config.batch.pause_every, 3);
        assert_eq!(config.batch.pause(), Duration::from_secs(2));
        assert_eq!(config.fallback.service_error_confidence, 0.0);
        assert_eq!(config.fallback.parse_error_confidence, 0.5);
        assert_eq!(config.report.output_dir, PathBuf::from("ner_analysis"));
        assert_eq!(config.report.top_n, 15);
    }

    #[test]
    fn parse_minimal_config() {
        let toml = r#"
            [model]
            name = "gpt-4o"
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.model.name, "gpt-4o");
        // Defaults preserved
        assert_eq!(config.model.timeout_secs, 60);
        assert_eq!(config.batch.pause_every, 3);
    }

    #[test]
    fn parse_full_config() {
        let toml = r#"
            [model]
            name = "local-model"
            base_url = "http://localhost:8080"
            temperature = 0.0
            timeout_secs = 5

            [batch]
            pause_every = 10
            pause_secs = 1

            [fallback]
            service_error_confidence = 0.1
            parse_error_confidence = 0.2

            [report]
            output_dir = "out"
            top_n = 5
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.model.base_url, "http://localhost:8080");
        assert_eq!(config.model.timeout(), Duration::from_secs(5));
        assert_eq!(config.batch.pause_every, 10);
        assert_eq!(config.fallback.service_error_confidence, 0.1);
        assert_eq!(config.fallback.parse_error_confidence, 0.2);
        assert_eq!(config.report.output_dir, PathBuf::from("out"));
        assert_eq!(config.report.top_n, 5);

        let options = config.model.chat_options();
        assert_eq!(options.model, "local-model");
        assert_eq!(options.temperature, Some(0.0));
    }

    #[test]
    fn parse_secrets() {
        let toml = r#"
            [openai]
            api_key = "sk-test-key"
        "#;
        let secrets: Secrets = toml::from_str(toml).unwrap();
        assert_eq!(secrets.openai.as_ref().unwrap().api_key, "sk-test-key");
    }

    #[test]
    fn api_key_prefers_secrets_file() {
        let secrets = Secrets {
            openai: Some(ApiKeySecret {
                api_key: "from-file".to_string(),
            }),
        };
        assert_eq!(secrets.api_key(), Some("from-file".to_string()));
        assert_eq!(secrets.require_api_key().unwrap(), "from-file");
        assert_eq!(
            secrets.api_key_or_else(|| panic!("environment consulted")),
            Some("from-file".to_string())
        );
    }

    #[test]
    fn missing_api_key_is_configuration_error() {
        let secrets = Secrets::default();

        let err = secrets.require_api_key_or_else(|| None).unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
        assert!(err.to_string().contains(API_KEY_ENV), "{err}");

        let err = secrets
            .require_api_key_or_else(|| Some("  ".to_string()))
            .unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }

    #[test]
    fn api_key_falls_back_to_environment_lookup() {
        let key = Secrets::default().require_api_key_or_else(|| Some("sk-env".to_string()));
        assert_eq!(key.unwrap(), "sk-env");
    }

    #[test]
    fn config_not_found_returns_error() {
        let result = Config::load(Some(Path::new("/nonexistent/config.toml")));
        let err = result.unwrap_err().to_string();
        assert!(err.contains("Config file not found"));
    }

    #[test]
    fn load_from_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[batch]\npause_every = 0\n").unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.batch.pause_every, 0);
        assert_eq!(config.model.name, "gpt-4o-mini");
    }

    #[test]
    fn invalid_toml_is_configuration_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[model\nname = ").unwrap();

        let err = Config::load(Some(&path)).unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }
}
