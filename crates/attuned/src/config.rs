//! Configuration management for attuned.
//!
//! Loads settings from a TOML file (or defaults), then applies environment
//! overrides. The result is read once at startup and never mutated.

use crate::pipeline::PipelineConfig;
use crate::retry::RetryPolicy;
use anyhow::{Context, Result};
use attune_shared::AttuneError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Config file path
pub const CONFIG_PATH: &str = "/etc/attune/config.toml";

/// Default config file path for fallback
pub const DEFAULT_CONFIG_PATH: &str = "/var/lib/attune/config.toml";

/// Environment variable naming an explicit config file
pub const CONFIG_ENV: &str = "ATTUNE_CONFIG";

/// Generation service credential
pub const GOOGLE_API_KEY_ENV: &str = "GOOGLE_API_KEY";

/// Optional classification service token
pub const HF_API_TOKEN_ENV: &str = "HF_API_TOKEN";

pub const LISTEN_ENV: &str = "ATTUNE_LISTEN";
pub const MAX_ATTEMPTS_ENV: &str = "ATTUNE_MAX_ATTEMPTS";
pub const BACKOFF_BASE_ENV: &str = "ATTUNE_BACKOFF_BASE_MS";

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address to bind
    #[serde(default = "default_listen")]
    pub listen: String,

    /// Deadline for a whole pipeline run, in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Maximum request body size in bytes
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

fn default_listen() -> String {
    "127.0.0.1:5000".to_string()
}

fn default_request_timeout() -> u64 {
    // 10s classify + 5 x 30s generate + 15s backoff, plus slack
    180
}

fn default_max_body_bytes() -> usize {
    64 * 1024
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            request_timeout_secs: default_request_timeout(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

/// Emotion classification service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierConfig {
    #[serde(default = "default_classifier_endpoint")]
    pub endpoint: String,

    #[serde(default = "default_classifier_model")]
    pub model: String,

    #[serde(default = "default_classifier_timeout")]
    pub timeout_secs: u64,

    /// Bearer token, usually supplied through `HF_API_TOKEN`
    #[serde(default, skip_serializing)]
    pub api_token: Option<String>,
}

fn default_classifier_endpoint() -> String {
    "https://api-inference.huggingface.co".to_string()
}

fn default_classifier_model() -> String {
    "michellejieli/emotion_text_classifier".to_string()
}

fn default_classifier_timeout() -> u64 {
    10
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            endpoint: default_classifier_endpoint(),
            model: default_classifier_model(),
            timeout_secs: default_classifier_timeout(),
            api_token: None,
        }
    }
}

/// Text generation service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorConfig {
    #[serde(default = "default_generator_endpoint")]
    pub endpoint: String,

    #[serde(default = "default_generator_model")]
    pub model: String,

    /// Per-attempt timeout in seconds
    #[serde(default = "default_generator_timeout")]
    pub timeout_secs: u64,

    /// API key, supplied through `GOOGLE_API_KEY`
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,
}

fn default_generator_endpoint() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

fn default_generator_model() -> String {
    "gemini-1.5-flash-latest".to_string()
}

fn default_generator_timeout() -> u64 {
    30
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            endpoint: default_generator_endpoint(),
            model: default_generator_model(),
            timeout_secs: default_generator_timeout(),
            api_key: None,
        }
    }
}

/// Retry policy for generation calls
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Attempt ceiling, clamped to at least 1
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Delay after the first failed attempt; doubles each time
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,

    /// Scale each delay by a random factor in [0.5, 1.0]
    #[serde(default)]
    pub jitter: bool,

    /// Upper bound on a single delay
    #[serde(default)]
    pub max_delay_ms: Option<u64>,
}

fn default_max_attempts() -> u32 {
    5
}

fn default_base_delay_ms() -> u64 {
    1_000
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            base_delay_ms: default_base_delay_ms(),
            jitter: false,
            max_delay_ms: None,
        }
    }
}

impl RetryConfig {
    pub fn to_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts.max(1),
            base_delay: Duration::from_millis(self.base_delay_ms),
            jitter: self.jitter,
            max_delay: self.max_delay_ms.map(Duration::from_millis),
        }
    }
}

/// Full daemon configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub classifier: ClassifierConfig,

    #[serde(default)]
    pub generator: GeneratorConfig,

    #[serde(default)]
    pub retry: RetryConfig,
}

impl Config {
    /// Load config from file and process environment.
    ///
    /// Lookup order: `$ATTUNE_CONFIG`, `CONFIG_PATH`, `DEFAULT_CONFIG_PATH`,
    /// then built-in defaults.
    pub fn load() -> Result<Self> {
        let mut config = match std::env::var(CONFIG_ENV) {
            Ok(path) => Self::load_from_path(&path)?,
            Err(_) => Self::load_first(&[CONFIG_PATH, DEFAULT_CONFIG_PATH])?,
        };
        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Load the first config file that exists in `paths`.
    ///
    /// Absent files are skipped; a file that exists but fails to load is an
    /// error. Falls back to defaults when none exist.
    pub fn load_first<P: AsRef<Path>>(paths: &[P]) -> Result<Self> {
        for path in paths {
            let path = path.as_ref();
            if !path.exists() {
                debug!("No config at {}", path.display());
                continue;
            }
            return Self::load_from_path(path);
        }
        warn!("Config not found, using defaults");
        Ok(Config::default())
    }

    /// Load config from specific path
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Apply environment overrides using `lookup` to read variables.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<(), AttuneError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup(GOOGLE_API_KEY_ENV).filter(|v| !v.is_empty()) {
            self.generator.api_key = Some(key);
        }
        if let Some(token) = lookup(HF_API_TOKEN_ENV).filter(|v| !v.is_empty()) {
            self.classifier.api_token = Some(token);
        }
        if let Some(listen) = lookup(LISTEN_ENV).filter(|v| !v.is_empty()) {
            self.server.listen = listen;
        }
        if let Some(raw) = lookup(MAX_ATTEMPTS_ENV) {
            self.retry.max_attempts = raw.trim().parse().map_err(|_| {
                AttuneError::InvalidConfig(format!("{} must be an integer, got {:?}", MAX_ATTEMPTS_ENV, raw))
            })?;
        }
        if let Some(raw) = lookup(BACKOFF_BASE_ENV) {
            self.retry.base_delay_ms = raw.trim().parse().map_err(|_| {
                AttuneError::InvalidConfig(format!("{} must be an integer, got {:?}", BACKOFF_BASE_ENV, raw))
            })?;
        }
        Ok(())
    }

    /// Reject configurations the daemon cannot serve with.
    pub fn validate(&self) -> Result<(), AttuneError> {
        if self.generator.api_key.as_deref().map_or(true, str::is_empty) {
            return Err(AttuneError::MissingCredential(GOOGLE_API_KEY_ENV));
        }
        if self.server.request_timeout_secs == 0 {
            return Err(AttuneError::InvalidConfig(
                "server.request_timeout_secs must be greater than zero".to_string(),
            ));
        }
        let needed = self.worst_case_duration();
        if Duration::from_secs(self.server.request_timeout_secs) < needed {
            return Err(AttuneError::InvalidConfig(format!(
                "server.request_timeout_secs ({}) is shorter than the {}s a fully retried request can take",
                self.server.request_timeout_secs,
                needed.as_secs_f64().ceil()
            )));
        }
        Ok(())
    }

    /// Longest a single request can run when every external call times out
    /// and every generation attempt is used.
    pub fn worst_case_duration(&self) -> Duration {
        let policy = self.retry.to_policy();
        Duration::from_secs(self.classifier.timeout_secs)
            .saturating_add(
                Duration::from_secs(self.generator.timeout_secs).saturating_mul(policy.max_attempts),
            )
            .saturating_add(policy.total_backoff())
    }

    /// Immutable settings handed to the pipeline orchestrator.
    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            retry: self.retry.to_policy(),
            request_timeout: Duration::from_secs(self.server.request_timeout_secs),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server.listen, "127.0.0.1:5000");
        assert_eq!(config.classifier.model, "michellejieli/emotion_text_classifier");
        assert_eq!(config.generator.model, "gemini-1.5-flash-latest");
        assert_eq!(config.retry.max_attempts, 5);
        assert_eq!(config.retry.base_delay_ms, 1_000);
        assert!(!config.retry.jitter);
        assert!(config.retry.max_delay_ms.is_none());
    }

    #[test]
    fn test_parse_toml() {
        let toml_str = r#"
[generator]
model = "gemini-1.5-pro"

[retry]
max_attempts = 3
base_delay_ms = 250
jitter = true
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.generator.model, "gemini-1.5-pro");
        assert_eq!(config.retry.max_attempts, 3);
        assert_eq!(config.retry.base_delay_ms, 250);
        assert!(config.retry.jitter);
        // Defaults for missing fields
        assert_eq!(config.generator.timeout_secs, 30);
        assert_eq!(config.server.max_body_bytes, 64 * 1024);
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::default();
        config
            .apply_env_overrides(env(&[
                (GOOGLE_API_KEY_ENV, "secret"),
                (HF_API_TOKEN_ENV, "hf_token"),
                (LISTEN_ENV, "0.0.0.0:8080"),
                (MAX_ATTEMPTS_ENV, "2"),
                (BACKOFF_BASE_ENV, " 10 "),
            ]))
            .unwrap();
        assert_eq!(config.generator.api_key.as_deref(), Some("secret"));
        assert_eq!(config.classifier.api_token.as_deref(), Some("hf_token"));
        assert_eq!(config.server.listen, "0.0.0.0:8080");
        assert_eq!(config.retry.max_attempts, 2);
        assert_eq!(config.retry.base_delay_ms, 10);
    }

    #[test]
    fn test_env_override_rejects_garbage() {
        let mut config = Config::default();
        let err = config
            .apply_env_overrides(env(&[(MAX_ATTEMPTS_ENV, "five")]))
            .unwrap_err();
        assert!(matches!(err, AttuneError::InvalidConfig(_)));
    }

    #[test]
    fn test_validate_requires_api_key() {
        let config = Config::default();
        assert!(matches!(
            config.validate(),
            Err(AttuneError::MissingCredential(GOOGLE_API_KEY_ENV))
        ));

        let mut config = Config::default();
        config.generator.api_key = Some("key".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_retry_policy_clamps_attempts() {
        let mut retry = RetryConfig::default();
        retry.max_attempts = 0;
        assert_eq!(retry.to_policy().max_attempts, 1);
    }

    #[test]
    fn test_credentials_not_serialized() {
        let mut config = Config::default();
        config.generator.api_key = Some("secret".to_string());
        let out = toml::to_string_pretty(&config).unwrap();
        assert!(!out.contains("secret"));
    }

    #[test]
    fn test_load_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[server]\nlisten = \"127.0.0.1:9999\"\n").unwrap();

        let config = Config::load_from_path(&path).unwrap();
        assert_eq!(config.server.listen, "127.0.0.1:9999");
        assert_eq!(config.server.request_timeout_secs, 180);

        assert!(Config::load_from_path(dir.path().join("missing.toml")).is_err());
    }

    #[test]
    fn test_default_deadline_covers_retries() {
        let config = Config::default();
        assert_eq!(config.worst_case_duration(), Duration::from_secs(175));
        assert!(Duration::from_secs(config.server.request_timeout_secs) >= config.worst_case_duration());
    }

    #[test]
    fn test_validate_rejects_short_deadline() {
        let mut config = Config::default();
        config.generator.api_key = Some("key".to_string());
        config.server.request_timeout_secs = 90;
        assert!(matches!(config.validate(), Err(AttuneError::InvalidConfig(_))));

        config.server.request_timeout_secs = 175;
        assert!(config.validate().is_ok());

        config.retry.max_attempts = 6;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_first_fails_on_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let broken = dir.path().join("broken.toml");
        let good = dir.path().join("good.toml");
        fs::write(&broken, "[server\nlisten = ").unwrap();
        fs::write(&good, "[server]\nlisten = \"127.0.0.1:7000\"\n").unwrap();

        let err = Config::load_first(&[&broken, &good]).unwrap_err();
        assert!(format!("{:#}", err).contains("broken.toml"));
    }

    #[test]
    fn test_load_first_skips_missing_files() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.toml");
        let good = dir.path().join("good.toml");
        fs::write(&good, "[server]\nlisten = \"127.0.0.1:7000\"\n").unwrap();

        let config = Config::load_first(&[&missing, &good]).unwrap();
        assert_eq!(config.server.listen, "127.0.0.1:7000");

        let config = Config::load_first(&[&missing]).unwrap();
        assert_eq!(config.server.listen, "127.0.0.1:5000");
    }
}
