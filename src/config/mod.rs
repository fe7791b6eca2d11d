//! Configuration management.
//!
//! Layers, later wins: built-in defaults, the TOML config file, then
//! environment variables.

use crate::llm::{GenerationConfig, GenerationProfiles};
use crate::{Error, Result};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable holding the Gemini API key.
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Default origins allowed by CORS.
pub const DEFAULT_ALLOWED_ORIGINS: [&str; 2] = ["http://localhost:3000", "http://localhost:5173"];

/// Default time budget for one model call, in milliseconds.
pub const DEFAULT_CALL_TIMEOUT_MS: u64 = 30_000;

/// Main configuration for vizchat.
#[derive(Debug, Clone, Default)]
pub struct VizchatConfig {
    /// HTTP server settings.
    pub server: ServerConfig,
    /// Model API settings.
    pub llm: LlmConfig,
    /// Sampling settings for the two generation calls.
    pub generation: GenerationProfiles,
    /// Instruction template overrides.
    pub prompts: PromptConfig,
    /// Logging settings.
    pub logging: LoggingSettings,
    /// Metrics settings.
    pub metrics: MetricsSettings,
}

/// HTTP server configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Bind address.
    pub host: String,
    /// Bind port.
    pub port: u16,
    /// Origins allowed to call the API from a browser.
    pub allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            allowed_origins: DEFAULT_ALLOWED_ORIGINS
                .iter()
                .map(ToString::to_string)
                .collect(),
        }
    }
}

impl ServerConfig {
    /// Returns `host:port`.
    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Model API configuration.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// API key.
    pub api_key: Option<SecretString>,
    /// Model name.
    pub model: String,
    /// API base URL.
    pub endpoint: String,
    /// Per-call timeout in milliseconds. 0 selects the 30 s default; calls
    /// are never unbounded.
    pub timeout_ms: u64,
    /// Connect timeout in milliseconds (0 to disable).
    pub connect_timeout_ms: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: crate::llm::GeminiClient::DEFAULT_MODEL.to_string(),
            endpoint: crate::llm::GeminiClient::DEFAULT_ENDPOINT.to_string(),
            timeout_ms: DEFAULT_CALL_TIMEOUT_MS,
            connect_timeout_ms: 3_000,
        }
    }
}

impl LlmConfig {
    /// Returns the per-call timeout in milliseconds, with 0 mapped to the default.
    #[must_use]
    pub const fn call_timeout_ms(&self) -> u64 {
        if self.timeout_ms == 0 {
            DEFAULT_CALL_TIMEOUT_MS
        } else {
            self.timeout_ms
        }
    }

    /// Returns the time budget for one model call.
    ///
    /// Bounds both the HTTP request and the generator wrapper.
    #[must_use]
    pub const fn call_timeout(&self) -> Duration {
        Duration::from_millis(self.call_timeout_ms())
    }
}

/// Instruction template overrides. Unset entries keep the built-in text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PromptConfig {
    /// General assistant template.
    pub general: Option<String>,
    /// Computer-science tutor template.
    pub cs_tutor: Option<String>,
    /// Visualization generator template.
    pub visualization: Option<String>,
}

/// Logging settings from config.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoggingSettings {
    /// Output format: "pretty" or "json".
    pub format: Option<String>,
    /// Filter directive, used when `RUST_LOG` is unset.
    pub filter: Option<String>,
    /// Append log output to this file instead of stderr.
    pub file: Option<PathBuf>,
}

/// Metrics settings from config.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSettings {
    /// Whether the Prometheus recorder and `/metrics` route are enabled.
    pub enabled: bool,
}

/// Configuration file structure (for TOML parsing).
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFile {
    /// Server section.
    pub server: Option<ConfigFileServer>,
    /// LLM section.
    pub llm: Option<ConfigFileLlm>,
    /// Generation section.
    pub generation: Option<ConfigFileGeneration>,
    /// Prompts section.
    pub prompts: Option<PromptConfig>,
    /// Logging section.
    pub logging: Option<ConfigFileLogging>,
    /// Metrics section.
    pub metrics: Option<ConfigFileMetrics>,
}

/// Server section in config file.
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFileServer {
    /// Bind address.
    pub host: Option<String>,
    /// Bind port.
    pub port: Option<u16>,
    /// Allowed CORS origins.
    pub allowed_origins: Option<Vec<String>>,
}

/// LLM section in config file.
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFileLlm {
    /// API key.
    pub api_key: Option<String>,
    /// Model name.
    pub model: Option<String>,
    /// API base URL.
    pub endpoint: Option<String>,
    /// Per-call timeout in milliseconds.
    pub timeout_ms: Option<u64>,
    /// Connect timeout in milliseconds.
    pub connect_timeout_ms: Option<u64>,
}

/// Generation section in config file.
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFileGeneration {
    /// Visualization call overrides.
    pub visualization: Option<ConfigFileSampling>,
    /// Conversational call overrides.
    pub conversation: Option<ConfigFileSampling>,
}

/// Sampling overrides for one generation call.
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFileSampling {
    /// Sampling temperature.
    pub temperature: Option<f32>,
    /// Nucleus sampling probability mass.
    pub top_p: Option<f32>,
    /// Top-k sampling limit.
    pub top_k: Option<u32>,
    /// Maximum number of tokens to generate.
    pub max_output_tokens: Option<u32>,
}

impl ConfigFileSampling {
    /// Overlays the set fields onto `config`. The output format is not configurable.
    fn apply(self, config: &mut GenerationConfig) {
        if let Some(v) = self.temperature {
            config.temperature = v;
        }
        if let Some(v) = self.top_p {
            config.top_p = v;
        }
        if let Some(v) = self.top_k {
            config.top_k = v;
        }
        if let Some(v) = self.max_output_tokens {
            config.max_output_tokens = v;
        }
    }
}

/// Logging section in config file.
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFileLogging {
    /// Output format.
    pub format: Option<String>,
    /// Filter directive.
    pub filter: Option<String>,
    /// Log file path.
    pub file: Option<String>,
}

/// Metrics section in config file.
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFileMetrics {
    /// Whether metrics are enabled.
    pub enabled: Option<bool>,
}

impl VizchatConfig {
    /// Loads configuration for the process.
    ///
    /// Reads `path` when given, else the default location, then applies
    /// environment overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if an explicitly given file cannot be read or parsed.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::load_from_file(path)?,
            None => Self::load_default(),
        };
        config.apply_env_overrides();
        Ok(config)
    }

    /// Loads configuration from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| Error::OperationFailed {
            operation: "read_config_file".to_string(),
            cause: format!("{}: {e}", path.display()),
        })?;
        Self::from_toml(&contents)
    }

    /// Parses configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not a valid config file.
    pub fn from_toml(contents: &str) -> Result<Self> {
        let file: ConfigFile = toml::from_str(contents).map_err(|e| Error::OperationFailed {
            operation: "parse_config_file".to_string(),
            cause: e.to_string(),
        })?;
        Ok(Self::from_config_file(file))
    }

    /// Loads configuration from the default location.
    ///
    /// Checks `<config_dir>/vizchat/config.toml`, then `~/.config/vizchat/config.toml`.
    /// Returns default configuration if no readable config file is found.
    #[must_use]
    pub fn load_default() -> Self {
        let Some(base_dirs) = directories::BaseDirs::new() else {
            return Self::default();
        };

        let candidates = [
            base_dirs.config_dir().join("vizchat").join("config.toml"),
            base_dirs
                .home_dir()
                .join(".config")
                .join("vizchat")
                .join("config.toml"),
        ];
        for path in candidates.iter().filter(|path| path.exists()) {
            match Self::load_from_file(path) {
                Ok(config) => return config,
                Err(e) => tracing::warn!(path = %path.display(), error = %e, "Ignoring config file"),
            }
        }

        Self::default()
    }

    /// Converts a `ConfigFile` to `VizchatConfig`.
    fn from_config_file(file: ConfigFile) -> Self {
        let mut config = Self::default();

        if let Some(server) = file.server {
            if let Some(host) = server.host {
                config.server.host = host;
            }
            if let Some(port) = server.port {
                config.server.port = port;
            }
            if let Some(origins) = server.allowed_origins {
                config.server.allowed_origins = origins;
            }
        }
        if let Some(llm) = file.llm {
            config.llm.api_key = llm
                .api_key
                .filter(|key| !key.trim().is_empty())
                .map(SecretString::from);
            if let Some(model) = llm.model {
                config.llm.model = model;
            }
            if let Some(endpoint) = llm.endpoint {
                config.llm.endpoint = endpoint;
            }
            if let Some(v) = llm.timeout_ms {
                config.llm.timeout_ms = v;
            }
            if let Some(v) = llm.connect_timeout_ms {
                config.llm.connect_timeout_ms = v;
            }
        }
        if let Some(generation) = file.generation {
            if let Some(sampling) = generation.visualization {
                sampling.apply(&mut config.generation.visualization);
            }
            if let Some(sampling) = generation.conversation {
                sampling.apply(&mut config.generation.conversation);
            }
        }
        if let Some(prompts) = file.prompts {
            config.prompts = prompts;
        }
        if let Some(logging) = file.logging {
            config.logging = LoggingSettings {
                format: logging.format,
                filter: logging.filter,
                file: logging.file.map(PathBuf::from),
            };
        }
        if let Some(enabled) = file.metrics.and_then(|m| m.enabled) {
            config.metrics.enabled = enabled;
        }

        config
    }

    /// Applies `VIZCHAT_*` and `GEMINI_API_KEY` environment overrides.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    /// Applies overrides from an arbitrary variable lookup.
    pub fn apply_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        if let Some(key) = var(API_KEY_ENV) {
            self.llm.api_key = Some(SecretString::from(key));
        }
        if let Some(host) = var("VIZCHAT_HOST") {
            self.server.host = host;
        }
        if let Some(port) = var("VIZCHAT_PORT").and_then(|v| v.parse().ok()) {
            self.server.port = port;
        }
        if let Some(origins) = var("VIZCHAT_ALLOWED_ORIGINS") {
            self.server.allowed_origins = origins
                .split(',')
                .map(str::trim)
                .filter(|origin| !origin.is_empty())
                .map(ToString::to_string)
                .collect();
        }
        if let Some(model) = var("VIZCHAT_MODEL") {
            self.llm.model = model;
        }
        if let Some(endpoint) = var("VIZCHAT_LLM_ENDPOINT") {
            self.llm.endpoint = endpoint;
        }
        if let Some(v) = var("VIZCHAT_LLM_TIMEOUT_MS").and_then(|v| v.parse().ok()) {
            self.llm.timeout_ms = v;
        }
        if let Some(v) = var("VIZCHAT_LLM_CONNECT_TIMEOUT_MS").and_then(|v| v.parse().ok()) {
            self.llm.connect_timeout_ms = v;
        }
        if let Some(v) = var("VIZCHAT_METRICS_ENABLED") {
            self.metrics.enabled = parse_bool(&v);
        }
        if let Some(format) = var("VIZCHAT_LOG_FORMAT") {
            self.logging.format = Some(format);
        }
        if let Some(file) = var("VIZCHAT_LOG_FILE") {
            self.logging.file = Some(PathBuf::from(file));
        }
    }

    /// Returns the API key, failing when none is configured.
    ///
    /// # Errors
    ///
    /// Returns an error if neither `GEMINI_API_KEY` nor `llm.api_key` is set.
    pub fn require_api_key(&self) -> Result<&SecretString> {
        self.llm
            .api_key
            .as_ref()
            .filter(|key| !key.expose_secret().trim().is_empty())
            .ok_or_else(|| Error::OperationFailed {
                operation: "load_api_key".to_string(),
                cause: format!("{API_KEY_ENV} not found in environment variables"),
            })
    }
}

fn parse_bool(value: &str) -> bool {
    matches!(value.to_lowercase().as_str(), "true" | "1" | "yes")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = VizchatConfig::default();
        assert_eq!(config.server.bind_address(), "0.0.0.0:8000");
        assert_eq!(
            config.server.allowed_origins,
            vec!["http://localhost:3000", "http://localhost:5173"]
        );
        assert_eq!(config.llm.model, "gemini-1.5-flash-8b");
        assert_eq!(config.llm.timeout_ms, 30_000);
        assert!(config.llm.api_key.is_none());
        assert!(!config.metrics.enabled);
        assert_eq!(config.generation, GenerationProfiles::default());
    }

    #[test]
    fn test_from_toml() {
        let config = VizchatConfig::from_toml(
            r#"
[server]
port = 9000
allowed_origins = ["https://viz.example.com"]

[llm]
api_key = "file-key"
model = "gemini-2.0-flash"
timeout_ms = 5000

[generation.conversation]
temperature = 0.3

[prompts]
general = "Be brief."

[logging]
format = "json"
file = "/tmp/vizchat.log"

[metrics]
enabled = true
"#,
        )
        .unwrap();

        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.allowed_origins, vec!["https://viz.example.com"]);
        assert_eq!(config.llm.model, "gemini-2.0-flash");
        assert_eq!(config.llm.timeout_ms, 5000);
        assert_eq!(config.llm.connect_timeout_ms, 3000);
        assert_eq!(config.require_api_key().unwrap().expose_secret(), "file-key");
        assert!((config.generation.conversation.temperature - 0.3).abs() < f32::EPSILON);
        assert_eq!(config.generation.conversation.max_output_tokens, 2048);
        assert_eq!(
            config.generation.visualization,
            GenerationConfig::visualization()
        );
        assert_eq!(config.prompts.general.as_deref(), Some("Be brief."));
        assert_eq!(config.logging.format.as_deref(), Some("json"));
        assert_eq!(config.logging.file, Some(PathBuf::from("/tmp/vizchat.log")));
        assert!(config.metrics.enabled);
    }

    #[test]
    fn test_invalid_toml_is_error() {
        let err = VizchatConfig::from_toml("[server]\nport = \"eighty\"").unwrap_err();
        assert!(err.to_string().contains("parse_config_file"));
    }

    #[test]
    fn test_load_from_missing_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = VizchatConfig::load_from_file(&dir.path().join("absent.toml")).unwrap_err();
        assert!(err.to_string().contains("read_config_file"));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[server]\nhost = \"127.0.0.1\"\n").unwrap();
        let config = VizchatConfig::load_from_file(&path).unwrap();
        assert_eq!(config.server.host, "127.0.0.1");
    }

    #[test]
    fn test_env_overrides() {
        let mut config = VizchatConfig::from_toml("[llm]\napi_key = \"file-key\"\n").unwrap();
        config.apply_overrides_from(lookup(&[
            ("GEMINI_API_KEY", "env-key"),
            ("VIZCHAT_PORT", "8080"),
            ("VIZCHAT_ALLOWED_ORIGINS", "http://a.test, ,http://b.test"),
            ("VIZCHAT_LLM_TIMEOUT_MS", "1500"),
            ("VIZCHAT_METRICS_ENABLED", "yes"),
            ("VIZCHAT_LOG_FORMAT", "json"),
        ]));

        assert_eq!(config.require_api_key().unwrap().expose_secret(), "env-key");
        assert_eq!(config.server.port, 8080);
        assert_eq!(
            config.server.allowed_origins,
            vec!["http://a.test", "http://b.test"]
        );
        assert_eq!(config.llm.timeout_ms, 1500);
        assert!(config.metrics.enabled);
        assert_eq!(config.logging.format.as_deref(), Some("json"));
    }

    #[test]
    fn test_invalid_env_values_are_ignored() {
        let mut config = VizchatConfig::default();
        config.apply_overrides_from(lookup(&[
            ("VIZCHAT_PORT", "not-a-port"),
            ("VIZCHAT_LLM_TIMEOUT_MS", "-1"),
            ("GEMINI_API_KEY", "   "),
        ]));
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.llm.timeout_ms, 30_000);
        assert!(config.llm.api_key.is_none());
    }

    #[test]
    fn test_zero_timeout_keeps_calls_bounded() {
        let mut config = VizchatConfig::default();
        config.apply_overrides_from(lookup(&[("VIZCHAT_LLM_TIMEOUT_MS", "0")]));
        assert_eq!(config.llm.timeout_ms, 0);
        assert_eq!(config.llm.call_timeout_ms(), DEFAULT_CALL_TIMEOUT_MS);
        assert_eq!(config.llm.call_timeout(), Duration::from_secs(30));

        let http = crate::llm::LlmHttpConfig::from_config(&config.llm);
        assert_eq!(http.timeout(), Some(Duration::from_secs(30)));

        config.llm.timeout_ms = 1500;
        assert_eq!(config.llm.call_timeout(), Duration::from_millis(1500));
    }

    #[test]
    fn test_missing_api_key_is_error() {
        let config = VizchatConfig::from_toml("[llm]\napi_key = \"\"\n").unwrap();
        let err = config.require_api_key().unwrap_err();
        assert!(err.to_string().contains("GEMINI_API_KEY"));
    }
}
