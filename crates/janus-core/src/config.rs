use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::JanusError;

/// Top-level configuration loaded from `janus.toml`.
///
/// Every section falls back to defaults when omitted, so an empty file (or no
/// file at all) is a valid configuration.
///
/// # Examples
///
/// ```
/// use janus_core::JanusConfig;
///
/// let config = JanusConfig::default();
/// assert_eq!(config.llm.provider, "openai");
/// assert_eq!(config.data.dir.to_str(), Some("data"));
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JanusConfig {
    /// LLM provider settings for the executive briefing.
    #[serde(default)]
    pub llm: LlmConfig,
    /// Repo-data proxy service settings.
    #[serde(default)]
    pub service: ServiceConfig,
    /// Local data fixture settings.
    #[serde(default)]
    pub data: DataConfig,
}

impl JanusConfig {
    /// Load configuration from a TOML file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`JanusError::Io`] if the file cannot be read, or
    /// [`JanusError::Toml`] if the content is not valid TOML.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use janus_core::JanusConfig;
    /// use std::path::Path;
    ///
    /// let config = JanusConfig::from_file(Path::new("janus.toml")).unwrap();
    /// ```
    pub fn from_file(path: &Path) -> Result<Self, JanusError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns [`JanusError::Toml`] if parsing fails.
    ///
    /// # Examples
    ///
    /// ```
    /// use janus_core::JanusConfig;
    ///
    /// let toml = r#"
    /// [llm]
    /// model = "gpt-4o-mini"
    /// "#;
    /// let config = JanusConfig::from_toml(toml).unwrap();
    /// assert_eq!(config.llm.model, "gpt-4o-mini");
    /// ```
    pub fn from_toml(content: &str) -> Result<Self, JanusError> {
        let config: Self = toml::from_str(content)?;
        Ok(config)
    }
}

/// LLM provider configuration for the executive briefing.
///
/// # Examples
///
/// ```
/// use janus_core::LlmConfig;
///
/// let config = LlmConfig::default();
/// assert_eq!(config.model, "gpt-4o");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Provider name (e.g. `"openai"`, `"anthropic"`, `"ollama"`).
    #[serde(default = "default_provider")]
    pub provider: String,
    /// Model identifier.
    #[serde(default = "default_model")]
    pub model: String,
    /// API key for the provider.
    pub api_key: Option<String>,
    /// Custom base URL for API requests.
    pub base_url: Option<String>,
}

fn default_provider() -> String {
    "openai".into()
}

fn default_model() -> String {
    "gpt-4o".into()
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: default_model(),
            api_key: None,
            base_url: None,
        }
    }
}

/// Repo-data proxy service configuration.
///
/// The proxy serves already-extracted GitHub activity (commits, pull
/// requests, reviews, module mapping) over a plain REST surface.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Base URL of the repo-data service.
    #[serde(default = "default_service_url")]
    pub base_url: String,
    /// Bearer token for the service, if required.
    pub api_key: Option<String>,
}

fn default_service_url() -> String {
    "http://localhost:8000".into()
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: default_service_url(),
            api_key: None,
        }
    }
}

/// Local data fixture configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// Directory holding the JSON data files.
    #[serde(default = "default_data_dir")]
    pub dir: PathBuf,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            dir: default_data_dir(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_expected_values() {
        let config = JanusConfig::default();
        assert_eq!(config.llm.provider, "openai");
        assert_eq!(config.llm.model, "gpt-4o");
        assert!(config.llm.api_key.is_none());
        assert_eq!(config.service.base_url, "http://localhost:8000");
        assert_eq!(config.data.dir, PathBuf::from("data"));
    }

    #[test]
    fn parse_minimal_toml() {
        let toml = r#"
[llm]
provider = "anthropic"
model = "claude-sonnet-4-20250514"
"#;
        let config = JanusConfig::from_toml(toml).unwrap();
        assert_eq!(config.llm.provider, "anthropic");
        assert_eq!(config.llm.model, "claude-sonnet-4-20250514");
        // untouched sections keep defaults
        assert_eq!(config.service.base_url, "http://localhost:8000");
    }

    #[test]
    fn parse_full_toml() {
        let toml = r#"
[llm]
provider = "openai"
model = "gpt-4o-mini"
base_url = "http://localhost:11434"

[service]
base_url = "https://repo-proxy.internal:8443"
api_key = "svc-token"

[data]
dir = "fixtures/acme"
"#;
        let config = JanusConfig::from_toml(toml).unwrap();
        assert_eq!(config.llm.base_url.as_deref(), Some("http://localhost:11434"));
        assert_eq!(config.service.base_url, "https://repo-proxy.internal:8443");
        assert_eq!(config.service.api_key.as_deref(), Some("svc-token"));
        assert_eq!(config.data.dir, PathBuf::from("fixtures/acme"));
    }

    #[test]
    fn empty_toml_gives_defaults() {
        let config = JanusConfig::from_toml("").unwrap();
        assert_eq!(config.llm.model, "gpt-4o");
        assert_eq!(config.data.dir, PathBuf::from("data"));
    }

    #[test]
    fn invalid_toml_returns_error() {
        let result = JanusConfig::from_toml("{{invalid}}");
        assert!(result.is_err());
    }
}
