//! Configuration file parsing for the server.
//!
//! Settings come from a TOML file, then from `CALABI_*` environment
//! variables (a `.env` file is honoured). Everything is read once at
//! startup.

use calabi_model::ModelSpec;
use calabi_nlp::PipelineConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

/// Server configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    /// Failed to parse TOML
    #[error("Failed to parse config TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// A value failed to parse or validate
    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

/// Where the vocabulary comes from
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VocabularySource {
    /// JSON vocabulary file; the built-in vocabulary when absent
    #[serde(default)]
    pub path: Option<PathBuf>,
}

/// Server configuration loaded from TOML
///
/// ```toml
/// bind_address = "0.0.0.0"
/// bind_port = 8000
///
/// [pipeline]
/// confidence_threshold = 0.6
///
/// [model]
/// kind = "lexicon"
/// path = "./models/lexicon.json"
///
/// [vocabulary]
/// path = "./models/vocabulary.json"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address (e.g., "127.0.0.1")
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// Bind port (e.g., 8000)
    #[serde(default = "default_bind_port")]
    pub bind_port: u16,

    /// Pipeline thresholds and limits
    #[serde(default)]
    pub pipeline: PipelineConfig,

    /// Inference backend
    #[serde(default)]
    pub model: ModelSpec,

    /// Reference vocabulary
    #[serde(default)]
    pub vocabulary: VocabularySource,
}

fn default_bind_address() -> String {
    "127.0.0.1".to_string()
}

fn default_bind_port() -> u16 {
    8000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            bind_port: default_bind_port(),
            pipeline: PipelineConfig::default(),
            model: ModelSpec::default(),
            vocabulary: VocabularySource::default(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Parse configuration from a TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Load the effective configuration
    ///
    /// Reads `.env` if present, then the file at `path` (or defaults), then
    /// applies environment overrides and validates the result.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Ok(env_file) = dotenvy::dotenv() {
            info!("Loaded environment from {}", env_file.display());
        }

        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `CALABI_*` overrides using `lookup` to read variables
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(address) = lookup("CALABI_BIND_ADDRESS") {
            self.bind_address = address;
        }
        if let Some(port) = lookup("CALABI_BIND_PORT") {
            self.bind_port = parse_var("CALABI_BIND_PORT", &port)?;
        }
        if let Some(path) = lookup("CALABI_MODEL_PATH") {
            self.model = ModelSpec::Lexicon { path: path.into() };
        }
        if let Some(endpoint) = lookup("CALABI_MODEL_ENDPOINT") {
            self.model = match &self.model {
                ModelSpec::Remote {
                    model, timeout_secs, ..
                } => ModelSpec::Remote {
                    endpoint,
                    model: model.clone(),
                    timeout_secs: *timeout_secs,
                },
                _ => ModelSpec::Remote {
                    endpoint,
                    model: "default".to_string(),
                    timeout_secs: calabi_model::remote::DEFAULT_TIMEOUT_SECS,
                },
            };
        }
        // Names the remote model whether the file or the environment chose it
        if let (Some(name), ModelSpec::Remote { model, .. }) = (lookup("CALABI_MODEL_NAME"), &mut self.model) {
            *model = name;
        }
        if let Some(path) = lookup("CALABI_VOCABULARY_PATH") {
            self.vocabulary.path = Some(path.into());
        }
        if let Some(threshold) = lookup("CALABI_CONFIDENCE_THRESHOLD") {
            self.pipeline.confidence_threshold = parse_var("CALABI_CONFIDENCE_THRESHOLD", &threshold)?;
        }
        if let Some(max) = lookup("CALABI_MAX_SUGGESTIONS") {
            self.pipeline.max_suggestions = parse_var("CALABI_MAX_SUGGESTIONS", &max)?;
        }
        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bind_address.trim().is_empty() {
            return Err(ConfigError::InvalidValue("bind_address is empty".to_string()));
        }
        self.pipeline.validate().map_err(ConfigError::InvalidValue)
    }

    /// Get the full bind address (address:port)
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.bind_address, self.bind_port)
    }
}

fn parse_var<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidValue(format!("{}={}", key, value)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.bind_addr(), "127.0.0.1:8000");
        assert_eq!(config.model, ModelSpec::Builtin);
        assert!(config.vocabulary.path.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_toml() {
        let config = ServerConfig::from_toml(
            r#"
            bind_address = "0.0.0.0"
            bind_port = 9000

            [pipeline]
            confidence_threshold = 0.7
            max_suggestions = 5

            [model]
            kind = "remote"
            endpoint = "http://localhost:9001"
            model = "ner-small"

            [vocabulary]
            path = "vocab.json"
            "#,
        )
        .unwrap();

        assert_eq!(config.bind_addr(), "0.0.0.0:9000");
        assert_eq!(config.pipeline.confidence_threshold, 0.7);
        assert_eq!(config.pipeline.max_suggestions, 5);
        assert!(matches!(config.model, ModelSpec::Remote { ref model, .. } if model == "ner-small"));
        assert_eq!(config.vocabulary.path, Some(PathBuf::from("vocab.json")));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "bind_port = 8123").unwrap();
        let config = ServerConfig::from_file(file.path()).unwrap();
        assert_eq!(config.bind_port, 8123);
        assert_eq!(config.bind_address, "127.0.0.1");
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            ServerConfig::from_file("/nonexistent/calabi.toml"),
            Err(ConfigError::FileRead(_))
        ));
    }

    #[test]
    fn test_env_overrides() {
        let mut config = ServerConfig::default();
        config
            .apply_env_overrides(env(&[
                ("CALABI_BIND_PORT", "9100"),
                ("CALABI_MODEL_PATH", "/models/lexicon.json"),
                ("CALABI_VOCABULARY_PATH", "/models/vocab.json"),
                ("CALABI_CONFIDENCE_THRESHOLD", "0.65"),
                ("CALABI_MAX_SUGGESTIONS", "7"),
            ]))
            .unwrap();

        assert_eq!(config.bind_port, 9100);
        assert_eq!(
            config.model,
            ModelSpec::Lexicon {
                path: "/models/lexicon.json".into()
            }
        );
        assert_eq!(config.vocabulary.path, Some(PathBuf::from("/models/vocab.json")));
        assert_eq!(config.pipeline.confidence_threshold, 0.65);
        assert_eq!(config.pipeline.max_suggestions, 7);
    }

    #[test]
    fn test_endpoint_override_selects_remote() {
        let mut config = ServerConfig::default();
        config
            .apply_env_overrides(env(&[("CALABI_MODEL_ENDPOINT", "http://ner:9000")]))
            .unwrap();
        assert!(matches!(
            config.model,
            ModelSpec::Remote { ref endpoint, ref model, .. }
                if endpoint == "http://ner:9000" && model == "default"
        ));
    }

    #[test]
    fn test_model_name_override_on_remote_from_file() {
        let mut config = ServerConfig::from_toml(
            r#"
            [model]
            kind = "remote"
            endpoint = "http://localhost:9001"
            model = "ner-small"
            timeout_secs = 3
            "#,
        )
        .unwrap();
        config
            .apply_env_overrides(env(&[
                ("CALABI_MODEL_ENDPOINT", "http://ner:9000"),
                ("CALABI_MODEL_NAME", "ner-large"),
            ]))
            .unwrap();

        assert_eq!(
            config.model,
            ModelSpec::Remote {
                endpoint: "http://ner:9000".to_string(),
                model: "ner-large".to_string(),
                timeout_secs: 3,
            }
        );
    }

    #[test]
    fn test_model_name_ignored_for_local_models() {
        let mut config = ServerConfig::default();
        config
            .apply_env_overrides(env(&[("CALABI_MODEL_NAME", "ner-large")]))
            .unwrap();
        assert_eq!(config.model, ModelSpec::Builtin);
    }

    #[test]
    fn test_bad_env_value() {
        let mut config = ServerConfig::default();
        let result = config.apply_env_overrides(env(&[("CALABI_BIND_PORT", "eighty")]));
        assert!(matches!(result, Err(ConfigError::InvalidValue(_))));
    }

    #[test]
    fn test_validation_catches_pipeline_errors() {
        let mut config = ServerConfig::default();
        config.pipeline.max_suggestions = 0;
        assert!(matches!(config.validate(), Err(ConfigError::InvalidValue(_))));
    }
}
