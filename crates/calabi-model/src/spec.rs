//! Model selection, as written in configuration files

use crate::{AnyModel, LexiconModel, ModelError, RemoteModel};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Which backend to load at startup
///
/// ```toml
/// [model]
/// kind = "lexicon"
/// path = "./models/lexicon.json"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelSpec {
    /// The built-in calendar lexicon
    Builtin,
    /// A lexicon loaded from a JSON file
    Lexicon {
        /// Path to the lexicon file
        path: PathBuf,
    },
    /// An HTTP inference server
    Remote {
        /// Server base URL
        endpoint: String,
        /// Model identifier on the server
        model: String,
        /// HTTP timeout in seconds
        #[serde(default = "default_remote_timeout")]
        timeout_secs: u64,
    },
}

fn default_remote_timeout() -> u64 {
    crate::remote::DEFAULT_TIMEOUT_SECS
}

impl Default for ModelSpec {
    fn default() -> Self {
        ModelSpec::Builtin
    }
}

impl ModelSpec {
    /// Opaque reference string for logs and health reports
    pub fn reference(&self) -> String {
        match self {
            ModelSpec::Builtin => "builtin".to_string(),
            ModelSpec::Lexicon { path } => format!("lexicon:{}", path.display()),
            ModelSpec::Remote { endpoint, model, .. } => format!("remote:{}@{}", model, endpoint),
        }
    }

    /// Load the backend
    pub fn build(&self) -> Result<AnyModel, ModelError> {
        match self {
            ModelSpec::Builtin => Ok(LexiconModel::builtin().into()),
            ModelSpec::Lexicon { path } => Ok(LexiconModel::from_file(path)?.into()),
            ModelSpec::Remote {
                endpoint,
                model,
                timeout_secs,
            } => Ok(RemoteModel::with_timeout(
                endpoint.as_str(),
                model.as_str(),
                Duration::from_secs(*timeout_secs),
            )
            .into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use calabi_domain::traits::InferenceModel;

    #[derive(Deserialize)]
    struct Wrapper {
        model: ModelSpec,
    }

    #[test]
    fn test_parse_lexicon_spec() {
        let parsed: Wrapper = toml::from_str(
            r#"
            [model]
            kind = "lexicon"
            path = "./models/lexicon.json"
            "#,
        )
        .unwrap();
        assert_eq!(
            parsed.model,
            ModelSpec::Lexicon {
                path: PathBuf::from("./models/lexicon.json")
            }
        );
    }

    #[test]
    fn test_parse_remote_spec_defaults_timeout() {
        let parsed: Wrapper = toml::from_str(
            r#"
            [model]
            kind = "remote"
            endpoint = "http://localhost:9000"
            model = "gliner-multi"
            "#,
        )
        .unwrap();
        assert_eq!(parsed.model.reference(), "remote:gliner-multi@http://localhost:9000");
        match parsed.model {
            ModelSpec::Remote { timeout_secs, .. } => assert_eq!(timeout_secs, 10),
            other => panic!("unexpected spec {:?}", other),
        }
    }

    #[test]
    fn test_build_builtin() {
        let model = ModelSpec::Builtin.build().unwrap();
        assert_eq!(model.name(), "lexicon:builtin");
    }

    #[test]
    fn test_build_missing_lexicon_fails() {
        let spec = ModelSpec::Lexicon {
            path: PathBuf::from("/nonexistent/lexicon.json"),
        };
        assert!(spec.build().is_err());
    }
}
