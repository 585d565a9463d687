//! Calabi Model Layer
//!
//! Pluggable inference backends implementing
//! [`calabi_domain::traits::InferenceModel`].
//!
//! # Backends
//!
//! - `MockModel`: scripted, deterministic labels for tests
//! - `LexiconModel`: gazetteer tagger, the bundled pre-trained model
//! - `RemoteModel`: HTTP inference server
//! - `AnyModel`: closed dispatch over the above, built from a [`ModelSpec`]
//!
//! # Examples
//!
//! ```
//! use calabi_domain::traits::InferenceModel;
//! use calabi_domain::{Label, EntityType, Token};
//! use calabi_model::MockModel;
//!
//! let model = MockModel::new().with_label("Seoul", Label::Begin(EntityType::Location), 0.9);
//! let labels = model.infer(&[Token::new("Seoul", 0, 5)]).unwrap();
//! assert_eq!(labels[0].best().0, Label::Begin(EntityType::Location));
//! ```

#![warn(missing_docs)]

pub mod lexicon;
pub mod mock;
pub mod remote;
pub mod spec;

use calabi_domain::traits::InferenceModel;
use calabi_domain::{LabelDistribution, Token};
use thiserror::Error;

pub use lexicon::{LexiconEntry, LexiconModel};
pub use mock::MockModel;
pub use remote::RemoteModel;
pub use spec::ModelSpec;

/// Errors that can occur during inference
#[derive(Error, Debug)]
pub enum ModelError {
    /// Model resource missing or failed to load
    #[error("Model not available: {0}")]
    NotAvailable(String),

    /// Network or API communication error
    #[error("Communication error: {0}")]
    Communication(String),

    /// Model produced output that cannot be decoded
    #[error("Invalid model output: {0}")]
    InvalidOutput(String),

    /// Inference failed inside the model
    #[error("Inference failed: {0}")]
    Inference(String),
}

/// Any of the supported backends, chosen at startup
#[derive(Debug, Clone)]
pub enum AnyModel {
    /// Gazetteer tagger
    Lexicon(LexiconModel),
    /// HTTP inference server
    Remote(RemoteModel),
    /// Scripted fake
    Mock(MockModel),
}

impl InferenceModel for AnyModel {
    type Error = ModelError;

    fn infer(&self, tokens: &[Token]) -> Result<Vec<LabelDistribution>, Self::Error> {
        match self {
            AnyModel::Lexicon(m) => m.infer(tokens),
            AnyModel::Remote(m) => m.infer(tokens),
            AnyModel::Mock(m) => m.infer(tokens),
        }
    }

    fn name(&self) -> &str {
        match self {
            AnyModel::Lexicon(m) => m.name(),
            AnyModel::Remote(m) => m.name(),
            AnyModel::Mock(m) => m.name(),
        }
    }

    fn health_check(&self) -> Result<(), Self::Error> {
        match self {
            AnyModel::Lexicon(m) => m.health_check(),
            AnyModel::Remote(m) => m.health_check(),
            AnyModel::Mock(m) => m.health_check(),
        }
    }
}

impl From<LexiconModel> for AnyModel {
    fn from(m: LexiconModel) -> Self {
        AnyModel::Lexicon(m)
    }
}

impl From<RemoteModel> for AnyModel {
    fn from(m: RemoteModel) -> Self {
        AnyModel::Remote(m)
    }
}

impl From<MockModel> for AnyModel {
    fn from(m: MockModel) -> Self {
        AnyModel::Mock(m)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use calabi_domain::{EntityType, Label};

    #[test]
    fn test_any_model_dispatch() {
        let model: AnyModel = MockModel::new()
            .with_label("Tokyo", Label::Begin(EntityType::Location), 0.8)
            .into();
        let labels = model.infer(&[Token::new("Tokyo", 0, 5)]).unwrap();
        assert_eq!(labels.len(), 1);
        assert_eq!(model.name(), "mock");
        assert!(model.health_check().is_ok());
    }

    #[test]
    fn test_any_model_lexicon() {
        let model: AnyModel = LexiconModel::builtin().into();
        assert_eq!(model.name(), "lexicon:builtin");
        assert!(model.health_check().is_ok());
    }
}
