//! Trait definitions for external interactions
//!
//! These traits define the boundary between the pipeline and the inference
//! backends. Implementations live in `calabi-model`.

use crate::{LabelDistribution, Token};

/// A pre-trained sequence-labeling model, treated as a black box
///
/// `infer` must return exactly one distribution per input token. It may
/// block; callers run it off the async executor. Implementations are shared
/// across concurrent requests and must not rely on interior mutation for
/// correctness.
pub trait InferenceModel {
    /// Error type for inference operations
    type Error;

    /// Label every token of a single normalized sequence
    fn infer(&self, tokens: &[Token]) -> Result<Vec<LabelDistribution>, Self::Error>;

    /// Short identifier for logs and health reports
    fn name(&self) -> &str;

    /// Check that the underlying resource is loaded and responsive
    fn health_check(&self) -> Result<(), Self::Error>;
}
