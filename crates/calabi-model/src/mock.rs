//! Scripted inference model for deterministic testing

use crate::ModelError;
use calabi_domain::traits::InferenceModel;
use calabi_domain::{Label, LabelDistribution, Token};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Mock model returning pre-configured labels keyed by token text
///
/// Tokens without a scripted label come back as `Outside`. No files or
/// network calls are involved.
///
/// # Examples
///
/// ```
/// use calabi_domain::traits::InferenceModel;
/// use calabi_domain::{EntityType, Label, Token};
/// use calabi_model::MockModel;
///
/// let model = MockModel::new()
///     .with_label("New", Label::Begin(EntityType::Location), 0.9)
///     .with_label("York", Label::Inside(EntityType::Location), 0.8);
///
/// let tokens = vec![Token::new("New", 0, 3), Token::new("York", 4, 8)];
/// let labels = model.infer(&tokens).unwrap();
/// assert_eq!(labels[1].best().0, Label::Inside(EntityType::Location));
/// assert_eq!(model.call_count(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockModel {
    labels: HashMap<String, LabelDistribution>,
    failing: bool,
    misaligned: bool,
    delay: Option<Duration>,
    call_count: Arc<AtomicUsize>,
    in_flight: Arc<AtomicUsize>,
    max_in_flight: Arc<AtomicUsize>,
}

impl MockModel {
    /// Create a mock that labels every token `Outside`
    pub fn new() -> Self {
        Self::default()
    }

    /// Script a single label for a token text
    pub fn with_label(self, token: impl Into<String>, label: Label, score: f32) -> Self {
        self.with_distribution(token, LabelDistribution::certain(label, score))
    }

    /// Script a full distribution for a token text
    pub fn with_distribution(mut self, token: impl Into<String>, dist: LabelDistribution) -> Self {
        self.labels.insert(token.into(), dist);
        self
    }

    /// Make every call fail as if the resource were unreachable
    pub fn failing(mut self) -> Self {
        self.failing = true;
        self
    }

    /// Return one distribution fewer than there are tokens
    pub fn misaligned(mut self) -> Self {
        self.misaligned = true;
        self
    }

    /// Sleep for the given duration inside every call
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Number of times `infer` was called
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    /// Highest number of `infer` calls observed running at once
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

impl InferenceModel for MockModel {
    type Error = ModelError;

    fn infer(&self, tokens: &[Token]) -> Result<Vec<LabelDistribution>, Self::Error> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);

        if let Some(delay) = self.delay {
            std::thread::sleep(delay);
        }

        let result = if self.failing {
            Err(ModelError::NotAvailable("mock model configured to fail".to_string()))
        } else {
            let mut out: Vec<LabelDistribution> = tokens
                .iter()
                .map(|t| {
                    self.labels
                        .get(&t.text)
                        .cloned()
                        .unwrap_or_else(LabelDistribution::outside)
                })
                .collect();
            if self.misaligned {
                out.pop();
            }
            Ok(out)
        };

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }

    fn name(&self) -> &str {
        "mock"
    }

    fn health_check(&self) -> Result<(), Self::Error> {
        if self.failing {
            return Err(ModelError::NotAvailable("mock model configured to fail".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use calabi_domain::EntityType;

    #[test]
    fn test_unscripted_tokens_are_outside() {
        let model = MockModel::new();
        let labels = model.infer(&[Token::new("hello", 0, 5)]).unwrap();
        assert_eq!(labels[0].best(), (Label::Outside, 1.0));
    }

    #[test]
    fn test_failing_model() {
        let model = MockModel::new().failing();
        assert!(matches!(
            model.infer(&[Token::new("x", 0, 1)]),
            Err(ModelError::NotAvailable(_))
        ));
        assert!(model.health_check().is_err());
    }

    #[test]
    fn test_misaligned_output() {
        let model = MockModel::new().misaligned();
        let tokens = vec![Token::new("a", 0, 1), Token::new("b", 2, 3)];
        assert_eq!(model.infer(&tokens).unwrap().len(), 1);
    }

    #[test]
    fn test_clone_shares_call_count() {
        let model1 = MockModel::new().with_label("x", Label::Begin(EntityType::Concept), 0.5);
        let model2 = model1.clone();

        model1.infer(&[Token::new("x", 0, 1)]).unwrap();

        assert_eq!(model1.call_count(), 1);
        assert_eq!(model2.call_count(), 1);
        assert_eq!(model2.max_in_flight(), 1);
    }
}
