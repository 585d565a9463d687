//! Label module - closed BIO tags emitted by inference models

use crate::entity::EntityType;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// BIO tag for a single token
///
/// `Outside` is declared first so that, on equal scores, the decoder
/// prefers not to start an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum Label {
    /// Token is not part of an entity
    Outside,
    /// Token starts an entity of the given type
    Begin(EntityType),
    /// Token continues an entity of the given type
    Inside(EntityType),
}

impl Label {
    /// Entity type carried by the label, if any
    pub fn entity_type(&self) -> Option<EntityType> {
        match self {
            Label::Outside => None,
            Label::Begin(t) | Label::Inside(t) => Some(*t),
        }
    }

    /// Parse a BIO tag such as `B-LOC`, `I-DATE` or `O`
    ///
    /// IOBES single/end prefixes (`S-`, `U-`, `E-`, `L-`) are folded into
    /// begin/inside so models trained on richer schemes still decode.
    pub fn parse(tag: &str) -> Option<Self> {
        let tag = tag.trim();
        if tag.eq_ignore_ascii_case("O") {
            return Some(Label::Outside);
        }
        let (prefix, type_str) = tag.split_once(['-', '_'])?;
        let entity_type = EntityType::parse(type_str)?;
        match prefix.to_ascii_uppercase().as_str() {
            "B" | "S" | "U" => Some(Label::Begin(entity_type)),
            "I" | "E" | "L" => Some(Label::Inside(entity_type)),
            _ => None,
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Label::Outside => f.write_str("O"),
            Label::Begin(t) => write!(f, "B-{}", t),
            Label::Inside(t) => write!(f, "I-{}", t),
        }
    }
}

impl From<Label> for String {
    fn from(label: Label) -> Self {
        label.to_string()
    }
}

impl TryFrom<String> for Label {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Label::parse(&s).ok_or_else(|| format!("Invalid BIO label: {}", s))
    }
}

/// Per-token label scores produced by a model
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LabelDistribution {
    /// Candidate labels with their scores in [0, 1]
    pub scores: Vec<(Label, f32)>,
}

impl LabelDistribution {
    /// Create a distribution from explicit scores
    pub fn new(scores: Vec<(Label, f32)>) -> Self {
        Self { scores }
    }

    /// A distribution that puts all its mass on one label
    pub fn certain(label: Label, score: f32) -> Self {
        Self {
            scores: vec![(label, score)],
        }
    }

    /// Outside with full confidence
    pub fn outside() -> Self {
        Self::certain(Label::Outside, 1.0)
    }

    /// Highest scoring label
    ///
    /// Ties go to the smaller label in `Ord` order, so the result never
    /// depends on the order the model listed its scores in. An empty
    /// distribution decodes as `Outside` with zero confidence.
    pub fn best(&self) -> (Label, f32) {
        self.scores
            .iter()
            .map(|(label, score)| (*label, sanitize(*score)))
            .max_by(|a, b| match a.1.total_cmp(&b.1) {
                Ordering::Equal => b.0.cmp(&a.0),
                other => other,
            })
            .unwrap_or((Label::Outside, 0.0))
    }
}

fn sanitize(score: f32) -> f32 {
    if score.is_nan() {
        0.0
    } else {
        score.clamp(0.0, 1.0)
    }
}
