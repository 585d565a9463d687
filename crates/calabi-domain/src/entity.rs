//! Entity module - entity types and decoded spans

use serde::{Deserialize, Serialize};
use std::fmt;

/// Closed set of entity categories the pipeline understands
///
/// The wire form is upper-case (`LOCATION`). Parsing is case-insensitive
/// and accepts the common CoNLL/OntoNotes aliases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum EntityType {
    /// People, including plural references ("friends")
    Person,
    /// Places, cities, countries, landmarks
    Location,
    /// Companies, institutions
    Organization,
    /// Calendar dates and relative days ("tomorrow")
    Date,
    /// Times of day
    Time,
    /// Named events ("fireworks festival")
    Event,
    /// Food and drink
    Food,
    /// Activities ("climbing", "meeting")
    Activity,
    /// Anything else worth tagging
    Concept,
}

impl EntityType {
    /// All entity types, in declaration order
    pub const ALL: [EntityType; 9] = [
        EntityType::Person,
        EntityType::Location,
        EntityType::Organization,
        EntityType::Date,
        EntityType::Time,
        EntityType::Event,
        EntityType::Food,
        EntityType::Activity,
        EntityType::Concept,
    ];

    /// Get the wire name of the type
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityType::Person => "PERSON",
            EntityType::Location => "LOCATION",
            EntityType::Organization => "ORGANIZATION",
            EntityType::Date => "DATE",
            EntityType::Time => "TIME",
            EntityType::Event => "EVENT",
            EntityType::Food => "FOOD",
            EntityType::Activity => "ACTIVITY",
            EntityType::Concept => "CONCEPT",
        }
    }

    /// Parse an entity type from a string (case-insensitive, with aliases)
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "PER" | "PERSON" => Some(EntityType::Person),
            "LOC" | "LOCATION" | "GPE" | "FAC" => Some(EntityType::Location),
            "ORG" | "ORGANIZATION" | "ORGANISATION" => Some(EntityType::Organization),
            "DATE" => Some(EntityType::Date),
            "TIME" => Some(EntityType::Time),
            "EVENT" | "EVT" => Some(EntityType::Event),
            "FOOD" => Some(EntityType::Food),
            "ACTIVITY" | "ACT" => Some(EntityType::Activity),
            "CONCEPT" | "MISC" => Some(EntityType::Concept),
            _ => None,
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for EntityType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("Invalid entity type: {}", s))
    }
}

impl From<EntityType> for String {
    fn from(t: EntityType) -> Self {
        t.as_str().to_string()
    }
}

impl TryFrom<String> for EntityType {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// An entity decoded from a token sequence
///
/// Offsets follow [`crate::Token`]: characters into the raw input, end
/// exclusive. Within one extraction result spans never overlap and are
/// ordered by `start_offset`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntitySpan {
    /// Normalized surface text of the span
    pub text: String,
    /// Entity category
    #[serde(rename = "type")]
    pub entity_type: EntityType,
    /// Start offset in the raw input
    pub start_offset: usize,
    /// End offset in the raw input (exclusive)
    pub end_offset: usize,
    /// Aggregated model confidence in [0, 1]
    pub confidence: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_aliases() {
        assert_eq!(EntityType::parse("loc"), Some(EntityType::Location));
        assert_eq!(EntityType::parse("GPE"), Some(EntityType::Location));
        assert_eq!(EntityType::parse("Person"), Some(EntityType::Person));
        assert_eq!(EntityType::parse(" date "), Some(EntityType::Date));
        assert_eq!(EntityType::parse("weather"), None);
    }

    #[test]
    fn test_round_trip_all() {
        for t in EntityType::ALL {
            assert_eq!(EntityType::parse(t.as_str()), Some(t));
        }
    }

    #[test]
    fn test_span_wire_format() {
        let span = EntitySpan {
            text: "Seoul".to_string(),
            entity_type: EntityType::Location,
            start_offset: 19,
            end_offset: 24,
            confidence: 0.9,
        };
        let json = serde_json::to_value(&span).unwrap();
        assert_eq!(json["type"], "LOCATION");
        assert_eq!(json["start_offset"], 19);
    }

    #[test]
    fn test_invalid_type_rejected_on_deserialize() {
        let result: Result<EntityType, _> = serde_json::from_str("\"WEATHER\"");
        assert!(result.is_err());
    }
}
