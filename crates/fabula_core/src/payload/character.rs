//! Character roster payload.

use super::TextOrList;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Physical attributes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CharacterAttributes {
    /// Age (number or description)
    pub age: serde_json::Value,
    /// Gender
    pub gender: String,
    /// Appearance
    pub appearance: String,
    /// Fields not covered above
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// One character.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CharacterProfile {
    /// Name
    pub name: String,
    /// Physical attributes
    pub attributes: CharacterAttributes,
    /// Abilities
    pub abilities: TextOrList,
    /// Personality traits
    pub traits: TextOrList,
    /// Backstory
    pub backstory: String,
    /// Motivations
    pub motivations: TextOrList,
    /// Fields not covered above
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// Character stage payload; the `characters` wrapper is required.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CharacterRoster {
    /// Characters
    pub characters: Vec<CharacterProfile>,
}

impl CharacterRoster {
    /// Names of every character.
    pub fn names(&self) -> Vec<&str> {
        self.characters.iter().map(|c| c.name.as_str()).collect()
    }
}
