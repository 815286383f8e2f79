//! World setting payload.

use super::TextOrList;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Physical geography.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Geography {
    /// Landforms
    pub landforms: TextOrList,
    /// Climate
    pub climate: TextOrList,
    /// Seasonal variation; free-form
    pub seasonal_variation: serde_json::Value,
    /// Seasons
    pub seasons: TextOrList,
    /// Natural resources
    pub natural_resources: TextOrList,
    /// Natural disasters
    pub natural_disasters: TextOrList,
    /// Fields not covered above
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// One culture of the world.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Culture {
    /// Culture name
    pub name: String,
    /// Customs
    pub customs: TextOrList,
    /// Traditions
    pub traditions: TextOrList,
    /// Fields not covered above
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// Cultures, languages, and beliefs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CulturalDiversity {
    /// Cultures
    pub cultures: Vec<Culture>,
    /// Languages; free-form
    pub languages: serde_json::Value,
    /// Social structures; free-form
    pub social_structures: serde_json::Value,
    /// Belief systems
    pub belief_systems: TextOrList,
    /// Fields not covered above
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// Technology, magic, and institutions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldAttributes {
    /// Technology level
    pub technology_level: TextOrList,
    /// Magic systems
    pub magic_systems: TextOrList,
    /// Societal norms
    pub societal_norms: TextOrList,
    /// Economic systems
    pub economic_systems: TextOrList,
    /// Political structures
    pub political_structures: TextOrList,
    /// Current world states
    pub world_states: TextOrList,
    /// Fields not covered above
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// A notable place.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyLocation {
    /// Place name
    pub name: String,
    /// What it looks like
    pub description: String,
    /// Where it is
    pub location: String,
    /// Why it matters
    pub significance: String,
}

/// The world the story takes place in.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldSetting {
    /// Genre
    pub genre: TextOrList,
    /// Geography
    pub geography: Geography,
    /// Cultural diversity
    pub cultural_diversity: CulturalDiversity,
    /// World attributes
    pub attributes: WorldAttributes,
    /// Year or era
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<serde_json::Value>,
    /// Key locations
    pub key_locations: Vec<KeyLocation>,
    /// History
    pub history: TextOrList,
    /// Overview
    pub description: String,
    /// Fields not covered above
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// World stage payload; the `world_setting` wrapper is required.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorldDocument {
    /// The setting
    pub world_setting: WorldSetting,
}
