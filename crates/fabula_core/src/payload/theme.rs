//! Story concept payload.

use super::TextOrList;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// External and internal conflict of the story.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Conflict {
    /// Conflict with the outside world
    pub external: String,
    /// Conflict within the protagonist
    pub internal: String,
}

/// Per-episode theme.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EpisodeTheme {
    /// Episode number or label
    pub episode: serde_json::Value,
    /// Theme of the episode
    pub theme: String,
    /// What happens thematically
    pub description: String,
}

/// Theme stage payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeConcept {
    /// Central themes
    pub core_theme: TextOrList,
    /// Genres
    pub genres: TextOrList,
    /// One-paragraph premise
    pub premise: String,
    /// Driving conflict
    pub conflict: Conflict,
    /// Emotional journey
    pub emotional_arc: String,
    /// Hooks that pull the audience in
    pub narrative_hooks: TextOrList,
    /// Target audience
    pub intended_audience: String,
    /// Themes per episode
    pub episode_themes: Vec<EpisodeTheme>,
    /// Fields not covered above
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}
