//! Plot outline payload.
//!
//! Shape: episode key → episode (title + scenes), scene key → act key → act.
//! Keys keep whatever names the model chose (`episode_one`, `scene_one`,
//! `act_one`, ...).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Marker for a line delivered to nobody in particular.
const NONE_MARKER: &str = "NONE";
/// Marker for an internal monologue.
const THINKING_MARKER: &str = "THINKING";

/// Who a dialogue line is addressed to.
///
/// ```
/// use fabula_core::Addressee;
///
/// let thinking: Addressee = serde_json::from_str("\"THINKING\"").unwrap();
/// assert_eq!(thinking, Addressee::Thinking);
///
/// let pair: Addressee = serde_json::from_str("[\"Mara\", \"Ilse\"]").unwrap();
/// assert_eq!(pair, Addressee::Characters(vec!["Mara".into(), "Ilse".into()]));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "AddresseeRepr", into = "AddresseeRepr")]
pub enum Addressee {
    /// Spoken to the listed characters
    Characters(Vec<String>),
    /// Spoken to no one
    #[default]
    Nobody,
    /// Internal thought
    Thinking,
}

#[derive(Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum AddresseeRepr {
    List(Vec<String>),
    Marker(String),
}

impl From<AddresseeRepr> for Addressee {
    fn from(repr: AddresseeRepr) -> Self {
        match repr {
            AddresseeRepr::List(names) => Addressee::Characters(names),
            AddresseeRepr::Marker(marker) if marker.eq_ignore_ascii_case(NONE_MARKER) => {
                Addressee::Nobody
            }
            AddresseeRepr::Marker(marker) if marker.eq_ignore_ascii_case(THINKING_MARKER) => {
                Addressee::Thinking
            }
            AddresseeRepr::Marker(name) => Addressee::Characters(vec![name]),
        }
    }
}

impl From<Addressee> for AddresseeRepr {
    fn from(addressee: Addressee) -> Self {
        match addressee {
            Addressee::Characters(names) => AddresseeRepr::List(names),
            Addressee::Nobody => AddresseeRepr::Marker(NONE_MARKER.to_string()),
            Addressee::Thinking => AddresseeRepr::Marker(THINKING_MARKER.to_string()),
        }
    }
}

/// One line of dialogue with its surrounding actions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DialogueLine {
    /// Speaking character
    pub character: String,
    /// Addressee
    pub speaking_to: Addressee,
    /// Action before speaking, or `NO_ACTION`
    pub before_action: String,
    /// The line, prefixed with the emotion in parentheses
    pub line: String,
    /// Action after speaking, or `NO_ACTION`
    pub after_action: String,
}

/// One act of a scene.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Act {
    /// What happens
    pub description: String,
    /// Dialogue in order
    pub dialogue: Vec<DialogueLine>,
    /// Character name → emotional cue
    pub emotional_cues: BTreeMap<String, String>,
    /// Fields not covered above
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// Acts of one scene keyed by act name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Scene {
    /// Acts
    pub acts: BTreeMap<String, Act>,
}

/// One episode: a title plus scenes keyed by scene name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Episode {
    /// Episode title
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Scenes
    #[serde(flatten)]
    pub scenes: BTreeMap<String, Scene>,
}

/// Plot stage payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlotOutline {
    /// Episodes keyed by episode name
    pub episodes: BTreeMap<String, Episode>,
}

impl PlotOutline {
    /// Every dialogue line, in key order.
    pub fn dialogue(&self) -> impl Iterator<Item = &DialogueLine> {
        self.episodes
            .values()
            .flat_map(|episode| episode.scenes.values())
            .flat_map(|scene| scene.acts.values())
            .flat_map(|act| act.dialogue.iter())
    }

    /// The act at `episode_{episode}` / `scene_{scene}` / `act_{act}`.
    pub fn act(&self, episode: u32, scene: u32, act: u32) -> Option<&Act> {
        self.episodes
            .get(&format!("episode_{}", episode))?
            .scenes
            .get(&format!("scene_{}", scene))?
            .acts
            .get(&format!("act_{}", act))
    }
}
