//! Structured stage payloads.
//!
//! Every payload type accepts the loosely-shaped JSON language models emit:
//! most fields default when absent, list-or-string fields use
//! [`TextOrList`], and unrecognised fields are preserved in an `extra` map so
//! a refinement never silently drops model output.

mod character;
mod plot;
mod text;
mod theme;
mod world;

pub use character::{CharacterAttributes, CharacterProfile, CharacterRoster};
pub use plot::{Act, Addressee, DialogueLine, Episode, PlotOutline, Scene};
pub use text::TextOrList;
pub use theme::{Conflict, EpisodeTheme, ThemeConcept};
pub use world::{
    Culture, CulturalDiversity, Geography, KeyLocation, WorldAttributes, WorldDocument,
    WorldSetting,
};

use crate::Stage;
use fabula_error::JsonError;
use serde::{Deserialize, Serialize};

/// Payload of one stage artifact.
///
/// # Examples
///
/// ```
/// use fabula_core::{Stage, StagePayload, ThemeConcept};
///
/// let payload = StagePayload::Theme(ThemeConcept {
///     premise: "A lighthouse keeper hears the sea speak".into(),
///     ..Default::default()
/// });
/// let details = payload.to_details().unwrap();
/// assert_eq!(StagePayload::from_details(Stage::Theme, &details).unwrap(), payload);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, derive_more::From)]
#[serde(tag = "stage", content = "data", rename_all = "snake_case")]
pub enum StagePayload {
    /// Story concept
    Theme(ThemeConcept),
    /// World setting
    World(WorldDocument),
    /// Character roster
    Character(CharacterRoster),
    /// Plot outline
    Plot(PlotOutline),
}

impl StagePayload {
    /// Stage this payload belongs to.
    pub fn stage(&self) -> Stage {
        match self {
            StagePayload::Theme(_) => Stage::Theme,
            StagePayload::World(_) => Stage::World,
            StagePayload::Character(_) => Stage::Character,
            StagePayload::Plot(_) => Stage::Plot,
        }
    }

    /// The payload as a JSON value in its model-facing shape.
    #[track_caller]
    pub fn to_value(&self) -> Result<serde_json::Value, JsonError> {
        let value = match self {
            StagePayload::Theme(p) => serde_json::to_value(p),
            StagePayload::World(p) => serde_json::to_value(p),
            StagePayload::Character(p) => serde_json::to_value(p),
            StagePayload::Plot(p) => serde_json::to_value(p),
        };
        value.map_err(|e| {
            JsonError::new(format!(
                "Failed to serialize {} payload: {}",
                self.stage(),
                e
            ))
        })
    }

    /// Legacy `details` encoding: the model-facing JSON as a string.
    #[track_caller]
    pub fn to_details(&self) -> Result<String, JsonError> {
        let value = self.to_value()?;
        serde_json::to_string(&value)
            .map_err(|e| JsonError::new(format!("Failed to encode details: {}", e)))
    }

    /// Pretty-printed model-facing JSON, used as refinement context.
    #[track_caller]
    pub fn to_pretty_json(&self) -> Result<String, JsonError> {
        let value = self.to_value()?;
        serde_json::to_string_pretty(&value)
            .map_err(|e| JsonError::new(format!("Failed to encode details: {}", e)))
    }

    /// Decode a stage payload from a JSON value in its model-facing shape.
    #[track_caller]
    pub fn from_value(stage: Stage, value: serde_json::Value) -> Result<Self, JsonError> {
        let payload = match stage {
            Stage::Theme => serde_json::from_value(value).map(StagePayload::Theme),
            Stage::World => serde_json::from_value(value).map(StagePayload::World),
            Stage::Character => serde_json::from_value(value).map(StagePayload::Character),
            Stage::Plot => serde_json::from_value(value).map(StagePayload::Plot),
        };
        payload.map_err(|e| JsonError::new(format!("Invalid {} payload: {}", stage, e)))
    }

    /// Decode the legacy `details` string encoding.
    #[track_caller]
    pub fn from_details(stage: Stage, details: &str) -> Result<Self, JsonError> {
        let value: serde_json::Value = serde_json::from_str(details)
            .map_err(|e| JsonError::new(format!("Invalid details JSON: {}", e)))?;
        Self::from_value(stage, value)
    }
}
