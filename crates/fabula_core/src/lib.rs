//! Core data types for the Fabula staged story generator.
//!
//! A [`Story`] owns up to four narrative [`Artifact`]s (theme, world,
//! characters, plot), each produced by a language model in a fixed
//! [`Stage`] order, plus an optional [`Visual`] collection. This crate holds
//! the documents, their typed payloads, and the chat types exchanged with
//! model drivers. It performs no I/O.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod artifact;
mod ids;
mod message;
mod output;
mod payload;
mod request;
mod role;
mod stage;
mod story;
mod visual;

pub use artifact::{Artifact, Lineage};
pub use ids::{ArtifactId, StoryId, UserId, VisualId};
pub use message::Message;
pub use output::Output;
pub use payload::{
    Act, Addressee, CharacterAttributes, CharacterProfile, CharacterRoster, Conflict, Culture,
    CulturalDiversity, DialogueLine, Episode, EpisodeTheme, Geography, KeyLocation, PlotOutline,
    Scene, StagePayload, TextOrList, ThemeConcept, WorldAttributes, WorldDocument, WorldSetting,
};
pub use request::{GenerateRequest, GenerateRequestBuilder, GenerateResponse, ResponseFormat};
pub use role::Role;
pub use stage::{Stage, StageState};
pub use story::{SaveStatus, Story, StorySummary};
pub use visual::{Visual, VisualAsset, VisualItem, VisualSlot};
