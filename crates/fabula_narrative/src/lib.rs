//! Staged story generation engine for Fabula.
//!
//! A story is built in a fixed order of stages (theme, world, characters,
//! plot) plus a visual collection. Each stage moves through
//! `ABSENT → DRAFT → LOCKED`:
//!
//! - [`StageGate::create`] generates the first draft once every upstream stage
//!   is ready
//! - [`StageGate::refine`] regenerates a draft from the current payload and an
//!   instruction, until the stage is saved
//! - [`StageGate::save`] locks the stage; no model call is made
//!
//! Generation goes through a [`ConversationSession`] so refinements see a
//! rolling summary of earlier exchanges, prompts come from typed
//! [`Template`]s, and model output is turned into typed payloads by the
//! [`ResponseParser`]. Every mutating operation on a story runs inside that
//! story's exclusive section from [`StoryLocks`].

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod catalog;
mod extraction;
mod gate;
mod locks;
mod parser;
mod prompt;
mod session;
mod visual;

pub use catalog::{ArtifactView, StoryCatalog};
pub use extraction::{extract_json, parse_json};
pub use gate::{GateConfig, PrerequisitePolicy, StageGate, StageOutcome, StoryStatus};
pub use locks::{StoryGuard, StoryLocks};
pub use parser::ResponseParser;
pub use prompt::{PromptBuilder, Slot, StageTemplate, Template, Upstream, escape_template_syntax};
pub use session::{ConversationSession, SessionConfig, SessionTurn};
pub use visual::VisualService;
