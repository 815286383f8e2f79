//! Fabula - staged story co-writing with language models.
//!
//! A story is written in a fixed order of stages, each generated by a
//! language model from the stages before it and then refined until saved:
//!
//! 1. **Theme** - premise, genres, conflict, emotional arc
//! 2. **World** - geography, cultures, history, key locations
//! 3. **Character** - the cast, grounded in the world
//! 4. **Plot** - episodes, scenes, acts, and dialogue
//! 5. **Visuals** - scene images and a story video
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use fabula::{Fabula, FabulaConfig, Stage, UserId};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let app = Fabula::from_config(&FabulaConfig::load()?)?;
//!     let user = UserId::new();
//!
//!     let story = app.gate().create_story(user).await?;
//!     let theme = app
//!         .gate()
//!         .create(Stage::Theme, story.id, user, "A ghost story in a lighthouse")
//!         .await?;
//!     app.gate().save(Stage::Theme, story.id, user, theme.artifact_id).await?;
//!     Ok(())
//! }
//! ```
//!
//! # Cargo Features
//!
//! - `observability` - Bridge tracing spans to OpenTelemetry's stdout exporter
//! - `api` - Enable tests that call the live model API
//!
//! # Architecture
//!
//! - `fabula_core` - Story, artifact, payload, and request types
//! - `fabula_interface` - Driver, media, and repository traits
//! - `fabula_error` - Error types
//! - `fabula_models` - Groq / OpenAI-compatible driver
//! - `fabula_storage` - In-memory and filesystem repositories
//! - `fabula_narrative` - Stage gate, prompts, sessions, parsing
//!
//! This crate (`fabula`) re-exports everything for convenience and adds
//! configuration, the response envelope, and the CLI.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod app;
mod config;
mod envelope;
mod observability;

pub use app::{Fabula, FabulaBuilder};
pub use config::{FabulaConfig, ModelConfig, StorageBackend, StorageConfig};
pub use envelope::Envelope;
pub use observability::{ObservabilityConfig, init_observability_with_config};

// Re-export core crates
pub use fabula_core::*;
pub use fabula_error::*;
pub use fabula_interface::*;
pub use fabula_models::{GroqDriver, OpenAICompatibleClient, RetryPolicy};
pub use fabula_narrative::{
    ArtifactView, ConversationSession, GateConfig, PrerequisitePolicy, PromptBuilder,
    ResponseParser, SessionConfig, StageGate, StageOutcome, StageTemplate, StoryCatalog,
    StoryLocks, StoryStatus, Template, VisualService,
};
pub use fabula_storage::{FileSystemStoryRepository, InMemoryStoryRepository};
