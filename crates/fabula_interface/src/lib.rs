//! Trait definitions for the Fabula staged story generator.
//!
//! Three seams separate the staged-generation core from its collaborators:
//! - [`FabulaDriver`]: a chat-completion language model
//! - [`StoryRepository`]: the document store for stories, artifacts, and visuals
//! - [`MediaGenerator`]: an image/video generation backend

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod driver;
mod media;
mod repository;

pub use driver::FabulaDriver;
pub use media::MediaGenerator;
pub use repository::StoryRepository;
