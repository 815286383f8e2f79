//! Story document stores for Fabula.
//!
//! Two [`StoryRepository`](fabula_interface::StoryRepository) implementations:
//! - [`InMemoryStoryRepository`]: `HashMap`s behind a `tokio` `RwLock`; for tests
//!   and ephemeral runs
//! - [`FileSystemStoryRepository`]: one JSON document per entity, written
//!   atomically via temp file + rename

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod documents;
mod filesystem;
mod memory;

pub use filesystem::FileSystemStoryRepository;
pub use memory::InMemoryStoryRepository;
