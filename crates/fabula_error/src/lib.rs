//! Error types for the Fabula workspace.
//!
//! # Error Hierarchy
//!
//! All errors follow the `ErrorKind` + wrapper struct pattern:
//! - `*ErrorKind` enum defines specific error conditions
//! - `*Error` struct wraps the kind with source location tracking
//! - All errors use `#[track_caller]` for automatic location capture
//!
//! Callers that need to react to a failure (for example to pick a transport
//! status) use [`FabulaError::class`], which is derived from the tagged
//! variant and never from message text.
//!
//! # Examples
//!
//! ```
//! use fabula_error::{FabulaResult, FailureClass, StoryError, StoryErrorKind};
//!
//! fn lookup() -> FabulaResult<String> {
//!     Err(StoryError::new(StoryErrorKind::NotFound("story".to_string())))?
//! }
//!
//! let err = lookup().unwrap_err();
//! assert_eq!(err.class(), FailureClass::Missing);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod class;
mod config;
mod error;
mod http;
mod json;
mod models;
mod storage;
mod story;

pub use class::FailureClass;
pub use config::ConfigError;
pub use error::{FabulaError, FabulaErrorKind, FabulaResult};
pub use http::HttpError;
pub use json::JsonError;
pub use models::{ModelsError, ModelsErrorKind, ModelsResult};
pub use storage::{StorageError, StorageErrorKind};
pub use story::{StoryError, StoryErrorKind};
