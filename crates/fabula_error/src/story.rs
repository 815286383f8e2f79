//! Story lifecycle error types.

/// Specific error conditions for staged story operations.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum StoryErrorKind {
    /// Story, artifact, or stage reference is missing or not owned by the caller
    #[display("Not found: {}", _0)]
    NotFound(String),
    /// Stage (or visual slot) is already present
    #[display("Already exists: {}", _0)]
    AlreadyExists(String),
    /// Stage has been saved and can no longer be refined
    #[display("Stage '{}' is locked", _0)]
    AlreadyLocked(String),
    /// An upstream stage required by this one is missing or unsaved
    #[display("Stage '{}' requires '{}' first", stage, missing)]
    PrerequisiteMissing {
        /// Stage being operated on
        stage: String,
        /// Upstream stage that is not ready
        missing: String,
    },
    /// Language model call errored or timed out
    #[display("Generation failed: {}", _0)]
    GenerationFailed(String),
    /// Model output violated the structured-output contract
    #[display("Could not parse model output: {}", _0)]
    ParseError(String),
    /// Store write failed after a successful generation
    #[display("Persistence failed: {}", message)]
    PersistenceError {
        /// Store failure message
        message: String,
        /// Generated payload (details encoding) that would otherwise be lost
        recovered: Option<String>,
    },
    /// Identifier is not a syntactically valid id
    #[display("Invalid identifier: {}", _0)]
    InvalidIdentifier(String),
    /// Request input is unusable
    #[display("Invalid input: {}", _0)]
    InvalidInput(String),
    /// Prompt template is malformed or was rendered without a slot value
    #[display("Template error: {}", _0)]
    Template(String),
}

/// Error type for staged story operations.
///
/// # Examples
///
/// ```
/// use fabula_error::{StoryError, StoryErrorKind};
///
/// let err = StoryError::new(StoryErrorKind::AlreadyLocked("theme".to_string()));
/// assert!(format!("{}", err).contains("locked"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Story Error: {} at line {} in {}", kind, line, file)]
pub struct StoryError {
    /// The kind of error that occurred
    pub kind: StoryErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl StoryError {
    /// Create a new story error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: StoryErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Get the error kind.
    pub fn kind(&self) -> &StoryErrorKind {
        &self.kind
    }
}
