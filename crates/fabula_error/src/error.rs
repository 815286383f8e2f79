//! Top-level error wrapper types.

use crate::{
    ConfigError, FailureClass, HttpError, JsonError, ModelsError, StorageError, StoryError,
    StoryErrorKind,
};

/// Every error the workspace can produce.
///
/// # Examples
///
/// ```
/// use fabula_error::{FabulaError, HttpError};
///
/// let http_err = HttpError::new("Connection failed");
/// let err: FabulaError = http_err.into();
/// assert!(format!("{}", err).contains("HTTP Error"));
/// ```
#[derive(Debug, derive_more::From, derive_more::Display, derive_more::Error)]
pub enum FabulaErrorKind {
    /// Story lifecycle error
    #[from(StoryError)]
    Story(StoryError),
    /// HTTP error
    #[from(HttpError)]
    Http(HttpError),
    /// JSON serialization/deserialization error
    #[from(JsonError)]
    Json(JsonError),
    /// Configuration error
    #[from(ConfigError)]
    Config(ConfigError),
    /// Storage error
    #[from(StorageError)]
    Storage(StorageError),
    /// Model provider error
    #[from(ModelsError)]
    Models(ModelsError),
}

/// Fabula error with kind discrimination.
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("Fabula Error: {}", _0)]
pub struct FabulaError(Box<FabulaErrorKind>);

impl FabulaError {
    /// Create a new error from a kind.
    pub fn new(kind: FabulaErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &FabulaErrorKind {
        &self.0
    }

    /// Story lifecycle kind, if this is a story error.
    pub fn story_kind(&self) -> Option<&StoryErrorKind> {
        match self.kind() {
            FabulaErrorKind::Story(e) => Some(e.kind()),
            _ => None,
        }
    }

    /// Classify this error.
    ///
    /// ```
    /// use fabula_error::{FabulaError, FailureClass, StoryError, StoryErrorKind};
    ///
    /// let err: FabulaError =
    ///     StoryError::new(StoryErrorKind::AlreadyExists("world".into())).into();
    /// assert_eq!(err.class(), FailureClass::Conflict);
    /// ```
    pub fn class(&self) -> FailureClass {
        match self.kind() {
            FabulaErrorKind::Story(e) => match e.kind() {
                StoryErrorKind::NotFound(_) => FailureClass::Missing,
                StoryErrorKind::AlreadyExists(_)
                | StoryErrorKind::AlreadyLocked(_)
                | StoryErrorKind::PrerequisiteMissing { .. } => FailureClass::Conflict,
                StoryErrorKind::InvalidIdentifier(_) | StoryErrorKind::InvalidInput(_) => {
                    FailureClass::Invalid
                }
                StoryErrorKind::GenerationFailed(_) | StoryErrorKind::ParseError(_) => {
                    FailureClass::Upstream
                }
                StoryErrorKind::PersistenceError { .. } | StoryErrorKind::Template(_) => {
                    FailureClass::Internal
                }
            },
            FabulaErrorKind::Http(_) | FabulaErrorKind::Models(_) => FailureClass::Upstream,
            FabulaErrorKind::Json(_)
            | FabulaErrorKind::Config(_)
            | FabulaErrorKind::Storage(_) => FailureClass::Internal,
        }
    }

    /// Human-readable message without the location suffix.
    pub fn message(&self) -> String {
        match self.kind() {
            FabulaErrorKind::Story(e) => e.kind.to_string(),
            FabulaErrorKind::Http(e) => e.message.clone(),
            FabulaErrorKind::Json(e) => e.message.clone(),
            FabulaErrorKind::Config(e) => e.message.clone(),
            FabulaErrorKind::Storage(e) => e.kind.to_string(),
            FabulaErrorKind::Models(e) => e.kind.to_string(),
        }
    }
}

// Generic From implementation for any type that converts to FabulaErrorKind
impl<T> From<T> for FabulaError
where
    T: Into<FabulaErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

/// Result type for Fabula operations.
///
/// # Examples
///
/// ```
/// use fabula_error::{FabulaResult, HttpError};
///
/// fn fetch_data() -> FabulaResult<String> {
///     Err(HttpError::new("404 Not Found"))?
/// }
/// ```
pub type FabulaResult<T> = std::result::Result<T, FabulaError>;
