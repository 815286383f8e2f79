//! HTTP error types.

/// Transport failure talking to a media backend.
///
/// Language model providers report transport problems as
/// [`ModelsError`](crate::ModelsError).
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("HTTP Error: {} at line {} in {}", message, line, file)]
pub struct HttpError {
    /// Transport message
    pub message: String,
    /// Source line
    pub line: u32,
    /// Source file
    pub file: &'static str,
}

impl HttpError {
    /// Record a transport failure at the caller's location.
    ///
    /// ```
    /// use fabula_error::{FabulaError, FailureClass, HttpError};
    ///
    /// let err: FabulaError = HttpError::new("connection refused").into();
    /// assert_eq!(err.class(), FailureClass::Upstream);
    /// ```
    #[track_caller]
    pub fn new(message: impl Into<String>) -> Self {
        let location = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: location.line(),
            file: location.file(),
        }
    }
}
