//! JSON error types.

/// Failure encoding or decoding a document or stage payload.
///
/// ```
/// use fabula_error::JsonError;
///
/// let err = JsonError::new("Invalid world payload: missing field `world_setting`");
/// assert!(err.to_string().starts_with("JSON Error: Invalid world payload"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("JSON Error: {} at line {} in {}", message, line, file)]
pub struct JsonError {
    /// What failed to encode or decode
    pub message: String,
    /// Source line
    pub line: u32,
    /// Source file
    pub file: &'static str,
}

impl JsonError {
    /// Record a JSON failure at the caller's location.
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
