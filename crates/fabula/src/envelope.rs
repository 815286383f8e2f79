//! Response envelope for callers outside the library.

use fabula_error::{FabulaError, FabulaResult, FailureClass};
use serde::{Deserialize, Serialize};

/// Uniform `{success, message, data}` response.
///
/// Failures never panic: any [`FabulaError`] becomes a `success: false`
/// envelope carrying the error message, its [`FailureClass`], and the
/// matching status code.
///
/// # Examples
///
/// ```
/// use fabula::Envelope;
/// use fabula_error::{FabulaError, FailureClass, StoryError, StoryErrorKind};
///
/// let ok = Envelope::ok(42, "Answer found");
/// assert!(ok.success);
/// assert_eq!(ok.status, 200);
///
/// let err: FabulaError = StoryError::new(StoryErrorKind::AlreadyLocked("theme".into())).into();
/// let failed = Envelope::<()>::failure(&err);
/// assert!(!failed.success);
/// assert_eq!(failed.class, Some(FailureClass::Conflict));
/// assert_eq!(failed.status, 409);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T> {
    /// Whether the operation succeeded
    pub success: bool,
    /// Human-readable outcome
    pub message: String,
    /// Operation result
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// Transport status code
    pub status: u16,
    /// Failure category
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class: Option<FailureClass>,
}

impl<T> Envelope<T> {
    /// Successful envelope.
    pub fn ok(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
            status: 200,
            class: None,
        }
    }

    /// Successful envelope for a newly created resource.
    pub fn created(data: T, message: impl Into<String>) -> Self {
        Self {
            status: 201,
            ..Self::ok(data, message)
        }
    }

    /// Failed envelope describing `error`.
    pub fn failure(error: &FabulaError) -> Self {
        let class = error.class();
        Self {
            success: false,
            message: error.message(),
            data: None,
            status: class.status_code(),
            class: Some(class),
        }
    }

    /// Wrap an operation result.
    pub fn from_result(result: FabulaResult<T>, message: impl Into<String>) -> Self {
        match result {
            Ok(data) => Self::ok(data, message),
            Err(e) => {
                tracing::debug!(error = %e, "Operation failed");
                Self::failure(&e)
            }
        }
    }
}

impl<T: Serialize> Envelope<T> {
    /// Pretty JSON rendering.
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|e| {
            format!(
                r#"{{"success": false, "message": "Failed to encode response: {}", "status": 500}}"#,
                e
            )
        })
    }
}
