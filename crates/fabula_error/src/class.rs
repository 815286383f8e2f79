//! Coarse failure classification.

/// Coarse category of a failure, for callers mapping errors onto a
/// transport status.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    serde::Serialize,
    serde::Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum FailureClass {
    /// Something referenced does not exist (or is not visible to the caller)
    Missing,
    /// Request conflicts with the current lifecycle state
    Conflict,
    /// Request input is malformed
    Invalid,
    /// Language model or media collaborator misbehaved
    Upstream,
    /// Anything else
    Internal,
}

impl FailureClass {
    /// Conventional HTTP status code for this class.
    pub fn status_code(self) -> u16 {
        match self {
            Self::Missing => 404,
            Self::Conflict => 409,
            Self::Invalid => 400,
            Self::Upstream => 502,
            Self::Internal => 500,
        }
    }
}
