//! Turns raw model output into typed stage payloads.

use crate::extraction::{extract_json, parse_json};
use fabula_core::{Stage, StagePayload};
use fabula_error::{FabulaResult, StoryError, StoryErrorKind};
use serde_json::Value;

/// Fields a theme object is expected to carry at least one of.
const THEME_FIELDS: &[&str] = &["core_theme", "premise", "genres", "conflict"];

/// Parses model output for a stage.
///
/// Accepts bare JSON, JSON inside a markdown fence, or JSON surrounded by
/// prose. Output shaped as `{"response": "<json string>"}` or
/// `{"response": {...}}` is unwrapped first.
///
/// # Examples
///
/// ```
/// use fabula_core::{Stage, StagePayload};
/// use fabula_narrative::ResponseParser;
///
/// let raw = r#"{"response": "{\"characters\": [{\"name\": \"Mara\"}]}"}"#;
/// let payload = ResponseParser::new().parse(Stage::Character, raw).unwrap();
/// match payload {
///     StagePayload::Character(roster) => assert_eq!(roster.names(), vec!["Mara"]),
///     other => panic!("unexpected payload {:?}", other),
/// }
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct ResponseParser;

impl ResponseParser {
    /// Create a parser.
    pub fn new() -> Self {
        Self
    }

    /// Parse `raw` model output as the payload for `stage`.
    ///
    /// Parsing a payload's own [`to_details`](StagePayload::to_details)
    /// encoding gives the payload back, with one exception: a plot outline
    /// with no episodes encodes to `{}` and is rejected, since the model must
    /// produce at least one episode.
    ///
    /// # Errors
    ///
    /// `ParseError` if no JSON is found, the JSON lacks the stage's required
    /// top-level structure, or it does not fit the stage schema.
    #[tracing::instrument(skip(self, raw), fields(stage = %stage, raw_len = raw.len()))]
    pub fn parse(&self, stage: Stage, raw: &str) -> FabulaResult<StagePayload> {
        let json = extract_json(raw)?;
        let value = unwrap_response(parse_json::<Value>(&json)?)?;

        validate_shape(stage, &value)?;

        StagePayload::from_value(stage, value).map_err(|e| {
            tracing::warn!(error = %e.message, "Model output does not fit stage schema");
            parse_error(e.message)
        })
    }
}

/// Unwrap the legacy `{"response": ...}` envelope.
fn unwrap_response(value: Value) -> FabulaResult<Value> {
    let Value::Object(mut map) = value else {
        return Ok(value);
    };

    if map.len() != 1 || !map.contains_key("response") {
        return Ok(Value::Object(map));
    }

    match map.remove("response") {
        Some(Value::String(inner)) => {
            tracing::debug!("Unwrapping double-encoded response field");
            let json = extract_json(&inner)?;
            parse_json(&json)
        }
        Some(inner @ Value::Object(_)) => Ok(inner),
        Some(other) => Err(parse_error(format!(
            "'response' field holds {} instead of an object",
            type_name(&other)
        ))),
        None => Ok(Value::Object(map)),
    }
}

fn validate_shape(stage: Stage, value: &Value) -> FabulaResult<()> {
    let Value::Object(map) = value else {
        return Err(parse_error(format!(
            "{} output must be a JSON object, got {}",
            stage,
            type_name(value)
        )));
    };

    if let Some(field) = stage.wrapper_field() {
        if !map.contains_key(field) {
            return Err(parse_error(format!(
                "{} output is missing the '{}' field",
                stage, field
            )));
        }
        return Ok(());
    }

    match stage {
        Stage::Theme if !THEME_FIELDS.iter().any(|f| map.contains_key(*f)) => Err(parse_error(
            format!("theme output has none of {}", THEME_FIELDS.join(", ")),
        )),
        Stage::Plot if map.is_empty() => Err(parse_error("plot output has no episodes")),
        _ => Ok(()),
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn parse_error(message: impl Into<String>) -> fabula_error::FabulaError {
    StoryError::new(StoryErrorKind::ParseError(message.into())).into()
}
