//! Utilities for extracting JSON from model responses.
//!
//! Even in JSON mode, models sometimes wrap output in markdown code blocks or
//! surround it with explanatory text. Extraction tries, in order:
//! 1. Markdown code blocks: ```json ... ```
//! 2. Balanced braces or brackets in order of appearance, keeping the first
//!    block that is valid JSON (prose like `[v2]` is skipped)

use fabula_error::{FabulaResult, StoryError, StoryErrorKind};

/// Extract JSON from a response that may contain markdown or extra text.
///
/// # Errors
///
/// Returns a `ParseError` if no JSON structure is found. When balanced
/// blocks exist but none is valid JSON, the first one is returned so the
/// caller's parse reports what was wrong with it.
///
/// # Examples
///
/// ```
/// use fabula_narrative::extract_json;
///
/// let response = "Here is the world:\n```json\n{\"world_setting\": {}}\n```\n";
/// assert_eq!(extract_json(response).unwrap(), "{\"world_setting\": {}}");
/// ```
pub fn extract_json(response: &str) -> FabulaResult<String> {
    if let Some(json) = extract_from_code_block(response, "json") {
        return Ok(json);
    }

    let mut first_balanced = None;
    for (start, ch) in response.char_indices() {
        let close = match ch {
            '{' => '}',
            '[' => ']',
            _ => continue,
        };
        let Some(candidate) = extract_balanced(&response[start..], ch, close) else {
            continue;
        };
        if serde_json::from_str::<serde_json::Value>(&candidate).is_ok() {
            return Ok(candidate);
        }
        first_balanced.get_or_insert(candidate);
    }

    first_balanced.ok_or_else(|| {
        tracing::error!(
            response_length = response.len(),
            "No JSON found in model response"
        );
        StoryError::new(StoryErrorKind::ParseError(format!(
            "No JSON found in response (length: {})",
            response.len()
        )))
        .into()
    })
}

/// Extract content from markdown code blocks.
///
/// Looks for ```` ```language ```` first, then any fence. An unclosed fence
/// (truncated response) yields everything after it.
fn extract_from_code_block(response: &str, language: &str) -> Option<String> {
    let pattern = format!("```{}", language);

    if let Some(start) = response.find(&pattern) {
        let content_start = start + pattern.len();
        let content = match response[content_start..].find("```") {
            Some(end) => &response[content_start..content_start + end],
            None => &response[content_start..],
        };
        return Some(content.trim().to_string());
    }

    let start = response.find("```")?;
    let content_start = start + 3;
    // Skip an unknown language tag
    let skip_to = response[content_start..]
        .find('\n')
        .map(|n| content_start + n + 1)
        .unwrap_or(content_start);

    let content = match response[skip_to..].find("```") {
        Some(end) => &response[skip_to..skip_to + end],
        None => &response[skip_to..],
    };
    Some(content.trim().to_string())
}

/// Extract content between balanced delimiters, ignoring delimiters inside
/// JSON strings.
fn extract_balanced(response: &str, open: char, close: char) -> Option<String> {
    let start = response.find(open)?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escape_next = false;

    for (i, ch) in response[start..].char_indices() {
        if escape_next {
            escape_next = false;
            continue;
        }

        match ch {
            '\\' if in_string => escape_next = true,
            '"' => in_string = !in_string,
            c if c == open && !in_string => depth += 1,
            c if c == close && !in_string => {
                depth -= 1;
                if depth == 0 {
                    return Some(response[start..start + i + ch.len_utf8()].to_string());
                }
            }
            _ => {}
        }
    }

    None
}

/// Parse JSON into a specific type, reporting a preview on failure.
///
/// # Errors
///
/// Returns a `ParseError` if the text cannot be parsed into `T`.
///
/// # Examples
///
/// ```
/// use fabula_narrative::parse_json;
/// use serde::Deserialize;
///
/// #[derive(Deserialize)]
/// struct Hook {
///     text: String,
/// }
///
/// let hook: Hook = parse_json(r#"{"text": "The bell rings at low tide"}"#).unwrap();
/// assert_eq!(hook.text, "The bell rings at low tide");
/// ```
pub fn parse_json<T>(json_str: &str) -> FabulaResult<T>
where
    T: serde::de::DeserializeOwned,
{
    serde_json::from_str(json_str).map_err(|e| {
        let preview = json_str.chars().take(100).collect::<String>();

        tracing::error!(
            error = %e,
            json_preview = %preview,
            "JSON parsing failed"
        );

        StoryError::new(StoryErrorKind::ParseError(format!(
            "Failed to parse JSON: {} (JSON: {}...)",
            e, preview
        )))
        .into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_json_from_code_block() {
        let response = r#"
Here's the concept:

```json
{
  "premise": "A lighthouse that remembers"
}
```

Enjoy!
"#;
        let json = extract_json(response).unwrap();
        assert!(json.contains("\"premise\""));
        assert!(json.starts_with('{'));
    }

    #[test]
    fn test_extract_json_from_unlabelled_fence() {
        let response = "```\n{\"a\": 1}\n```";
        assert_eq!(extract_json(response).unwrap(), "{\"a\": 1}");
    }

    #[test]
    fn test_extract_json_balanced_braces() {
        let response = r#"Sure! {"world_setting": {"genre": ["gothic"]}} Let me know."#;
        let json = extract_json(response).unwrap();
        assert_eq!(json, r#"{"world_setting": {"genre": ["gothic"]}}"#);
    }

    #[test]
    fn test_braces_inside_strings_are_ignored() {
        let response = r#"{"line": "(SHOUTING) Close the {gate}!", "n": 1} trailing"#;
        let json = extract_json(response).unwrap();
        assert!(json.ends_with("\"n\": 1}"));
    }

    #[test]
    fn test_escaped_quotes_do_not_end_strings() {
        let response = r#"{"text": "She said \"hello}\""}"#;
        assert_eq!(extract_json(response).unwrap(), response);
    }

    #[test]
    fn test_prose_brackets_before_the_object_are_skipped() {
        let response = r#"Result [v2]: {"characters": [{"name": "Ada Marsh"}]}"#;
        assert_eq!(
            extract_json(response).unwrap(),
            r#"{"characters": [{"name": "Ada Marsh"}]}"#
        );
    }

    #[test]
    fn test_top_level_array_is_kept() {
        let response = r#"Hooks: ["Who answers the horn?", "Why {now}?"] done"#;
        assert_eq!(
            extract_json(response).unwrap(),
            r#"["Who answers the horn?", "Why {now}?"]"#
        );
    }

    #[test]
    fn test_invalid_block_is_returned_for_reporting() {
        let response = "Almost: {premise: unquoted}";
        assert_eq!(extract_json(response).unwrap(), "{premise: unquoted}");
        assert!(parse_json::<serde_json::Value>("{premise: unquoted}").is_err());
    }

    #[test]
    fn test_no_json_found() {
        let err = extract_json("The model refused to answer.").unwrap_err();
        assert!(matches!(err.story_kind(), Some(StoryErrorKind::ParseError(_))));
    }

    #[test]
    fn test_parse_json_reports_parse_error() {
        let err = parse_json::<serde_json::Value>("{not json").unwrap_err();
        assert!(matches!(err.story_kind(), Some(StoryErrorKind::ParseError(_))));
    }
}
