//! Typed prompt templates.

use fabula_error::{FabulaResult, StoryError, StoryErrorKind};
use std::collections::{BTreeMap, BTreeSet};
use std::str::FromStr;

/// A named placeholder in a [`Template`].
///
/// Written in template text as `{NAME}` using the variant's
/// `SCREAMING_SNAKE_CASE` name.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
    strum::AsRefStr,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Slot {
    /// Theme payload JSON
    Theme,
    /// World payload JSON
    World,
    /// Character roster JSON
    Characters,
    /// Theme payload JSON, as used by the visual template
    Concept,
    /// Description of the image to produce
    Visual,
    /// Current payload being refined
    Context,
    /// User instruction
    Instruction,
    /// Rolling conversation summary
    Summary,
    /// Exchange to fold into a summary
    NewLines,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Slot(Slot),
}

/// A prompt template parsed into literal and slot segments.
///
/// `{NAME}` is a slot; `{{` and `}}` are literal braces. Rendering inserts
/// slot values verbatim and never re-scans them, so values may contain any
/// characters.
///
/// # Examples
///
/// ```
/// use fabula_narrative::{Slot, Template};
/// use std::collections::BTreeMap;
///
/// let template = Template::parse("Refine {{this}}: {CONTEXT}").unwrap();
/// let values = BTreeMap::from([(Slot::Context, "{\"premise\": \"x\"}".to_string())]);
/// assert_eq!(
///     template.render(&values).unwrap(),
///     "Refine {this}: {\"premise\": \"x\"}"
/// );
///
/// assert!(Template::parse("{UNKNOWN}").is_err());
/// assert!(Template::parse("dangling }").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    segments: Vec<Segment>,
}

impl Template {
    /// Parse template text.
    ///
    /// # Errors
    ///
    /// Returns a `Template` error for unknown slot names, unterminated
    /// slots, or a lone `}`.
    pub fn parse(text: &str) -> FabulaResult<Self> {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut chars = text.char_indices().peekable();

        while let Some((pos, ch)) = chars.next() {
            match ch {
                '{' if matches!(chars.peek(), Some((_, '{'))) => {
                    chars.next();
                    literal.push('{');
                }
                '}' if matches!(chars.peek(), Some((_, '}'))) => {
                    chars.next();
                    literal.push('}');
                }
                '}' => {
                    return Err(template_error(format!("unmatched '}}' at byte {}", pos)));
                }
                '{' => {
                    let mut name = String::new();
                    let mut closed = false;
                    for (_, c) in chars.by_ref() {
                        if c == '}' {
                            closed = true;
                            break;
                        }
                        name.push(c);
                    }
                    if !closed {
                        return Err(template_error(format!(
                            "unterminated slot starting at byte {}",
                            pos
                        )));
                    }
                    let slot = Slot::from_str(&name)
                        .map_err(|_| template_error(format!("unknown slot '{{{}}}'", name)))?;
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(Segment::Slot(slot));
                }
                c => literal.push(c),
            }
        }

        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Ok(Self { segments })
    }

    /// Distinct slots this template references.
    pub fn slots(&self) -> BTreeSet<Slot> {
        self.segments
            .iter()
            .filter_map(|segment| match segment {
                Segment::Slot(slot) => Some(*slot),
                Segment::Literal(_) => None,
            })
            .collect()
    }

    /// Render with the given slot values.
    ///
    /// # Errors
    ///
    /// Returns a `Template` error if a referenced slot has no value.
    pub fn render(&self, values: &BTreeMap<Slot, String>) -> FabulaResult<String> {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Slot(slot) => {
                    let value = values
                        .get(slot)
                        .ok_or_else(|| template_error(format!("no value for slot {}", slot)))?;
                    out.push_str(value);
                }
            }
        }
        Ok(out)
    }
}

/// Double every brace so `text` parses as a template literal.
///
/// ```
/// use fabula_narrative::{Template, escape_template_syntax};
/// use std::collections::BTreeMap;
///
/// let raw = r#"Return {"premise": "..."} only"#;
/// let template = Template::parse(&escape_template_syntax(raw)).unwrap();
/// assert_eq!(template.render(&BTreeMap::new()).unwrap(), raw);
/// ```
pub fn escape_template_syntax(text: &str) -> String {
    text.replace('{', "{{").replace('}', "}}")
}

fn template_error(message: String) -> fabula_error::FabulaError {
    StoryError::new(StoryErrorKind::Template(message)).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slots_are_collected_once() {
        let template = Template::parse("{THEME} and {WORLD} and {THEME}").unwrap();
        assert_eq!(
            template.slots(),
            BTreeSet::from([Slot::Theme, Slot::World])
        );
    }

    #[test]
    fn test_unterminated_slot_rejected() {
        let err = Template::parse("before {THEME").unwrap_err();
        assert!(matches!(err.story_kind(), Some(StoryErrorKind::Template(_))));
    }

    #[test]
    fn test_lowercase_slot_rejected() {
        assert!(Template::parse("{theme}").is_err());
    }

    #[test]
    fn test_values_are_not_rescanned() {
        let template = Template::parse("{CONTEXT}|{INSTRUCTION}").unwrap();
        let values = BTreeMap::from([
            (Slot::Context, "{INSTRUCTION}".to_string()),
            (Slot::Instruction, "darker".to_string()),
        ]);
        assert_eq!(template.render(&values).unwrap(), "{INSTRUCTION}|darker");
    }

    #[test]
    fn test_missing_value_is_an_error() {
        let template = Template::parse("{SUMMARY}").unwrap();
        assert!(template.render(&BTreeMap::new()).is_err());
    }

    #[test]
    fn test_slot_names() {
        assert_eq!(Slot::NewLines.to_string(), "NEW_LINES");
        assert_eq!(Slot::from_str("CHARACTERS").unwrap(), Slot::Characters);
    }
}
