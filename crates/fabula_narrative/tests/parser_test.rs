//! Response parser tests.

mod test_utils;

use fabula_core::{Addressee, PlotOutline, Stage, StagePayload};
use fabula_error::StoryErrorKind;
use fabula_narrative::ResponseParser;
use test_utils::{CHARACTER_JSON, PLOT_JSON, THEME_JSON, WORLD_JSON, canned};

fn parse_error(stage: Stage, raw: &str) -> bool {
    matches!(
        ResponseParser::new().parse(stage, raw).unwrap_err().story_kind(),
        Some(StoryErrorKind::ParseError(_))
    )
}

#[test]
fn test_parses_every_stage() {
    let parser = ResponseParser::new();
    for stage in Stage::ORDER {
        let payload = parser.parse(stage, canned(stage)).unwrap();
        assert_eq!(payload.stage(), stage);
    }
}

#[test]
fn test_serialized_payload_parses_back() {
    let parser = ResponseParser::new();
    for stage in Stage::ORDER {
        let payload = parser.parse(stage, canned(stage)).unwrap();
        let reparsed = parser.parse(stage, &payload.to_details().unwrap()).unwrap();
        assert_eq!(reparsed, payload);
    }
}

#[test]
fn test_markdown_and_prose_are_tolerated() {
    let raw = format!("Here is your cast:\n\n```json\n{}\n```\nHope it helps!", CHARACTER_JSON);
    match ResponseParser::new().parse(Stage::Character, &raw).unwrap() {
        StagePayload::Character(roster) => {
            assert_eq!(roster.names(), vec!["Ada Marsh", "Tobias Wren"])
        }
        other => panic!("unexpected payload {:?}", other),
    }
}

#[test]
fn test_prose_brackets_before_the_payload_are_skipped() {
    let raw = format!("Result [v2]: {}", CHARACTER_JSON);
    match ResponseParser::new().parse(Stage::Character, &raw).unwrap() {
        StagePayload::Character(roster) => assert_eq!(roster.names().len(), 2),
        other => panic!("unexpected payload {:?}", other),
    }
}

#[test]
fn test_double_encoded_response_is_unwrapped() {
    let wrapped = serde_json::json!({ "response": WORLD_JSON }).to_string();
    let payload = ResponseParser::new().parse(Stage::World, &wrapped).unwrap();
    assert_eq!(payload.stage(), Stage::World);

    let nested = format!(r#"{{"response": {}}}"#, THEME_JSON);
    assert!(ResponseParser::new().parse(Stage::Theme, &nested).is_ok());
}

#[test]
fn test_missing_wrapper_field_is_rejected() {
    assert!(parse_error(Stage::World, r#"{"genre": ["gothic"]}"#));
    assert!(parse_error(Stage::Character, r#"[{"name": "Ada"}]"#));
}

#[test]
fn test_theme_needs_concept_fields() {
    assert!(parse_error(Stage::Theme, r#"{"title": "Untitled"}"#));
    assert!(parse_error(Stage::Theme, r#"{"premise": 42}"#));
}

#[test]
fn test_empty_plot_is_rejected() {
    assert!(parse_error(Stage::Plot, "{}"));

    // An empty outline is a valid value but not valid model output
    let empty = StagePayload::Plot(PlotOutline::default());
    assert!(parse_error(Stage::Plot, &empty.to_details().unwrap()));
}

#[test]
fn test_non_json_is_rejected() {
    assert!(parse_error(Stage::Theme, "I'd rather not."));
    assert!(parse_error(Stage::Theme, r#"{"response": 7}"#));
}

#[test]
fn test_plot_dialogue_addressees() {
    match ResponseParser::new().parse(Stage::Plot, PLOT_JSON).unwrap() {
        StagePayload::Plot(plot) => {
            let lines: Vec<_> = plot.dialogue().collect();
            assert_eq!(lines.len(), 2);
            assert_eq!(lines[0].speaking_to, Addressee::Thinking);
            assert_eq!(
                lines[1].speaking_to,
                Addressee::Characters(vec!["Ada Marsh".to_string()])
            );
            assert!(plot.act(1, 1, 1).is_some());
            assert!(plot.act(1, 1, 2).is_none());
        }
        other => panic!("unexpected payload {:?}", other),
    }
}
