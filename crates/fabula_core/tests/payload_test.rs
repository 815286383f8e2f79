use fabula_core::{
    Addressee, CharacterProfile, CharacterRoster, Stage, StagePayload, TextOrList, ThemeConcept,
    WorldDocument,
};
use serde_json::json;

fn sample_plot() -> serde_json::Value {
    json!({
        "episode_one": {
            "title": "The Tide Bell",
            "scene_one": {
                "act_one": {
                    "description": "Mara climbs the lighthouse at dusk.",
                    "dialogue": [
                        {
                            "character": "Mara",
                            "speaking_to": ["Ilse"],
                            "before_action": "sets down the lamp",
                            "line": "(WEARY) The sea is louder tonight.",
                            "after_action": "NO_ACTION"
                        },
                        {
                            "character": "Ilse",
                            "speaking_to": "THINKING",
                            "before_action": "NO_ACTION",
                            "line": "(AFRAID) She hears it too.",
                            "after_action": "looks away"
                        }
                    ],
                    "emotional_cues": { "Mara": "exhaustion", "Ilse": "dread" }
                }
            }
        }
    })
}

#[test]
fn plot_payload_parses_nested_shape() {
    let payload = StagePayload::from_value(Stage::Plot, sample_plot()).unwrap();
    let StagePayload::Plot(plot) = &payload else {
        panic!("expected plot payload");
    };

    let episode = &plot.episodes["episode_one"];
    assert_eq!(episode.title.as_deref(), Some("The Tide Bell"));
    let act = &episode.scenes["scene_one"].acts["act_one"];
    assert_eq!(act.dialogue.len(), 2);
    assert_eq!(act.dialogue[1].speaking_to, Addressee::Thinking);
    assert_eq!(plot.dialogue().count(), 2);
}

#[test]
fn details_encoding_preserves_every_stage() {
    let theme = StagePayload::Theme(ThemeConcept {
        core_theme: TextOrList::List(vec!["grief".into(), "memory".into()]),
        premise: "A keeper hears the sea speak".into(),
        ..Default::default()
    });
    let world = StagePayload::from_value(
        Stage::World,
        json!({
            "world_setting": {
                "genre": ["gothic"],
                "geography": { "climate": "NIL", "seasonal_variation": { "winter": "storms" } },
                "year": 1893,
                "history": "Shipwrecks shaped the coast.",
                "patron_saint": "Brendan"
            }
        }),
    )
    .unwrap();
    let character = StagePayload::Character(CharacterRoster {
        characters: vec![CharacterProfile {
            name: "Mara".into(),
            backstory: "Orphaned by a storm".into(),
            ..Default::default()
        }],
    });
    let plot = StagePayload::from_value(Stage::Plot, sample_plot()).unwrap();

    for payload in [theme, world, character, plot] {
        let details = payload.to_details().unwrap();
        let decoded = StagePayload::from_details(payload.stage(), &details).unwrap();
        assert_eq!(decoded, payload);
    }
}

#[test]
fn unknown_fields_survive_in_extra() {
    let payload = StagePayload::from_value(
        Stage::World,
        json!({ "world_setting": { "patron_saint": "Brendan" } }),
    )
    .unwrap();
    let StagePayload::World(WorldDocument { world_setting }) = payload else {
        panic!("expected world payload");
    };
    assert_eq!(world_setting.extra["patron_saint"], json!("Brendan"));
}

#[test]
fn world_without_wrapper_is_rejected() {
    let result = StagePayload::from_value(Stage::World, json!({ "genre": "gothic" }));
    assert!(result.is_err());
}

#[test]
fn character_without_wrapper_is_rejected() {
    let result = StagePayload::from_value(Stage::Character, json!([{ "name": "Mara" }]));
    assert!(result.is_err());
}

#[test]
fn addressee_accepts_bare_name() {
    let addressee: Addressee = serde_json::from_value(json!("Ilse")).unwrap();
    assert_eq!(addressee, Addressee::Characters(vec!["Ilse".into()]));
    assert_eq!(serde_json::to_value(Addressee::Nobody).unwrap(), json!("NONE"));
}
