use fabula_core::{
    Artifact, ArtifactId, Lineage, Stage, StagePayload, StageState, Story, StoryId, ThemeConcept,
    UserId, Visual, VisualItem, VisualSlot,
};
use std::str::FromStr;
use strum::IntoEnumIterator;

#[test]
fn stages_iterate_in_creation_order() {
    let stages: Vec<Stage> = Stage::iter().collect();
    assert_eq!(stages, Stage::ORDER.to_vec());
    for (index, stage) in Stage::ORDER.iter().enumerate() {
        assert_eq!(stage.prerequisites(), &Stage::ORDER[..index]);
    }
    assert_eq!(Stage::Theme.previous(), None);
    assert_eq!(Stage::Plot.previous(), Some(Stage::Character));
}

#[test]
fn stage_names_parse_case_insensitively() {
    assert_eq!(Stage::from_str("Character").unwrap(), Stage::Character);
    assert!(Stage::from_str("visual").is_err());
}

#[test]
fn story_state_follows_refs_and_flags() {
    let mut story = Story::new(UserId::new());
    assert_eq!(story.state(Stage::World), StageState::Absent);

    let theme = ArtifactId::new();
    story.set_stage_ref(Stage::Theme, theme);
    assert_eq!(story.state(Stage::Theme), StageState::Draft);
    assert!(story.links(Stage::Theme, theme));
    assert!(!story.links(Stage::Theme, ArtifactId::new()));

    story.save_status.lock(Stage::Theme);
    assert_eq!(story.state(Stage::Theme), StageState::Locked);
    assert!(!story.save_status.get(Stage::World));
}

#[test]
fn artifact_lineage_captures_upstream_refs() {
    let mut story = Story::new(UserId::new());
    let theme = ArtifactId::new();
    let world = ArtifactId::new();
    story.set_stage_ref(Stage::Theme, theme);
    story.set_stage_ref(Stage::World, world);

    let lineage = Lineage::for_stage(&story, Stage::Character);
    assert_eq!(lineage.theme, Some(theme));
    assert_eq!(lineage.world, Some(world));
    assert_eq!(lineage.character, None);

    let artifact = Artifact::new(&story, StagePayload::Theme(ThemeConcept::default()));
    assert_eq!(artifact.stage(), Stage::Theme);
    assert_eq!(artifact.lineage, Lineage::default());
    assert_eq!(artifact.story_id, story.id);
}

#[test]
fn ids_reject_malformed_text() {
    let err = StoryId::parse("12345").unwrap_err();
    assert!(err.to_string().contains("story id"));
    let id = UserId::new();
    assert_eq!(UserId::from_str(&format!(" {} ", id)).unwrap(), id);
}

#[test]
fn visual_item_lookup_by_slot() {
    let mut visual = Visual::new(StoryId::new(), UserId::new());
    visual.visuals.push(VisualItem {
        image_url: "https://cdn.example/1.png".into(),
        episode: 1,
        scene: 1,
        act: 2,
    });
    let slot = VisualSlot { episode: 1, scene: 1, act: 2 };
    assert!(visual.item(slot).is_some());
    assert!(visual.item(VisualSlot { act: 1, ..slot }).is_none());
}
