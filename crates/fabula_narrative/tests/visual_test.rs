//! Visual collection tests.

mod test_utils;

use fabula_core::{Stage, StoryId, UserId, VisualAsset, VisualItem, VisualSlot};
use fabula_error::StoryErrorKind;
use fabula_interface::{MediaGenerator, StoryRepository};
use fabula_narrative::{PrerequisitePolicy, PromptBuilder, StoryCatalog, VisualService};
use std::sync::Arc;
use test_utils::{Harness, MockDriver, MockMedia, canned};

async fn complete_story(h: &Harness) -> StoryId {
    let story = h.gate.create_story(h.user).await.unwrap();
    for stage in Stage::ORDER {
        h.gate
            .create(stage, story.id, h.user, "continue")
            .await
            .unwrap();
    }
    story.id
}

fn harness() -> Harness {
    Harness::new(MockDriver::replies(Stage::ORDER.map(canned)))
}

fn service(h: &Harness, media: Arc<MockMedia>) -> VisualService {
    let media: Arc<dyn MediaGenerator> = media;
    VisualService::new(h.repository.clone(), PromptBuilder::new().unwrap())
        .with_media(media)
        .with_locks(h.gate.locks().clone())
}

fn image(url: &str, episode: u32, scene: u32, act: u32) -> VisualAsset {
    VisualAsset::Image(VisualItem {
        image_url: url.to_string(),
        episode,
        scene,
        act,
    })
}

#[tokio::test]
async fn test_visual_slots_are_unique() {
    let h = harness();
    let story_id = complete_story(&h).await;
    let visuals = service(&h, Arc::new(MockMedia::new()));

    visuals
        .attach(story_id, h.user, image("https://img/1.png", 1, 1, 1))
        .await
        .unwrap();

    let err = visuals
        .attach(story_id, h.user, image("https://img/dup.png", 1, 1, 1))
        .await
        .unwrap_err();
    assert!(matches!(err.story_kind(), Some(StoryErrorKind::AlreadyExists(_))));

    let visual = visuals
        .attach(story_id, h.user, image("https://img/2.png", 1, 1, 2))
        .await
        .unwrap();
    assert_eq!(visual.visuals.len(), 2);

    let found = visuals.find(story_id, h.user).await.unwrap();
    let first = found.item(VisualSlot { episode: 1, scene: 1, act: 1 }).unwrap();
    let second = found.item(VisualSlot { episode: 1, scene: 1, act: 2 }).unwrap();
    assert_eq!(first.image_url, "https://img/1.png");
    assert_eq!(second.image_url, "https://img/2.png");

    let story = h.repository.find_story(story_id, h.user).await.unwrap();
    assert_eq!(story.visual, Some(found.id));
}

#[tokio::test]
async fn test_visuals_require_every_stage() {
    let h = Harness::new(MockDriver::replies([canned(Stage::Theme)]));
    let story = h.gate.create_story(h.user).await.unwrap();
    h.gate
        .create(Stage::Theme, story.id, h.user, "concept")
        .await
        .unwrap();
    let visuals = service(&h, Arc::new(MockMedia::new()));

    let err = visuals
        .attach(story.id, h.user, image("https://img/1.png", 1, 1, 1))
        .await
        .unwrap_err();
    assert!(matches!(
        err.story_kind(),
        Some(StoryErrorKind::PrerequisiteMissing { stage, missing }) if stage == "visual" && missing == "world"
    ));
}

#[tokio::test]
async fn test_locked_policy_applies_to_visuals() {
    let h = harness();
    let story_id = complete_story(&h).await;
    let visuals = service(&h, Arc::new(MockMedia::new())).with_policy(PrerequisitePolicy::Locked);

    let err = visuals
        .attach(story_id, h.user, image("https://img/1.png", 1, 1, 1))
        .await
        .unwrap_err();
    assert!(matches!(err.story_kind(), Some(StoryErrorKind::PrerequisiteMissing { .. })));
}

#[tokio::test]
async fn test_video_replaces_previous() {
    let h = harness();
    let story_id = complete_story(&h).await;
    let visuals = service(&h, Arc::new(MockMedia::new()));

    for url in ["https://vid/1.mp4", "https://vid/2.mp4"] {
        visuals
            .attach(
                story_id,
                h.user,
                VisualAsset::Video {
                    video_url: url.to_string(),
                },
            )
            .await
            .unwrap();
    }

    let visual = visuals.find(story_id, h.user).await.unwrap();
    assert_eq!(visual.video_url.as_deref(), Some("https://vid/2.mp4"));
}

#[tokio::test]
async fn test_generate_image_uses_plot_act() {
    let h = harness();
    let story_id = complete_story(&h).await;
    let media = Arc::new(MockMedia::new());
    let visuals = service(&h, media.clone());
    let slot = VisualSlot { episode: 1, scene: 1, act: 1 };

    let visual = visuals
        .generate_image(story_id, h.user, slot, Some("Low camera angle"))
        .await
        .unwrap();

    assert_eq!(visual.item(slot).unwrap().image_url, "https://media.test/image-0.png");
    let prompt = &media.prompts()[0];
    assert!(prompt.contains("finds the horn already sounding"));
    assert!(prompt.contains("Low camera angle"));
    assert!(prompt.contains("Gannet Light"));

    let visual = visuals.generate_video(story_id, h.user, slot).await.unwrap();
    assert_eq!(
        visual.video_url.as_deref(),
        Some("https://media.test/image-0.mp4")
    );
}

#[tokio::test]
async fn test_generate_image_needs_something_to_draw() {
    let h = harness();
    let story_id = complete_story(&h).await;
    let visuals = service(&h, Arc::new(MockMedia::new()));
    let slot = VisualSlot { episode: 9, scene: 1, act: 1 };

    let err = visuals
        .generate_image(story_id, h.user, slot, None)
        .await
        .unwrap_err();
    assert!(matches!(err.story_kind(), Some(StoryErrorKind::InvalidInput(_))));

    let err = visuals.generate_video(story_id, h.user, slot).await.unwrap_err();
    assert!(matches!(err.story_kind(), Some(StoryErrorKind::NotFound(_))));
}

#[tokio::test]
async fn test_media_failure_is_generation_failure() {
    let h = harness();
    let story_id = complete_story(&h).await;
    let visuals = service(&h, Arc::new(MockMedia::failing()));

    let err = visuals
        .generate_image(story_id, h.user, VisualSlot { episode: 1, scene: 1, act: 1 }, None)
        .await
        .unwrap_err();
    assert!(matches!(err.story_kind(), Some(StoryErrorKind::GenerationFailed(_))));

    let visual = h
        .repository
        .ensure_visual(story_id)
        .await
        .unwrap();
    assert!(visual.visuals.is_empty());
}

#[tokio::test]
async fn test_catalog_views() {
    let h = harness();
    let story_id = complete_story(&h).await;
    let catalog = StoryCatalog::new(h.repository.clone());

    let stories = catalog.list_stories(h.user).await.unwrap();
    assert_eq!(stories.len(), 1);
    assert_eq!(stories[0].id, story_id);

    let worlds = catalog.list_artifacts(h.user, Stage::World).await.unwrap();
    assert_eq!(worlds.len(), 1);
    assert_eq!(worlds[0].stage, Stage::World);
    assert!(worlds[0].details.get("world_setting").is_some());
    assert!(worlds[0].lineage.theme.is_some());

    let plot = catalog
        .artifact_for_story(story_id, h.user, Stage::Plot)
        .await
        .unwrap();
    assert!(plot.details.get("episode_1").is_some());

    assert!(catalog.list_stories(UserId::new()).await.unwrap().is_empty());
    assert!(catalog.list_visuals(h.user).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_edit_image_replaces_the_slot() {
    let h = harness();
    let story_id = complete_story(&h).await;
    let media = Arc::new(MockMedia::new());
    let visuals = service(&h, media.clone());
    let slot = VisualSlot { episode: 1, scene: 1, act: 1 };

    let err = visuals
        .edit_image(story_id, h.user, slot, "make it night")
        .await
        .unwrap_err();
    assert!(matches!(err.story_kind(), Some(StoryErrorKind::NotFound(_))));

    visuals
        .attach(story_id, h.user, image("https://img/1.png", 1, 1, 1))
        .await
        .unwrap();

    let err = visuals
        .edit_image(story_id, h.user, slot, "   ")
        .await
        .unwrap_err();
    assert!(matches!(err.story_kind(), Some(StoryErrorKind::InvalidInput(_))));

    let visual = visuals
        .edit_image(story_id, h.user, slot, "make it night")
        .await
        .unwrap();
    assert_eq!(visual.visuals.len(), 1);
    assert_eq!(visual.item(slot).unwrap().image_url, "https://img/1.png?edit");
    assert_eq!(media.prompts(), vec!["make it night".to_string()]);
}

#[tokio::test]
async fn test_upscale_image_is_guided_by_the_act() {
    let h = harness();
    let story_id = complete_story(&h).await;
    let media = Arc::new(MockMedia::new());
    let visuals = service(&h, media.clone());
    let slot = VisualSlot { episode: 1, scene: 1, act: 1 };

    visuals
        .attach(story_id, h.user, image("https://img/1.png", 1, 1, 1))
        .await
        .unwrap();
    visuals
        .attach(story_id, h.user, image("https://img/2.png", 1, 1, 2))
        .await
        .unwrap();

    let visual = visuals.upscale_image(story_id, h.user, slot).await.unwrap();
    assert_eq!(visual.item(slot).unwrap().image_url, "https://img/1.png?upscaled");
    let untouched = visual.item(VisualSlot { episode: 1, scene: 1, act: 2 }).unwrap();
    assert_eq!(untouched.image_url, "https://img/2.png");

    let prompts = media.prompts();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].contains("Ada climbs the stairs"));

    let without_media =
        VisualService::new(h.repository.clone(), PromptBuilder::new().unwrap());
    let err = without_media
        .upscale_image(story_id, h.user, slot)
        .await
        .unwrap_err();
    assert!(matches!(err.story_kind(), Some(StoryErrorKind::GenerationFailed(_))));
}
