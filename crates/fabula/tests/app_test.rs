//! End-to-end tests through the assembled engine.

use async_trait::async_trait;
use fabula::{
    Envelope, Fabula, FabulaConfig, FabulaDriver, FabulaResult, FailureClass,
    FileSystemStoryRepository, GenerateRequest, GenerateResponse, Output, Stage, StageState,
    StoryRepository, UserId, VisualAsset, VisualItem,
};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

const THEME: &str = r#"{"premise": "Two rival bakers share one oven", "genres": ["comedy"]}"#;
const WORLD: &str = r#"{"world_setting": {"genre": "cozy", "description": "A canal town"}}"#;
const CHARACTERS: &str = r#"{"characters": [{"name": "Pia"}, {"name": "Bruno"}]}"#;
const PLOT: &str = r#"{"episode_1": {"scene_1": {"act_1": {"description": "The oven breaks", "dialogue": []}}}}"#;

struct Scripted(Mutex<VecDeque<&'static str>>);

impl Scripted {
    fn new(replies: &[&'static str]) -> Self {
        Self(Mutex::new(replies.iter().copied().collect()))
    }
}

#[async_trait]
impl FabulaDriver for Scripted {
    async fn generate(&self, _req: &GenerateRequest) -> FabulaResult<GenerateResponse> {
        let text = self.0.lock().unwrap().pop_front().unwrap_or("{}");
        Ok(GenerateResponse {
            outputs: vec![Output::Text(text.to_string())],
        })
    }

    fn provider_name(&self) -> &'static str {
        "scripted"
    }

    fn model_name(&self) -> &str {
        "scripted"
    }
}

fn no_summaries() -> FabulaConfig {
    FabulaConfig::from_toml("[session]\nsummarize = false").unwrap()
}

#[tokio::test]
async fn test_story_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let user = UserId::new();

    let story_id = {
        let repository = Arc::new(FileSystemStoryRepository::new(dir.path()).unwrap());
        let driver = Arc::new(Scripted::new(&[THEME, WORLD, CHARACTERS, PLOT]));
        let app = Fabula::builder(repository, driver)
            .config(no_summaries())
            .build()
            .unwrap();

        let story = app.gate().create_story(user).await.unwrap();
        for stage in Stage::ORDER {
            let outcome = app
                .gate()
                .create(stage, story.id, user, "go on")
                .await
                .unwrap();
            app.gate()
                .save(stage, story.id, user, outcome.artifact_id)
                .await
                .unwrap();
        }
        app.visuals()
            .attach(
                story.id,
                user,
                VisualAsset::Image(VisualItem {
                    image_url: "https://img/oven.png".to_string(),
                    episode: 1,
                    scene: 1,
                    act: 1,
                }),
            )
            .await
            .unwrap();
        story.id
    };

    let repository = Arc::new(FileSystemStoryRepository::new(dir.path()).unwrap());
    let story = repository.find_story(story_id, user).await.unwrap();
    for stage in Stage::ORDER {
        assert_eq!(story.state(stage), StageState::Locked);
    }
    assert_eq!(story.messages.len(), 8);

    let app = Fabula::builder(repository, Arc::new(Scripted::new(&[])))
        .build()
        .unwrap();
    let visual = app.visuals().find(story_id, user).await.unwrap();
    assert_eq!(visual.visuals.len(), 1);

    let status = app.gate().status(story_id, user).await.unwrap();
    assert!(status.stages.values().all(|s| *s == StageState::Locked));
}

#[tokio::test]
async fn test_failures_become_envelopes() {
    let dir = tempfile::tempdir().unwrap();
    let repository = Arc::new(FileSystemStoryRepository::new(dir.path()).unwrap());
    let app = Fabula::builder(repository, Arc::new(Scripted::new(&[THEME])))
        .config(no_summaries())
        .build()
        .unwrap();
    let user = UserId::new();
    let story = app.gate().create_story(user).await.unwrap();

    let result = app.gate().create(Stage::Plot, story.id, user, "skip ahead").await;
    let envelope = Envelope::from_result(result, "plot created");
    assert!(!envelope.success);
    assert_eq!(envelope.class, Some(FailureClass::Conflict));
    assert_eq!(envelope.status, 409);
    assert!(envelope.message.contains("theme"));
    assert!(envelope.data.is_none());

    let result = app.gate().create(Stage::Theme, story.id, user, "bakers").await;
    let envelope = Envelope::from_result(result, "theme created");
    assert!(envelope.success);
    let json: serde_json::Value = serde_json::from_str(&envelope.to_json()).unwrap();
    assert_eq!(json["data"]["state"], "draft");
    assert_eq!(json["data"]["payload"]["stage"], "theme");
}
