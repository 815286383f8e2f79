//! In-memory implementation of [`StoryRepository`].

use crate::documents::{
    add_item, artifact_not_found, ensure_unlinked, link, replace_item, replace_payload,
    set_video, story_not_found, visual_not_found,
};
use async_trait::async_trait;
use fabula_core::{
    Artifact, ArtifactId, Message, Stage, StagePayload, Story, StoryId, StorySummary, UserId,
    Visual, VisualId, VisualItem,
};
use fabula_error::FabulaResult;
use fabula_interface::StoryRepository;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Debug, Default)]
struct Documents {
    stories: HashMap<StoryId, Story>,
    artifacts: HashMap<ArtifactId, Artifact>,
    visuals: HashMap<VisualId, Visual>,
}

/// In-memory story repository.
///
/// All documents live in one map set behind a single `RwLock`, so every
/// write (including the compare-and-set link) is atomic. Data is lost when
/// the last clone is dropped.
///
/// # Example
/// ```no_run
/// use fabula_core::{Story, UserId};
/// use fabula_interface::StoryRepository;
/// use fabula_storage::InMemoryStoryRepository;
///
/// #[tokio::main]
/// async fn main() {
///     let repo = InMemoryStoryRepository::new();
///     let story = Story::new(UserId::new());
///     repo.create_story(&story).await.unwrap();
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct InMemoryStoryRepository {
    documents: Arc<RwLock<Documents>>,
}

impl InMemoryStoryRepository {
    /// Create a new empty in-memory repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored artifacts (for testing).
    pub async fn artifact_count(&self) -> usize {
        self.documents.read().await.artifacts.len()
    }
}

#[async_trait]
impl StoryRepository for InMemoryStoryRepository {
    async fn create_story(&self, story: &Story) -> FabulaResult<()> {
        let mut docs = self.documents.write().await;
        docs.stories.insert(story.id, story.clone());
        tracing::debug!(story_id = %story.id, "Stored story");
        Ok(())
    }

    async fn find_story(&self, story_id: StoryId, user_id: UserId) -> FabulaResult<Story> {
        let docs = self.documents.read().await;
        docs.stories
            .get(&story_id)
            .filter(|story| story.user_id == user_id)
            .cloned()
            .ok_or_else(|| story_not_found(story_id).into())
    }

    async fn list_stories(&self, user_id: UserId) -> FabulaResult<Vec<StorySummary>> {
        let docs = self.documents.read().await;
        let mut stories: Vec<StorySummary> = docs
            .stories
            .values()
            .filter(|story| story.user_id == user_id)
            .map(StorySummary::from)
            .collect();
        stories.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(stories)
    }

    async fn insert_artifact(&self, artifact: &Artifact) -> FabulaResult<()> {
        let mut docs = self.documents.write().await;
        docs.artifacts.insert(artifact.id, artifact.clone());
        Ok(())
    }

    async fn find_artifact(&self, artifact_id: ArtifactId) -> FabulaResult<Artifact> {
        let docs = self.documents.read().await;
        docs.artifacts
            .get(&artifact_id)
            .cloned()
            .ok_or_else(|| artifact_not_found(artifact_id).into())
    }

    async fn list_artifacts(&self, user_id: UserId, stage: Stage) -> FabulaResult<Vec<Artifact>> {
        let docs = self.documents.read().await;
        let mut artifacts: Vec<Artifact> = docs
            .artifacts
            .values()
            .filter(|artifact| artifact.user_id == user_id && artifact.stage() == stage)
            .cloned()
            .collect();
        artifacts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(artifacts)
    }

    async fn update_payload(
        &self,
        artifact_id: ArtifactId,
        payload: &StagePayload,
    ) -> FabulaResult<Artifact> {
        let mut docs = self.documents.write().await;
        let artifact = docs
            .artifacts
            .get_mut(&artifact_id)
            .ok_or_else(|| artifact_not_found(artifact_id))?;
        replace_payload(artifact, payload)?;
        Ok(artifact.clone())
    }

    async fn remove_unlinked_artifact(&self, artifact_id: ArtifactId) -> FabulaResult<()> {
        let mut docs = self.documents.write().await;
        let Some(artifact) = docs.artifacts.get(&artifact_id) else {
            return Ok(());
        };
        ensure_unlinked(docs.stories.get(&artifact.story_id), artifact)?;
        docs.artifacts.remove(&artifact_id);
        tracing::debug!(artifact_id = %artifact_id, "Removed unlinked artifact");
        Ok(())
    }

    async fn link_artifact(
        &self,
        story_id: StoryId,
        stage: Stage,
        artifact_id: ArtifactId,
    ) -> FabulaResult<Story> {
        let mut docs = self.documents.write().await;
        let story = docs
            .stories
            .get_mut(&story_id)
            .ok_or_else(|| story_not_found(story_id))?;
        link(story, stage, artifact_id)?;
        Ok(story.clone())
    }

    async fn set_lock_flag(&self, story_id: StoryId, stage: Stage) -> FabulaResult<Story> {
        let mut docs = self.documents.write().await;
        let story = docs
            .stories
            .get_mut(&story_id)
            .ok_or_else(|| story_not_found(story_id))?;
        story.save_status.lock(stage);
        story.touch();
        Ok(story.clone())
    }

    async fn append_exchange(
        &self,
        story_id: StoryId,
        user: &Message,
        assistant: &Message,
    ) -> FabulaResult<()> {
        let mut docs = self.documents.write().await;
        let story = docs
            .stories
            .get_mut(&story_id)
            .ok_or_else(|| story_not_found(story_id))?;
        story.push_exchange(user.clone(), assistant.clone());
        Ok(())
    }

    async fn set_summary(&self, story_id: StoryId, summary: &str) -> FabulaResult<()> {
        let mut docs = self.documents.write().await;
        let story = docs
            .stories
            .get_mut(&story_id)
            .ok_or_else(|| story_not_found(story_id))?;
        story.summary = Some(summary.to_string());
        story.touch();
        Ok(())
    }

    async fn ensure_visual(&self, story_id: StoryId) -> FabulaResult<Visual> {
        let mut docs = self.documents.write().await;
        let story = docs
            .stories
            .get(&story_id)
            .ok_or_else(|| story_not_found(story_id))?;

        if let Some(visual) = story.visual.and_then(|id| docs.visuals.get(&id)) {
            return Ok(visual.clone());
        }

        let visual = Visual::new(story.id, story.user_id);
        docs.visuals.insert(visual.id, visual.clone());
        if let Some(story) = docs.stories.get_mut(&story_id) {
            story.visual = Some(visual.id);
            story.touch();
        }
        tracing::debug!(story_id = %story_id, visual_id = %visual.id, "Created visual collection");
        Ok(visual)
    }

    async fn add_visual_item(
        &self,
        visual_id: VisualId,
        item: &VisualItem,
    ) -> FabulaResult<Visual> {
        let mut docs = self.documents.write().await;
        let visual = docs
            .visuals
            .get_mut(&visual_id)
            .ok_or_else(|| visual_not_found(visual_id))?;
        add_item(visual, item)?;
        Ok(visual.clone())
    }

    async fn replace_visual_item(
        &self,
        visual_id: VisualId,
        item: &VisualItem,
    ) -> FabulaResult<Visual> {
        let mut docs = self.documents.write().await;
        let visual = docs
            .visuals
            .get_mut(&visual_id)
            .ok_or_else(|| visual_not_found(visual_id))?;
        replace_item(visual, item)?;
        Ok(visual.clone())
    }

    async fn set_video_url(&self, visual_id: VisualId, video_url: &str) -> FabulaResult<Visual> {
        let mut docs = self.documents.write().await;
        let visual = docs
            .visuals
            .get_mut(&visual_id)
            .ok_or_else(|| visual_not_found(visual_id))?;
        set_video(visual, video_url);
        Ok(visual.clone())
    }

    async fn find_visual(&self, visual_id: VisualId) -> FabulaResult<Visual> {
        let docs = self.documents.read().await;
        docs.visuals
            .get(&visual_id)
            .cloned()
            .ok_or_else(|| visual_not_found(visual_id).into())
    }

    async fn list_visuals(&self, user_id: UserId) -> FabulaResult<Vec<Visual>> {
        let docs = self.documents.read().await;
        Ok(docs
            .visuals
            .values()
            .filter(|visual| visual.user_id == user_id)
            .cloned()
            .collect())
    }
}
