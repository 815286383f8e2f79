//! Repository wrapper whose writes fail on demand.

use async_trait::async_trait;
use fabula_core::{
    Artifact, ArtifactId, Message, Stage, StagePayload, Story, StoryId, StorySummary, UserId,
    Visual, VisualId, VisualItem,
};
use fabula_error::{FabulaResult, StorageError, StorageErrorKind};
use fabula_interface::StoryRepository;
use fabula_storage::InMemoryStoryRepository;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Fails the next `failures` artifact inserts and payload updates, and
/// separately the next exchange appends.
pub struct FlakyRepository {
    inner: Arc<InMemoryStoryRepository>,
    failures: AtomicUsize,
    attempts: AtomicUsize,
    exchange_failures: AtomicUsize,
    exchange_attempts: AtomicUsize,
}

impl FlakyRepository {
    pub fn new(inner: Arc<InMemoryStoryRepository>, failures: usize) -> Self {
        Self {
            inner,
            failures: AtomicUsize::new(failures),
            attempts: AtomicUsize::new(0),
            exchange_failures: AtomicUsize::new(0),
            exchange_attempts: AtomicUsize::new(0),
        }
    }

    /// Also fail the next `failures` exchange appends.
    pub fn with_exchange_failures(self, failures: usize) -> Self {
        self.exchange_failures.store(failures, Ordering::SeqCst);
        self
    }

    /// Artifact writes attempted so far.
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    /// Exchange appends attempted so far.
    pub fn exchange_attempts(&self) -> usize {
        self.exchange_attempts.load(Ordering::SeqCst)
    }

    fn maybe_fail(&self) -> FabulaResult<()> {
        fail_once(&self.attempts, &self.failures)
    }
}

fn fail_once(attempts: &AtomicUsize, failures: &AtomicUsize) -> FabulaResult<()> {
    attempts.fetch_add(1, Ordering::SeqCst);
    let remaining = failures.load(Ordering::SeqCst);
    if remaining > 0 {
        failures.store(remaining - 1, Ordering::SeqCst);
        return Err(StorageError::new(StorageErrorKind::Unavailable("disk on fire".into())).into());
    }
    Ok(())
}

#[async_trait]
impl StoryRepository for FlakyRepository {
    async fn create_story(&self, story: &Story) -> FabulaResult<()> {
        self.inner.create_story(story).await
    }

    async fn find_story(&self, story_id: StoryId, user_id: UserId) -> FabulaResult<Story> {
        self.inner.find_story(story_id, user_id).await
    }

    async fn list_stories(&self, user_id: UserId) -> FabulaResult<Vec<StorySummary>> {
        self.inner.list_stories(user_id).await
    }

    async fn insert_artifact(&self, artifact: &Artifact) -> FabulaResult<()> {
        self.maybe_fail()?;
        self.inner.insert_artifact(artifact).await
    }

    async fn find_artifact(&self, artifact_id: ArtifactId) -> FabulaResult<Artifact> {
        self.inner.find_artifact(artifact_id).await
    }

    async fn list_artifacts(&self, user_id: UserId, stage: Stage) -> FabulaResult<Vec<Artifact>> {
        self.inner.list_artifacts(user_id, stage).await
    }

    async fn update_payload(
        &self,
        artifact_id: ArtifactId,
        payload: &StagePayload,
    ) -> FabulaResult<Artifact> {
        self.maybe_fail()?;
        self.inner.update_payload(artifact_id, payload).await
    }

    async fn remove_unlinked_artifact(&self, artifact_id: ArtifactId) -> FabulaResult<()> {
        self.inner.remove_unlinked_artifact(artifact_id).await
    }

    async fn link_artifact(
        &self,
        story_id: StoryId,
        stage: Stage,
        artifact_id: ArtifactId,
    ) -> FabulaResult<Story> {
        self.inner.link_artifact(story_id, stage, artifact_id).await
    }

    async fn set_lock_flag(&self, story_id: StoryId, stage: Stage) -> FabulaResult<Story> {
        self.inner.set_lock_flag(story_id, stage).await
    }

    async fn append_exchange(
        &self,
        story_id: StoryId,
        user: &Message,
        assistant: &Message,
    ) -> FabulaResult<()> {
        fail_once(&self.exchange_attempts, &self.exchange_failures)?;
        self.inner.append_exchange(story_id, user, assistant).await
    }

    async fn set_summary(&self, story_id: StoryId, summary: &str) -> FabulaResult<()> {
        self.inner.set_summary(story_id, summary).await
    }

    async fn ensure_visual(&self, story_id: StoryId) -> FabulaResult<Visual> {
        self.inner.ensure_visual(story_id).await
    }

    async fn add_visual_item(
        &self,
        visual_id: VisualId,
        item: &VisualItem,
    ) -> FabulaResult<Visual> {
        self.inner.add_visual_item(visual_id, item).await
    }

    async fn replace_visual_item(
        &self,
        visual_id: VisualId,
        item: &VisualItem,
    ) -> FabulaResult<Visual> {
        self.inner.replace_visual_item(visual_id, item).await
    }

    async fn set_video_url(&self, visual_id: VisualId, video_url: &str) -> FabulaResult<Visual> {
        self.inner.set_video_url(visual_id, video_url).await
    }

    async fn find_visual(&self, visual_id: VisualId) -> FabulaResult<Visual> {
        self.inner.find_visual(visual_id).await
    }

    async fn list_visuals(&self, user_id: UserId) -> FabulaResult<Vec<Visual>> {
        self.inner.list_visuals(user_id).await
    }
}
