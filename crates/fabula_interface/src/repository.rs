//! Repository trait for story persistence.
//!
//! Implementations can use databases, filesystems, or in-memory structures.
//! Every write touches a single document; there are no cross-document
//! transactions, so callers sequence writes so that a failure part-way leaves
//! at worst an unlinked artifact.

use async_trait::async_trait;
use fabula_core::{
    Artifact, ArtifactId, Message, Stage, StagePayload, Story, StoryId, StorySummary, UserId,
    Visual, VisualId, VisualItem,
};
use fabula_error::FabulaResult;

/// Document store for stories, stage artifacts, and visuals.
///
/// Lookups that miss (or that find a story owned by someone else) fail with
/// `StoryErrorKind::NotFound`.
#[async_trait]
pub trait StoryRepository: Send + Sync {
    /// Persist a new story.
    async fn create_story(&self, story: &Story) -> FabulaResult<()>;

    /// Load a story owned by `user_id`.
    async fn find_story(&self, story_id: StoryId, user_id: UserId) -> FabulaResult<Story>;

    /// List a user's stories, newest first, without conversation data.
    async fn list_stories(&self, user_id: UserId) -> FabulaResult<Vec<StorySummary>>;

    /// Persist a new, not yet linked artifact.
    async fn insert_artifact(&self, artifact: &Artifact) -> FabulaResult<()>;

    /// Load an artifact by id.
    async fn find_artifact(&self, artifact_id: ArtifactId) -> FabulaResult<Artifact>;

    /// List a user's artifacts for one stage.
    async fn list_artifacts(&self, user_id: UserId, stage: Stage) -> FabulaResult<Vec<Artifact>>;

    /// Replace an artifact's payload in place.
    async fn update_payload(
        &self,
        artifact_id: ArtifactId,
        payload: &StagePayload,
    ) -> FabulaResult<Artifact>;

    /// Delete an artifact that no story references.
    ///
    /// Fails with `AlreadyExists` if the artifact is linked.
    async fn remove_unlinked_artifact(&self, artifact_id: ArtifactId) -> FabulaResult<()>;

    /// Compare-and-set the story's `stage` reference from empty to `artifact_id`.
    ///
    /// Fails with `AlreadyExists` if the reference is already set.
    async fn link_artifact(
        &self,
        story_id: StoryId,
        stage: Stage,
        artifact_id: ArtifactId,
    ) -> FabulaResult<Story>;

    /// Set the story's lock flag for `stage`.
    async fn set_lock_flag(&self, story_id: StoryId, stage: Stage) -> FabulaResult<Story>;

    /// Append one user/assistant exchange to the story's conversation.
    async fn append_exchange(
        &self,
        story_id: StoryId,
        user: &Message,
        assistant: &Message,
    ) -> FabulaResult<()>;

    /// Replace the story's rolling conversation summary.
    async fn set_summary(&self, story_id: StoryId, summary: &str) -> FabulaResult<()>;

    /// Return the story's visual collection, creating and linking it if absent.
    async fn ensure_visual(&self, story_id: StoryId) -> FabulaResult<Visual>;

    /// Add an image to a visual collection.
    ///
    /// Fails with `AlreadyExists` if the `(episode, scene, act)` slot is taken.
    async fn add_visual_item(&self, visual_id: VisualId, item: &VisualItem)
    -> FabulaResult<Visual>;

    /// Replace the image at the item's `(episode, scene, act)` slot.
    ///
    /// Fails with `NotFound` if the slot is empty.
    async fn replace_visual_item(
        &self,
        visual_id: VisualId,
        item: &VisualItem,
    ) -> FabulaResult<Visual>;

    /// Set (or replace) the collection's video URL.
    async fn set_video_url(&self, visual_id: VisualId, video_url: &str) -> FabulaResult<Visual>;

    /// Load a visual collection by id.
    async fn find_visual(&self, visual_id: VisualId) -> FabulaResult<Visual>;

    /// List a user's visual collections.
    async fn list_visuals(&self, user_id: UserId) -> FabulaResult<Vec<Visual>>;
}
