//! Read-only views over stories and artifacts.

use chrono::{DateTime, Utc};
use fabula_core::{
    Artifact, ArtifactId, Lineage, Stage, Story, StoryId, StorySummary, UserId, Visual,
};
use fabula_error::{FabulaResult, StoryError, StoryErrorKind};
use fabula_interface::StoryRepository;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Artifact as presented to callers, with the payload in its model-facing
/// JSON shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactView {
    /// Artifact identifier
    pub id: ArtifactId,
    /// Story the artifact belongs to
    pub story_id: StoryId,
    /// Stage of the artifact
    pub stage: Stage,
    /// Upstream artifacts
    pub lineage: Lineage,
    /// Payload JSON
    pub details: serde_json::Value,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Last modification time
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<Artifact> for ArtifactView {
    type Error = fabula_error::FabulaError;

    fn try_from(artifact: Artifact) -> FabulaResult<Self> {
        Ok(Self {
            id: artifact.id,
            story_id: artifact.story_id,
            stage: artifact.stage(),
            lineage: artifact.lineage,
            details: artifact.payload.to_value()?,
            created_at: artifact.created_at,
            updated_at: artifact.updated_at,
        })
    }
}

/// Lists and looks up a user's stories, artifacts, and visuals.
#[derive(Clone)]
pub struct StoryCatalog {
    repository: Arc<dyn StoryRepository>,
}

impl StoryCatalog {
    /// Catalog over `repository`.
    pub fn new(repository: Arc<dyn StoryRepository>) -> Self {
        Self { repository }
    }

    /// The user's stories, newest first.
    pub async fn list_stories(&self, user_id: UserId) -> FabulaResult<Vec<StorySummary>> {
        self.repository.list_stories(user_id).await
    }

    /// One story, including its conversation.
    pub async fn get_story(&self, story_id: StoryId, user_id: UserId) -> FabulaResult<Story> {
        self.repository.find_story(story_id, user_id).await
    }

    /// The user's artifacts for `stage`.
    #[tracing::instrument(skip(self), fields(user_id = %user_id, stage = %stage))]
    pub async fn list_artifacts(
        &self,
        user_id: UserId,
        stage: Stage,
    ) -> FabulaResult<Vec<ArtifactView>> {
        let artifacts = self.repository.list_artifacts(user_id, stage).await?;
        tracing::debug!(count = artifacts.len(), "Listed artifacts");
        artifacts.into_iter().map(ArtifactView::try_from).collect()
    }

    /// The artifact linked for `stage` on a story.
    ///
    /// # Errors
    ///
    /// `NotFound` if the story does not exist or the stage is absent.
    pub async fn artifact_for_story(
        &self,
        story_id: StoryId,
        user_id: UserId,
        stage: Stage,
    ) -> FabulaResult<ArtifactView> {
        let story = self.repository.find_story(story_id, user_id).await?;
        let artifact_id = story.stage_ref(stage).ok_or_else(|| {
            StoryError::new(StoryErrorKind::NotFound(format!(
                "{} for story {}",
                stage, story_id
            )))
        })?;
        self.repository.find_artifact(artifact_id).await?.try_into()
    }

    /// The user's visual collections.
    pub async fn list_visuals(&self, user_id: UserId) -> FabulaResult<Vec<Visual>> {
        self.repository.list_visuals(user_id).await
    }
}
