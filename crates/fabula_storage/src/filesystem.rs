//! Filesystem-based story repository.
//!
//! Each document is a pretty-printed JSON file:
//!
//! ```text
//! {base_path}/
//! ├── stories/{story_id}.json
//! ├── artifacts/{artifact_id}.json
//! └── visuals/{visual_id}.json
//! ```
//!
//! Writes go to a temp file and are renamed into place, so a crash never
//! leaves a half-written document. Read-modify-write operations are
//! serialized by an in-process mutex; the repository assumes it is the only
//! writer of its directory.

use crate::documents::{
    add_item, artifact_not_found, ensure_unlinked, link, replace_item, replace_payload,
    set_video, story_not_found, visual_not_found,
};
use async_trait::async_trait;
use fabula_core::{
    Artifact, ArtifactId, Message, Stage, StagePayload, Story, StoryId, StorySummary, UserId,
    Visual, VisualId, VisualItem,
};
use fabula_error::{FabulaResult, StorageError, StorageErrorKind};
use fabula_interface::StoryRepository;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Collection {
    Stories,
    Artifacts,
    Visuals,
}

impl Collection {
    const ALL: [Collection; 3] = [
        Collection::Stories,
        Collection::Artifacts,
        Collection::Visuals,
    ];

    fn dir_name(self) -> &'static str {
        match self {
            Collection::Stories => "stories",
            Collection::Artifacts => "artifacts",
            Collection::Visuals => "visuals",
        }
    }
}

/// Filesystem story repository.
#[derive(Debug, Clone)]
pub struct FileSystemStoryRepository {
    base_path: PathBuf,
    write_lock: Arc<Mutex<()>>,
}

impl FileSystemStoryRepository {
    /// Create a repository rooted at `base_path`.
    ///
    /// Creates the collection directories if they don't exist.
    ///
    /// # Errors
    ///
    /// Returns error if a directory cannot be created.
    #[tracing::instrument(skip(base_path))]
    pub fn new(base_path: impl Into<PathBuf>) -> FabulaResult<Self> {
        let base_path = base_path.into();

        for collection in Collection::ALL {
            let dir = base_path.join(collection.dir_name());
            std::fs::create_dir_all(&dir).map_err(|e| {
                StorageError::new(StorageErrorKind::DirectoryCreation(format!(
                    "{}: {}",
                    dir.display(),
                    e
                )))
            })?;
        }

        tracing::info!(path = %base_path.display(), "Opened filesystem story repository");
        Ok(Self {
            base_path,
            write_lock: Arc::new(Mutex::new(())),
        })
    }

    /// Root directory of the repository.
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn path(&self, collection: Collection, id: impl std::fmt::Display) -> PathBuf {
        self.base_path
            .join(collection.dir_name())
            .join(format!("{}.json", id))
    }

    async fn read<T: DeserializeOwned>(&self, path: &Path) -> FabulaResult<Option<T>> {
        let bytes = match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(StorageError::new(StorageErrorKind::FileRead(format!(
                    "{}: {}",
                    path.display(),
                    e
                )))
                .into());
            }
        };

        let document = serde_json::from_slice(&bytes).map_err(|e| {
            StorageError::new(StorageErrorKind::Corrupt(format!(
                "{}: {}",
                path.display(),
                e
            )))
        })?;
        Ok(Some(document))
    }

    async fn write<T: Serialize>(&self, path: &Path, document: &T) -> FabulaResult<()> {
        let bytes = serde_json::to_vec_pretty(document).map_err(|e| {
            StorageError::new(StorageErrorKind::FileWrite(format!(
                "encode {}: {}",
                path.display(),
                e
            )))
        })?;

        // Write to temp file first, then rename for atomicity
        let temp_path = path.with_extension("json.tmp");
        tokio::fs::write(&temp_path, &bytes).await.map_err(|e| {
            StorageError::new(StorageErrorKind::FileWrite(format!(
                "{}: {}",
                temp_path.display(),
                e
            )))
        })?;

        tokio::fs::rename(&temp_path, path).await.map_err(|e| {
            StorageError::new(StorageErrorKind::FileWrite(format!(
                "rename {} to {}: {}",
                temp_path.display(),
                path.display(),
                e
            )))
        })?;

        tracing::trace!(path = %path.display(), size = bytes.len(), "Wrote document");
        Ok(())
    }

    async fn read_all<T: DeserializeOwned>(&self, collection: Collection) -> FabulaResult<Vec<T>> {
        let dir = self.base_path.join(collection.dir_name());
        let mut entries = tokio::fs::read_dir(&dir).await.map_err(|e| {
            StorageError::new(StorageErrorKind::FileRead(format!("{}: {}", dir.display(), e)))
        })?;

        let mut documents = Vec::new();
        loop {
            let entry = entries.next_entry().await.map_err(|e| {
                StorageError::new(StorageErrorKind::FileRead(format!(
                    "{}: {}",
                    dir.display(),
                    e
                )))
            })?;
            let Some(entry) = entry else { break };
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }
            if let Some(document) = self.read(&path).await? {
                documents.push(document);
            }
        }
        Ok(documents)
    }

    async fn load_story(&self, story_id: StoryId) -> FabulaResult<Story> {
        self.read(&self.path(Collection::Stories, story_id))
            .await?
            .ok_or_else(|| story_not_found(story_id).into())
    }

    async fn save_story(&self, story: &Story) -> FabulaResult<()> {
        self.write(&self.path(Collection::Stories, story.id), story)
            .await
    }

    async fn load_artifact(&self, artifact_id: ArtifactId) -> FabulaResult<Artifact> {
        self.read(&self.path(Collection::Artifacts, artifact_id))
            .await?
            .ok_or_else(|| artifact_not_found(artifact_id).into())
    }

    async fn load_visual(&self, visual_id: VisualId) -> FabulaResult<Visual> {
        self.read(&self.path(Collection::Visuals, visual_id))
            .await?
            .ok_or_else(|| visual_not_found(visual_id).into())
    }

    async fn save_visual(&self, visual: &Visual) -> FabulaResult<()> {
        self.write(&self.path(Collection::Visuals, visual.id), visual)
            .await
    }
}

#[async_trait]
impl StoryRepository for FileSystemStoryRepository {
    #[tracing::instrument(skip(self, story), fields(story_id = %story.id))]
    async fn create_story(&self, story: &Story) -> FabulaResult<()> {
        let _guard = self.write_lock.lock().await;
        self.save_story(story).await
    }

    async fn find_story(&self, story_id: StoryId, user_id: UserId) -> FabulaResult<Story> {
        let story = self.load_story(story_id).await?;
        if story.user_id != user_id {
            return Err(story_not_found(story_id).into());
        }
        Ok(story)
    }

    async fn list_stories(&self, user_id: UserId) -> FabulaResult<Vec<StorySummary>> {
        let stories: Vec<Story> = self.read_all(Collection::Stories).await?;
        let mut summaries: Vec<StorySummary> = stories
            .iter()
            .filter(|story| story.user_id == user_id)
            .map(StorySummary::from)
            .collect();
        summaries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(summaries)
    }

    #[tracing::instrument(skip(self, artifact), fields(artifact_id = %artifact.id, stage = %artifact.stage()))]
    async fn insert_artifact(&self, artifact: &Artifact) -> FabulaResult<()> {
        let _guard = self.write_lock.lock().await;
        self.write(&self.path(Collection::Artifacts, artifact.id), artifact)
            .await
    }

    async fn find_artifact(&self, artifact_id: ArtifactId) -> FabulaResult<Artifact> {
        self.load_artifact(artifact_id).await
    }

    async fn list_artifacts(&self, user_id: UserId, stage: Stage) -> FabulaResult<Vec<Artifact>> {
        let artifacts: Vec<Artifact> = self.read_all(Collection::Artifacts).await?;
        let mut artifacts: Vec<Artifact> = artifacts
            .into_iter()
            .filter(|artifact| artifact.user_id == user_id && artifact.stage() == stage)
            .collect();
        artifacts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(artifacts)
    }

    #[tracing::instrument(skip(self, payload))]
    async fn update_payload(
        &self,
        artifact_id: ArtifactId,
        payload: &StagePayload,
    ) -> FabulaResult<Artifact> {
        let _guard = self.write_lock.lock().await;
        let mut artifact = self.load_artifact(artifact_id).await?;
        replace_payload(&mut artifact, payload)?;
        self.write(&self.path(Collection::Artifacts, artifact_id), &artifact)
            .await?;
        Ok(artifact)
    }

    #[tracing::instrument(skip(self))]
    async fn remove_unlinked_artifact(&self, artifact_id: ArtifactId) -> FabulaResult<()> {
        let _guard = self.write_lock.lock().await;
        let path = self.path(Collection::Artifacts, artifact_id);
        let Some(artifact) = self.read::<Artifact>(&path).await? else {
            return Ok(());
        };
        let story: Option<Story> = self
            .read(&self.path(Collection::Stories, artifact.story_id))
            .await?;
        ensure_unlinked(story.as_ref(), &artifact)?;

        tokio::fs::remove_file(&path).await.map_err(|e| {
            StorageError::new(StorageErrorKind::FileWrite(format!(
                "delete {}: {}",
                path.display(),
                e
            )))
        })?;
        tracing::debug!("Removed unlinked artifact");
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn link_artifact(
        &self,
        story_id: StoryId,
        stage: Stage,
        artifact_id: ArtifactId,
    ) -> FabulaResult<Story> {
        let _guard = self.write_lock.lock().await;
        let mut story = self.load_story(story_id).await?;
        link(&mut story, stage, artifact_id)?;
        self.save_story(&story).await?;
        Ok(story)
    }

    #[tracing::instrument(skip(self))]
    async fn set_lock_flag(&self, story_id: StoryId, stage: Stage) -> FabulaResult<Story> {
        let _guard = self.write_lock.lock().await;
        let mut story = self.load_story(story_id).await?;
        story.save_status.lock(stage);
        story.touch();
        self.save_story(&story).await?;
        Ok(story)
    }

    async fn append_exchange(
        &self,
        story_id: StoryId,
        user: &Message,
        assistant: &Message,
    ) -> FabulaResult<()> {
        let _guard = self.write_lock.lock().await;
        let mut story = self.load_story(story_id).await?;
        story.push_exchange(user.clone(), assistant.clone());
        self.save_story(&story).await
    }

    async fn set_summary(&self, story_id: StoryId, summary: &str) -> FabulaResult<()> {
        let _guard = self.write_lock.lock().await;
        let mut story = self.load_story(story_id).await?;
        story.summary = Some(summary.to_string());
        story.touch();
        self.save_story(&story).await
    }

    #[tracing::instrument(skip(self))]
    async fn ensure_visual(&self, story_id: StoryId) -> FabulaResult<Visual> {
        let _guard = self.write_lock.lock().await;
        let mut story = self.load_story(story_id).await?;

        if let Some(visual_id) = story.visual {
            if let Some(visual) = self.read(&self.path(Collection::Visuals, visual_id)).await? {
                return Ok(visual);
            }
        }

        let visual = Visual::new(story.id, story.user_id);
        self.save_visual(&visual).await?;
        story.visual = Some(visual.id);
        story.touch();
        self.save_story(&story).await?;
        tracing::debug!(visual_id = %visual.id, "Created visual collection");
        Ok(visual)
    }

    async fn add_visual_item(
        &self,
        visual_id: VisualId,
        item: &VisualItem,
    ) -> FabulaResult<Visual> {
        let _guard = self.write_lock.lock().await;
        let mut visual = self.load_visual(visual_id).await?;
        add_item(&mut visual, item)?;
        self.save_visual(&visual).await?;
        Ok(visual)
    }

    async fn replace_visual_item(
        &self,
        visual_id: VisualId,
        item: &VisualItem,
    ) -> FabulaResult<Visual> {
        let _guard = self.write_lock.lock().await;
        let mut visual = self.load_visual(visual_id).await?;
        replace_item(&mut visual, item)?;
        self.save_visual(&visual).await?;
        Ok(visual)
    }

    async fn set_video_url(&self, visual_id: VisualId, video_url: &str) -> FabulaResult<Visual> {
        let _guard = self.write_lock.lock().await;
        let mut visual = self.load_visual(visual_id).await?;
        set_video(&mut visual, video_url);
        self.save_visual(&visual).await?;
        Ok(visual)
    }

    async fn find_visual(&self, visual_id: VisualId) -> FabulaResult<Visual> {
        self.load_visual(visual_id).await
    }

    async fn list_visuals(&self, user_id: UserId) -> FabulaResult<Vec<Visual>> {
        let visuals: Vec<Visual> = self.read_all(Collection::Visuals).await?;
        Ok(visuals
            .into_iter()
            .filter(|visual| visual.user_id == user_id)
            .collect())
    }
}
