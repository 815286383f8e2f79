//! Visual collections: scene images and the story video.

use crate::gate::PrerequisitePolicy;
use crate::locks::StoryLocks;
use crate::prompt::{PromptBuilder, Upstream};
use fabula_core::{
    Stage, StagePayload, Story, StoryId, UserId, Visual, VisualAsset, VisualItem, VisualSlot,
};
use fabula_error::{FabulaResult, StoryError, StoryErrorKind};
use fabula_interface::{MediaGenerator, StoryRepository};
use std::sync::Arc;

/// Attaches and generates media for a story.
///
/// Visuals come after every narrative stage: the same
/// [`PrerequisitePolicy`] the stage gate uses is applied to theme, world,
/// character, and plot. Writes run inside the story's exclusive section, so
/// share the gate's [`StoryLocks`] via [`with_locks`](Self::with_locks).
#[derive(Clone)]
pub struct VisualService {
    repository: Arc<dyn StoryRepository>,
    media: Option<Arc<dyn MediaGenerator>>,
    prompts: PromptBuilder,
    locks: StoryLocks,
    policy: PrerequisitePolicy,
}

impl VisualService {
    /// Create a service without a media backend; only
    /// [`attach`](Self::attach) and [`find`](Self::find) are usable.
    pub fn new(repository: Arc<dyn StoryRepository>, prompts: PromptBuilder) -> Self {
        Self {
            repository,
            media: None,
            prompts,
            locks: StoryLocks::new(),
            policy: PrerequisitePolicy::default(),
        }
    }

    /// Use `media` for image and video generation.
    pub fn with_media(mut self, media: Arc<dyn MediaGenerator>) -> Self {
        self.media = Some(media);
        self
    }

    /// Share a lock registry with other story writers.
    pub fn with_locks(mut self, locks: StoryLocks) -> Self {
        self.locks = locks;
        self
    }

    /// Replace the prerequisite policy.
    pub fn with_policy(mut self, policy: PrerequisitePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Attach an existing image or video to the story's collection.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the story does not exist for `user_id`
    /// - `PrerequisiteMissing` if a narrative stage is not ready
    /// - `AlreadyExists` if an image already occupies the slot
    /// - `InvalidInput` for an empty URL
    #[tracing::instrument(skip(self, asset), fields(story_id = %story_id))]
    pub async fn attach(
        &self,
        story_id: StoryId,
        user_id: UserId,
        asset: VisualAsset,
    ) -> FabulaResult<Visual> {
        let url = match &asset {
            VisualAsset::Image(item) => &item.image_url,
            VisualAsset::Video { video_url } => video_url,
        };
        if url.trim().is_empty() {
            return Err(invalid_input("media URL is empty"));
        }

        let _guard = self.locks.acquire(story_id).await;
        let story = self.ready_story(story_id, user_id).await?;
        let visual = self.repository.ensure_visual(story.id).await?;

        let visual = match asset {
            VisualAsset::Image(item) => {
                self.repository.add_visual_item(visual.id, &item).await?
            }
            VisualAsset::Video { video_url } => {
                self.repository.set_video_url(visual.id, &video_url).await?
            }
        };

        tracing::info!(visual_id = %visual.id, images = visual.visuals.len(), "Visual updated");
        Ok(visual)
    }

    /// Generate and attach the image for one plot act.
    ///
    /// The act's description from the plot is the moment to illustrate;
    /// `direction` adds to it, or stands alone when the plot has no such act.
    ///
    /// # Errors
    ///
    /// As for [`attach`](Self::attach), plus `GenerationFailed` if the media
    /// backend fails or is not configured, and `InvalidInput` if there is
    /// nothing to illustrate.
    #[tracing::instrument(
        skip(self, slot, direction),
        fields(story_id = %story_id, episode = slot.episode, scene = slot.scene, act = slot.act)
    )]
    pub async fn generate_image(
        &self,
        story_id: StoryId,
        user_id: UserId,
        slot: VisualSlot,
        direction: Option<&str>,
    ) -> FabulaResult<Visual> {
        let media = self.media()?;
        let _guard = self.locks.acquire(story_id).await;
        let story = self.ready_story(story_id, user_id).await?;

        let upstream = self.load_upstream(&story).await?;
        let described = act_description(&upstream, slot);
        let direction = direction.map(str::trim).filter(|d| !d.is_empty());
        let moment = match (described, direction) {
            (Some(d), Some(extra)) => format!("{}\n{}", d, extra),
            (Some(d), None) => d,
            (None, Some(extra)) => extra.to_string(),
            (None, None) => {
                return Err(invalid_input(format!(
                    "plot has no act at episode {} scene {} act {}",
                    slot.episode, slot.scene, slot.act
                )));
            }
        };

        let visual = self.repository.ensure_visual(story.id).await?;
        if visual.item(slot).is_some() {
            return Err(StoryError::new(StoryErrorKind::AlreadyExists(format!(
                "image for episode {} scene {} act {}",
                slot.episode, slot.scene, slot.act
            )))
            .into());
        }

        let prompt = self.prompts.visual_prompt(&upstream, &moment)?;
        let image_url = first_url(media.text_to_image(&prompt).await, media.provider_name())?;

        let item = VisualItem {
            image_url,
            episode: slot.episode,
            scene: slot.scene,
            act: slot.act,
        };
        let visual = self.repository.add_visual_item(visual.id, &item).await?;
        tracing::info!(visual_id = %visual.id, "Scene image generated");
        Ok(visual)
    }

    /// Animate the image at `slot` and set it as the story video.
    ///
    /// # Errors
    ///
    /// `NotFound` if there is no image at `slot`; otherwise as for
    /// [`generate_image`](Self::generate_image).
    #[tracing::instrument(skip(self), fields(story_id = %story_id))]
    pub async fn generate_video(
        &self,
        story_id: StoryId,
        user_id: UserId,
        slot: VisualSlot,
    ) -> FabulaResult<Visual> {
        let media = self.media()?;
        let _guard = self.locks.acquire(story_id).await;
        let story = self.ready_story(story_id, user_id).await?;
        let visual = self.repository.ensure_visual(story.id).await?;

        let image_url = image_at(&visual, slot)?;

        let video_url = first_url(
            media.image_to_video(&image_url).await,
            media.provider_name(),
        )?;
        let visual = self.repository.set_video_url(visual.id, &video_url).await?;
        tracing::info!(visual_id = %visual.id, "Story video generated");
        Ok(visual)
    }

    /// Rework the image at `slot` following `instruction` and store the
    /// result in its place.
    ///
    /// # Errors
    ///
    /// `InvalidInput` for an empty instruction, `NotFound` if there is no
    /// image at `slot`; otherwise as for [`generate_image`](Self::generate_image).
    #[tracing::instrument(
        skip(self, slot, instruction),
        fields(story_id = %story_id, episode = slot.episode, scene = slot.scene, act = slot.act)
    )]
    pub async fn edit_image(
        &self,
        story_id: StoryId,
        user_id: UserId,
        slot: VisualSlot,
        instruction: &str,
    ) -> FabulaResult<Visual> {
        let instruction = instruction.trim();
        if instruction.is_empty() {
            return Err(invalid_input("edit instruction is empty"));
        }
        let media = self.media()?;
        let _guard = self.locks.acquire(story_id).await;
        let story = self.ready_story(story_id, user_id).await?;
        let visual = self.repository.ensure_visual(story.id).await?;

        let source = image_at(&visual, slot)?;
        let image_url = first_url(
            media.image_to_image(&source, instruction).await,
            media.provider_name(),
        )?;

        let visual = self.replace_image(&visual, slot, image_url).await?;
        tracing::info!(visual_id = %visual.id, "Scene image edited");
        Ok(visual)
    }

    /// Upscale the image at `slot` in place, guided by the act it shows.
    ///
    /// # Errors
    ///
    /// `NotFound` if there is no image at `slot`; otherwise as for
    /// [`generate_image`](Self::generate_image).
    #[tracing::instrument(
        skip(self, slot),
        fields(story_id = %story_id, episode = slot.episode, scene = slot.scene, act = slot.act)
    )]
    pub async fn upscale_image(
        &self,
        story_id: StoryId,
        user_id: UserId,
        slot: VisualSlot,
    ) -> FabulaResult<Visual> {
        let media = self.media()?;
        let _guard = self.locks.acquire(story_id).await;
        let story = self.ready_story(story_id, user_id).await?;
        let visual = self.repository.ensure_visual(story.id).await?;

        let source = image_at(&visual, slot)?;
        let upstream = self.load_upstream(&story).await?;
        let guidance = act_description(&upstream, slot).unwrap_or_default();
        let image_url = first_url(
            media.upscale(&source, &guidance).await,
            media.provider_name(),
        )?;

        let visual = self.replace_image(&visual, slot, image_url).await?;
        tracing::info!(visual_id = %visual.id, "Scene image upscaled");
        Ok(visual)
    }

    /// The story's visual collection.
    ///
    /// # Errors
    ///
    /// `NotFound` if the story has no visuals yet.
    pub async fn find(&self, story_id: StoryId, user_id: UserId) -> FabulaResult<Visual> {
        let story = self.repository.find_story(story_id, user_id).await?;
        let visual_id = story.visual.ok_or_else(|| {
            StoryError::new(StoryErrorKind::NotFound(format!(
                "visual for story {}",
                story_id
            )))
        })?;
        self.repository.find_visual(visual_id).await
    }

    async fn replace_image(
        &self,
        visual: &Visual,
        slot: VisualSlot,
        image_url: String,
    ) -> FabulaResult<Visual> {
        let item = VisualItem {
            image_url,
            episode: slot.episode,
            scene: slot.scene,
            act: slot.act,
        };
        self.repository.replace_visual_item(visual.id, &item).await
    }

    fn media(&self) -> FabulaResult<&Arc<dyn MediaGenerator>> {
        self.media.as_ref().ok_or_else(|| {
            StoryError::new(StoryErrorKind::GenerationFailed(
                "no media generator configured".to_string(),
            ))
            .into()
        })
    }

    async fn ready_story(&self, story_id: StoryId, user_id: UserId) -> FabulaResult<Story> {
        let story = self.repository.find_story(story_id, user_id).await?;
        self.policy.check(&story, "visual", &Stage::ORDER)?;
        Ok(story)
    }

    async fn load_upstream(&self, story: &Story) -> FabulaResult<Upstream> {
        let mut upstream = Upstream::new();
        for stage in Stage::ORDER {
            if let Some(id) = story.stage_ref(stage) {
                upstream.insert(stage, self.repository.find_artifact(id).await?.payload);
            }
        }
        Ok(upstream)
    }
}

fn act_description(upstream: &Upstream, slot: VisualSlot) -> Option<String> {
    match upstream.get(&Stage::Plot) {
        Some(StagePayload::Plot(plot)) => plot
            .act(slot.episode, slot.scene, slot.act)
            .map(|act| act.description.clone())
            .filter(|d| !d.trim().is_empty()),
        _ => None,
    }
}

fn image_at(visual: &Visual, slot: VisualSlot) -> FabulaResult<String> {
    visual
        .item(slot)
        .map(|item| item.image_url.clone())
        .ok_or_else(|| {
            StoryError::new(StoryErrorKind::NotFound(format!(
                "no image at episode {} scene {} act {}",
                slot.episode, slot.scene, slot.act
            )))
            .into()
        })
}

fn first_url(result: FabulaResult<Vec<String>>, provider: &str) -> FabulaResult<String> {
    let urls = result.map_err(|e| {
        tracing::error!(provider, error = %e, "Media generation failed");
        StoryError::new(StoryErrorKind::GenerationFailed(e.message()))
    })?;
    urls.into_iter().next().ok_or_else(|| {
        StoryError::new(StoryErrorKind::GenerationFailed(format!(
            "{} returned no media",
            provider
        )))
        .into()
    })
}

fn invalid_input(message: impl Into<String>) -> fabula_error::FabulaError {
    StoryError::new(StoryErrorKind::InvalidInput(message.into())).into()
}
