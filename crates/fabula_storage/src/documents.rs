//! Document mutations shared by every backend.
//!
//! Backends load a document, apply one of these functions, and write it
//! back while holding their write lock.

use chrono::Utc;
use fabula_core::{Artifact, ArtifactId, Stage, StagePayload, Story, Visual, VisualItem};
use fabula_error::{FabulaResult, StoryError, StoryErrorKind};

#[track_caller]
pub(crate) fn story_not_found(story: impl std::fmt::Display) -> StoryError {
    StoryError::new(StoryErrorKind::NotFound(format!("Story {} not found", story)))
}

#[track_caller]
pub(crate) fn artifact_not_found(artifact: impl std::fmt::Display) -> StoryError {
    StoryError::new(StoryErrorKind::NotFound(format!(
        "Artifact {} not found",
        artifact
    )))
}

#[track_caller]
pub(crate) fn visual_not_found(visual: impl std::fmt::Display) -> StoryError {
    StoryError::new(StoryErrorKind::NotFound(format!("Visual {} not found", visual)))
}

/// Compare-and-set a stage reference from empty.
pub(crate) fn link(story: &mut Story, stage: Stage, artifact_id: ArtifactId) -> FabulaResult<()> {
    if let Some(existing) = story.stage_ref(stage) {
        return Err(StoryError::new(StoryErrorKind::AlreadyExists(format!(
            "{} already exists on story {} ({})",
            stage, story.id, existing
        )))
        .into());
    }
    story.set_stage_ref(stage, artifact_id);
    Ok(())
}

/// Replace an artifact payload, keeping its stage.
pub(crate) fn replace_payload(artifact: &mut Artifact, payload: &StagePayload) -> FabulaResult<()> {
    if payload.stage() != artifact.stage() {
        return Err(StoryError::new(StoryErrorKind::InvalidInput(format!(
            "Cannot store {} payload in {} artifact {}",
            payload.stage(),
            artifact.stage(),
            artifact.id
        )))
        .into());
    }
    artifact.payload = payload.clone();
    artifact.updated_at = Utc::now();
    Ok(())
}

/// Refuse to delete an artifact some story links.
pub(crate) fn ensure_unlinked(story: Option<&Story>, artifact: &Artifact) -> FabulaResult<()> {
    if story.is_some_and(|story| story.links(artifact.stage(), artifact.id)) {
        return Err(StoryError::new(StoryErrorKind::AlreadyExists(format!(
            "Artifact {} is linked to story {}",
            artifact.id, artifact.story_id
        )))
        .into());
    }
    Ok(())
}

/// Add an image, enforcing slot uniqueness.
pub(crate) fn add_item(visual: &mut Visual, item: &VisualItem) -> FabulaResult<()> {
    let slot = item.slot();
    if visual.item(slot).is_some() {
        return Err(StoryError::new(StoryErrorKind::AlreadyExists(format!(
            "Visual for episode {} scene {} act {} already exists",
            slot.episode, slot.scene, slot.act
        )))
        .into());
    }
    visual.visuals.push(item.clone());
    visual.updated_at = Utc::now();
    Ok(())
}

/// Swap the image at an occupied slot.
pub(crate) fn replace_item(visual: &mut Visual, item: &VisualItem) -> FabulaResult<()> {
    let slot = item.slot();
    let existing = visual
        .visuals
        .iter_mut()
        .find(|current| current.slot() == slot)
        .ok_or_else(|| {
            StoryError::new(StoryErrorKind::NotFound(format!(
                "Visual for episode {} scene {} act {} not found",
                slot.episode, slot.scene, slot.act
            )))
        })?;
    *existing = item.clone();
    visual.updated_at = Utc::now();
    Ok(())
}

/// Set the video URL.
pub(crate) fn set_video(visual: &mut Visual, video_url: &str) {
    visual.video_url = Some(video_url.to_string());
    visual.updated_at = Utc::now();
}
