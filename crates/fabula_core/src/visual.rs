//! Visual collections attached to a story.

use crate::{StoryId, UserId, VisualId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Position of an image within the plot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VisualSlot {
    /// Episode number
    pub episode: u32,
    /// Scene number
    pub scene: u32,
    /// Act number
    pub act: u32,
}

/// One generated image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisualItem {
    /// Image location
    pub image_url: String,
    /// Episode number
    pub episode: u32,
    /// Scene number
    pub scene: u32,
    /// Act number
    pub act: u32,
}

impl VisualItem {
    /// Uniqueness key of this item.
    pub fn slot(&self) -> VisualSlot {
        VisualSlot {
            episode: self.episode,
            scene: self.scene,
            act: self.act,
        }
    }
}

/// Media to attach to a story's visual collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum VisualAsset {
    /// Scene image, unique per slot
    Image(VisualItem),
    /// Story video; replaces any previous one
    Video {
        /// Video location
        video_url: String,
    },
}

/// Images (unique per episode/scene/act) plus an optional video.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Visual {
    /// Visual identifier
    pub id: VisualId,
    /// Story this collection belongs to
    pub story_id: StoryId,
    /// Owning user
    pub user_id: UserId,
    /// Scene images
    pub visuals: Vec<VisualItem>,
    /// Story video
    pub video_url: Option<String>,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Last modification time
    pub updated_at: DateTime<Utc>,
}

impl Visual {
    /// Empty collection for a story.
    pub fn new(story_id: StoryId, user_id: UserId) -> Self {
        let now = Utc::now();
        Self {
            id: VisualId::new(),
            story_id,
            user_id,
            visuals: Vec::new(),
            video_url: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Image stored at `slot`, if any.
    pub fn item(&self, slot: VisualSlot) -> Option<&VisualItem> {
        self.visuals.iter().find(|item| item.slot() == slot)
    }
}
