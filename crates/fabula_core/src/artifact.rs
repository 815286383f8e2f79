//! Stage artifacts.

use crate::{ArtifactId, Stage, StagePayload, Story, StoryId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Upstream artifacts a stage artifact was generated from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lineage {
    /// Theme artifact
    pub theme: Option<ArtifactId>,
    /// World artifact
    pub world: Option<ArtifactId>,
    /// Character roster artifact
    pub character: Option<ArtifactId>,
}

impl Lineage {
    /// Capture the story's references for every prerequisite of `stage`.
    pub fn for_stage(story: &Story, stage: Stage) -> Self {
        let mut lineage = Self::default();
        for upstream in stage.prerequisites() {
            let id = story.stage_ref(*upstream);
            match upstream {
                Stage::Theme => lineage.theme = id,
                Stage::World => lineage.world = id,
                Stage::Character => lineage.character = id,
                Stage::Plot => {}
            }
        }
        lineage
    }
}

/// A generated theme, world, character roster, or plot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Artifact {
    /// Artifact identifier
    pub id: ArtifactId,
    /// Story this artifact belongs to
    pub story_id: StoryId,
    /// Owning user
    pub user_id: UserId,
    /// Upstream artifacts
    pub lineage: Lineage,
    /// Structured stage payload
    pub payload: StagePayload,
    /// Plot branch marker
    #[serde(default)]
    pub branch: bool,
    /// Plot this one branched from
    #[serde(default)]
    pub plot_origin: Option<ArtifactId>,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Last modification time
    pub updated_at: DateTime<Utc>,
}

impl Artifact {
    /// New artifact for `story` carrying `payload`, with lineage taken from the story.
    pub fn new(story: &Story, payload: StagePayload) -> Self {
        let now = Utc::now();
        Self {
            id: ArtifactId::new(),
            story_id: story.id,
            user_id: story.user_id,
            lineage: Lineage::for_stage(story, payload.stage()),
            payload,
            branch: false,
            plot_origin: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Stage of this artifact.
    pub fn stage(&self) -> Stage {
        self.payload.stage()
    }
}
