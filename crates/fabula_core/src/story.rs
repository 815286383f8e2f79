//! The story aggregate root.

use crate::{ArtifactId, Message, Stage, StageState, StoryId, UserId, VisualId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Per-stage lock flags.
///
/// A flag flips to `true` when the stage is saved and never flips back.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveStatus {
    /// Theme saved
    pub theme: bool,
    /// World saved
    pub world: bool,
    /// Character roster saved
    pub character: bool,
    /// Plot saved
    pub plot: bool,
}

impl SaveStatus {
    /// Whether `stage` is saved.
    pub fn get(&self, stage: Stage) -> bool {
        match stage {
            Stage::Theme => self.theme,
            Stage::World => self.world,
            Stage::Character => self.character,
            Stage::Plot => self.plot,
        }
    }

    /// Mark `stage` as saved.
    pub fn lock(&mut self, stage: Stage) {
        match stage {
            Stage::Theme => self.theme = true,
            Stage::World => self.world = true,
            Stage::Character => self.character = true,
            Stage::Plot => self.plot = true,
        }
    }
}

/// A story and its staged artifact references.
///
/// # Examples
///
/// ```
/// use fabula_core::{Stage, StageState, Story, UserId};
///
/// let story = Story::new(UserId::new());
/// assert_eq!(story.session_id, story.id);
/// assert_eq!(story.state(Stage::Theme), StageState::Absent);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Story {
    /// Story identifier
    pub id: StoryId,
    /// Owning user
    pub user_id: UserId,
    /// Theme artifact
    pub theme: Option<ArtifactId>,
    /// World artifact
    pub world: Option<ArtifactId>,
    /// Character roster artifact
    pub character: Option<ArtifactId>,
    /// Plot artifact
    pub plot: Option<ArtifactId>,
    /// Visual collection
    pub visual: Option<VisualId>,
    /// Stage lock flags
    pub save_status: SaveStatus,
    /// Conversation session key; equals `id` at creation
    pub session_id: StoryId,
    /// Append-only conversation history
    #[serde(default)]
    pub messages: Vec<Message>,
    /// Rolling conversation summary
    #[serde(default)]
    pub summary: Option<String>,
    /// Whether this story is an alternate timeline
    #[serde(default)]
    pub branch: bool,
    /// Stories this timeline was derived from
    #[serde(default)]
    pub timeline_origin: Vec<StoryId>,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Last modification time
    pub updated_at: DateTime<Utc>,
}

impl Story {
    /// Create an empty story owned by `user_id`.
    pub fn new(user_id: UserId) -> Self {
        let id = StoryId::new();
        let now = Utc::now();
        Self {
            id,
            user_id,
            theme: None,
            world: None,
            character: None,
            plot: None,
            visual: None,
            save_status: SaveStatus::default(),
            session_id: id,
            messages: Vec::new(),
            summary: None,
            branch: false,
            timeline_origin: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Artifact currently linked for `stage`.
    pub fn stage_ref(&self, stage: Stage) -> Option<ArtifactId> {
        match stage {
            Stage::Theme => self.theme,
            Stage::World => self.world,
            Stage::Character => self.character,
            Stage::Plot => self.plot,
        }
    }

    /// Link `artifact` for `stage`, replacing any previous reference.
    pub fn set_stage_ref(&mut self, stage: Stage, artifact: ArtifactId) {
        let slot = match stage {
            Stage::Theme => &mut self.theme,
            Stage::World => &mut self.world,
            Stage::Character => &mut self.character,
            Stage::Plot => &mut self.plot,
        };
        *slot = Some(artifact);
        self.touch();
    }

    /// Lifecycle state of `stage`.
    pub fn state(&self, stage: Stage) -> StageState {
        match (self.stage_ref(stage), self.save_status.get(stage)) {
            (None, _) => StageState::Absent,
            (Some(_), false) => StageState::Draft,
            (Some(_), true) => StageState::Locked,
        }
    }

    /// Whether `artifact` is the one linked for `stage`.
    pub fn links(&self, stage: Stage, artifact: ArtifactId) -> bool {
        self.stage_ref(stage) == Some(artifact)
    }

    /// Append one user/assistant exchange to the history.
    pub fn push_exchange(&mut self, user: Message, assistant: Message) {
        self.messages.push(user);
        self.messages.push(assistant);
        self.touch();
    }

    /// Bump `updated_at`.
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// Story listing entry without conversation data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorySummary {
    /// Story identifier
    pub id: StoryId,
    /// Owning user
    pub user_id: UserId,
    /// Theme artifact
    pub theme: Option<ArtifactId>,
    /// World artifact
    pub world: Option<ArtifactId>,
    /// Character roster artifact
    pub character: Option<ArtifactId>,
    /// Plot artifact
    pub plot: Option<ArtifactId>,
    /// Visual collection
    pub visual: Option<VisualId>,
    /// Stage lock flags
    pub save_status: SaveStatus,
    /// Whether this story is an alternate timeline
    pub branch: bool,
    /// Stories this timeline was derived from
    pub timeline_origin: Vec<StoryId>,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Last modification time
    pub updated_at: DateTime<Utc>,
}

impl From<&Story> for StorySummary {
    fn from(story: &Story) -> Self {
        Self {
            id: story.id,
            user_id: story.user_id,
            theme: story.theme,
            world: story.world,
            character: story.character,
            plot: story.plot,
            visual: story.visual,
            save_status: story.save_status,
            branch: story.branch,
            timeline_origin: story.timeline_origin.clone(),
            created_at: story.created_at,
            updated_at: story.updated_at,
        }
    }
}
