//! Stage lifecycle: create, refine, save.

use crate::locks::StoryLocks;
use crate::parser::ResponseParser;
use crate::prompt::{PromptBuilder, Upstream};
use crate::session::{ConversationSession, SessionTurn};
use derive_getters::Getters;
use fabula_core::{
    Artifact, ArtifactId, Stage, StagePayload, StageState, Story, StoryId, UserId, VisualId,
};
use fabula_error::{FabulaError, FabulaErrorKind, FabulaResult, StoryError, StoryErrorKind};
use fabula_interface::StoryRepository;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio_retry2::strategy::{ExponentialBackoff, jitter};
use tokio_retry2::{Retry, RetryError};

/// What an upstream stage must satisfy before a downstream stage is created.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum PrerequisitePolicy {
    /// Upstream artifact exists (draft or locked)
    #[default]
    Present,
    /// Upstream artifact exists and has been saved
    Locked,
}

impl PrerequisitePolicy {
    /// Check `required` stages on `story` for an operation named `label`.
    ///
    /// Stages are checked in order, so the first unmet one is reported.
    ///
    /// ```
    /// use fabula_core::{ArtifactId, Stage, Story, UserId};
    /// use fabula_narrative::PrerequisitePolicy;
    ///
    /// let mut story = Story::new(UserId::new());
    /// story.set_stage_ref(Stage::Theme, ArtifactId::new());
    ///
    /// let required = Stage::World.prerequisites();
    /// assert!(PrerequisitePolicy::Present.check(&story, "world", required).is_ok());
    /// assert!(PrerequisitePolicy::Locked.check(&story, "world", required).is_err());
    /// ```
    pub fn check(self, story: &Story, label: &str, required: &[Stage]) -> FabulaResult<()> {
        for stage in required {
            let ready = match self {
                PrerequisitePolicy::Present => story.stage_ref(*stage).is_some(),
                PrerequisitePolicy::Locked => story.state(*stage) == StageState::Locked,
            };
            if !ready {
                return Err(StoryError::new(StoryErrorKind::PrerequisiteMissing {
                    stage: label.to_string(),
                    missing: stage.to_string(),
                })
                .into());
            }
        }
        Ok(())
    }
}

/// Stage gate settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters, derive_setters::Setters)]
#[setters(prefix = "with_")]
pub struct GateConfig {
    /// Prerequisite rule applied to every stage and to visuals
    #[serde(default)]
    policy: PrerequisitePolicy,

    /// Retries for store writes after a successful generation
    #[serde(default = "default_persist_retries")]
    persist_retries: usize,

    /// First retry delay in milliseconds
    #[serde(default = "default_persist_backoff_ms")]
    persist_backoff_ms: u64,
}

fn default_persist_retries() -> usize {
    3
}

fn default_persist_backoff_ms() -> u64 {
    100
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            policy: PrerequisitePolicy::default(),
            persist_retries: default_persist_retries(),
            persist_backoff_ms: default_persist_backoff_ms(),
        }
    }
}

/// Result of a stage operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageOutcome {
    /// Story operated on
    pub story_id: StoryId,
    /// Stage operated on
    pub stage: Stage,
    /// Artifact linked for the stage
    pub artifact_id: ArtifactId,
    /// Stage state after the operation
    pub state: StageState,
    /// Generated payload; absent for save
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<StagePayload>,
}

/// Lifecycle state of every stage of a story.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoryStatus {
    /// Story
    pub story_id: StoryId,
    /// State per narrative stage
    pub stages: BTreeMap<Stage, StageState>,
    /// Visual collection, if one exists
    pub visual: Option<VisualId>,
}

/// Enforces the stage state machine.
///
/// Each stage goes `ABSENT → DRAFT → LOCKED`. Creating a stage needs its
/// upstream stages to satisfy the [`PrerequisitePolicy`]; refining is only
/// allowed on drafts; saving locks the stage for good.
#[derive(Clone)]
pub struct StageGate {
    repository: Arc<dyn StoryRepository>,
    session: ConversationSession,
    prompts: PromptBuilder,
    parser: ResponseParser,
    locks: StoryLocks,
    config: GateConfig,
}

impl StageGate {
    /// Create a gate over `repository`, generating through `session`.
    pub fn new(
        repository: Arc<dyn StoryRepository>,
        session: ConversationSession,
        prompts: PromptBuilder,
    ) -> Self {
        Self {
            repository,
            session,
            prompts,
            parser: ResponseParser::new(),
            locks: StoryLocks::new(),
            config: GateConfig::default(),
        }
    }

    /// Replace the gate settings.
    pub fn with_config(mut self, config: GateConfig) -> Self {
        self.config = config;
        self
    }

    /// Share a lock registry with other story writers.
    pub fn with_locks(mut self, locks: StoryLocks) -> Self {
        self.locks = locks;
        self
    }

    /// Lock registry used by this gate.
    pub fn locks(&self) -> &StoryLocks {
        &self.locks
    }

    /// Gate settings.
    pub fn config(&self) -> &GateConfig {
        &self.config
    }

    /// Create an empty story for `user_id`.
    #[tracing::instrument(skip(self), fields(user_id = %user_id))]
    pub async fn create_story(&self, user_id: UserId) -> FabulaResult<Story> {
        let story = Story::new(user_id);
        self.repository.create_story(&story).await?;
        tracing::info!(story_id = %story.id, "Story created");
        Ok(story)
    }

    /// Generate the first draft of `stage`.
    ///
    /// # Errors
    ///
    /// - `InvalidInput` for an empty prompt
    /// - `NotFound` if the story does not exist for `user_id`
    /// - `AlreadyExists` if the stage already has an artifact
    /// - `PrerequisiteMissing` if an upstream stage is not ready
    /// - `GenerationFailed` or `ParseError` from the model round trip
    /// - `PersistenceError` if the result or the exchange could not be
    ///   stored; when only the exchange failed the draft stays linked
    #[tracing::instrument(skip(self, prompt), fields(stage = %stage, story_id = %story_id))]
    pub async fn create(
        &self,
        stage: Stage,
        story_id: StoryId,
        user_id: UserId,
        prompt: &str,
    ) -> FabulaResult<StageOutcome> {
        require_prompt(prompt)?;
        let _guard = self.locks.acquire(story_id).await;

        let story = self.repository.find_story(story_id, user_id).await?;
        if story.stage_ref(stage).is_some() {
            return Err(StoryError::new(StoryErrorKind::AlreadyExists(format!(
                "{} already exists for story {}",
                stage, story_id
            )))
            .into());
        }
        self.config
            .policy
            .check(&story, stage.as_ref(), stage.prerequisites())?;

        let upstream = self.load_upstream(&story, stage).await?;
        let system_prompt = self.prompts.stage_prompt(stage, &upstream)?;
        let turn = self.session.invoke(&story, &system_prompt, prompt).await?;
        let payload = self.parser.parse(stage, turn.output())?;

        let artifact = Artifact::new(&story, payload);
        self.persist(&artifact.payload, || self.repository.insert_artifact(&artifact))
            .await?;

        let linked = self
            .persist(&artifact.payload, || {
                self.repository.link_artifact(story_id, stage, artifact.id)
            })
            .await;
        if let Err(e) = linked {
            self.discard_unlinked(artifact.id).await;
            return Err(e);
        }

        self.record(&story, &turn, &artifact.payload).await?;
        tracing::info!(artifact_id = %artifact.id, "Stage draft created");

        Ok(StageOutcome {
            story_id,
            stage,
            artifact_id: artifact.id,
            state: StageState::Draft,
            payload: Some(artifact.payload),
        })
    }

    /// Regenerate a draft from its current payload and `prompt`.
    ///
    /// # Errors
    ///
    /// - `NotFound` if `artifact_id` is not the story's artifact for `stage`
    /// - `AlreadyLocked` if the stage has been saved
    /// - `GenerationFailed`, `ParseError`, or `PersistenceError` as for
    ///   [`create`](Self::create)
    #[tracing::instrument(
        skip(self, prompt),
        fields(stage = %stage, story_id = %story_id, artifact_id = %artifact_id)
    )]
    pub async fn refine(
        &self,
        stage: Stage,
        story_id: StoryId,
        user_id: UserId,
        artifact_id: ArtifactId,
        prompt: &str,
    ) -> FabulaResult<StageOutcome> {
        require_prompt(prompt)?;
        let _guard = self.locks.acquire(story_id).await;

        let story = self.find_linked(stage, story_id, user_id, artifact_id).await?;
        if story.state(stage) == StageState::Locked {
            return Err(StoryError::new(StoryErrorKind::AlreadyLocked(stage.to_string())).into());
        }

        let current = self.repository.find_artifact(artifact_id).await?;
        let upstream = self.load_upstream(&story, stage).await?;
        let system_prompt = self.prompts.stage_prompt(stage, &upstream)?;
        let user_input = self.prompts.refine_prompt(&current.payload, prompt)?;

        let turn = self.session.invoke(&story, &system_prompt, &user_input).await?;
        let payload = self.parser.parse(stage, turn.output())?;

        let updated = self
            .persist(&payload, || self.repository.update_payload(artifact_id, &payload))
            .await?;

        self.record(&story, &turn, &updated.payload).await?;
        tracing::info!("Stage draft refined");

        Ok(StageOutcome {
            story_id,
            stage,
            artifact_id,
            state: StageState::Draft,
            payload: Some(updated.payload),
        })
    }

    /// Lock `stage`. Saving a locked stage again is a no-op.
    ///
    /// # Errors
    ///
    /// `NotFound` if `artifact_id` is not the story's artifact for `stage`.
    #[tracing::instrument(
        skip(self),
        fields(stage = %stage, story_id = %story_id, artifact_id = %artifact_id)
    )]
    pub async fn save(
        &self,
        stage: Stage,
        story_id: StoryId,
        user_id: UserId,
        artifact_id: ArtifactId,
    ) -> FabulaResult<StageOutcome> {
        let _guard = self.locks.acquire(story_id).await;

        let story = self.find_linked(stage, story_id, user_id, artifact_id).await?;
        if story.state(stage) == StageState::Locked {
            tracing::debug!("Stage already locked");
        } else {
            self.repository.set_lock_flag(story_id, stage).await?;
            tracing::info!("Stage locked");
        }

        Ok(StageOutcome {
            story_id,
            stage,
            artifact_id,
            state: StageState::Locked,
            payload: None,
        })
    }

    /// State of every narrative stage of a story.
    #[tracing::instrument(skip(self), fields(story_id = %story_id))]
    pub async fn status(&self, story_id: StoryId, user_id: UserId) -> FabulaResult<StoryStatus> {
        let story = self.repository.find_story(story_id, user_id).await?;
        Ok(StoryStatus {
            story_id,
            stages: Stage::ORDER
                .iter()
                .map(|stage| (*stage, story.state(*stage)))
                .collect(),
            visual: story.visual,
        })
    }

    async fn find_linked(
        &self,
        stage: Stage,
        story_id: StoryId,
        user_id: UserId,
        artifact_id: ArtifactId,
    ) -> FabulaResult<Story> {
        let story = self.repository.find_story(story_id, user_id).await?;
        if !story.links(stage, artifact_id) {
            return Err(StoryError::new(StoryErrorKind::NotFound(format!(
                "{} {} is not linked to story {}",
                stage, artifact_id, story_id
            )))
            .into());
        }
        Ok(story)
    }

    async fn load_upstream(&self, story: &Story, stage: Stage) -> FabulaResult<Upstream> {
        let mut upstream = Upstream::new();
        for required in stage.prerequisites() {
            if let Some(id) = story.stage_ref(*required) {
                let artifact = self.repository.find_artifact(id).await?;
                upstream.insert(*required, artifact.payload);
            }
        }
        Ok(upstream)
    }

    /// Run a store write, retrying storage failures.
    ///
    /// When retries run out the error carries `payload` so the generation is
    /// not lost.
    async fn persist<T, F, Fut>(&self, payload: &StagePayload, mut write: F) -> FabulaResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = FabulaResult<T>>,
    {
        let strategy = ExponentialBackoff::from_millis(self.config.persist_backoff_ms.max(1))
            .factor(2)
            .max_delay(Duration::from_secs(2))
            .map(jitter)
            .take(self.config.persist_retries);

        let result = Retry::spawn(strategy, || {
            let attempt = write();
            async move {
                match attempt.await {
                    Ok(value) => Ok(value),
                    Err(e) if is_storage_failure(&e) => {
                        tracing::warn!(error = %e, "Store write failed, will retry");
                        Err(RetryError::Transient {
                            err: e,
                            retry_after: None,
                        })
                    }
                    Err(e) => Err(RetryError::Permanent(e)),
                }
            }
        })
        .await;

        match result {
            Ok(value) => Ok(value),
            Err(e) if is_storage_failure(&e) => {
                tracing::error!(error = %e, "Store write failed after retries");
                Err(StoryError::new(StoryErrorKind::PersistenceError {
                    message: e.message(),
                    recovered: payload.to_details().ok(),
                })
                .into())
            }
            Err(e) => Err(e),
        }
    }

    async fn discard_unlinked(&self, artifact_id: ArtifactId) {
        if let Err(e) = self.repository.remove_unlinked_artifact(artifact_id).await {
            tracing::warn!(artifact_id = %artifact_id, error = %e, "Could not remove unlinked artifact");
        }
    }

    /// Append the exchange to the story's history, then refresh the summary.
    async fn record(
        &self,
        story: &Story,
        turn: &SessionTurn,
        payload: &StagePayload,
    ) -> FabulaResult<()> {
        self.persist(payload, || {
            self.repository
                .append_exchange(story.id, turn.user(), turn.assistant())
        })
        .await?;
        self.session.summarize(story, turn).await;
        Ok(())
    }
}

fn require_prompt(prompt: &str) -> FabulaResult<()> {
    if prompt.trim().is_empty() {
        return Err(
            StoryError::new(StoryErrorKind::InvalidInput("prompt is empty".to_string())).into(),
        );
    }
    Ok(())
}

fn is_storage_failure(error: &FabulaError) -> bool {
    matches!(error.kind(), FabulaErrorKind::Storage(_))
}
