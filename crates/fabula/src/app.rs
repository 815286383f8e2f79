//! Application wiring.

use crate::config::{FabulaConfig, StorageBackend};
use fabula_error::FabulaResult;
use fabula_interface::{FabulaDriver, MediaGenerator, StoryRepository};
use fabula_models::{GroqDriver, RetryPolicy};
use fabula_narrative::{
    ConversationSession, PromptBuilder, StageGate, StoryCatalog, StoryLocks, VisualService,
};
use fabula_storage::{FileSystemStoryRepository, InMemoryStoryRepository};
use std::sync::Arc;
use tracing::{info, instrument};

/// The assembled story engine.
///
/// Every component shares one repository, one prompt builder, and one lock
/// registry.
#[derive(Clone)]
pub struct Fabula {
    gate: StageGate,
    visuals: VisualService,
    catalog: StoryCatalog,
}

impl Fabula {
    /// Start assembling an engine over `repository`, generating with `driver`.
    pub fn builder(
        repository: Arc<dyn StoryRepository>,
        driver: Arc<dyn FabulaDriver>,
    ) -> FabulaBuilder {
        FabulaBuilder {
            repository,
            driver,
            summarizer: None,
            media: None,
            config: FabulaConfig::default(),
        }
    }

    /// Engine backed by the configured store and the Groq driver.
    ///
    /// # Errors
    ///
    /// Fails if the store cannot be opened or the API key is missing.
    #[instrument(skip(config))]
    pub fn from_config(config: &FabulaConfig) -> FabulaResult<Self> {
        let repository: Arc<dyn StoryRepository> = match config.storage().backend() {
            StorageBackend::Filesystem => {
                let path = config.storage().resolved_path();
                info!(path = %path.display(), "Using filesystem store");
                Arc::new(FileSystemStoryRepository::new(path)?)
            }
            StorageBackend::Memory => {
                info!("Using in-memory store");
                Arc::new(InMemoryStoryRepository::new())
            }
        };

        let model = config.model();
        let retry = RetryPolicy::new(*model.max_retries(), 500, 8);
        let driver = GroqDriver::new(model.model().as_str())?
            .with_url(model.base_url().as_str())
            .with_retry(retry);

        let mut builder = Self::builder(repository, Arc::new(driver)).config(config.clone());

        if *config.session().summarize() {
            let summary_model = model.summarizer_model().as_ref().unwrap_or(model.model());
            let summarizer = GroqDriver::summarizer(summary_model.as_str())?
                .with_url(model.base_url().as_str())
                .with_retry(retry);
            builder = builder.summarizer(Arc::new(summarizer));
        }

        builder.build()
    }

    /// Stage lifecycle operations.
    pub fn gate(&self) -> &StageGate {
        &self.gate
    }

    /// Visual collection operations.
    pub fn visuals(&self) -> &VisualService {
        &self.visuals
    }

    /// Read-only listings.
    pub fn catalog(&self) -> &StoryCatalog {
        &self.catalog
    }
}

/// Assembles a [`Fabula`].
pub struct FabulaBuilder {
    repository: Arc<dyn StoryRepository>,
    driver: Arc<dyn FabulaDriver>,
    summarizer: Option<Arc<dyn FabulaDriver>>,
    media: Option<Arc<dyn MediaGenerator>>,
    config: FabulaConfig,
}

impl FabulaBuilder {
    /// Use a separate driver for conversation summaries.
    pub fn summarizer(mut self, summarizer: Arc<dyn FabulaDriver>) -> Self {
        self.summarizer = Some(summarizer);
        self
    }

    /// Enable image and video generation.
    pub fn media(mut self, media: Arc<dyn MediaGenerator>) -> Self {
        self.media = Some(media);
        self
    }

    /// Session and stage settings.
    pub fn config(mut self, config: FabulaConfig) -> Self {
        self.config = config;
        self
    }

    /// Wire the components together.
    ///
    /// # Errors
    ///
    /// Fails if a built-in prompt template does not parse.
    pub fn build(self) -> FabulaResult<Fabula> {
        let prompts = PromptBuilder::new()?;
        let locks = StoryLocks::new();

        let mut session =
            ConversationSession::new(self.driver, self.repository.clone(), prompts.clone())
                .with_config(self.config.session().clone());
        if let Some(summarizer) = self.summarizer {
            session = session.with_summarizer(summarizer);
        }

        let gate = StageGate::new(self.repository.clone(), session, prompts.clone())
            .with_config(self.config.stages().clone())
            .with_locks(locks.clone());

        let mut visuals = VisualService::new(self.repository.clone(), prompts)
            .with_locks(locks)
            .with_policy(*self.config.stages().policy());
        if let Some(media) = self.media {
            visuals = visuals.with_media(media);
        }

        Ok(Fabula {
            gate,
            visuals,
            catalog: StoryCatalog::new(self.repository),
        })
    }
}
