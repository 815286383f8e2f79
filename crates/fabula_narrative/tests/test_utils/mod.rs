//! Shared test helpers for narrative tests.

#![allow(dead_code)]

mod flaky_repository;
mod mock_driver;
mod mock_media;

pub use flaky_repository::FlakyRepository;
pub use mock_driver::{MockDriver, MockResponse};
pub use mock_media::MockMedia;

use fabula_core::{Stage, UserId};
use fabula_interface::StoryRepository;
use fabula_narrative::{
    ConversationSession, GateConfig, PrerequisitePolicy, PromptBuilder, SessionConfig, StageGate,
};
use fabula_storage::InMemoryStoryRepository;
use std::sync::Arc;

pub const THEME_JSON: &str = r#"{
  "core_theme": ["memory", "grief"],
  "genres": ["gothic", "mystery"],
  "premise": "A lighthouse keeper hears the drowned speak through the fog horn.",
  "conflict": {"external": "The harbour council wants the light shut down", "internal": "Letting go of a lost sister"},
  "emotional_arc": "Denial to acceptance",
  "narrative_hooks": ["Who answers the horn?"],
  "intended_audience": "Adults",
  "episode_themes": [{"episode": 1, "theme": "Arrival", "description": "The keeper takes the post"}]
}"#;

pub const WORLD_JSON: &str = r#"{
  "world_setting": {
    "genre": ["gothic"],
    "geography": {"landforms": "Basalt cliffs", "climate": "Cold and wet", "seasons": ["storm", "still"]},
    "year": "1893",
    "key_locations": [{"name": "Gannet Light", "description": "The lighthouse", "location": "North cape", "significance": "Where the voices are heard"}],
    "history": "Three keepers vanished here.",
    "description": "A fishing town at the edge of the map."
  }
}"#;

pub const CHARACTER_JSON: &str = r#"{
  "characters": [
    {"name": "Ada Marsh", "attributes": {"age": "34", "gender": "female", "appearance": "Salt-grey coat"}, "abilities": ["navigation"], "traits": ["stubborn"], "backstory": "Lost her sister to the sea.", "motivations": "Hear her sister once more."},
    {"name": "Tobias Wren", "attributes": {"age": "61", "gender": "male", "appearance": "Council chain"}, "abilities": ["persuasion"], "traits": ["cautious"], "backstory": "Harbourmaster for thirty years.", "motivations": "Keep the town quiet."}
  ]
}"#;

pub const PLOT_JSON: &str = r#"{
  "episode_1": {
    "title": "The Horn",
    "scene_1": {
      "act_1": {
        "description": "Ada climbs the stairs at dusk and finds the horn already sounding.",
        "dialogue": [
          {"character": "Ada Marsh", "speaking_to": "THINKING", "before_action": "Stops on the landing", "line": "(whispering) Nobody else has a key.", "after_action": "Keeps climbing"},
          {"character": "Tobias Wren", "speaking_to": ["Ada Marsh"], "before_action": "Calls from below", "line": "Leave it be!", "after_action": "Turns away"}
        ],
        "emotional_cues": {"Ada Marsh": "dread"}
      }
    }
  }
}"#;

/// Canned model output for `stage`.
pub fn canned(stage: Stage) -> &'static str {
    match stage {
        Stage::Theme => THEME_JSON,
        Stage::World => WORLD_JSON,
        Stage::Character => CHARACTER_JSON,
        Stage::Plot => PLOT_JSON,
    }
}

/// Everything a gate test needs.
pub struct Harness {
    pub repository: Arc<InMemoryStoryRepository>,
    pub driver: Arc<MockDriver>,
    pub gate: StageGate,
    pub user: UserId,
}

impl Harness {
    pub fn new(driver: MockDriver) -> Self {
        Self::with_policy(driver, PrerequisitePolicy::Present)
    }

    pub fn with_policy(driver: MockDriver, policy: PrerequisitePolicy) -> Self {
        Self::build(driver, policy, SessionConfig::default().with_summarize(false))
    }

    pub fn build(driver: MockDriver, policy: PrerequisitePolicy, session: SessionConfig) -> Self {
        let repository = Arc::new(InMemoryStoryRepository::new());
        let driver = Arc::new(driver);
        let prompts = PromptBuilder::new().expect("built-in templates parse");

        let store: Arc<dyn StoryRepository> = repository.clone();
        let conversation = ConversationSession::new(driver.clone(), store.clone(), prompts.clone())
            .with_config(session);
        let gate = StageGate::new(store, conversation, prompts)
            .with_config(GateConfig::default().with_policy(policy));

        Self {
            repository,
            driver,
            gate,
            user: UserId::new(),
        }
    }
}
