//! Narrative stages and their lifecycle states.

use serde::{Deserialize, Serialize};

/// A narrative stage, in creation order.
///
/// Each stage requires every earlier stage to be present before it can be
/// created.
///
/// # Examples
///
/// ```
/// use fabula_core::Stage;
/// use std::str::FromStr;
///
/// assert_eq!(Stage::Plot.prerequisites(), &[Stage::Theme, Stage::World, Stage::Character]);
/// assert_eq!(Stage::from_str("world").unwrap(), Stage::World);
/// assert_eq!(Stage::Character.to_string(), "character");
/// ```
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
    strum::AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Stage {
    /// Story concept: themes, premise, conflict
    Theme,
    /// World setting
    World,
    /// Character roster
    Character,
    /// Episode/scene/act plot with dialogue
    Plot,
}

impl Stage {
    /// All stages in creation order.
    pub const ORDER: [Stage; 4] = [Stage::Theme, Stage::World, Stage::Character, Stage::Plot];

    /// Stages that must exist before this one can be created.
    pub fn prerequisites(self) -> &'static [Stage] {
        match self {
            Stage::Theme => &[],
            Stage::World => &[Stage::Theme],
            Stage::Character => &[Stage::Theme, Stage::World],
            Stage::Plot => &[Stage::Theme, Stage::World, Stage::Character],
        }
    }

    /// The stage immediately before this one.
    pub fn previous(self) -> Option<Stage> {
        self.prerequisites().last().copied()
    }

    /// Top-level field the model output must carry for this stage, if any.
    pub fn wrapper_field(self) -> Option<&'static str> {
        match self {
            Stage::World => Some("world_setting"),
            Stage::Character => Some("characters"),
            Stage::Theme | Stage::Plot => None,
        }
    }
}

/// Lifecycle state of one stage on a story.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum StageState {
    /// Not yet created
    Absent,
    /// Created and still refinable
    Draft,
    /// Saved; frozen
    Locked,
}
