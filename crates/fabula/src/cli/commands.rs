//! CLI command definitions.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Fabula - co-write a story stage by stage: theme, world, characters, plot, visuals
#[derive(Parser, Debug)]
#[command(name = "fabula")]
#[command(about = "Co-write a story stage by stage with a language model", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,

    /// Acting user id (UUID)
    #[arg(short, long, global = true)]
    pub user: Option<String>,

    /// Configuration file overriding the bundled defaults
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Story management
    #[command(subcommand)]
    Story(StoryCommands),

    /// Theme stage: premise, genres, conflict
    #[command(subcommand)]
    Theme(StageCommands),

    /// World stage: setting, geography, cultures
    #[command(subcommand)]
    World(StageCommands),

    /// Character stage: the cast
    #[command(subcommand)]
    Character(StageCommands),

    /// Plot stage: episodes, scenes, acts, dialogue
    #[command(subcommand)]
    Plot(StageCommands),

    /// Cross-stage queries
    #[command(subcommand)]
    Stage(StatusCommands),

    /// Scene images and story video
    #[command(subcommand)]
    Visual(VisualCommands),
}

/// Story subcommands
#[derive(Subcommand, Debug)]
pub enum StoryCommands {
    /// Create an empty story
    Create,

    /// List your stories
    List,

    /// Show a story with its conversation
    Show {
        /// Story id
        story: String,
    },
}

/// Subcommands shared by every narrative stage
#[derive(Subcommand, Debug)]
pub enum StageCommands {
    /// Generate the first draft
    Create {
        /// Story id
        #[arg(long)]
        story: String,

        /// What you want from this stage
        #[arg(long)]
        prompt: String,
    },

    /// Revise the current draft
    Refine {
        #[command(flatten)]
        target: ArtifactTarget,

        /// How to change the draft
        #[arg(long)]
        prompt: String,
    },

    /// Lock the draft; it can no longer be refined
    Save {
        #[command(flatten)]
        target: ArtifactTarget,
    },

    /// Show the story's artifact for this stage
    Show {
        /// Story id
        #[arg(long)]
        story: String,
    },

    /// List your artifacts for this stage across stories
    List,
}

/// Story plus artifact selector
#[derive(Args, Debug)]
pub struct ArtifactTarget {
    /// Story id
    #[arg(long)]
    pub story: String,

    /// Artifact id
    #[arg(long)]
    pub artifact: String,
}

/// Cross-stage subcommands
#[derive(Subcommand, Debug)]
pub enum StatusCommands {
    /// Lifecycle state of every stage
    Status {
        /// Story id
        #[arg(long)]
        story: String,
    },
}

/// Visual subcommands
#[derive(Subcommand, Debug)]
pub enum VisualCommands {
    /// Attach an image to an episode/scene/act
    AddImage {
        /// Story id
        #[arg(long)]
        story: String,

        /// Image URL
        #[arg(long)]
        url: String,

        /// Episode number
        #[arg(long)]
        episode: u32,

        /// Scene number
        #[arg(long)]
        scene: u32,

        /// Act number
        #[arg(long)]
        act: u32,
    },

    /// Set the story video
    SetVideo {
        /// Story id
        #[arg(long)]
        story: String,

        /// Video URL
        #[arg(long)]
        url: String,
    },

    /// Show the story's visual collection
    Show {
        /// Story id
        #[arg(long)]
        story: String,
    },
}
