//! Command dispatch.

use super::commands::{
    ArtifactTarget, Cli, Commands, StageCommands, StatusCommands, StoryCommands, VisualCommands,
};
use fabula::{Envelope, Fabula, FabulaConfig};
use fabula_core::{ArtifactId, Stage, StoryId, UserId, VisualAsset, VisualItem};
use fabula_error::{FabulaResult, StoryError, StoryErrorKind};
use serde::Serialize;
use serde_json::Value;

/// Run a parsed command line, returning the response envelope.
pub async fn run(cli: Cli) -> Envelope<Value> {
    match dispatch(cli).await {
        Ok(envelope) => envelope,
        Err(e) => {
            tracing::error!(error = %e, "Command failed");
            Envelope::failure(&e)
        }
    }
}

async fn dispatch(cli: Cli) -> FabulaResult<Envelope<Value>> {
    let config = match &cli.config {
        Some(path) => FabulaConfig::from_file(path)?,
        None => FabulaConfig::load()?,
    };
    let user = user_id(cli.user.as_deref())?;
    let app = Fabula::from_config(&config)?;

    match cli.command {
        Commands::Story(command) => story(&app, user, command).await,
        Commands::Theme(command) => stage(&app, user, Stage::Theme, command).await,
        Commands::World(command) => stage(&app, user, Stage::World, command).await,
        Commands::Character(command) => stage(&app, user, Stage::Character, command).await,
        Commands::Plot(command) => stage(&app, user, Stage::Plot, command).await,
        Commands::Stage(StatusCommands::Status { story }) => {
            let status = app.gate().status(StoryId::parse(&story)?, user).await;
            respond(status, "Story status")
        }
        Commands::Visual(command) => visual(&app, user, command).await,
    }
}

async fn story(
    app: &Fabula,
    user: UserId,
    command: StoryCommands,
) -> FabulaResult<Envelope<Value>> {
    match command {
        StoryCommands::Create => {
            let story = app.gate().create_story(user).await?;
            Ok(Envelope::created(to_value(&story)?, "Story created"))
        }
        StoryCommands::List => respond(app.catalog().list_stories(user).await, "Stories"),
        StoryCommands::Show { story } => respond(
            app.catalog().get_story(StoryId::parse(&story)?, user).await,
            "Story",
        ),
    }
}

async fn stage(
    app: &Fabula,
    user: UserId,
    stage: Stage,
    command: StageCommands,
) -> FabulaResult<Envelope<Value>> {
    match command {
        StageCommands::Create { story, prompt } => {
            let outcome = app
                .gate()
                .create(stage, StoryId::parse(&story)?, user, &prompt)
                .await?;
            Ok(Envelope::created(
                to_value(&outcome)?,
                format!("{} created", stage),
            ))
        }
        StageCommands::Refine { target, prompt } => {
            let (story, artifact) = parse_target(&target)?;
            respond(
                app.gate()
                    .refine(stage, story, user, artifact, &prompt)
                    .await,
                format!("{} refined", stage),
            )
        }
        StageCommands::Save { target } => {
            let (story, artifact) = parse_target(&target)?;
            respond(
                app.gate().save(stage, story, user, artifact).await,
                format!("{} saved", stage),
            )
        }
        StageCommands::Show { story } => respond(
            app.catalog()
                .artifact_for_story(StoryId::parse(&story)?, user, stage)
                .await,
            format!("{} artifact", stage),
        ),
        StageCommands::List => respond(
            app.catalog().list_artifacts(user, stage).await,
            format!("{} artifacts", stage),
        ),
    }
}

async fn visual(
    app: &Fabula,
    user: UserId,
    command: VisualCommands,
) -> FabulaResult<Envelope<Value>> {
    match command {
        VisualCommands::AddImage {
            story,
            url,
            episode,
            scene,
            act,
        } => {
            let asset = VisualAsset::Image(VisualItem {
                image_url: url,
                episode,
                scene,
                act,
            });
            respond(
                app.visuals()
                    .attach(StoryId::parse(&story)?, user, asset)
                    .await,
                "Image added",
            )
        }
        VisualCommands::SetVideo { story, url } => respond(
            app.visuals()
                .attach(
                    StoryId::parse(&story)?,
                    user,
                    VisualAsset::Video { video_url: url },
                )
                .await,
            "Video set",
        ),
        VisualCommands::Show { story } => respond(
            app.visuals().find(StoryId::parse(&story)?, user).await,
            "Visuals",
        ),
    }
}

fn user_id(raw: Option<&str>) -> FabulaResult<UserId> {
    let raw = raw.ok_or_else(|| {
        StoryError::new(StoryErrorKind::InvalidInput(
            "a user id is required (--user <UUID>)".to_string(),
        ))
    })?;
    Ok(UserId::parse(raw)?)
}

fn parse_target(target: &ArtifactTarget) -> FabulaResult<(StoryId, ArtifactId)> {
    Ok((
        StoryId::parse(&target.story)?,
        ArtifactId::parse(&target.artifact)?,
    ))
}

fn respond<T: Serialize>(
    result: FabulaResult<T>,
    message: impl Into<String>,
) -> FabulaResult<Envelope<Value>> {
    let data = result?;
    Ok(Envelope::ok(to_value(&data)?, message))
}

fn to_value<T: Serialize>(data: &T) -> FabulaResult<Value> {
    serde_json::to_value(data).map_err(|e| {
        fabula_error::JsonError::new(format!("Failed to encode response: {}", e)).into()
    })
}
