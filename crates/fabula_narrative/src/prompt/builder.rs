//! Stage prompt assembly.

use super::template::{Slot, Template, escape_template_syntax};
use super::templates;
use fabula_core::{Stage, StagePayload};
use fabula_error::{FabulaResult, StoryError, StoryErrorKind};
use std::collections::{BTreeMap, BTreeSet};

/// Upstream payloads available to a prompt, keyed by stage.
pub type Upstream = BTreeMap<Stage, StagePayload>;

/// Slot carrying an upstream stage's payload. Plot is never upstream.
fn slot_for(stage: Stage) -> Option<Slot> {
    match stage {
        Stage::Theme => Some(Slot::Theme),
        Stage::World => Some(Slot::World),
        Stage::Character => Some(Slot::Characters),
        Stage::Plot => None,
    }
}

/// A stage's generation template.
///
/// Construction fails unless the template references exactly the slots for
/// the stage's prerequisites: nothing for theme, `THEME` for world,
/// `THEME` and `WORLD` for character, and `THEME`, `WORLD` and `CHARACTERS`
/// for plot.
///
/// ```
/// use fabula_core::Stage;
/// use fabula_narrative::StageTemplate;
///
/// assert!(StageTemplate::new(Stage::World, "Build a world for {THEME}").is_ok());
/// assert!(StageTemplate::new(Stage::World, "Build a world").is_err());
/// assert!(StageTemplate::new(Stage::Theme, "{WORLD}").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageTemplate {
    stage: Stage,
    template: Template,
}

impl StageTemplate {
    /// Parse and validate a template for `stage`.
    pub fn new(stage: Stage, text: &str) -> FabulaResult<Self> {
        let template = Template::parse(text)?;
        let required: BTreeSet<Slot> = stage
            .prerequisites()
            .iter()
            .copied()
            .filter_map(slot_for)
            .collect();
        let declared = template.slots();

        if declared != required {
            let names = |slots: &BTreeSet<Slot>| {
                slots.iter().map(|s| s.to_string()).collect::<Vec<_>>().join(", ")
            };
            return Err(StoryError::new(StoryErrorKind::Template(format!(
                "{} template must use slots [{}], found [{}]",
                stage,
                names(&required),
                names(&declared)
            )))
            .into());
        }

        Ok(Self { stage, template })
    }

    /// Stage this template generates.
    pub fn stage(&self) -> Stage {
        self.stage
    }
}

/// Builds every prompt the engine sends.
///
/// Pure: the builder never touches storage or the model, and never mutates
/// its inputs.
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    stages: BTreeMap<Stage, StageTemplate>,
    refine: Template,
    visual: Template,
    summary: Template,
}

impl PromptBuilder {
    /// Builder with the built-in templates.
    pub fn new() -> FabulaResult<Self> {
        let stages = [
            StageTemplate::new(Stage::Theme, templates::THEME)?,
            StageTemplate::new(Stage::World, templates::WORLD)?,
            StageTemplate::new(Stage::Character, templates::CHARACTER)?,
            StageTemplate::new(Stage::Plot, templates::PLOT)?,
        ]
        .into_iter()
        .map(|template| (template.stage(), template))
        .collect();

        Ok(Self {
            stages,
            refine: Template::parse(templates::REFINE)?,
            visual: Template::parse(templates::VISUAL)?,
            summary: Template::parse(templates::SUMMARY)?,
        })
    }

    /// Replace one stage's template.
    pub fn with_stage_template(mut self, template: StageTemplate) -> Self {
        self.stages.insert(template.stage(), template);
        self
    }

    /// System prompt for generating `stage` from its upstream payloads.
    ///
    /// # Errors
    ///
    /// `PrerequisiteMissing` if an upstream payload the template needs is
    /// not in `upstream`.
    pub fn stage_prompt(&self, stage: Stage, upstream: &Upstream) -> FabulaResult<String> {
        let template = self.stages.get(&stage).ok_or_else(|| {
            StoryError::new(StoryErrorKind::Template(format!("no template for {}", stage)))
        })?;

        let mut values = BTreeMap::new();
        for required in stage.prerequisites() {
            let Some(slot) = slot_for(*required) else {
                continue;
            };
            let payload = upstream_payload(upstream, stage.as_ref(), *required)?;
            values.insert(slot, payload.to_pretty_json()?);
        }

        template.template.render(&values)
    }

    /// User input asking the model to revise `current` per `instruction`.
    pub fn refine_prompt(&self, current: &StagePayload, instruction: &str) -> FabulaResult<String> {
        let values = BTreeMap::from([
            (Slot::Context, current.to_pretty_json()?),
            (Slot::Instruction, instruction.to_string()),
        ]);
        self.refine.render(&values)
    }

    /// Image prompt for one moment of the story.
    ///
    /// Needs the theme, world, and character payloads.
    pub fn visual_prompt(&self, upstream: &Upstream, moment: &str) -> FabulaResult<String> {
        let concept = upstream_payload(upstream, "visual", Stage::Theme)?;
        let world = upstream_payload(upstream, "visual", Stage::World)?;
        let characters = upstream_payload(upstream, "visual", Stage::Character)?;

        let values = BTreeMap::from([
            (Slot::Concept, concept.to_pretty_json()?),
            (Slot::World, world.to_pretty_json()?),
            (Slot::Characters, characters.to_pretty_json()?),
            (Slot::Visual, moment.to_string()),
        ]);
        self.visual.render(&values)
    }

    /// Prompt folding `new_lines` into the running summary.
    pub fn summary_prompt(&self, previous: Option<&str>, new_lines: &str) -> FabulaResult<String> {
        let values = BTreeMap::from([
            (Slot::Summary, previous.unwrap_or(templates::NO_SUMMARY).to_string()),
            (Slot::NewLines, new_lines.to_string()),
        ]);
        self.summary.render(&values)
    }

    /// System message for a conversation turn: the system prompt followed by
    /// the conversation summary block.
    pub fn chat_frame(&self, system_prompt: &str, summary: Option<&str>) -> FabulaResult<String> {
        let frame = Template::parse(&format!(
            "{}{}",
            escape_template_syntax(system_prompt),
            templates::FRAME_SUMMARY
        ))?;
        let values = BTreeMap::from([(
            Slot::Summary,
            summary.unwrap_or(templates::NO_SUMMARY).to_string(),
        )]);
        frame.render(&values)
    }
}

fn upstream_payload<'a>(
    upstream: &'a Upstream,
    for_stage: &str,
    required: Stage,
) -> FabulaResult<&'a StagePayload> {
    upstream.get(&required).ok_or_else(|| {
        StoryError::new(StoryErrorKind::PrerequisiteMissing {
            stage: for_stage.to_string(),
            missing: required.to_string(),
        })
        .into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_prerequisite_has_a_slot() {
        for stage in Stage::ORDER {
            for required in stage.prerequisites() {
                assert!(slot_for(*required).is_some(), "{} has no slot", required);
            }
        }
        assert_eq!(slot_for(Stage::Plot), None);
    }
}
