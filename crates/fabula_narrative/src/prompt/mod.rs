//! Prompt construction for stage generation.
//!
//! Prompts are [`Template`]s parsed once at construction: literal text
//! interleaved with named [`Slot`]s. Stage templates are wrapped in a
//! [`StageTemplate`], which checks that the template asks for exactly the
//! upstream context its stage depends on.

mod builder;
mod template;
mod templates;

pub use builder::{PromptBuilder, StageTemplate, Upstream};
pub use template::{Slot, Template, escape_template_syntax};
