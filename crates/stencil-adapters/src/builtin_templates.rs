//! Built-in fallback templates.
//!
//! One template per entry of the resolver's fallback table, so that a fresh
//! install can generate prompts before any template directory exists. The
//! texts only use `{input_text}` and `{layer}`; `layer` is always supplied
//! by the generation pipeline and `input_text` is the user's free text.
//!
//! Load them through [`InMemoryTemplateRepository::with_builtin`] or seed a
//! directory by saving [`all_templates`] into a
//! [`FileTemplateRepository`](crate::FileTemplateRepository).
//!
//! [`InMemoryTemplateRepository::with_builtin`]: crate::InMemoryTemplateRepository::with_builtin

use stencil_core::{
    application::services::DEFAULT_FALLBACKS,
    domain::{DomainError, PromptTemplate, ResourceMetadata, TemplateContent, TemplatePath},
};
use tracing::{debug, instrument};

const AUTHOR: &str = "stencil";

/// Every built-in template, in fallback-table order.
#[instrument]
pub fn all_templates() -> Result<Vec<PromptTemplate>, DomainError> {
    let templates = DEFAULT_FALLBACKS
        .iter()
        .map(|(directive, layer, filename)| build(directive, layer, filename))
        .collect::<Result<Vec<_>, _>>()?;

    debug!(count = templates.len(), "built-in templates prepared");
    Ok(templates)
}

/// Built-in template for one directive/layer pair, if there is one.
pub fn builtin_for(directive: &str, layer: &str) -> Option<Result<PromptTemplate, DomainError>> {
    DEFAULT_FALLBACKS
        .iter()
        .find(|(d, l, _)| *d == directive && *l == layer)
        .map(|(d, l, f)| build(d, l, f))
}

fn build(directive: &str, layer: &str, filename: &str) -> Result<PromptTemplate, DomainError> {
    let text = body(directive).ok_or_else(|| {
        DomainError::InvalidConfiguration(format!("no built-in text for directive '{directive}'"))
    })?;

    let path = TemplatePath::create(directive, layer, filename)?;
    let content = TemplateContent::create(text)?.with_language("en");
    let metadata = ResourceMetadata::new()
        .author(AUTHOR)
        .description(format!("Built-in {directive} prompt for the {layer} layer"));

    Ok(PromptTemplate::create(path, content, metadata))
}

fn body(directive: &str) -> Option<&'static str> {
    match directive {
        "to" => Some(TO),
        "summary" => Some(SUMMARY),
        "defect" => Some(DEFECT),
        _ => None,
    }
}

const TO: &str = "\
# Turn this into a {layer}

You are helping plan work at the {layer} level.

## Input

{input_text}

## Instructions

- Restate the goal in one sentence.
- List the concrete outcomes that make this {layer} done.
- Call out open questions and assumptions separately.
- Keep the scope to a single {layer}; suggest a split if it is larger.
";

const SUMMARY: &str = "\
# Summarize this {layer}

## Input

{input_text}

## Instructions

- Write a short summary of the current state of the {layer}.
- List what is done, what is in progress and what is blocked.
- End with the next action and who owns it, if known.
";

const DEFECT: &str = "\
# Report a defect against this {layer}

## Input

{input_text}

## Instructions

- Describe the observed behaviour and the expected behaviour.
- Give the smallest set of steps that reproduces it.
- Note the impact on the {layer} and any known workaround.
- Suggest a severity with a one-line reason.
";
