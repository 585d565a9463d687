//! Command implementations.
//!
//! Each command runs the pipeline in-process and returns the rendered
//! output, leaving printing to the caller.

use crate::cli::{NerArgs, SuggestArgs};
use crate::error::{CliError, Result};
use crate::output::Formatter;
use calabi_domain::EntityType;
use calabi_model::AnyModel;
use calabi_nlp::{Pipeline, SuggestOptions};

/// Run entity extraction
pub async fn execute_ner(
    args: NerArgs,
    pipeline: &Pipeline<AnyModel>,
    formatter: &Formatter,
) -> Result<String> {
    let text = args.text.join(" ");
    let entities = pipeline.extract_entities(&text).await?;
    formatter.format_entities(&entities)
}

/// Run term suggestion
pub async fn execute_suggest(
    args: SuggestArgs,
    pipeline: &Pipeline<AnyModel>,
    formatter: &Formatter,
) -> Result<String> {
    let entity_type = args
        .entity_type
        .as_deref()
        .map(|name| {
            EntityType::parse(name)
                .ok_or_else(|| CliError::InvalidInput(format!("Unknown entity type: {}", name)))
        })
        .transpose()?;

    let options = SuggestOptions {
        entity_type,
        max_results: args.max,
        history: args.history,
        popular_tags: args.tags,
    };

    let text = args.text.join(" ");
    let suggestions = pipeline.suggest_terms(&text, options).await?;
    formatter.format_suggestions(&suggestions)
}

/// Run the readiness check; the flag is false when the model is not ready
pub async fn execute_health(
    pipeline: &Pipeline<AnyModel>,
    formatter: &Formatter,
) -> Result<(bool, String)> {
    let report = pipeline.health().await;
    Ok((report.ready, formatter.format_health(&report)?))
}
