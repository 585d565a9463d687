//! Output formatting for the CLI.

use crate::cli::CliFormat;
use crate::error::Result;
use calabi_domain::{EntitySpan, Suggestion, SuggestionSource};
use calabi_nlp::HealthReport;
use colored::*;
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};

/// Output formatter.
pub struct Formatter {
    format: CliFormat,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: CliFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    /// Format extracted entities.
    pub fn format_entities(&self, entities: &[EntitySpan]) -> Result<String> {
        if self.format == CliFormat::Json {
            return Ok(serde_json::to_string_pretty(&serde_json::json!({ "entities": entities }))?);
        }

        if entities.is_empty() {
            return Ok(self.colorize("No entities found.", "yellow"));
        }

        let mut builder = Builder::default();
        builder.push_record(["Text", "Type", "Start", "End", "Confidence"]);
        for entity in entities {
            builder.push_record([
                entity.text.clone(),
                entity.entity_type.to_string(),
                entity.start_offset.to_string(),
                entity.end_offset.to_string(),
                format!("{:.2}", entity.confidence),
            ]);
        }

        Ok(self.render(builder))
    }

    /// Format ranked suggestions.
    pub fn format_suggestions(&self, suggestions: &[Suggestion]) -> Result<String> {
        if self.format == CliFormat::Json {
            return Ok(serde_json::to_string_pretty(
                &serde_json::json!({ "suggestions": suggestions }),
            )?);
        }

        if suggestions.is_empty() {
            return Ok(self.colorize("No suggestions.", "yellow"));
        }

        let mut builder = Builder::default();
        builder.push_record(["Rank", "Term", "Relevance", "Source"]);
        for s in suggestions {
            builder.push_record([
                s.rank.to_string(),
                s.term.clone(),
                format!("{:.3}", s.relevance),
                source_name(s.source).to_string(),
            ]);
        }

        Ok(self.render(builder))
    }

    /// Format a health report.
    pub fn format_health(&self, report: &HealthReport) -> Result<String> {
        if self.format == CliFormat::Json {
            return Ok(serde_json::to_string_pretty(report)?);
        }

        let summary = format!(
            "model {} with {} vocabulary terms",
            report.model, report.vocabulary_terms
        );
        if report.ready {
            Ok(self.success(&format!("Ready: {}", summary)))
        } else {
            let detail = report.detail.as_deref().unwrap_or("unknown failure");
            Ok(self.error(&format!("Not ready: {} ({})", summary, detail)))
        }
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an error message.
    pub fn error(&self, message: &str) -> String {
        self.colorize(&format!("✗ {}", message), "red")
    }

    fn render(&self, builder: Builder) -> String {
        let mut table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()));
        table.to_string()
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "red" => text.red().to_string(),
            "green" => text.green().to_string(),
            "yellow" => text.yellow().to_string(),
            _ => text.to_string(),
        }
    }
}

fn source_name(source: SuggestionSource) -> &'static str {
    match source {
        SuggestionSource::Vocabulary => "vocabulary",
        SuggestionSource::Related => "related",
        SuggestionSource::History => "history",
        SuggestionSource::Tag => "tag",
    }
}
