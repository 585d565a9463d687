//! BIO span decoding
//!
//! `Begin` opens a span, `Inside` of the same type extends it, `Outside`
//! closes it. An `Inside` with no open span, or of a different type, starts
//! a new span instead of failing.

use crate::config::SpanAggregation;
use calabi_domain::{clamp01, EntitySpan, EntityType, Label, LabelDistribution, Token};

struct OpenSpan {
    entity_type: EntityType,
    first: usize,
    last: usize,
    scores: Vec<f32>,
}

/// Decode per-token labels into entity spans
///
/// `labels` must hold one distribution per token. Spans whose aggregated
/// confidence is below `threshold` are dropped.
pub fn decode_spans(
    tokens: &[Token],
    labels: &[LabelDistribution],
    aggregation: SpanAggregation,
    threshold: f32,
) -> Vec<EntitySpan> {
    let mut spans = Vec::new();
    let mut open: Option<OpenSpan> = None;

    for (idx, dist) in labels.iter().enumerate().take(tokens.len()) {
        let (label, score) = dist.best();
        match label {
            Label::Outside => {
                close(open.take(), tokens, aggregation, threshold, &mut spans);
            }
            Label::Inside(t) if open.as_ref().is_some_and(|s| s.entity_type == t) => {
                if let Some(span) = open.as_mut() {
                    span.last = idx;
                    span.scores.push(score);
                }
            }
            Label::Begin(t) | Label::Inside(t) => {
                close(open.take(), tokens, aggregation, threshold, &mut spans);
                open = Some(OpenSpan {
                    entity_type: t,
                    first: idx,
                    last: idx,
                    scores: vec![score],
                });
            }
        }
    }
    close(open, tokens, aggregation, threshold, &mut spans);

    spans
}

fn close(
    open: Option<OpenSpan>,
    tokens: &[Token],
    aggregation: SpanAggregation,
    threshold: f32,
    spans: &mut Vec<EntitySpan>,
) {
    let Some(span) = open else {
        return;
    };

    let confidence = clamp01(aggregate(&span.scores, aggregation));
    if confidence < threshold {
        return;
    }

    let covered = &tokens[span.first..=span.last];
    spans.push(EntitySpan {
        text: covered
            .iter()
            .map(|t| t.text.as_str())
            .collect::<Vec<_>>()
            .join(" "),
        entity_type: span.entity_type,
        start_offset: covered[0].start_offset,
        end_offset: covered[covered.len() - 1].end_offset,
        confidence,
    });
}

fn aggregate(scores: &[f32], aggregation: SpanAggregation) -> f32 {
    if scores.is_empty() {
        return 0.0;
    }
    match aggregation {
        SpanAggregation::Mean => scores.iter().sum::<f32>() / scores.len() as f32,
        SpanAggregation::Min => scores.iter().copied().fold(f32::INFINITY, f32::min),
    }
}
