//! Skills/Languages Sub-parser
//!
//! Iterates name/percentage pairs out of a span. Text after the first
//! sentence-ending line break is not list data and is ignored.

use tracing::{debug, warn};

use super::buffer::TextBuffer;
use super::extractor::{extract_field, Options};
use super::patterns::{Field, SENTENCE_BREAK};
use super::record::SkillEntry;
use super::{ParserContext, MAX_SECTION_ITERATIONS};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ListTarget {
    Skills,
    Languages,
}

pub(crate) fn parse_skill_list(ctx: &mut ParserContext<'_>, span: &str, target: ListTarget) {
    let mut span = TextBuffer::new(truncate_at_sentence_break(span));

    let mut iterations = 0;
    while let Some(m) =
        extract_field(ctx.patterns, &mut span, &mut ctx.record, Field::Skill, Options::consume())
    {
        let name = m.group("name").unwrap_or("").trim().to_string();
        let value = m
            .group("percentage")
            .and_then(|v| v.parse().ok())
            .unwrap_or(0);
        if !name.is_empty() {
            let entry = SkillEntry {
                name,
                value,
                push: true,
            };
            match target {
                ListTarget::Skills => ctx.record.skills.push(entry),
                ListTarget::Languages => ctx.record.languages.push(entry),
            }
        }

        iterations += 1;
        if iterations >= MAX_SECTION_ITERATIONS {
            warn!("skill list parser exhausted its iteration budget; keeping partial results");
            debug!(leftover = span.as_str(), "unconsumed skill text");
            return;
        }
    }
}

/// Keep only the text before the first sentence-ending line break.
pub(crate) fn truncate_at_sentence_break(span: &str) -> &str {
    match SENTENCE_BREAK.find(span) {
        Some(m) => &span[..m.start()],
        None => span,
    }
}
