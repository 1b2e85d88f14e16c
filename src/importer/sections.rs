//! Section Splitter
//!
//! Partitions the remaining text into combat / skills / languages / spells
//! spans on header-pattern boundaries and dispatches each body to its
//! sub-parser, removing the consumed header+body span as it goes. Input with
//! no explicit combat header gets a synthetic one planted before a guessed
//! combat start, so the uniform split still yields a combat span.

use super::patterns::Field;
use super::skills::ListTarget;
use super::{combat, skills, spells, ParserContext};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SectionKind {
    Combat,
    Skills,
    Languages,
    Spells,
}

pub(crate) fn split_sections(ctx: &mut ParserContext<'_>) {
    ctx.buffer.prepend_newline();
    plant_combat_header(ctx);

    while let Some((kind, start, body_start, body_end)) = next_section(ctx) {
        let body = ctx.buffer.as_str()[body_start..body_end].to_string();
        ctx.buffer.remove_span(start, body_end);
        match kind {
            SectionKind::Combat => combat::parse_combat(ctx, &body),
            SectionKind::Skills => skills::parse_skill_list(ctx, &body, ListTarget::Skills),
            SectionKind::Languages => skills::parse_skill_list(ctx, &body, ListTarget::Languages),
            SectionKind::Spells => spells::parse_spells(ctx, &body),
        }
    }
}

/// When no combat header token is present but a line looks like a weapon
/// entry, splice the canonical combat heading in right before it.
fn plant_combat_header(ctx: &mut ParserContext<'_>) {
    let has_combat = ctx
        .patterns
        .template(Field::SectionCombat)
        .map(|re| re.is_match(ctx.buffer.as_str()))
        .unwrap_or(false);
    if has_combat {
        return;
    }
    let Some(template) = ctx.patterns.template(Field::GuessCombat) else {
        return;
    };
    if let Some(m) = template.find(ctx.buffer.as_str()) {
        let heading = format!("\n{}:", ctx.patterns.keys.combat_heading);
        let offset = m.start();
        ctx.buffer.insert(offset, &heading);
    }
}

/// First section header in the buffer plus its body extent (up to the next
/// header or end of text).
fn next_section(ctx: &ParserContext<'_>) -> Option<(SectionKind, usize, usize, usize)> {
    let template = ctx.patterns.template(Field::SectionSplit)?;
    let text = ctx.buffer.as_str();
    let caps = template.captures(text)?;
    let whole = caps.get(0)?;

    let kind = if caps.name("combat").is_some() {
        SectionKind::Combat
    } else if caps.name("skills").is_some() {
        SectionKind::Skills
    } else if caps.name("languages").is_some() {
        SectionKind::Languages
    } else {
        SectionKind::Spells
    };

    let body_start = whole.end();
    let body_end = template
        .find_at(text, body_start)
        .map(|m| m.start())
        .unwrap_or(text.len());

    Some((kind, whole.start(), body_start, body_end))
}
