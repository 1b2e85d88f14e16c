//! Header Parser
//!
//! Everything before the earliest recognized characteristic is the header;
//! name, age and occupation come out of it. When no characteristic matches
//! anywhere the entity just gets the locale default name.

use super::buffer::TextBuffer;
use super::extractor::{extract_field, Options};
use super::patterns::{Field, CHARACTERISTIC_SCAN};
use super::ParserContext;
use crate::catalog::i18n;

pub(crate) fn parse_header(ctx: &mut ParserContext<'_>) {
    let boundary = earliest_characteristic(ctx);

    let Some(boundary) = boundary else {
        ctx.record.name = Some(ctx.localizer.localize(i18n::UNNAMED_CHARACTER));
        return;
    };

    let header_text = ctx.buffer.as_str()[..boundary].to_string();
    ctx.buffer.remove_span(0, boundary);
    let mut header = TextBuffer::new(header_text);

    extract_field(ctx.patterns, &mut header, &mut ctx.record, Field::Name, Options::text());
    if ctx.record.name.is_none() {
        ctx.record.name = Some(ctx.localizer.localize(i18n::UNNAMED_CHARACTER));
    }

    extract_field(ctx.patterns, &mut header, &mut ctx.record, Field::Age, Options::text());

    let explicit = extract_field(
        ctx.patterns,
        &mut header,
        &mut ctx.record,
        Field::Occupation,
        Options::text(),
    );
    if explicit.is_none() {
        // whatever is left of the header is the occupation, up to the first
        // sentence-ending period
        let leftover = header
            .as_str()
            .trim_matches(|c: char| c.is_whitespace() || c == ',' || c == ';');
        let occupation = leftover.split('.').next().unwrap_or("").trim();
        if !occupation.is_empty() {
            ctx.record.set_text("occupation", occupation);
        }
    }

    split_age_from_occupation(ctx);
}

/// Minimum match offset among the core characteristic fields, scanned in a
/// fixed order without mutating the buffer.
fn earliest_characteristic(ctx: &mut ParserContext<'_>) -> Option<usize> {
    let mut min_offset: Option<usize> = None;
    for field in CHARACTERISTIC_SCAN {
        if let Some(m) = ctx.extract(field, Options::probe()) {
            min_offset = Some(min_offset.map_or(m.offset, |o| o.min(m.offset)));
        }
    }
    min_offset
}

/// "34, Mechanic" landed whole in the occupation slot when no age pattern
/// matched; split the leading integer back out.
fn split_age_from_occupation(ctx: &mut ParserContext<'_>) {
    if ctx.record.age.is_some() {
        return;
    }
    let Some(occupation) = ctx.record.occupation.clone() else {
        return;
    };
    let Some(template) = ctx.patterns.template(Field::AgeOccupation) else {
        return;
    };
    if let Some(caps) = template.captures(&occupation) {
        if let (Some(age), Some(rest)) = (caps.name("age"), caps.name("occupation")) {
            ctx.record.age = Some(age.as_str().to_string());
            ctx.record.occupation = Some(rest.as_str().trim().to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::importer::patterns::Language;
    use crate::importer::test_support::context;

    #[test]
    fn test_header_before_first_characteristic() {
        let mut ctx = context(Language::En, "Harvey Walters, Age 42, Professor. STR 45 CON 60");
        parse_header(&mut ctx);

        assert_eq!(ctx.record.name.as_deref(), Some("Harvey Walters"));
        assert_eq!(ctx.record.age.as_deref(), Some("42"));
        assert_eq!(ctx.record.occupation.as_deref(), Some("Professor"));
        assert!(ctx.buffer.as_str().contains("STR 45"));
        assert!(!ctx.buffer.as_str().contains("Harvey"));
    }

    #[test]
    fn test_bare_age_and_occupation_split() {
        let mut ctx = context(Language::En, "John Doe, 34, Mechanic. STR 12");
        parse_header(&mut ctx);

        assert_eq!(ctx.record.name.as_deref(), Some("John Doe"));
        assert_eq!(ctx.record.age.as_deref(), Some("34"));
        assert_eq!(ctx.record.occupation.as_deref(), Some("Mechanic"));
    }

    #[test]
    fn test_no_characteristics_means_default_name_only() {
        let mut ctx = context(Language::En, "Just a fragment of prose.");
        parse_header(&mut ctx);

        assert_eq!(ctx.record.name.as_deref(), Some("Unnamed character"));
        assert_eq!(ctx.record.age, None);
        assert_eq!(ctx.record.occupation, None);
        assert_eq!(ctx.buffer.as_str(), "Just a fragment of prose.");
    }

    #[test]
    fn test_empty_header_falls_back_to_default_name() {
        let mut ctx = context(Language::En, "STR 45 CON 60 SIZ 50");
        parse_header(&mut ctx);

        assert_eq!(ctx.record.name.as_deref(), Some("Unnamed character"));
        assert_eq!(ctx.record.occupation, None);
    }

    #[test]
    fn test_occupation_truncates_at_sentence_period() {
        let mut ctx = context(
            Language::En,
            "Mad Pierre, 51, Trapper. A wiry man of few words. STR 65",
        );
        parse_header(&mut ctx);

        assert_eq!(ctx.record.occupation.as_deref(), Some("Trapper"));
    }

    #[test]
    fn test_localized_header_keywords() {
        let mut ctx = context(Language::Fr, "Nom: Amélie Dubois, âge: 29, profession: archiviste. FOR 50");
        parse_header(&mut ctx);

        assert_eq!(ctx.record.name.as_deref(), Some("Amélie Dubois"));
        assert_eq!(ctx.record.age.as_deref(), Some("29"));
        assert_eq!(ctx.record.occupation.as_deref(), Some("archiviste"));
    }
}
