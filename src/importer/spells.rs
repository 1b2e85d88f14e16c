//! Spell Sub-parser
//!
//! A spell span is a comma-separated list where parenthetical qualifiers
//! like "(1 magic point)" must not be split apart.

use super::skills::truncate_at_sentence_break;
use super::ParserContext;

pub(crate) fn parse_spells(ctx: &mut ParserContext<'_>, span: &str) {
    let flattened = truncate_at_sentence_break(span).replace(['\r', '\n'], " ");
    for fragment in split_outside_parens(&flattened) {
        let cleaned = fragment.trim().trim_end_matches('.').trim();
        if !cleaned.is_empty() {
            ctx.record.spells.push(cleaned.to_string());
        }
    }
}

/// Split on commas that sit outside any parentheses.
fn split_outside_parens(text: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in text.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                parts.push(&text[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&text[start..]);
    parts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::importer::patterns::Language;
    use crate::importer::test_support::context;

    #[test]
    fn test_parenthetical_commas_do_not_split() {
        let mut ctx = context(Language::En, "");
        parse_spells(&mut ctx, "Contact Deity (1 magic point), Summon, Bind Monster");

        assert_eq!(
            ctx.record.spells,
            vec!["Contact Deity (1 magic point)", "Summon", "Bind Monster"]
        );
    }

    #[test]
    fn test_line_breaks_flatten_and_period_is_cleaned() {
        let mut ctx = context(Language::En, "");
        parse_spells(&mut ctx, "Shrivelling,\nDominate.");

        assert_eq!(ctx.record.spells, vec!["Shrivelling", "Dominate"]);
    }

    #[test]
    fn test_prose_after_sentence_break_is_ignored() {
        let mut ctx = context(Language::En, "");
        parse_spells(&mut ctx, "Wither Limb.\nHe learned these from a mouldering tome.");

        assert_eq!(ctx.record.spells, vec!["Wither Limb"]);
    }

    #[test]
    fn test_empty_fragments_are_dropped() {
        let mut ctx = context(Language::En, "");
        parse_spells(&mut ctx, " , Summon , ");

        assert_eq!(ctx.record.spells, vec!["Summon"]);
    }
}
