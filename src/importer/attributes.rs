//! Attribute Parser
//!
//! Pulls the scalar fields out of the remaining text: the eight
//! characteristics plus sanity, hit and magic points, then damage bonus,
//! build, armor, movement, luck, sanity loss and attacks per round. Each
//! extraction deletes its source span, so the buffer shrinks monotonically
//! toward irreducible leftover.

use super::extractor::Options;
use super::patterns::{Field, CHARACTERISTIC_SCAN};
use super::ParserContext;

pub(crate) fn parse_attributes(ctx: &mut ParserContext<'_>) {
    for field in CHARACTERISTIC_SCAN {
        ctx.extract(field, Options::number());
    }

    // damage bonus: absent or an explicit "none" both resolve to "0"
    match ctx.extract(Field::Db, Options::consume()) {
        Some(m) => {
            let raw = m.group("db").unwrap_or("").trim();
            ctx.record.db = Some(if ctx.patterns.is_none_sentinel(raw) {
                "0".to_string()
            } else {
                compact(&ctx.patterns.translate_dice(raw))
            });
        }
        None => ctx.record.db = Some("0".to_string()),
    }

    ctx.extract(Field::Build, Options::number());

    // armor follows the same defaulting policy as damage bonus
    match ctx.extract(Field::Armor, Options::consume()) {
        Some(m) => {
            let raw = m.group("armor").unwrap_or("").trim();
            let value = if ctx.patterns.is_none_sentinel(raw) {
                0
            } else {
                raw.parse().unwrap_or(0)
            };
            ctx.record.armor = Some(value);
        }
        None => ctx.record.armor = Some(0),
    }

    ctx.extract(Field::Mov, Options::number());
    ctx.extract(Field::Lck, Options::number());

    if let Some(m) = ctx.extract(Field::SanLoss, Options::consume()) {
        if let Some(raw) = m.group("san_loss") {
            ctx.record.san_loss = Some(compact(&ctx.patterns.translate_dice(raw)));
        }
    }

    // attacks per round defaults to zero only when present but "none";
    // entirely absent stays absent
    if let Some(m) = ctx.extract(Field::AttacksPerRound, Options::consume()) {
        let raw = m.group("attacks_per_round").unwrap_or("").trim();
        let value = if ctx.patterns.is_none_sentinel(raw) {
            0
        } else {
            raw.parse().unwrap_or(0)
        };
        ctx.record.attacks_per_round = Some(value);
    }
}

/// Squeeze whitespace out of an expression ("1 / 1d6" -> "1/1d6").
fn compact(expr: &str) -> String {
    expr.chars().filter(|c| !c.is_whitespace()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::importer::patterns::Language;
    use crate::importer::test_support::context;

    #[test]
    fn test_characteristics_and_derived_points() {
        let mut ctx = context(
            Language::En,
            "STR 45 CON 60 SIZ 70 DEX 50 APP 55 INT 80 POW 65 EDU 75 SAN 60 HP 13 MP 13",
        );
        parse_attributes(&mut ctx);

        let c = ctx.record.characteristics;
        assert_eq!(c.strength, Some(45));
        assert_eq!(c.size, Some(70));
        assert_eq!(c.education, Some(75));
        assert_eq!(ctx.record.san, Some(60));
        assert_eq!(ctx.record.hp, Some(13));
        assert_eq!(ctx.record.mp, Some(13));
        assert!(ctx.buffer.is_blank());
    }

    #[test]
    fn test_damage_bonus_defaults_to_zero_when_absent() {
        let mut ctx = context(Language::En, "STR 45");
        parse_attributes(&mut ctx);
        assert_eq!(ctx.record.db.as_deref(), Some("0"));
        assert_eq!(ctx.record.armor, Some(0));
    }

    #[test]
    fn test_damage_bonus_none_sentinel() {
        let mut ctx = context(Language::En, "Damage Bonus: none, Build: 0");
        parse_attributes(&mut ctx);
        assert_eq!(ctx.record.db.as_deref(), Some("0"));
        assert_eq!(ctx.record.build, Some(0));
    }

    #[test]
    fn test_damage_bonus_dice_shorthand_translated() {
        let mut ctx = context(Language::De, "Schadensbonus: +1W4");
        parse_attributes(&mut ctx);
        assert_eq!(ctx.record.db.as_deref(), Some("+1d4"));
    }

    #[test]
    fn test_armor_value_and_none() {
        let mut ctx = context(Language::En, "Armor: 2");
        parse_attributes(&mut ctx);
        assert_eq!(ctx.record.armor, Some(2));

        let mut ctx = context(Language::En, "Armor: none");
        parse_attributes(&mut ctx);
        assert_eq!(ctx.record.armor, Some(0));
    }

    #[test]
    fn test_sanity_loss_expression() {
        let mut ctx = context(Language::En, "SAN 45 Sanity loss: 1 / 1d6");
        parse_attributes(&mut ctx);
        assert_eq!(ctx.record.san, Some(45));
        assert_eq!(ctx.record.san_loss.as_deref(), Some("1/1d6"));
    }

    #[test]
    fn test_attacks_per_round_policies() {
        let mut ctx = context(Language::En, "Attacks per round: 2");
        parse_attributes(&mut ctx);
        assert_eq!(ctx.record.attacks_per_round, Some(2));

        let mut ctx = context(Language::En, "Attacks per round: none");
        parse_attributes(&mut ctx);
        assert_eq!(ctx.record.attacks_per_round, Some(0));

        let mut ctx = context(Language::En, "STR 45");
        parse_attributes(&mut ctx);
        assert_eq!(ctx.record.attacks_per_round, None);
    }

    #[test]
    fn test_movement_luck_build() {
        let mut ctx = context(Language::En, "Move 8 Luck 35 Build -1");
        parse_attributes(&mut ctx);
        assert_eq!(ctx.record.mov, Some(8));
        assert_eq!(ctx.record.lck, Some(35));
        assert_eq!(ctx.record.build, Some(-1));
    }

    #[test]
    fn test_buffer_shrinks_monotonically() {
        let mut ctx = context(Language::En, "STR 45 CON 60 Move 8 Luck 35 extra prose stays");
        let mut previous = ctx.buffer.len();
        for field in [Field::Str, Field::Con, Field::Mov, Field::Lck, Field::Hp] {
            ctx.extract(field, Options::number());
            assert!(ctx.buffer.len() <= previous);
            previous = ctx.buffer.len();
        }
        assert!(ctx.buffer.as_str().contains("extra prose stays"));
    }
}
