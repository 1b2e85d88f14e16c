//! Combat Sub-parser
//!
//! Iterates over the combat span pulling out dodge and weapon entries. A
//! weapon line must show a percentage unless the previous weapon already
//! established one; the stated value carries over until a new one appears.
//! Damage text gets its dice shorthand translated and any half/full
//! damage-bonus terms stripped off the tail, and a three-part slash-delimited
//! damage expression marks a shotgun with fixed 10/20/50 range bands.

use regex::{Regex, RegexBuilder};
use tracing::{debug, warn};

use super::buffer::TextBuffer;
use super::extractor::{extract_field, FieldMatch, Options};
use super::patterns::{Field, Keys, PatternSet};
use super::record::{RangeBand, SkillEntry, WeaponCategory, WeaponProperties, WeaponRecord};
use super::{ParserContext, MAX_SECTION_ITERATIONS};

pub(crate) fn parse_combat(ctx: &mut ParserContext<'_>, span: &str) {
    let mut span = TextBuffer::new(span);
    let mut carried: Option<i32> = None;
    let db_literal = db_literal_pattern(ctx.record.db.as_deref());

    let mut iterations = 0;
    loop {
        if span.is_blank() {
            return;
        }
        iterations += 1;
        if iterations > MAX_SECTION_ITERATIONS {
            warn!("combat parser exhausted its iteration budget; keeping partial results");
            debug!(leftover = span.as_str(), "unconsumed combat text");
            return;
        }

        // dodge first; a dodge line would otherwise parse as a weapon
        if let Some(m) =
            extract_field(ctx.patterns, &mut span, &mut ctx.record, Field::Dodge, Options::consume())
        {
            let value = m
                .group("percentage")
                .and_then(|v| v.parse().ok())
                .unwrap_or(0);
            let name = m.group("name").unwrap_or("Dodge").to_string();
            ctx.record.skills.push(SkillEntry {
                name,
                value,
                push: false,
            });
            continue;
        }

        let mut options = Options::consume();
        if carried.is_none() {
            options = options.required("percentage");
        }
        if let Some(m) =
            extract_field(ctx.patterns, &mut span, &mut ctx.record, Field::Weapon, options)
        {
            if let Some(weapon) =
                build_weapon(ctx.patterns, &m, &mut carried, db_literal.as_ref())
            {
                ctx.record.attacks.push(weapon);
            }
            continue;
        }

        // no dodge, no weapon: swallow one line, or whatever is left
        if span.as_str().contains('\n') {
            span.consume_line();
        } else {
            span.clear();
        }
    }
}

fn build_weapon(
    patterns: &PatternSet,
    m: &FieldMatch,
    carried: &mut Option<i32>,
    db_literal: Option<&Regex>,
) -> Option<WeaponRecord> {
    let name = m
        .group("name")
        .unwrap_or("")
        .trim()
        .trim_end_matches([',', ';', ':'])
        .trim()
        .to_string();
    if name.is_empty() {
        return None;
    }

    let stated = m.group("percentage").and_then(|v| v.parse::<i32>().ok());
    if stated.is_some() {
        *carried = stated;
    }

    let translated = patterns.translate_dice(m.group("damage").unwrap_or("").trim());
    let (damage, half_db, full_db) = strip_damage_bonus(patterns, &translated, db_literal);

    let category = detect_category(&patterns.keys, &name);
    let mut properties = WeaponProperties {
        shotgun: false,
        ranged: category.is_ranged(),
        melee: !category.is_ranged(),
        half_db,
        full_db,
    };

    let parts: Vec<&str> = damage.split('/').map(str::trim).collect();
    let mut range = <[RangeBand; 3]>::default();
    if parts.len() == 3 {
        properties.shotgun = true;
        range = [
            RangeBand {
                distance: 10,
                damage: parts[0].to_string(),
            },
            RangeBand {
                distance: 20,
                damage: parts[1].to_string(),
            },
            RangeBand {
                distance: 50,
                damage: parts[2].to_string(),
            },
        ];
    }

    Some(WeaponRecord {
        name,
        skill_percentage: stated.or(*carried),
        damage,
        range,
        category,
        properties,
    })
}

/// Strip half/full damage-bonus markers and the record's own damage-bonus
/// value off the tail of a damage expression, repeatedly, recording which
/// markers were present.
fn strip_damage_bonus(
    patterns: &PatternSet,
    damage: &str,
    db_literal: Option<&Regex>,
) -> (String, bool, bool) {
    let mut text = damage.trim().to_string();
    let mut half_db = false;
    let mut full_db = false;

    loop {
        if let Some(m) = patterns.half_db_tail.find(&text) {
            text.truncate(m.start());
            text.truncate(text.trim_end().len());
            half_db = true;
            continue;
        }
        if let Some(m) = patterns.full_db_tail.find(&text) {
            text.truncate(m.start());
            text.truncate(text.trim_end().len());
            full_db = true;
            continue;
        }
        if let Some(m) = db_literal.and_then(|re| re.find(&text)) {
            if m.start() > 0 {
                text.truncate(m.start());
                text.truncate(text.trim_end().len());
                full_db = true;
                continue;
            }
        }
        break;
    }

    (text, half_db, full_db)
}

/// Tail pattern matching the record's own damage-bonus expression, e.g. the
/// `+1d4` printed after a melee weapon's base damage.
fn db_literal_pattern(db: Option<&str>) -> Option<Regex> {
    let core = db.unwrap_or("0").trim().trim_start_matches('+').trim();
    if core.is_empty() || core == "0" {
        return None;
    }
    let pattern = format!(r"(?:\s*\+\s*)?{}\s*$", regex::escape(core));
    RegexBuilder::new(&pattern).case_insensitive(true).build().ok()
}

/// Keyword-in-name category detection. Order matters: the submachine-gun
/// keywords contain the machine-gun ones, and machine-gun names often embed
/// a rifle word.
fn detect_category(keys: &Keys, name: &str) -> WeaponCategory {
    let name = name.to_lowercase();
    let matches_any = |list: &[&str]| list.iter().any(|k| name.contains(k));

    if matches_any(keys.submachine_gun) {
        WeaponCategory::SubmachineGun
    } else if matches_any(keys.machine_gun) {
        WeaponCategory::MachineGun
    } else if matches_any(keys.handgun) {
        WeaponCategory::Handgun
    } else if matches_any(keys.rifle) {
        WeaponCategory::Rifle
    } else if matches_any(keys.launched) {
        WeaponCategory::Launched
    } else {
        WeaponCategory::Melee
    }
}
