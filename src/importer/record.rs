//! Parsed Character Record
//!
//! Intermediate representation accumulated destructively while the extraction
//! passes consume the text buffer. Fields are write-once: a later pass never
//! overwrites a value an earlier pass recorded, except where a pass explicitly
//! defaults an absent field to zero.

use serde::{Deserialize, Serialize};

/// The eight CoC characteristics, keyed by their canonical abbreviations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Characteristics {
    #[serde(rename = "str")]
    pub strength: Option<i32>,
    #[serde(rename = "con")]
    pub constitution: Option<i32>,
    #[serde(rename = "siz")]
    pub size: Option<i32>,
    #[serde(rename = "dex")]
    pub dexterity: Option<i32>,
    #[serde(rename = "app")]
    pub appearance: Option<i32>,
    #[serde(rename = "int")]
    pub intelligence: Option<i32>,
    #[serde(rename = "pow")]
    pub power: Option<i32>,
    #[serde(rename = "edu")]
    pub education: Option<i32>,
}

impl Characteristics {
    /// Values present on the record, in canonical order.
    pub fn present(&self) -> Vec<i32> {
        [
            self.strength,
            self.constitution,
            self.size,
            self.dexterity,
            self.appearance,
            self.intelligence,
            self.power,
            self.education,
        ]
        .into_iter()
        .flatten()
        .collect()
    }

    fn slot_mut(&mut self, key: &str) -> Option<&mut Option<i32>> {
        Some(match key {
            "str" => &mut self.strength,
            "con" => &mut self.constitution,
            "siz" => &mut self.size,
            "dex" => &mut self.dexterity,
            "app" => &mut self.appearance,
            "int" => &mut self.intelligence,
            "pow" => &mut self.power,
            "edu" => &mut self.education,
            _ => return None,
        })
    }
}

/// A skill or language entry. Dodge is recorded with `push: false`; it is not
/// eligible for the push-roll retry mechanic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillEntry {
    pub name: String,
    pub value: i32,
    pub push: bool,
}

/// One range band of a multi-band ranged weapon.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeBand {
    pub distance: i32,
    pub damage: String,
}

/// Usage flags derived while parsing a weapon line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeaponProperties {
    /// Exactly three slash-delimited damage parts were found.
    pub shotgun: bool,
    pub ranged: bool,
    pub melee: bool,
    /// Half the damage bonus was folded into the printed damage.
    pub half_db: bool,
    /// The full damage bonus was folded into the printed damage.
    pub full_db: bool,
}

/// Heuristic weapon classification by keyword-in-name matching. Best effort;
/// anything unclassified defaults to melee.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WeaponCategory {
    Handgun,
    Rifle,
    SubmachineGun,
    MachineGun,
    Launched,
    #[default]
    Melee,
}

impl WeaponCategory {
    pub fn is_ranged(self) -> bool {
        !matches!(self, WeaponCategory::Melee)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeaponRecord {
    pub name: String,
    /// Stated percentage, or the carry-over from the previous weapon line.
    pub skill_percentage: Option<i32>,
    /// Damage expression with dice shorthand translated and damage-bonus
    /// terms stripped.
    pub damage: String,
    /// Normal / long / extreme. All zero unless `properties.shotgun`.
    pub range: [RangeBand; 3],
    pub category: WeaponCategory,
    pub properties: WeaponProperties,
}

/// Everything the extraction pipeline pulled out of the description.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParsedRecord {
    pub name: Option<String>,
    pub age: Option<String>,
    pub occupation: Option<String>,
    #[serde(flatten)]
    pub characteristics: Characteristics,
    pub san: Option<i32>,
    pub hp: Option<i32>,
    pub mp: Option<i32>,
    pub mov: Option<i32>,
    pub lck: Option<i32>,
    pub build: Option<i32>,
    pub armor: Option<i32>,
    /// Damage bonus expression; `"0"` when absent or explicitly "none".
    pub db: Option<String>,
    /// Sanity loss as a `pass/fail` pair of dice-or-integer expressions.
    pub san_loss: Option<String>,
    /// Only defaulted to zero when an explicit "none" sentinel matched.
    pub attacks_per_round: Option<i32>,
    pub skills: Vec<SkillEntry>,
    pub languages: Vec<SkillEntry>,
    pub attacks: Vec<WeaponRecord>,
    pub spells: Vec<String>,
    /// HTML remainder of everything no pass consumed.
    pub gmnotes: String,
}

/// Some templates need two capture branches for one logical field; fold the
/// alternate group names onto their canonical key.
fn canonical(key: &str) -> &str {
    match key {
        "age_years" => "age",
        other => other,
    }
}

impl ParsedRecord {
    /// Record a text capture under `key`, flattening newlines to spaces.
    /// First write wins; unknown keys and empty values are ignored.
    pub(crate) fn set_text(&mut self, key: &str, value: &str) {
        let value = value.replace(['\r', '\n'], " ").trim().to_string();
        if value.is_empty() {
            return;
        }
        let slot = match canonical(key) {
            "name" => &mut self.name,
            "age" => &mut self.age,
            "occupation" => &mut self.occupation,
            "db" => &mut self.db,
            "san_loss" => &mut self.san_loss,
            _ => return,
        };
        if slot.is_none() {
            *slot = Some(value);
        }
    }

    /// Record a numeric capture under `key`. Values that fail to parse are
    /// silently dropped rather than defaulted; first write wins.
    pub(crate) fn set_number(&mut self, key: &str, value: &str) {
        let Ok(number) = value.trim().parse::<i32>() else {
            return;
        };
        let key = canonical(key);
        if let Some(slot) = self.characteristics.slot_mut(key) {
            if slot.is_none() {
                *slot = Some(number);
            }
            return;
        }
        let slot = match key {
            "san" => &mut self.san,
            "hp" => &mut self.hp,
            "mp" => &mut self.mp,
            "mov" => &mut self.mov,
            "lck" => &mut self.lck,
            "build" => &mut self.build,
            "armor" => &mut self.armor,
            "attacks_per_round" => &mut self.attacks_per_round,
            _ => return,
        };
        if slot.is_none() {
            *slot = Some(number);
        }
    }
}
