//! Record Assembler
//!
//! Maps the parsed intermediate record into the external data shapes: the
//! character sheet fields and the item list. Catalog lookups run in the
//! caller's priority order; a miss falls back deterministically to
//! synthesizing a minimal item.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use serde_json::json;
use tracing::debug;

use super::record::{ParsedRecord, SkillEntry, WeaponCategory, WeaponRecord};
use super::{EntityKind, ImportError, ImportOptions};
use crate::catalog::{i18n, CharacterStore, ItemCatalog, ItemKind, Localize};

/// "Science (Biology)" style names split into a base skill and a
/// specialization.
static SPECIALIZATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<base>[^(]+?)\s*\((?P<spec>[^)]+)\)\s*$")
        .expect("failed to compile specialization pattern")
});

/// Scalar attribute block of the assembled sheet.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SheetAttributes {
    pub hp: i32,
    pub mp: i32,
    pub san: i32,
    pub mov: i32,
    pub lck: i32,
    pub build: i32,
    pub armor: i32,
    pub db: String,
    pub san_loss: Option<String>,
    pub attacks_per_round: Option<i32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CharacterSheet {
    pub name: String,
    pub entity_kind: EntityKind,
    pub age: Option<String>,
    pub occupation: Option<String>,
    pub characteristics: super::record::Characteristics,
    pub attributes: SheetAttributes,
    /// HTML notes holding whatever the parse could not consume.
    pub gmnotes: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase", tag = "from")]
pub enum ItemSource {
    Catalog { id: String },
    Synthesized,
}

#[derive(Debug, Clone, Serialize)]
pub struct ItemData {
    pub kind: ItemKind,
    pub name: String,
    pub source: ItemSource,
    pub payload: serde_json::Value,
}

/// Result of a full import: the persisted ids plus everything that was
/// written.
#[derive(Debug, Clone, Serialize)]
pub struct ImportedCharacter {
    pub entity_id: String,
    pub container_id: String,
    pub sheet: CharacterSheet,
    pub items: Vec<ItemData>,
    pub record: ParsedRecord,
}

pub struct Assembler<'a> {
    localizer: &'a dyn Localize,
    catalog: &'a dyn ItemCatalog,
    store: &'a dyn CharacterStore,
}

impl<'a> Assembler<'a> {
    pub fn new(
        localizer: &'a dyn Localize,
        catalog: &'a dyn ItemCatalog,
        store: &'a dyn CharacterStore,
    ) -> Self {
        Self {
            localizer,
            catalog,
            store,
        }
    }

    pub fn build_sheet(&self, record: &ParsedRecord, entity_kind: EntityKind) -> CharacterSheet {
        CharacterSheet {
            name: record
                .name
                .clone()
                .unwrap_or_else(|| self.localizer.localize(i18n::UNNAMED_CHARACTER)),
            entity_kind,
            age: record.age.clone(),
            occupation: record.occupation.clone(),
            characteristics: record.characteristics,
            attributes: SheetAttributes {
                hp: record.hp.unwrap_or(0),
                mp: record.mp.unwrap_or(0),
                san: record.san.unwrap_or(0),
                mov: record.mov.unwrap_or(0),
                lck: record.lck.unwrap_or(0),
                build: record.build.unwrap_or(0),
                armor: record.armor.unwrap_or(0),
                db: record.db.clone().unwrap_or_else(|| "0".to_string()),
                san_loss: record.san_loss.clone(),
                attacks_per_round: record.attacks_per_round,
            },
            gmnotes: record.gmnotes.clone(),
        }
    }

    pub async fn build_items(&self, record: &ParsedRecord, search_order: &[String]) -> Vec<ItemData> {
        let mut items = Vec::new();
        for entry in &record.skills {
            items.push(self.skill_item(entry, None, search_order).await);
        }
        for entry in &record.languages {
            let base = self.localizer.localize(i18n::SKILL_LANGUAGE);
            let named = SkillEntry {
                name: format!("{} ({})", base, entry.name),
                value: entry.value,
                push: entry.push,
            };
            items.push(self.skill_item(&named, Some(entry.name.clone()), search_order).await);
        }
        for weapon in &record.attacks {
            items.push(self.weapon_item(weapon, search_order).await);
        }
        for spell in &record.spells {
            items.push(self.spell_item(spell, search_order).await);
        }
        items
    }

    /// Assemble and persist. The imported-characters container is located or
    /// created first, idempotently.
    pub async fn import(
        &self,
        record: ParsedRecord,
        options: &ImportOptions,
    ) -> Result<ImportedCharacter, ImportError> {
        let sheet = self.build_sheet(&record, options.entity_kind);
        let items = self.build_items(&record, &options.item_search_order).await;

        let container_id = self
            .store
            .create_container_if_absent(&self.localizer.localize(i18n::IMPORTED_FOLDER))
            .await?;
        let entity_id = self.store.create_character(&sheet, &container_id).await?;
        self.store.attach_items(&entity_id, &items).await?;

        Ok(ImportedCharacter {
            entity_id,
            container_id,
            sheet,
            items,
            record,
        })
    }

    async fn skill_item(
        &self,
        entry: &SkillEntry,
        specialization: Option<String>,
        search_order: &[String],
    ) -> ItemData {
        if let Some(item) = self
            .catalog
            .find_item(ItemKind::Skill, &entry.name, false, search_order)
            .await
        {
            let mut payload = item.payload;
            if let Some(object) = payload.as_object_mut() {
                object.insert("value".to_string(), json!(entry.value));
                object.insert("push".to_string(), json!(entry.push));
            }
            return ItemData {
                kind: ItemKind::Skill,
                name: item.name,
                source: ItemSource::Catalog { id: item.id },
                payload,
            };
        }

        debug!(name = %entry.name, "no catalog skill matched, synthesizing");
        let (base, spec) = match specialization {
            Some(spec) => (
                self.localizer.localize(i18n::SKILL_LANGUAGE),
                Some(spec),
            ),
            None => split_specialization(&entry.name),
        };
        ItemData {
            kind: ItemKind::Skill,
            name: entry.name.clone(),
            source: ItemSource::Synthesized,
            payload: json!({
                "value": entry.value,
                "push": entry.push,
                "base": base,
                "specialization": spec,
            }),
        }
    }

    async fn weapon_item(&self, weapon: &WeaponRecord, search_order: &[String]) -> ItemData {
        if let Some(item) = self
            .catalog
            .find_item(ItemKind::Weapon, &weapon.name, true, search_order)
            .await
        {
            let mut payload = item.payload;
            if let Some(object) = payload.as_object_mut() {
                object.insert("percentage".to_string(), json!(weapon.skill_percentage));
            }
            return ItemData {
                kind: ItemKind::Weapon,
                name: item.name,
                source: ItemSource::Catalog { id: item.id },
                payload,
            };
        }

        debug!(name = %weapon.name, "no catalog weapon matched, synthesizing");
        ItemData {
            kind: ItemKind::Weapon,
            name: weapon.name.clone(),
            source: ItemSource::Synthesized,
            payload: json!({
                "skill": self.weapon_skill_name(weapon.category),
                "percentage": weapon.skill_percentage,
                "damage": weapon.damage,
                "range": weapon.range,
                "category": weapon.category,
                "properties": weapon.properties,
            }),
        }
    }

    async fn spell_item(&self, name: &str, search_order: &[String]) -> ItemData {
        if let Some(item) = self
            .catalog
            .find_item(ItemKind::Spell, name, false, search_order)
            .await
        {
            return ItemData {
                kind: ItemKind::Spell,
                name: item.name,
                source: ItemSource::Catalog { id: item.id },
                payload: item.payload,
            };
        }
        ItemData {
            kind: ItemKind::Spell,
            name: name.to_string(),
            source: ItemSource::Synthesized,
            payload: json!({}),
        }
    }

    /// Default skill backing a synthesized weapon, by detected category.
    fn weapon_skill_name(&self, category: WeaponCategory) -> String {
        let key = match category {
            WeaponCategory::Handgun => i18n::SKILL_HANDGUN,
            WeaponCategory::Rifle => i18n::SKILL_RIFLE,
            WeaponCategory::SubmachineGun => i18n::SKILL_SUBMACHINE_GUN,
            WeaponCategory::MachineGun => i18n::SKILL_MACHINE_GUN,
            WeaponCategory::Launched => i18n::SKILL_THROW,
            WeaponCategory::Melee => i18n::SKILL_BRAWL,
        };
        self.localizer.localize(key)
    }
}

/// Split "Base (Specialization)" skill names; anything else passes through
/// whole.
fn split_specialization(name: &str) -> (String, Option<String>) {
    match SPECIALIZATION.captures(name) {
        Some(caps) => match (caps.name("base"), caps.name("spec")) {
            (Some(base), Some(spec)) => (
                base.as_str().trim().to_string(),
                Some(spec.as_str().trim().to_string()),
            ),
            _ => (name.to_string(), None),
        },
        None => (name.to_string(), None),
    }
}
