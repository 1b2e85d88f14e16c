//! External Collaborators
//!
//! Capability traits the importer calls out to: locale string lookup, item
//! catalog search, and persistence of the assembled character. In-memory
//! implementations let the binary and tests run without a host application.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::importer::assemble::{CharacterSheet, ItemData};

// ============================================================================
// Localization
// ============================================================================

/// Keys the importer looks up. Implementations unaware of a key should echo
/// it back rather than fail.
pub mod i18n {
    pub const UNNAMED_CHARACTER: &str = "import.unnamed-character";
    pub const IMPORTED_FOLDER: &str = "import.imported-characters";
    pub const SKILL_LANGUAGE: &str = "import.skill.language";
    pub const SKILL_HANDGUN: &str = "import.skill.handgun";
    pub const SKILL_RIFLE: &str = "import.skill.rifle";
    pub const SKILL_SUBMACHINE_GUN: &str = "import.skill.submachine-gun";
    pub const SKILL_MACHINE_GUN: &str = "import.skill.machine-gun";
    pub const SKILL_THROW: &str = "import.skill.throw";
    pub const SKILL_BRAWL: &str = "import.skill.brawl";
}

/// Locale string lookup. Must be pure given a key.
pub trait Localize: Send + Sync {
    fn localize(&self, key: &str) -> String;
}

/// Built-in English strings with optional per-key overrides.
#[derive(Debug, Default)]
pub struct StaticLocalizer {
    overrides: HashMap<String, String>,
}

impl StaticLocalizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_override(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.overrides.insert(key.into(), value.into());
        self
    }
}

impl Localize for StaticLocalizer {
    fn localize(&self, key: &str) -> String {
        if let Some(value) = self.overrides.get(key) {
            return value.clone();
        }
        match key {
            i18n::UNNAMED_CHARACTER => "Unnamed character",
            i18n::IMPORTED_FOLDER => "Imported characters",
            i18n::SKILL_LANGUAGE => "Language",
            i18n::SKILL_HANDGUN => "Firearms (Handgun)",
            i18n::SKILL_RIFLE => "Firearms (Rifle)",
            i18n::SKILL_SUBMACHINE_GUN => "Firearms (Submachine Gun)",
            i18n::SKILL_MACHINE_GUN => "Firearms (Machine Gun)",
            i18n::SKILL_THROW => "Throw",
            i18n::SKILL_BRAWL => "Fighting (Brawl)",
            other => other,
        }
        .to_string()
    }
}

// ============================================================================
// Item Catalog
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Skill,
    Weapon,
    Spell,
}

/// An item known to one of the searchable sources.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogItem {
    pub id: String,
    pub kind: ItemKind,
    pub name: String,
    /// Which source this item came from; search order is expressed in these
    /// codes.
    pub source: String,
    pub payload: serde_json::Value,
}

/// Case-insensitive name+kind lookup across item sources in caller-specified
/// priority order. The only suspension point in an import.
#[async_trait]
pub trait ItemCatalog: Send + Sync {
    async fn find_item(
        &self,
        kind: ItemKind,
        name: &str,
        combat_only: bool,
        search_order: &[String],
    ) -> Option<CatalogItem>;
}

/// A catalog with nothing in it; every lookup falls back to synthesis.
#[derive(Debug, Default)]
pub struct NullCatalog;

#[async_trait]
impl ItemCatalog for NullCatalog {
    async fn find_item(
        &self,
        _kind: ItemKind,
        _name: &str,
        _combat_only: bool,
        _search_order: &[String],
    ) -> Option<CatalogItem> {
        None
    }
}

/// Fixed in-memory catalog. Sources are searched in the order the caller
/// lists them; an empty order searches everything.
#[derive(Debug, Default)]
pub struct StaticCatalog {
    items: Vec<CatalogItem>,
}

impl StaticCatalog {
    pub fn new(items: Vec<CatalogItem>) -> Self {
        Self { items }
    }

    fn find_in_source(&self, kind: ItemKind, name: &str, source: Option<&str>) -> Option<CatalogItem> {
        self.items
            .iter()
            .find(|item| {
                item.kind == kind
                    && item.name.eq_ignore_ascii_case(name)
                    && source.map_or(true, |s| item.source == s)
            })
            .cloned()
    }
}

#[async_trait]
impl ItemCatalog for StaticCatalog {
    async fn find_item(
        &self,
        kind: ItemKind,
        name: &str,
        _combat_only: bool,
        search_order: &[String],
    ) -> Option<CatalogItem> {
        if search_order.is_empty() {
            return self.find_in_source(kind, name, None);
        }
        for source in search_order {
            if let Some(item) = self.find_in_source(kind, name, Some(source)) {
                return Some(item);
            }
        }
        None
    }
}

// ============================================================================
// Persistence
// ============================================================================

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("entity not found: {0}")]
    NotFound(String),
    #[error("storage failure: {0}")]
    Backend(String),
}

/// Persistence of the assembled character and its items.
#[async_trait]
pub trait CharacterStore: Send + Sync {
    /// Locate or create the container results are filed into. Idempotent.
    async fn create_container_if_absent(&self, name: &str) -> Result<String, StoreError>;

    async fn create_character(
        &self,
        sheet: &CharacterSheet,
        container_id: &str,
    ) -> Result<String, StoreError>;

    /// Replace the sheet of an already-persisted character (re-imports).
    async fn update_character(
        &self,
        entity_id: &str,
        sheet: &CharacterSheet,
    ) -> Result<(), StoreError>;

    async fn attach_items(&self, entity_id: &str, items: &[ItemData]) -> Result<(), StoreError>;
}

/// A character as the in-memory store holds it.
#[derive(Debug, Clone, Serialize)]
pub struct StoredCharacter {
    pub id: String,
    pub container_id: String,
    pub sheet: CharacterSheet,
    pub items: Vec<ItemData>,
}

#[derive(Debug, Default)]
struct MemoryStoreState {
    containers: Vec<(String, String)>,
    characters: Vec<StoredCharacter>,
    next_id: usize,
}

/// In-memory store backing the CLI and the test suites.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<MemoryStoreState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn characters(&self) -> Vec<StoredCharacter> {
        self.state
            .lock()
            .map(|state| state.characters.clone())
            .unwrap_or_default()
    }

    fn locked(&self) -> Result<std::sync::MutexGuard<'_, MemoryStoreState>, StoreError> {
        self.state
            .lock()
            .map_err(|_| StoreError::Backend("store lock poisoned".to_string()))
    }
}

#[async_trait]
impl CharacterStore for MemoryStore {
    async fn create_container_if_absent(&self, name: &str) -> Result<String, StoreError> {
        let mut state = self.locked()?;
        if let Some((id, _)) = state.containers.iter().find(|(_, n)| n == name) {
            return Ok(id.clone());
        }
        state.next_id += 1;
        let id = format!("folder-{}", state.next_id);
        state.containers.push((id.clone(), name.to_string()));
        Ok(id)
    }

    async fn create_character(
        &self,
        sheet: &CharacterSheet,
        container_id: &str,
    ) -> Result<String, StoreError> {
        let mut state = self.locked()?;
        state.next_id += 1;
        let id = format!("actor-{}", state.next_id);
        state.characters.push(StoredCharacter {
            id: id.clone(),
            container_id: container_id.to_string(),
            sheet: sheet.clone(),
            items: Vec::new(),
        });
        Ok(id)
    }

    async fn update_character(
        &self,
        entity_id: &str,
        sheet: &CharacterSheet,
    ) -> Result<(), StoreError> {
        let mut state = self.locked()?;
        let character = state
            .characters
            .iter_mut()
            .find(|c| c.id == entity_id)
            .ok_or_else(|| StoreError::NotFound(entity_id.to_string()))?;
        character.sheet = sheet.clone();
        Ok(())
    }

    async fn attach_items(&self, entity_id: &str, items: &[ItemData]) -> Result<(), StoreError> {
        let mut state = self.locked()?;
        let character = state
            .characters
            .iter_mut()
            .find(|c| c.id == entity_id)
            .ok_or_else(|| StoreError::NotFound(entity_id.to_string()))?;
        character.items.extend_from_slice(items);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_localizer_falls_back_to_key() {
        let localizer = StaticLocalizer::new();
        assert_eq!(localizer.localize(i18n::SKILL_HANDGUN), "Firearms (Handgun)");
        assert_eq!(localizer.localize("no.such.key"), "no.such.key");
    }

    #[test]
    fn test_static_localizer_override_wins() {
        let localizer =
            StaticLocalizer::new().with_override(i18n::UNNAMED_CHARACTER, "Sans nom");
        assert_eq!(localizer.localize(i18n::UNNAMED_CHARACTER), "Sans nom");
    }

    #[tokio::test]
    async fn test_catalog_respects_search_order() {
        let catalog = StaticCatalog::new(vec![
            CatalogItem {
                id: "a".into(),
                kind: ItemKind::Skill,
                name: "Spot Hidden".into(),
                source: "world".into(),
                payload: serde_json::json!({"value": 25}),
            },
            CatalogItem {
                id: "b".into(),
                kind: ItemKind::Skill,
                name: "Spot Hidden".into(),
                source: "compendium".into(),
                payload: serde_json::json!({"value": 25}),
            },
        ]);

        let order = vec!["compendium".to_string(), "world".to_string()];
        let hit = catalog
            .find_item(ItemKind::Skill, "spot hidden", false, &order)
            .await
            .expect("lookup should hit");
        assert_eq!(hit.id, "b");

        let miss = catalog
            .find_item(ItemKind::Weapon, "spot hidden", true, &order)
            .await;
        assert!(miss.is_none());
    }

    #[tokio::test]
    async fn test_container_creation_is_idempotent() {
        let store = MemoryStore::new();
        let first = store.create_container_if_absent("Imported characters").await.unwrap();
        let second = store.create_container_if_absent("Imported characters").await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_attach_to_unknown_entity_fails() {
        let store = MemoryStore::new();
        let err = store.attach_items("actor-99", &[]).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_update_replaces_the_sheet() {
        let store = MemoryStore::new();
        let container = store.create_container_if_absent("Imported characters").await.unwrap();

        let mut sheet = CharacterSheet {
            name: "Before".to_string(),
            entity_kind: Default::default(),
            age: None,
            occupation: None,
            characteristics: Default::default(),
            attributes: Default::default(),
            gmnotes: String::new(),
        };
        let id = store.create_character(&sheet, &container).await.unwrap();

        sheet.name = "After".to_string();
        store.update_character(&id, &sheet).await.unwrap();
        assert_eq!(store.characters()[0].sheet.name, "After");
    }
}
