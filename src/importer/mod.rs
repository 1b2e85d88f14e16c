//! Statblock Importer
//!
//! Turns a free-form textual character description into a structured record:
//! Normalizer -> Header Parser -> Attribute Parser -> Section Splitter ->
//! {Combat, Skills, Languages, Spells} sub-parsers -> Edition Converter ->
//! Record Assembler. Every stage degrades to "field absent" rather than
//! aborting the parse; only persistence failures surface as errors.

pub mod assemble;
pub mod buffer;
pub mod convert;
pub mod extractor;
pub mod normalize;
pub mod patterns;
pub mod record;

mod attributes;
mod combat;
mod header;
mod sections;
mod skills;
mod spells;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::catalog::{CharacterStore, ItemCatalog, Localize, StoreError};
use buffer::TextBuffer;
use extractor::{extract_field, FieldMatch, Options};
use patterns::{Field, PatternSet};
use record::ParsedRecord;

pub use assemble::{Assembler, CharacterSheet, ImportedCharacter, ItemData};
pub use patterns::Language;

/// Safety valve for the combat and skill loops: malformed input stops making
/// progress after this many iterations and the leftover is reported instead.
pub(crate) const MAX_SECTION_ITERATIONS: usize = 40;

/// What to do about 6th-edition-scale statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConversionMode {
    /// Convert when the statblock reads as 6th edition.
    #[default]
    Auto,
    /// Always apply the conversion.
    Convert,
    /// Leave values as printed.
    Skip,
}

/// Kind of entity the import produces.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    #[default]
    Character,
    Npc,
    Creature,
}

/// Options for one import invocation.
#[derive(Debug, Clone, Default)]
pub struct ImportOptions {
    pub language: Language,
    pub entity_kind: EntityKind,
    pub conversion: ConversionMode,
    /// Catalog source codes, searched in order.
    pub item_search_order: Vec<String>,
}

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("persistence failed: {0}")]
    Store(#[from] StoreError),
}

/// Resolve a language code, falling back to English for anything unknown.
pub fn language_or_default(code: &str) -> Language {
    Language::from_code(code).unwrap_or_else(|| {
        warn!(code, "unknown language code, falling back to English");
        Language::default()
    })
}

/// Per-invocation parse state: the shrinking text buffer and the record
/// being accumulated. Exclusively owned by one parse; only the pattern set
/// is shared.
pub struct ParserContext<'a> {
    pub patterns: &'static PatternSet,
    pub buffer: TextBuffer,
    pub record: ParsedRecord,
    pub localizer: &'a dyn Localize,
}

impl<'a> ParserContext<'a> {
    pub fn new(language: Language, raw_text: &str, localizer: &'a dyn Localize) -> Self {
        Self {
            patterns: PatternSet::get(language),
            buffer: TextBuffer::new(normalize::normalize(raw_text)),
            record: ParsedRecord::default(),
            localizer,
        }
    }

    pub(crate) fn extract(&mut self, field: Field, options: Options) -> Option<FieldMatch> {
        extract_field(self.patterns, &mut self.buffer, &mut self.record, field, options)
    }
}

/// Run the extraction pipeline and return the pre-persistence intermediate
/// record. This is the "test mode" result; `import_character` builds on it.
pub fn parse_statblock(
    raw_text: &str,
    language: Language,
    conversion: ConversionMode,
    localizer: &dyn Localize,
) -> ParsedRecord {
    let mut ctx = ParserContext::new(language, raw_text, localizer);
    run_pipeline(&mut ctx, conversion);
    ctx.record.gmnotes = normalize::to_html(ctx.buffer.as_str());
    ctx.record
}

/// The pipeline without the final notes rendering; kept separate so the
/// fixed-point and shrinkage properties can be tested on the raw buffer.
pub(crate) fn run_pipeline(ctx: &mut ParserContext<'_>, conversion: ConversionMode) {
    header::parse_header(ctx);
    attributes::parse_attributes(ctx);
    sections::split_sections(ctx);
    match conversion {
        ConversionMode::Convert => convert::convert_sixth_edition(&mut ctx.record),
        ConversionMode::Auto if convert::looks_like_sixth_edition(&ctx.record) => {
            convert::convert_sixth_edition(&mut ctx.record)
        }
        _ => {}
    }
}

/// Parse, assemble and persist one character. Catalog lookups that miss fall
/// back to synthesizing minimal items; store failures propagate.
pub async fn import_character(
    raw_text: &str,
    options: &ImportOptions,
    localizer: &dyn Localize,
    catalog: &dyn ItemCatalog,
    store: &dyn CharacterStore,
) -> Result<ImportedCharacter, ImportError> {
    let record = parse_statblock(raw_text, options.language, options.conversion, localizer);
    Assembler::new(localizer, catalog, store)
        .import(record, options)
        .await
}
