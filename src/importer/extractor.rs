//! Field Extractor
//!
//! The foundational primitive every higher extraction step builds on: look up
//! a field's template, attempt one match against a working buffer, optionally
//! delete the matched span and copy named captures into the record. Never
//! errors; an absent template or failed coercion just means "field absent".

use std::collections::HashMap;

use super::buffer::TextBuffer;
use super::patterns::{Field, PatternSet};
use super::record::ParsedRecord;

/// How captured groups are coerced before landing in the record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveAs {
    /// Stored as text with newlines flattened to spaces.
    Text,
    /// Parsed as an integer; values that fail to parse are dropped.
    Number,
}

/// Per-call extraction options.
#[derive(Debug, Clone, Copy)]
pub struct Options {
    /// Delete the matched span from the buffer.
    pub remove: bool,
    /// Copy every named capture into the record, coerced per the mode.
    pub save: Option<SaveAs>,
    /// Fail the match unless this named capture participated.
    pub required_group: Option<&'static str>,
}

impl Options {
    pub fn text() -> Self {
        Self {
            remove: true,
            save: Some(SaveAs::Text),
            required_group: None,
        }
    }

    pub fn number() -> Self {
        Self {
            remove: true,
            save: Some(SaveAs::Number),
            required_group: None,
        }
    }

    /// Scan without touching buffer or record; used by header detection to
    /// compute the earliest characteristic position.
    pub fn probe() -> Self {
        Self {
            remove: false,
            save: None,
            required_group: None,
        }
    }

    /// Consume the span but leave the record alone; the sub-parsers read the
    /// captures themselves.
    pub fn consume() -> Self {
        Self {
            remove: true,
            save: None,
            required_group: None,
        }
    }

    pub fn required(mut self, group: &'static str) -> Self {
        self.required_group = Some(group);
        self
    }
}

/// A successful match: the named captures, the matched source substring and
/// its byte offset in the buffer.
#[derive(Debug, Clone)]
pub struct FieldMatch {
    pub groups: HashMap<String, String>,
    pub text: String,
    pub offset: usize,
}

impl FieldMatch {
    pub fn group(&self, name: &str) -> Option<&str> {
        self.groups.get(name).map(String::as_str)
    }
}

/// Attempt one match of `field` against `buffer`. Returns `None` when the
/// template is missing from the set, nothing matches, or a required group
/// did not participate — the buffer is left untouched in all three cases.
pub fn extract_field(
    patterns: &PatternSet,
    buffer: &mut TextBuffer,
    record: &mut ParsedRecord,
    field: Field,
    options: Options,
) -> Option<FieldMatch> {
    let template = patterns.template(field)?;
    let caps = template.captures(buffer.as_str())?;
    if let Some(required) = options.required_group {
        caps.name(required)?;
    }
    let (text, start, end) = match caps.get(0) {
        Some(m) => (m.as_str().to_string(), m.start(), m.end()),
        None => return None,
    };

    let mut groups = HashMap::new();
    for name in template.capture_names().flatten() {
        if let Some(m) = caps.name(name) {
            groups.insert(name.to_string(), m.as_str().to_string());
        }
    }

    if let Some(mode) = options.save {
        for (name, value) in &groups {
            match mode {
                SaveAs::Text => record.set_text(name, value),
                SaveAs::Number => record.set_number(name, value),
            }
        }
    }

    if options.remove {
        // The matched span is trimmed before removal so surrounding
        // whitespace keeps the line structure intact.
        let lead = text.len() - text.trim_start().len();
        let tail = text.len() - text.trim_end().len();
        let trimmed_start = start + lead;
        let trimmed_end = end.saturating_sub(tail).max(trimmed_start);
        buffer.remove_span(trimmed_start, trimmed_end);
    }

    Some(FieldMatch {
        groups,
        text,
        offset: start,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::importer::patterns::Language;

    fn setup(text: &str) -> (&'static PatternSet, TextBuffer, ParsedRecord) {
        (
            PatternSet::get(Language::En),
            TextBuffer::new(text),
            ParsedRecord::default(),
        )
    }

    #[test]
    fn test_match_saves_number_and_removes_span() {
        let (patterns, mut buffer, mut record) = setup("some text STR 60 more text");
        let m = extract_field(patterns, &mut buffer, &mut record, Field::Str, Options::number());

        let m = m.expect("STR should match");
        assert_eq!(m.group("str"), Some("60"));
        assert_eq!(m.offset, 10);
        assert_eq!(record.characteristics.strength, Some(60));
        assert_eq!(buffer.as_str(), "some text \n more text");
    }

    #[test]
    fn test_no_match_leaves_buffer_untouched() {
        let (patterns, mut buffer, mut record) = setup("nothing of interest");
        let before = buffer.as_str().to_string();
        let m = extract_field(patterns, &mut buffer, &mut record, Field::Hp, Options::number());
        assert!(m.is_none());
        assert_eq!(buffer.as_str(), before);
    }

    #[test]
    fn test_probe_does_not_mutate() {
        let (patterns, mut buffer, mut record) = setup("HP 14");
        let m = extract_field(patterns, &mut buffer, &mut record, Field::Hp, Options::probe());
        assert!(m.is_some());
        assert_eq!(buffer.as_str(), "HP 14");
        assert_eq!(record.hp, None);
    }

    #[test]
    fn test_required_group_failure_is_a_non_match() {
        let (patterns, mut buffer, mut record) = setup("Bite,");
        let m = extract_field(
            patterns,
            &mut buffer,
            &mut record,
            Field::Weapon,
            Options::consume().required("percentage"),
        );
        assert!(m.is_none());
        assert_eq!(buffer.as_str(), "Bite,");
    }

    #[test]
    fn test_failed_coercion_still_consumes_the_span() {
        // "Armor: none" matches; the non-numeric capture is silently dropped
        // and the defaulting pass settles the value later.
        let (patterns, mut buffer, mut record) = setup("Armor: none");
        let m = extract_field(patterns, &mut buffer, &mut record, Field::Armor, Options::number());
        let m = m.expect("armor sentinel should match");
        assert_eq!(m.group("armor"), Some("none"));
        assert_eq!(record.armor, None);
        assert!(buffer.is_blank());
    }

    #[test]
    fn test_buffer_never_grows_on_extraction() {
        let (patterns, mut buffer, mut record) = setup("DEX 55 and APP 40");
        let before = buffer.len();
        extract_field(patterns, &mut buffer, &mut record, Field::Dex, Options::number());
        assert!(buffer.len() <= before);
    }
}
