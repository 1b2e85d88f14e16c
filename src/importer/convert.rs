//! Edition Converter
//!
//! Pure scalar transform that up-converts 6th-edition statistics to the 7th
//! edition percentile scale. Total over the record; no failure modes.

use super::record::ParsedRecord;

/// A statblock whose every matched characteristic sits at or below this value
/// reads as 6th-edition (3d6-scale) rather than percentile.
const SIXTH_EDITION_MAX: i32 = 25;

/// Heuristic used by the auto-detect conversion mode.
pub fn looks_like_sixth_edition(record: &ParsedRecord) -> bool {
    let present = record.characteristics.present();
    !present.is_empty() && present.iter().all(|v| *v <= SIXTH_EDITION_MAX)
}

/// Multiply the seven plain characteristics by five, remap education through
/// the three-tier rule, and rewrite the two legacy damage-bonus literals.
pub fn convert_sixth_edition(record: &mut ParsedRecord) {
    let c = &mut record.characteristics;
    for slot in [
        &mut c.strength,
        &mut c.constitution,
        &mut c.size,
        &mut c.dexterity,
        &mut c.appearance,
        &mut c.intelligence,
        &mut c.power,
    ] {
        if let Some(value) = slot.as_mut() {
            *value *= 5;
        }
    }

    if let Some(edu) = record.characteristics.education.as_mut() {
        *edu = match *edu {
            v if v <= 18 => v * 5,
            v if v <= 26 => v + 72,
            _ => 99,
        };
    }

    match record.db.as_deref() {
        Some("-1d4") => record.db = Some("-1".to_string()),
        Some("-1d6") => record.db = Some("-2".to_string()),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record_with_edu(edu: i32) -> ParsedRecord {
        let mut record = ParsedRecord::default();
        record.characteristics.education = Some(edu);
        record
    }

    #[test]
    fn test_characteristics_multiply_by_five() {
        let mut record = ParsedRecord::default();
        record.characteristics.strength = Some(15);
        record.characteristics.power = Some(9);
        convert_sixth_edition(&mut record);
        assert_eq!(record.characteristics.strength, Some(75));
        assert_eq!(record.characteristics.power, Some(45));
    }

    #[test]
    fn test_education_three_tier_rule() {
        for (from, to) in [(10, 50), (18, 90), (19, 91), (20, 92), (26, 98), (27, 99), (31, 99)] {
            let mut record = record_with_edu(from);
            convert_sixth_edition(&mut record);
            assert_eq!(record.characteristics.education, Some(to), "edu {from}");
        }
    }

    #[test]
    fn test_legacy_damage_bonus_literals() {
        let mut record = ParsedRecord::default();
        record.db = Some("-1d4".to_string());
        convert_sixth_edition(&mut record);
        assert_eq!(record.db.as_deref(), Some("-1"));

        record.db = Some("-1d6".to_string());
        convert_sixth_edition(&mut record);
        assert_eq!(record.db.as_deref(), Some("-2"));

        record.db = Some("+1d4".to_string());
        convert_sixth_edition(&mut record);
        assert_eq!(record.db.as_deref(), Some("+1d4"));
    }

    #[test]
    fn test_detection_needs_low_values_only() {
        let mut record = ParsedRecord::default();
        assert!(!looks_like_sixth_edition(&record));

        record.characteristics.strength = Some(12);
        record.characteristics.education = Some(16);
        assert!(looks_like_sixth_edition(&record));

        record.characteristics.power = Some(45);
        assert!(!looks_like_sixth_edition(&record));
    }

    #[test]
    fn test_absent_fields_stay_absent() {
        let mut record = record_with_edu(12);
        convert_sixth_edition(&mut record);
        assert_eq!(record.characteristics.strength, None);
        assert_eq!(record.db, None);
    }
}
