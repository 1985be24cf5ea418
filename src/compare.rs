//! Backward-compatibility report between two generations of `LC_CTYPE`
//! tables.
//!
//! Both files are parsed into [`CtypeTables`] and each class is diffed as a
//! plain code point set: what the old table had that the new one lost, and
//! what the new one gained. The report is for a human auditing a Unicode
//! upgrade, not a gate; nothing here fails.

use std::collections::BTreeMap;

use itertools::Itertools;

use crate::ctype::{CtypeTables, CLASS_NAMES, MAP_NAMES};
use crate::ucd::UnicodeData;

/// Difference of one character class between the old and new tables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassDiff {
    pub name: String,
    pub old_count: usize,
    pub new_count: usize,
    /// In the old table but not the new one, ascending.
    pub missing: Vec<u32>,
    /// In the new table but not the old one, ascending.
    pub added: Vec<u32>,
}

/// Difference of one case mapping table. A pair counts as changed when the
/// source code point maps to different targets on the two sides; it then
/// shows up in both lists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapDiff {
    pub name: String,
    pub old_count: usize,
    pub new_count: usize,
    pub missing: Vec<(u32, u32)>,
    pub added: Vec<(u32, u32)>,
}

/// Section names in report order: the canonical section order first, then
/// anything unexpected either file defines, alphabetically.
fn report_order<'a, V>(
    canonical: &[&'a str],
    old: &'a BTreeMap<String, V>,
    new: &'a BTreeMap<String, V>,
) -> Vec<&'a str> {
    let mut names: Vec<&str> = canonical
        .iter()
        .copied()
        .filter(|name| old.contains_key(*name) || new.contains_key(*name))
        .collect();
    names.extend(
        old.keys()
            .chain(new.keys())
            .map(String::as_str)
            .filter(|name| !canonical.contains(name))
            .sorted()
            .dedup(),
    );
    names
}

/// Diff every character class present in either table.
pub fn compare_classes(old: &CtypeTables, new: &CtypeTables) -> Vec<ClassDiff> {
    report_order(CLASS_NAMES, &old.classes, &new.classes)
        .into_iter()
        .map(|name| {
            let old_set = old.class(name).cloned().unwrap_or_default();
            let new_set = new.class(name).cloned().unwrap_or_default();
            ClassDiff {
                name: name.to_owned(),
                old_count: old_set.len(),
                new_count: new_set.len(),
                missing: old_set.difference(&new_set).copied().collect(),
                added: new_set.difference(&old_set).copied().collect(),
            }
        })
        .collect()
}

/// Diff every case mapping table present in either file.
pub fn compare_maps(old: &CtypeTables, new: &CtypeTables) -> Vec<MapDiff> {
    report_order(MAP_NAMES, &old.maps, &new.maps)
        .into_iter()
        .map(|name| {
            let old_map = old.map(name).cloned().unwrap_or_default();
            let new_map = new.map(name).cloned().unwrap_or_default();
            let missing = old_map
                .iter()
                .filter(|(from, to)| new_map.get(from) != Some(to))
                .map(|(&from, &to)| (from, to))
                .collect();
            let added = new_map
                .iter()
                .filter(|(from, to)| old_map.get(from) != Some(to))
                .map(|(&from, &to)| (from, to))
                .collect();
            MapDiff {
                name: name.to_owned(),
                old_count: old_map.len(),
                new_count: new_map.len(),
                missing,
                added,
            }
        })
        .collect()
}

/// The display name for a code point in report output. Old tables routinely
/// hold code points the naming UCD snapshot does not know; those get a
/// placeholder instead of failing the report.
pub fn display_name(ucd: Option<&UnicodeData>, code_point: u32) -> String {
    match ucd.and_then(|data| data.get(code_point)) {
        Some(record) if record.name == "<control>" && !record.unicode1_name.is_empty() => {
            record.unicode1_name.clone()
        }
        Some(record) => record.name.clone(),
        None => "(unknown)".to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn tables(source: &str) -> CtypeTables {
        CtypeTables::read(Cursor::new(source)).unwrap()
    }

    #[test]
    fn reports_set_differences_per_class() {
        let old = tables("alpha /\n   <U0041>;<U0042>\n");
        let new = tables("alpha /\n   <U0041>;<U0043>\n");
        let diffs = compare_classes(&old, &new);
        assert_eq!(diffs.len(), 1);
        let alpha = &diffs[0];
        assert_eq!(alpha.name, "alpha");
        assert_eq!(alpha.old_count, 2);
        assert_eq!(alpha.new_count, 2);
        assert_eq!(alpha.missing, vec![0x42]);
        assert_eq!(alpha.added, vec![0x43]);
    }

    #[test]
    fn identical_tables_diff_clean() {
        let source = "upper /\n   <U0041>..<U005A>\nlower /\n   <U0061>..<U007A>\n";
        let diffs = compare_classes(&tables(source), &tables(source));
        for diff in diffs {
            assert!(diff.missing.is_empty(), "{}", diff.name);
            assert!(diff.added.is_empty(), "{}", diff.name);
            assert_eq!(diff.old_count, diff.new_count);
        }
    }

    #[test]
    fn class_only_in_one_file_still_shows_up() {
        let old = tables("blank /\n   <U0009>;<U0020>\n");
        let new = tables("upper /\n   <U0041>\n");
        let diffs = compare_classes(&old, &new);
        let names: Vec<&str> = diffs.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["upper", "blank"]);
        let blank = diffs.iter().find(|d| d.name == "blank").unwrap();
        assert_eq!(blank.missing, vec![0x09, 0x20]);
        assert_eq!(blank.new_count, 0);
    }

    #[test]
    fn changed_mapping_appears_on_both_sides() {
        let old = tables("toupper /\n   (<U0061>,<U0041>);(<U00FF>,<U0178>)\n");
        let new = tables("toupper /\n   (<U0061>,<U0041>);(<U00FF>,<U1E9E>)\n");
        let diffs = compare_maps(&old, &new);
        assert_eq!(diffs.len(), 1);
        assert_eq!(diffs[0].missing, vec![(0xFF, 0x178)]);
        assert_eq!(diffs[0].added, vec![(0xFF, 0x1E9E)]);
    }

    #[test]
    fn totitle_section_header_is_recognized() {
        let old = tables("map \"totitle\"; /\n   (<U0061>,<U0041>)\n");
        let new = tables("map \"totitle\"; /\n");
        let diffs = compare_maps(&old, &new);
        assert_eq!(diffs[0].name, "totitle");
        assert_eq!(diffs[0].missing, vec![(0x61, 0x41)]);
        assert!(diffs[0].added.is_empty());
    }

    #[test]
    fn names_fall_back_to_a_placeholder() {
        let ucd = UnicodeData::read(
            Cursor::new(
                "0009;<control>;Cc;0;S;;;;;N;CHARACTER TABULATION;;;;\n\
                 0041;LATIN CAPITAL LETTER A;Lu;0;L;;;;;N;;;;0061;\n",
            ),
            "test",
        )
        .unwrap();
        assert_eq!(display_name(Some(&ucd), 0x41), "LATIN CAPITAL LETTER A");
        assert_eq!(display_name(Some(&ucd), 0x09), "CHARACTER TABULATION");
        assert_eq!(display_name(Some(&ucd), 0xE000), "(unknown)");
        assert_eq!(display_name(None, 0x41), "(unknown)");
    }
}
