//! The `LC_CTYPE` locale definition format, in both directions.
//!
//! [`write_ctype`] drives the classifier over every assigned code point and
//! serializes the class and mapping sections in the fixed order the i18n
//! FDCC-set uses. [`CtypeTables`] is the inverse: a parse of an existing
//! locale definition file into per-class code point sets and mapping tables,
//! which is what the compatibility report works on.

use std::collections::{BTreeMap, BTreeSet};
use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::Path;

use anyhow::{Context, Result};

use crate::classify::Classifier;
use crate::ranges::{self, compress};

/// The class keywords of an `LC_CTYPE` body, in the order the generated
/// file emits them. `combining` and `combining_level3` appear in source as
/// `class "..."` headers.
pub const CLASS_NAMES: &[&str] = &[
    "upper", "lower", "alpha", "digit", "space", "cntrl", "punct", "graph",
    "print", "xdigit", "blank", "combining", "combining_level3",
];

/// The mapping table names; `totitle` appears in source as `map "totitle";`.
pub const MAP_NAMES: &[&str] = &["toupper", "tolower", "totitle"];

/// Write the complete locale definition: identification block, then the
/// `LC_CTYPE` category with its class lists, mapping tables and combining
/// classes.
pub fn write_ctype<W: Write>(
    out: &mut W,
    classifier: &Classifier<'_>,
    unicode_version: &str,
    date: &str,
) -> io::Result<()> {
    let assigned: Vec<u32> = classifier.unicode_data().iter().map(|(cp, _)| cp).collect();
    let class = |predicate: &dyn Fn(u32) -> bool| {
        compress(&assigned.iter().copied().filter(|&cp| predicate(cp)).collect::<Vec<u32>>())
    };
    let mapping = |map: &dyn Fn(u32) -> u32| {
        assigned
            .iter()
            .filter_map(|&cp| {
                let to = map(cp);
                // identity mappings are implicit and never written out
                (to != cp).then_some((cp, to))
            })
            .collect::<Vec<(u32, u32)>>()
    };

    writeln!(out, "escape_char /")?;
    writeln!(out, "comment_char %")?;
    writeln!(out)?;
    writeln!(
        out,
        "% Generated automatically by gen-ctype for Unicode {unicode_version}."
    )?;
    writeln!(out)?;
    writeln!(out, "LC_IDENTIFICATION")?;
    writeln!(out, "title     \"Unicode {unicode_version} FDCC-set\"")?;
    writeln!(out, "source    \"UnicodeData.txt, DerivedCoreProperties.txt\"")?;
    writeln!(out, "address   \"\"")?;
    writeln!(out, "contact   \"\"")?;
    writeln!(out, "email     \"\"")?;
    writeln!(out, "tel       \"\"")?;
    writeln!(out, "fax       \"\"")?;
    writeln!(out, "language  \"\"")?;
    writeln!(out, "territory \"Earth\"")?;
    writeln!(out, "revision  \"{unicode_version}\"")?;
    writeln!(out, "date      \"{date}\"")?;
    writeln!(out, "category  \"unicode:2014\";LC_CTYPE")?;
    writeln!(out, "END LC_IDENTIFICATION")?;
    writeln!(out)?;
    writeln!(out, "LC_CTYPE")?;
    writeln!(out, "% The following is the 14652 i18n fdcc-set LC_CTYPE category.")?;
    writeln!(out, "% It covers Unicode version {unicode_version}.")?;
    writeln!(out, "% The character classes and mapping tables were automatically")?;
    writeln!(out, "% generated using the gen-ctype program.")?;

    writeln!(out)?;
    writeln!(out, "% The \"upper\" class reflects the uppercase characters of class \"alpha\"")?;
    ranges::write_charclass(out, "upper", &class(&|cp| classifier.is_upper(cp)))?;

    writeln!(out)?;
    writeln!(out, "% The \"lower\" class reflects the lowercase characters of class \"alpha\"")?;
    ranges::write_charclass(out, "lower", &class(&|cp| classifier.is_lower(cp)))?;

    writeln!(out)?;
    writeln!(out, "% The \"alpha\" class of the \"i18n\" FDCC-set is reflecting")?;
    writeln!(out, "% the recommendations in TR 10176 annex A")?;
    ranges::write_charclass(out, "alpha", &class(&|cp| classifier.is_alpha(cp)))?;

    writeln!(out)?;
    writeln!(out, "% The \"digit\" class must only contain the BASIC LATIN digits, says ISO C 99")?;
    writeln!(out, "% (sections 7.25.2.1.5 and 5.2.1).")?;
    ranges::write_charclass(out, "digit", &class(&|cp| classifier.is_digit(cp)))?;

    // localedef fills in "outdigit" on its own; defining it here would stop
    // locales copying this file from overriding it
    writeln!(out)?;
    writeln!(out, "% The \"outdigit\" information is by default \"0\" to \"9\".  We don't have to")?;
    writeln!(out, "% provide it here since localedef will fill in the bits and it would")?;
    writeln!(out, "% prevent locales copying this file define their own values.")?;
    writeln!(out, "% outdigit /")?;
    writeln!(out, "%    <U0030>..<U0039>")?;

    writeln!(out)?;
    ranges::write_charclass(out, "space", &class(&|cp| classifier.is_space(cp)))?;

    writeln!(out)?;
    ranges::write_charclass(out, "cntrl", &class(&|cp| classifier.is_cntrl(cp)))?;

    writeln!(out)?;
    ranges::write_charclass(out, "punct", &class(&|cp| classifier.is_punct(cp)))?;

    writeln!(out)?;
    ranges::write_charclass(out, "graph", &class(&|cp| classifier.is_graph(cp)))?;

    writeln!(out)?;
    ranges::write_charclass(out, "print", &class(&|cp| classifier.is_print(cp)))?;

    writeln!(out)?;
    writeln!(out, "% The \"xdigit\" class must only contain the BASIC LATIN digits and A-F, a-f,")?;
    writeln!(out, "% says ISO C 99 (sections 7.25.2.1.12 and 6.4.4.1).")?;
    ranges::write_charclass(out, "xdigit", &class(&|cp| classifier.is_xdigit(cp)))?;

    writeln!(out)?;
    ranges::write_charclass(out, "blank", &class(&|cp| classifier.is_blank(cp)))?;

    writeln!(out)?;
    ranges::write_pairs(out, "toupper", &mapping(&|cp| classifier.to_upper(cp)))?;

    writeln!(out)?;
    ranges::write_pairs(out, "tolower", &mapping(&|cp| classifier.to_lower(cp)))?;

    writeln!(out)?;
    ranges::write_pairs(out, "map \"totitle\";", &mapping(&|cp| classifier.to_title(cp)))?;

    writeln!(out)?;
    writeln!(out, "% The \"combining\" class reflects ISO/IEC 10646-1 annex B.1")?;
    writeln!(out, "% That is, all combining characters (level 2+3).")?;
    ranges::write_charclass(
        out,
        "class \"combining\";",
        &class(&|cp| classifier.is_combining(cp)),
    )?;

    writeln!(out)?;
    writeln!(out, "% The \"combining_level3\" class reflects ISO/IEC 10646-1 annex B.2")?;
    writeln!(out, "% That is, combining characters of level 3.")?;
    ranges::write_charclass(
        out,
        "class \"combining_level3\";",
        &class(&|cp| classifier.is_combining_level3(cp)),
    )?;

    writeln!(out, "END LC_CTYPE")?;
    Ok(())
}

/// The character classes and case mapping tables of one parsed locale
/// definition file.
#[derive(Debug, Default)]
pub struct CtypeTables {
    pub classes: BTreeMap<String, BTreeSet<u32>>,
    pub maps: BTreeMap<String, BTreeMap<u32, u32>>,
}

enum Section {
    Class(String),
    Map(String),
}

impl CtypeTables {
    pub fn load(path: &Path) -> Result<CtypeTables> {
        let file = File::open(path)
            .with_context(|| format!("cannot open {}", path.display()))?;
        Self::read(BufReader::new(file))
    }

    /// Scan a locale definition file for class and mapping sections.
    ///
    /// A section starts at a header line (a bare keyword, or a
    /// `class "..."` / `map "..."` form) and runs while its lines carry the
    /// trailing `/` continuation; a blank line also ends it. `%` comment
    /// lines inside a section are skipped without ending it. Everything
    /// between sections, including `LC_IDENTIFICATION` prose, is ignored.
    pub fn read<R: BufRead>(reader: R) -> Result<CtypeTables> {
        let mut tables = CtypeTables::default();
        let mut section: Option<Section> = None;
        for line in reader.lines() {
            let line = line?;
            let trimmed = line.trim();
            if let Some(active) = &section {
                if trimmed.is_empty() {
                    section = None;
                    continue;
                }
                if trimmed.starts_with('%') {
                    continue;
                }
                tables.add_tokens(active, trimmed);
                if !trimmed.ends_with('/') {
                    section = None;
                }
                continue;
            }
            if trimmed.is_empty() || trimmed.starts_with('%') {
                continue;
            }
            let (keyword, rest) = match trimmed.split_once(char::is_whitespace) {
                Some((keyword, rest)) => (keyword, rest.trim()),
                None => (trimmed, ""),
            };
            let opened = match keyword {
                "class" => quoted_name(rest).map(|(name, rest)| (Section::Class(name), rest)),
                "map" => quoted_name(rest).map(|(name, rest)| (Section::Map(name), rest)),
                "toupper" | "tolower" | "totitle" => {
                    Some((Section::Map(keyword.to_owned()), rest))
                }
                name if CLASS_NAMES.contains(&name) => {
                    Some((Section::Class(name.to_owned()), rest))
                }
                _ => None,
            };
            if let Some((new_section, rest)) = opened {
                // make the section visible even if its body turns out empty
                match &new_section {
                    Section::Class(name) => {
                        tables.classes.entry(name.clone()).or_default();
                    }
                    Section::Map(name) => {
                        tables.maps.entry(name.clone()).or_default();
                    }
                }
                if !rest.is_empty() {
                    tables.add_tokens(&new_section, rest);
                }
                if rest.ends_with('/') || rest.is_empty() {
                    section = Some(new_section);
                }
            }
        }
        Ok(tables)
    }

    fn add_tokens(&mut self, section: &Section, fragment: &str) {
        let body = fragment.trim_end_matches('/');
        match section {
            Section::Class(name) => {
                self.classes
                    .entry(name.clone())
                    .or_default()
                    .extend(ranges::expand(body));
            }
            Section::Map(name) => {
                self.maps
                    .entry(name.clone())
                    .or_default()
                    .extend(ranges::expand_pairs(body));
            }
        }
    }

    pub fn class(&self, name: &str) -> Option<&BTreeSet<u32>> {
        self.classes.get(name)
    }

    pub fn map(&self, name: &str) -> Option<&BTreeMap<u32, u32>> {
        self.maps.get(name)
    }
}

/// `"combining"; /` → the quoted name and what follows the `;`.
fn quoted_name(rest: &str) -> Option<(String, &str)> {
    let inner = rest.strip_prefix('"')?;
    let (name, after) = inner.split_once('"')?;
    let after = after.strip_prefix(';').unwrap_or(after).trim();
    Some((name.to_owned(), after))
}
