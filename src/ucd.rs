//! Loaders for the Unicode Character Database source files.
//!
//! Three files feed the classification engine: `UnicodeData.txt` (one
//! 15-field record per code point, with `First`/`Last` pairs standing for
//! whole ranges), `DerivedCoreProperties.txt` (named properties per code
//! point or range) and `EastAsianWidth.txt` (width tags per code point or
//! range). Everything is expanded to per-code-point entries up front; the
//! classifier only ever asks about one code point at a time.

use std::collections::BTreeMap;
use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::str::FromStr;

use anyhow::{bail, Context, Result};

/// The Unicode general category, as the two-letter tag of field 2 of
/// `UnicodeData.txt`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(clippy::upper_case_acronyms)]
pub enum Category {
    Lu, Ll, Lt, Lm, Lo,
    Mn, Mc, Me,
    Nd, Nl, No,
    Pc, Pd, Ps, Pe, Pi, Pf, Po,
    Sm, Sc, Sk, So,
    Zs, Zl, Zp,
    Cc, Cf, Cs, Co,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Lu => "Lu", Category::Ll => "Ll", Category::Lt => "Lt",
            Category::Lm => "Lm", Category::Lo => "Lo",
            Category::Mn => "Mn", Category::Mc => "Mc", Category::Me => "Me",
            Category::Nd => "Nd", Category::Nl => "Nl", Category::No => "No",
            Category::Pc => "Pc", Category::Pd => "Pd", Category::Ps => "Ps",
            Category::Pe => "Pe", Category::Pi => "Pi", Category::Pf => "Pf",
            Category::Po => "Po",
            Category::Sm => "Sm", Category::Sc => "Sc", Category::Sk => "Sk",
            Category::So => "So",
            Category::Zs => "Zs", Category::Zl => "Zl", Category::Zp => "Zp",
            Category::Cc => "Cc", Category::Cf => "Cf", Category::Cs => "Cs",
            Category::Co => "Co",
        }
    }

    /// Mn, Mc and Me. Since Unicode 3.1 this union is the definition of the
    /// "combining" class; the PropList property of that name is gone.
    pub fn is_combining(&self) -> bool {
        matches!(self, Category::Mn | Category::Mc | Category::Me)
    }
}

impl FromStr for Category {
    type Err = anyhow::Error;

    fn from_str(tag: &str) -> Result<Category> {
        Ok(match tag {
            "Lu" => Category::Lu, "Ll" => Category::Ll, "Lt" => Category::Lt,
            "Lm" => Category::Lm, "Lo" => Category::Lo,
            "Mn" => Category::Mn, "Mc" => Category::Mc, "Me" => Category::Me,
            "Nd" => Category::Nd, "Nl" => Category::Nl, "No" => Category::No,
            "Pc" => Category::Pc, "Pd" => Category::Pd, "Ps" => Category::Ps,
            "Pe" => Category::Pe, "Pi" => Category::Pi, "Pf" => Category::Pf,
            "Po" => Category::Po,
            "Sm" => Category::Sm, "Sc" => Category::Sc, "Sk" => Category::Sk,
            "So" => Category::So,
            "Zs" => Category::Zs, "Zl" => Category::Zl, "Zp" => Category::Zp,
            "Cc" => Category::Cc, "Cf" => Category::Cf, "Cs" => Category::Cs,
            "Co" => Category::Co,
            _ => bail!("unknown general category {tag:?}"),
        })
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The attributes of one assigned code point, as read from
/// `UnicodeData.txt`.
#[derive(Debug, Clone)]
pub struct UnicodeRecord {
    pub name: String,
    pub category: Category,
    pub combining_class: u8,
    pub bidi_class: String,
    /// The raw decomposition field. Kept as text because the only question
    /// the classifier asks of it is whether the `<noBreak>` tag is present.
    pub decomposition: String,
    pub upper: Option<u32>,
    pub lower: Option<u32>,
    pub title: Option<u32>,
    /// The Unicode 1.0 name, the only display name the `<control>`
    /// characters have.
    pub unicode1_name: String,
}

fn parse_code_point(hex: &str) -> Result<u32> {
    let code_point = u32::from_str_radix(hex, 16)
        .with_context(|| format!("bad code point {hex:?}"))?;
    if code_point > 0x10FFFF {
        bail!("code point {hex:?} is outside the Unicode range");
    }
    Ok(code_point)
}

fn optional_code_point(field: &str) -> Result<Option<u32>> {
    if field.is_empty() {
        Ok(None)
    } else {
        parse_code_point(field).map(Some)
    }
}

impl UnicodeRecord {
    fn from_fields(fields: &[&str]) -> Result<UnicodeRecord> {
        Ok(UnicodeRecord {
            name: fields[1].to_owned(),
            category: fields[2].parse()?,
            combining_class: fields[3]
                .parse()
                .with_context(|| format!("bad combining class {:?}", fields[3]))?,
            bidi_class: fields[4].to_owned(),
            decomposition: fields[5].to_owned(),
            unicode1_name: fields[10].to_owned(),
            upper: optional_code_point(fields[12])?,
            lower: optional_code_point(fields[13])?,
            title: optional_code_point(fields[14])?,
        })
    }
}

/// The in-memory `UnicodeData.txt` table: one record per assigned code
/// point, in ascending code point order.
#[derive(Debug, Default)]
pub struct UnicodeData {
    records: BTreeMap<u32, UnicodeRecord>,
}

impl UnicodeData {
    pub fn load(path: &Path) -> Result<UnicodeData> {
        let file = File::open(path)
            .with_context(|| format!("cannot open {}", path.display()))?;
        Self::read(BufReader::new(file), &path.display().to_string())
    }

    /// Parse `UnicodeData.txt` records. A line with the wrong field count or
    /// an unpaired `First`/`Last` record is a structural error: the whole
    /// run aborts rather than producing a table with silent holes.
    pub fn read<R: BufRead>(reader: R, origin: &str) -> Result<UnicodeData> {
        let mut records = BTreeMap::new();
        // A `, First>` record opens a range that the next record must close.
        let mut open_range: Option<u32> = None;
        for (index, line) in reader.lines().enumerate() {
            let line = line.with_context(|| format!("read error in {origin}"))?;
            if line.is_empty() {
                continue;
            }
            let lineno = index + 1;
            let fields: Vec<&str> = line.split(';').collect();
            if fields.len() != 15 {
                bail!("{origin}:{lineno}: expected 15 fields, found {}", fields.len());
            }
            let code_point = parse_code_point(fields[0])
                .with_context(|| format!("{origin}:{lineno}"))?;
            let record = UnicodeRecord::from_fields(&fields)
                .with_context(|| format!("{origin}:{lineno}"))?;
            if fields[1].ends_with(", First>") {
                if open_range.is_some() {
                    bail!("{origin}:{lineno}: range started inside an open range");
                }
                open_range = Some(code_point);
            } else if fields[1].ends_with(", Last>") {
                let Some(first) = open_range.take() else {
                    bail!("{origin}:{lineno}: range end without a matching start");
                };
                if first > code_point {
                    bail!("{origin}:{lineno}: range ends before it starts");
                }
                // every code point in the range takes the closing record's
                // attributes, under the range's bare name
                let name = range_name(fields[1]);
                for point in first..=code_point {
                    records.insert(
                        point,
                        UnicodeRecord { name: name.to_owned(), ..record.clone() },
                    );
                }
            } else {
                if open_range.is_some() {
                    bail!("{origin}:{lineno}: range start not followed by its end");
                }
                records.insert(code_point, record);
            }
        }
        if open_range.is_some() {
            bail!("{origin}: unterminated range at end of file");
        }
        Ok(UnicodeData { records })
    }

    pub fn get(&self, code_point: u32) -> Option<&UnicodeRecord> {
        self.records.get(&code_point)
    }

    /// All records in ascending code point order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, &UnicodeRecord)> {
        self.records.iter().map(|(&cp, record)| (cp, record))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// `<CJK Ideograph Extension A, First>` → `CJK Ideograph Extension A`.
fn range_name(marker: &str) -> &str {
    let bare = marker.split(',').next().unwrap_or(marker);
    bare.strip_prefix('<').unwrap_or(bare)
}

/// Strip a `#` comment and surrounding whitespace; `None` when nothing is
/// left.
fn data_line(line: &str) -> Option<&str> {
    let line = match line.split_once('#') {
        Some((data, _)) => data,
        None => line,
    }
    .trim();
    (!line.is_empty()).then_some(line)
}

/// `0AD0` or `0AD0..0AD5` → the inclusive range it denotes. Lines that do
/// not start with a code point (prose in the file headers) yield `None`.
fn parse_span(text: &str) -> Option<(u32, u32)> {
    let (first, last) = match text.split_once("..") {
        Some((first, last)) => (first, last),
        None => (text, text),
    };
    let first = u32::from_str_radix(first.trim(), 16).ok()?;
    let last = u32::from_str_radix(last.trim(), 16).ok()?;
    (first <= last && last <= 0x10FFFF).then_some((first, last))
}

/// The named properties of `DerivedCoreProperties.txt`, expanded per code
/// point. Used to classify scripts whose case behavior the simple mappings
/// of `UnicodeData.txt` do not capture.
#[derive(Debug, Default)]
pub struct DerivedProperties {
    properties: BTreeMap<u32, Vec<String>>,
}

impl DerivedProperties {
    pub fn load(path: &Path) -> Result<DerivedProperties> {
        let file = File::open(path)
            .with_context(|| format!("cannot open {}", path.display()))?;
        Self::read(BufReader::new(file))
    }

    pub fn read<R: BufRead>(reader: R) -> Result<DerivedProperties> {
        let mut properties: BTreeMap<u32, Vec<String>> = BTreeMap::new();
        for line in reader.lines() {
            let line = line?;
            let Some(data) = data_line(&line) else { continue };
            let Some((span, property)) = data.split_once(';') else { continue };
            let Some((first, last)) = parse_span(span) else { continue };
            let Some(property) = property.split_whitespace().next() else { continue };
            for code_point in first..=last {
                properties.entry(code_point).or_default().push(property.to_owned());
            }
        }
        Ok(DerivedProperties { properties })
    }

    pub fn has(&self, code_point: u32, property: &str) -> bool {
        self.properties
            .get(&code_point)
            .is_some_and(|props| props.iter().any(|p| p == property))
    }
}

/// An `EastAsianWidth.txt` width tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WidthTag {
    Ambiguous,
    Fullwidth,
    Halfwidth,
    Narrow,
    Neutral,
    Wide,
}

impl FromStr for WidthTag {
    type Err = anyhow::Error;

    fn from_str(tag: &str) -> Result<WidthTag> {
        Ok(match tag {
            "A" => WidthTag::Ambiguous,
            "F" => WidthTag::Fullwidth,
            "H" => WidthTag::Halfwidth,
            "Na" => WidthTag::Narrow,
            "N" => WidthTag::Neutral,
            "W" => WidthTag::Wide,
            _ => bail!("unknown East Asian width tag {tag:?}"),
        })
    }
}

/// Per-code-point East Asian width tags. Only the wide/fullwidth entries
/// change anything downstream, but the whole table is kept so the charmap
/// tooling can ask about any tag.
#[derive(Debug, Default)]
pub struct EastAsianWidths {
    tags: BTreeMap<u32, WidthTag>,
}

impl EastAsianWidths {
    pub fn load(path: &Path) -> Result<EastAsianWidths> {
        let file = File::open(path)
            .with_context(|| format!("cannot open {}", path.display()))?;
        Self::read(BufReader::new(file))
    }

    pub fn read<R: BufRead>(reader: R) -> Result<EastAsianWidths> {
        let mut tags = BTreeMap::new();
        for line in reader.lines() {
            let line = line?;
            // unassigned code points must never leak into width output
            if line.contains("<reserved-") {
                continue;
            }
            let Some(data) = data_line(&line) else { continue };
            let Some((span, tag)) = data.split_once(';') else { continue };
            let Some((first, last)) = parse_span(span) else { continue };
            let Some(tag) = tag.split_whitespace().next() else { continue };
            let Ok(tag) = tag.parse::<WidthTag>() else { continue };
            for code_point in first..=last {
                tags.insert(code_point, tag);
            }
        }
        Ok(EastAsianWidths { tags })
    }

    pub fn get(&self, code_point: u32) -> Option<WidthTag> {
        self.tags.get(&code_point).copied()
    }

    pub fn is_wide(&self, code_point: u32) -> bool {
        matches!(self.get(code_point), Some(WidthTag::Wide | WidthTag::Fullwidth))
    }
}
