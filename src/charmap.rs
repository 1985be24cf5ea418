//! The UTF-8 `CHARMAP`/`WIDTH` charmap artifact.
//!
//! A charmap file maps every coded character to its UTF-8 byte sequence in
//! `/xHH` notation, followed by a `WIDTH` table for the code points whose
//! display width is not the default 1. Surrogates get entries too (so the
//! compatibility tooling can line files up) but commented out, since they
//! are not characters.

use std::collections::BTreeMap;
use std::io::{self, BufRead, Write};

use anyhow::Result;

use crate::classify;
use crate::ranges::{parse_ucs_symbol, ucs_symbol};
use crate::ucd::{Category, EastAsianWidths, UnicodeData, UnicodeRecord};

/// Ranged records are emitted in blocks of this many code points, all
/// sharing the byte sequence of the block start.
const RANGE_BLOCK: u32 = 64;

/// UTF-8-encode an arbitrary code point, surrogates included. `char` cannot
/// represent surrogates, but the charmap keeps (commented) entries for them,
/// so the bit layout is spelled out here.
fn utf8_bytes(code_point: u32) -> Vec<u8> {
    match code_point {
        0..=0x7F => vec![code_point as u8],
        0x80..=0x7FF => vec![
            0xC0 | (code_point >> 6) as u8,
            0x80 | (code_point & 0x3F) as u8,
        ],
        0x800..=0xFFFF => vec![
            0xE0 | (code_point >> 12) as u8,
            0x80 | ((code_point >> 6) & 0x3F) as u8,
            0x80 | (code_point & 0x3F) as u8,
        ],
        _ => vec![
            0xF0 | (code_point >> 18) as u8,
            0x80 | ((code_point >> 12) & 0x3F) as u8,
            0x80 | ((code_point >> 6) & 0x3F) as u8,
            0x80 | (code_point & 0x3F) as u8,
        ],
    }
}

/// `/xe3/x90/x80` notation for a byte sequence.
fn hex_notation(bytes: &[u8]) -> String {
    bytes.iter().map(|byte| format!("/x{byte:02x}")).collect()
}

fn display_name(record: &UnicodeRecord) -> &str {
    // a few controls (U+0080, U+0081, ...) have no Unicode 1.0 name either;
    // those keep the <control> placeholder
    if record.name == "<control>" && !record.unicode1_name.is_empty() {
        &record.unicode1_name
    } else {
        &record.name
    }
}

/// Write the complete charmap file: header block, `CHARMAP` section and the
/// `WIDTH` table.
pub fn write_charmap<W: Write>(
    out: &mut W,
    ucd: &UnicodeData,
    widths: &EastAsianWidths,
    unicode_version: &str,
) -> io::Result<()> {
    writeln!(out, "% Charmap for Unicode {unicode_version}, generated by gen-charmap")?;
    writeln!(out, "<code_set_name> UTF-8")?;
    writeln!(out, "<comment_char> %")?;
    writeln!(out, "<escape_char> /")?;
    writeln!(out, "<mb_cur_min> 1")?;
    writeln!(out, "<mb_cur_max> 6")?;
    writeln!(out)?;
    writeln!(out, "% alias ISO-10646/UTF-8")?;
    writeln!(out, "CHARMAP")?;
    write_entries(out, ucd)?;
    writeln!(out, "END CHARMAP")?;
    writeln!(out)?;
    write_width(out, ucd, widths)?;
    Ok(())
}

fn write_entries<W: Write>(out: &mut W, ucd: &UnicodeData) -> io::Result<()> {
    let mut records = ucd.iter().peekable();
    while let Some((code_point, record)) = records.next() {
        // expanded First/Last ranges are the only place where consecutive
        // code points share a name; fold them back into range entries
        if record.name != "<control>" {
            let mut end = code_point;
            while let Some(&(next, next_record)) = records.peek() {
                if next == end + 1 && next_record.name == record.name {
                    end = next;
                    records.next();
                } else {
                    break;
                }
            }
            if end > code_point {
                write_range_entry(out, code_point, end, record)?;
                continue;
            }
        }
        let comment = if record.category == Category::Cs { "%" } else { "" };
        writeln!(
            out,
            "{}{}     {}         {}",
            comment,
            ucs_symbol(code_point),
            hex_notation(&utf8_bytes(code_point)),
            display_name(record)
        )?;
    }
    Ok(())
}

/// One line per 64-code-point block, each carrying the byte sequence of the
/// block's first member.
fn write_range_entry<W: Write>(
    out: &mut W,
    first: u32,
    last: u32,
    record: &UnicodeRecord,
) -> io::Result<()> {
    let comment = if record.category == Category::Cs { "%" } else { "" };
    let mut low = first;
    loop {
        let bytes = hex_notation(&utf8_bytes(low));
        let high = if low + RANGE_BLOCK > last { last } else { low + RANGE_BLOCK - 1 };
        writeln!(
            out,
            "{}{}..{}     {}         <{}>",
            comment,
            ucs_symbol(low),
            ucs_symbol(high),
            bytes,
            record.name
        )?;
        if high == last {
            return Ok(());
        }
        low += RANGE_BLOCK;
    }
}

/// The `WIDTH` table: every assigned non-surrogate code point whose width
/// differs from the default 1, as `...`-joined ranges sorted ascending.
pub fn write_width<W: Write>(
    out: &mut W,
    ucd: &UnicodeData,
    widths: &EastAsianWidths,
) -> io::Result<()> {
    fn flush<W: Write>(out: &mut W, start: u32, end: u32, width: u8) -> io::Result<()> {
        if start == end {
            writeln!(out, "{}\t{}", ucs_symbol(start), width)
        } else {
            writeln!(out, "{}...{}\t{}", ucs_symbol(start), ucs_symbol(end), width)
        }
    }

    writeln!(out, "WIDTH")?;
    let mut run: Option<(u32, u32, u8)> = None;
    for (code_point, record) in ucd.iter() {
        if record.category == Category::Cs {
            continue;
        }
        let width = classify::width(ucd, widths, code_point);
        if width == 1 {
            continue;
        }
        run = match run {
            Some((start, end, run_width))
                if code_point == end + 1 && width == run_width =>
            {
                Some((start, code_point, run_width))
            }
            Some((start, end, run_width)) => {
                flush(out, start, end, run_width)?;
                Some((code_point, code_point, width))
            }
            None => Some((code_point, code_point, width)),
        };
    }
    if let Some((start, end, width)) = run {
        flush(out, start, end, width)?;
    }
    writeln!(out, "END WIDTH")?;
    Ok(())
}

/// Parse the `CHARMAP` section of a charmap file into symbol → byte-notation
/// entries. Commented surrogate entries keep their `%` so a report can tell
/// them apart.
pub fn read_charmap<R: BufRead>(reader: R) -> Result<BTreeMap<String, String>> {
    let mut entries = BTreeMap::new();
    let mut in_section = false;
    for line in reader.lines() {
        let line = line?;
        let mut words = line.split_whitespace();
        let Some(first) = words.next() else { continue };
        if !in_section {
            in_section = first == "CHARMAP";
            continue;
        }
        if first == "END" {
            break;
        }
        if let Some(bytes) = words.next() {
            entries.insert(first.to_owned(), bytes.to_owned());
        }
    }
    Ok(entries)
}

/// Parse the `WIDTH` section into per-code-point widths.
pub fn read_width<R: BufRead>(reader: R) -> Result<BTreeMap<u32, u8>> {
    let mut entries = BTreeMap::new();
    let mut in_section = false;
    for line in reader.lines() {
        let line = line?;
        let mut words = line.split_whitespace();
        let Some(first) = words.next() else { continue };
        if !in_section {
            in_section = first == "WIDTH";
            continue;
        }
        if first == "END" {
            break;
        }
        let Some(width) = words.next().and_then(|w| w.parse::<u8>().ok()) else {
            continue;
        };
        let span = match first.split_once("...") {
            Some((start, end)) => {
                let (Some(start), Some(end)) =
                    (parse_ucs_symbol(start), parse_ucs_symbol(end))
                else {
                    continue;
                };
                start..=end
            }
            None => {
                let Some(single) = parse_ucs_symbol(first) else { continue };
                single..=single
            }
        };
        for code_point in span {
            entries.insert(code_point, width);
        }
    }
    Ok(entries)
}

/// Charmap entries of the old file that the new file lost or encodes
/// differently. Surrogate (`%`-commented) entries are not compared.
pub fn compare_charmaps(
    old: &BTreeMap<String, String>,
    new: &BTreeMap<String, String>,
) -> Vec<String> {
    old.iter()
        .filter(|(symbol, bytes)| {
            !symbol.starts_with('%') && new.get(*symbol) != Some(*bytes)
        })
        .map(|(symbol, _)| symbol.clone())
        .collect()
}

/// Width assignments present on one side only.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct WidthDiff {
    pub missing: Vec<(u32, u8)>,
    pub added: Vec<(u32, u8)>,
}

pub fn compare_widths(old: &BTreeMap<u32, u8>, new: &BTreeMap<u32, u8>) -> WidthDiff {
    WidthDiff {
        missing: old
            .iter()
            .filter(|(cp, width)| new.get(cp) != Some(width))
            .map(|(&cp, &width)| (cp, width))
            .collect(),
        added: new
            .iter()
            .filter(|(cp, width)| old.get(cp) != Some(width))
            .map(|(&cp, &width)| (cp, width))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const UNICODE_DATA: &str = "\
0041;LATIN CAPITAL LETTER A;Lu;0;L;;;;;N;;;;0061;
0084;<control>;Cc;0;BN;;;;;N;;;;;
009F;<control>;Cc;0;BN;;;;;N;APPLICATION PROGRAM COMMAND;;;;
0300;COMBINING GRAVE ACCENT;Mn;230;NSM;;;;;Y;NON-SPACING GRAVE;;;;
0301;COMBINING ACUTE ACCENT;Mn;230;NSM;;;;;Y;NON-SPACING ACUTE;;;;
200D;ZERO WIDTH JOINER;Cf;0;BN;;;;;N;;;;;
3400;<CJK Ideograph Extension A, First>;Lo;0;L;;;;;N;;;;;
34D0;<CJK Ideograph Extension A, Last>;Lo;0;L;;;;;N;;;;;
D800;<Non Private Use High Surrogate, First>;Cs;0;L;;;;;N;;;;;
D80F;<Non Private Use High Surrogate, Last>;Cs;0;L;;;;;N;;;;;
10330;GOTHIC LETTER AHSA;Lo;0;L;;;;;N;;;;;
";

    const EAW: &str = "\
3400..34D0;W     # Lo   CJK UNIFIED IDEOGRAPH-3400..
34D1..34FF;W     # Cn   <reserved-34D1>..<reserved-34FF>
";

    fn stores() -> (UnicodeData, EastAsianWidths) {
        let ucd = UnicodeData::read(Cursor::new(UNICODE_DATA), "test").unwrap();
        let widths = EastAsianWidths::read(Cursor::new(EAW)).unwrap();
        (ucd, widths)
    }

    fn generated() -> String {
        let (ucd, widths) = stores();
        let mut out = Vec::new();
        write_charmap(&mut out, &ucd, &widths, "14.0.0").unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn utf8_encoding_matches_the_bit_layout() {
        assert_eq!(utf8_bytes(0x41), vec![0x41]);
        assert_eq!(utf8_bytes(0xDF), vec![0xC3, 0x9F]);
        assert_eq!(utf8_bytes(0x3400), vec![0xE3, 0x90, 0x80]);
        assert_eq!(utf8_bytes(0x10330), vec![0xF0, 0x90, 0x8C, 0xB0]);
        // surrogates encode like any other scalar here
        assert_eq!(utf8_bytes(0xD800), vec![0xED, 0xA0, 0x80]);
        assert_eq!(hex_notation(&utf8_bytes(0x3400)), "/xe3/x90/x80");
    }

    #[test]
    fn charmap_entries() {
        let text = generated();
        assert!(text.contains("<U0041>     /x41         LATIN CAPITAL LETTER A"));
        // controls fall back to the Unicode 1.0 name, or keep <control>
        assert!(text.contains("<U009F>     /xc2/x9f         APPLICATION PROGRAM COMMAND"));
        assert!(text.contains("<U0084>     /xc2/x84         <control>"));
        assert!(text.contains("<U00010330>     /xf0/x90/x8c/xb0         GOTHIC LETTER AHSA"));
    }

    #[test]
    fn ranged_records_are_split_into_blocks() {
        let text = generated();
        assert!(text.contains(
            "<U3400>..<U343F>     /xe3/x90/x80         <CJK Ideograph Extension A>"
        ));
        assert!(text.contains(
            "<U3440>..<U347F>     /xe3/x91/x80         <CJK Ideograph Extension A>"
        ));
        // the final block is cut short at the range end
        assert!(text.contains(
            "<U34C0>..<U34D0>     /xe3/x93/x80         <CJK Ideograph Extension A>"
        ));
        assert!(!text.contains("<U34D1>"));
    }

    #[test]
    fn surrogate_entries_are_commented() {
        let text = generated();
        assert!(text.contains(
            "%<UD800>..<UD80F>     /xed/xa0/x80         <Non Private Use High Surrogate>"
        ));
    }

    #[test]
    fn width_section_lists_only_non_default_widths() {
        let text = generated();
        let width_part = text.split("WIDTH\n").nth(1).unwrap();
        assert!(width_part.contains("<U0300>...<U0301>\t0"));
        assert!(width_part.contains("<U200D>\t0"));
        assert!(width_part.contains("<U3400>...<U34D0>\t2"));
        // width-1 characters are implicit
        assert!(!width_part.contains("<U0041>"));
        // surrogates never appear in WIDTH
        assert!(!width_part.contains("<UD800>"));
    }

    #[test]
    fn charmap_round_trips_through_the_parser() {
        let text = generated();
        let entries = read_charmap(Cursor::new(&text)).unwrap();
        assert_eq!(entries.get("<U0041>").map(String::as_str), Some("/x41"));
        assert_eq!(
            entries.get("<U3400>..<U343F>").map(String::as_str),
            Some("/xe3/x90/x80")
        );
        assert!(entries.contains_key("%<UD800>..<UD80F>"));

        let widths = read_width(Cursor::new(&text)).unwrap();
        assert_eq!(widths.get(&0x300), Some(&0));
        assert_eq!(widths.get(&0x301), Some(&0));
        assert_eq!(widths.get(&0x3400), Some(&2));
        assert_eq!(widths.get(&0x34D0), Some(&2));
        assert_eq!(widths.get(&0x41), None);
    }

    #[test]
    fn charmap_comparison_flags_lost_and_changed_entries() {
        let old: BTreeMap<String, String> = [
            ("<U0041>", "/x41"),
            ("<U0042>", "/x42"),
            ("%<UD800>", "/xed/xa0/x80"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_owned(), v.to_owned()))
        .collect();
        let mut new = old.clone();
        new.remove("%<UD800>");
        new.insert("<U0042>".to_owned(), "/xff".to_owned());
        let flagged = compare_charmaps(&old, &new);
        // the surrogate entry is exempt, the changed entry is not
        assert_eq!(flagged, vec!["<U0042>".to_owned()]);
    }

    #[test]
    fn width_comparison_reports_both_directions() {
        let old: BTreeMap<u32, u8> = [(0x300, 0), (0x3400, 2)].into_iter().collect();
        let new: BTreeMap<u32, u8> = [(0x300, 0), (0x3400, 0), (0xFF01, 2)].into_iter().collect();
        let diff = compare_widths(&old, &new);
        assert_eq!(diff.missing, vec![(0x3400, 2)]);
        assert_eq!(diff.added, vec![(0x3400, 0), (0xFF01, 2)]);
    }
}
