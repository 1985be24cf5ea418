//! The run-length code point range notation used by locale definition files.
//!
//! Character class sections in `LC_CTYPE` encode their members as
//! `;`-separated tokens: a single code point `<U0041>`, a contiguous range
//! `<U0041>..<U005A>`, a stepped range `<U0100>..(2)..<U012E>` covering every
//! second code point, or a mapping pair `(<U0041>,<U0061>)` in the case
//! tables. This module converts between sorted code point sequences and that
//! notation in both directions.

use std::fmt;
use std::io::{self, Write};

/// No generated line may grow past this column; longer entries are split
/// with a `/` continuation.
const MAX_COLUMN: usize = 75;

/// Indentation of continuation lines in a section body.
const PREFIX: &str = "   ";

/// Render a code point in the UCS symbol form used by locale files:
/// four hex digits below the BMP limit, eight above it.
pub fn ucs_symbol(code_point: u32) -> String {
    if code_point < 0x10000 {
        format!("<U{code_point:04X}>")
    } else {
        format!("<U{code_point:08X}>")
    }
}

/// A maximal run of code points sharing one class membership.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodePointRange {
    pub low: u32,
    pub high: u32,
    /// Either 1 (contiguous) or 2 (alternating, as in the cased Latin
    /// blocks where upper and lower case interleave).
    pub step: u32,
}

impl CodePointRange {
    pub fn single(code_point: u32) -> Self {
        CodePointRange { low: code_point, high: code_point, step: 1 }
    }

    /// The code points the range stands for, in ascending order.
    pub fn code_points(&self) -> impl Iterator<Item = u32> {
        (self.low..=self.high).step_by(self.step as usize)
    }
}

impl fmt::Display for CodePointRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.low == self.high {
            write!(f, "{}", ucs_symbol(self.low))
        } else if self.step == 1 {
            write!(f, "{}..{}", ucs_symbol(self.low), ucs_symbol(self.high))
        } else {
            write!(f, "{}..(2)..{}", ucs_symbol(self.low), ucs_symbol(self.high))
        }
    }
}

/// Group a sorted, duplicate-free code point sequence into maximal runs.
///
/// Contiguous runs are preferred; a stepped run is only formed when at least
/// three code points alternate, so isolated gap-of-two pairs keep the plain
/// single-point notation the generators have always used.
pub fn compress(code_points: &[u32]) -> Vec<CodePointRange> {
    let mut ranges = Vec::new();
    let mut i = 0;
    while i < code_points.len() {
        let low = code_points[i];
        let mut j = i;
        while j + 1 < code_points.len() && code_points[j + 1] == code_points[j] + 1 {
            j += 1;
        }
        if j > i {
            ranges.push(CodePointRange { low, high: code_points[j], step: 1 });
            i = j + 1;
            continue;
        }
        let mut k = i;
        while k + 1 < code_points.len() && code_points[k + 1] == code_points[k] + 2 {
            k += 1;
        }
        if k - i >= 2 {
            ranges.push(CodePointRange { low, high: code_points[k], step: 2 });
            i = k + 1;
            continue;
        }
        ranges.push(CodePointRange::single(low));
        i += 1;
    }
    ranges
}

/// One token of a class or mapping section body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    Single(u32),
    Range(u32, u32),
    Stepped(u32, u32),
    Pair(u32, u32),
}

/// Parse a UCS symbol back into its code point. `None` for anything that
/// is not a well-formed `<Uhhhh>` token.
pub fn parse_ucs_symbol(text: &str) -> Option<u32> {
    let hex = text.trim().strip_prefix("<U")?.strip_suffix('>')?;
    let code_point = u32::from_str_radix(hex, 16).ok()?;
    (code_point <= 0x10FFFF).then_some(code_point)
}

impl Token {
    /// Match one token against the four recognized shapes. `None` means the
    /// token is noise; hand-edited locale files contain stray text that a
    /// scan must step over rather than abort on.
    pub fn parse(token: &str) -> Option<Token> {
        let token = token.trim();
        if let Some(body) = token.strip_prefix('(').and_then(|t| t.strip_suffix(')')) {
            let (from, to) = body.split_once(',')?;
            return Some(Token::Pair(parse_ucs_symbol(from)?, parse_ucs_symbol(to)?));
        }
        let parts: Vec<&str> = token.split("..").collect();
        match parts.as_slice() {
            [single] => Some(Token::Single(parse_ucs_symbol(single)?)),
            [low, high] => {
                let (low, high) = (parse_ucs_symbol(low)?, parse_ucs_symbol(high)?);
                (low <= high).then_some(Token::Range(low, high))
            }
            [low, "(2)", high] => {
                let (low, high) = (parse_ucs_symbol(low)?, parse_ucs_symbol(high)?);
                (low <= high).then_some(Token::Stepped(low, high))
            }
            _ => None,
        }
    }
}

/// Expand the class tokens of one logical line into individual code points.
/// Mapping pairs and unrecognized tokens are skipped.
pub fn expand(line: &str) -> Vec<u32> {
    let mut code_points = Vec::new();
    for token in line.split(';') {
        match Token::parse(token) {
            Some(Token::Single(cp)) => code_points.push(cp),
            Some(Token::Range(low, high)) => code_points.extend(low..=high),
            Some(Token::Stepped(low, high)) => code_points.extend((low..=high).step_by(2)),
            Some(Token::Pair(..)) | None => {}
        }
    }
    code_points
}

/// Expand the mapping-pair tokens of one logical line. Everything that is
/// not a pair is skipped.
pub fn expand_pairs(line: &str) -> Vec<(u32, u32)> {
    line.split(';')
        .filter_map(|token| match Token::parse(token) {
            Some(Token::Pair(from, to)) => Some((from, to)),
            _ => None,
        })
        .collect()
}

/// Write a character class section: the heading, then the ranges joined
/// with `;`, wrapped with `/` continuations at the fixed column width.
/// An empty class writes nothing at all.
pub fn write_charclass<W: Write>(
    out: &mut W,
    heading: &str,
    ranges: &[CodePointRange],
) -> io::Result<()> {
    if ranges.is_empty() {
        return Ok(());
    }
    writeln!(out, "{heading} /")?;
    let mut line = String::from(PREFIX);
    for range in ranges {
        if !line.trim().is_empty() {
            line.push(';');
        }
        let text = range.to_string();
        if line.len() + text.len() > MAX_COLUMN {
            writeln!(out, "{line}/")?;
            line = String::from(PREFIX);
        }
        line.push_str(&text);
    }
    if !line.trim().is_empty() {
        writeln!(out, "{line}")?;
    }
    Ok(())
}

/// Write a case mapping section in `(<Ufrom>,<Uto>)` pair notation with the
/// same wrapping rules as [`write_charclass`]. The heading is written even
/// when there are no pairs.
pub fn write_pairs<W: Write>(
    out: &mut W,
    heading: &str,
    pairs: &[(u32, u32)],
) -> io::Result<()> {
    writeln!(out, "{heading} /")?;
    let mut line = String::from(PREFIX);
    for &(from, to) in pairs {
        if !line.trim().is_empty() {
            line.push(';');
        }
        let text = format!("({},{})", ucs_symbol(from), ucs_symbol(to));
        if line.len() + text.len() > MAX_COLUMN {
            writeln!(out, "{line}/")?;
            line = String::from(PREFIX);
        }
        line.push_str(&text);
    }
    if !line.trim().is_empty() {
        writeln!(out, "{line}")?;
    }
    Ok(())
}
