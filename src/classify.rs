//! POSIX character class predicates over a loaded UCD snapshot.
//!
//! Each predicate answers "does this code point belong to this `LC_CTYPE`
//! class" following the ISO C / POSIX locale contract, which deliberately
//! diverges from plain Unicode categories in a few places: `digit` and
//! `xdigit` are restricted to ASCII, non-ASCII decimal digits count as
//! `alpha` so that `iswalnum` accepts them, and U+00A0 NO-BREAK SPACE is
//! not a space.

use tracing::warn;

use crate::ranges::ucs_symbol;
use crate::ucd::{Category, DerivedProperties, EastAsianWidths, UnicodeData, UnicodeRecord};

/// A read-only view over the loaded stores that the predicates consult.
pub struct Classifier<'a> {
    ucd: &'a UnicodeData,
    derived: &'a DerivedProperties,
}

/// One consistency rule broken by one code point. Reported, never fixed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub code_point: u32,
    pub message: String,
}

impl<'a> Classifier<'a> {
    pub fn new(ucd: &'a UnicodeData, derived: &'a DerivedProperties) -> Classifier<'a> {
        Classifier { ucd, derived }
    }

    pub fn unicode_data(&self) -> &'a UnicodeData {
        self.ucd
    }

    /// The record for a code point, with surrogates filtered out: they are
    /// UTF-16 artifacts, not characters, and belong to no class.
    fn record(&self, code_point: u32) -> Option<&UnicodeRecord> {
        self.ucd.get(code_point).filter(|r| r.category != Category::Cs)
    }

    fn is_surrogate(&self, code_point: u32) -> bool {
        self.ucd.get(code_point).is_some_and(|r| r.category == Category::Cs)
    }

    fn derived(&self, code_point: u32, property: &str) -> bool {
        !self.is_surrogate(code_point) && self.derived.has(code_point, property)
    }

    pub fn to_upper(&self, code_point: u32) -> u32 {
        self.record(code_point).and_then(|r| r.upper).unwrap_or(code_point)
    }

    pub fn to_lower(&self, code_point: u32) -> u32 {
        self.record(code_point).and_then(|r| r.lower).unwrap_or(code_point)
    }

    pub fn to_title(&self, code_point: u32) -> u32 {
        self.record(code_point).and_then(|r| r.title).unwrap_or(code_point)
    }

    pub fn is_upper(&self, code_point: u32) -> bool {
        self.to_lower(code_point) != code_point || self.derived(code_point, "Uppercase")
    }

    pub fn is_lower(&self, code_point: u32) -> bool {
        self.to_upper(code_point) != code_point
            // U+00DF LATIN SMALL LETTER SHARP S is lowercase but has no
            // simple uppercase mapping; small capitals are Lowercase in
            // DerivedCoreProperties without any mapping at all
            || code_point == 0x00DF
            || self.derived(code_point, "Lowercase")
    }

    pub fn is_alpha(&self, code_point: u32) -> bool {
        self.derived(code_point, "Alphabetic")
            // Non-ASCII decimal digits count as alphabetic: ISO C 99 keeps
            // them out of "digit" but iswalnum must still accept them
            || (self
                .record(code_point)
                .is_some_and(|r| r.category == Category::Nd)
                && !(0x30..=0x39).contains(&code_point))
    }

    /// ISO C 99 (7.25.2.1.5, 5.2.1) limits "digit" to the ten BASIC LATIN
    /// digits no matter what category the rest of Unicode assigns.
    pub fn is_digit(&self, code_point: u32) -> bool {
        (0x30..=0x39).contains(&code_point)
    }

    pub fn is_outdigit(&self, code_point: u32) -> bool {
        self.is_digit(code_point)
    }

    pub fn is_blank(&self, code_point: u32) -> bool {
        code_point == 0x09
            || self.record(code_point).is_some_and(|r| {
                r.category == Category::Zs && !r.decomposition.contains("<noBreak>")
            })
    }

    pub fn is_space(&self, code_point: u32) -> bool {
        // U+00A0 is not a space: programs are meant to treat a no-break
        // space like punctuation, which the <noBreak> test ensures
        matches!(code_point, 0x20 | 0x0C | 0x0A | 0x0D | 0x09 | 0x0B)
            || self.record(code_point).is_some_and(|r| {
                matches!(r.category, Category::Zl | Category::Zp)
                    || (r.category == Category::Zs
                        && !r.decomposition.contains("<noBreak>"))
            })
    }

    pub fn is_cntrl(&self, code_point: u32) -> bool {
        self.record(code_point).is_some_and(|r| {
            r.name == "<control>" || matches!(r.category, Category::Zl | Category::Zp)
        })
    }

    /// ISO C 99 (7.25.2.1.12, 6.4.4.1) limits "xdigit" to the ASCII
    /// hexadecimal digits.
    pub fn is_xdigit(&self, code_point: u32) -> bool {
        matches!(code_point, 0x30..=0x39 | 0x41..=0x46 | 0x61..=0x66)
    }

    pub fn is_graph(&self, code_point: u32) -> bool {
        self.record(code_point).is_some_and(|r| r.name != "<control>")
            && !self.is_space(code_point)
    }

    pub fn is_print(&self, code_point: u32) -> bool {
        self.record(code_point).is_some_and(|r| {
            r.name != "<control>" && !matches!(r.category, Category::Zl | Category::Zp)
        })
    }

    /// The traditional POSIX reading: every graphic, non-alphanumeric
    /// character is punctuation.
    pub fn is_punct(&self, code_point: u32) -> bool {
        self.is_graph(code_point)
            && !self.is_alpha(code_point)
            && !self.is_digit(code_point)
    }

    pub fn is_combining(&self, code_point: u32) -> bool {
        self.record(code_point).is_some_and(|r| r.category.is_combining())
    }

    /// Combining characters of level 3 per ISO/IEC 10646-1 annex B.2:
    /// combining class below 200.
    pub fn is_combining_level3(&self, code_point: u32) -> bool {
        self.record(code_point)
            .is_some_and(|r| r.category.is_combining() && r.combining_class < 200)
    }

    /// Check the cross-class restrictions the POSIX locale contract puts on
    /// the generated tables. Violations point at quirks in the upstream
    /// Unicode data that a human has to judge; they are logged and returned,
    /// and generation carries on.
    pub fn verify(&self) -> Vec<Violation> {
        let mut violations = Vec::new();
        let mut flag = |code_point: u32, message: String| {
            warn!("{} {}", ucs_symbol(code_point), message);
            violations.push(Violation { code_point, message });
        };
        for (cp, _) in self.ucd.iter() {
            let cased = self.is_lower(cp) || self.is_upper(cp);
            // toupper/tolower restriction: only characters in the upper and
            // lower classes may have mappings
            if self.to_upper(cp) != cp && !cased {
                flag(cp, format!(
                    "is not upper|lower but toupper(0x{:04X}) = 0x{:04X}",
                    cp,
                    self.to_upper(cp)
                ));
            }
            if self.to_lower(cp) != cp && !cased {
                flag(cp, format!(
                    "is not upper|lower but tolower(0x{:04X}) = 0x{:04X}",
                    cp,
                    self.to_lower(cp)
                ));
            }
            // upper and lower imply alpha
            if cased && !self.is_alpha(cp) {
                flag(cp, "is upper|lower but not alpha".to_owned());
            }
            // alpha excludes cntrl, digit, punct and space
            if self.is_alpha(cp) {
                for (held, other) in [
                    (self.is_cntrl(cp), "cntrl"),
                    (self.is_digit(cp), "digit"),
                    (self.is_punct(cp), "punct"),
                    (self.is_space(cp), "space"),
                ] {
                    if held {
                        flag(cp, format!("is alpha and {other}"));
                    }
                }
            }
            // space excludes digit, graph and xdigit
            if self.is_space(cp) {
                for (held, other) in [
                    (self.is_digit(cp), "digit"),
                    (self.is_graph(cp), "graph"),
                    (self.is_xdigit(cp), "xdigit"),
                ] {
                    if held {
                        flag(cp, format!("is space and {other}"));
                    }
                }
            }
            // cntrl excludes digit, punct, graph, print and xdigit
            if self.is_cntrl(cp) {
                for (held, other) in [
                    (self.is_digit(cp), "digit"),
                    (self.is_punct(cp), "punct"),
                    (self.is_graph(cp), "graph"),
                    (self.is_print(cp), "print"),
                    (self.is_xdigit(cp), "xdigit"),
                ] {
                    if held {
                        flag(cp, format!("is cntrl and {other}"));
                    }
                }
            }
            // punct excludes digit, xdigit and the space character itself
            if self.is_punct(cp) {
                if self.is_digit(cp) {
                    flag(cp, "is punct and digit".to_owned());
                }
                if self.is_xdigit(cp) {
                    flag(cp, "is punct and xdigit".to_owned());
                }
                if cp == 0x20 {
                    flag(cp, "is punct".to_owned());
                }
            }
            // print must equal graph plus the space characters, by
            // construction on both sides
            if self.is_print(cp) && !(self.is_graph(cp) || self.is_space(cp)) {
                flag(cp, "is print but not graph|<space>".to_owned());
            }
            if !self.is_print(cp) && (self.is_graph(cp) || cp == 0x20) {
                flag(cp, "is graph|<space> but not print".to_owned());
            }
        }
        violations
    }
}

/// The display column width of a code point: 0 for non-spacing marks and
/// format controls, 2 for East Asian wide and fullwidth characters, 1
/// otherwise. The East Asian width table wins over the zero-width rule when
/// both apply.
pub fn width(ucd: &UnicodeData, widths: &EastAsianWidths, code_point: u32) -> u8 {
    if widths.is_wide(code_point) {
        return 2;
    }
    match ucd.get(code_point) {
        Some(r) if r.bidi_class == "NSM" || r.category == Category::Cf => 0,
        _ => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ucd::{DerivedProperties, EastAsianWidths, UnicodeData};
    use std::io::Cursor;

    const UNICODE_DATA: &str = "\
0009;<control>;Cc;0;S;;;;;N;CHARACTER TABULATION;;;;
0020;SPACE;Zs;0;WS;;;;;N;;;;;
0030;DIGIT ZERO;Nd;0;EN;;0;0;0;N;;;;;
0041;LATIN CAPITAL LETTER A;Lu;0;L;;;;;N;;;;0061;
0061;LATIN SMALL LETTER A;Ll;0;L;;;;;N;;;0041;;0041
00A0;NO-BREAK SPACE;Zs;0;CS;<noBreak> 0020;;;;N;NON-BREAKING SPACE;;;;
00DF;LATIN SMALL LETTER SHARP S;Ll;0;L;;;;;N;;;;;
0300;COMBINING GRAVE ACCENT;Mn;230;NSM;;;;;Y;NON-SPACING GRAVE;;;;
0660;ARABIC-INDIC DIGIT ZERO;Nd;0;AN;;0;0;0;N;;;;;
2028;LINE SEPARATOR;Zl;0;WS;;;;;N;;;;;
A72F;LATIN LETTER SMALL CAPITAL F;Ll;0;L;;;;;N;;;;;
D800;<Non Private Use High Surrogate, First>;Cs;0;L;;;;;N;;;;;
DB7F;<Non Private Use High Surrogate, Last>;Cs;0;L;;;;;N;;;;;
200D;ZERO WIDTH JOINER;Cf;0;BN;;;;;N;;;;;
3007;IDEOGRAPHIC NUMBER ZERO;Nl;0;L;;;;0;N;;;;;
";

    const DERIVED: &str = "\
0041..005A    ; Uppercase
0061..007A    ; Lowercase
00DF          ; Lowercase
A72F          ; Lowercase
0041..005A    ; Alphabetic
0061..007A    ; Alphabetic
00DF          ; Alphabetic
0300          ; Alphabetic
3007          ; Alphabetic
A72F          ; Alphabetic
";

    fn stores() -> (UnicodeData, DerivedProperties) {
        let ucd = UnicodeData::read(Cursor::new(UNICODE_DATA), "test").unwrap();
        let derived = DerivedProperties::read(Cursor::new(DERIVED)).unwrap();
        (ucd, derived)
    }

    #[test]
    fn cased_latin_letter() {
        let (ucd, derived) = stores();
        let classifier = Classifier::new(&ucd, &derived);
        assert!(classifier.is_upper(0x41));
        assert!(!classifier.is_lower(0x41));
        assert!(classifier.is_alpha(0x41));
        assert_eq!(classifier.to_lower(0x41), 0x61);
        assert_eq!(classifier.to_upper(0x61), 0x41);
        assert_eq!(classifier.to_title(0x61), 0x41);
    }

    #[test]
    fn ascii_digits_are_digits_not_alpha() {
        let (ucd, derived) = stores();
        let classifier = Classifier::new(&ucd, &derived);
        assert!(classifier.is_digit(0x30));
        assert!(!classifier.is_alpha(0x30));
        assert!(classifier.is_xdigit(0x30));
        assert!(classifier.is_outdigit(0x30));
    }

    #[test]
    fn non_ascii_digits_are_alpha_not_digit() {
        let (ucd, derived) = stores();
        let classifier = Classifier::new(&ucd, &derived);
        assert!(!classifier.is_digit(0x660));
        assert!(classifier.is_alpha(0x660));
    }

    #[test]
    fn sharp_s_is_lower_without_a_mapping() {
        let (ucd, derived) = stores();
        let classifier = Classifier::new(&ucd, &derived);
        assert!(classifier.is_lower(0xDF));
        assert_eq!(classifier.to_upper(0xDF), 0xDF);
        // same for small capitals tagged Lowercase in the derived properties
        assert!(classifier.is_lower(0xA72F));
    }

    #[test]
    fn no_break_space_is_not_a_space() {
        let (ucd, derived) = stores();
        let classifier = Classifier::new(&ucd, &derived);
        assert!(classifier.is_space(0x20));
        assert!(classifier.is_blank(0x20));
        assert!(!classifier.is_space(0xA0));
        assert!(!classifier.is_blank(0xA0));
        assert!(classifier.is_punct(0xA0));
        assert!(classifier.is_space(0x2028));
        assert!(classifier.is_cntrl(0x2028));
        assert!(!classifier.is_print(0x2028));
    }

    #[test]
    fn controls_are_cntrl_only() {
        let (ucd, derived) = stores();
        let classifier = Classifier::new(&ucd, &derived);
        assert!(classifier.is_cntrl(0x09));
        assert!(classifier.is_blank(0x09));
        assert!(!classifier.is_graph(0x09));
        assert!(!classifier.is_print(0x09));
    }

    #[test]
    fn surrogates_belong_to_no_class() {
        let (ucd, derived) = stores();
        let classifier = Classifier::new(&ucd, &derived);
        for cp in [0xD800, 0xDA00, 0xDB7F] {
            assert!(!classifier.is_alpha(cp));
            assert!(!classifier.is_graph(cp));
            assert!(!classifier.is_print(cp));
            assert!(!classifier.is_cntrl(cp));
        }
    }

    #[test]
    fn unassigned_code_points_map_to_themselves() {
        let (ucd, derived) = stores();
        let classifier = Classifier::new(&ucd, &derived);
        assert_eq!(classifier.to_upper(0x10FFFD), 0x10FFFD);
        assert_eq!(classifier.to_lower(0x10FFFD), 0x10FFFD);
        assert_eq!(classifier.to_title(0x10FFFD), 0x10FFFD);
        assert!(!classifier.is_graph(0x10FFFD));
    }

    #[test]
    fn combining_marks() {
        let (ucd, derived) = stores();
        let classifier = Classifier::new(&ucd, &derived);
        assert!(classifier.is_combining(0x300));
        // class 230 is outside level 3
        assert!(!classifier.is_combining_level3(0x300));
    }

    #[test]
    fn clean_data_raises_no_violations() {
        let (ucd, derived) = stores();
        let classifier = Classifier::new(&ucd, &derived);
        assert_eq!(classifier.verify(), Vec::new());
    }

    #[test]
    fn conflicting_classes_are_reported_not_corrected() {
        // a space separator tagged Alphabetic violates the alpha/space rule
        let ucd = UnicodeData::read(
            Cursor::new("2000;EN QUAD;Zs;0;WS;2002;;;;N;;;;;\n"),
            "test",
        )
        .unwrap();
        let derived =
            DerivedProperties::read(Cursor::new("2000 ; Alphabetic\n")).unwrap();
        let classifier = Classifier::new(&ucd, &derived);
        let violations = classifier.verify();
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].code_point, 0x2000);
        assert_eq!(violations[0].message, "is alpha and space");
        // the predicates still answer both ways; nothing is patched up
        assert!(classifier.is_alpha(0x2000));
        assert!(classifier.is_space(0x2000));
    }

    #[test]
    fn east_asian_width_overrides_zero_width() {
        let ucd = UnicodeData::read(
            Cursor::new(
                "200D;ZERO WIDTH JOINER;Cf;0;BN;;;;;N;;;;;\n\
                 3000;IDEOGRAPHIC SPACE;Zs;0;WS;<wide> 0020;;;;N;;;;;\n\
                 0300;COMBINING GRAVE ACCENT;Mn;230;NSM;;;;;Y;;;;;\n",
            ),
            "test",
        )
        .unwrap();
        let widths = EastAsianWidths::read(Cursor::new(
            "3000;F # Zs IDEOGRAPHIC SPACE\n200D;W # contrived: wide format control\n",
        ))
        .unwrap();
        assert_eq!(width(&ucd, &widths, 0x300), 0);
        assert_eq!(width(&ucd, &widths, 0x3000), 2);
        assert_eq!(width(&ucd, &widths, 0x41), 1);
        // a code point that is both Cf and East Asian wide gets width 2
        assert_eq!(width(&ucd, &widths, 0x200D), 2);
    }
}
