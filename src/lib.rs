//! Generation and auditing of POSIX locale data from the Unicode Character
//! Database.
//!
//! The crate reads the UCD source files (`UnicodeData.txt`,
//! `DerivedCoreProperties.txt`, `EastAsianWidth.txt`), derives the
//! `LC_CTYPE` character classes and case mappings, and writes them in the
//! locale source format: `<UXXXX>` symbols, run-length ranges, 75-column
//! continuation lines. A UTF-8 `CHARMAP`/`WIDTH` charmap is generated from
//! the same data, and both artifact kinds can be parsed back and diffed so
//! a Unicode version upgrade can be audited for regressions.
//!
//! The binaries (`gen-ctype`, `gen-charmap`, `ctype-compat`,
//! `charmap-compat`, `fetch-ucd`) are thin wrappers over these modules.

pub mod charmap;
pub mod classify;
pub mod compare;
pub mod ctype;
pub mod download;
pub mod ranges;
pub mod ucd;
