use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use anyhow::Context;
use chrono::Local;
use clap::Parser;
use tracing::warn;

use unicode_ctype::classify::Classifier;
use unicode_ctype::ctype;
use unicode_ctype::ucd::{DerivedProperties, UnicodeData};

/// Generate a POSIX LC_CTYPE locale source from the Unicode Character
/// Database.
#[derive(Parser)]
#[command(version)]
struct Args {
    /// UnicodeData.txt from the UCD
    #[arg(short, long, default_value = "UnicodeData.txt")]
    unicode_data: PathBuf,

    /// DerivedCoreProperties.txt from the UCD
    #[arg(short, long, default_value = "DerivedCoreProperties.txt")]
    derived_properties: PathBuf,

    /// Locale source file to write
    #[arg(short, long, default_value = "unicode")]
    output: PathBuf,

    /// Unicode version recorded in the file header
    #[arg(long)]
    unicode_version: String,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();
    let args = Args::parse();

    let ucd = UnicodeData::load(&args.unicode_data)?;
    let derived = DerivedProperties::load(&args.derived_properties)?;
    let classifier = Classifier::new(&ucd, &derived);

    let violations = classifier.verify();
    if !violations.is_empty() {
        warn!("{} consistency check(s) flagged, output written anyway", violations.len());
    }

    let date = Local::now().format("%Y-%m-%d").to_string();
    let file = File::create(&args.output)
        .with_context(|| format!("cannot create {}", args.output.display()))?;
    let mut out = BufWriter::new(file);
    ctype::write_ctype(&mut out, &classifier, &args.unicode_version, &date)?;
    out.flush()?;
    Ok(())
}
