use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use unicode_ctype::charmap;
use unicode_ctype::ucd::{EastAsianWidths, UnicodeData};

/// Generate the UTF-8 CHARMAP/WIDTH charmap from the Unicode Character
/// Database.
#[derive(Parser)]
#[command(version)]
struct Args {
    /// UnicodeData.txt from the UCD
    #[arg(short, long, default_value = "UnicodeData.txt")]
    unicode_data: PathBuf,

    /// EastAsianWidth.txt from the UCD
    #[arg(short, long, default_value = "EastAsianWidth.txt")]
    east_asian_width: PathBuf,

    /// Charmap file to write
    #[arg(short, long, default_value = "UTF-8")]
    output: PathBuf,

    /// Unicode version recorded in the file header
    #[arg(long)]
    unicode_version: String,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();
    let args = Args::parse();

    let ucd = UnicodeData::load(&args.unicode_data)?;
    let widths = EastAsianWidths::load(&args.east_asian_width)?;

    let file = File::create(&args.output)
        .with_context(|| format!("cannot create {}", args.output.display()))?;
    let mut out = BufWriter::new(file);
    charmap::write_charmap(&mut out, &ucd, &widths, &args.unicode_version)?;
    out.flush()?;
    Ok(())
}
