use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;

use unicode_ctype::charmap::{self, compare_charmaps, compare_widths};
use unicode_ctype::ranges::ucs_symbol;

/// Compare two UTF-8 charmap files and report the CHARMAP entries and WIDTH
/// assignments that changed between them.
#[derive(Parser)]
#[command(version)]
struct Args {
    /// The existing charmap file
    #[arg(short, long)]
    old: PathBuf,

    /// The newly generated charmap file
    #[arg(short, long)]
    new: PathBuf,

    /// List the width assignments the new file gained
    #[arg(short = 'a', long)]
    show_added: bool,

    /// List the entries and width assignments the new file lost
    #[arg(short = 'm', long)]
    show_missing: bool,
}

fn open(path: &Path) -> anyhow::Result<BufReader<File>> {
    Ok(BufReader::new(
        File::open(path).with_context(|| format!("cannot open {}", path.display()))?,
    ))
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();
    let args = Args::parse();

    let old_entries = charmap::read_charmap(open(&args.old)?)?;
    let new_entries = charmap::read_charmap(open(&args.new)?)?;
    let changed = compare_charmaps(&old_entries, &new_entries);
    println!(
        "CHARMAP: {} -> {} entries, {} lost or changed",
        old_entries.len(),
        new_entries.len(),
        changed.len()
    );
    if args.show_missing {
        for symbol in &changed {
            println!("  - {symbol}");
        }
    }

    let old_widths = charmap::read_width(open(&args.old)?)?;
    let new_widths = charmap::read_width(open(&args.new)?)?;
    let diff = compare_widths(&old_widths, &new_widths);
    println!(
        "WIDTH: {} -> {} code points, {} missing, {} added",
        old_widths.len(),
        new_widths.len(),
        diff.missing.len(),
        diff.added.len()
    );
    if args.show_missing {
        for &(cp, width) in &diff.missing {
            println!("  - {}\t{}", ucs_symbol(cp), width);
        }
    }
    if args.show_added {
        for &(cp, width) in &diff.added {
            println!("  + {}\t{}", ucs_symbol(cp), width);
        }
    }
    Ok(())
}
