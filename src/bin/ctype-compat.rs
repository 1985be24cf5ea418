use std::path::PathBuf;

use clap::Parser;

use unicode_ctype::compare::{compare_classes, compare_maps, display_name};
use unicode_ctype::ctype::CtypeTables;
use unicode_ctype::ranges::ucs_symbol;
use unicode_ctype::ucd::UnicodeData;

/// Compare two LC_CTYPE locale sources and report the classes and mappings
/// that changed between them.
#[derive(Parser)]
#[command(version)]
struct Args {
    /// The existing locale source
    #[arg(short, long)]
    old: PathBuf,

    /// The newly generated locale source
    #[arg(short, long)]
    new: PathBuf,

    /// List the code points the new file gained
    #[arg(short = 'a', long)]
    show_added: bool,

    /// List the code points the new file lost
    #[arg(short = 'm', long)]
    show_missing: bool,

    /// UnicodeData.txt used to name listed code points
    #[arg(short, long)]
    unicode_data: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();
    let args = Args::parse();

    let old = CtypeTables::load(&args.old)?;
    let new = CtypeTables::load(&args.new)?;
    let names = args
        .unicode_data
        .as_deref()
        .map(UnicodeData::load)
        .transpose()?;

    for diff in compare_classes(&old, &new) {
        println!(
            "class \"{}\": {} -> {} code points ({} missing, {} added)",
            diff.name,
            diff.old_count,
            diff.new_count,
            diff.missing.len(),
            diff.added.len()
        );
        if args.show_missing {
            for &cp in &diff.missing {
                println!("  - {} {}", ucs_symbol(cp), display_name(names.as_ref(), cp));
            }
        }
        if args.show_added {
            for &cp in &diff.added {
                println!("  + {} {}", ucs_symbol(cp), display_name(names.as_ref(), cp));
            }
        }
    }

    for diff in compare_maps(&old, &new) {
        println!(
            "map \"{}\": {} -> {} pairs ({} missing, {} added)",
            diff.name,
            diff.old_count,
            diff.new_count,
            diff.missing.len(),
            diff.added.len()
        );
        if args.show_missing {
            for &(from, to) in &diff.missing {
                println!("  - ({},{})", ucs_symbol(from), ucs_symbol(to));
            }
        }
        if args.show_added {
            for &(from, to) in &diff.added {
                println!("  + ({},{})", ucs_symbol(from), ucs_symbol(to));
            }
        }
    }
    Ok(())
}
