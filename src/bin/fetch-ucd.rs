use std::path::PathBuf;

use clap::Parser;
use tracing::info;

use unicode_ctype::download;

/// Download the UCD files the generators need from unicode.org.
#[derive(Parser)]
#[command(version)]
struct Args {
    /// Unicode version to fetch, e.g. 14.0.0
    #[arg(long)]
    unicode_version: String,

    /// Directory to place the files in
    #[arg(short, long, default_value = ".")]
    directory: PathBuf,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();
    let args = Args::parse();

    let files = download::download_snapshot(&args.directory, &args.unicode_version)?;
    for file in files {
        info!("{}", file.display());
    }
    Ok(())
}
