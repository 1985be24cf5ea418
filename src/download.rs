//! Fetching UCD snapshots from unicode.org.

use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::{ensure, Result};
use reqwest::blocking::Client;
use tracing::info;

/// The data files the generators consume, as paths below the versioned
/// directory on unicode.org.
pub const UCD_FILES: &[&str] = &[
    "ucd/UnicodeData.txt",
    "ucd/DerivedCoreProperties.txt",
    "ucd/EastAsianWidth.txt",
];

/// Download one UCD file into `directory`, keeping its base name. A file
/// that is already present is left alone, so a partially fetched snapshot
/// can be resumed by rerunning.
pub fn download_ucd_file(
    client: &Client,
    directory: &Path,
    remote_file: &str,
    unicode_version: &str,
) -> Result<PathBuf> {
    let base_name = remote_file.rsplit('/').next().unwrap_or(remote_file);
    let local_file = directory.join(base_name);
    if local_file.exists() {
        info!("{} already present, skipping", local_file.display());
        return Ok(local_file);
    }
    let url =
        format!("https://www.unicode.org/Public/{unicode_version}/{remote_file}");
    info!("fetching {url}");
    let mut remote_data = client.get(&url).send()?;
    ensure!(
        remote_data.status().is_success(),
        "{} returned {}",
        url,
        remote_data.status()
    );
    let mut file = File::create(&local_file)?;
    std::io::copy(&mut remote_data, &mut file)?;
    Ok(local_file)
}

/// Download the full snapshot for one Unicode version.
pub fn download_snapshot(directory: &Path, unicode_version: &str) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(directory)?;
    let client = Client::new();
    UCD_FILES
        .iter()
        .map(|remote_file| {
            download_ucd_file(&client, directory, remote_file, unicode_version)
        })
        .collect()
}
