//! Release manifest: where it lives, how it is parsed, and how new entries
//! are produced for publishing.

mod parser;
mod source;

pub use parser::{parse_manifest, ParsedManifest};
pub use source::{ManifestSource, SourceLocation, MANIFEST_CANDIDATES, MANIFEST_ENV_VAR};

use std::path::Path;
use uvm_core::config::DRIVE_DOWNLOAD_BASE;
use uvm_core::types::ReleaseRecord;
use uvm_core::Result;

use crate::hasher::compute_digest;

/// Build a manifest entry for a local archive.
///
/// `location` is either a full URL or a bare Google Drive file id. The
/// digest and size come from the archive; the release date is today.
pub fn describe_archive(version: &str, archive: &Path, location: &str) -> Result<ReleaseRecord> {
    let digest = compute_digest(archive)?;
    let size = std::fs::metadata(archive)?.len();

    Ok(ReleaseRecord::new(version, download_url_for(location))
        .with_digest(digest)
        .with_size(size)
        .with_release_date(chrono::Local::now().format("%Y-%m-%d").to_string())
        .with_description(format!("Version {}", version)))
}

/// Expand a bare Google Drive file id into a direct download URL
pub fn download_url_for(location: &str) -> String {
    let location = location.trim();
    if location.contains("://") {
        location.to_string()
    } else {
        format!("{}{}", DRIVE_DOWNLOAD_BASE, location)
    }
}
