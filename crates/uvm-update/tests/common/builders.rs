//! Builders for manifests and release archives

use serde_json::{json, Value};
use sha2::{Digest, Sha256};
use std::io::{Cursor, Write};
use zip::write::FileOptions;
use zip::ZipWriter;

use super::constants::*;

/// Lowercase hex SHA-256 of `bytes`
pub fn sha256_hex(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

/// Build a zip archive from `(name, content)` pairs
pub fn zip_bytes(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, content) in entries {
        writer
            .start_file(*name, FileOptions::default())
            .expect("start zip entry");
        writer.write_all(content).expect("write zip entry");
    }
    writer.finish().expect("finish zip").into_inner()
}

/// Standard release archive for `version`: `app.txt` plus a nested file
pub fn release_zip(version: &str) -> Vec<u8> {
    let app = app_content(version);
    zip_bytes(&[(APP_FILE, app.as_bytes()), (NESTED_FILE, NESTED_CONTENT)])
}

/// Fluent builder for manifest JSON documents
#[derive(Debug, Clone, Default)]
pub struct ManifestBuilder {
    entries: Vec<Value>,
}

impl ManifestBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a release pointing at [`archive_url`] with the given digest
    pub fn release(self, version: &str, digest: Option<&str>) -> Self {
        self.release_at(version, &archive_url(version), digest)
    }

    /// Add a release with an explicit download URL
    pub fn release_at(mut self, version: &str, url: &str, digest: Option<&str>) -> Self {
        let mut entry = json!({
            "version": version,
            "downloadUrl": url,
            "releaseDate": "2024-05-01",
            "description": format!("Version {}", version),
        });
        if let Some(digest) = digest {
            entry["sha256"] = json!(digest);
        }
        self.entries.push(entry);
        self
    }

    /// Add an arbitrary raw entry (used for malformed records)
    pub fn raw(mut self, entry: Value) -> Self {
        self.entries.push(entry);
        self
    }

    pub fn build(&self) -> String {
        json!({ "versions": self.entries }).to_string()
    }
}

/// Build a gzip-compressed tar archive from `(name, content)` pairs
pub fn tar_gz_bytes(entries: &[(&str, &[u8])]) -> Vec<u8> {
    use flate2::write::GzEncoder;
    use flate2::Compression;

    let mut builder = tar::Builder::new(GzEncoder::new(Vec::new(), Compression::default()));
    for (name, content) in entries {
        let mut header = tar::Header::new_gnu();
        header.set_size(content.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        builder
            .append_data(&mut header, name, *content)
            .expect("append tar entry");
    }
    builder
        .into_inner()
        .expect("finish tar")
        .finish()
        .expect("finish gzip")
}
