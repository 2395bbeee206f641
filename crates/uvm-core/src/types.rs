//! Release manifest data types
//!
//! Versions are opaque identifiers. Every ordering decision in uvm goes
//! through [`version_order`], which is plain byte-wise string order: `"1.2.0"`
//! sorts above `"1.10.0"`. Installed-version listings and "latest" selection
//! both use it so they can never disagree.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Ordering used for all version comparisons (plain string order)
pub fn version_order(a: &str, b: &str) -> Ordering {
    a.cmp(b)
}

/// Sort version strings in place, greatest first
pub fn sort_versions_descending<T: AsRef<str>>(versions: &mut [T]) {
    versions.sort_by(|a, b| version_order(b.as_ref(), a.as_ref()));
}

/// Whether a version string can name a single directory under the store root
pub fn is_valid_version_name(version: &str) -> bool {
    !version.is_empty()
        && version == version.trim()
        && version != "."
        && version != ".."
        && !version.contains(['/', '\\', ':', '\0'])
}

/// One entry of the release manifest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseRecord {
    /// Opaque version identifier
    pub version: String,

    /// Where the release archive can be fetched from
    pub download_url: String,

    /// Lowercase hex SHA-256 of the archive, if published
    #[serde(rename = "sha256", default, skip_serializing_if = "Option::is_none")]
    pub digest: Option<String>,

    /// Archive size in bytes (informational, never enforced)
    #[serde(rename = "size", default)]
    pub size_bytes: u64,

    /// Display-only release date
    #[serde(default)]
    pub release_date: String,

    /// Display-only description
    #[serde(default)]
    pub description: String,
}

impl ReleaseRecord {
    /// Create a record with only the mandatory fields set
    pub fn new(version: impl Into<String>, download_url: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            download_url: download_url.into(),
            digest: None,
            size_bytes: 0,
            release_date: String::new(),
            description: String::new(),
        }
    }

    /// Set the expected digest
    pub fn with_digest(mut self, digest: impl Into<String>) -> Self {
        self.digest = Some(digest.into());
        self
    }

    /// Set the informational size
    pub fn with_size(mut self, size_bytes: u64) -> Self {
        self.size_bytes = size_bytes;
        self
    }

    /// Set the release date display string
    pub fn with_release_date(mut self, date: impl Into<String>) -> Self {
        self.release_date = date.into();
        self
    }

    /// Set the description display string
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Digest to verify against, if one was published
    pub fn expected_digest(&self) -> Option<&str> {
        self.digest.as_deref().filter(|d| !d.trim().is_empty())
    }
}

/// Parsed release manifest, in document order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
    releases: Vec<ReleaseRecord>,
}

impl Manifest {
    pub fn new(releases: Vec<ReleaseRecord>) -> Self {
        Self { releases }
    }

    pub fn releases(&self) -> &[ReleaseRecord] {
        &self.releases
    }

    pub fn is_empty(&self) -> bool {
        self.releases.is_empty()
    }

    pub fn len(&self) -> usize {
        self.releases.len()
    }

    /// First record with the given version. Duplicates are kept in the
    /// manifest; lookups see the earliest one.
    pub fn find(&self, version: &str) -> Option<&ReleaseRecord> {
        self.releases.iter().find(|r| r.version == version)
    }

    /// Record with the greatest version under [`version_order`]
    pub fn latest(&self) -> Option<&ReleaseRecord> {
        self.releases
            .iter()
            .max_by(|a, b| version_order(&a.version, &b.version))
    }

    /// Records sorted greatest version first
    pub fn sorted_descending(&self) -> Vec<&ReleaseRecord> {
        let mut sorted: Vec<&ReleaseRecord> = self.releases.iter().collect();
        sorted.sort_by(|a, b| version_order(&b.version, &a.version));
        sorted
    }
}

impl IntoIterator for Manifest {
    type Item = ReleaseRecord;
    type IntoIter = std::vec::IntoIter<ReleaseRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.releases.into_iter()
    }
}
