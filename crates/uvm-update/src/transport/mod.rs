//! Network transport seam
//!
//! The pipeline only needs two things from the network: fetch a small text
//! document and stream a large file to disk. [`Transport`] is that contract;
//! [`HttpTransport`] is the reqwest-backed implementation with handling for
//! the quirks of the hosts releases are usually published on.

mod http;
mod source;

pub use http::HttpTransport;
pub use source::{drive_confirm_link, SourceKind, GOOGLE_DRIVE_ORIGIN};

use async_trait::async_trait;
use std::path::Path;
use uvm_core::Result;

/// Fetches manifests and archives
///
/// Implementations report failures as [`uvm_core::Error::NetworkError`]
/// (could not talk to the remote) or [`uvm_core::Error::RemoteRejected`]
/// (the remote answered with something unusable). Timeouts are the
/// implementation's concern.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Fetch a URL as text
    async fn fetch_text(&self, url: &str) -> Result<String>;

    /// Stream a URL into `dest`, replacing any existing file
    async fn fetch_to_file(&self, url: &str, dest: &Path) -> Result<()>;
}
