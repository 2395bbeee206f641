//! Versioned install and update engine for uvm
//!
//! Provides:
//! - Release manifest resolution and tolerant parsing
//! - Archive download over HTTP with Google Drive and GitHub handling
//! - SHA-256 verification of downloaded archives
//! - Zip and tar.gz extraction with per-entry error reporting
//! - A version store with an active-version marker and advisory lock
//! - Alias activation by symbolic link, with directory copy fallback
//! - Install, auto-update and self-update pipelines

pub mod activation;
pub mod archive;
mod fs_util;
pub mod hasher;
pub mod manifest;
pub mod output;
pub mod pipeline;
pub mod prompt;
pub mod store;
pub mod transport;

pub use activation::{ActivationManager, AliasKind, AliasStatus};
pub use manifest::{describe_archive, parse_manifest, ManifestSource, SourceLocation};
pub use output::{MemorySink, OutputSink, Reporter, SilentSink, StatusEvent, StatusLevel};
pub use pipeline::{InstallOutcome, InstallationPipeline, UpdateCheck, UpdateOutcome};
pub use prompt::{ConfirmationPrompt, FixedAnswer};
pub use store::{StoreLock, VersionStore};
pub use transport::{HttpTransport, Transport};

/// Current uvm version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
