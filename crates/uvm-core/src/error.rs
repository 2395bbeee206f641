//! Error types for uvm-core

use thiserror::Error;

/// Result type alias using uvm-core's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for uvm
#[derive(Error, Debug)]
pub enum Error {
    /// A file or directory the operation needs does not exist
    #[error("Not found: {path}")]
    NotFound { path: String },

    /// Manifest document is missing required structure
    #[error("Manifest schema error: {message}")]
    SchemaError { message: String },

    /// Downloaded archive digest does not match the manifest
    #[error("Integrity check failed for {archive}: expected {expected}, got {actual}")]
    IntegrityCheckFailed {
        expected: String,
        actual: String,
        archive: String,
    },

    /// A single archive entry could not be extracted
    #[error("Failed to extract '{entry_name}': {cause}")]
    ExtractionFailed { entry_name: String, cause: String },

    /// Refusing to remove the active version
    #[error("Version {version} is currently in use and cannot be removed")]
    VersionInUse { version: String },

    /// Activation target directory is missing
    #[error("Version directory does not exist: {path}")]
    VersionDirMissing { path: String },

    /// Version is not present in the local store
    #[error("Version {version} is not installed")]
    NotInstalled { version: String },

    /// Version is not listed in the manifest
    #[error("Version {version} was not found in the manifest")]
    VersionNotFound { version: String },

    /// Transport-level failure (connection, timeout, body read)
    #[error("Network error fetching {url}: {message}")]
    NetworkError { url: String, message: String },

    /// Remote answered, but refused or returned unusable content
    #[error("Remote rejected {url}: {message}")]
    RemoteRejected { url: String, message: String },

    /// No local manifest found and no remote fallback configured
    #[error("No manifest source available: pass --manifest, set UVM_MANIFEST, or configure version-list-file-id")]
    NoManifestSource,

    /// Operation was cancelled by the caller
    #[error("Operation cancelled")]
    Cancelled,

    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: String },

    /// Invalid configuration format
    #[error("Invalid configuration format: {message}")]
    InvalidConfig { message: String },

    /// YAML parsing error
    #[error("YAML parsing error: {0}")]
    YamlParse(#[from] serde_yaml_ng::Error),

    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a not found error
    pub fn not_found(path: impl Into<String>) -> Self {
        Self::NotFound { path: path.into() }
    }

    /// Create a manifest schema error
    pub fn schema(message: impl Into<String>) -> Self {
        Self::SchemaError {
            message: message.into(),
        }
    }

    /// Create an integrity check failure
    pub fn integrity_check_failed(
        archive: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Self::IntegrityCheckFailed {
            expected: expected.into(),
            actual: actual.into(),
            archive: archive.into(),
        }
    }

    /// Create an extraction failure for one entry
    pub fn extraction_failed(entry_name: impl Into<String>, cause: impl ToString) -> Self {
        Self::ExtractionFailed {
            entry_name: entry_name.into(),
            cause: cause.to_string(),
        }
    }

    /// Create a version in use error
    pub fn version_in_use(version: impl Into<String>) -> Self {
        Self::VersionInUse {
            version: version.into(),
        }
    }

    /// Create a missing version directory error
    pub fn version_dir_missing(path: impl Into<String>) -> Self {
        Self::VersionDirMissing { path: path.into() }
    }

    /// Create a not installed error
    pub fn not_installed(version: impl Into<String>) -> Self {
        Self::NotInstalled {
            version: version.into(),
        }
    }

    /// Create a version not found error
    pub fn version_not_found(version: impl Into<String>) -> Self {
        Self::VersionNotFound {
            version: version.into(),
        }
    }

    /// Create a network error
    pub fn network(url: impl Into<String>, message: impl ToString) -> Self {
        Self::NetworkError {
            url: url.into(),
            message: message.to_string(),
        }
    }

    /// Create a remote rejected error
    pub fn remote_rejected(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::RemoteRejected {
            url: url.into(),
            message: message.into(),
        }
    }

    /// Create a config not found error
    pub fn config_not_found(path: impl Into<String>) -> Self {
        Self::ConfigNotFound { path: path.into() }
    }

    /// Create an invalid config error
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Whether this error is an expected, user-facing outcome.
    ///
    /// Domain errors are reported as a single line and do not change the
    /// process exit code. Configuration problems, cancellation and raw I/O or
    /// serialization failures are not domain outcomes and end the process
    /// with a failure status.
    pub fn is_domain(&self) -> bool {
        !matches!(
            self,
            Self::ConfigNotFound { .. }
                | Self::InvalidConfig { .. }
                | Self::YamlParse(_)
                | Self::JsonParse(_)
                | Self::Io(_)
                | Self::Cancelled
        )
    }
}
