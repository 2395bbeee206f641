//! Manifest location resolution
//!
//! Sources are tried in a fixed order:
//! 1. Explicit path (`--manifest` or `manifest-path` in config), if it exists
//! 2. Path named by the `UVM_MANIFEST` environment variable, if it exists
//! 3. The first of [`MANIFEST_CANDIDATES`] present in the working directory
//! 4. The configured remote URL
//!
//! Relative paths from (1) and (2) are looked up next to the explicit config
//! file first, then in the working directory.

use std::env;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;
use uvm_core::{Error, Result};

use crate::transport::Transport;

/// Environment variable naming a local manifest file
pub const MANIFEST_ENV_VAR: &str = "UVM_MANIFEST";

/// File names looked for in the working directory, in order
pub const MANIFEST_CANDIDATES: &[&str] = &["versions.json", "version_list.json"];

/// Where a manifest was found
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceLocation {
    Local(PathBuf),
    Remote(String),
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local(path) => write!(f, "{}", path.display()),
            Self::Remote(url) => f.write_str(url),
        }
    }
}

/// Resolves and reads the release manifest
#[derive(Debug, Clone)]
pub struct ManifestSource {
    base_dir: PathBuf,
    explicit_path: Option<PathBuf>,
    config_dir: Option<PathBuf>,
    env_var: String,
    candidates: Vec<String>,
    remote_url: Option<String>,
}

impl ManifestSource {
    /// Source rooted at `base_dir` (the working directory by convention)
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            explicit_path: None,
            config_dir: None,
            env_var: MANIFEST_ENV_VAR.to_string(),
            candidates: MANIFEST_CANDIDATES.iter().map(|s| s.to_string()).collect(),
            remote_url: None,
        }
    }

    /// Explicit manifest path, checked first
    pub fn with_explicit_path(mut self, path: Option<PathBuf>) -> Self {
        self.explicit_path = path;
        self
    }

    /// Directory of the explicit config file, used for relative paths
    pub fn with_config_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.config_dir = dir;
        self
    }

    /// Environment variable consulted second
    pub fn with_env_var(mut self, name: impl Into<String>) -> Self {
        self.env_var = name.into();
        self
    }

    /// Candidate file names looked for in the base directory
    pub fn with_candidates<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.candidates = names.into_iter().map(Into::into).collect();
        self
    }

    /// Remote fallback URL
    pub fn with_remote_url(mut self, url: Option<String>) -> Self {
        self.remote_url = url.filter(|u| !u.trim().is_empty());
        self
    }

    /// Pick the manifest location
    pub fn resolve(&self) -> Result<SourceLocation> {
        if let Some(explicit) = &self.explicit_path {
            match self.locate(explicit) {
                Some(path) => return Ok(SourceLocation::Local(path)),
                None => debug!(
                    "Explicit manifest {} not found, trying other sources",
                    explicit.display()
                ),
            }
        }

        if let Some(value) = env::var_os(&self.env_var).filter(|v| !v.is_empty()) {
            match self.locate(Path::new(&value)) {
                Some(path) => return Ok(SourceLocation::Local(path)),
                None => debug!(
                    "{}={} not found, trying other sources",
                    self.env_var,
                    Path::new(&value).display()
                ),
            }
        }

        if let Some(path) = self
            .candidates
            .iter()
            .map(|name| self.base_dir.join(name))
            .find(|path| path.is_file())
        {
            return Ok(SourceLocation::Local(path));
        }

        self.remote_url
            .clone()
            .map(SourceLocation::Remote)
            .ok_or(Error::NoManifestSource)
    }

    /// Read the manifest text from a resolved location
    pub async fn fetch_raw(
        &self,
        location: &SourceLocation,
        transport: &dyn Transport,
    ) -> Result<String> {
        match location {
            SourceLocation::Local(path) => {
                tokio::fs::read_to_string(path).await.map_err(|e| {
                    if e.kind() == io::ErrorKind::NotFound {
                        Error::not_found(path.display().to_string())
                    } else {
                        Error::Io(e)
                    }
                })
            }
            SourceLocation::Remote(url) => transport.fetch_text(url).await,
        }
    }

    /// Existing file for a possibly relative path
    fn locate(&self, path: &Path) -> Option<PathBuf> {
        if path.is_absolute() {
            return path.is_file().then(|| path.to_path_buf());
        }

        self.config_dir
            .iter()
            .chain(std::iter::once(&self.base_dir))
            .map(|dir| dir.join(path))
            .find(|candidate| candidate.is_file())
    }
}
