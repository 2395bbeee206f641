//! Repointing the "current" alias
//!
//! Activation always runs the same sequence:
//! 1. the version directory must exist
//! 2. any existing alias is removed according to its kind
//! 3. a directory symbolic link to the version is attempted
//! 4. if linking fails for any reason, the version is copied instead
//! 5. the alias must exist afterwards
//!
//! Whether the alias ends up a link or a copy depends on what the host
//! allows (Windows without developer mode usually refuses links).

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use uvm_core::{Error, Result};

use crate::fs_util::{copy_tree, count_files};

/// How the alias is materialized
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AliasKind {
    Symlink,
    Copy,
}

impl fmt::Display for AliasKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Symlink => f.write_str("symbolic link"),
            Self::Copy => f.write_str("directory copy"),
        }
    }
}

/// Observed state of the alias path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasStatus {
    pub kind: AliasKind,

    /// Link target, for symbolic links
    pub target: Option<PathBuf>,

    /// Regular files reachable through the alias
    pub file_count: u64,
}

/// Owns the alias path during activation
#[derive(Debug, Clone)]
pub struct ActivationManager {
    alias_path: PathBuf,
}

impl ActivationManager {
    pub fn new(alias_path: impl Into<PathBuf>) -> Self {
        Self {
            alias_path: alias_path.into(),
        }
    }

    pub fn alias_path(&self) -> &Path {
        &self.alias_path
    }

    /// Point the alias at `version_dir`
    pub fn activate(&self, version_dir: &Path) -> Result<AliasKind> {
        self.activate_with(version_dir, create_dir_link)
    }

    fn activate_with<F>(&self, version_dir: &Path, link: F) -> Result<AliasKind>
    where
        F: FnOnce(&Path, &Path) -> io::Result<()>,
    {
        if !version_dir.is_dir() {
            return Err(Error::version_dir_missing(version_dir.display().to_string()));
        }

        self.clear_alias()?;

        if let Some(parent) = self.alias_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let target = std::path::absolute(version_dir)?;
        let kind = match link(&target, &self.alias_path) {
            Ok(()) => {
                debug!(
                    "Linked {} -> {}",
                    self.alias_path.display(),
                    target.display()
                );
                AliasKind::Symlink
            }
            Err(e) => {
                warn!(
                    "Could not create symbolic link {} ({}), copying {} instead",
                    self.alias_path.display(),
                    e,
                    target.display()
                );
                // A failed link attempt may leave a partial entry behind
                self.clear_alias()?;
                let copied = copy_tree(&target, &self.alias_path)?;
                debug!("Copied {} files into {}", copied, self.alias_path.display());
                AliasKind::Copy
            }
        };

        if !self.alias_path.exists() {
            return Err(Error::not_found(self.alias_path.display().to_string()));
        }
        debug!(
            "Alias {} ready ({}, {} files)",
            self.alias_path.display(),
            kind,
            count_files(&self.alias_path)
        );

        Ok(kind)
    }

    /// Current alias state, or `None` if there is no alias
    pub fn inspect(&self) -> Result<Option<AliasStatus>> {
        let meta = match fs::symlink_metadata(&self.alias_path) {
            Ok(meta) => meta,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let status = if meta.file_type().is_symlink() {
            AliasStatus {
                kind: AliasKind::Symlink,
                target: Some(fs::read_link(&self.alias_path)?),
                file_count: count_files(&self.alias_path),
            }
        } else {
            AliasStatus {
                kind: AliasKind::Copy,
                target: None,
                file_count: count_files(&self.alias_path),
            }
        };
        Ok(Some(status))
    }

    /// Remove whatever occupies the alias path
    fn clear_alias(&self) -> Result<()> {
        let meta = match fs::symlink_metadata(&self.alias_path) {
            Ok(meta) => meta,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(e.into()),
        };

        if meta.file_type().is_symlink() {
            debug!("Removing link {}", self.alias_path.display());
            remove_dir_link(&self.alias_path)?;
        } else if meta.is_dir() {
            debug!("Removing copied alias {}", self.alias_path.display());
            fs::remove_dir_all(&self.alias_path)?;
        } else {
            fs::remove_file(&self.alias_path)?;
        }
        Ok(())
    }
}

#[cfg(unix)]
fn create_dir_link(target: &Path, link: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(target, link)
}

#[cfg(windows)]
fn create_dir_link(target: &Path, link: &Path) -> io::Result<()> {
    std::os::windows::fs::symlink_dir(target, link)
}

#[cfg(unix)]
fn remove_dir_link(link: &Path) -> io::Result<()> {
    fs::remove_file(link)
}

#[cfg(windows)]
fn remove_dir_link(link: &Path) -> io::Result<()> {
    // Directory symlinks and junctions are removed as directories
    fs::remove_dir(link).or_else(|_| fs::remove_file(link))
}
