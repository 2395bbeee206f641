//! Resolved filesystem layout
//!
//! [`StoreLayout`] is the explicit configuration value every core component
//! takes. It is built once from [`UvmSettings`] and a base directory so that
//! nothing below the CLI reads the process working directory on its own.

use crate::config::settings::UvmSettings;
use std::path::{Path, PathBuf};

/// Name of the advisory lock file inside the store root
pub const STORE_LOCK_FILE: &str = ".uvm.lock";

/// Absolute paths for one uvm deployment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreLayout {
    /// `<storeRoot>`: one subdirectory per installed version
    pub store_root: PathBuf,

    /// Text file naming the active version
    pub marker_file: PathBuf,

    /// Scratch directory archives are extracted into
    pub staging_dir: PathBuf,

    /// Fixed path the archive is downloaded to
    pub archive_path: PathBuf,

    /// The "current" alias (link or copy)
    pub alias_path: PathBuf,
}

impl StoreLayout {
    /// Resolve settings against a base directory (the working directory by convention)
    pub fn resolve(settings: &UvmSettings, base_dir: &Path) -> Self {
        let at = |p: &str| {
            let p = Path::new(p);
            if p.is_absolute() {
                p.to_path_buf()
            } else {
                base_dir.join(p)
            }
        };

        Self {
            store_root: at(&settings.local_base_dir),
            marker_file: at(&settings.current_version_file),
            staging_dir: at(&settings.temp_extract_path),
            archive_path: at(&settings.zip_file_path),
            alias_path: at(&settings.app_link_name),
        }
    }

    /// Layout with default names rooted in `base_dir`
    pub fn in_dir(base_dir: &Path) -> Self {
        Self::resolve(&UvmSettings::default(), base_dir)
    }

    /// Path of the store lock file
    pub fn lock_file(&self) -> PathBuf {
        self.store_root.join(STORE_LOCK_FILE)
    }
}
