//! Installed versions and the active-version marker
//!
//! Layout on disk:
//! - `<storeRoot>/<version>/...` one directory per installed version
//! - `<markerFile>` a single line naming the active version
//! - `<storeRoot>/.uvm.lock` advisory lock held while the store is mutated

use fs4::fs_std::FileExt;
use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;
use uvm_core::config::StoreLayout;
use uvm_core::types::{is_valid_version_name, sort_versions_descending};
use uvm_core::{Error, Result};

/// Filesystem view of installed versions
#[derive(Debug, Clone)]
pub struct VersionStore {
    root: PathBuf,
    marker_file: PathBuf,
    lock_file: PathBuf,
}

impl VersionStore {
    pub fn new(layout: &StoreLayout) -> Self {
        Self {
            root: layout.store_root.clone(),
            marker_file: layout.marker_file.clone(),
            lock_file: layout.lock_file(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn marker_file(&self) -> &Path {
        &self.marker_file
    }

    /// Directory a version is (or would be) installed into
    pub fn version_dir(&self, version: &str) -> PathBuf {
        self.root.join(version)
    }

    /// Active version from the marker file, trimmed; `None` if never activated
    pub fn current_version(&self) -> Result<Option<String>> {
        match fs::read_to_string(&self.marker_file) {
            Ok(content) => {
                let version = content.trim();
                Ok((!version.is_empty()).then(|| version.to_string()))
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Installed version names, greatest first by plain string order
    pub fn list_installed(&self) -> Result<Vec<String>> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut versions = Vec::new();
        for entry in entries {
            let entry = entry?;
            if !entry.path().is_dir() {
                continue;
            }
            match entry.file_name().into_string() {
                Ok(name) => versions.push(name),
                Err(raw) => debug!("Skipping non-UTF-8 store entry {:?}", raw),
            }
        }

        sort_versions_descending(&mut versions);
        Ok(versions)
    }

    pub fn is_installed(&self, version: &str) -> bool {
        is_valid_version_name(version) && self.version_dir(version).is_dir()
    }

    /// Delete an installed version. The active version is never removed.
    pub fn remove(&self, version: &str) -> Result<()> {
        if self.current_version()?.as_deref() == Some(version) {
            return Err(Error::version_in_use(version));
        }
        if !self.is_installed(version) {
            return Err(Error::not_installed(version));
        }

        fs::remove_dir_all(self.version_dir(version))?;
        Ok(())
    }

    /// Point the marker at `version`.
    ///
    /// Written to a sibling temp file and renamed into place, so readers see
    /// either the old or the new value.
    pub fn record_current(&self, version: &str) -> Result<()> {
        if let Some(parent) = self.marker_file.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut tmp_name = self
            .marker_file
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        tmp_name.push(".tmp");
        let tmp = self.marker_file.with_file_name(tmp_name);

        fs::write(&tmp, version)?;
        fs::rename(&tmp, &self.marker_file)?;
        Ok(())
    }

    /// Take the exclusive store lock, blocking until it is free
    pub fn lock(&self) -> Result<StoreLock> {
        fs::create_dir_all(&self.root)?;
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .read(true)
            .write(true)
            .open(&self.lock_file)?;

        debug!("Waiting for store lock {}", self.lock_file.display());
        file.lock_exclusive()?;
        debug!("Acquired store lock {}", self.lock_file.display());

        Ok(StoreLock {
            _file: file,
            path: self.lock_file.clone(),
        })
    }
}

/// Held store lock; released on drop
#[derive(Debug)]
pub struct StoreLock {
    _file: File,
    path: PathBuf,
}

impl StoreLock {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for StoreLock {
    fn drop(&mut self) {
        debug!("Releasing store lock {}", self.path.display());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store(dir: &TempDir) -> VersionStore {
        VersionStore::new(&StoreLayout::in_dir(dir.path()))
    }

    fn install(store: &VersionStore, version: &str) {
        fs::create_dir_all(store.version_dir(version)).unwrap();
        fs::write(store.version_dir(version).join("app.txt"), version).unwrap();
    }

    #[test]
    fn test_no_marker_means_no_current() {
        let dir = TempDir::new().unwrap();
        assert_eq!(store(&dir).current_version().unwrap(), None);
    }

    #[test]
    fn test_marker_is_trimmed() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        fs::write(store.marker_file(), "  1.2.0\r\n").unwrap();
        assert_eq!(store.current_version().unwrap().as_deref(), Some("1.2.0"));
    }

    #[test]
    fn test_blank_marker_means_no_current() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        fs::write(store.marker_file(), "\n").unwrap();
        assert_eq!(store.current_version().unwrap(), None);
    }

    #[test]
    fn test_record_current_overwrites() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        store.record_current("1.0.0").unwrap();
        store.record_current("2.0.0").unwrap();
        assert_eq!(fs::read_to_string(store.marker_file()).unwrap(), "2.0.0");
        assert!(!dir.path().join("current_version.txt.tmp").exists());
    }

    #[test]
    fn test_list_uses_plain_string_order() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        for v in ["1.0.0", "1.10.0", "1.2.0"] {
            install(&store, v);
        }
        assert_eq!(
            store.list_installed().unwrap(),
            vec!["1.2.0", "1.10.0", "1.0.0"]
        );
    }

    #[test]
    fn test_list_ignores_files_and_missing_root() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        assert!(store.list_installed().unwrap().is_empty());

        install(&store, "1.0.0");
        let _lock = store.lock().unwrap();
        fs::write(store.root().join("notes.txt"), "x").unwrap();
        assert_eq!(store.list_installed().unwrap(), vec!["1.0.0"]);
    }

    #[test]
    fn test_is_installed() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        install(&store, "1.0.0");
        assert!(store.is_installed("1.0.0"));
        assert!(!store.is_installed("2.0.0"));
        assert!(!store.is_installed(".."));
    }

    #[test]
    fn test_remove_active_version_refused() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        install(&store, "1.0.0");
        store.record_current("1.0.0").unwrap();

        let err = store.remove("1.0.0").unwrap_err();
        assert!(matches!(err, Error::VersionInUse { .. }));
        assert!(store.version_dir("1.0.0").is_dir());
    }

    #[test]
    fn test_remove_inactive_version() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        install(&store, "1.0.0");
        install(&store, "2.0.0");
        store.record_current("2.0.0").unwrap();

        store.remove("1.0.0").unwrap();
        assert!(!store.version_dir("1.0.0").exists());
        assert_eq!(store.list_installed().unwrap(), vec!["2.0.0"]);
    }

    #[test]
    fn test_remove_missing_version() {
        let dir = TempDir::new().unwrap();
        let err = store(&dir).remove("9.9.9").unwrap_err();
        assert!(matches!(err, Error::NotInstalled { .. }));
    }

    #[test]
    fn test_lock_is_reacquirable_after_drop() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        let lock = store.lock().unwrap();
        assert!(lock.path().ends_with(".uvm.lock"));
        drop(lock);
        store.lock().unwrap();
    }

    #[test]
    fn test_second_lock_waits_for_first_guard() {
        use std::sync::mpsc;
        use std::time::Duration;

        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        let held = store.lock().unwrap();

        let (tx, rx) = mpsc::channel();
        let contender = store.clone();
        let waiter = std::thread::spawn(move || {
            let lock = contender.lock();
            tx.send(lock.is_ok()).unwrap();
        });

        assert!(rx.recv_timeout(Duration::from_millis(300)).is_err());

        drop(held);
        assert!(rx.recv_timeout(Duration::from_secs(5)).unwrap());
        waiter.join().unwrap();
    }
}
