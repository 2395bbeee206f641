//! Directory helpers shared by activation and installation

use std::fs;
use std::io;
use std::path::Path;
use walkdir::WalkDir;

/// Recursively copy `src` into `dst`, overwriting existing files.
///
/// Symbolic links inside `src` are followed, so `dst` ends up with plain
/// files carrying the same bytes. Returns the number of files copied.
pub(crate) fn copy_tree(src: &Path, dst: &Path) -> io::Result<u64> {
    fs::create_dir_all(dst)?;
    let mut copied = 0;

    for entry in WalkDir::new(src).min_depth(1).follow_links(true) {
        let entry = entry.map_err(io::Error::from)?;
        let relative = entry
            .path()
            .strip_prefix(src)
            .map_err(io::Error::other)?;
        let target = dst.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)?;
        } else {
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(entry.path(), &target)?;
            copied += 1;
        }
    }

    Ok(copied)
}

/// Number of regular files below `root` (links followed)
pub(crate) fn count_files(root: &Path) -> u64 {
    WalkDir::new(root)
        .min_depth(1)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .count() as u64
}

/// Remove a file if present; a missing file is not an error
pub(crate) fn remove_file_if_exists(path: &Path) -> io::Result<()> {
    match fs::remove_file(path) {
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        other => other,
    }
}

/// Remove a directory tree if present; a missing directory is not an error
pub(crate) fn remove_dir_if_exists(path: &Path) -> io::Result<()> {
    match fs::remove_dir_all(path) {
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        other => other,
    }
}

/// Move a directory, copying when source and destination are on different
/// filesystems
pub(crate) fn move_dir(src: &Path, dst: &Path) -> io::Result<()> {
    match fs::rename(src, dst) {
        Err(e) if e.kind() == io::ErrorKind::CrossesDevices => {
            tracing::debug!(
                "rename {} -> {} crosses devices, copying",
                src.display(),
                dst.display()
            );
            copy_tree(src, dst)?;
            fs::remove_dir_all(src)
        }
        other => other,
    }
}
