//! Shared utility functions for uvm crates

use crate::error::{Error, Result};
use camino::Utf8PathBuf;

/// Get the user's home directory
///
/// HOME wins over `dirs::home_dir()` so that wrappers and test harnesses
/// that override it are respected.
pub fn get_home_dir() -> Result<Utf8PathBuf> {
    if let Ok(home) = std::env::var("HOME") {
        if !home.is_empty() {
            return Ok(Utf8PathBuf::from(home));
        }
    }

    let home = dirs::home_dir()
        .ok_or_else(|| Error::invalid_config("Could not determine home directory"))?;
    Utf8PathBuf::from_path_buf(home)
        .map_err(|p| Error::invalid_config(format!("Home directory is not UTF-8: {}", p.display())))
}

/// Format a byte count for display (e.g. `1.50 MB`)
pub fn human_readable_size(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    let mut size = bytes as f64;
    let mut unit_index = 0;

    while size >= 1024.0 && unit_index < UNITS.len() - 1 {
        size /= 1024.0;
        unit_index += 1;
    }

    format!("{:.2} {}", size, UNITS[unit_index])
}
