//! Settings loading and filesystem layout

mod layout;
mod loader;
mod settings;

pub use layout::{StoreLayout, STORE_LOCK_FILE};
pub use loader::{HierarchicalConfigLoader, LoadedSettings, GLOBAL_CONFIG_FILE};
pub use settings::{NetworkSettings, UvmSettings, DRIVE_DOWNLOAD_BASE};
