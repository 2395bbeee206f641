//! Hierarchical settings loader with precedence
//!
//! Loads settings from multiple sources with the following precedence (low to high):
//! 1. Built-in defaults
//! 2. Global config (~/.uvm/config.yaml)
//! 3. Explicit config file (`--config`)
//! 4. Environment variables (UVM_* prefix)
//! 5. CLI flags (handled by caller)
//!
//! Layers are merged as YAML values before deserializing, so a file that
//! sets one nested key does not reset its siblings. JSON files are accepted
//! as they are valid YAML.

use crate::config::settings::UvmSettings;
use crate::error::{Error, Result};
use crate::utils::get_home_dir;
use camino::{Utf8Path, Utf8PathBuf};
use serde_yaml_ng::Value;
use std::env;
use std::fs;
use tracing::debug;

/// File name of the global config inside the config directory
pub const GLOBAL_CONFIG_FILE: &str = "config.yaml";

/// Settings plus where they came from
#[derive(Debug, Clone)]
pub struct LoadedSettings {
    pub settings: UvmSettings,

    /// Explicit config file, when one was given
    pub config_file: Option<Utf8PathBuf>,
}

impl LoadedSettings {
    /// Directory of the explicit config file, used to resolve relative manifest paths
    pub fn config_file_dir(&self) -> Option<&Utf8Path> {
        self.config_file.as_deref().and_then(Utf8Path::parent)
    }
}

/// Configuration hierarchy loader
pub struct HierarchicalConfigLoader {
    /// Base directory for configuration files
    config_dir: Utf8PathBuf,
}

impl HierarchicalConfigLoader {
    /// Create a loader rooted at the standard config directory (~/.uvm)
    pub fn new() -> Result<Self> {
        Ok(Self {
            config_dir: get_home_dir()?.join(".uvm"),
        })
    }

    /// Create a loader with a custom config directory
    pub fn with_dir(config_dir: Utf8PathBuf) -> Self {
        Self { config_dir }
    }

    pub fn config_dir(&self) -> &Utf8Path {
        &self.config_dir
    }

    /// Directory the binary writes its log file into
    pub fn log_dir(&self) -> Utf8PathBuf {
        self.config_dir.join("logs")
    }

    /// Load settings with hierarchical precedence
    pub fn load(&self, explicit: Option<&Utf8Path>) -> Result<LoadedSettings> {
        let mut merged = serde_yaml_ng::to_value(UvmSettings::default())?;

        let global = self.config_dir.join(GLOBAL_CONFIG_FILE);
        if global.is_file() {
            debug!("Loading global config from {}", global);
            merge_values(&mut merged, Self::load_yaml_value(&global)?);
        }

        let config_file = match explicit {
            Some(path) => {
                if !path.is_file() {
                    return Err(Error::config_not_found(path.as_str()));
                }
                debug!("Loading config from {}", path);
                merge_values(&mut merged, Self::load_yaml_value(path)?);
                Some(absolutize(path)?)
            }
            None => None,
        };

        let settings: UvmSettings = serde_yaml_ng::from_value(merged)
            .map_err(|e| Error::invalid_config(format!("Failed to read settings: {}", e)))?;
        let settings = Self::apply_env_overrides(settings)?;

        Ok(LoadedSettings {
            settings,
            config_file,
        })
    }

    /// Load a YAML file as an untyped value; empty files contribute nothing
    fn load_yaml_value(path: &Utf8Path) -> Result<Value> {
        let content = fs::read_to_string(path)?;
        if content.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_yaml_ng::from_str(&content)
            .map_err(|e| Error::invalid_config(format!("Failed to parse {}: {}", path, e)))
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(mut settings: UvmSettings) -> Result<UvmSettings> {
        if let Ok(val) = env::var("UVM_VERSION_LIST_FILE_ID") {
            settings.version_list_file_id = val;
        }

        if let Ok(val) = env::var("UVM_VERSION_LIST_URL") {
            settings.version_list_url = Some(val);
        }

        if let Ok(val) = env::var("UVM_BASE_DIR") {
            settings.local_base_dir = val;
        }

        if let Ok(val) = env::var("UVM_CURRENT_VERSION_FILE") {
            settings.current_version_file = val;
        }

        if let Ok(val) = env::var("UVM_LINK_NAME") {
            settings.app_link_name = val;
        }

        if let Ok(val) = env::var("UVM_VERBOSE") {
            settings.verbose_output = parse_bool(&val)
                .ok_or_else(|| Error::invalid_config("UVM_VERBOSE must be true or false"))?;
        }

        if let Ok(val) = env::var("UVM_HTTP_TIMEOUT_SECS") {
            settings.network.http_timeout_secs = val.parse().map_err(|_| {
                Error::invalid_config("UVM_HTTP_TIMEOUT_SECS must be a valid number")
            })?;
        }

        if let Ok(val) = env::var("UVM_DOWNLOAD_TIMEOUT_SECS") {
            settings.network.download_timeout_secs = val.parse().map_err(|_| {
                Error::invalid_config("UVM_DOWNLOAD_TIMEOUT_SECS must be a valid number")
            })?;
        }

        Ok(settings)
    }
}

/// Recursively overlay `overlay` onto `base`. Mappings merge key by key,
/// null leaves the base untouched, anything else replaces it.
fn merge_values(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (_, Value::Null) => {}
        (Value::Mapping(base_map), Value::Mapping(overlay_map)) => {
            for (key, value) in overlay_map {
                match base_map.get_mut(&key) {
                    Some(existing) => merge_values(existing, value),
                    None => {
                        base_map.insert(key, value);
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn absolutize(path: &Utf8Path) -> Result<Utf8PathBuf> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    let cwd = env::current_dir()?;
    let cwd = Utf8PathBuf::from_path_buf(cwd).map_err(|p| {
        Error::invalid_config(format!("Working directory is not UTF-8: {}", p.display()))
    })?;
    Ok(cwd.join(path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::TempDir;

    fn utf8(dir: &TempDir) -> Utf8PathBuf {
        Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap()
    }

    #[test]
    #[serial]
    fn test_defaults_without_files() {
        let dir = TempDir::new().unwrap();
        let loader = HierarchicalConfigLoader::with_dir(utf8(&dir));
        let loaded = loader.load(None).unwrap();
        assert_eq!(loaded.settings, UvmSettings::default());
        assert!(loaded.config_file.is_none());
    }

    #[test]
    #[serial]
    fn test_explicit_file_overrides_global() {
        let dir = TempDir::new().unwrap();
        let root = utf8(&dir);
        fs::write(
            root.join(GLOBAL_CONFIG_FILE),
            "local-base-dir: global_versions\nnetwork:\n  http-timeout-secs: 5\n",
        )
        .unwrap();
        let explicit = root.join("project.yaml");
        fs::write(&explicit, "local-base-dir: project_versions\n").unwrap();

        let loaded = HierarchicalConfigLoader::with_dir(root.clone())
            .load(Some(&explicit))
            .unwrap();

        assert_eq!(loaded.settings.local_base_dir, "project_versions");
        // Nested key from the global layer survives the partial overlay
        assert_eq!(loaded.settings.network.http_timeout_secs, 5);
        assert_eq!(loaded.settings.network.download_timeout_secs, 600);
        assert_eq!(loaded.config_file_dir(), Some(root.as_path()));
    }

    #[test]
    #[serial]
    fn test_json_config_is_accepted() {
        let dir = TempDir::new().unwrap();
        let root = utf8(&dir);
        let explicit = root.join("appsettings.json");
        fs::write(
            &explicit,
            r#"{"version-list-file-id": "drive-id", "verbose-output": true}"#,
        )
        .unwrap();

        let loaded = HierarchicalConfigLoader::with_dir(root)
            .load(Some(&explicit))
            .unwrap();
        assert_eq!(loaded.settings.version_list_file_id, "drive-id");
        assert!(loaded.settings.verbose_output);
    }

    #[test]
    #[serial]
    fn test_missing_explicit_file() {
        let dir = TempDir::new().unwrap();
        let root = utf8(&dir);
        let err = HierarchicalConfigLoader::with_dir(root.clone())
            .load(Some(&root.join("nope.yaml")))
            .unwrap_err();
        assert!(matches!(err, Error::ConfigNotFound { .. }));
    }

    #[test]
    #[serial]
    fn test_invalid_yaml_reports_path() {
        let dir = TempDir::new().unwrap();
        let root = utf8(&dir);
        let explicit = root.join("broken.yaml");
        fs::write(&explicit, "local-base-dir: [unterminated\n").unwrap();

        let err = HierarchicalConfigLoader::with_dir(root)
            .load(Some(&explicit))
            .unwrap_err();
        match err {
            Error::InvalidConfig { message } => assert!(message.contains("broken.yaml")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    #[serial]
    fn test_env_overrides() {
        let dir = TempDir::new().unwrap();
        env::set_var("UVM_BASE_DIR", "env_versions");
        env::set_var("UVM_VERBOSE", "yes");
        env::set_var("UVM_DOWNLOAD_TIMEOUT_SECS", "42");

        let loaded = HierarchicalConfigLoader::with_dir(utf8(&dir)).load(None);

        env::remove_var("UVM_BASE_DIR");
        env::remove_var("UVM_VERBOSE");
        env::remove_var("UVM_DOWNLOAD_TIMEOUT_SECS");

        let settings = loaded.unwrap().settings;
        assert_eq!(settings.local_base_dir, "env_versions");
        assert!(settings.verbose_output);
        assert_eq!(settings.network.download_timeout_secs, 42);
    }

    #[test]
    #[serial]
    fn test_env_override_rejects_bad_number() {
        let dir = TempDir::new().unwrap();
        env::set_var("UVM_HTTP_TIMEOUT_SECS", "soon");
        let result = HierarchicalConfigLoader::with_dir(utf8(&dir)).load(None);
        env::remove_var("UVM_HTTP_TIMEOUT_SECS");
        assert!(matches!(result, Err(Error::InvalidConfig { .. })));
    }

    #[test]
    fn test_merge_values_null_keeps_base() {
        let mut base: Value = serde_yaml_ng::from_str("a: 1\nb: 2\n").unwrap();
        merge_values(&mut base, Value::Null);
        let expected: Value = serde_yaml_ng::from_str("a: 1\nb: 2\n").unwrap();
        assert_eq!(base, expected);
    }
}
