//! Settings types
//!
//! Every field has a default so a config file only needs to name the keys it
//! changes. Keys are kebab-case in YAML.

use serde::{Deserialize, Serialize};

/// Base URL used to turn a Google Drive file id into a direct download link
pub const DRIVE_DOWNLOAD_BASE: &str = "https://drive.google.com/uc?export=download&id=";

/// Top-level uvm settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct UvmSettings {
    /// Google Drive file id of the published version list
    pub version_list_file_id: String,

    /// Direct manifest URL, takes precedence over the file id
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version_list_url: Option<String>,

    /// Local manifest path, checked before any other source
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manifest_path: Option<String>,

    /// Directory holding one subdirectory per installed version
    pub local_base_dir: String,

    /// File recording the active version
    pub current_version_file: String,

    /// Scratch directory archives are extracted into
    pub temp_extract_path: String,

    /// Where the downloaded archive is written
    pub zip_file_path: String,

    /// Name of the "current" alias directory
    pub app_link_name: String,

    /// Show detail-level status lines to the user
    pub verbose_output: bool,

    /// Network settings for the HTTP transport
    pub network: NetworkSettings,
}

impl Default for UvmSettings {
    fn default() -> Self {
        Self {
            version_list_file_id: String::new(),
            version_list_url: None,
            manifest_path: None,
            local_base_dir: "app_versions".to_string(),
            current_version_file: "current_version.txt".to_string(),
            temp_extract_path: "temp_update".to_string(),
            zip_file_path: "update.zip".to_string(),
            app_link_name: "current".to_string(),
            verbose_output: false,
            network: NetworkSettings::default(),
        }
    }
}

impl UvmSettings {
    /// Remote manifest URL, if any remote source is configured
    pub fn version_list_url(&self) -> Option<String> {
        if let Some(url) = self.version_list_url.as_deref().map(str::trim) {
            if !url.is_empty() {
                return Some(url.to_string());
            }
        }

        let file_id = self.version_list_file_id.trim();
        if file_id.is_empty() {
            None
        } else {
            Some(format!("{}{}", DRIVE_DOWNLOAD_BASE, file_id))
        }
    }
}

/// HTTP transport settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct NetworkSettings {
    /// Timeout for small requests such as the manifest
    pub http_timeout_secs: u64,

    /// Timeout for archive downloads
    pub download_timeout_secs: u64,

    /// TCP connect timeout
    pub connect_timeout_secs: u64,

    /// User-Agent header sent with every request
    pub user_agent: String,
}

impl Default for NetworkSettings {
    fn default() -> Self {
        Self {
            http_timeout_secs: 30,
            download_timeout_secs: 600,
            connect_timeout_secs: 15,
            user_agent: format!("UpdateVersionManager/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}
