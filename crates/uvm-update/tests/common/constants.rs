//! Shared constants for test infrastructure

// Version constants
pub const VERSION_1_0_0: &str = "1.0.0";
pub const VERSION_1_9_0: &str = "1.9.0";
pub const VERSION_1_10_0: &str = "1.10.0";
pub const VERSION_2_0_0: &str = "2.0.0";

// Remote locations served by the fake transport
pub const MANIFEST_URL: &str = "https://releases.example.com/versions.json";
pub const ARCHIVE_BASE_URL: &str = "https://releases.example.com/archives";

/// Environment variable the fixtures point the manifest source at, so the
/// real `UVM_MANIFEST` never leaks into a test
pub const TEST_MANIFEST_ENV_VAR: &str = "UVM_TEST_PIPELINE_MANIFEST";

// Archive contents
pub const APP_FILE: &str = "app.txt";
pub const NESTED_FILE: &str = "lib/core.dat";
pub const NESTED_CONTENT: &[u8] = b"core library data";

/// Download URL for a version's archive
pub fn archive_url(version: &str) -> String {
    format!("{}/app-{}.zip", ARCHIVE_BASE_URL, version)
}

/// Content of `app.txt` inside a version's archive
pub fn app_content(version: &str) -> String {
    format!("application build {}", version)
}
