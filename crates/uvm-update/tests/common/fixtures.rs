//! Temporary deployment directory wired to an installation pipeline

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;
use uvm_core::config::StoreLayout;
use uvm_update::{InstallationPipeline, ManifestSource, MemorySink, Reporter};

use super::builders::*;
use super::constants::*;
use super::fakes::FakeTransport;

/// One throwaway deployment: store, marker, alias and scratch paths all
/// live in a temp directory
pub struct TestEnv {
    pub dir: TempDir,
    pub layout: StoreLayout,
    pub transport: Arc<FakeTransport>,
    pub sink: Arc<MemorySink>,
    pub cancel: CancellationToken,
    remote_manifest: bool,
}

impl TestEnv {
    pub fn new() -> Self {
        let dir = TempDir::new().expect("create temp dir");
        let layout = StoreLayout::in_dir(dir.path());
        Self {
            dir,
            layout,
            transport: Arc::new(FakeTransport::new()),
            sink: Arc::new(MemorySink::new()),
            cancel: CancellationToken::new(),
            remote_manifest: true,
        }
    }

    /// Configure no remote manifest URL
    pub fn without_remote_manifest(mut self) -> Self {
        self.remote_manifest = false;
        self
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Serve a manifest at [`MANIFEST_URL`]
    pub fn serve_manifest(&self, manifest: &ManifestBuilder) {
        self.transport.serve(MANIFEST_URL, manifest.build());
    }

    /// Serve the standard archive for `version`, returning its digest
    pub fn serve_release(&self, version: &str) -> String {
        let bytes = release_zip(version);
        let digest = sha256_hex(&bytes);
        self.transport.serve(&archive_url(version), bytes);
        digest
    }

    /// Pretend `version` was installed earlier
    pub fn preinstall(&self, version: &str) -> PathBuf {
        let dir = self.layout.store_root.join(version);
        fs::create_dir_all(&dir).expect("create version dir");
        fs::write(dir.join(APP_FILE), app_content(version)).expect("write app file");
        dir
    }

    pub fn write_marker(&self, version: &str) {
        fs::write(&self.layout.marker_file, version).expect("write marker");
    }

    pub fn marker(&self) -> Option<String> {
        fs::read_to_string(&self.layout.marker_file)
            .ok()
            .map(|s| s.trim().to_string())
    }

    /// Content of `app.txt` seen through the alias
    pub fn active_app_content(&self) -> Option<String> {
        fs::read_to_string(self.layout.alias_path.join(APP_FILE)).ok()
    }

    pub fn pipeline(&self) -> InstallationPipeline {
        let source = ManifestSource::new(self.dir.path())
            .with_env_var(TEST_MANIFEST_ENV_VAR)
            .with_remote_url(self.remote_manifest.then(|| MANIFEST_URL.to_string()));

        InstallationPipeline::new(self.layout.clone(), source, self.transport.clone())
            .with_reporter(Reporter::new(self.sink.clone()).with_verbose(true))
            .with_cancellation(self.cancel.clone())
    }
}
