//! Wiring from CLI flags and settings to the installation pipeline

use anyhow::{Context, Result};
use camino::Utf8Path;
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use uvm_core::config::{HierarchicalConfigLoader, StoreLayout, UvmSettings};
use uvm_update::{HttpTransport, InstallationPipeline, ManifestSource, Reporter};

use crate::cli::Cli;
use crate::output::ConsoleSink;

/// Everything a command needs to run against one deployment
pub struct AppContext {
    pub settings: UvmSettings,
    pub layout: StoreLayout,
    pub pipeline: InstallationPipeline,
}

impl AppContext {
    /// Load settings and build the pipeline for the current invocation
    pub fn build(cli: &Cli, cancel: CancellationToken) -> Result<Self> {
        let loader = HierarchicalConfigLoader::new()?;
        let loaded = loader.load(cli.config.as_deref())?;
        let settings = loaded.settings.clone();

        let base_dir = match &cli.base_dir {
            Some(dir) => dir.as_std_path().to_path_buf(),
            None => std::env::current_dir().context("Failed to read the working directory")?,
        };
        let layout = StoreLayout::resolve(&settings, &base_dir);

        let explicit_manifest = cli
            .manifest
            .as_deref()
            .map(|p| p.as_std_path().to_path_buf())
            .or_else(|| settings.manifest_path.as_ref().map(PathBuf::from));
        let source = ManifestSource::new(&base_dir)
            .with_explicit_path(explicit_manifest)
            .with_config_dir(loaded.config_file_dir().map(|d| d.as_std_path().to_path_buf()))
            .with_remote_url(settings.version_list_url());

        let sink = ConsoleSink::new(cli.quiet);
        let reporter = Reporter::new(Arc::new(sink))
            .with_verbose(cli.verbose > 0 || settings.verbose_output);

        let transport = HttpTransport::new(&settings.network)?.with_progress(reporter.is_interactive());

        let pipeline = InstallationPipeline::new(layout.clone(), source, Arc::new(transport))
            .with_reporter(reporter)
            .with_cancellation(cancel);

        tracing::debug!(
            "Store root {}, alias {}, config {}",
            layout.store_root.display(),
            layout.alias_path.display(),
            loaded
                .config_file
                .as_deref()
                .map(Utf8Path::as_str)
                .unwrap_or("(defaults)")
        );

        Ok(Self {
            settings,
            layout,
            pipeline,
        })
    }
}
