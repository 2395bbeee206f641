//! Installation pipeline
//!
//! Orchestrates manifest resolution, download, verification, extraction,
//! placement into the version store and activation. Each stage is awaited
//! before the next starts.
//!
//! Scratch artifacts:
//! - the archive is deleted once an install attempt ends, except after an
//!   integrity failure, where it is kept for inspection
//! - the staging directory is cleared before extraction and moved into the
//!   store on success; after an extraction failure it is left in place
//! - on cancellation both are removed
//!
//! Activation writes the alias first and the marker second, so the marker
//! never names a version whose alias step did not complete. If the process
//! dies between the two, [`InstallationPipeline::reconcile`] trusts the
//! alias.

use std::future::Future;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use uvm_core::config::StoreLayout;
use uvm_core::types::{Manifest, ReleaseRecord};
use uvm_core::{Error, Result};

use crate::activation::{ActivationManager, AliasKind, AliasStatus};
use crate::archive;
use crate::fs_util::{move_dir, remove_dir_if_exists, remove_file_if_exists};
use crate::hasher::{compute_digest, digests_match};
use crate::manifest::{parse_manifest, ManifestSource};
use crate::output::Reporter;
use crate::prompt::ConfirmationPrompt;
use crate::store::{StoreLock, VersionStore};
use crate::transport::Transport;

/// Result of an install request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallOutcome {
    /// Downloaded, verified and placed into the store
    Installed { version: String, activated: bool },

    /// Already installed; only the alias was switched
    Activated { version: String },

    /// Already installed and the user chose not to reinstall
    Declined { version: String },
}

/// Result of an auto-update run. Failures are folded in, never raised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// The manifest lists no releases
    NoReleases,

    /// The latest release is already active
    UpToDate { version: String },

    /// Switched to the latest release
    Updated {
        previous: Option<String>,
        version: String,
    },

    Failed { message: String },
}

/// Current and latest versions, compared without installing anything
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateCheck {
    pub current: Option<String>,

    /// `None` when the manifest lists no releases
    pub latest: Option<String>,
}

impl UpdateCheck {
    /// Whether the latest release differs from the active version
    pub fn is_update_available(&self) -> bool {
        match (&self.current, &self.latest) {
            (_, None) => false,
            (None, Some(_)) => true,
            (Some(current), Some(latest)) => current != latest,
        }
    }
}

/// Top-level orchestrator for install, activate and update flows
pub struct InstallationPipeline {
    layout: StoreLayout,
    store: VersionStore,
    activation: ActivationManager,
    source: ManifestSource,
    transport: Arc<dyn Transport>,
    reporter: Reporter,
    cancel: CancellationToken,
}

impl InstallationPipeline {
    pub fn new(layout: StoreLayout, source: ManifestSource, transport: Arc<dyn Transport>) -> Self {
        Self {
            store: VersionStore::new(&layout),
            activation: ActivationManager::new(layout.alias_path.clone()),
            layout,
            source,
            transport,
            reporter: Reporter::default(),
            cancel: CancellationToken::new(),
        }
    }

    /// Send status events to this reporter
    pub fn with_reporter(mut self, reporter: Reporter) -> Self {
        self.reporter = reporter;
        self
    }

    /// Abort downloads and extraction when this token is cancelled
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn layout(&self) -> &StoreLayout {
        &self.layout
    }

    pub fn store(&self) -> &VersionStore {
        &self.store
    }

    pub fn activation(&self) -> &ActivationManager {
        &self.activation
    }

    pub fn reporter(&self) -> &Reporter {
        &self.reporter
    }

    /// Resolve, fetch and parse the manifest. Skipped entries are reported
    /// as warnings.
    pub async fn fetch_manifest(&self) -> Result<Manifest> {
        let location = self.source.resolve()?;
        self.reporter
            .detail(format!("Reading version list from {}", location));

        let raw = self
            .cancellable(self.source.fetch_raw(&location, self.transport.as_ref()))
            .await?;
        let parsed = parse_manifest(&raw)?;

        for warning in &parsed.warnings {
            self.reporter.warn(warning.as_str());
        }
        self.reporter.detail(format!(
            "Version list has {} release(s)",
            parsed.manifest.len()
        ));
        Ok(parsed.manifest)
    }

    /// Install with confirmation before reinstalling and before activating
    pub async fn install_interactive(
        &self,
        version: &str,
        prompt: &dyn ConfirmationPrompt,
    ) -> Result<InstallOutcome> {
        let _lock = self.lock_store().await?;

        if self.store.is_installed(version) {
            let reinstall = prompt.ask(
                &format!("Version {} is already installed. Reinstall?", version),
                false,
            )?;
            if !reinstall {
                self.reporter
                    .info(format!("Keeping the existing installation of {}", version));
                return Ok(InstallOutcome::Declined {
                    version: version.to_string(),
                });
            }
            self.reporter
                .detail(format!("Removing existing installation of {}", version));
            std::fs::remove_dir_all(self.store.version_dir(version))?;
        }

        let manifest = self.fetch_manifest().await?;
        let record = manifest
            .find(version)
            .ok_or_else(|| Error::version_not_found(version))?;

        self.install_record(record).await?;
        self.reporter
            .success(format!("Version {} installed", version));

        let activate = prompt.ask(&format!("Switch to version {} now?", version), true)?;
        if activate {
            self.activate_installed(version).await?;
        } else {
            self.reporter
                .info(format!("Run 'uvm use {}' to switch later", version));
        }

        Ok(InstallOutcome::Installed {
            version: version.to_string(),
            activated: activate,
        })
    }

    /// Install and activate without asking anything. An installed version is
    /// only re-activated; nothing is fetched.
    pub async fn install_unattended(&self, version: &str) -> Result<InstallOutcome> {
        let _lock = self.lock_store().await?;

        if self.store.is_installed(version) {
            return self.reactivate(version).await;
        }

        let manifest = self.fetch_manifest().await?;
        let record = manifest
            .find(version)
            .ok_or_else(|| Error::version_not_found(version))?;
        self.install_and_activate(record).await
    }

    /// Move to the latest release. Never fails; problems come back as
    /// [`UpdateOutcome::Failed`] after being reported.
    pub async fn auto_update(&self) -> UpdateOutcome {
        match self.auto_update_locked().await {
            Ok(outcome) => outcome,
            Err(e) => {
                self.reporter.error(format!("Update failed: {}", e));
                UpdateOutcome::Failed {
                    message: e.to_string(),
                }
            }
        }
    }

    /// Compare the active version against the manifest's latest release.
    /// Read-only: takes no store lock and downloads no archives.
    pub async fn check_update(&self) -> Result<UpdateCheck> {
        let manifest = self.fetch_manifest().await?;
        let latest = manifest.latest().map(|r| r.version.clone());
        let current = self.store.current_version()?;
        Ok(UpdateCheck { current, latest })
    }

    /// Auto-update, optionally removing the version that was active before
    pub async fn self_update(&self, clean_previous: bool) -> UpdateOutcome {
        let outcome = self.auto_update().await;

        if clean_previous {
            if let UpdateOutcome::Updated {
                previous: Some(previous),
                version,
            } = &outcome
            {
                if previous != version {
                    match self.clean(previous).await {
                        Ok(()) => self
                            .reporter
                            .success(format!("Removed previous version {}", previous)),
                        Err(e) => self.reporter.warn(format!(
                            "Could not remove previous version {}: {}",
                            previous, e
                        )),
                    }
                }
            }
        }

        outcome
    }

    /// Activate an installed version
    pub async fn use_version(&self, version: &str) -> Result<AliasKind> {
        let _lock = self.lock_store().await?;
        self.activate_installed(version).await
    }

    /// Remove an installed, inactive version
    pub async fn clean(&self, version: &str) -> Result<()> {
        let _lock = self.lock_store().await?;
        self.store.remove(version)?;
        self.reporter.success(format!("Removed version {}", version));
        Ok(())
    }

    /// Repair a marker that lags behind a linked alias.
    ///
    /// Returns the version the marker was corrected to, if it changed. A
    /// copied alias carries no version name and is left alone.
    pub fn reconcile(&self) -> Result<Option<String>> {
        let Some(AliasStatus {
            kind: AliasKind::Symlink,
            target: Some(target),
            ..
        }) = self.activation.inspect()?
        else {
            return Ok(None);
        };

        let target = if target.is_relative() {
            match self.activation.alias_path().parent() {
                Some(parent) => parent.join(target),
                None => target,
            }
        } else {
            target
        };

        let store_root = std::path::absolute(self.store.root())?;
        let in_store = target
            .parent()
            .map(|p| std::path::absolute(p).is_ok_and(|p| p == store_root))
            .unwrap_or(false);
        let Some(linked) = target.file_name().and_then(|n| n.to_str()) else {
            return Ok(None);
        };
        if !in_store || !self.store.is_installed(linked) {
            return Ok(None);
        }

        let current = self.store.current_version()?;
        if current.as_deref() == Some(linked) {
            return Ok(None);
        }

        self.store.record_current(linked)?;
        self.reporter.warn(format!(
            "Current version marker said {} but the alias points at {}; marker updated",
            current.as_deref().unwrap_or("nothing"),
            linked
        ));
        Ok(Some(linked.to_string()))
    }

    async fn auto_update_locked(&self) -> Result<UpdateOutcome> {
        let _lock = self.lock_store().await?;

        self.reporter.info("Checking for the latest version...");
        let manifest = self.fetch_manifest().await?;

        let Some(latest) = manifest.latest() else {
            self.reporter.warn("The version list contains no releases");
            return Ok(UpdateOutcome::NoReleases);
        };

        let current = self.store.current_version()?;
        self.reporter
            .info(format!("Latest version: {}", latest.version));
        self.reporter.info(format!(
            "Current version: {}",
            current.as_deref().unwrap_or("none")
        ));

        if current.as_deref() == Some(latest.version.as_str()) {
            self.reporter.success("Already up to date");
            return Ok(UpdateOutcome::UpToDate {
                version: latest.version.clone(),
            });
        }

        if self.store.is_installed(&latest.version) {
            self.reactivate(&latest.version).await?;
        } else {
            self.install_and_activate(latest).await?;
        }

        match &current {
            Some(previous) => self.reporter.success(format!(
                "Updated {} -> {}",
                previous, latest.version
            )),
            None => self
                .reporter
                .success(format!("Installed {} (first install)", latest.version)),
        }

        Ok(UpdateOutcome::Updated {
            previous: current,
            version: latest.version.clone(),
        })
    }

    async fn reactivate(&self, version: &str) -> Result<InstallOutcome> {
        self.reporter.info(format!(
            "Version {} is already installed, switching to it",
            version
        ));
        self.activate_installed(version).await?;
        Ok(InstallOutcome::Activated {
            version: version.to_string(),
        })
    }

    async fn install_and_activate(&self, record: &ReleaseRecord) -> Result<InstallOutcome> {
        self.install_record(record).await?;
        self.reporter
            .success(format!("Version {} installed", record.version));
        self.activate_installed(&record.version).await?;
        Ok(InstallOutcome::Installed {
            version: record.version.clone(),
            activated: true,
        })
    }

    /// Alias first, then marker
    async fn activate_installed(&self, version: &str) -> Result<AliasKind> {
        if !self.store.is_installed(version) {
            return Err(Error::version_dir_missing(
                self.store.version_dir(version).display().to_string(),
            ));
        }

        let activation = self.activation.clone();
        let version_dir = self.store.version_dir(version);
        let kind = tokio::task::spawn_blocking(move || activation.activate(&version_dir))
            .await
            .map_err(|e| Error::Io(std::io::Error::other(e)))??;

        self.store.record_current(version)?;
        self.reporter
            .success(format!("Now using version {} ({})", version, kind));
        Ok(kind)
    }

    /// Download, verify, extract and place one release, then clean up
    async fn install_record(&self, record: &ReleaseRecord) -> Result<()> {
        let result = self.fetch_verify_extract(record).await;
        let archive = &self.layout.archive_path;

        match &result {
            Err(Error::IntegrityCheckFailed { .. }) => {
                self.reporter
                    .detail(format!("Keeping {} for inspection", archive.display()));
            }
            Err(Error::Cancelled) => {
                self.discard_archive();
                if let Err(e) = remove_dir_if_exists(&self.layout.staging_dir) {
                    self.reporter.warn(format!(
                        "Could not remove {}: {}",
                        self.layout.staging_dir.display(),
                        e
                    ));
                }
            }
            _ => self.discard_archive(),
        }

        result
    }

    async fn fetch_verify_extract(&self, record: &ReleaseRecord) -> Result<()> {
        let archive = &self.layout.archive_path;
        let staging = &self.layout.staging_dir;
        let version = &record.version;

        if let Some(parent) = archive.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        remove_file_if_exists(archive)?;

        self.reporter
            .info(format!("Downloading version {}...", version));
        self.reporter.detail(format!("Source: {}", record.download_url));
        self.cancellable(self.transport.fetch_to_file(&record.download_url, archive))
            .await?;

        match record.expected_digest() {
            Some(expected) => {
                self.reporter.detail("Verifying checksum...");
                let path = archive.clone();
                let actual = tokio::task::spawn_blocking(move || compute_digest(&path))
                    .await
                    .map_err(|e| Error::Io(std::io::Error::other(e)))??;
                if !digests_match(&actual, expected) {
                    return Err(Error::integrity_check_failed(
                        archive.display().to_string(),
                        expected,
                        actual,
                    ));
                }
                self.reporter.detail("Checksum verified");
            }
            None => self.reporter.warn(format!(
                "No checksum published for version {}; skipping verification",
                version
            )),
        }

        self.reporter.detail("Extracting...");
        remove_dir_if_exists(staging)?;
        tokio::fs::create_dir_all(staging).await?;

        let (archive_path, staging_path, token) =
            (archive.clone(), staging.clone(), self.cancel.clone());
        let summary = tokio::task::spawn_blocking(move || {
            archive::extract(&archive_path, &staging_path, &token)
        })
        .await
        .map_err(|e| Error::Io(std::io::Error::other(e)))??;
        self.reporter.detail(format!(
            "Extracted {} files into {}",
            summary.files,
            staging.display()
        ));

        let version_dir = self.store.version_dir(version);
        tokio::fs::create_dir_all(self.store.root()).await?;
        remove_dir_if_exists(&version_dir)?;
        move_dir(staging, &version_dir)?;
        self.reporter
            .detail(format!("Placed into {}", version_dir.display()));

        Ok(())
    }

    /// Best-effort archive removal
    fn discard_archive(&self) {
        let archive = &self.layout.archive_path;
        if let Err(e) = remove_file_if_exists(archive) {
            self.reporter
                .warn(format!("Could not delete {}: {}", archive.display(), e));
        }
    }

    async fn lock_store(&self) -> Result<StoreLock> {
        let store = self.store.clone();
        tokio::task::spawn_blocking(move || store.lock())
            .await
            .map_err(|e| Error::Io(std::io::Error::other(e)))?
    }

    async fn cancellable<T>(&self, fut: impl Future<Output = Result<T>>) -> Result<T> {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(Error::Cancelled),
            result = fut => result,
        }
    }
}
