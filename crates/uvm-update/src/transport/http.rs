//! reqwest-backed transport

use async_trait::async_trait;
use futures_util::StreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Response, StatusCode};
use std::path::Path;
use std::time::Duration;
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tracing::{debug, warn};
use uvm_core::config::NetworkSettings;
use uvm_core::utils::human_readable_size;
use uvm_core::{Error, Result};

use super::source::{drive_confirm_link, looks_like_html, SourceKind, GOOGLE_DRIVE_ORIGIN};
use super::Transport;
use crate::archive::format_from_magic;

/// Downloads smaller than this are suspicious (likely an error page)
const MIN_EXPECTED_ARCHIVE_SIZE: u64 = 1000;

/// HTTP(S) transport with Google Drive and GitHub handling
pub struct HttpTransport {
    /// Client for small documents (manifest)
    client: Client,

    /// Client with the longer download timeout
    download_client: Client,

    /// Show an indicatif progress bar while downloading
    show_progress: bool,

    /// Additional origin handled as Google Drive (mirrors, test servers)
    drive_origin: Option<String>,
}

impl HttpTransport {
    /// Create a transport from network settings
    pub fn new(settings: &NetworkSettings) -> Result<Self> {
        let build = |timeout_secs: u64| {
            Client::builder()
                .user_agent(&settings.user_agent)
                .connect_timeout(Duration::from_secs(settings.connect_timeout_secs))
                .timeout(Duration::from_secs(timeout_secs))
                .build()
                .map_err(|e| Error::invalid_config(format!("Failed to create HTTP client: {}", e)))
        };

        Ok(Self {
            client: build(settings.http_timeout_secs)?,
            download_client: build(settings.download_timeout_secs)?,
            show_progress: false,
            drive_origin: None,
        })
    }

    /// Enable or disable progress bars
    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    /// Treat URLs under `origin` as Google Drive. Relative confirmation
    /// links also resolve against it.
    pub fn with_drive_origin(mut self, origin: impl Into<String>) -> Self {
        self.drive_origin = Some(origin.into().trim_end_matches('/').to_string());
        self
    }

    fn source_kind(&self, url: &str) -> SourceKind {
        match &self.drive_origin {
            Some(origin) if url.starts_with(origin.as_str()) => SourceKind::GoogleDrive,
            _ => SourceKind::detect(url),
        }
    }

    /// GET a URL and reject non-success responses
    async fn get(&self, client: &Client, url: &str) -> Result<Response> {
        let kind = self.source_kind(url);
        if kind == SourceKind::Ftp {
            return Err(Error::remote_rejected(
                url,
                "FTP sources are not supported; publish the file over HTTP(S)",
            ));
        }

        debug!("GET {} ({:?})", url, kind);
        let response = client
            .get(url)
            .send()
            .await
            .map_err(|e| Error::network(url, e))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let message = match (kind, status) {
            (SourceKind::GitHub, StatusCode::NOT_FOUND) => {
                "GitHub returned 404: the release asset does not exist or the repository is private"
                    .to_string()
            }
            (SourceKind::GoogleDrive, StatusCode::FORBIDDEN | StatusCode::NOT_FOUND) => format!(
                "Google Drive returned {}: make sure the file is shared with 'Anyone with the link'",
                status
            ),
            _ => format!("HTTP {}", status),
        };
        Err(Error::remote_rejected(url, message))
    }

    /// Follow a Google Drive confirmation page to the real download
    async fn follow_drive_confirmation(
        &self,
        client: &Client,
        url: &str,
        page: &str,
    ) -> Result<Response> {
        let origin = self.drive_origin.as_deref().unwrap_or(GOOGLE_DRIVE_ORIGIN);
        let link = drive_confirm_link(page, origin).ok_or_else(|| {
            Error::remote_rejected(
                url,
                "Google Drive returned an HTML page without a download link; the file may not be shared publicly",
            )
        })?;
        debug!("Following Google Drive confirmation link {}", link);

        let response = self.get(client, &link).await?;
        if is_html(&response) {
            return Err(Error::remote_rejected(
                url,
                "Google Drive still returned an HTML page after confirmation",
            ));
        }
        Ok(response)
    }

    async fn stream_to_file(&self, url: &str, response: Response, dest: &Path) -> Result<u64> {
        let total = response.content_length();
        let progress = match (self.show_progress, total) {
            (true, Some(len)) => Some(download_progress_bar(len)),
            _ => None,
        };

        let mut file = File::create(dest).await?;
        let mut stream = response.bytes_stream();
        let mut written: u64 = 0;

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| Error::network(url, e))?;
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
            if let Some(pb) = &progress {
                pb.set_position(written);
            }
        }
        file.flush().await?;

        if let Some(pb) = progress {
            pb.finish_and_clear();
        }
        Ok(written)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn fetch_text(&self, url: &str) -> Result<String> {
        let response = self.get(&self.client, url).await?;
        let body = response.text().await.map_err(|e| Error::network(url, e))?;

        if self.source_kind(url) == SourceKind::GoogleDrive && looks_like_html(&body) {
            let confirmed = self
                .follow_drive_confirmation(&self.client, url, &body)
                .await?;
            return confirmed.text().await.map_err(|e| Error::network(url, e));
        }

        Ok(body)
    }

    async fn fetch_to_file(&self, url: &str, dest: &Path) -> Result<()> {
        let mut response = self.get(&self.download_client, url).await?;

        if self.source_kind(url) == SourceKind::GoogleDrive && is_html(&response) {
            let page = response.text().await.map_err(|e| Error::network(url, e))?;
            response = self
                .follow_drive_confirmation(&self.download_client, url, &page)
                .await?;
        }

        let written = self.stream_to_file(url, response, dest).await?;
        debug!("Downloaded {} to {}", human_readable_size(written), dest.display());

        validate_download(url, dest, written).await
    }
}

fn is_html(response: &Response) -> bool {
    response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.to_ascii_lowercase().contains("text/html"))
}

/// Reject downloads into an archive path that are not archives
async fn validate_download(url: &str, dest: &Path, size: u64) -> Result<()> {
    if size < MIN_EXPECTED_ARCHIVE_SIZE {
        warn!(
            "Downloaded file is only {} bytes; it may be an error page",
            size
        );
    }

    let is_archive_path = dest
        .file_name()
        .and_then(|n| n.to_str())
        .map(|n| n.to_ascii_lowercase())
        .is_some_and(|n| n.ends_with(".zip") || n.ends_with(".tar.gz") || n.ends_with(".tgz"));
    if !is_archive_path {
        return Ok(());
    }

    let mut header = [0u8; 4];
    let mut file = File::open(dest).await?;
    let mut filled = 0;
    while filled < header.len() {
        match file.read(&mut header[filled..]).await? {
            0 => break,
            n => filled += n,
        }
    }

    if format_from_magic(&header[..filled]).is_none() {
        return Err(Error::remote_rejected(
            url,
            "downloaded file is not a valid archive (zip or tar.gz)",
        ));
    }
    Ok(())
}

fn download_progress_bar(len: u64) -> ProgressBar {
    let pb = ProgressBar::new(len);
    if let Ok(style) = ProgressStyle::with_template(
        "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({bytes_per_sec}, {eta})",
    ) {
        pb.set_style(style.progress_chars("#>-"));
    }
    pb
}
