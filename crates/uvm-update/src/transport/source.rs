//! Download source classification

use regex::Regex;
use std::sync::LazyLock;
use url::Url;

/// Hosting provider behind a download URL
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    GoogleDrive,
    GitHub,
    Ftp,
    Http,
}

impl SourceKind {
    /// Classify a URL by scheme and host
    pub fn detect(url: &str) -> Self {
        let Ok(parsed) = Url::parse(url) else {
            return Self::Http;
        };

        if matches!(parsed.scheme(), "ftp" | "ftps") {
            return Self::Ftp;
        }

        let host = parsed.host_str().unwrap_or_default().to_ascii_lowercase();
        let on = |domain: &str| host == domain || host.ends_with(&format!(".{}", domain));

        if on("drive.google.com") || on("docs.google.com") || on("drive.usercontent.google.com") {
            Self::GoogleDrive
        } else if on("github.com") || on("githubusercontent.com") {
            Self::GitHub
        } else {
            Self::Http
        }
    }
}

static CONFIRM_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r#"href="([^"]*&(?:amp;)?confirm=[^"]*)""#,
        r#"action="([^"]*)""#,
        r#""downloadUrl":"([^"]*)""#,
    ]
    .iter()
    .map(|p| Regex::new(p).expect("confirm link pattern is valid"))
    .collect()
});

/// Origin relative confirmation links resolve against
pub const GOOGLE_DRIVE_ORIGIN: &str = "https://drive.google.com";

/// Find the real download link on a Google Drive interstitial page
/// (virus-scan warning or download confirmation form).
///
/// HTML entities in the link are unescaped and relative links are made
/// absolute against `origin`.
pub fn drive_confirm_link(html: &str, origin: &str) -> Option<String> {
    let raw = CONFIRM_PATTERNS
        .iter()
        .find_map(|re| re.captures(html).and_then(|c| c.get(1)))?
        .as_str();

    let link = raw.replace("&amp;", "&").replace("\\u003d", "=").replace("\\u0026", "&");
    if link.is_empty() {
        return None;
    }

    let origin = origin.trim_end_matches('/');
    if link.starts_with("http://") || link.starts_with("https://") {
        Some(link)
    } else if link.starts_with('/') {
        Some(format!("{}{}", origin, link))
    } else {
        Some(format!("{}/{}", origin, link))
    }
}

/// Whether a response body looks like an HTML page rather than data
pub(crate) fn looks_like_html(body: &str) -> bool {
    let head: String = body
        .trim_start()
        .chars()
        .take(256)
        .collect::<String>()
        .to_ascii_lowercase();
    head.starts_with("<!doctype html") || head.starts_with("<html") || head.contains("<head")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_sources() {
        assert_eq!(
            SourceKind::detect("https://drive.google.com/uc?export=download&id=abc"),
            SourceKind::GoogleDrive
        );
        assert_eq!(
            SourceKind::detect("https://docs.google.com/uc?id=abc"),
            SourceKind::GoogleDrive
        );
        assert_eq!(
            SourceKind::detect("https://github.com/o/r/releases/download/v1/app.zip"),
            SourceKind::GitHub
        );
        assert_eq!(
            SourceKind::detect("https://objects.githubusercontent.com/x"),
            SourceKind::GitHub
        );
        assert_eq!(SourceKind::detect("ftp://files.example.com/a.zip"), SourceKind::Ftp);
        assert_eq!(
            SourceKind::detect("https://cdn.example.com/a.zip"),
            SourceKind::Http
        );
        assert_eq!(SourceKind::detect("not a url"), SourceKind::Http);
    }

    #[test]
    fn test_lookalike_host_is_plain_http() {
        assert_eq!(
            SourceKind::detect("https://notgithub.com/a.zip"),
            SourceKind::Http
        );
    }

    #[test]
    fn test_confirm_link_from_virus_scan_page() {
        let html = r#"<html><body><a id="uc-download-link" href="/uc?export=download&amp;confirm=t0k3n&amp;id=abc">Download anyway</a></body></html>"#;
        assert_eq!(
            drive_confirm_link(html, GOOGLE_DRIVE_ORIGIN).as_deref(),
            Some("https://drive.google.com/uc?export=download&confirm=t0k3n&id=abc")
        );
    }

    #[test]
    fn test_confirm_link_from_form_action() {
        let html = r#"<form id="download-form" action="https://drive.usercontent.google.com/download?id=abc&amp;confirm=t" method="get"></form>"#;
        assert_eq!(
            drive_confirm_link(html, GOOGLE_DRIVE_ORIGIN).as_deref(),
            Some("https://drive.usercontent.google.com/download?id=abc&confirm=t")
        );
    }

    #[test]
    fn test_no_confirm_link() {
        assert_eq!(drive_confirm_link("<html><p>Access denied</p></html>", GOOGLE_DRIVE_ORIGIN), None);
    }

    #[test]
    fn test_looks_like_html() {
        assert!(looks_like_html("  <!DOCTYPE html><html></html>"));
        assert!(looks_like_html("<html lang=\"en\">"));
        assert!(!looks_like_html(r#"{"versions":[]}"#));
    }
}
