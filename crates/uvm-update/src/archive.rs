//! Release archive extraction
//!
//! Supports zip and gzip-compressed tar archives, detected from their
//! leading bytes rather than the file name. Entry names are treated as
//! Unicode text:
//! - zip names whose raw bytes are valid UTF-8 are used verbatim, whether or
//!   not the archive sets the UTF-8 flag
//! - other zip names fall back to the zip library's decoding (CP437, as the
//!   format defines), never a locale-dependent code page
//! - tar names are read as UTF-8 with lossy replacement
//!
//! Any entry whose path would land outside the destination is rejected.

use flate2::read::GzDecoder;
use std::fs::{self, File};
use std::io::{self, Read};
use std::path::{Component, Path, PathBuf};
use tokio_util::sync::CancellationToken;
use tracing::debug;
use uvm_core::{Error, Result};
use zip::ZipArchive;

/// Archive container formats uvm can unpack
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveFormat {
    Zip,
    TarGz,
}

/// Counts from one extraction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtractSummary {
    pub files: usize,
    pub directories: usize,
}

/// Identify an archive by its magic bytes
pub fn detect_format(archive: &Path) -> Result<ArchiveFormat> {
    let mut header = [0u8; 4];
    let mut file = File::open(archive).map_err(|e| {
        if e.kind() == io::ErrorKind::NotFound {
            Error::not_found(archive.display().to_string())
        } else {
            Error::Io(e)
        }
    })?;
    let read = read_prefix(&mut file, &mut header)?;

    format_from_magic(&header[..read]).ok_or_else(|| {
        Error::extraction_failed(
            archive.display().to_string(),
            "unrecognised archive format (expected zip or tar.gz)",
        )
    })
}

/// Match leading bytes against the supported archive signatures
pub fn format_from_magic(prefix: &[u8]) -> Option<ArchiveFormat> {
    match prefix {
        [b'P', b'K', 3, 4, ..] | [b'P', b'K', 5, 6, ..] | [b'P', b'K', 7, 8, ..] => {
            Some(ArchiveFormat::Zip)
        }
        [0x1f, 0x8b, ..] => Some(ArchiveFormat::TarGz),
        _ => None,
    }
}

/// Extract `archive` into `dest`.
///
/// The first failing entry aborts the extraction with
/// [`Error::ExtractionFailed`]; whatever was written so far stays in `dest`
/// for the caller to inspect or remove. The cancellation token is checked
/// before each entry.
pub fn extract(archive: &Path, dest: &Path, cancel: &CancellationToken) -> Result<ExtractSummary> {
    let format = detect_format(archive)?;
    debug!(
        "Extracting {} ({:?}) into {}",
        archive.display(),
        format,
        dest.display()
    );
    fs::create_dir_all(dest)?;

    match format {
        ArchiveFormat::Zip => extract_zip(archive, dest, cancel),
        ArchiveFormat::TarGz => extract_tar_gz(archive, dest, cancel),
    }
}

fn extract_zip(archive: &Path, dest: &Path, cancel: &CancellationToken) -> Result<ExtractSummary> {
    let label = archive.display().to_string();
    let file = File::open(archive)?;
    let mut zip = ZipArchive::new(file).map_err(|e| Error::extraction_failed(&label, e))?;
    let mut summary = ExtractSummary::default();

    for index in 0..zip.len() {
        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }

        let mut entry = zip
            .by_index(index)
            .map_err(|e| Error::extraction_failed(format!("{}#{}", label, index), e))?;

        let name = match std::str::from_utf8(entry.name_raw()) {
            Ok(utf8) => utf8.to_string(),
            Err(_) => entry.name().to_string(),
        };
        let relative = sanitize_entry_path(&name)?;
        let target = dest.join(&relative);

        if entry.is_dir() || name.ends_with('/') || name.ends_with('\\') {
            fs::create_dir_all(&target).map_err(|e| Error::extraction_failed(&name, e))?;
            summary.directories += 1;
            continue;
        }

        write_entry(&mut entry, &target).map_err(|e| Error::extraction_failed(&name, e))?;

        #[cfg(unix)]
        if let Some(mode) = entry.unix_mode() {
            use std::os::unix::fs::PermissionsExt;
            let mode = mode & 0o7777;
            if mode != 0 {
                fs::set_permissions(&target, fs::Permissions::from_mode(mode))
                    .map_err(|e| Error::extraction_failed(&name, e))?;
            }
        }

        summary.files += 1;
    }

    Ok(summary)
}

fn extract_tar_gz(
    archive: &Path,
    dest: &Path,
    cancel: &CancellationToken,
) -> Result<ExtractSummary> {
    let label = archive.display().to_string();
    let file = File::open(archive)?;
    let mut tar = tar::Archive::new(GzDecoder::new(file));
    let mut summary = ExtractSummary::default();

    let entries = tar
        .entries()
        .map_err(|e| Error::extraction_failed(&label, e))?;

    for entry in entries {
        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }

        let mut entry = entry.map_err(|e| Error::extraction_failed(&label, e))?;
        let name = String::from_utf8_lossy(&entry.path_bytes()).into_owned();
        let relative = sanitize_entry_path(&name)?;
        if relative.as_os_str().is_empty() {
            continue;
        }
        let entry_type = entry.header().entry_type();
        if entry_type.is_symlink() || entry_type.is_hard_link() {
            let link = entry
                .link_name_bytes()
                .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
                .unwrap_or_default();
            check_link_target(&relative, &link, entry_type.is_hard_link(), &name)?;
        }

        // unpack_in refuses to write through a parent that resolves outside dest
        let unpacked = entry
            .unpack_in(dest)
            .map_err(|e| Error::extraction_failed(&name, e))?;
        if !unpacked {
            return Err(Error::extraction_failed(
                &name,
                "entry path escapes the destination directory",
            ));
        }

        if entry_type.is_dir() {
            summary.directories += 1;
        } else {
            summary.files += 1;
        }
    }

    Ok(summary)
}

fn write_entry(reader: &mut impl Read, target: &Path) -> io::Result<()> {
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut out = File::create(target)?;
    io::copy(reader, &mut out)?;
    Ok(())
}

/// Turn an archive entry name into a relative path confined to the
/// destination. Backslashes are treated as separators.
fn sanitize_entry_path(name: &str) -> Result<PathBuf> {
    let normalized = name.replace('\\', "/");
    let mut relative = PathBuf::new();

    for component in Path::new(&normalized).components() {
        match component {
            Component::Normal(part) => relative.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(Error::extraction_failed(
                    name,
                    "entry path escapes the destination directory",
                ));
            }
        }
    }

    // A drive letter such as "C:" is only a prefix component on Windows
    if relative
        .components()
        .next()
        .and_then(|c| c.as_os_str().to_str())
        .is_some_and(|first| first.len() == 2 && first.ends_with(':'))
    {
        return Err(Error::extraction_failed(
            name,
            "entry path escapes the destination directory",
        ));
    }

    Ok(relative)
}

/// Reject link entries whose target resolves outside the destination.
/// Symlink targets are relative to the entry's directory, hard link targets
/// to the archive root.
fn check_link_target(entry: &Path, link: &str, hard_link: bool, name: &str) -> Result<()> {
    let escapes = || {
        Error::extraction_failed(name, "link target escapes the destination directory")
    };
    if link.is_empty() {
        return Err(escapes());
    }

    let mut depth = if hard_link {
        0
    } else {
        entry.parent().map_or(0, |p| p.components().count())
    };

    let normalized = link.replace('\\', "/");
    for component in Path::new(&normalized).components() {
        match component {
            Component::Normal(_) => depth += 1,
            Component::CurDir => {}
            Component::ParentDir => {
                depth = depth.checked_sub(1).ok_or_else(escapes)?;
            }
            Component::RootDir | Component::Prefix(_) => return Err(escapes()),
        }
    }
    Ok(())
}

fn read_prefix(file: &mut File, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match file.read(&mut buf[filled..])? {
            0 => break,
            n => filled += n,
        }
    }
    Ok(filled)
}
