//! SHA-256 content digests
//!
//! Files are hashed in fixed-size chunks so large archives never have to fit
//! in memory.

use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;
use uvm_core::{Error, Result};

/// Read buffer size (1MB)
const HASH_CHUNK_SIZE: usize = 1024 * 1024;

/// Compute the lowercase hex SHA-256 of a file
pub fn compute_digest(path: &Path) -> Result<String> {
    let mut file = File::open(path).map_err(|e| open_error(path, e))?;
    let mut hasher = Sha256::new();
    let mut buffer = vec![0u8; HASH_CHUNK_SIZE];

    loop {
        let read = file.read(&mut buffer)?;
        if read == 0 {
            break;
        }
        hasher.update(&buffer[..read]);
    }

    Ok(format!("{:x}", hasher.finalize()))
}

/// Check a file against an expected hex digest (case-insensitive).
///
/// A mismatch is `Ok(false)`; only a missing or unreadable file is an error.
pub fn verify_digest(path: &Path, expected_hex: &str) -> Result<bool> {
    let actual = compute_digest(path)?;
    Ok(digests_match(&actual, expected_hex))
}

/// Case-insensitive digest comparison, ignoring surrounding whitespace
pub fn digests_match(actual: &str, expected: &str) -> bool {
    actual.trim().eq_ignore_ascii_case(expected.trim())
}

fn open_error(path: &Path, err: io::Error) -> Error {
    if err.kind() == io::ErrorKind::NotFound {
        Error::not_found(path.display().to_string())
    } else {
        Error::Io(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    // sha256("hello world")
    const HELLO_DIGEST: &str = "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9";

    #[test]
    fn test_known_digest() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("hello.txt");
        fs::write(&path, b"hello world").unwrap();

        assert_eq!(compute_digest(&path).unwrap(), HELLO_DIGEST);
    }

    #[test]
    fn test_empty_file_digest() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("empty");
        fs::write(&path, b"").unwrap();

        assert_eq!(
            compute_digest(&path).unwrap(),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_digest_spans_multiple_chunks() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("big.bin");
        let content: Vec<u8> = (0..(HASH_CHUNK_SIZE * 2 + 17))
            .map(|i| (i % 251) as u8)
            .collect();
        fs::write(&path, &content).unwrap();

        let expected = format!("{:x}", Sha256::digest(&content));
        assert_eq!(compute_digest(&path).unwrap(), expected);
    }

    #[test]
    fn test_verify_round_trip_and_case() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("hello.txt");
        fs::write(&path, b"hello world").unwrap();

        let digest = compute_digest(&path).unwrap();
        assert!(verify_digest(&path, &digest).unwrap());
        assert!(verify_digest(&path, &digest.to_uppercase()).unwrap());
    }

    #[test]
    fn test_verify_mismatch_is_false() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("hello.txt");
        fs::write(&path, b"hello world").unwrap();

        assert!(!verify_digest(&path, "abc123").unwrap());
        assert!(!verify_digest(&path, "").unwrap());
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let dir = TempDir::new().unwrap();
        let err = compute_digest(&dir.path().join("missing.zip")).unwrap_err();
        assert!(matches!(err, Error::NotFound { .. }));
    }
}
