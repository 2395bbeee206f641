//! Schema-tolerant manifest parsing
//!
//! The document must be a JSON object with a `versions` array; anything less
//! is a [`Error::SchemaError`]. Inside the array each record is handled on
//! its own: a field may be spelled `lowerCamelCase` or `PascalCase`, and a
//! record that is unusable is skipped with a warning instead of failing the
//! whole manifest.

use serde_json::{Map, Value};
use uvm_core::types::{is_valid_version_name, Manifest, ReleaseRecord};
use uvm_core::{Error, Result};

/// Parse result: the usable records plus one warning per skipped record
#[derive(Debug, Clone, Default)]
pub struct ParsedManifest {
    pub manifest: Manifest,
    pub warnings: Vec<String>,
}

/// Parse raw manifest text
pub fn parse_manifest(raw: &str) -> Result<ParsedManifest> {
    let raw = raw.trim_start_matches('\u{feff}');
    let document: Value = serde_json::from_str(raw)
        .map_err(|e| Error::schema(format!("manifest is not valid JSON: {}", e)))?;

    let root = document
        .as_object()
        .ok_or_else(|| Error::schema("manifest must be a JSON object"))?;

    let versions = match root.get("versions") {
        Some(Value::Array(items)) => items,
        Some(_) => return Err(Error::schema("'versions' must be an array")),
        None => {
            let keys: Vec<&str> = root.keys().map(String::as_str).collect();
            return Err(Error::schema(format!(
                "missing required 'versions' key (found: {})",
                if keys.is_empty() {
                    "no keys".to_string()
                } else {
                    keys.join(", ")
                }
            )));
        }
    };

    let mut releases = Vec::with_capacity(versions.len());
    let mut warnings = Vec::new();

    for (index, item) in versions.iter().enumerate() {
        match parse_record(item) {
            Ok(record) => releases.push(record),
            Err(reason) => {
                warnings.push(format!("Skipping manifest entry #{}: {}", index, reason));
            }
        }
    }

    Ok(ParsedManifest {
        manifest: Manifest::new(releases),
        warnings,
    })
}

/// Build one record or explain why it was rejected
fn parse_record(item: &Value) -> std::result::Result<ReleaseRecord, String> {
    let entry = item
        .as_object()
        .ok_or_else(|| "entry is not an object".to_string())?;

    let version = string_field(entry, "version", "Version")?;
    if version.is_empty() {
        return Err("missing 'version'".to_string());
    }
    if !is_valid_version_name(&version) {
        return Err(format!(
            "version '{}' is not usable as a directory name",
            version
        ));
    }

    let download_url = string_field(entry, "downloadUrl", "DownloadUrl")?;
    if download_url.is_empty() {
        return Err(format!("version {} is missing 'downloadUrl'", version));
    }

    let digest = string_field(entry, "sha256", "Sha256")?;
    let size_bytes = number_field(entry, "size", "Size")?;
    let release_date = string_field(entry, "releaseDate", "ReleaseDate")?;
    let description = string_field(entry, "description", "Description")?;

    let mut record = ReleaseRecord::new(version, download_url)
        .with_size(size_bytes)
        .with_release_date(release_date)
        .with_description(description);
    if !digest.trim().is_empty() {
        record = record.with_digest(digest.trim());
    }
    Ok(record)
}

/// First non-null value under either spelling
fn lookup<'a>(entry: &'a Map<String, Value>, camel: &str, pascal: &str) -> Option<&'a Value> {
    [camel, pascal]
        .into_iter()
        .filter_map(|key| entry.get(key))
        .find(|value| !value.is_null())
}

fn string_field(
    entry: &Map<String, Value>,
    camel: &str,
    pascal: &str,
) -> std::result::Result<String, String> {
    match lookup(entry, camel, pascal) {
        None => Ok(String::new()),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(other) => Err(format!(
            "'{}' must be a string, got {}",
            camel,
            type_name(other)
        )),
    }
}

fn number_field(
    entry: &Map<String, Value>,
    camel: &str,
    pascal: &str,
) -> std::result::Result<u64, String> {
    match lookup(entry, camel, pascal) {
        None => Ok(0),
        Some(Value::Number(n)) => n
            .as_u64()
            .ok_or_else(|| format!("'{}' must be a non-negative integer, got {}", camel, n)),
        Some(other) => Err(format!(
            "'{}' must be a number, got {}",
            camel,
            type_name(other)
        )),
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
