//! Hash command

use anyhow::{Context, Result};
use uvm_core::utils::human_readable_size;
use uvm_update::hasher::compute_digest;

use crate::cli::HashArgs;
use crate::output;

pub fn run(args: HashArgs) -> Result<()> {
    let digest = compute_digest(args.file.as_std_path())?;
    let size = std::fs::metadata(&args.file)
        .with_context(|| format!("Failed to read metadata for {}", args.file))?
        .len();

    output::kv("File", args.file.as_str());
    output::kv("SHA-256", &digest);
    output::kv("Size", &format!("{} ({} bytes)", human_readable_size(size), size));
    Ok(())
}
