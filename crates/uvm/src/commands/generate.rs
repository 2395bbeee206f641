//! Generate a version list entry for a release archive

use anyhow::{Context, Result};
use uvm_core::utils::human_readable_size;
use uvm_update::describe_archive;

use crate::cli::GenerateArgs;
use crate::output;

pub fn run(args: GenerateArgs) -> Result<()> {
    let record = describe_archive(&args.version, args.archive.as_std_path(), &args.location)?;
    let json = serde_json::to_string_pretty(&record)?;

    std::fs::write(&args.output, format!("{}\n", json))
        .with_context(|| format!("Failed to write {}", args.output))?;

    output::success(&format!("Wrote {}", args.output));
    output::kv("Version", &record.version);
    output::kv("Size", &human_readable_size(record.size_bytes));
    println!("{}", json);
    Ok(())
}
