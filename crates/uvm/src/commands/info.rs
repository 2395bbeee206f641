//! Show the state of the local installation

use anyhow::Result;

use crate::context::AppContext;
use crate::output;

pub fn run(ctx: &AppContext) -> Result<()> {
    let store = ctx.pipeline.store();
    let current = store.current_version()?;
    let installed = store.list_installed()?;

    output::header("uvm");
    output::kv("Version", uvm_update::VERSION);
    output::kv("Current version", current.as_deref().unwrap_or("none"));

    match ctx.pipeline.activation().inspect()? {
        Some(status) => {
            output::kv("Alias", &ctx.layout.alias_path.display().to_string());
            output::kv("Alias kind", &status.kind.to_string());
            if let Some(target) = &status.target {
                output::kv("Alias target", &target.display().to_string());
            }
            output::kv("Alias files", &status.file_count.to_string());
        }
        None => output::kv("Alias", "not created"),
    }

    output::kv("Store", &ctx.layout.store_root.display().to_string());
    output::kv("Marker file", &ctx.layout.marker_file.display().to_string());
    output::kv(
        "Version list",
        ctx.settings
            .version_list_url()
            .as_deref()
            .unwrap_or("local file only"),
    );

    output::header("Installed versions");
    if installed.is_empty() {
        println!("  (none)");
    }
    for version in installed {
        println!("  {}", version);
    }
    Ok(())
}
