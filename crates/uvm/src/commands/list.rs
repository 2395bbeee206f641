//! List installed versions

use anyhow::Result;

use crate::context::AppContext;
use crate::output;

pub fn run(ctx: &AppContext) -> Result<()> {
    let store = ctx.pipeline.store();
    let installed = store.list_installed()?;
    let current = store.current_version()?;

    if installed.is_empty() {
        output::info("No versions installed");
        return Ok(());
    }

    output::header("Installed versions");
    for version in &installed {
        let marker = if current.as_deref() == Some(version.as_str()) {
            " (current)"
        } else {
            ""
        };
        println!("  {}{}", version, marker);
    }
    Ok(())
}
