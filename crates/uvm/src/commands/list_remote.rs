//! List versions published in the version list

use anyhow::Result;

use crate::context::AppContext;
use crate::output;

pub async fn run(ctx: &AppContext) -> Result<()> {
    let manifest = ctx.pipeline.fetch_manifest().await?;
    if manifest.is_empty() {
        output::info("The version list contains no releases");
        return Ok(());
    }

    let store = ctx.pipeline.store();
    let current = store.current_version()?;

    output::header("Available versions");
    for record in manifest.sorted_descending() {
        let status = if current.as_deref() == Some(record.version.as_str()) {
            " (current)"
        } else if store.is_installed(&record.version) {
            " (installed)"
        } else {
            ""
        };
        let date = if record.release_date.is_empty() {
            String::new()
        } else {
            format!(" - {}", record.release_date)
        };
        let description = if record.description.is_empty() {
            String::new()
        } else {
            format!("  {}", record.description)
        };
        println!("  {}{}{}{}", record.version, date, status, description);
    }
    Ok(())
}
