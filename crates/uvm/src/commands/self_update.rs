//! Self-update command

use anyhow::Result;
use uvm_update::UpdateOutcome;

use crate::cli::SelfUpdateArgs;
use crate::context::AppContext;
use crate::output;

pub async fn run(ctx: &AppContext, args: SelfUpdateArgs) -> Result<()> {
    match ctx.pipeline.self_update(args.clean).await {
        UpdateOutcome::Updated { previous, version } => {
            output::kv("Previous", previous.as_deref().unwrap_or("none"));
            output::kv("Current", &version);
        }
        UpdateOutcome::UpToDate { version } => output::kv("Current", &version),
        UpdateOutcome::NoReleases | UpdateOutcome::Failed { .. } => {}
    }
    Ok(())
}
