//! Update command

use anyhow::Result;

use crate::context::AppContext;

/// Failures are reported by the pipeline and never change the exit code
pub async fn run(ctx: &AppContext) -> Result<()> {
    let outcome = ctx.pipeline.auto_update().await;
    tracing::debug!("Update finished: {:?}", outcome);
    Ok(())
}
