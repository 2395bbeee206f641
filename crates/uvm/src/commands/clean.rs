//! Clean command

use anyhow::Result;

use crate::cli::VersionArgs;
use crate::context::AppContext;

pub async fn run(ctx: &AppContext, args: VersionArgs) -> Result<()> {
    ctx.pipeline.clean(&args.version).await?;
    Ok(())
}
