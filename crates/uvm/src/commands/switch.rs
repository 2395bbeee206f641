//! Use command: activate an installed version

use anyhow::Result;

use crate::cli::VersionArgs;
use crate::context::AppContext;

pub async fn run(ctx: &AppContext, args: VersionArgs) -> Result<()> {
    ctx.pipeline.use_version(&args.version).await?;
    Ok(())
}
