//! Install command

use anyhow::Result;

use crate::cli::InstallArgs;
use crate::context::AppContext;
use crate::prompt::DialoguerPrompt;

pub async fn run(ctx: &AppContext, args: InstallArgs) -> Result<()> {
    let outcome = if args.yes {
        ctx.pipeline.install_unattended(&args.version).await?
    } else {
        ctx.pipeline
            .install_interactive(&args.version, &DialoguerPrompt)
            .await?
    };
    tracing::debug!("Install finished: {:?}", outcome);
    Ok(())
}
