//! Show the active version

use anyhow::Result;

use crate::context::AppContext;
use crate::output;

pub fn run(ctx: &AppContext) -> Result<()> {
    match ctx.pipeline.store().current_version()? {
        Some(version) => println!("{}", version),
        None => output::info("No version is active"),
    }
    Ok(())
}
