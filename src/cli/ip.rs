//! Network information command

use crate::cli::{CommandContext, GlobalOptions};
use crate::error::Result;

pub async fn run(opts: &GlobalOptions) -> Result<()> {
    let ctx = CommandContext::new(opts)?;
    ctx.poller()?.refresh_network().await?;
    Ok(())
}
