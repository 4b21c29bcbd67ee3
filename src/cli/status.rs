//! Status command implementation

use crate::cli::{CommandContext, GlobalOptions};
use crate::error::{Error, Result};
use crate::status::PollOutcome;

/// Poll the backend once.
///
/// The renderer shows the indicator (and the panel when online); an offline
/// backend is reported as an error so the process exits non-zero.
pub async fn run(opts: &GlobalOptions) -> Result<()> {
    let ctx = CommandContext::new(opts)?;
    let poller = ctx.poller()?;

    match poller.poll().await {
        PollOutcome::Online(_) => Ok(()),
        PollOutcome::Offline(cause) => Err(Error::Offline(cause)),
    }
}
