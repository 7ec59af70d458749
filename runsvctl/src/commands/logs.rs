use tracing::debug;

use crate::cli::GlobalArgs;
use crate::common::build_installer;

pub async fn execute(global: &GlobalArgs) -> anyhow::Result<()> {
    let installer = build_installer(global).await?;

    // tail shares our process group and sees the same interrupt.
    tokio::select! {
        result = installer.logs() => result?,
        _ = tokio::signal::ctrl_c() => debug!("Interrupted, stopped following log"),
    }
    Ok(())
}
