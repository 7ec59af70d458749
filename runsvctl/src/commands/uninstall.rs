use crate::cli::GlobalArgs;
use crate::common::build_installer;

pub async fn execute(global: &GlobalArgs) -> anyhow::Result<()> {
    build_installer(global).await?.uninstall().await?;
    Ok(())
}
