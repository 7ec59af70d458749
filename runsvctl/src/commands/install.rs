use crate::cli::GlobalArgs;
use crate::common::build_installer;

pub async fn execute(global: &GlobalArgs) -> anyhow::Result<()> {
    let installer = build_installer(global).await?;
    installer.install().await?;
    Ok(())
}
