use crate::cli::GlobalArgs;
use crate::common::build_installer;

pub async fn start(global: &GlobalArgs) -> anyhow::Result<()> {
    build_installer(global).await?.start().await?;
    Ok(())
}

pub async fn stop(global: &GlobalArgs) -> anyhow::Result<()> {
    build_installer(global).await?.stop().await?;
    Ok(())
}

pub async fn restart(global: &GlobalArgs) -> anyhow::Result<()> {
    build_installer(global).await?.restart().await?;
    Ok(())
}
