use crate::cli::{GlobalArgs, PackageArgs, RebuildArgs};
use crate::common::build_installer;

pub async fn add(global: &GlobalArgs, args: PackageArgs) -> anyhow::Result<()> {
    build_installer(global).await?.add(&args.package).await?;
    Ok(())
}

pub async fn remove(global: &GlobalArgs, args: PackageArgs) -> anyhow::Result<()> {
    build_installer(global).await?.remove(&args.package).await?;
    Ok(())
}

pub async fn rebuild(global: &GlobalArgs, args: RebuildArgs) -> anyhow::Result<()> {
    build_installer(global)
        .await?
        .rebuild(args.dir.as_deref())
        .await?;
    Ok(())
}
