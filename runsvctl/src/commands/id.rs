use anyhow::Context;
use runsvctl_core::UserValidator;

use crate::cli::{GlobalArgs, IdArgs};
use crate::common::load_config;

pub async fn execute(global: &GlobalArgs, args: IdArgs) -> anyhow::Result<()> {
    let username = match args.user {
        Some(user) => user,
        None => load_config(global).await?.user,
    };
    if username.is_empty() {
        anyhow::bail!("No user given (pass a user name or --user)");
    }

    let ids = UserValidator::default()
        .resolve_owner_ids(&username)
        .with_context(|| format!("Cannot resolve ids for {}", username))?;

    if args.json {
        println!("{}", serde_json::to_string(&ids)?);
    } else {
        println!("uid={} gid={}", ids.uid, ids.gid);
    }
    Ok(())
}
