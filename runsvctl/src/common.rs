use anyhow::{Context, Result};
use colored::Colorize;
use runsvctl_core::{
    ConfigLoader, Level, Reporter, ServiceConfig, ServiceDescriptor, SupervisedServiceInstaller,
};
use runsvctl_supervisor::{SystemCommandRunner, create_system_adapter};
use std::sync::Arc;
use tracing::debug;

use crate::cli::GlobalArgs;

/// Standard success indicator for all commands
pub const SUCCESS_ICON: &str = "✓";
/// Standard failure indicator for all commands
pub const FAILURE_ICON: &str = "✗";
pub const WARNING_ICON: &str = "!";
pub const INFO_ICON: &str = "•";

/// Prints status lines to the terminal. Failures and warnings go to stderr.
#[derive(Debug, Default)]
pub struct ConsoleReporter;

impl ConsoleReporter {
    pub fn new() -> Self {
        Self
    }
}

impl Reporter for ConsoleReporter {
    fn log(&self, message: &str, level: Level) {
        match level {
            Level::Info => println!("{} {}", INFO_ICON.blue(), message),
            Level::Succeed => println!("{} {}", SUCCESS_ICON.green(), message),
            Level::Warn => eprintln!("{} {}", WARNING_ICON.yellow().bold(), message),
            Level::Fail => eprintln!("{} {}", FAILURE_ICON.red().bold(), message),
        }
    }

    fn post_install(&self, service: &ServiceDescriptor) {
        println!();
        println!("Manage the {} service with:", service.display_name.bold());
        for verb in ["start", "stop", "restart", "logs", "uninstall"] {
            println!("  runsvctl --name {} {}", service.name, verb);
        }
        println!();
        println!("Log output: {}", service.current_log_file().display());
    }
}

/// Config from `--config` or discovery, with command line overrides applied.
pub async fn load_config(global: &GlobalArgs) -> Result<ServiceConfig> {
    let loader = ConfigLoader::new();
    let mut config = match &global.config {
        Some(path) => loader
            .load_file(path)
            .await
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => loader.load().await.context("Failed to load config")?,
    };

    apply_overrides(&mut config, global);
    debug!(?config, "Resolved configuration");
    Ok(config)
}

fn apply_overrides(config: &mut ServiceConfig, global: &GlobalArgs) {
    if let Some(name) = &global.name {
        config.display_name = name.clone();
    }
    if let Some(user) = &global.user {
        config.user = user.clone();
    }
    if let Some(log_owner) = &global.log_owner {
        config.log_owner = log_owner.clone();
    }
    if let Some(path) = &global.self_path {
        config.self_path = Some(path.clone());
    }
    if let Some(path) = &global.storage_path {
        config.storage_path = Some(path.clone());
    }
    if let Some(path) = &global.supervisor_root {
        config.supervisor_root = path.clone();
    }
    if let Some(path) = &global.scan_dir {
        config.scan_dir = Some(path.clone());
    }
    if let Some(path) = &global.log_root {
        config.log_root = path.clone();
    }
    if let Some(backend) = global.backend {
        config.backend = backend;
    }
    if !global.extra_args.is_empty() {
        config.extra_args = global.extra_args.clone();
    }
}

/// Installer wired to the real supervisor and the terminal.
pub async fn build_installer(global: &GlobalArgs) -> Result<SupervisedServiceInstaller> {
    let config = load_config(global).await?;
    let supervisor = create_system_adapter(config.backend);
    let installer = SupervisedServiceInstaller::new(
        config,
        supervisor,
        Arc::new(SystemCommandRunner::new()),
        Arc::new(ConsoleReporter::new()),
    )?;
    Ok(installer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use runsvctl_core::Backend;
    use std::path::PathBuf;

    #[test]
    fn test_overrides_replace_file_values() {
        let mut config = ServiceConfig {
            display_name: "From File".to_string(),
            user: "file-user".to_string(),
            extra_args: vec!["-I".to_string()],
            ..Default::default()
        };
        let global = GlobalArgs {
            name: Some("Homebridge".to_string()),
            supervisor_root: Some(PathBuf::from("/tmp/sv")),
            backend: Some(Backend::S6),
            ..Default::default()
        };

        apply_overrides(&mut config, &global);

        assert_eq!(config.display_name, "Homebridge");
        assert_eq!(config.user, "file-user");
        assert_eq!(config.supervisor_root, PathBuf::from("/tmp/sv"));
        assert_eq!(config.backend, Backend::S6);
        assert_eq!(config.extra_args, vec!["-I"]);
    }

    #[test]
    fn test_no_overrides_keep_config() {
        let original = ServiceConfig {
            display_name: "Homebridge".to_string(),
            ..Default::default()
        };
        let mut config = original.clone();
        apply_overrides(&mut config, &GlobalArgs::default());
        assert_eq!(config, original);
    }
}
