use clap::{Args, Parser, Subcommand};
use runsvctl_core::Backend;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "runsvctl")]
#[command(about = "Install and control an application as a runit or s6 service", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Command,
}

/// Overrides for values from `runsvctl.json`.
#[derive(Args, Debug, Default, Clone)]
pub struct GlobalArgs {
    /// Config file to load instead of searching for runsvctl.json
    #[arg(short, long, global = true, env = "RUNSVCTL_CONFIG")]
    pub config: Option<PathBuf>,

    /// Service display name
    #[arg(short, long, global = true, env = "RUNSVCTL_NAME")]
    pub name: Option<String>,

    /// User the service runs as
    #[arg(short, long, global = true, env = "RUNSVCTL_USER")]
    pub user: Option<String>,

    /// User the log writer runs as
    #[arg(long, global = true, env = "RUNSVCTL_LOG_OWNER")]
    pub log_owner: Option<String>,

    /// Executable started by the run script
    #[arg(long, global = true, env = "RUNSVCTL_SELF_PATH")]
    pub self_path: Option<PathBuf>,

    /// Data directory passed to the application
    #[arg(long, global = true, env = "RUNSVCTL_STORAGE_PATH")]
    pub storage_path: Option<PathBuf>,

    /// Directory holding service definitions
    #[arg(long, global = true, env = "RUNSVCTL_SUPERVISOR_ROOT")]
    pub supervisor_root: Option<PathBuf>,

    /// Directory scanned by the supervisor for enabled services
    #[arg(long, global = true, env = "RUNSVCTL_SCAN_DIR")]
    pub scan_dir: Option<PathBuf>,

    /// Parent of per-service log directories
    #[arg(long, global = true, env = "RUNSVCTL_LOG_ROOT")]
    pub log_root: Option<PathBuf>,

    /// Supervision suite (runit or s6)
    #[arg(long, global = true, env = "RUNSVCTL_BACKEND")]
    pub backend: Option<Backend>,

    /// Extra argument appended to the application command (repeatable)
    #[arg(long = "extra-arg", global = true, allow_hyphen_values = true)]
    pub extra_args: Vec<String>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Install or update the service and start it
    Install,

    /// Remove the service definition
    Uninstall,

    /// Start the service
    Start,

    /// Stop the service
    Stop,

    /// Restart the service
    Restart,

    /// Show service status and follow its log
    Logs,

    /// Show where the service lives and the scripts install would write
    View(ViewArgs),

    /// Print uid and gid of a user (defaults to the service user)
    Id(IdArgs),

    /// Install a package into the storage path
    Add(PackageArgs),

    /// Uninstall a package from the storage path
    Remove(PackageArgs),

    /// Rebuild native modules
    Rebuild(RebuildArgs),
}

#[derive(Parser)]
pub struct ViewArgs {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

#[derive(Parser)]
pub struct IdArgs {
    /// User name
    pub user: Option<String>,

    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

#[derive(Parser)]
pub struct PackageArgs {
    /// Package name or spec
    pub package: String,
}

#[derive(Parser)]
pub struct RebuildArgs {
    /// Directory to rebuild in (defaults to the storage path)
    pub dir: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use serial_test::serial;

    #[test]
    fn test_cli_install_with_globals() {
        let cli = Cli::parse_from([
            "runsvctl",
            "--name",
            "Homebridge",
            "--user",
            "homebridge",
            "--backend",
            "s6",
            "install",
        ]);

        assert!(matches!(cli.command, Command::Install));
        assert_eq!(cli.global.name, Some("Homebridge".to_string()));
        assert_eq!(cli.global.user, Some("homebridge".to_string()));
        assert_eq!(cli.global.backend, Some(Backend::S6));
        assert_eq!(cli.global.config, None);
    }

    #[test]
    fn test_cli_globals_after_subcommand() {
        let cli = Cli::parse_from([
            "runsvctl",
            "uninstall",
            "--name",
            "Homebridge",
            "--supervisor-root",
            "/tmp/sv",
        ]);

        assert!(matches!(cli.command, Command::Uninstall));
        assert_eq!(cli.global.supervisor_root, Some(PathBuf::from("/tmp/sv")));
    }

    #[test]
    fn test_cli_extra_args() {
        let cli = Cli::parse_from([
            "runsvctl",
            "--extra-arg",
            "-I",
            "--extra-arg",
            "--debug",
            "view",
        ]);

        assert_eq!(cli.global.extra_args, vec!["-I", "--debug"]);
    }

    #[test]
    fn test_cli_invalid_backend() {
        assert!(Cli::try_parse_from(["runsvctl", "--backend", "systemd", "start"]).is_err());
    }

    #[test]
    #[serial]
    fn test_cli_env_fallback() {
        // SAFETY: serialized with every other test that touches the environment.
        unsafe {
            std::env::set_var("RUNSVCTL_BACKEND", "s6");
            std::env::set_var("RUNSVCTL_NAME", "Homebridge");
        }
        let cli = Cli::parse_from(["runsvctl", "--name", "Other", "start"]);
        unsafe {
            std::env::remove_var("RUNSVCTL_BACKEND");
            std::env::remove_var("RUNSVCTL_NAME");
        }

        assert_eq!(cli.global.backend, Some(Backend::S6));
        assert_eq!(cli.global.name, Some("Other".to_string()));
    }

    #[test]
    fn test_cli_view_defaults() {
        let cli = Cli::parse_from(["runsvctl", "view"]);
        match cli.command {
            Command::View(args) => assert!(!args.json),
            _ => panic!("Expected View command"),
        }
    }

    #[test]
    fn test_cli_id() {
        let cli = Cli::parse_from(["runsvctl", "id", "root", "--json"]);
        match cli.command {
            Command::Id(args) => {
                assert_eq!(args.user, Some("root".to_string()));
                assert!(args.json);
            }
            _ => panic!("Expected Id command"),
        }
    }

    #[test]
    fn test_cli_packages() {
        let cli = Cli::parse_from(["runsvctl", "add", "homebridge-hue@1.2.0"]);
        match cli.command {
            Command::Add(args) => assert_eq!(args.package, "homebridge-hue@1.2.0"),
            _ => panic!("Expected Add command"),
        }

        let cli = Cli::parse_from(["runsvctl", "rebuild"]);
        match cli.command {
            Command::Rebuild(args) => assert_eq!(args.dir, None),
            _ => panic!("Expected Rebuild command"),
        }
    }

    #[test]
    fn test_cli_package_required() {
        assert!(Cli::try_parse_from(["runsvctl", "remove"]).is_err());
    }
}
