use colored::Colorize;
use runsvctl_core::{InstallationState, ServiceView};
use std::path::Path;

use crate::cli::{GlobalArgs, ViewArgs};
use crate::common::build_installer;

pub async fn execute(global: &GlobalArgs, args: ViewArgs) -> anyhow::Result<()> {
    let installer = build_installer(global).await?;
    let view = installer.view()?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&view)?);
    } else {
        print_view(&view);
    }
    Ok(())
}

fn print_view(view: &ServiceView) {
    let service = &view.service;
    let state = match view.state {
        InstallationState::Present => "installed".green(),
        InstallationState::Absent => "not installed".yellow(),
    };

    println!("{} ({})", service.display_name.bold(), service.name);
    row("State", &state.to_string());
    row("Backend", view.backend.as_str());
    row("User", &view.user);
    row("Log owner", &view.log_owner);
    path_row("Service directory", &service.root_path);
    path_row("Run script", &service.run_script_path);
    path_row("Log run script", &service.log_run_script_path);
    path_row("Autostart link", &service.autostart_link);
    path_row("Log file", &service.current_log_file());

    println!();
    println!("{}", "run".bold());
    print!("{}", view.run_script);
    println!();
    println!("{}", "log/run".bold());
    print!("{}", view.log_run_script);
}

fn row(label: &str, value: &str) {
    println!("  {:<18} {}", format!("{}:", label), value);
}

fn path_row(label: &str, path: &Path) {
    row(label, &path.display().to_string());
}
