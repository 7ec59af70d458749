use runsvctl_core::{CommandRunner, Error, Invocation, Result, ServiceDescriptor};
use std::io::ErrorKind;

/// Lines of history shown before following the log.
pub const TAIL_LINES: usize = 50;

/// Symlink the service directory into the scan directory, replacing a stale link.
pub fn link_invocation(service: &ServiceDescriptor) -> Invocation {
    Invocation::new("ln")
        .args([
            "-sfn".to_string(),
            service.root_path.to_string_lossy().into_owned(),
            service.autostart_link.to_string_lossy().into_owned(),
        ])
        .capture()
}

/// The autostart path must be free or a symlink. `ln -sfn` would otherwise
/// create the link inside an existing directory and still succeed.
pub async fn check_link_slot(service: &ServiceDescriptor) -> Result<()> {
    match tokio::fs::symlink_metadata(&service.autostart_link).await {
        Ok(metadata) if !metadata.file_type().is_symlink() => Err(Error::FileWrite {
            path: service.autostart_link.clone(),
            source: std::io::Error::new(ErrorKind::AlreadyExists, "exists and is not a symlink"),
        }),
        _ => Ok(()),
    }
}

/// Link the service into the scan directory.
pub async fn link(runner: &dyn CommandRunner, service: &ServiceDescriptor) -> Result<()> {
    check_link_slot(service).await?;
    run(runner, link_invocation(service)).await
}

/// Follow the current log file across rotations.
pub fn tail_invocation(service: &ServiceDescriptor) -> Invocation {
    Invocation::new("tail").args([
        "-n".to_string(),
        TAIL_LINES.to_string(),
        "-F".to_string(),
        service.current_log_file().to_string_lossy().into_owned(),
    ])
}

pub fn supervised_path(service: &ServiceDescriptor) -> String {
    service.autostart_link.to_string_lossy().into_owned()
}

pub async fn run(runner: &dyn CommandRunner, invocation: Invocation) -> Result<()> {
    runner.run_checked(&invocation).await.map(|_| ())
}
