//! Rendering and writing of the `run` and `log/run` scripts.
//!
//! Rendering is pure so script contents can be checked without touching the
//! filesystem. Writing stages the full content in a sibling temp file, sets
//! the executable mode and renames it over the target, so a script is never
//! executable with partial content.

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::ServiceDescriptor;

/// rwxr-xr-x
pub const SCRIPT_MODE: u32 = 0o755;

/// Backend-specific tools used inside generated scripts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScriptDialect {
    /// Prefix that runs the rest of the command line as the given user.
    pub privilege_drop: &'static [&'static str],
    /// Puts the application in its own session. Empty when the supervisor
    /// already starts `run` as a session leader.
    pub session: &'static [&'static str],
    /// Log-rotation utility, followed by the log directory.
    pub log_utility: &'static [&'static str],
}

impl ScriptDialect {
    pub const RUNIT: Self = Self {
        privilege_drop: &["chpst", "-u"],
        session: &["setsid"],
        log_utility: &["svlogd", "-tt"],
    };

    pub const S6: Self = Self {
        privilege_drop: &["s6-setuidgid"],
        session: &[],
        log_utility: &["s6-log", "t"],
    };

    pub fn run_as<I, S>(&self, user: &str, command: I) -> Vec<String>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.privilege_drop
            .iter()
            .map(|s| s.to_string())
            .chain(std::iter::once(user.to_string()))
            .chain(command.into_iter().map(Into::into))
            .collect()
    }
}

/// The application command the supervised process runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecSpec {
    pub self_path: PathBuf,
    pub storage_path: PathBuf,
    pub user: String,
    pub extra_args: Vec<String>,
}

impl ExecSpec {
    /// Full argv: privilege drop, session prefix, then the application.
    pub fn command_line(&self, dialect: &ScriptDialect) -> Vec<String> {
        let mut command: Vec<String> = dialect.session.iter().map(|s| s.to_string()).collect();
        command.extend([
            self.self_path.to_string_lossy().into_owned(),
            "run".to_string(),
            "--storage-path".to_string(),
            self.storage_path.to_string_lossy().into_owned(),
        ]);
        command.extend(self.extra_args.iter().cloned());
        dialect.run_as(&self.user, command)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunScriptSpec {
    pub interpreter: PathBuf,
    pub command_line: Vec<String>,
}

impl RunScriptSpec {
    pub fn render(&self) -> String {
        format!(
            "#!{}\nexec 2>&1\nexec {}\n",
            self.interpreter.display(),
            shell_words::join(&self.command_line)
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRunScriptSpec {
    pub interpreter: PathBuf,
    pub log_directory: PathBuf,
    pub owner: String,
    pub dialect: ScriptDialect,
}

impl LogRunScriptSpec {
    pub fn render(&self) -> String {
        let dir = self.log_directory.to_string_lossy();
        let quoted_dir = shell_words::quote(&dir);
        let quoted_owner = shell_words::quote(&self.owner);

        let logger = self.dialect.run_as(
            &self.owner,
            self.dialect
                .log_utility
                .iter()
                .map(|s| s.to_string())
                .chain(std::iter::once(dir.to_string())),
        );

        format!(
            "#!{}\nmkdir -p {}\nchown {} {}\nexec {}\n",
            self.interpreter.display(),
            quoted_dir,
            quoted_owner,
            quoted_dir,
            shell_words::join(&logger)
        )
    }
}

#[derive(Debug, Clone)]
pub struct ServiceScriptGenerator {
    interpreter: PathBuf,
    dialect: ScriptDialect,
}

impl ServiceScriptGenerator {
    pub fn new(interpreter: impl Into<PathBuf>, dialect: ScriptDialect) -> Self {
        Self {
            interpreter: interpreter.into(),
            dialect,
        }
    }

    pub fn run_script(&self, exec: &ExecSpec) -> RunScriptSpec {
        RunScriptSpec {
            interpreter: self.interpreter.clone(),
            command_line: exec.command_line(&self.dialect),
        }
    }

    pub fn log_run_script(&self, service: &ServiceDescriptor, owner: &str) -> LogRunScriptSpec {
        LogRunScriptSpec {
            interpreter: self.interpreter.clone(),
            log_directory: service.log_output_dir.clone(),
            owner: owner.to_string(),
            dialect: self.dialect,
        }
    }

    pub fn render_run_script(&self, exec: &ExecSpec) -> String {
        self.run_script(exec).render()
    }

    pub fn render_log_run_script(&self, service: &ServiceDescriptor, owner: &str) -> String {
        self.log_run_script(service, owner).render()
    }

    pub async fn write_run_script(
        &self,
        service: &ServiceDescriptor,
        exec: &ExecSpec,
    ) -> crate::Result<()> {
        write_executable(&service.run_script_path, &self.render_run_script(exec)).await
    }

    pub async fn write_log_run_script(
        &self,
        service: &ServiceDescriptor,
        owner: &str,
    ) -> crate::Result<()> {
        write_executable(
            &service.log_run_script_path,
            &self.render_log_run_script(service, owner),
        )
        .await
    }
}

/// Write `content` to `path` and leave it with [`SCRIPT_MODE`].
pub async fn write_executable(path: &Path, content: &str) -> crate::Result<()> {
    let staging = staging_path(path);
    debug!(path = %path.display(), staging = %staging.display(), "Writing script");

    if let Err(e) = stage_and_rename(&staging, path, content).await {
        let _ = tokio::fs::remove_file(&staging).await;
        return Err(crate::Error::file_write(path, e));
    }

    Ok(())
}

async fn stage_and_rename(staging: &Path, path: &Path, content: &str) -> std::io::Result<()> {
    let mut file = tokio::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .mode(0o600)
        .open(staging)
        .await?;
    file.write_all(content.as_bytes()).await?;
    file.sync_all().await?;
    drop(file);

    tokio::fs::set_permissions(staging, std::fs::Permissions::from_mode(SCRIPT_MODE)).await?;
    tokio::fs::rename(staging, path).await
}

fn staging_path(path: &Path) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.subsec_nanos())
        .unwrap_or_default();
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(
        ".{}.{}.{}.tmp",
        file_name,
        std::process::id(),
        nanos
    ))
}
