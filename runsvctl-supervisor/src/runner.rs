use async_trait::async_trait;
use runsvctl_core::{CommandOutput, CommandRunner, Error, Invocation, Result, StdioMode};
use std::io::ErrorKind;
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

/// Runs invocations as real child processes.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemCommandRunner;

impl SystemCommandRunner {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CommandRunner for SystemCommandRunner {
    async fn run(&self, invocation: &Invocation) -> Result<CommandOutput> {
        debug!(command = %invocation, stdio = ?invocation.stdio, "Executing command");

        let failed = |reason: String| Error::CommandExecution {
            command: invocation.command_line(),
            reason,
        };

        let mut command = Command::new(&invocation.program);
        command.args(&invocation.args);
        if let Some(cwd) = &invocation.cwd {
            if !cwd.is_dir() {
                return Err(failed(format!(
                    "working directory {} does not exist",
                    cwd.display()
                )));
            }
            command.current_dir(cwd);
        }

        let spawn_error = |e: std::io::Error| {
            if e.kind() == ErrorKind::NotFound {
                failed(format!("{} not found", invocation.program))
            } else {
                failed(e.to_string())
            }
        };

        let output = match invocation.stdio {
            StdioMode::Inherit => {
                let status = command
                    .stdin(Stdio::inherit())
                    .stdout(Stdio::inherit())
                    .stderr(Stdio::inherit())
                    .status()
                    .await
                    .map_err(spawn_error)?;
                CommandOutput {
                    code: status.code(),
                    ..Default::default()
                }
            }
            StdioMode::Capture => {
                let output = command
                    .stdin(Stdio::null())
                    .output()
                    .await
                    .map_err(spawn_error)?;
                CommandOutput {
                    code: output.status.code(),
                    stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                    stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
                }
            }
        };

        debug!(command = %invocation, code = ?output.code, "Command finished");
        Ok(output)
    }
}
