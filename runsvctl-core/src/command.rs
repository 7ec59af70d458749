use async_trait::async_trait;
use std::path::PathBuf;

/// How a child's standard streams are wired.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StdioMode {
    /// Share the caller's terminal so output streams live.
    #[default]
    Inherit,
    Capture,
}

/// One external command, described as an argument vector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
    pub stdio: StdioMode,
}

impl Invocation {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
            stdio: StdioMode::Inherit,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    pub fn capture(mut self) -> Self {
        self.stdio = StdioMode::Capture;
        self
    }

    /// Program and arguments as a shell-quoted line, for messages.
    pub fn command_line(&self) -> String {
        shell_words::join(std::iter::once(&self.program).chain(self.args.iter()))
    }
}

impl std::fmt::Display for Invocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.command_line())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// `None` when the child was killed by a signal.
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    fn failure_reason(&self) -> String {
        // sv reports its failures on stdout.
        let detail = match self.stderr.trim() {
            "" => self.stdout.trim(),
            stderr => stderr,
        };
        let status = match self.code {
            Some(code) => format!("exited with status {}", code),
            None => "terminated by signal".to_string(),
        };
        if detail.is_empty() {
            status
        } else {
            format!("{}: {}", status, detail)
        }
    }
}

#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run to completion. Only failing to launch is an error here.
    async fn run(&self, invocation: &Invocation) -> crate::Result<CommandOutput>;

    /// Run and turn a nonzero exit into [`crate::Error::CommandExecution`].
    async fn run_checked(&self, invocation: &Invocation) -> crate::Result<CommandOutput> {
        let output = self.run(invocation).await?;
        if output.success() {
            Ok(output)
        } else {
            Err(crate::Error::CommandExecution {
                command: invocation.command_line(),
                reason: output.failure_reason(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invocation_builder() {
        let invocation = Invocation::new("sv")
            .arg("start")
            .args(["/var/service/homebridge"])
            .current_dir("/tmp")
            .capture();

        assert_eq!(invocation.program, "sv");
        assert_eq!(invocation.args, vec!["start", "/var/service/homebridge"]);
        assert_eq!(invocation.cwd, Some(PathBuf::from("/tmp")));
        assert_eq!(invocation.stdio, StdioMode::Capture);
    }

    #[test]
    fn test_invocation_display_quotes() {
        let invocation = Invocation::new("tail").args(["-F", "/var/log/my app/current"]);
        assert_eq!(invocation.to_string(), "tail -F '/var/log/my app/current'");
    }

    #[test]
    fn test_failure_reason() {
        let output = CommandOutput {
            code: Some(1),
            stdout: String::new(),
            stderr: "fail: homebridge: unable to change to service directory\n".to_string(),
        };
        assert!(!output.success());
        assert_eq!(
            output.failure_reason(),
            "exited with status 1: fail: homebridge: unable to change to service directory"
        );

        let sv_output = CommandOutput {
            code: Some(1),
            stdout: "warning: homebridge: unable to open supervise/ok: file does not exist\n"
                .to_string(),
            stderr: String::new(),
        };
        assert_eq!(
            sv_output.failure_reason(),
            "exited with status 1: warning: homebridge: unable to open supervise/ok: file does not exist"
        );

        let killed = CommandOutput::default();
        assert_eq!(killed.failure_reason(), "terminated by signal");
    }
}
