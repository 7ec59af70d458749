use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;

use crate::{ScriptDialect, ServiceDescriptor};

/// Supervision backends that follow the directory-per-service layout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    #[default]
    Runit,
    S6,
}

impl Backend {
    /// Directory the backend's scanner watches for enabled services.
    pub fn default_scan_dir(&self) -> PathBuf {
        match self {
            Self::Runit => PathBuf::from("/var/service"),
            Self::S6 => PathBuf::from("/run/service"),
        }
    }

    pub fn dialect(&self) -> ScriptDialect {
        match self {
            Self::Runit => ScriptDialect::RUNIT,
            Self::S6 => ScriptDialect::S6,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Runit => "runit",
            Self::S6 => "s6",
        }
    }
}

impl std::fmt::Display for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Backend {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "runit" => Ok(Self::Runit),
            "s6" => Ok(Self::S6),
            other => Err(crate::Error::Config(format!(
                "Unknown supervision backend '{}' (expected runit or s6)",
                other
            ))),
        }
    }
}

/// Lifecycle verbs of a supervision backend.
///
/// Every call runs one or more external commands and resolves when they
/// exit. Failures come back as [`crate::Error::CommandExecution`]; deciding
/// whether a failure matters is left to the caller.
#[async_trait]
pub trait SupervisorAdapter: Send + Sync {
    fn backend(&self) -> Backend;

    fn dialect(&self) -> ScriptDialect {
        self.backend().dialect()
    }

    /// File the backend's per-service supervisor creates once it accepts commands.
    fn ready_marker(&self, service: &ServiceDescriptor) -> PathBuf {
        service.root_path.join("supervise").join("ok")
    }

    /// Mark the service so the supervisor brings it up at boot.
    async fn enable_autostart(&self, service: &ServiceDescriptor) -> crate::Result<()>;

    async fn start(&self, service: &ServiceDescriptor) -> crate::Result<()>;

    async fn stop(&self, service: &ServiceDescriptor) -> crate::Result<()>;

    async fn restart(&self, service: &ServiceDescriptor) -> crate::Result<()>;

    async fn status(&self, service: &ServiceDescriptor) -> crate::Result<()>;

    /// Follow the live log. Does not return until the tail is interrupted.
    async fn tail_log(&self, service: &ServiceDescriptor) -> crate::Result<()>;

    async fn logs(&self, service: &ServiceDescriptor) -> crate::Result<()> {
        self.status(service).await?;
        self.tail_log(service).await
    }
}
