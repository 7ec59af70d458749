use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("User {0} does not exist")]
    UserNotFound(String),

    #[error("Service {0} is not installed")]
    ServiceNotInstalled(String),

    #[error("Command `{command}` failed: {reason}")]
    CommandExecution { command: String, reason: String },

    #[error("Failed to write {}: {source}", path.display())]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to remove {}: {source}", path.display())]
    Removal {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Another runsvctl process is modifying service {0}")]
    Locked(String),

    #[error("Invalid service name: {0:?}")]
    InvalidServiceName(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Unix error: {0}")]
    Unix(#[from] nix::errno::Errno),

    #[error("Other error: {0}")]
    Other(#[from] anyhow::Error),
}

impl Error {
    pub(crate) fn file_write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::FileWrite {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
