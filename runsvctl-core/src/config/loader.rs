use super::ServiceConfig;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const CONFIG_FILE_NAME: &str = "runsvctl.json";

/// Config loader with auto-discovery
pub struct ConfigLoader {
    search_paths: Vec<PathBuf>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self {
            search_paths: vec![
                PathBuf::from("."),
                PathBuf::from("./config"),
                PathBuf::from("/etc/runsvctl"),
            ],
        }
    }
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loader that only looks in `paths`, in order.
    pub fn with_search_paths(paths: Vec<PathBuf>) -> Self {
        Self {
            search_paths: paths,
        }
    }

    pub fn with_search_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.search_paths.push(path.into());
        self
    }

    /// First `runsvctl.json` found on the search path.
    pub fn discover(&self) -> Option<PathBuf> {
        self.search_paths
            .iter()
            .map(|dir| dir.join(CONFIG_FILE_NAME))
            .find(|candidate| candidate.is_file())
    }

    /// Load the discovered config, or defaults when there is none.
    pub async fn load(&self) -> crate::Result<ServiceConfig> {
        match self.discover() {
            Some(path) => self.load_file(&path).await,
            None => {
                debug!("No {} found, using defaults", CONFIG_FILE_NAME);
                Ok(ServiceConfig::default())
            }
        }
    }

    /// Load a specific config file
    pub async fn load_file(&self, path: &Path) -> crate::Result<ServiceConfig> {
        debug!(path = %path.display(), "Loading config");
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            crate::Error::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        serde_json::from_str(&content).map_err(|e| {
            crate::Error::Config(format!("Failed to parse {}: {}", path.display(), e))
        })
    }
}
