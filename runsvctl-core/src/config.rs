pub mod loader;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::{Backend, ExecSpec, ServiceDescriptor, ServiceName, SupervisorPaths};

pub use loader::{CONFIG_FILE_NAME, ConfigLoader};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Human-facing name; the directory name is derived from it.
    pub display_name: String,
    /// Account the service process runs as.
    pub user: String,
    /// Account the log-rotation utility runs as.
    pub log_owner: String,
    /// Application executable. Defaults to the current executable.
    pub self_path: Option<PathBuf>,
    /// Data directory handed to the application. Defaults to `/var/lib/<name>`.
    pub storage_path: Option<PathBuf>,
    pub extra_args: Vec<String>,
    pub supervisor_root: PathBuf,
    /// Defaults to the backend's scan directory.
    pub scan_dir: Option<PathBuf>,
    pub log_root: PathBuf,
    pub interpreter: PathBuf,
    pub backend: Backend,
    pub package_manager: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            display_name: String::new(),
            user: String::new(),
            log_owner: "nobody".to_string(),
            self_path: None,
            storage_path: None,
            extra_args: Vec::new(),
            supervisor_root: PathBuf::from("/etc/sv"),
            scan_dir: None,
            log_root: PathBuf::from("/var/log"),
            interpreter: PathBuf::from("/bin/sh"),
            backend: Backend::default(),
            package_manager: "npm".to_string(),
        }
    }
}

impl ServiceConfig {
    pub fn validate(&self) -> crate::Result<()> {
        if self.display_name.trim().is_empty() {
            return Err(crate::Error::Config(
                "Service name is not set (use --name or display_name)".to_string(),
            ));
        }
        ServiceName::new(self.display_name.as_str())?;

        if self.log_owner.trim().is_empty() {
            return Err(crate::Error::Config("log_owner cannot be empty".to_string()));
        }

        if self.package_manager.trim().is_empty() {
            return Err(crate::Error::Config(
                "package_manager cannot be empty".to_string(),
            ));
        }

        let mut paths: Vec<(&str, &Path)> = vec![
            ("supervisor_root", self.supervisor_root.as_path()),
            ("log_root", self.log_root.as_path()),
            ("interpreter", self.interpreter.as_path()),
        ];
        if let Some(scan_dir) = &self.scan_dir {
            paths.push(("scan_dir", scan_dir.as_path()));
        }
        if let Some(self_path) = &self.self_path {
            paths.push(("self_path", self_path.as_path()));
        }
        if let Some(storage_path) = &self.storage_path {
            paths.push(("storage_path", storage_path.as_path()));
        }

        for (field, path) in paths {
            if !path.is_absolute() {
                return Err(crate::Error::Config(format!(
                    "{} must be an absolute path, got {}",
                    field,
                    path.display()
                )));
            }
        }

        Ok(())
    }

    pub fn paths(&self) -> SupervisorPaths {
        SupervisorPaths {
            supervisor_root: self.supervisor_root.clone(),
            scan_dir: self
                .scan_dir
                .clone()
                .unwrap_or_else(|| self.backend.default_scan_dir()),
            log_root: self.log_root.clone(),
        }
    }

    pub fn descriptor(&self) -> crate::Result<ServiceDescriptor> {
        ServiceDescriptor::new(&self.display_name, &self.paths())
    }

    pub fn resolved_storage_path(&self, service: &ServiceDescriptor) -> PathBuf {
        self.storage_path
            .clone()
            .unwrap_or_else(|| PathBuf::from("/var/lib").join(service.name.as_str()))
    }

    pub fn resolved_self_path(&self) -> crate::Result<PathBuf> {
        match &self.self_path {
            Some(path) => Ok(path.clone()),
            None => Ok(std::env::current_exe()?),
        }
    }

    pub fn exec_spec(&self, service: &ServiceDescriptor) -> crate::Result<ExecSpec> {
        Ok(ExecSpec {
            self_path: self.resolved_self_path()?,
            storage_path: self.resolved_storage_path(service),
            user: self.user.clone(),
            extra_args: self.extra_args.clone(),
        })
    }
}
