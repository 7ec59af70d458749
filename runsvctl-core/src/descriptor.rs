use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Directory-safe service name derived from a display name.
#[derive(Debug, Clone, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct ServiceName(String);

impl ServiceName {
    pub fn new(display_name: impl Into<String>) -> crate::Result<Self> {
        let display_name = display_name.into();
        let sanitized = Self::sanitize(&display_name);
        if sanitized.is_empty() {
            return Err(crate::Error::InvalidServiceName(display_name));
        }
        Ok(Self(sanitized))
    }

    // Supervisors skip scan-dir entries that start with a dot, so leading
    // dots are stripped along with separators.
    fn sanitize(name: &str) -> String {
        name.chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.' {
                    c.to_ascii_lowercase()
                } else {
                    '-'
                }
            })
            .collect::<String>()
            .trim_matches(|c| c == '-' || c == '.')
            .to_string()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ServiceName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Whether the service is installed. Only the service root directory decides this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InstallationState {
    Absent,
    Present,
}

impl InstallationState {
    pub fn is_present(&self) -> bool {
        matches!(self, Self::Present)
    }
}

/// Fixed host directories a descriptor is derived from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupervisorPaths {
    /// Where service definitions live (`/etc/sv`).
    pub supervisor_root: PathBuf,
    /// Directory the supervisor scans for enabled services (`/var/service`).
    pub scan_dir: PathBuf,
    /// Parent of the per-service log output directories (`/var/log`).
    pub log_root: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceDescriptor {
    pub display_name: String,
    pub name: ServiceName,
    pub root_path: PathBuf,
    pub run_script_path: PathBuf,
    pub log_dir_path: PathBuf,
    pub log_run_script_path: PathBuf,
    pub autostart_link: PathBuf,
    pub log_output_dir: PathBuf,
    pub lock_path: PathBuf,
}

impl ServiceDescriptor {
    pub fn new(display_name: &str, paths: &SupervisorPaths) -> crate::Result<Self> {
        let name = ServiceName::new(display_name)?;
        let root_path = paths.supervisor_root.join(name.as_str());
        let log_dir_path = root_path.join("log");

        Ok(Self {
            display_name: display_name.trim().to_string(),
            run_script_path: root_path.join("run"),
            log_run_script_path: log_dir_path.join("run"),
            autostart_link: paths.scan_dir.join(name.as_str()),
            log_output_dir: paths.log_root.join(name.as_str()),
            lock_path: paths.supervisor_root.join(format!(".{}.lock", name)),
            log_dir_path,
            root_path,
            name,
        })
    }

    /// The live log file written by the log-rotation utility.
    pub fn current_log_file(&self) -> PathBuf {
        self.log_output_dir.join("current")
    }

    pub fn supervisor_root(&self) -> &Path {
        self.root_path.parent().unwrap_or_else(|| Path::new("/"))
    }
}
