use nix::errno::Errno;
use nix::fcntl::{Flock, FlockArg};
use std::fs::File;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::{Error, InstallationState, Result, ServiceDescriptor};

/// Owns the existence of `<supervisor-root>/<name>/{run, log/run}`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ServiceDirectoryManager;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Entry {
    File,
    Link,
    Dir,
}

impl ServiceDirectoryManager {
    pub fn new() -> Self {
        Self
    }

    pub fn exists(&self, service: &ServiceDescriptor) -> bool {
        service.root_path.exists()
    }

    pub fn state(&self, service: &ServiceDescriptor) -> InstallationState {
        if self.exists(service) {
            InstallationState::Present
        } else {
            InstallationState::Absent
        }
    }

    /// Create the service root and its `log` subdirectory. Existing
    /// directories are left untouched.
    pub async fn ensure(&self, service: &ServiceDescriptor) -> Result<()> {
        if self.exists(service) && service.log_dir_path.is_dir() {
            debug!(path = %service.root_path.display(), "Service directory already exists");
            return Ok(());
        }

        tokio::fs::create_dir_all(&service.log_dir_path)
            .await
            .map_err(|e| Error::file_write(&service.log_dir_path, e))?;
        debug!(path = %service.root_path.display(), "Created service directory");
        Ok(())
    }

    /// Remove the service definition, run script first so the supervisor
    /// stops seeing a runnable service before anything else disappears.
    ///
    /// Entries that are already gone are skipped, so an interrupted removal
    /// can be re-run. Any other failure stops at that step.
    pub async fn remove(&self, service: &ServiceDescriptor) -> Result<()> {
        if !self.state(service).is_present() {
            return Err(Error::ServiceNotInstalled(service.name.to_string()));
        }

        let steps = [
            (Entry::File, service.run_script_path.as_path()),
            (Entry::File, service.log_run_script_path.as_path()),
            (Entry::Link, service.autostart_link.as_path()),
            (Entry::Dir, service.log_dir_path.as_path()),
            (Entry::Dir, service.root_path.as_path()),
        ];

        for (entry, path) in steps {
            match remove_entry(entry, path).await {
                Ok(()) => debug!(path = %path.display(), "Removed"),
                Err(e) if e.kind() == ErrorKind::NotFound => {
                    debug!(path = %path.display(), "Already absent, skipping")
                }
                Err(source) => {
                    return Err(Error::Removal {
                        path: path.to_path_buf(),
                        source,
                    });
                }
            }
        }

        Ok(())
    }

    /// Take the per-service install lock. Fails immediately with
    /// [`Error::Locked`] if another process holds it.
    pub fn lock(&self, service: &ServiceDescriptor) -> Result<InstallLock> {
        if let Some(parent) = service.lock_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| Error::file_write(parent, e))?;
        }

        let file = File::options()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&service.lock_path)
            .map_err(|e| Error::file_write(&service.lock_path, e))?;

        match Flock::lock(file, FlockArg::LockExclusiveNonblock) {
            Ok(guard) => {
                debug!(path = %service.lock_path.display(), "Acquired install lock");
                Ok(InstallLock {
                    path: service.lock_path.clone(),
                    _guard: guard,
                })
            }
            Err((_, errno)) if errno == Errno::EWOULDBLOCK => {
                Err(Error::Locked(service.name.to_string()))
            }
            Err((_, errno)) => Err(Error::Unix(errno)),
        }
    }
}

/// Held for the duration of an install or uninstall; released on drop.
#[derive(Debug)]
pub struct InstallLock {
    path: PathBuf,
    _guard: Flock<File>,
}

impl InstallLock {
    /// Unlink the lock file while still holding it, then release it.
    pub fn discard(self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(source) => Err(Error::Removal {
                path: self.path.clone(),
                source,
            }),
        }
    }
}

async fn remove_entry(entry: Entry, path: &Path) -> std::io::Result<()> {
    match entry {
        Entry::File => tokio::fs::remove_file(path).await,
        Entry::Link => {
            let metadata = tokio::fs::symlink_metadata(path).await?;
            if metadata.file_type().is_symlink() {
                tokio::fs::remove_file(path).await
            } else {
                warn!(
                    path = %path.display(),
                    "Autostart entry is not a symlink, leaving it in place"
                );
                Ok(())
            }
        }
        // The supervisor keeps its own state (`supervise/`) inside these.
        Entry::Dir => tokio::fs::remove_dir_all(path).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SupervisorPaths;
    use tempfile::TempDir;

    fn service(root: &Path) -> ServiceDescriptor {
        ServiceDescriptor::new(
            "Homebridge",
            &SupervisorPaths {
                supervisor_root: root.join("sv"),
                scan_dir: root.join("service"),
                log_root: root.join("log"),
            },
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_ensure_creates_tree() {
        let temp_dir = TempDir::new().unwrap();
        let service = service(temp_dir.path());
        let manager = ServiceDirectoryManager::new();

        assert_eq!(manager.state(&service), InstallationState::Absent);
        manager.ensure(&service).await.unwrap();

        assert_eq!(manager.state(&service), InstallationState::Present);
        assert!(service.log_dir_path.is_dir());
    }

    #[tokio::test]
    async fn test_ensure_is_idempotent() {
        let temp_dir = TempDir::new().unwrap();
        let service = service(temp_dir.path());
        let manager = ServiceDirectoryManager::new();

        manager.ensure(&service).await.unwrap();
        std::fs::write(&service.run_script_path, "keep").unwrap();
        manager.ensure(&service).await.unwrap();

        assert_eq!(
            std::fs::read_to_string(&service.run_script_path).unwrap(),
            "keep"
        );
    }

    #[tokio::test]
    async fn test_ensure_repairs_missing_log_dir() {
        let temp_dir = TempDir::new().unwrap();
        let service = service(temp_dir.path());
        let manager = ServiceDirectoryManager::new();

        std::fs::create_dir_all(&service.root_path).unwrap();
        manager.ensure(&service).await.unwrap();
        assert!(service.log_dir_path.is_dir());
    }

    #[tokio::test]
    async fn test_remove_absent_service() {
        let temp_dir = TempDir::new().unwrap();
        let service = service(temp_dir.path());

        let err = ServiceDirectoryManager::new()
            .remove(&service)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::ServiceNotInstalled(name) if name == "homebridge"));
    }

    #[tokio::test]
    async fn test_remove_full_tree() {
        let temp_dir = TempDir::new().unwrap();
        let service = service(temp_dir.path());
        let manager = ServiceDirectoryManager::new();

        manager.ensure(&service).await.unwrap();
        std::fs::write(&service.run_script_path, "run").unwrap();
        std::fs::write(&service.log_run_script_path, "log").unwrap();
        std::fs::create_dir_all(service.root_path.join("supervise")).unwrap();
        std::fs::create_dir_all(service.autostart_link.parent().unwrap()).unwrap();
        std::os::unix::fs::symlink(&service.root_path, &service.autostart_link).unwrap();

        manager.remove(&service).await.unwrap();

        assert_eq!(manager.state(&service), InstallationState::Absent);
        assert!(std::fs::symlink_metadata(&service.autostart_link).is_err());
        assert!(service.supervisor_root().exists());
    }

    #[tokio::test]
    async fn test_remove_tolerates_missing_log_script() {
        let temp_dir = TempDir::new().unwrap();
        let service = service(temp_dir.path());
        let manager = ServiceDirectoryManager::new();

        manager.ensure(&service).await.unwrap();
        std::fs::write(&service.run_script_path, "run").unwrap();

        manager.remove(&service).await.unwrap();
        assert!(!service.run_script_path.exists());
        assert!(!service.log_dir_path.exists());
        assert!(!service.root_path.exists());
    }

    #[tokio::test]
    async fn test_remove_keeps_foreign_scan_entry() {
        let temp_dir = TempDir::new().unwrap();
        let service = service(temp_dir.path());
        let manager = ServiceDirectoryManager::new();

        manager.ensure(&service).await.unwrap();
        std::fs::create_dir_all(&service.autostart_link).unwrap();

        manager.remove(&service).await.unwrap();
        assert!(service.autostart_link.is_dir());
        assert!(!service.root_path.exists());
    }

    #[test]
    fn test_lock_is_exclusive() {
        let temp_dir = TempDir::new().unwrap();
        let service = service(temp_dir.path());
        let manager = ServiceDirectoryManager::new();

        let held = manager.lock(&service).unwrap();
        assert!(service.lock_path.exists());
        assert!(matches!(manager.lock(&service), Err(Error::Locked(_))));

        drop(held);
        assert!(manager.lock(&service).is_ok());
    }

    #[test]
    fn test_discard_removes_lock_file() {
        let temp_dir = TempDir::new().unwrap();
        let service = service(temp_dir.path());
        let manager = ServiceDirectoryManager::new();

        manager.lock(&service).unwrap().discard().unwrap();
        assert!(!service.lock_path.exists());

        let again = manager.lock(&service).unwrap();
        assert!(service.lock_path.exists());
        drop(again);
    }
}
