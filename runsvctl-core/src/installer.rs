//! Lifecycle operations for one supervised service.
//!
//! The service directory is the source of truth. Supervisor commands run
//! after it is in place and their failures are reported, never escalated:
//! an installed service that fails to start is still installed.

use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::{
    Backend, CommandRunner, Error, InstallationState, Invocation, OwnerIds, Reporter, Result,
    ServiceConfig, ServiceDescriptor, ServiceDirectoryManager, ServiceScriptGenerator,
    SupervisorAdapter, UserValidator,
};

/// How long install waits for the supervisor to pick up a new service.
pub const SUPERVISE_TIMEOUT: Duration = Duration::from_secs(10);
const SUPERVISE_POLL_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Start,
    Stop,
    Restart,
}

impl Action {
    fn verb(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Stop => "stop",
            Self::Restart => "restart",
        }
    }

    fn progressive(&self) -> &'static str {
        match self {
            Self::Start => "Starting",
            Self::Stop => "Stopping",
            Self::Restart => "Restarting",
        }
    }

    fn past(&self) -> &'static str {
        match self {
            Self::Start => "started",
            Self::Stop => "stopped",
            Self::Restart => "restarted",
        }
    }
}

/// What `view` shows: where everything lives and what install would write.
#[derive(Debug, Clone, Serialize)]
pub struct ServiceView {
    pub state: InstallationState,
    pub backend: Backend,
    pub user: String,
    pub log_owner: String,
    pub service: ServiceDescriptor,
    pub run_script: String,
    pub log_run_script: String,
}

pub struct SupervisedServiceInstaller {
    config: ServiceConfig,
    service: ServiceDescriptor,
    users: UserValidator,
    directories: ServiceDirectoryManager,
    scripts: ServiceScriptGenerator,
    supervisor: Arc<dyn SupervisorAdapter>,
    runner: Arc<dyn CommandRunner>,
    reporter: Arc<dyn Reporter>,
    supervise_timeout: Duration,
}

impl SupervisedServiceInstaller {
    pub fn new(
        config: ServiceConfig,
        supervisor: Arc<dyn SupervisorAdapter>,
        runner: Arc<dyn CommandRunner>,
        reporter: Arc<dyn Reporter>,
    ) -> Result<Self> {
        config.validate()?;
        let service = config.descriptor()?;
        let scripts = ServiceScriptGenerator::new(config.interpreter.clone(), supervisor.dialect());

        Ok(Self {
            config,
            service,
            users: UserValidator::default(),
            directories: ServiceDirectoryManager::new(),
            scripts,
            supervisor,
            runner,
            reporter,
            supervise_timeout: SUPERVISE_TIMEOUT,
        })
    }

    pub fn with_user_validator(mut self, users: UserValidator) -> Self {
        self.users = users;
        self
    }

    pub fn with_supervise_timeout(mut self, timeout: Duration) -> Self {
        self.supervise_timeout = timeout;
        self
    }

    pub fn service(&self) -> &ServiceDescriptor {
        &self.service
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    pub fn state(&self) -> InstallationState {
        self.directories.state(&self.service)
    }

    /// Create or refresh the service definition, enable it and start it.
    ///
    /// A missing user aborts before anything is written. Directory and
    /// script errors abort the rest of the sequence; whatever was already
    /// written stays, and the next install overwrites it.
    pub async fn install(&self) -> Result<()> {
        let display = &self.service.display_name;
        info!(service = %self.service.name, user = %self.config.user, "Installing service");

        self.users.ensure_user_exists(&self.config.user)?;
        let exec = self.config.exec_spec(&self.service)?;

        let lock = self.directories.lock(&self.service)?;
        if self.state().is_present() {
            self.reporter.info(&format!(
                "{} service already exists, updating its definition",
                display
            ));
        } else {
            self.reporter.info(&format!(
                "Installing {} service as user {}",
                display, self.config.user
            ));
        }

        self.directories.ensure(&self.service).await?;
        self.scripts.write_run_script(&self.service, &exec).await?;
        self.scripts
            .write_log_run_script(&self.service, &self.config.log_owner)
            .await?;
        self.reporter.succeed(&format!(
            "Created service definition in {}",
            self.service.root_path.display()
        ));

        match self.supervisor.enable_autostart(&self.service).await {
            Ok(()) => {
                self.reporter
                    .succeed(&format!("Enabled {} to start on boot", display));
                if !self.wait_for_supervisor().await {
                    self.reporter.warn(&format!(
                        "Supervisor has not picked up {} after {}s",
                        display,
                        self.supervise_timeout.as_secs()
                    ));
                }
            }
            Err(e) => {
                warn!(service = %self.service.name, error = %e, "Enabling autostart failed");
                self.reporter.warn(&format!(
                    "Could not enable {} to start on boot: {}",
                    display, e
                ));
            }
        }
        drop(lock);

        self.control(Action::Start).await;
        self.reporter.post_install(&self.service);
        Ok(())
    }

    /// Remove the service definition. An absent service is reported, not an error.
    pub async fn uninstall(&self) -> Result<()> {
        let display = &self.service.display_name;
        if !self.state().is_present() {
            self.report_not_found();
            return Ok(());
        }

        let lock = self.directories.lock(&self.service)?;
        self.reporter.info(&format!("Removing {} service", display));
        match self.directories.remove(&self.service).await {
            Ok(()) => {
                info!(service = %self.service.name, "Service removed");
                if let Err(e) = lock.discard() {
                    warn!(service = %self.service.name, error = %e, "Could not remove lock file");
                }
                self.reporter.succeed(&format!("Removed {} service", display));
                Ok(())
            }
            // Removed by someone else between the check and the lock.
            Err(Error::ServiceNotInstalled(_)) => {
                self.report_not_found();
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    pub async fn start(&self) -> Result<()> {
        self.control(Action::Start).await;
        Ok(())
    }

    pub async fn stop(&self) -> Result<()> {
        self.control(Action::Stop).await;
        Ok(())
    }

    pub async fn restart(&self) -> Result<()> {
        self.control(Action::Restart).await;
        Ok(())
    }

    /// Print supervisor status, then follow the log until interrupted.
    pub async fn logs(&self) -> Result<()> {
        self.reporter.info(&format!(
            "Showing status and log for {} ({})",
            self.service.display_name,
            self.service.current_log_file().display()
        ));
        if let Err(e) = self.supervisor.logs(&self.service).await {
            warn!(service = %self.service.name, error = %e, "Showing logs failed");
            self.reporter.fail(&format!(
                "Failed to show logs for {}: {}",
                self.service.display_name, e
            ));
        }
        Ok(())
    }

    pub fn view(&self) -> Result<ServiceView> {
        let exec = self.config.exec_spec(&self.service)?;
        Ok(ServiceView {
            state: self.state(),
            backend: self.supervisor.backend(),
            user: self.config.user.clone(),
            log_owner: self.config.log_owner.clone(),
            run_script: self.scripts.render_run_script(&exec),
            log_run_script: self
                .scripts
                .render_log_run_script(&self.service, &self.config.log_owner),
            service: self.service.clone(),
        })
    }

    /// uid/gid of `username`, or of the configured service user.
    pub fn resolve_owner_ids(&self, username: Option<&str>) -> Result<OwnerIds> {
        self.users
            .resolve_owner_ids(username.unwrap_or(&self.config.user))
    }

    pub async fn add(&self, package: &str) -> Result<()> {
        self.package_command("install", package).await
    }

    pub async fn remove(&self, package: &str) -> Result<()> {
        self.package_command("uninstall", package).await
    }

    /// Rebuild native modules in `dir`, or in the storage path.
    pub async fn rebuild(&self, dir: Option<&Path>) -> Result<()> {
        let dir = dir
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.config.resolved_storage_path(&self.service));
        let invocation = Invocation::new(self.config.package_manager.as_str())
            .arg("rebuild")
            .current_dir(dir);
        self.pass_through(invocation).await
    }

    async fn package_command(&self, subcommand: &str, package: &str) -> Result<()> {
        if package.trim().is_empty() || package.starts_with('-') {
            return Err(Error::Config(format!("Invalid package name {:?}", package)));
        }

        let invocation = Invocation::new(self.config.package_manager.as_str())
            .args([subcommand, package])
            .current_dir(self.config.resolved_storage_path(&self.service));
        self.pass_through(invocation).await
    }

    async fn pass_through(&self, invocation: Invocation) -> Result<()> {
        self.reporter.info(&format!("Running {}", invocation));
        self.runner.run_checked(&invocation).await?;
        self.reporter.succeed(&format!("Finished {}", invocation));
        Ok(())
    }

    async fn control(&self, action: Action) {
        let display = &self.service.display_name;
        if !self.state().is_present() {
            self.reporter.warn(&format!(
                "{} service is not installed at {}",
                display,
                self.service.root_path.display()
            ));
        }

        self.reporter
            .info(&format!("{} {} service", action.progressive(), display));
        let result = match action {
            Action::Start => self.supervisor.start(&self.service).await,
            Action::Stop => self.supervisor.stop(&self.service).await,
            Action::Restart => self.supervisor.restart(&self.service).await,
        };

        match result {
            Ok(()) => self
                .reporter
                .succeed(&format!("{} service {}", display, action.past())),
            Err(e) => {
                warn!(service = %self.service.name, action = action.verb(), error = %e, "Supervisor command failed");
                self.reporter.fail(&format!(
                    "Failed to {} {} service: {}",
                    action.verb(),
                    display,
                    e
                ));
            }
        }
    }

    /// Poll for the backend's ready marker until it appears or the timeout passes.
    async fn wait_for_supervisor(&self) -> bool {
        let marker = self.supervisor.ready_marker(&self.service);
        let deadline = Instant::now() + self.supervise_timeout;
        loop {
            if tokio::fs::try_exists(&marker).await.unwrap_or(false) {
                debug!(marker = %marker.display(), "Supervisor is ready");
                return true;
            }
            if Instant::now() >= deadline {
                warn!(marker = %marker.display(), "Timed out waiting for supervisor");
                return false;
            }
            tokio::time::sleep(SUPERVISE_POLL_INTERVAL).await;
        }
    }

    fn report_not_found(&self) {
        self.reporter.info(&format!(
            "{} service not found at {}",
            self.service.display_name,
            self.service.root_path.display()
        ));
    }
}
