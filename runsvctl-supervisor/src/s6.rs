use async_trait::async_trait;
use runsvctl_core::{
    Backend, CommandRunner, Invocation, Result, ServiceDescriptor, SupervisorAdapter,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

use crate::common::{link, run, supervised_path, tail_invocation};

/// s6: `s6-svscan` watches the scan directory, `s6-svc` sends commands.
pub struct S6Supervisor {
    runner: Arc<dyn CommandRunner>,
}

impl S6Supervisor {
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        debug!("s6 supervisor adapter initialized");
        Self { runner }
    }

    fn svc(&self, flag: &str, service: &ServiceDescriptor) -> Invocation {
        Invocation::new("s6-svc")
            .args([flag.to_string(), supervised_path(service)])
            .capture()
    }
}

#[async_trait]
impl SupervisorAdapter for S6Supervisor {
    fn backend(&self) -> Backend {
        Backend::S6
    }

    /// s6-supervise opens its control fifo once it accepts commands.
    fn ready_marker(&self, service: &ServiceDescriptor) -> PathBuf {
        service.root_path.join("supervise").join("control")
    }

    async fn enable_autostart(&self, service: &ServiceDescriptor) -> Result<()> {
        link(self.runner.as_ref(), service).await?;

        // s6-svscan only notices new entries on its next scan.
        if let Some(scan_dir) = service.autostart_link.parent() {
            let rescan = Invocation::new("s6-svscanctl")
                .args(["-a".to_string(), scan_dir.to_string_lossy().into_owned()])
                .capture();
            run(self.runner.as_ref(), rescan).await?;
        }
        Ok(())
    }

    async fn start(&self, service: &ServiceDescriptor) -> Result<()> {
        run(self.runner.as_ref(), self.svc("-u", service)).await
    }

    async fn stop(&self, service: &ServiceDescriptor) -> Result<()> {
        run(self.runner.as_ref(), self.svc("-d", service)).await
    }

    async fn restart(&self, service: &ServiceDescriptor) -> Result<()> {
        run(self.runner.as_ref(), self.svc("-r", service)).await
    }

    async fn status(&self, service: &ServiceDescriptor) -> Result<()> {
        let invocation = Invocation::new("s6-svstat").arg(supervised_path(service));
        run(self.runner.as_ref(), invocation).await
    }

    async fn tail_log(&self, service: &ServiceDescriptor) -> Result<()> {
        run(self.runner.as_ref(), tail_invocation(service)).await
    }
}
