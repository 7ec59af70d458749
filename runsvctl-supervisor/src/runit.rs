use async_trait::async_trait;
use runsvctl_core::{
    Backend, CommandRunner, Invocation, Result, ServiceDescriptor, SupervisorAdapter,
};
use std::sync::Arc;
use tracing::debug;

use crate::common::{link, run, supervised_path, tail_invocation};

/// runit: `runsvdir` scans the service directory, `sv` controls services.
pub struct RunitSupervisor {
    runner: Arc<dyn CommandRunner>,
}

impl RunitSupervisor {
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        debug!("runit supervisor adapter initialized");
        Self { runner }
    }

    fn sv(&self, verb: &str, service: &ServiceDescriptor) -> Invocation {
        Invocation::new("sv").args([verb.to_string(), supervised_path(service)])
    }

    /// Control commands print one line; keep it for the error message.
    fn control(&self, verb: &str, service: &ServiceDescriptor) -> Invocation {
        self.sv(verb, service).capture()
    }
}

#[async_trait]
impl SupervisorAdapter for RunitSupervisor {
    fn backend(&self) -> Backend {
        Backend::Runit
    }

    async fn enable_autostart(&self, service: &ServiceDescriptor) -> Result<()> {
        link(self.runner.as_ref(), service).await
    }

    async fn start(&self, service: &ServiceDescriptor) -> Result<()> {
        run(self.runner.as_ref(), self.control("start", service)).await
    }

    async fn stop(&self, service: &ServiceDescriptor) -> Result<()> {
        run(self.runner.as_ref(), self.control("stop", service)).await
    }

    async fn restart(&self, service: &ServiceDescriptor) -> Result<()> {
        run(self.runner.as_ref(), self.control("restart", service)).await
    }

    async fn status(&self, service: &ServiceDescriptor) -> Result<()> {
        run(self.runner.as_ref(), self.sv("status", service)).await
    }

    async fn tail_log(&self, service: &ServiceDescriptor) -> Result<()> {
        run(self.runner.as_ref(), tail_invocation(service)).await
    }
}
