mod common;
mod runit;
mod runner;
mod s6;

pub use common::TAIL_LINES;
pub use runit::RunitSupervisor;
pub use runner::SystemCommandRunner;
pub use s6::S6Supervisor;

use runsvctl_core::{Backend, CommandRunner, SupervisorAdapter};
use std::sync::Arc;
use tracing::debug;

pub fn create_adapter(
    backend: Backend,
    runner: Arc<dyn CommandRunner>,
) -> Arc<dyn SupervisorAdapter> {
    debug!(%backend, "Creating supervisor adapter");
    match backend {
        Backend::Runit => Arc::new(RunitSupervisor::new(runner)),
        Backend::S6 => Arc::new(S6Supervisor::new(runner)),
    }
}

/// Adapter for `backend` that runs real commands.
pub fn create_system_adapter(backend: Backend) -> Arc<dyn SupervisorAdapter> {
    create_adapter(backend, Arc::new(SystemCommandRunner::new()))
}
