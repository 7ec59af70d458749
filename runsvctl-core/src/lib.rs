pub mod command;
pub mod config;
pub mod descriptor;
pub mod error;
pub mod installer;
pub mod layout;
pub mod report;
pub mod script;
pub mod supervisor;
pub mod user;

pub use command::{CommandOutput, CommandRunner, Invocation, StdioMode};
pub use config::{ConfigLoader, ServiceConfig};
pub use descriptor::{InstallationState, ServiceDescriptor, ServiceName, SupervisorPaths};
pub use error::{Error, Result};
pub use installer::{SUPERVISE_TIMEOUT, ServiceView, SupervisedServiceInstaller};
pub use layout::{InstallLock, ServiceDirectoryManager};
pub use report::{Level, MemoryReporter, Reporter};
pub use script::{
    ExecSpec, LogRunScriptSpec, RunScriptSpec, SCRIPT_MODE, ScriptDialect, ServiceScriptGenerator,
};
pub use supervisor::{Backend, SupervisorAdapter};
pub use user::{OwnerIds, SystemUserDatabase, UserDatabase, UserValidator};
