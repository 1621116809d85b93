//! Container runtime seam
//!
//! The engine never creates namespaces or cgroups itself. Everything it asks
//! of the runtime goes through [`Runtime`]; [`LxcRuntime`] drives the stock
//! `lxc-*` tools.

mod lxc;

pub use lxc::LxcRuntime;

use std::net::IpAddr;

use crate::config::IpFamily;
use crate::manager::{ContainerHandle, ContainerState};

#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    #[error("failed to run {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{command} exited with status {code}: {stderr}")]
    Exited {
        command: String,
        code: i32,
        stderr: String,
    },

    #[error("unexpected output from {command}: {output}")]
    Output { command: String, output: String },
}

/// Primitives a container runtime exposes per container handle
///
/// Every call blocks until the runtime reports completion; the engine adds no
/// timeout of its own except around [`Runtime::addresses`].
#[allow(async_fn_in_trait)]
pub trait Runtime {
    /// Current state as reported by the runtime (never `Archived`)
    async fn state(&self, container: &ContainerHandle) -> Result<ContainerState, RuntimeError>;

    async fn start(&self, container: &ContainerHandle) -> Result<(), RuntimeError>;

    /// Graceful shutdown: signal the container's init and wait for it
    async fn stop(&self, container: &ContainerHandle) -> Result<(), RuntimeError>;

    /// Forced termination
    async fn kill(&self, container: &ContainerHandle) -> Result<(), RuntimeError>;

    async fn freeze(&self, container: &ContainerHandle) -> Result<(), RuntimeError>;

    async fn unfreeze(&self, container: &ContainerHandle) -> Result<(), RuntimeError>;

    /// Allocate storage and default config from a template
    async fn create(&self, container: &ContainerHandle, template: &str) -> Result<(), RuntimeError>;

    /// Remove the live tree and config
    async fn destroy(&self, container: &ContainerHandle) -> Result<(), RuntimeError>;

    /// Copy filesystem and config of `source` into a new container `target`
    async fn clone_container(
        &self,
        source: &ContainerHandle,
        target: &ContainerHandle,
    ) -> Result<(), RuntimeError>;

    /// PID of the container's init as seen from the host
    async fn init_pid(&self, container: &ContainerHandle) -> Result<Option<u32>, RuntimeError>;

    /// Addresses of `family` bound to `interface` inside the container
    async fn addresses(
        &self,
        container: &ContainerHandle,
        family: IpFamily,
        interface: &str,
    ) -> Result<Vec<IpAddr>, RuntimeError>;
}
