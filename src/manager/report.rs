//! Point-in-time status snapshots
//!
//! Only the runtime state is mandatory. Every other metric has its own
//! fallback so one unreadable file never costs the whole report.

use std::net::IpAddr;

use serde::Serialize;

use super::{ContainerHandle, ContainerState, Manager};
use crate::error::Result;
use crate::runtime::Runtime;

#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub name: String,
    pub state: ContainerState,
    pub autostart: bool,
    /// `None` when no task accounting file exists
    pub tasks: Option<usize>,
    /// `None` when no memory accounting file is readable
    pub memory_bytes: Option<u64>,
    pub init_pid: Option<u32>,
    /// First address on the configured interface, `None` if none answered in time
    pub address: Option<IpAddr>,
}

impl<R: Runtime> Manager<R> {
    /// Status of one existing container
    pub async fn snapshot(&self, name: &str) -> Result<Snapshot> {
        let name = self.validator.require_exists(Some(name))?;
        let handle = self.resolver.resolve(name).await?;
        self.snapshot_of(&handle).await
    }

    /// Status of every live container, in name order
    ///
    /// Containers whose state cannot be queried are logged and left out.
    pub async fn list(&self) -> Vec<Snapshot> {
        let mut snapshots = Vec::new();
        for name in self.live_names() {
            let result = match self.resolver.resolve(&name).await {
                Ok(handle) => self.snapshot_of(&handle).await,
                Err(e) => Err(e),
            };
            match result {
                Ok(snapshot) => snapshots.push(snapshot),
                Err(e) => log::warn!("Skipping {}: {}", name, e),
            }
        }
        snapshots
    }

    async fn snapshot_of(&self, handle: &ContainerHandle) -> Result<Snapshot> {
        let state = self.current_state(handle).await?;
        let name = &handle.name;

        let init_pid = if state.has_init() {
            match self.runtime.init_pid(handle).await {
                Ok(pid) => pid,
                Err(e) => {
                    log::debug!("No init pid for {}: {}", name, e);
                    None
                }
            }
        } else {
            None
        };

        let address = if state == ContainerState::Running {
            self.probe_address(handle).await
        } else {
            None
        };

        Ok(Snapshot {
            name: name.clone(),
            state,
            autostart: self.is_autostart(name),
            tasks: self.cgroups.task_count(name).await,
            memory_bytes: self.cgroups.memory_usage(name).await,
            init_pid,
            address,
        })
    }

    /// First address of the configured family, bounded by `probe_timeout`
    async fn probe_address(&self, handle: &ContainerHandle) -> Option<IpAddr> {
        let probe = self.runtime.addresses(
            handle,
            self.config.family,
            &self.config.interface,
        );

        match tokio::time::timeout(self.config.probe_timeout, probe).await {
            Ok(Ok(addrs)) => addrs.first().copied(),
            Ok(Err(e)) => {
                log::debug!("Address probe for {} failed: {}", handle.name, e);
                None
            }
            Err(_) => {
                log::debug!(
                    "Address probe for {} timed out after {:?}",
                    handle.name,
                    self.config.probe_timeout
                );
                None
            }
        }
    }
}
