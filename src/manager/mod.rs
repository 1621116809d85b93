//! Container lifecycle manager
//!
//! Resolves, validates, and drives state transitions for containers. Archive,
//! autostart, bulk, reporting, and SSH trust live in sibling modules as
//! further `impl Manager` blocks.

mod archive;
mod autostart;
mod bulk;
mod report;
mod resolver;
mod state;
mod trust;
mod validator;

pub use archive::ArchiveEntry;
pub use bulk::{BulkAction, BulkReport, Interrupt};
pub use report::Snapshot;
pub use resolver::{validate_name, ContainerHandle, Resolver};
pub use state::{ContainerState, UnknownState};
pub use validator::{require_name, Privilege, Validator};

use crate::cgroups::CgroupReader;
use crate::config::Config;
use crate::error::{LlxcError, Result};
use crate::runtime::Runtime;
use crate::ssh::SshKeys;

/// A single-container operation, dispatched by [`Manager::apply`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Start,
    Halt,
    Kill,
    Freeze,
    Unfreeze,
    Destroy,
    ToggleAutostart,
    Archive,
    Unarchive,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Halt => "halt",
            Self::Kill => "kill",
            Self::Freeze => "freeze",
            Self::Unfreeze => "unfreeze",
            Self::Destroy => "destroy",
            Self::ToggleAutostart => "toggle autostart for",
            Self::Archive => "archive",
            Self::Unarchive => "unarchive",
        }
    }
}

/// Lifecycle manager over one container root
pub struct Manager<R> {
    config: Config,
    runtime: R,
    resolver: Resolver,
    validator: Validator,
    cgroups: CgroupReader,
    keys: SshKeys,
    interrupt: Interrupt,
}

impl<R: Runtime> Manager<R> {
    /// Create a manager that requires an effective uid of 0 for mutations
    pub fn new(config: Config, runtime: R) -> Self {
        Self {
            resolver: Resolver::new(&config.container_root),
            validator: Validator::new(&config.container_root, Privilege::EffectiveUid),
            cgroups: CgroupReader::new(&config.cgroup_root),
            keys: SshKeys::new(&config.ssh_dir),
            interrupt: Interrupt::new(),
            config,
            runtime,
        }
    }

    /// Replace the privilege source
    pub fn with_privilege(mut self, privilege: Privilege) -> Self {
        self.validator = Validator::new(&self.config.container_root, privilege);
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn runtime(&self) -> &R {
        &self.runtime
    }

    /// Handle for cooperative cancellation of bulk loops
    pub fn interrupt(&self) -> Interrupt {
        self.interrupt.clone()
    }

    /// Names of all live containers in stable (sorted) order
    pub fn live_names(&self) -> Vec<String> {
        self.resolver.live_names()
    }

    /// Resolve a name without any precondition checks
    pub async fn resolve(&self, name: &str) -> Result<ContainerHandle> {
        self.resolver.resolve(name).await
    }

    /// Privilege + existence, then resolve. Entry point of every mutation.
    async fn guarded(&self, name: &str) -> Result<ContainerHandle> {
        self.validator.require_privilege()?;
        let name = self.validator.require_exists(Some(name))?;
        self.resolver.resolve(name).await
    }

    async fn current_state(&self, handle: &ContainerHandle) -> Result<ContainerState> {
        self.runtime
            .state(handle)
            .await
            .map_err(|e| LlxcError::runtime(&handle.name, "query state of", e))
    }

    /// Current state of an existing container (no privilege needed)
    pub async fn state(&self, name: &str) -> Result<ContainerState> {
        let name = self.validator.require_exists(Some(name))?;
        let handle = self.resolver.resolve(name).await?;
        self.current_state(&handle).await
    }

    /// Run one operation by tag
    pub async fn apply(&self, op: Operation, name: &str) -> Result<()> {
        match op {
            Operation::Start => self.start(name).await,
            Operation::Halt => self.halt(name).await,
            Operation::Kill => self.kill(name).await,
            Operation::Freeze => self.freeze(name).await,
            Operation::Unfreeze => self.unfreeze(name).await,
            Operation::Destroy => self.destroy(name).await,
            Operation::ToggleAutostart => self.toggle_autostart(name).await.map(drop),
            Operation::Archive => self.archive(name).await.map(drop),
            Operation::Unarchive => self.unarchive(name).await,
        }
    }

    /// STOPPED → RUNNING; already running is not an error
    pub async fn start(&self, name: &str) -> Result<()> {
        let handle = self.guarded(name).await?;

        if self.current_state(&handle).await? == ContainerState::Running {
            log::info!("{} is already running", name);
            return Ok(());
        }

        log::info!("Starting {}", name);
        self.runtime
            .start(&handle)
            .await
            .map_err(|e| LlxcError::runtime(name, "start", e))?;
        log::info!("Started {}", name);
        Ok(())
    }

    /// RUNNING → STOPPED through the container's own shutdown
    pub async fn halt(&self, name: &str) -> Result<()> {
        let handle = self.guarded(name).await?;

        if self.current_state(&handle).await? == ContainerState::Stopped {
            log::info!("{} is already stopped", name);
            return Ok(());
        }

        log::info!("Stopping {}", name);
        self.runtime
            .stop(&handle)
            .await
            .map_err(|e| LlxcError::runtime(name, "stop", e))?;
        log::info!("Stopped {}", name);
        Ok(())
    }

    /// RUNNING/FROZEN → STOPPED without asking the container
    pub async fn kill(&self, name: &str) -> Result<()> {
        let handle = self.guarded(name).await?;

        if self.current_state(&handle).await? == ContainerState::Stopped {
            log::info!("{} is already stopped", name);
            return Ok(());
        }

        self.force_stop(&handle).await
    }

    async fn force_stop(&self, handle: &ContainerHandle) -> Result<()> {
        log::info!("Killing {}", handle.name);
        self.runtime
            .kill(handle)
            .await
            .map_err(|e| LlxcError::runtime(&handle.name, "kill", e))?;
        log::info!("Killed {}", handle.name);
        Ok(())
    }

    /// RUNNING → FROZEN
    pub async fn freeze(&self, name: &str) -> Result<()> {
        let handle = self.guarded(name).await?;
        self.require_state(&handle, ContainerState::Running).await?;

        log::info!("Freezing {}", name);
        self.runtime
            .freeze(&handle)
            .await
            .map_err(|e| LlxcError::runtime(name, "freeze", e))?;
        log::info!("Froze {}", name);
        Ok(())
    }

    /// FROZEN → RUNNING
    pub async fn unfreeze(&self, name: &str) -> Result<()> {
        let handle = self.guarded(name).await?;
        self.require_state(&handle, ContainerState::Frozen).await?;

        log::info!("Unfreezing {}", name);
        self.runtime
            .unfreeze(&handle)
            .await
            .map_err(|e| LlxcError::runtime(name, "unfreeze", e))?;
        log::info!("Unfroze {}", name);
        Ok(())
    }

    async fn require_state(
        &self,
        handle: &ContainerHandle,
        required: ContainerState,
    ) -> Result<()> {
        let actual = self.current_state(handle).await?;
        if actual != required {
            return Err(LlxcError::InvalidState {
                name: handle.name.clone(),
                required,
                actual,
            });
        }
        Ok(())
    }

    /// Create from the configured template, enable autostart, install the
    /// host SSH key, and start
    pub async fn create(&self, name: &str) -> Result<()> {
        self.validator.require_privilege()?;
        validate_name(name)?;

        if self.resolver.path_of(name).exists() {
            return Err(LlxcError::AlreadyExists(name.to_string()));
        }
        if self.archive_path(name).exists() {
            return Err(LlxcError::AlreadyExists(format!("{} (archived)", name)));
        }

        let handle = self.resolver.resolve(name).await?;
        log::info!("Creating {} from template {}", name, self.config.template);
        self.runtime
            .create(&handle, &self.config.template)
            .await
            .map_err(|e| LlxcError::runtime(name, "create", e))?;

        // The runtime has written a config now; pick up its rootfs
        let handle = self.resolver.resolve(name).await?;

        self.enable_autostart(&handle)?;

        if self.keys.exists() {
            self.install_key(&handle)?;
        } else {
            log::warn!(
                "No host SSH keypair in {}; run gensshkeys and distkeys to provision {}",
                self.config.ssh_dir.display(),
                name
            );
        }

        self.start(name).await
    }

    /// Remove a container for good
    ///
    /// A running or frozen container gets `destroy_grace` to settle before it
    /// is killed.
    pub async fn destroy(&self, name: &str) -> Result<()> {
        let handle = self.guarded(name).await?;

        let state = self.current_state(&handle).await?;
        if state.has_init() {
            log::warn!(
                "{} is {}, forcing stop in {:?}",
                name,
                state,
                self.config.destroy_grace
            );
            tokio::time::sleep(self.config.destroy_grace).await;
            self.force_stop(&handle).await?;
        }

        log::info!("Destroying {}", name);
        self.runtime
            .destroy(&handle)
            .await
            .map_err(|e| LlxcError::runtime(name, "destroy", e))?;

        // A marker pointing at nothing would fail at next boot
        self.disable_autostart(name)?;
        log::info!("Destroyed {}", name);
        Ok(())
    }

    /// Copy `source` into a new, independent container `target`
    pub async fn clone_container(&self, source: &str, target: &str) -> Result<()> {
        let source_handle = self.guarded(source).await?;
        validate_name(target)?;

        if self.resolver.path_of(target).exists() {
            return Err(LlxcError::AlreadyExists(target.to_string()));
        }
        if self.archive_path(target).exists() {
            return Err(LlxcError::AlreadyExists(format!("{} (archived)", target)));
        }

        let target_handle = self.resolver.resolve(target).await?;
        log::info!("Cloning {} to {}", source, target);
        self.runtime
            .clone_container(&source_handle, &target_handle)
            .await
            .map_err(|e| LlxcError::runtime(source, "clone", e))?;
        log::info!("Cloned {} to {}", source, target);
        Ok(())
    }
}
