//! SSH trust provisioning across the fleet

use std::path::PathBuf;

use super::{BulkReport, ContainerHandle, Manager};
use crate::error::{LlxcError, Result};
use crate::runtime::Runtime;
use crate::ssh::{self, SshKeys};

impl<R: Runtime> Manager<R> {
    pub fn ssh_keys(&self) -> &SshKeys {
        &self.keys
    }

    /// Generate the host keypair
    ///
    /// Refuses to replace an existing pair unless `force` is set, since
    /// every container already trusting the old key would lose access.
    pub async fn generate_keypair(&self, force: bool) -> Result<PathBuf> {
        self.validator.require_privilege()?;

        let private = self.keys.private_key();
        if private.exists() {
            if !force {
                return Err(LlxcError::AlreadyExists(private.display().to_string()));
            }
            log::warn!(
                "Replacing {}; containers trusting the old key need distkeys again",
                private.display()
            );
            self.keys.remove().map_err(|e| LlxcError::io(&private, e))?;
        }

        log::info!("Generating host SSH keypair in {}", self.config.ssh_dir.display());
        self.keys
            .generate()
            .await
            .map_err(|e| LlxcError::OperationFailed {
                name: private.display().to_string(),
                op: "generate",
                reason: e.to_string(),
            })?;
        Ok(self.keys.public_key())
    }

    fn host_public_key(&self) -> Result<String> {
        let path = self.keys.public_key();
        match self.keys.read_public() {
            Ok(key) if !key.is_empty() => Ok(key),
            Ok(_) => Err(LlxcError::InvalidArgument(format!(
                "{} is empty",
                path.display()
            ))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(LlxcError::KeypairNotFound(path.display().to_string()))
            }
            Err(e) => Err(LlxcError::io(&path, e)),
        }
    }

    /// Authorize the host key in one container
    pub(super) fn install_key(&self, handle: &ContainerHandle) -> Result<()> {
        let key = self.host_public_key()?;
        self.authorize(handle, &key)
    }

    fn authorize(&self, handle: &ContainerHandle, key: &str) -> Result<()> {
        let appended = ssh::authorize_key(&handle.rootfs, key)
            .map_err(|e| LlxcError::io(&handle.rootfs, e))?;
        if appended {
            log::info!("Authorized host key in {}", handle.name);
        } else {
            log::debug!("{} already trusts the host key", handle.name);
        }
        Ok(())
    }

    /// Authorize the host key in every live container
    pub async fn distribute_key(&self) -> Result<BulkReport> {
        self.validator.require_privilege()?;
        let key = self.host_public_key()?;

        let mut report = BulkReport::default();
        for name in self.live_names() {
            if self.interrupt.is_triggered() {
                report.interrupted = true;
                break;
            }
            let result = match self.resolver.resolve(&name).await {
                Ok(handle) => self.authorize(&handle, &key),
                Err(e) => Err(e),
            };
            report.record(&name, result);
        }
        Ok(report)
    }
}
