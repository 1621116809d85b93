//! Autostart marker handling
//!
//! A container starts at host boot when `<autostart_dir>/<name>` exists as a
//! symlink to its live directory. The link is the only record; a dangling link
//! still counts as enabled.

use std::path::PathBuf;

use super::{ContainerHandle, Manager};
use crate::error::{LlxcError, Result};
use crate::runtime::Runtime;

impl<R: Runtime> Manager<R> {
    fn marker_path(&self, name: &str) -> PathBuf {
        self.config.autostart_dir.join(name)
    }

    /// Whether a marker exists for `name`
    pub fn is_autostart(&self, name: &str) -> bool {
        let link_path = self.marker_path(name);
        link_path.exists() || link_path.is_symlink()
    }

    /// Flip the marker; returns whether autostart is now enabled
    pub async fn toggle_autostart(&self, name: &str) -> Result<bool> {
        let handle = self.guarded(name).await?;

        if self.is_autostart(name) {
            log::info!("{} was set to autostart on boot, disabling", name);
            self.disable_autostart(name)?;
            Ok(false)
        } else {
            log::info!("{} was not set to autostart on boot, enabling", name);
            self.enable_autostart(&handle)?;
            Ok(true)
        }
    }

    /// Create the marker (replacing a stale one)
    pub(super) fn enable_autostart(&self, handle: &ContainerHandle) -> Result<PathBuf> {
        let dir = &self.config.autostart_dir;
        std::fs::create_dir_all(dir).map_err(|e| LlxcError::io(dir, e))?;

        let link_path = self.marker_path(&handle.name);
        if link_path.exists() || link_path.is_symlink() {
            std::fs::remove_file(&link_path).map_err(|e| LlxcError::io(&link_path, e))?;
        }

        std::os::unix::fs::symlink(&handle.path, &link_path)
            .map_err(|e| LlxcError::io(&link_path, e))?;

        log::debug!("Linked {} -> {}", link_path.display(), handle.path.display());
        Ok(link_path)
    }

    /// Remove the marker if present
    pub(super) fn disable_autostart(&self, name: &str) -> Result<Option<PathBuf>> {
        let link_path = self.marker_path(name);

        if link_path.exists() || link_path.is_symlink() {
            std::fs::remove_file(&link_path).map_err(|e| LlxcError::io(&link_path, e))?;
            log::debug!("Removed {}", link_path.display());
            Ok(Some(link_path))
        } else {
            Ok(None)
        }
    }
}
