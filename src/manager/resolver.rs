//! Container name → handle and host paths

use std::path::{Path, PathBuf};

use crate::config::parser;
use crate::error::{LlxcError, Result};

/// Everything the engine needs to address one container
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerHandle {
    pub name: String,
    /// `<container_root>/<name>`
    pub path: PathBuf,
    /// `<container_root>/<name>/config`
    pub config_path: PathBuf,
    /// Root filesystem, from `lxc.rootfs.path` or `<path>/rootfs`
    pub rootfs: PathBuf,
}

/// Maps names to handles under a fixed container root
#[derive(Debug, Clone)]
pub struct Resolver {
    container_root: PathBuf,
}

impl Resolver {
    pub fn new(container_root: impl Into<PathBuf>) -> Self {
        Self {
            container_root: container_root.into(),
        }
    }

    pub fn container_root(&self) -> &Path {
        &self.container_root
    }

    /// Host path of a container, without checking that it exists
    pub fn path_of(&self, name: &str) -> PathBuf {
        self.container_root.join(name)
    }

    /// Resolve a name to a handle
    ///
    /// Fails only for names that cannot be a directory entry; existence is
    /// the validator's job.
    pub async fn resolve(&self, name: &str) -> Result<ContainerHandle> {
        validate_name(name)?;

        let path = self.path_of(name);
        let config_path = path.join("config");
        let rootfs = match parser::parse_pairs_file(&config_path).await {
            Ok(pairs) => rootfs_from_config(&pairs),
            Err(e) => {
                log::debug!("No readable config for {}: {}", name, e);
                None
            }
        }
        .unwrap_or_else(|| path.join("rootfs"));

        Ok(ContainerHandle {
            name: name.to_string(),
            path,
            config_path,
            rootfs,
        })
    }

    /// Names of all live containers (directories holding a `config`), sorted
    pub fn live_names(&self) -> Vec<String> {
        let pattern = self.container_root.join("*").join("config");
        let Some(pattern) = pattern.to_str() else {
            log::warn!(
                "Container root {} is not valid UTF-8",
                self.container_root.display()
            );
            return Vec::new();
        };

        let entries = match glob::glob(pattern) {
            Ok(entries) => entries,
            Err(e) => {
                log::warn!("Bad container glob {}: {}", pattern, e);
                return Vec::new();
            }
        };

        let mut names: Vec<String> = entries
            .flatten()
            .filter_map(|config| {
                config
                    .parent()
                    .and_then(|dir| dir.file_name())
                    .and_then(|n| n.to_str())
                    .map(str::to_string)
            })
            .filter(|name| validate_name(name).is_ok())
            .collect();

        names.sort();
        names
    }
}

/// Container names must be a single plain path component
pub fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(LlxcError::InvalidArgument(
            "you must specify a container".to_string(),
        ));
    }
    if name.contains('/') || name.contains('\0') || name.starts_with('.') {
        return Err(LlxcError::InvalidArgument(format!(
            "invalid container name: {:?}",
            name
        )));
    }
    Ok(())
}

/// Root filesystem from `lxc.rootfs.path` (LXC 3+) or `lxc.rootfs` (legacy)
fn rootfs_from_config(pairs: &[(String, String)]) -> Option<PathBuf> {
    pairs
        .iter()
        .rev()
        .find(|(k, _)| k == "lxc.rootfs.path" || k == "lxc.rootfs")
        .map(|(_, v)| {
            // Only plain directory backends map to a host path
            let v = v.strip_prefix("dir:").unwrap_or(v);
            PathBuf::from(v)
        })
        .filter(|p| p.is_absolute())
}
