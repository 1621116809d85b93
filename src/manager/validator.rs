//! Privilege and existence preconditions
//!
//! Nothing is cached: privilege and the container tree can change between two
//! iterations of a bulk loop.

use std::path::PathBuf;

use crate::error::{LlxcError, Result};

/// Where the privilege answer comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Privilege {
    /// Effective uid of this process must be 0
    EffectiveUid,
    /// Fixed answer, for embedding and tests
    Assume(bool),
}

#[derive(Debug, Clone)]
pub struct Validator {
    container_root: PathBuf,
    privilege: Privilege,
}

impl Validator {
    pub fn new(container_root: impl Into<PathBuf>, privilege: Privilege) -> Self {
        Self {
            container_root: container_root.into(),
            privilege,
        }
    }

    /// Fail unless running as the privileged host user
    pub fn require_privilege(&self) -> Result<()> {
        let privileged = match self.privilege {
            Privilege::EffectiveUid => nix::unistd::geteuid().is_root(),
            Privilege::Assume(p) => p,
        };
        if privileged {
            Ok(())
        } else {
            Err(LlxcError::PermissionDenied)
        }
    }

    /// Fail unless a name was given and that container is live
    pub fn require_exists<'a>(&self, name: Option<&'a str>) -> Result<&'a str> {
        let name = require_name(name)?;

        if self.container_root.join(name).exists() {
            Ok(name)
        } else {
            Err(LlxcError::NotFound(name.to_string()))
        }
    }
}

/// Fail unless a usable container name was given
///
/// A missing name is an `InvalidArgument`, which exits like a missing
/// container.
pub fn require_name(name: Option<&str>) -> Result<&str> {
    let name = match name {
        Some(n) if !n.is_empty() => n,
        _ => {
            return Err(LlxcError::InvalidArgument(
                "you must specify a container".to_string(),
            ))
        }
    };
    super::resolver::validate_name(name)?;
    Ok(name)
}
