//! Container state machine
//!
//! ```text
//!                  start
//!     ┌─────────┐ ──────▶ ┌─────────┐  freeze   ┌────────┐
//!     │ STOPPED │         │ RUNNING │ ────────▶ │ FROZEN │
//!     └─────────┘ ◀────── └─────────┘ ◀──────── └────────┘
//!       ▲    │   halt/kill            unfreeze      │
//!       │    │ archive                     kill     │
//!       │    ▼                                      │
//!     ┌──────────┐                                  │
//!     │ ARCHIVED │        STOPPED ◀─────────────────┘
//!     └──────────┘
//!        unarchive → STOPPED
//! ```
//!
//! ARCHIVED is host-side bookkeeping; the runtime never reports it. The
//! transitional states are passed through from the runtime as-is.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ContainerState {
    Stopped,
    Starting,
    Running,
    Stopping,
    Aborting,
    Freezing,
    Frozen,
    Thawed,
    Archived,
}

impl ContainerState {
    /// Canonical upper-case name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Stopped => "STOPPED",
            Self::Starting => "STARTING",
            Self::Running => "RUNNING",
            Self::Stopping => "STOPPING",
            Self::Aborting => "ABORTING",
            Self::Freezing => "FREEZING",
            Self::Frozen => "FROZEN",
            Self::Thawed => "THAWED",
            Self::Archived => "ARCHIVED",
        }
    }

    /// The container has an init process (RUNNING or FROZEN)
    pub fn has_init(&self) -> bool {
        matches!(self, Self::Running | Self::Frozen)
    }
}

impl std::fmt::Display for ContainerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown container state: {0}")]
pub struct UnknownState(pub String);

impl std::str::FromStr for ContainerState {
    type Err = UnknownState;

    /// Runtimes disagree on case ("RUNNING", "running"); normalize first
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "STOPPED" => Ok(Self::Stopped),
            "STARTING" => Ok(Self::Starting),
            "RUNNING" => Ok(Self::Running),
            "STOPPING" => Ok(Self::Stopping),
            "ABORTING" => Ok(Self::Aborting),
            "FREEZING" => Ok(Self::Freezing),
            "FROZEN" => Ok(Self::Frozen),
            "THAWED" => Ok(Self::Thawed),
            "ARCHIVED" => Ok(Self::Archived),
            _ => Err(UnknownState(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_normalizes_case() {
        assert_eq!("running".parse::<ContainerState>().unwrap(), ContainerState::Running);
        assert_eq!(" FROZEN\n".parse::<ContainerState>().unwrap(), ContainerState::Frozen);
        assert_eq!("Stopped".parse::<ContainerState>().unwrap(), ContainerState::Stopped);
        assert!("sleeping".parse::<ContainerState>().is_err());
    }

    #[test]
    fn test_as_str_roundtrips() {
        for state in [
            ContainerState::Stopped,
            ContainerState::Running,
            ContainerState::Frozen,
            ContainerState::Thawed,
            ContainerState::Archived,
        ] {
            assert_eq!(state.as_str().parse::<ContainerState>().unwrap(), state);
        }
    }

    #[test]
    fn test_has_init() {
        assert!(ContainerState::Running.has_init());
        assert!(ContainerState::Frozen.has_init());
        assert!(!ContainerState::Stopped.has_init());
        assert!(!ContainerState::Starting.has_init());
    }
}
