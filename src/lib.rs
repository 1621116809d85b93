//! llxc - LXC container lifecycle management
//!
//! Drives containers on a single host through their lifecycle:
//! - create, start, halt, kill, freeze, unfreeze, destroy, clone
//! - cold storage (archive/unarchive to compressed tarballs)
//! - fleet-wide start/halt/kill filtered by current state
//! - SSH trust provisioning into container filesystems
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────┐
//! │                    llxc (CLI)                     │
//! ├──────────────────────────────────────────────────┤
//! │  Bulk  │  Archive  │  Lifecycle  │  Report │ SSH  │
//! ├──────────────────────────────────────────────────┤
//! │        Resolver        │        Validator         │
//! ├──────────────────────────────────────────────────┤
//! │     Runtime (lxc-*)    │   cgroup accounting      │
//! └──────────────────────────────────────────────────┘
//! ```

pub mod cgroups;
pub mod config;
pub mod error;
pub mod manager;
pub mod runtime;
pub mod ssh;

pub use config::Config;
pub use error::{LlxcError, Result};
pub use manager::{ContainerState, Manager, Operation};
