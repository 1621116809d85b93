//! Control-group accounting reads
//!
//! LXC places containers differently depending on the cgroup layout:
//!
//! /sys/fs/cgroup/
//! ├── cpuset/lxc/web1/tasks                 # v1, per-controller mounts
//! ├── memory/lxc/web1/memory.usage_in_bytes
//! ├── lxc/web1/tasks                        # v1, named hierarchy
//! └── lxc.payload.web1/                     # v2 unified (LXC 4+)
//!     ├── cgroup.procs
//!     └── memory.current
//!
//! Every file may be absent (stopped container, controller not mounted). Each
//! read returns `None` for that case instead of failing.

use std::io;
use std::path::{Path, PathBuf};

pub struct CgroupReader {
    root: PathBuf,
}

impl CgroupReader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn task_files(&self, name: &str) -> [PathBuf; 3] {
        [
            self.root.join("cpuset/lxc").join(name).join("tasks"),
            self.root.join("lxc").join(name).join("tasks"),
            self.root.join(format!("lxc.payload.{}", name)).join("cgroup.procs"),
        ]
    }

    fn memory_files(&self, name: &str) -> [PathBuf; 2] {
        [
            self.root
                .join("memory/lxc")
                .join(name)
                .join("memory.usage_in_bytes"),
            self.root
                .join(format!("lxc.payload.{}", name))
                .join("memory.current"),
        ]
    }

    /// Number of tasks in the container's cgroup, `None` if no task file exists
    pub async fn task_count(&self, name: &str) -> Option<usize> {
        for file in self.task_files(name) {
            if let Some(content) = read_optional(&file).await {
                return Some(content.lines().filter(|l| !l.trim().is_empty()).count());
            }
        }
        log::debug!("No task accounting file for {}", name);
        None
    }

    /// Memory usage in bytes, `None` if no usage file is readable
    pub async fn memory_usage(&self, name: &str) -> Option<u64> {
        for file in self.memory_files(name) {
            let Some(content) = read_optional(&file).await else {
                continue;
            };
            match content.trim().parse() {
                Ok(bytes) => return Some(bytes),
                Err(e) => {
                    log::debug!("Unparseable {}: {}", file.display(), e);
                }
            }
        }
        None
    }
}

/// Read an accounting file that is allowed to be missing
///
/// Missing files are expected; other errors (EACCES, EIO) are logged so they
/// stay visible but still do not fail the caller.
async fn read_optional(path: &Path) -> Option<String> {
    match tokio::fs::read_to_string(path).await {
        Ok(content) => Some(content),
        Err(e) if e.kind() == io::ErrorKind::NotFound => None,
        Err(e) => {
            log::debug!("Failed to read {}: {}", path.display(), e);
            None
        }
    }
}
