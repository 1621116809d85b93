//! Cold storage: live container ⇄ `<archive_dir>/<name>.tar.gz`
//!
//! Archive writes `<name>.tar.gz.part` and renames it into place before the
//! live tree is touched. Unarchive unpacks into a staging directory inside the
//! container root and renames the result into place. Either way a failure
//! leaves the previous representation intact.

use std::fs::File;
use std::io::{self, BufReader, BufWriter};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use serde::Serialize;

use super::{ContainerState, Manager};
use crate::error::{LlxcError, Result};
use crate::runtime::Runtime;

const ARCHIVE_SUFFIX: &str = ".tar.gz";

#[derive(Debug, Clone, Serialize)]
pub struct ArchiveEntry {
    pub name: String,
    pub path: PathBuf,
    pub size_bytes: u64,
    pub created: DateTime<Local>,
}

impl ArchiveEntry {
    fn from_path(path: &Path) -> io::Result<Option<Self>> {
        let Some(name) = path
            .file_name()
            .and_then(|n| n.to_str())
            .and_then(|n| n.strip_suffix(ARCHIVE_SUFFIX))
        else {
            return Ok(None);
        };

        let metadata = std::fs::metadata(path)?;
        if !metadata.is_file() {
            return Ok(None);
        }
        // Not every filesystem records birth time
        let created = metadata.created().or_else(|_| metadata.modified())?;

        Ok(Some(Self {
            name: name.to_string(),
            path: path.to_path_buf(),
            size_bytes: metadata.len(),
            created: DateTime::<Local>::from(created),
        }))
    }
}

impl<R: Runtime> Manager<R> {
    /// Where the archive entry for `name` lives
    pub fn archive_path(&self, name: &str) -> PathBuf {
        self.config
            .archive_dir
            .join(format!("{}{}", name, ARCHIVE_SUFFIX))
    }

    /// Halt, serialize, then remove a live container
    pub async fn archive(&self, name: &str) -> Result<ArchiveEntry> {
        let handle = self.guarded(name).await?;

        // The tarball holds only the container directory
        if !handle.rootfs.starts_with(&handle.path) {
            return Err(LlxcError::OperationFailed {
                name: name.to_string(),
                op: "archive",
                reason: format!(
                    "root filesystem {} is outside {}",
                    handle.rootfs.display(),
                    handle.path.display()
                ),
            });
        }

        if self.current_state(&handle).await? != ContainerState::Stopped {
            log::info!("Halting {} before archiving", name);
            self.force_stop(&handle).await?;
        }

        let archive_dir = &self.config.archive_dir;
        std::fs::create_dir_all(archive_dir).map_err(|e| LlxcError::io(archive_dir, e))?;

        let final_path = self.archive_path(name);
        let partial_path = archive_dir.join(format!("{}{}.part", name, ARCHIVE_SUFFIX));

        log::info!("Archiving {} to {}", name, final_path.display());
        let source = handle.path.clone();
        let entry_name = name.to_string();
        let partial = partial_path.clone();
        let written = tokio::task::spawn_blocking(move || {
            let result = write_archive(&source, &entry_name, &partial);
            if result.is_err() {
                let _ = std::fs::remove_file(&partial);
            }
            result
        })
        .await
        .map_err(|e| LlxcError::OperationFailed {
            name: name.to_string(),
            op: "archive",
            reason: e.to_string(),
        })?;
        written.map_err(|e| LlxcError::io(&partial_path, e))?;

        std::fs::rename(&partial_path, &final_path).map_err(|e| {
            let _ = std::fs::remove_file(&partial_path);
            LlxcError::io(&final_path, e)
        })?;

        // Archive is durable from here on; retire the live copy or take the
        // archive back so the container is never both live and archived
        let marker = match self.disable_autostart(name) {
            Ok(marker) => marker,
            Err(e) => {
                discard_archive(&final_path);
                return Err(e);
            }
        };

        let retired = self
            .resolver
            .container_root()
            .join(format!(".llxc-archive-{}", name));
        if let Err(e) = retire_live_tree(&handle.path, &retired) {
            discard_archive(&final_path);
            if marker.is_some() {
                if let Err(e) = self.enable_autostart(&handle) {
                    log::warn!("Failed to restore autostart for {}: {}", name, e);
                }
            }
            return Err(LlxcError::io(&handle.path, e));
        }
        if let Err(e) = std::fs::remove_dir_all(&retired) {
            log::warn!("Failed to remove {}: {}", retired.display(), e);
        }

        let entry = ArchiveEntry::from_path(&final_path)
            .map_err(|e| LlxcError::io(&final_path, e))?
            .ok_or_else(|| LlxcError::ArchiveNotFound(name.to_string()))?;

        log::info!("Archived {} ({} bytes)", name, entry.size_bytes);
        Ok(entry)
    }

    /// Restore an archived container to the live tree
    ///
    /// The archive entry is kept, the container is left stopped, and
    /// autostart is not re-enabled.
    pub async fn unarchive(&self, name: &str) -> Result<()> {
        self.validator.require_privilege()?;
        super::validate_name(name)?;

        let archive_path = self.archive_path(name);
        if !archive_path.is_file() {
            return Err(LlxcError::ArchiveNotFound(name.to_string()));
        }

        let live_path = self.resolver.path_of(name);
        if live_path.exists() {
            return Err(LlxcError::AlreadyExists(name.to_string()));
        }

        let root = self.resolver.container_root();
        std::fs::create_dir_all(root).map_err(|e| LlxcError::io(root, e))?;

        let staging = root.join(format!(".llxc-unarchive-{}", name));
        if staging.exists() {
            log::debug!("Removing stale staging directory {}", staging.display());
            std::fs::remove_dir_all(&staging).map_err(|e| LlxcError::io(&staging, e))?;
        }
        std::fs::create_dir(&staging).map_err(|e| LlxcError::io(&staging, e))?;

        log::info!("Unarchiving {} from {}", name, archive_path.display());
        let result = self
            .unpack_into_place(name, &archive_path, &staging, &live_path)
            .await;

        if let Err(e) = std::fs::remove_dir_all(&staging) {
            if e.kind() != io::ErrorKind::NotFound {
                log::warn!("Failed to remove {}: {}", staging.display(), e);
            }
        }

        result?;
        log::info!("Unarchived {}", name);
        Ok(())
    }

    async fn unpack_into_place(
        &self,
        name: &str,
        archive_path: &Path,
        staging: &Path,
        live_path: &Path,
    ) -> Result<()> {
        let archive = archive_path.to_path_buf();
        let dest = staging.to_path_buf();
        tokio::task::spawn_blocking(move || extract_archive(&archive, &dest))
            .await
            .map_err(|e| LlxcError::OperationFailed {
                name: name.to_string(),
                op: "unarchive",
                reason: e.to_string(),
            })?
            .map_err(|e| LlxcError::io(archive_path, e))?;

        let unpacked = staging.join(name);
        if !unpacked.is_dir() {
            return Err(LlxcError::OperationFailed {
                name: name.to_string(),
                op: "unarchive",
                reason: format!("{} holds no {}/ directory", archive_path.display(), name),
            });
        }

        std::fs::rename(&unpacked, live_path).map_err(|e| LlxcError::io(live_path, e))
    }

    /// Archive entries sorted by name; a missing directory is an empty listing
    pub fn list_archived(&self) -> Vec<ArchiveEntry> {
        let dir = &self.config.archive_dir;
        let entries = match std::fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) => {
                log::warn!("Cannot read archive directory {}: {}", dir.display(), e);
                return Vec::new();
            }
        };

        let mut archived: Vec<ArchiveEntry> = entries
            .flatten()
            .filter_map(|entry| match ArchiveEntry::from_path(&entry.path()) {
                Ok(found) => found,
                Err(e) => {
                    log::debug!("Skipping {}: {}", entry.path().display(), e);
                    None
                }
            })
            .collect();

        archived.sort_by(|a, b| a.name.cmp(&b.name));
        archived
    }
}

/// Move the live tree out of the live set in one rename
fn retire_live_tree(live: &Path, retired: &Path) -> io::Result<()> {
    if retired.exists() {
        log::debug!("Removing stale {}", retired.display());
        std::fs::remove_dir_all(retired)?;
    }
    std::fs::rename(live, retired)
}

fn discard_archive(path: &Path) {
    if let Err(e) = std::fs::remove_file(path) {
        log::warn!("Failed to remove {}: {}", path.display(), e);
    }
}

/// Tar `source` under the top-level entry `name` into a gzip file at `dest`
fn write_archive(source: &Path, name: &str, dest: &Path) -> io::Result<()> {
    let file = File::create(dest)?;
    let encoder = GzEncoder::new(BufWriter::new(file), Compression::default());

    let mut builder = tar::Builder::new(encoder);
    // Container roots are full of absolute symlinks into themselves
    builder.follow_symlinks(false);
    builder.mode(tar::HeaderMode::Complete);
    builder.append_dir_all(name, source)?;

    let encoder = builder.into_inner()?;
    let writer = encoder.finish()?;
    let file = writer.into_inner().map_err(|e| e.into_error())?;
    file.sync_all()
}

/// Unpack a gzip tarball into `dest`, keeping modes and owners
fn extract_archive(archive: &Path, dest: &Path) -> io::Result<()> {
    let decoder = GzDecoder::new(BufReader::new(File::open(archive)?));
    let mut tarball = tar::Archive::new(decoder);
    tarball.set_preserve_permissions(true);
    tarball.set_preserve_ownerships(true);
    tarball.unpack(dest)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_then_extract() {
        let base = std::env::temp_dir().join(format!("llxc-archive-unit-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&base);
        let source = base.join("src");
        std::fs::create_dir_all(source.join("rootfs/etc")).unwrap();
        std::fs::write(source.join("config"), "lxc.uts.name = web1\n").unwrap();
        std::fs::write(source.join("rootfs/etc/hostname"), "web1\n").unwrap();
        std::os::unix::fs::symlink("/etc/hostname", source.join("rootfs/hostname-link")).unwrap();

        let tarball = base.join("web1.tar.gz");
        write_archive(&source, "web1", &tarball).unwrap();

        let out = base.join("out");
        std::fs::create_dir_all(&out).unwrap();
        extract_archive(&tarball, &out).unwrap();

        assert_eq!(
            std::fs::read_to_string(out.join("web1/rootfs/etc/hostname")).unwrap(),
            "web1\n"
        );
        // Symlinks survive as symlinks, not as copies of their target
        assert_eq!(
            std::fs::read_link(out.join("web1/rootfs/hostname-link")).unwrap(),
            PathBuf::from("/etc/hostname")
        );

        std::fs::remove_dir_all(&base).unwrap();
    }

    #[test]
    fn test_entry_ignores_partial_files() {
        let base = std::env::temp_dir().join(format!("llxc-archive-entry-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&base);
        std::fs::create_dir_all(&base).unwrap();
        std::fs::write(base.join("web1.tar.gz.part"), b"x").unwrap();
        std::fs::write(base.join("web1.tar.gz"), b"xyz").unwrap();

        assert!(ArchiveEntry::from_path(&base.join("web1.tar.gz.part"))
            .unwrap()
            .is_none());
        let entry = ArchiveEntry::from_path(&base.join("web1.tar.gz")).unwrap().unwrap();
        assert_eq!(entry.name, "web1");
        assert_eq!(entry.size_bytes, 3);

        std::fs::remove_dir_all(&base).unwrap();
    }
}
