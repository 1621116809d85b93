//! Host SSH keypair and sessions into containers
//!
//! One keypair per host lives in the SSH directory; its public half is
//! appended to `root/.ssh/authorized_keys` inside each container's rootfs.

use std::io::{self, Write};
use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};

use tokio::process::Command;

const KEY_NAME: &str = "id_rsa";

/// Location of the host keypair
#[derive(Debug, Clone)]
pub struct SshKeys {
    dir: PathBuf,
}

impl SshKeys {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn private_key(&self) -> PathBuf {
        self.dir.join(KEY_NAME)
    }

    pub fn public_key(&self) -> PathBuf {
        self.dir.join(format!("{}.pub", KEY_NAME))
    }

    /// Both halves are present
    pub fn exists(&self) -> bool {
        self.private_key().exists() && self.public_key().exists()
    }

    /// Public key material, trimmed to a single line
    pub fn read_public(&self) -> io::Result<String> {
        let content = std::fs::read_to_string(self.public_key())?;
        Ok(content.trim().to_string())
    }

    /// Run ssh-keygen; any existing pair must already be gone
    pub async fn generate(&self) -> io::Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        std::fs::set_permissions(&self.dir, std::fs::Permissions::from_mode(0o700))?;

        let status = Command::new("ssh-keygen")
            .args(["-t", "rsa", "-b", "4096", "-N", "", "-q", "-C", "llxc"])
            .arg("-f")
            .arg(self.private_key())
            .stdin(Stdio::null())
            .status()
            .await?;

        if !status.success() {
            return Err(io::Error::new(
                io::ErrorKind::Other,
                format!("ssh-keygen exited with {}", status),
            ));
        }
        Ok(())
    }

    /// Remove both halves (for forced regeneration)
    pub fn remove(&self) -> io::Result<()> {
        for path in [self.private_key(), self.public_key()] {
            match std::fs::remove_file(&path) {
                Ok(()) => {}
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }
}

/// Ensure `key` is listed in `<rootfs>/root/.ssh/authorized_keys`
///
/// Returns `true` if the key was appended, `false` if it was already there.
pub fn authorize_key(rootfs: &Path, key: &str) -> io::Result<bool> {
    let ssh_dir = rootfs.join("root/.ssh");
    std::fs::create_dir_all(&ssh_dir)?;
    std::fs::set_permissions(&ssh_dir, std::fs::Permissions::from_mode(0o700))?;

    let authorized = ssh_dir.join("authorized_keys");
    let existing = match std::fs::read_to_string(&authorized) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => String::new(),
        Err(e) => return Err(e),
    };

    if existing.contains(key) {
        return Ok(false);
    }

    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .mode(0o600)
        .open(&authorized)?;
    if !existing.is_empty() && !existing.ends_with('\n') {
        file.write_all(b"\n")?;
    }
    writeln!(file, "{}", key)?;
    std::fs::set_permissions(&authorized, std::fs::Permissions::from_mode(0o600))?;
    Ok(true)
}

/// Open an SSH session to `root@<name>` with the host key
///
/// With `command` empty the session is interactive. Returns the remote exit
/// status.
pub async fn session(keys: &SshKeys, name: &str, command: &[String]) -> io::Result<ExitStatus> {
    let mut cmd = Command::new("ssh");
    cmd.arg("-i")
        .arg(keys.private_key())
        .args(["-o", "StrictHostKeyChecking=no", "-o", "UserKnownHostsFile=/dev/null"])
        .arg(format!("root@{}", name));

    if !command.is_empty() {
        let remote = shlex::try_join(command.iter().map(String::as_str)).map_err(|e| {
            io::Error::new(io::ErrorKind::InvalidInput, e.to_string())
        })?;
        cmd.arg(remote);
    }

    log::debug!("Opening SSH session to {}", name);
    cmd.status().await
}
