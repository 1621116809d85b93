//! llxc configuration
//!
//! Every path and timing the engine uses lives here. Defaults match a stock
//! LXC install; `/etc/llxc/llxc.conf` (or `$LLXC_CONFIG`) overrides them:
//!
//! ```text
//! [Paths]
//! ContainerRoot=/var/lib/lxc
//! AutostartDir=/etc/lxc/auto
//! CgroupRoot=/sys/fs/cgroup
//! ArchiveDir=/var/lib/llxc/archive
//! SshDir=/var/lib/llxc/ssh
//!
//! [Lifecycle]
//! Template=ubuntu
//! DestroyGrace=1s
//!
//! [Network]
//! Interface=eth0
//! Family=ipv4
//! ProbeTimeout=100ms
//! ```

pub mod parser;

use std::path::{Path, PathBuf};
use std::time::Duration;

pub use parser::ParseError;
use parser::{last_value, parse_duration, ParsedFile};

const SYSTEM_CONFIG: &str = "/etc/llxc/llxc.conf";

/// Address family used when reporting container addresses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IpFamily {
    Ipv4,
    Ipv6,
}

impl IpFamily {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ipv4 => "ipv4",
            Self::Ipv6 => "ipv6",
        }
    }
}

impl std::str::FromStr for IpFamily {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "ipv4" | "inet" | "4" => Ok(Self::Ipv4),
            "ipv6" | "inet6" | "6" => Ok(Self::Ipv6),
            _ => Err(ParseError::InvalidValue {
                key: "Family".to_string(),
                value: s.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Live containers, one directory per container
    pub container_root: PathBuf,
    /// One symlink per container that starts at host boot
    pub autostart_dir: PathBuf,
    /// Control-group hierarchy holding per-container accounting files
    pub cgroup_root: PathBuf,
    /// Compressed archives of cold-stored containers
    pub archive_dir: PathBuf,
    /// Home of the host SSH keypair
    pub ssh_dir: PathBuf,
    /// Template passed to the runtime on create
    pub template: String,
    /// Safety margin before a running container is force-stopped for destroy
    pub destroy_grace: Duration,
    /// Upper bound on the address probe in status reports
    pub probe_timeout: Duration,
    pub interface: String,
    pub family: IpFamily,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            container_root: PathBuf::from("/var/lib/lxc"),
            autostart_dir: PathBuf::from("/etc/lxc/auto"),
            cgroup_root: PathBuf::from("/sys/fs/cgroup"),
            archive_dir: PathBuf::from("/var/lib/llxc/archive"),
            ssh_dir: PathBuf::from("/var/lib/llxc/ssh"),
            template: "ubuntu".to_string(),
            destroy_grace: Duration::from_secs(1),
            probe_timeout: Duration::from_millis(100),
            interface: "eth0".to_string(),
            family: IpFamily::Ipv4,
        }
    }
}

impl Config {
    /// Load configuration from the first config file found
    ///
    /// Search order: explicit path, `$LLXC_CONFIG`, `/etc/llxc/llxc.conf`,
    /// `$XDG_CONFIG_HOME/llxc/llxc.conf`. An explicit path must exist; the
    /// others are optional and fall back to defaults.
    pub async fn load(explicit: Option<&Path>) -> Result<Self, ParseError> {
        if let Some(path) = explicit {
            return Self::from_file(path).await;
        }

        let mut candidates = Vec::new();
        if let Some(env) = std::env::var_os("LLXC_CONFIG") {
            candidates.push(PathBuf::from(env));
        }
        candidates.push(PathBuf::from(SYSTEM_CONFIG));
        if let Some(dir) = dirs::config_dir() {
            candidates.push(dir.join("llxc/llxc.conf"));
        }

        for path in candidates {
            if path.exists() {
                return Self::from_file(&path).await;
            }
        }

        log::debug!("No llxc.conf found, using defaults");
        Ok(Self::default())
    }

    /// Load configuration from a specific file
    pub async fn from_file(path: &Path) -> Result<Self, ParseError> {
        let content = tokio::fs::read_to_string(path).await?;
        let parsed = parser::parse_file(&content)?;
        log::debug!("Loaded configuration from {}", path.display());
        Self::from_parsed(&parsed)
    }

    /// Apply parsed sections on top of the defaults
    pub fn from_parsed(parsed: &ParsedFile) -> Result<Self, ParseError> {
        let mut config = Self::default();

        if let Some(paths) = parsed.get("[Paths]") {
            let fields: [(&str, &mut PathBuf); 5] = [
                ("ContainerRoot", &mut config.container_root),
                ("AutostartDir", &mut config.autostart_dir),
                ("CgroupRoot", &mut config.cgroup_root),
                ("ArchiveDir", &mut config.archive_dir),
                ("SshDir", &mut config.ssh_dir),
            ];
            for (key, field) in fields {
                if let Some(v) = last_value(paths, key) {
                    *field = PathBuf::from(v);
                }
            }
        }

        if let Some(lifecycle) = parsed.get("[Lifecycle]") {
            if let Some(v) = last_value(lifecycle, "Template") {
                config.template = v.to_string();
            }
            if let Some(v) = last_value(lifecycle, "DestroyGrace") {
                config.destroy_grace = duration_value("DestroyGrace", v)?;
            }
        }

        if let Some(network) = parsed.get("[Network]") {
            if let Some(v) = last_value(network, "Interface") {
                config.interface = v.to_string();
            }
            if let Some(v) = last_value(network, "Family") {
                config.family = v.parse()?;
            }
            if let Some(v) = last_value(network, "ProbeTimeout") {
                config.probe_timeout = duration_value("ProbeTimeout", v)?;
            }
        }

        Ok(config)
    }

    /// Configuration rooted under a scratch directory (used by tests)
    pub fn rooted_at(base: &Path) -> Self {
        Self {
            container_root: base.join("lxc"),
            autostart_dir: base.join("auto"),
            cgroup_root: base.join("cgroup"),
            archive_dir: base.join("archive"),
            ssh_dir: base.join("ssh"),
            destroy_grace: Duration::ZERO,
            ..Self::default()
        }
    }
}

fn duration_value(key: &str, value: &str) -> Result<Duration, ParseError> {
    parse_duration(value).ok_or_else(|| ParseError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    })
}
