//! `lxc-*` command-line runtime

use std::net::IpAddr;
use std::path::PathBuf;
use std::process::Stdio;

use tokio::process::Command;

use super::{Runtime, RuntimeError};
use crate::config::IpFamily;
use crate::manager::{ContainerHandle, ContainerState};

/// Runtime backed by the LXC userspace tools
pub struct LxcRuntime {
    /// Passed as `-P` so the tools and llxc agree on the container root
    lxcpath: PathBuf,
}

impl LxcRuntime {
    pub fn new(lxcpath: impl Into<PathBuf>) -> Self {
        Self {
            lxcpath: lxcpath.into(),
        }
    }

    /// Run an lxc tool against one container and return its stdout
    async fn run(
        &self,
        tool: &str,
        container: &ContainerHandle,
        args: &[&str],
    ) -> Result<String, RuntimeError> {
        let mut cmd = Command::new(tool);
        cmd.arg("-P")
            .arg(&self.lxcpath)
            .arg("-n")
            .arg(&container.name)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            // Dropped by the address probe timeout
            .kill_on_drop(true);

        log::debug!("Running {} -n {} {}", tool, container.name, args.join(" "));

        let output = cmd.output().await.map_err(|e| RuntimeError::Spawn {
            command: tool.to_string(),
            source: e,
        })?;

        if !output.status.success() {
            return Err(RuntimeError::Exited {
                command: tool.to_string(),
                code: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl Runtime for LxcRuntime {
    async fn state(&self, container: &ContainerHandle) -> Result<ContainerState, RuntimeError> {
        let out = self.run("lxc-info", container, &["-s", "-H"]).await?;
        out.trim().parse().map_err(|_| RuntimeError::Output {
            command: "lxc-info".to_string(),
            output: out.trim().to_string(),
        })
    }

    async fn start(&self, container: &ContainerHandle) -> Result<(), RuntimeError> {
        self.run("lxc-start", container, &["-d"]).await.map(drop)
    }

    async fn stop(&self, container: &ContainerHandle) -> Result<(), RuntimeError> {
        self.run("lxc-stop", container, &[]).await.map(drop)
    }

    async fn kill(&self, container: &ContainerHandle) -> Result<(), RuntimeError> {
        self.run("lxc-stop", container, &["-k"]).await.map(drop)
    }

    async fn freeze(&self, container: &ContainerHandle) -> Result<(), RuntimeError> {
        self.run("lxc-freeze", container, &[]).await.map(drop)
    }

    async fn unfreeze(&self, container: &ContainerHandle) -> Result<(), RuntimeError> {
        self.run("lxc-unfreeze", container, &[]).await.map(drop)
    }

    async fn create(&self, container: &ContainerHandle, template: &str) -> Result<(), RuntimeError> {
        self.run("lxc-create", container, &["-t", template]).await.map(drop)
    }

    async fn destroy(&self, container: &ContainerHandle) -> Result<(), RuntimeError> {
        self.run("lxc-destroy", container, &[]).await.map(drop)
    }

    async fn clone_container(
        &self,
        source: &ContainerHandle,
        target: &ContainerHandle,
    ) -> Result<(), RuntimeError> {
        self.run("lxc-copy", source, &["-N", target.name.as_str()])
            .await
            .map(drop)
    }

    async fn init_pid(&self, container: &ContainerHandle) -> Result<Option<u32>, RuntimeError> {
        let out = self.run("lxc-info", container, &["-p", "-H"]).await?;
        Ok(out.trim().parse().ok())
    }

    async fn addresses(
        &self,
        container: &ContainerHandle,
        family: IpFamily,
        interface: &str,
    ) -> Result<Vec<IpAddr>, RuntimeError> {
        let flag = match family {
            IpFamily::Ipv4 => "-4",
            IpFamily::Ipv6 => "-6",
        };
        let out = self
            .run(
                "lxc-attach",
                container,
                &["--", "ip", "-o", flag, "addr", "show", "dev", interface],
            )
            .await?;
        Ok(parse_ip_addr_output(&out))
    }
}

/// Pull addresses out of `ip -o addr show` lines
///
/// `2: eth0    inet 10.0.3.15/24 brd 10.0.3.255 scope global eth0`
fn parse_ip_addr_output(output: &str) -> Vec<IpAddr> {
    output
        .lines()
        .filter_map(|line| {
            let mut words = line.split_whitespace();
            words.find(|w| *w == "inet" || *w == "inet6")?;
            let cidr = words.next()?;
            let addr = cidr.split('/').next()?;
            addr.parse().ok()
        })
        .collect()
}
