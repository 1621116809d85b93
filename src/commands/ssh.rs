//! SSH keypair, key distribution, and sessions

use std::process::ExitStatus;

use llxc::{ssh, LlxcError};

use super::bulk::summarize;
use super::{CommandResult, Llxc};

pub async fn gen_ssh_keys(manager: &Llxc, force: bool) -> CommandResult {
    let public = manager.generate_keypair(force).await?;
    println!("Public key written to {}", public.display());
    println!("Run 'llxc distkeys' to install it in existing containers");
    Ok(0)
}

pub async fn dist_keys(manager: &Llxc) -> CommandResult {
    let report = manager.distribute_key().await?;
    Ok(summarize("authorized", &report))
}

pub async fn enter(manager: &Llxc, name: &str) -> CommandResult {
    session(manager, name, &[]).await
}

pub async fn exec(manager: &Llxc, name: &str, command: &[String]) -> CommandResult {
    session(manager, name, command).await
}

async fn session(manager: &Llxc, name: &str, command: &[String]) -> CommandResult {
    // Fails with NotFound before ssh ever runs
    manager.state(name).await?;

    let keys = manager.ssh_keys();
    let status = ssh::session(keys, name, command)
        .await
        .map_err(|e| LlxcError::OperationFailed {
            name: name.to_string(),
            op: "open SSH session to",
            reason: e.to_string(),
        })?;

    Ok(remote_status(name, status))
}

fn remote_status(name: &str, status: ExitStatus) -> i32 {
    if status.success() {
        return 0;
    }
    log::warn!("Session in {} ended with {}", name, status);
    status.code().unwrap_or(1)
}
