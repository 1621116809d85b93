//! Single-container lifecycle commands

use super::{CommandResult, Llxc};

async fn report_state(manager: &Llxc, name: &str) -> CommandResult {
    let state = manager.state(name).await?;
    println!("● {} - {}", name, state);
    Ok(0)
}

pub async fn create(manager: &Llxc, name: &str) -> CommandResult {
    manager.create(name).await?;
    report_state(manager, name).await
}

pub async fn destroy(manager: &Llxc, name: &str) -> CommandResult {
    manager.destroy(name).await?;
    println!("○ {} - destroyed", name);
    Ok(0)
}

pub async fn clone(manager: &Llxc, source: &str, target: &str) -> CommandResult {
    manager.clone_container(source, target).await?;
    println!("● {} - cloned from {}", target, source);
    Ok(0)
}

pub async fn start(manager: &Llxc, name: &str) -> CommandResult {
    manager.start(name).await?;
    report_state(manager, name).await
}

pub async fn stop(manager: &Llxc, name: &str) -> CommandResult {
    manager.halt(name).await?;
    report_state(manager, name).await
}

pub async fn kill(manager: &Llxc, name: &str) -> CommandResult {
    manager.kill(name).await?;
    report_state(manager, name).await
}

pub async fn freeze(manager: &Llxc, name: &str) -> CommandResult {
    manager.freeze(name).await?;
    report_state(manager, name).await
}

pub async fn unfreeze(manager: &Llxc, name: &str) -> CommandResult {
    manager.unfreeze(name).await?;
    report_state(manager, name).await
}

pub async fn toggle_autostart(manager: &Llxc, name: &str) -> CommandResult {
    let enabled = manager.toggle_autostart(name).await?;
    println!(
        "{} autostart {}",
        name,
        if enabled { "enabled" } else { "disabled" }
    );
    Ok(0)
}
