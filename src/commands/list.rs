//! List live containers

use super::{print_json, CommandResult, Llxc};

pub async fn list(manager: &Llxc, json: bool) -> CommandResult {
    let snapshots = manager.list().await;

    if json {
        print_json(&snapshots)?;
        return Ok(0);
    }

    let ip_column = format!("IP_ADDR_{}", manager.config().interface.to_uppercase());
    println!("{:<24} {:<8} {:<10} {}", "NAME", "TASKS", "STATE", ip_column);

    for snapshot in &snapshots {
        let tasks = snapshot
            .tasks
            .map(|t| t.to_string())
            .unwrap_or_else(|| "-".to_string());
        let address = snapshot
            .address
            .map(|a| a.to_string())
            .unwrap_or_else(|| "unavailable".to_string());
        println!(
            "{:<24} {:<8} {:<10} {}",
            snapshot.name,
            tasks,
            snapshot.state.as_str(),
            address
        );
    }

    println!();
    println!("{} containers listed", snapshots.len());

    Ok(0)
}
