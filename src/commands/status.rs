//! Show container status

use llxc::ContainerState;

use super::{format_bytes, print_json, CommandResult, Llxc};

pub async fn status(manager: &Llxc, name: &str, json: bool) -> CommandResult {
    let snapshot = manager.snapshot(name).await?;

    if json {
        print_json(&snapshot)?;
        return Ok(0);
    }

    let symbol = match snapshot.state {
        ContainerState::Running => "●",
        ContainerState::Stopped => "○",
        ContainerState::Frozen => "❄",
        _ => "◐",
    };
    println!("{} {}", symbol, snapshot.name);
    println!("      State: {}", snapshot.state);
    println!(
        "  Autostart: {}",
        if snapshot.autostart { "yes" } else { "no" }
    );

    if let Some(pid) = snapshot.init_pid {
        println!("   Init PID: {}", pid);
    }

    match snapshot.tasks {
        Some(tasks) => println!("      Tasks: {}", tasks),
        None => println!("      Tasks: unavailable"),
    }

    // Omitted entirely when the cgroup does not account memory
    if let Some(bytes) = snapshot.memory_bytes {
        println!("     Memory: {}", format_bytes(bytes));
    }

    let config = manager.config();
    let address = snapshot
        .address
        .map(|a| a.to_string())
        .unwrap_or_else(|| "unavailable".to_string());
    println!(
        "    Address: {} ({} on {})",
        address,
        config.family.as_str(),
        config.interface
    );

    Ok(0)
}
