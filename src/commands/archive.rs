//! Cold storage commands

use super::{format_bytes, print_json, CommandResult, Llxc};

pub async fn archive(manager: &Llxc, name: &str) -> CommandResult {
    let entry = manager.archive(name).await?;
    println!(
        "○ {} - archived to {} ({})",
        name,
        entry.path.display(),
        format_bytes(entry.size_bytes)
    );
    Ok(0)
}

pub async fn unarchive(manager: &Llxc, name: &str) -> CommandResult {
    manager.unarchive(name).await?;
    println!("○ {} - restored (not started, autostart off)", name);
    Ok(0)
}

pub fn archived(manager: &Llxc, json: bool) -> CommandResult {
    let entries = manager.list_archived();

    if json {
        print_json(&entries)?;
        return Ok(0);
    }

    println!("{:<24} {:>10}  {}", "NAME", "SIZE", "CREATED");
    for entry in &entries {
        println!(
            "{:<24} {:>10}  {}",
            entry.name,
            format_bytes(entry.size_bytes),
            entry.created.format("%Y-%m-%d %H:%M:%S")
        );
    }

    println!();
    println!("{} archived containers", entries.len());

    Ok(0)
}
