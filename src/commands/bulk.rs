//! Fleet-wide start/halt/kill

use llxc::manager::{BulkAction, BulkReport};

use super::{CommandResult, Llxc, EXIT_INTERRUPTED};

/// Print a batch summary and turn it into an exit status
pub(super) fn summarize(verb: &str, report: &BulkReport) -> i32 {
    for name in &report.succeeded {
        println!("● {} - {}", name, verb);
    }
    for (name, err) in &report.failed {
        println!("× {} - {} ({})", name, err, err.code());
    }

    println!();
    println!(
        "{} {}, {} skipped, {} failed",
        report.succeeded.len(),
        verb,
        report.skipped.len(),
        report.failed.len()
    );

    if report.interrupted {
        println!("Interrupted before all containers were visited");
        EXIT_INTERRUPTED
    } else if report.failed.is_empty() {
        0
    } else {
        1
    }
}

async fn run(manager: &Llxc, action: BulkAction, verb: &str) -> CommandResult {
    let report = manager.bulk(action).await?;
    Ok(summarize(verb, &report))
}

pub async fn start_all(manager: &Llxc) -> CommandResult {
    run(manager, BulkAction::StartAll, "started").await
}

pub async fn halt_all(manager: &Llxc) -> CommandResult {
    run(manager, BulkAction::HaltAll, "halted").await
}

pub async fn kill_all(manager: &Llxc) -> CommandResult {
    run(manager, BulkAction::KillAll, "killed").await
}
