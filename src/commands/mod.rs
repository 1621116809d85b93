mod archive;
mod bulk;
mod examples;
mod lifecycle;
mod list;
mod ssh;
mod status;

pub use archive::{archive, archived, unarchive};
pub use bulk::{halt_all, kill_all, start_all};
pub use examples::examples;
pub use lifecycle::{clone, create, destroy, freeze, kill, start, stop, toggle_autostart, unfreeze};
pub use list::list;
pub use ssh::{dist_keys, enter, exec, gen_ssh_keys};
pub use status::status;

use llxc::runtime::LxcRuntime;
use llxc::{LlxcError, Manager};
use serde::Serialize;

/// The manager every command runs against
pub type Llxc = Manager<LxcRuntime>;

/// Each command yields the process exit status on success
pub type CommandResult = llxc::Result<i32>;

/// Exit status after a batch was cut short by SIGINT
pub const EXIT_INTERRUPTED: i32 = 130;

fn print_json<T: Serialize + ?Sized>(value: &T) -> llxc::Result<()> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| LlxcError::io("<stdout>", e.into()))?;
    println!("{}", json);
    Ok(())
}

/// Human-readable byte count
fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "K", "M", "G", "T"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{}B", bytes)
    } else {
        format!("{:.1}{}", value, UNITS[unit])
    }
}
