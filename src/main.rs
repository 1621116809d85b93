mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use commands::{CommandResult, Llxc};
use llxc::config::IpFamily;
use llxc::manager::require_name;
use llxc::runtime::LxcRuntime;
use llxc::{Config, LlxcError, Manager};

#[derive(Parser)]
#[command(name = "llxc")]
#[command(about = "Lifecycle management for LXC containers")]
struct Args {
    /// Configuration file (default: $LLXC_CONFIG or /etc/llxc/llxc.conf)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Interface whose address is reported by status and list
    #[arg(short = 'i', long, global = true)]
    interface: Option<String>,

    /// Address family reported by status and list (ipv4 or ipv6)
    #[arg(long, global = true)]
    ipstack: Option<IpFamily>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Create a container from the configured template and start it
    Create {
        /// Container name
        name: Option<String>,
    },

    /// Destroy a container (force-stops it first if needed)
    Destroy {
        /// Container name
        name: Option<String>,
    },

    /// Copy a container to a new name
    Clone {
        /// Existing container
        source: Option<String>,
        /// New container name
        target: Option<String>,
    },

    /// Start a container
    Start {
        /// Container name
        name: Option<String>,
    },

    /// Shut a container down gracefully
    #[command(alias = "halt")]
    Stop {
        /// Container name
        name: Option<String>,
    },

    /// Stop a container immediately
    Kill {
        /// Container name
        name: Option<String>,
    },

    /// Suspend every process in a running container
    Freeze {
        /// Container name
        name: Option<String>,
    },

    /// Resume a frozen container
    Unfreeze {
        /// Container name
        name: Option<String>,
    },

    /// Flip whether a container starts at host boot
    #[command(name = "toggleautostart")]
    ToggleAutostart {
        /// Container name
        name: Option<String>,
    },

    /// Show container status
    Status {
        /// Container name
        name: Option<String>,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// List live containers
    List {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Move a container into cold storage
    Archive {
        /// Container name
        name: Option<String>,
    },

    /// Restore a container from cold storage
    Unarchive {
        /// Container name
        name: Option<String>,
    },

    /// List archived containers
    Archived {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Start every stopped container
    #[command(name = "startall")]
    StartAll,

    /// Gracefully stop every running container
    #[command(name = "haltall")]
    HaltAll,

    /// Kill every running or frozen container
    #[command(name = "killall")]
    KillAll,

    /// Generate the host SSH keypair
    #[command(name = "gensshkeys")]
    GenSshKeys {
        /// Replace an existing keypair
        #[arg(long)]
        force: bool,
    },

    /// Install the host public key in every container
    #[command(name = "distkeys")]
    DistKeys,

    /// Open an interactive SSH session in a container
    Enter {
        /// Container name
        name: Option<String>,
    },

    /// Run a command in a container over SSH
    Exec {
        /// Container name
        name: Option<String>,
        /// Command and arguments
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        command: Vec<String>,
    },
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let filter = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter)).init();

    let Some(command) = args.command else {
        commands::examples();
        return;
    };

    let mut config = match Config::load(args.config.as_deref()).await {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };
    if let Some(interface) = args.interface {
        config.interface = interface;
    }
    if let Some(family) = args.ipstack {
        config.family = family;
    }

    let runtime = LxcRuntime::new(config.container_root.clone());
    let manager = Manager::new(config, runtime);

    // Bulk loops check this between containers
    let interrupt = manager.interrupt();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            log::warn!("Interrupt received, finishing the current container");
            interrupt.trigger();
        }
    });

    let result = dispatch(&manager, command).await;

    match result {
        Ok(0) => {}
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("Error {}: {}", e.code(), e);
            std::process::exit(e.exit_code());
        }
    }
}

/// Run one subcommand
///
/// Names are optional to clap so that a missing one is reported like a
/// missing container instead of as a usage error.
async fn dispatch(manager: &Llxc, command: Command) -> CommandResult {
    match command {
        Command::Create { name } => commands::create(manager, require_name(name.as_deref())?).await,
        Command::Destroy { name } => commands::destroy(manager, require_name(name.as_deref())?).await,
        Command::Clone { source, target } => {
            let source = require_name(source.as_deref())?;
            let target = require_name(target.as_deref())?;
            commands::clone(manager, source, target).await
        }
        Command::Start { name } => commands::start(manager, require_name(name.as_deref())?).await,
        Command::Stop { name } => commands::stop(manager, require_name(name.as_deref())?).await,
        Command::Kill { name } => commands::kill(manager, require_name(name.as_deref())?).await,
        Command::Freeze { name } => commands::freeze(manager, require_name(name.as_deref())?).await,
        Command::Unfreeze { name } => {
            commands::unfreeze(manager, require_name(name.as_deref())?).await
        }
        Command::ToggleAutostart { name } => {
            commands::toggle_autostart(manager, require_name(name.as_deref())?).await
        }
        Command::Status { name, json } => {
            commands::status(manager, require_name(name.as_deref())?, json).await
        }
        Command::List { json } => commands::list(manager, json).await,
        Command::Archive { name } => commands::archive(manager, require_name(name.as_deref())?).await,
        Command::Unarchive { name } => {
            commands::unarchive(manager, require_name(name.as_deref())?).await
        }
        Command::Archived { json } => commands::archived(manager, json),
        Command::StartAll => commands::start_all(manager).await,
        Command::HaltAll => commands::halt_all(manager).await,
        Command::KillAll => commands::kill_all(manager).await,
        Command::GenSshKeys { force } => commands::gen_ssh_keys(manager, force).await,
        Command::DistKeys => commands::dist_keys(manager).await,
        Command::Enter { name } => commands::enter(manager, require_name(name.as_deref())?).await,
        Command::Exec { name, command } => {
            let name = require_name(name.as_deref())?;
            if command.is_empty() {
                return Err(LlxcError::InvalidArgument(
                    "you must specify a command to run".to_string(),
                ));
            }
            commands::exec(manager, name, &command).await
        }
    }
}
