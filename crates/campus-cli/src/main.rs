use std::path::PathBuf;
use std::sync::Arc;

use chrono::Utc;
use clap::{Parser, Subcommand};

use campus_cli::cli::{execute, render, CliCommand, CommandContext, Response};
use campus_core::api::{HttpNotificationStore, MemoryNotificationStore, NotificationStore};
use campus_core::config::CoreConfig;
use campus_core::models::AttendanceStatus;
use campus_core::session::AuthContext;
use campus_core::tracing_setup::{init_tracing, LogTarget};
use campus_core::UserRole;

#[derive(Parser)]
#[command(name = "campus-cli")]
#[command(about = "Scriptable access to the campus notification center")]
struct Cli {
    /// Pretty-print JSON output
    #[arg(long, short)]
    pretty: bool,

    /// Path to JSON config file
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    /// Backend base URL (overrides config and CAMPUS_API_URL)
    #[arg(long)]
    api_url: Option<String>,

    /// Use built-in sample data; changes last for this invocation only
    #[arg(long)]
    demo: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the most recent notifications and the unread count
    List {
        /// Page size (defaults to the configured one)
        #[arg(long, short = 'n')]
        limit: Option<usize>,
    },

    /// Print the unread count
    Unread,

    /// Mark one notification as read
    Read { id: String },

    /// Mark every notification as read
    ReadAll,

    /// Delete a notification
    Delete { id: String },

    /// Show an event with its attendance counts
    Event { id: String },

    /// Answer an event invitation (confirm, maybe or decline)
    Rsvp {
        id: String,
        status: AttendanceStatus,
        /// Optional note, kept only for maybe/decline
        #[arg(long)]
        notes: Option<String>,
    },

    /// Store the identity used by both front ends
    Login {
        #[arg(long)]
        user_id: String,
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "student")]
        role: UserRole,
        #[arg(long)]
        token: Option<String>,
    },

    /// Forget the stored identity
    Logout,

    /// Show the stored identity
    Whoami,
}

impl From<Commands> for CliCommand {
    fn from(command: Commands) -> Self {
        match command {
            Commands::List { limit } => CliCommand::List { limit },
            Commands::Unread => CliCommand::Unread,
            Commands::Read { id } => CliCommand::MarkRead { id },
            Commands::ReadAll => CliCommand::MarkAllRead,
            Commands::Delete { id } => CliCommand::Delete { id },
            Commands::Event { id } => CliCommand::Event { id },
            Commands::Rsvp { id, status, notes } => CliCommand::Rsvp { id, status, notes },
            Commands::Login {
                user_id,
                name,
                role,
                token,
            } => CliCommand::Login {
                user_id,
                name,
                role,
                token,
            },
            Commands::Logout => CliCommand::Logout,
            Commands::Whoami => CliCommand::Whoami,
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = init_tracing("campus-cli", LogTarget::Stderr) {
        eprintln!("Warning: logging disabled: {e}");
    }

    let mut config = match CoreConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };
    if let Some(url) = cli.api_url {
        config.api_base_url = url;
    }
    config.demo |= cli.demo;

    let command = CliCommand::from(cli.command);
    let auth = AuthContext::restore(config.session_store());
    let store: Option<Arc<dyn NotificationStore>> = if !command.needs_store() {
        None
    } else if config.demo {
        Some(Arc::new(MemoryNotificationStore::demo(Utc::now())))
    } else {
        Some(Arc::new(HttpNotificationStore::new(
            config.api_base_url.clone(),
            auth.token().map(str::to_string),
        )))
    };

    let mut ctx = CommandContext {
        store,
        auth,
        config,
    };
    let response = match execute(command, &mut ctx).await {
        Ok(result) => Response::success(result),
        Err(e) => {
            tracing::debug!(error = ?e, "command failed");
            e.into_response()
        }
    };

    println!("{}", render(&response, cli.pretty));
    if response.is_error() {
        std::process::exit(1);
    }
}
