mod input;
mod render;
mod runtime;
mod ui;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;

use campus_core::api::{HttpNotificationStore, MemoryNotificationStore, NotificationStore};
use campus_core::config::CoreConfig;
use campus_core::runtime::NotificationCenter;
use campus_core::session::AuthContext;
use campus_core::tracing_setup::{init_tracing, LogTarget};

use crate::runtime::run_app;
use ui::App;

#[derive(Parser, Debug)]
#[command(name = "campus-tui")]
#[command(about = "Campus notification center in the terminal")]
struct Args {
    /// Path to a JSON config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Backend base URL (overrides config and CAMPUS_API_URL)
    #[arg(long)]
    api_url: Option<String>,

    /// Use built-in sample data instead of the backend
    #[arg(long)]
    demo: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = CoreConfig::load(args.config.as_deref()).context("Failed to load config")?;
    if let Some(url) = args.api_url {
        config.api_base_url = url;
    }
    config.demo |= args.demo;

    init_tracing("campus-tui", LogTarget::file_from_env())?;

    let auth = AuthContext::restore(config.session_store());
    let store: Arc<dyn NotificationStore> = if config.demo {
        Arc::new(MemoryNotificationStore::demo(Utc::now()))
    } else {
        Arc::new(HttpNotificationStore::new(
            config.api_base_url.clone(),
            auth.token().map(str::to_string),
        ))
    };
    let (center, mut events_rx) = NotificationCenter::new(store);
    let mut app = App::new(center, &config, auth.session().cloned());

    // Restore the terminal before the default hook prints the panic
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = ui::restore_terminal();
        original_hook(panic_info);
    }));

    let mut terminal = ui::init_terminal()?;
    let result = run_app(&mut terminal, &mut app, &mut events_rx).await;
    ui::restore_terminal()?;

    if let Err(err) = result {
        eprintln!("Error: {err}");
    }
    Ok(())
}
