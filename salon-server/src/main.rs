//! salon server - chat daemon
//!
//! Accepts TCP connections, prompts each one for a pseudo, then relays chat
//! lines, `/list` queries, and `/whisper` private messages between the
//! registered clients.

use std::path::Path;
use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tracing::info;

use salon_utils::{init_logging_with_config, LogConfig, Result, SalonError};

mod config;
mod handlers;
mod registry;
mod session;
mod tcp;

use config::{AppConfig, ConfigLoader};
use registry::ChatRegistry;

/// Server state handed to every connection task
///
/// The registry is the only shared mutable resource; everything else here
/// is read-only after startup.
#[derive(Clone)]
pub struct SharedState {
    pub registry: Arc<ChatRegistry>,
    pub config: Arc<AppConfig>,
    shutdown_tx: broadcast::Sender<()>,
}

impl SharedState {
    pub fn new(config: AppConfig) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);
        Self {
            registry: Arc::new(ChatRegistry::new()),
            config: Arc::new(config),
            shutdown_tx,
        }
    }

    pub fn subscribe_shutdown(&self) -> broadcast::Receiver<()> {
        self.shutdown_tx.subscribe()
    }

    pub fn trigger_shutdown(&self) {
        let _ = self.shutdown_tx.send(());
    }
}

/// Run the main server daemon
async fn run_daemon() -> Result<()> {
    info!("salon server starting");

    salon_utils::ensure_all_dirs()?;

    // Optional config path as the first argument, XDG location otherwise
    let config = match std::env::args().nth(1) {
        Some(path) => {
            let config = ConfigLoader::load_from_path(Path::new(&path))?;
            ConfigLoader::validate(&config)?;
            config
        }
        None => ConfigLoader::load_and_validate()?,
    };

    // A failed bind leaves the server useless; surface it, never retry.
    let addr = config.server.listen_addr();
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|e| SalonError::Bind {
            addr: addr.clone(),
            source: e,
        })?;
    info!("Listening on {}", addr);

    let state = SharedState::new(config);

    let signal_state = state.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Interrupt received, shutting down");
            signal_state.trigger_shutdown();
        }
    });

    tcp::run_accept_loop(listener, state).await;

    info!("salon server stopped");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging_with_config(LogConfig::server())?;
    run_daemon().await
}
