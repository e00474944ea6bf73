//! TCP accept loop
//!
//! One task per accepted connection; the loop itself never blocks on a
//! client and runs until the shutdown signal fires.

use tokio::net::TcpListener;
use tracing::{debug, error, info};

use crate::session;
use crate::SharedState;

/// Accept connections until shutdown is signalled
///
/// Binding is the caller's job so a failed bind stays fatal to startup.
pub async fn run_accept_loop(listener: TcpListener, state: SharedState) {
    let mut shutdown_rx = state.subscribe_shutdown();

    loop {
        tokio::select! {
            result = listener.accept() => {
                match result {
                    Ok((stream, peer_addr)) => {
                        debug!("New connection from {}", peer_addr);
                        let state = state.clone();
                        tokio::spawn(async move {
                            let (reader, writer) = stream.into_split();
                            session::handle_client(reader, writer, peer_addr, state).await;
                        });
                    }
                    Err(e) => {
                        error!("Accept error: {}", e);
                    }
                }
            }
            _ = shutdown_rx.recv() => {
                info!("Shutdown signal received, stopping accept loop");
                break;
            }
        }
    }
}
