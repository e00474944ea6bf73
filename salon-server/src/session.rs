//! Per-connection session lifecycle
//!
//! Drives one connection from the pseudo prompt through registration and
//! command dispatch, and owns the teardown path. Reading and writing are
//! split: the reader loop lives here, and a writer task owns the socket's
//! write half behind a bounded channel so a stalled or dead peer never
//! blocks another client's fan-out.

use std::net::SocketAddr;

use futures::{SinkExt, StreamExt};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::mpsc;
use tokio_util::codec::{FramedRead, FramedWrite};
use tracing::{debug, info, warn};

use salon_protocol::{ServerCodec, ServerText};

use crate::handlers::HandlerContext;
use crate::registry::ClientId;
use crate::SharedState;

/// Registration state machine; `Registered` is terminal
enum SessionState {
    Unregistered,
    Registered(HandlerContext),
}

/// Handle one client connection until it disconnects or fails
///
/// Generic over the stream halves so tests can drive a session over
/// in-memory pipes.
pub async fn handle_client<R, W>(reader: R, writer: W, peer_addr: SocketAddr, state: SharedState)
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin + Send + 'static,
{
    let client_id = state.registry.allocate_id();
    info!("{} connected from {}", client_id, peer_addr);

    let mut lines = FramedRead::new(reader, ServerCodec::new());
    let (outbound_tx, outbound_rx) = mpsc::channel(state.config.limits.outbound_queue);
    let mut writer_task = tokio::spawn(write_loop(writer, outbound_rx, client_id));

    // The pseudo prompt goes out before any line is read.
    let _ = outbound_tx.send(ServerText::PseudoPrompt).await;

    let mut session = SessionState::Unregistered;

    loop {
        tokio::select! {
            item = lines.next() => match item {
                Some(Ok(line)) => on_line(&mut session, &line, client_id, &outbound_tx, &state).await,
                Some(Err(e)) => {
                    warn!("{} read error: {}", client_id, e);
                    break;
                }
                None => {
                    debug!("{} closed the connection", client_id);
                    break;
                }
            },
            // A dead write half takes the same teardown path as a close.
            _ = &mut writer_task => break,
        }
    }

    // Teardown is idempotent: unregister yields the pseudo at most once, so
    // the leave notice cannot go out twice for one connection.
    match state.registry.unregister(client_id) {
        Some(pseudo) => {
            info!("{} ({}) disconnected", client_id, pseudo);
            state
                .registry
                .broadcast_except(client_id, ServerText::Left { pseudo });
        }
        None => info!("{} disconnected before registering", client_id),
    }
}

/// Process one complete line in the current registration state
async fn on_line(
    session: &mut SessionState,
    line: &str,
    client_id: ClientId,
    outbound_tx: &mpsc::Sender<ServerText>,
    state: &SharedState,
) {
    match session {
        SessionState::Unregistered => {
            let pseudo = line.trim();
            if pseudo.is_empty() {
                // Silently wait for another line
                return;
            }

            // The first non-empty line is the pseudo, accepted
            // unconditionally; duplicates are not rejected.
            let pseudo = pseudo.to_string();
            state
                .registry
                .register(client_id, pseudo.clone(), outbound_tx.clone());

            let _ = outbound_tx
                .send(ServerText::Welcome {
                    pseudo: pseudo.clone(),
                })
                .await;
            state.registry.broadcast_except(
                client_id,
                ServerText::Joined {
                    pseudo: pseudo.clone(),
                },
            );

            info!("{} registered as {:?}", client_id, pseudo);
            *session = SessionState::Registered(HandlerContext::new(
                state.registry.clone(),
                client_id,
                pseudo,
                outbound_tx.clone(),
            ));
        }
        SessionState::Registered(ctx) => {
            let result = ctx.route_line(line);
            ctx.apply(result).await;
        }
    }
}

/// Drain the outbound queue into the socket's write half
///
/// Exits when the queue closes (teardown dropped the senders) or a write
/// fails; either way the write half is dropped and the peer sees EOF.
async fn write_loop<W>(writer: W, mut outbound: mpsc::Receiver<ServerText>, client_id: ClientId)
where
    W: AsyncWrite + Unpin,
{
    let mut sink = FramedWrite::new(writer, ServerCodec::new());

    while let Some(message) = outbound.recv().await {
        if let Err(e) = sink.send(message).await {
            warn!("{} write failed: {}", client_id, e);
            break;
        }
    }
}
