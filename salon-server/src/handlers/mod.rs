//! Command handlers for the registered phase
//!
//! Routes each complete line from a registered client to the matching
//! handler. Handlers classify only; applying a [`HandlerResult`] is what
//! touches the registry and the outbound channels, which keeps the routing
//! table testable without sockets.

mod chat;

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::debug;

use salon_protocol::{Command, CommandError, ServerText};

use crate::registry::{ChatRegistry, ClientId};

/// Context for command handlers
///
/// One per registered session; created at registration and dropped at
/// teardown.
pub struct HandlerContext {
    /// Shared client registry
    pub registry: Arc<ChatRegistry>,
    /// The client issuing the commands
    pub client_id: ClientId,
    /// The client's resolved pseudo
    pub pseudo: String,
    /// Channel back to this client's writer task
    outbound: mpsc::Sender<ServerText>,
}

/// Outcome of handling one line
#[derive(Debug, PartialEq, Eq)]
pub enum HandlerResult {
    /// Send to the issuing client only
    Reply(ServerText),
    /// Send to one specific other client (whisper delivery)
    Deliver {
        target: ClientId,
        message: ServerText,
    },
    /// Send to every registered client except the issuer
    Broadcast(ServerText),
    /// Nothing to do (blank line)
    None,
}

impl HandlerContext {
    /// Create a new handler context for a freshly registered client
    pub fn new(
        registry: Arc<ChatRegistry>,
        client_id: ClientId,
        pseudo: String,
        outbound: mpsc::Sender<ServerText>,
    ) -> Self {
        Self {
            registry,
            client_id,
            pseudo,
            outbound,
        }
    }

    /// Route one complete line to the appropriate handler
    pub fn route_line(&self, line: &str) -> HandlerResult {
        match Command::parse(line) {
            Ok(None) => HandlerResult::None,
            Ok(Some(Command::List)) => self.handle_list(),
            Ok(Some(Command::Whisper { target, message })) => {
                self.handle_whisper(&target, message)
            }
            Ok(Some(Command::Say(text))) => self.handle_say(text),
            Err(CommandError::WhisperUsage) => HandlerResult::Reply(ServerText::WhisperUsage),
        }
    }

    /// Carry out a handler result through the registry
    pub async fn apply(&self, result: HandlerResult) {
        match result {
            HandlerResult::None => {}
            HandlerResult::Reply(message) => {
                // Backpressure on the session's own channel is fine here;
                // the reader simply waits for its writer to drain.
                let _ = self.outbound.send(message).await;
            }
            HandlerResult::Deliver { target, message } => {
                if !self.registry.try_send_to(target, message) {
                    debug!("Whisper from {} lost its target {}", self.client_id, target);
                }
            }
            HandlerResult::Broadcast(message) => {
                self.registry.broadcast_except(self.client_id, message);
            }
        }
    }
}
