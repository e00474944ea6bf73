//! Client connection registry
//!
//! Tracks registered clients and their pseudos, and performs fan-out
//! delivery. This is the only shared mutable state in the server; every
//! read and write goes through one coarse mutex, and broadcast snapshots
//! the recipient list in a single critical section so entries added or
//! removed mid-fan-out do not join it.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use salon_protocol::ServerText;

/// Unique client identifier, allocated at accept time
///
/// Ids are monotone, so the registry's `BTreeMap` iteration order is the
/// connection-accept order. That order is the documented tie-break for
/// `/list` output and whisper target resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClientId(u64);

impl ClientId {
    /// Get the raw value
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for ClientId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Client({})", self.0)
    }
}

/// Entry for a registered client
pub struct ClientEntry {
    /// Display name chosen at registration
    pub pseudo: String,
    /// Channel draining into this client's writer task
    pub sender: mpsc::Sender<ServerText>,
}

impl std::fmt::Debug for ClientEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientEntry")
            .field("pseudo", &self.pseudo)
            .field("sender_closed", &self.sender.is_closed())
            .finish()
    }
}

/// Registry of registered clients
///
/// Thread-safe for concurrent access from the connection handler tasks.
/// Duplicate pseudos are not rejected; lookups return the first match in
/// id order.
pub struct ChatRegistry {
    /// Client ID -> entry, iterated in id (accept) order
    clients: Mutex<BTreeMap<ClientId, ClientEntry>>,
    /// Counter for generating unique client IDs
    next_client_id: AtomicU64,
}

impl Default for ChatRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            clients: Mutex::new(BTreeMap::new()),
            next_client_id: AtomicU64::new(1),
        }
    }

    /// Allocate an id for a newly accepted connection
    pub fn allocate_id(&self) -> ClientId {
        ClientId(self.next_client_id.fetch_add(1, Ordering::SeqCst))
    }

    /// Register a client under its chosen pseudo
    ///
    /// A session registers at most once, so the insert is unconditional.
    pub fn register(&self, client_id: ClientId, pseudo: String, sender: mpsc::Sender<ServerText>) {
        debug!("Registering {} as {:?}", client_id, pseudo);
        self.clients
            .lock()
            .insert(client_id, ClientEntry { pseudo, sender });
    }

    /// Remove a client, returning its pseudo
    ///
    /// No-op returning `None` when the client was never registered or was
    /// already removed; teardown relies on this for idempotence.
    pub fn unregister(&self, client_id: ClientId) -> Option<String> {
        let entry = self.clients.lock().remove(&client_id)?;
        debug!("Unregistered {} ({:?})", client_id, entry.pseudo);
        Some(entry.pseudo)
    }

    /// Find the first client registered under `pseudo`, in id order
    pub fn find_by_pseudo(&self, pseudo: &str) -> Option<ClientId> {
        self.clients
            .lock()
            .iter()
            .find(|(_, entry)| entry.pseudo == pseudo)
            .map(|(id, _)| *id)
    }

    /// All registered pseudos, in id order
    pub fn pseudos(&self) -> Vec<String> {
        self.clients
            .lock()
            .values()
            .map(|entry| entry.pseudo.clone())
            .collect()
    }

    /// Number of registered clients
    pub fn client_count(&self) -> usize {
        self.clients.lock().len()
    }

    /// Send a message to one client
    ///
    /// Returns `false` when the client is unknown or its channel is closed
    /// or full. A failed delivery is isolated: the failing client's own
    /// session notices its dead writer and runs the teardown path.
    pub fn try_send_to(&self, client_id: ClientId, message: ServerText) -> bool {
        let sender = self
            .clients
            .lock()
            .get(&client_id)
            .map(|entry| entry.sender.clone());

        let Some(sender) = sender else {
            debug!("Dropping delivery to unknown {}", client_id);
            return false;
        };

        try_send(&sender, client_id, message)
    }

    /// Broadcast a message to every registered client except `except`
    ///
    /// The recipient list is snapshotted under one lock acquisition and
    /// delivery happens outside the lock; a failure on one recipient does
    /// not abort delivery to the rest. Returns the number of clients the
    /// message was queued for.
    pub fn broadcast_except(&self, except: ClientId, message: ServerText) -> usize {
        let recipients: Vec<(ClientId, mpsc::Sender<ServerText>)> = self
            .clients
            .lock()
            .iter()
            .filter(|(id, _)| **id != except)
            .map(|(id, entry)| (*id, entry.sender.clone()))
            .collect();

        let mut success_count = 0;
        for (client_id, sender) in recipients {
            if try_send(&sender, client_id, message.clone()) {
                success_count += 1;
            }
        }
        success_count
    }
}

fn try_send(sender: &mpsc::Sender<ServerText>, client_id: ClientId, message: ServerText) -> bool {
    match sender.try_send(message) {
        Ok(()) => true,
        Err(mpsc::error::TrySendError::Closed(_)) => {
            warn!("{} channel closed, delivery dropped", client_id);
            false
        }
        Err(mpsc::error::TrySendError::Full(_)) => {
            warn!("{} channel full, message dropped", client_id);
            false
        }
    }
}

impl std::fmt::Debug for ChatRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatRegistry")
            .field("client_count", &self.clients.lock().len())
            .field(
                "next_client_id",
                &self.next_client_id.load(Ordering::SeqCst),
            )
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Register a client under the given pseudo, returning its receiver
    fn add_client(
        registry: &ChatRegistry,
        pseudo: &str,
    ) -> (ClientId, mpsc::Receiver<ServerText>) {
        let (tx, rx) = mpsc::channel(10);
        let id = registry.allocate_id();
        registry.register(id, pseudo.into(), tx);
        (id, rx)
    }

    #[test]
    fn test_registry_starts_empty() {
        let registry = ChatRegistry::new();
        assert_eq!(registry.client_count(), 0);
        assert!(registry.pseudos().is_empty());
    }

    #[test]
    fn test_ids_are_unique_and_monotone() {
        let registry = ChatRegistry::new();
        let a = registry.allocate_id();
        let b = registry.allocate_id();
        assert!(a < b);
        assert_ne!(a.value(), b.value());
    }

    #[test]
    fn test_client_id_display() {
        let registry = ChatRegistry::new();
        let id = registry.allocate_id();
        assert_eq!(format!("{}", id), "Client(1)");
    }

    #[test]
    fn test_register_and_list_in_accept_order() {
        let registry = ChatRegistry::new();
        add_client(&registry, "Alice");
        add_client(&registry, "Bob");

        assert_eq!(registry.client_count(), 2);
        assert_eq!(registry.pseudos(), vec!["Alice", "Bob"]);
    }

    #[test]
    fn test_unregister_returns_pseudo_once() {
        let registry = ChatRegistry::new();
        let (id, _rx) = add_client(&registry, "Alice");

        assert_eq!(registry.unregister(id), Some("Alice".into()));
        // Second removal is a no-op
        assert_eq!(registry.unregister(id), None);
        assert_eq!(registry.client_count(), 0);
    }

    #[test]
    fn test_find_by_pseudo_prefers_first_registration() {
        let registry = ChatRegistry::new();
        let (first, _rx1) = add_client(&registry, "Alice");
        let (second, _rx2) = add_client(&registry, "Alice");

        assert_eq!(registry.find_by_pseudo("Alice"), Some(first));

        registry.unregister(first);
        assert_eq!(registry.find_by_pseudo("Alice"), Some(second));
    }

    #[test]
    fn test_find_by_pseudo_unknown() {
        let registry = ChatRegistry::new();
        add_client(&registry, "Alice");
        assert_eq!(registry.find_by_pseudo("Nobody"), None);
    }

    #[test]
    fn test_try_send_to_delivers() {
        let registry = ChatRegistry::new();
        let (id, mut rx) = add_client(&registry, "Alice");

        assert!(registry.try_send_to(
            id,
            ServerText::Chat {
                pseudo: "Bob".into(),
                message: "hi".into(),
            }
        ));
        assert!(matches!(rx.try_recv(), Ok(ServerText::Chat { .. })));
    }

    #[test]
    fn test_try_send_to_closed_channel_fails_without_unregistering() {
        let registry = ChatRegistry::new();
        let (id, rx) = add_client(&registry, "Alice");
        drop(rx);

        assert!(!registry.try_send_to(id, ServerText::WhisperUsage));
        // The entry stays; teardown is the session's job
        assert_eq!(registry.client_count(), 1);
    }

    #[test]
    fn test_broadcast_excludes_sender() {
        let registry = ChatRegistry::new();
        let (alice, mut alice_rx) = add_client(&registry, "Alice");
        let (_bob, mut bob_rx) = add_client(&registry, "Bob");
        let (_carol, mut carol_rx) = add_client(&registry, "Carol");

        let message = ServerText::Chat {
            pseudo: "Alice".into(),
            message: "hey".into(),
        };
        assert_eq!(registry.broadcast_except(alice, message.clone()), 2);

        assert!(alice_rx.try_recv().is_err());
        assert_eq!(bob_rx.try_recv().unwrap(), message);
        assert_eq!(carol_rx.try_recv().unwrap(), message);
    }

    #[test]
    fn test_broadcast_isolates_failed_recipient() {
        let registry = ChatRegistry::new();
        let (alice, _alice_rx) = add_client(&registry, "Alice");
        let (_bob, bob_rx) = add_client(&registry, "Bob");
        let (_carol, mut carol_rx) = add_client(&registry, "Carol");
        drop(bob_rx);

        let delivered = registry.broadcast_except(
            alice,
            ServerText::Joined {
                pseudo: "Dave".into(),
            },
        );

        // Bob's dead channel must not keep the message from Carol
        assert_eq!(delivered, 1);
        assert!(carol_rx.try_recv().is_ok());
    }
}
