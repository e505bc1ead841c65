//! Connection registry - the authoritative set of admitted peers.
//!
//! A peer enters the registry only after its username handshake completed
//! and it passed the capacity gate, and leaves on explicit exit or
//! connection failure. All mutation goes through one lock so the capacity
//! check and the insert are a single atomic step, and so the explicit-exit
//! and error teardown paths may race on removal without corrupting state.

use crate::error::RegistryError;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::mpsc;

/// Process-unique peer identifier.
pub type PeerId = u64;

/// Allocates process-unique peer ids for accepted connections.
#[derive(Debug, Default)]
pub struct PeerIdGenerator {
    next: AtomicU64,
}

impl PeerIdGenerator {
    /// Allocate the next id.
    pub fn next(&self) -> PeerId {
        self.next.fetch_add(1, Ordering::Relaxed)
    }
}

/// A registered peer: its display name and the handle used to queue
/// outbound lines toward its connection.
#[derive(Debug, Clone)]
pub struct Peer {
    /// Display name bound during the handshake. Names need not be unique.
    pub name: String,
    /// Fan-in channel drained by the owning session's event loop, which is
    /// the only writer to the underlying socket.
    pub outbound: mpsc::Sender<String>,
}

/// Shared set of admitted peers.
#[derive(Debug)]
pub struct Registry {
    peers: Mutex<HashMap<PeerId, Peer>>,
    capacity: usize,
}

impl Registry {
    /// Create an empty registry with the given admission limit.
    pub fn new(capacity: usize) -> Self {
        Self {
            peers: Mutex::new(HashMap::new()),
            capacity,
        }
    }

    /// Number of admitted peers.
    pub fn len(&self) -> usize {
        self.peers.lock().len()
    }

    /// Whether the room is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Configured admission limit.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Admit a peer. Fails without mutating anything when the room is full.
    pub fn try_add(
        &self,
        id: PeerId,
        name: impl Into<String>,
        outbound: mpsc::Sender<String>,
    ) -> Result<(), RegistryError> {
        let mut peers = self.peers.lock();
        if peers.len() >= self.capacity {
            return Err(RegistryError::CapacityExceeded {
                capacity: self.capacity,
            });
        }
        peers.insert(
            id,
            Peer {
                name: name.into(),
                outbound,
            },
        );
        Ok(())
    }

    /// Remove a peer. Absent ids are a no-op, so racing teardown paths may
    /// both call this for the same peer.
    pub fn remove(&self, id: PeerId) -> Option<Peer> {
        self.peers.lock().remove(&id)
    }

    /// Point-in-time snapshot of every peer except `exclude`.
    pub fn peers_except(&self, exclude: PeerId) -> Vec<(PeerId, Peer)> {
        self.peers
            .lock()
            .iter()
            .filter(|(id, _)| **id != exclude)
            .map(|(id, peer)| (*id, peer.clone()))
            .collect()
    }

    /// Point-in-time snapshot of every peer.
    pub fn snapshot(&self) -> Vec<(PeerId, Peer)> {
        self.peers
            .lock()
            .iter()
            .map(|(id, peer)| (*id, peer.clone()))
            .collect()
    }
}
