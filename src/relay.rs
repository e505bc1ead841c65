//! Broadcast relay - best-effort fan-out of one line to the room.

use crate::registry::{PeerId, Registry};
use tracing::debug;

/// Deliver `message` to every registered peer except `exclude`.
///
/// Delivery is best-effort per recipient: a peer whose outbound queue is
/// full or whose session is already gone is skipped, and that peer's own
/// session discovers the broken connection on its next read or write. One
/// undeliverable recipient never aborts delivery to the rest.
pub fn broadcast(registry: &Registry, message: &str, exclude: Option<PeerId>) {
    let targets = match exclude {
        Some(id) => registry.peers_except(id),
        None => registry.snapshot(),
    };
    for (id, peer) in targets {
        if let Err(e) = peer.outbound.try_send(message.to_string()) {
            debug!(peer = id, name = %peer.name, error = %e, "Dropping undeliverable line");
        }
    }
}
