//! Peer session - owns one client connection's lifecycle.
//!
//! Each session runs in its own tokio task:
//!
//! ```text
//! Phase 1: username handshake (sequential request/reply)
//!    |
//! Phase 2: event loop (tokio::select!)
//!    inbound frames ----> exit check ----> broadcast relay
//!    outbound queue  <--- other sessions' broadcasts, written to the
//!                         socket only from this loop
//!    |
//! Teardown: an explicit exit acknowledges the peer and broadcasts a
//!           departure notice; a lost connection is removed silently and
//!           the task lingers briefly before exiting
//! ```

use crate::error::{PeerReadFailure, ReadErrorAction, classify_read_error};
use crate::protocol;
use crate::registry::{PeerId, Registry};
use crate::relay;
use futures_util::{SinkExt, StreamExt};
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_util::codec::{Framed, LinesCodec};
use tracing::{debug, info, instrument, warn};

/// Queue depth for lines fanned in from other sessions.
const OUTBOUND_QUEUE: usize = 64;

/// Pause inserted after error-path cleanup before the task exits.
const DISCONNECT_LINGER: Duration = Duration::from_secs(5);

/// How a session left its event loop.
enum Teardown {
    /// The peer asked to leave; farewell and departure notice already sent.
    ExplicitExit,
    /// The connection failed or closed underneath the session.
    ConnectionLost(PeerReadFailure),
}

/// A per-connection session worker.
pub struct Session {
    id: PeerId,
    addr: SocketAddr,
    registry: Arc<Registry>,
    framed: Framed<TcpStream, LinesCodec>,
}

impl Session {
    /// Wrap an accepted connection.
    pub fn new(id: PeerId, stream: TcpStream, addr: SocketAddr, registry: Arc<Registry>) -> Self {
        Self {
            id,
            addr,
            registry,
            framed: Framed::new(stream, LinesCodec::new()),
        }
    }

    /// Drive the session to completion.
    #[instrument(skip(self), fields(peer = self.id, addr = %self.addr), name = "session")]
    pub async fn run(mut self) {
        // Phase 1: the peer is not registered until the handshake completes,
        // so every failure before that simply drops the connection.
        let Some(name) = self.handshake().await else {
            info!("Client disconnected during handshake");
            return;
        };

        // Capacity gate. The check is atomic with the insert, so two
        // concurrent handshakes cannot both squeeze into the last slot.
        let (outbound_tx, mut outbound_rx) = mpsc::channel::<String>(OUTBOUND_QUEUE);
        if let Err(e) = self.registry.try_add(self.id, name.clone(), outbound_tx) {
            info!(name = %name, error = %e, "Rejecting connection");
            let _ = self.framed.send(protocol::ROOM_FULL).await;
            return;
        }

        info!(name = %name, "Peer joined the chat");

        match self.active(&name, &mut outbound_rx).await {
            Teardown::ExplicitExit => {
                info!(name = %name, "Peer left the chat");
            }
            Teardown::ConnectionLost(failure) => {
                // Silent removal: no departure notice on this path. The
                // remove is a no-op if the exit path already won the race.
                if self.registry.remove(self.id).is_some() {
                    info!(name = %name, reason = %failure, "Peer connection lost");
                }
                // Close the socket before lingering; the delay postpones
                // only the task's exit, not the cleanup.
                drop(self.framed);
                tokio::time::sleep(DISCONNECT_LINGER).await;
            }
        }
    }

    /// Request and read the peer's display name.
    async fn handshake(&mut self) -> Option<String> {
        if let Err(e) = self.framed.send(protocol::USERNAME_REQUEST).await {
            debug!(error = %e, "Write failed during handshake");
            return None;
        }
        loop {
            match self.framed.next().await {
                Some(Ok(name)) => return Some(name),
                Some(Err(e)) => match classify_read_error(e) {
                    ReadErrorAction::SkipFrame(cause) => {
                        warn!(error = %cause, "Ignoring undecodable handshake line");
                    }
                    ReadErrorAction::Disconnect(failure) => {
                        debug!(reason = %failure, "Handshake read failed");
                        return None;
                    }
                },
                None => return None,
            }
        }
    }

    /// Announce the admitted peer, then multiplex its inbound frames with
    /// the outbound queue until teardown.
    async fn active(&mut self, name: &str, outbound_rx: &mut mpsc::Receiver<String>) -> Teardown {
        relay::broadcast(&self.registry, &protocol::join_notice(name), Some(self.id));
        for line in protocol::WELCOME {
            if let Err(e) = self.framed.send(line).await {
                return Teardown::ConnectionLost(write_failure(e));
            }
        }

        loop {
            tokio::select! {
                inbound = self.framed.next() => match inbound {
                    Some(Ok(line)) => {
                        if line.contains(protocol::EXIT_TOKEN) {
                            let _ = self.framed.send(protocol::FAREWELL).await;
                            self.registry.remove(self.id);
                            relay::broadcast(
                                &self.registry,
                                &protocol::leave_notice(name),
                                Some(self.id),
                            );
                            return Teardown::ExplicitExit;
                        }
                        debug!(len = line.len(), "Relaying line");
                        relay::broadcast(&self.registry, &line, Some(self.id));
                    }
                    Some(Err(e)) => match classify_read_error(e) {
                        ReadErrorAction::SkipFrame(cause) => {
                            warn!(error = %cause, "Ignoring undecodable line");
                        }
                        ReadErrorAction::Disconnect(failure) => {
                            return Teardown::ConnectionLost(failure);
                        }
                    },
                    None => return Teardown::ConnectionLost(PeerReadFailure::Closed),
                },

                // Lines fanned in from other sessions' broadcasts. Writing
                // only here keeps socket writes serialized per connection.
                Some(line) = outbound_rx.recv() => {
                    if let Err(e) = self.framed.send(line.as_str()).await {
                        debug!(error = %e, "Write failed");
                        return Teardown::ConnectionLost(write_failure(e));
                    }
                }
            }
        }
    }
}

fn write_failure(err: tokio_util::codec::LinesCodecError) -> PeerReadFailure {
    PeerReadFailure::Other(io::Error::new(io::ErrorKind::BrokenPipe, err))
}
