//! Server accept loop.
//!
//! Binds the listener and spawns one session task per accepted connection.
//! Admission control happens later, inside the session, once the username
//! handshake has completed.

use crate::config::Config;
use crate::registry::{PeerIdGenerator, Registry};
use crate::session::Session;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info, instrument, warn};

/// The accept loop and the state shared by all sessions.
pub struct Server {
    listener: TcpListener,
    registry: Arc<Registry>,
    ids: PeerIdGenerator,
}

impl Server {
    /// Bind the listener.
    ///
    /// `AddrInUse` is retried until it clears, waiting out a stale prior
    /// instance still holding the port. Any other bind error aborts.
    pub async fn bind(config: &Config) -> io::Result<Self> {
        let listener = loop {
            match TcpListener::bind(config.listen.address).await {
                Ok(listener) => break listener,
                Err(e) if e.kind() == io::ErrorKind::AddrInUse => {
                    warn!(address = %config.listen.address, error = %e, "Address in use, retrying bind");
                }
                Err(e) => return Err(e),
            }
        };
        let addr = listener.local_addr()?;
        info!(%addr, capacity = config.room.capacity, "Listener bound");

        Ok(Self {
            listener,
            registry: Arc::new(Registry::new(config.room.capacity)),
            ids: PeerIdGenerator::default(),
        })
    }

    /// Address the listener actually bound. Useful when configured with
    /// port 0.
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Shared connection registry.
    pub fn registry(&self) -> Arc<Registry> {
        Arc::clone(&self.registry)
    }

    /// Accept connections forever.
    #[instrument(skip(self), name = "accept_loop")]
    pub async fn run(self) {
        loop {
            match self.listener.accept().await {
                Ok((stream, addr)) => {
                    let id = self.ids.next();
                    info!(peer = id, %addr, "Connection accepted");
                    let registry = Arc::clone(&self.registry);
                    tokio::spawn(Session::new(id, stream, addr, registry).run());
                }
                Err(e) => {
                    error!(error = %e, "Failed to accept connection");
                }
            }
        }
    }
}
