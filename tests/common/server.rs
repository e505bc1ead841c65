//! In-process test server.

use chatd::config::{Config, ListenConfig, RoomConfig};
use chatd::registry::Registry;
use chatd::server::Server;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// A chat server running inside the test process on an ephemeral port.
pub struct TestServer {
    addr: SocketAddr,
    registry: Arc<Registry>,
    handle: JoinHandle<()>,
}

impl TestServer {
    /// Bind on an ephemeral local port with the given room capacity and
    /// start accepting.
    pub async fn spawn(capacity: usize) -> anyhow::Result<Self> {
        let config = Config {
            listen: ListenConfig {
                address: "127.0.0.1:0".parse()?,
            },
            room: RoomConfig { capacity },
        };

        let server = Server::bind(&config).await?;
        let addr = server.local_addr()?;
        let registry = server.registry();
        let handle = tokio::spawn(server.run());

        Ok(Self {
            addr,
            registry,
            handle,
        })
    }

    /// The server's listen address.
    pub fn address(&self) -> String {
        self.addr.to_string()
    }

    /// Admitted-peer count, for registry assertions.
    pub fn peer_count(&self) -> usize {
        self.registry.len()
    }

    /// Connect a new test client to this server.
    pub async fn connect(&self) -> anyhow::Result<super::client::TestClient> {
        super::client::TestClient::connect(&self.address()).await
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
