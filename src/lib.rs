//! chatd - a minimal multi-client chat relay.
//!
//! A server accepts TCP connections, assigns each peer a username through a
//! one-line handshake, and relays plaintext lines among the connected peers.
//! Everything is in-memory and best-effort; nothing is persisted.

pub mod config;
pub mod console;
pub mod error;
pub mod protocol;
pub mod registry;
pub mod relay;
pub mod server;
pub mod session;

pub use config::Config;
pub use registry::{PeerId, Registry};
pub use server::Server;
