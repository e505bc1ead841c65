//! Integration test common infrastructure.
//!
//! Provides an in-process test server and a line-oriented test client for
//! asserting on chat message flows.

pub mod client;
pub mod server;

#[allow(unused_imports)]
pub use client::TestClient;
#[allow(unused_imports)]
pub use server::TestServer;

use std::time::Duration;

/// Poll `cond` until it holds or two seconds pass.
#[allow(dead_code)]
pub async fn wait_until<F: Fn() -> bool>(cond: F) -> bool {
    for _ in 0..200 {
        if cond() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    false
}
