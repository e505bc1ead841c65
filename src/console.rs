//! Operator console - server-side stdin broadcast.

use crate::protocol;
use crate::registry::Registry;
use crate::relay;
use std::io;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

/// Read operator-typed lines from stdin and broadcast each one to every
/// connected peer as `Server: <text>`.
///
/// Invalid input encoding is logged and skipped. EOF ends the task; the
/// server keeps serving without a console.
pub async fn run(registry: Arc<Registry>) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                relay::broadcast(&registry, &protocol::server_line(&line), None);
            }
            Ok(None) => {
                info!("Console input closed");
                return;
            }
            Err(e) if e.kind() == io::ErrorKind::InvalidData => {
                warn!(error = %e, "Invalid characters entered");
            }
            Err(e) => {
                warn!(error = %e, "Console read failed");
                return;
            }
        }
    }
}
