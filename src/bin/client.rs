//! chatd-client - terminal client for the chat relay.
//!
//! Connects to the server, answers the username handshake, prints every
//! other received line verbatim, and sends each typed line prefixed with
//! the chosen username. The read and write sides run concurrently; all
//! socket writes funnel through one writer task.

use anyhow::Context;
use chatd::config::DEFAULT_ADDRESS;
use chatd::protocol;
use futures_util::{SinkExt, StreamExt};
use std::io::{self, Write};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_util::codec::{FramedRead, FramedWrite, LinesCodec};
use tracing::warn;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let address = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_ADDRESS.to_string());

    print!("Welcome to the chat room! Please enter your username: ");
    io::stdout().flush()?;
    let mut username = String::new();
    io::stdin().read_line(&mut username)?;
    let username = username.trim().to_string();

    let stream = TcpStream::connect(&address)
        .await
        .with_context(|| format!("connecting to {address}"))?;
    let (read_half, write_half) = stream.into_split();
    let mut reader = FramedRead::new(read_half, LinesCodec::new());
    let mut writer = FramedWrite::new(write_half, LinesCodec::new());

    // All writes funnel through this channel; the writer task is the only
    // owner of the socket's write half.
    let (outbound_tx, mut outbound_rx) = mpsc::channel::<String>(64);
    let _writer_task = tokio::spawn(async move {
        while let Some(line) = outbound_rx.recv().await {
            if writer.send(line).await.is_err() {
                return;
            }
        }
    });

    // Reader task: print every line, answer the username request.
    let handshake_tx = outbound_tx.clone();
    let reader_name = username.clone();
    let mut reader_task = tokio::spawn(async move {
        loop {
            match reader.next().await {
                Some(Ok(line)) if line == protocol::USERNAME_REQUEST => {
                    if handshake_tx.send(reader_name.clone()).await.is_err() {
                        return;
                    }
                }
                Some(Ok(line)) => println!("{line}"),
                Some(Err(e)) => {
                    warn!(error = %e, "Read failed");
                    println!("The chat room is closed.");
                    return;
                }
                None => {
                    println!("The chat room is closed.");
                    return;
                }
            }
        }
    });

    // Stdin loop: forward each typed line as "<username>: <text>".
    let stdin_loop = async {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => {
                    if outbound_tx
                        .send(format!("{username}: {line}"))
                        .await
                        .is_err()
                    {
                        return;
                    }
                }
                Ok(None) => return,
                Err(e) if e.kind() == io::ErrorKind::InvalidData => {
                    warn!(error = %e, "Invalid input");
                }
                Err(e) => {
                    warn!(error = %e, "Input read failed");
                    return;
                }
            }
        }
    };

    // Run until either the server drops the connection or stdin closes.
    tokio::select! {
        _ = &mut reader_task => {}
        _ = stdin_loop => {}
    }

    reader_task.abort();
    Ok(())
}
