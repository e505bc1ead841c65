//! Line-oriented test client.
//!
//! Speaks the newline-delimited chat protocol and can assert on received
//! lines with timeouts.

use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, BufWriter};
use tokio::net::TcpStream;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::time::timeout;

/// A test chat client.
pub struct TestClient {
    reader: BufReader<OwnedReadHalf>,
    writer: BufWriter<OwnedWriteHalf>,
}

impl TestClient {
    /// Connect to a test server.
    pub async fn connect(address: &str) -> anyhow::Result<Self> {
        let stream = TcpStream::connect(address).await?;
        let (read_half, write_half) = stream.into_split();
        Ok(Self {
            reader: BufReader::new(read_half),
            writer: BufWriter::new(write_half),
        })
    }

    /// Send one line.
    pub async fn send_line(&mut self, line: &str) -> anyhow::Result<()> {
        self.writer.write_all(line.as_bytes()).await?;
        self.writer.write_all(b"\n").await?;
        self.writer.flush().await?;
        Ok(())
    }

    /// Receive a single line (5 second timeout).
    pub async fn recv_line(&mut self) -> anyhow::Result<String> {
        self.recv_line_timeout(Duration::from_secs(5)).await
    }

    /// Receive a single line with an explicit timeout.
    pub async fn recv_line_timeout(&mut self, dur: Duration) -> anyhow::Result<String> {
        let mut line = String::new();
        let n = timeout(dur, self.reader.read_line(&mut line)).await??;
        if n == 0 {
            anyhow::bail!("connection closed");
        }
        Ok(line.trim_end().to_string())
    }

    /// Assert the next received line equals `expected`.
    pub async fn expect_line(&mut self, expected: &str) -> anyhow::Result<()> {
        let line = self.recv_line().await?;
        anyhow::ensure!(line == expected, "expected {expected:?}, got {line:?}");
        Ok(())
    }

    /// Assert nothing arrives within `dur`.
    #[allow(dead_code)]
    pub async fn expect_silence(&mut self, dur: Duration) -> anyhow::Result<()> {
        match self.recv_line_timeout(dur).await {
            Ok(line) => anyhow::bail!("expected silence, got {line:?}"),
            Err(_) => Ok(()),
        }
    }

    /// Assert the server closes the connection (EOF within 5 seconds).
    #[allow(dead_code)]
    pub async fn expect_closed(&mut self) -> anyhow::Result<()> {
        let mut line = String::new();
        let n = timeout(Duration::from_secs(5), self.reader.read_line(&mut line)).await??;
        anyhow::ensure!(n == 0, "expected close, got {:?}", line.trim_end());
        Ok(())
    }

    /// Complete the username handshake: wait for the request sentinel and
    /// reply with `name`.
    pub async fn handshake(&mut self, name: &str) -> anyhow::Result<()> {
        self.expect_line(chatd::protocol::USERNAME_REQUEST).await?;
        self.send_line(name).await
    }

    /// Handshake and drain the welcome sequence, leaving the client at a
    /// clean point in the stream.
    pub async fn join(&mut self, name: &str) -> anyhow::Result<()> {
        self.handshake(name).await?;
        for expected in chatd::protocol::WELCOME {
            self.expect_line(expected).await?;
        }
        Ok(())
    }
}
