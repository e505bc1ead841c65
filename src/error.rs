//! Error types and read-error classification.
//!
//! Session teardown decisions hinge on why a read failed, so transport
//! errors are classified into typed categories instead of being handled by
//! a catch-all around the receive loop.

use std::io;
use thiserror::Error;
use tokio_util::codec::LinesCodecError;

/// Registry admission errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    /// The room already holds the configured number of peers.
    #[error("chat room is at capacity ({capacity})")]
    CapacityExceeded { capacity: usize },
}

/// Terminal failures of a peer connection.
#[derive(Debug, Error)]
pub enum PeerReadFailure {
    /// The remote closed the connection.
    #[error("connection closed by peer")]
    Closed,

    /// The connection was reset or aborted by the remote.
    #[error("connection reset: {0}")]
    Reset(io::Error),

    /// Any other I/O failure.
    #[error("i/o failure: {0}")]
    Other(io::Error),
}

/// What the session should do after a failed read.
#[derive(Debug)]
pub enum ReadErrorAction {
    /// The frame was unusable but the connection is healthy. Log it and
    /// keep reading.
    SkipFrame(LinesCodecError),
    /// The connection is broken. Tear the session down.
    Disconnect(PeerReadFailure),
}

/// Classify a codec read error into an actionable category.
///
/// Malformed text (invalid UTF-8, over-long lines) is recoverable: the
/// codec has already discarded the offending bytes, so the stream can keep
/// going. Everything else means the connection is gone.
pub fn classify_read_error(err: LinesCodecError) -> ReadErrorAction {
    match err {
        LinesCodecError::MaxLineLengthExceeded => {
            ReadErrorAction::SkipFrame(LinesCodecError::MaxLineLengthExceeded)
        }
        LinesCodecError::Io(e) => match e.kind() {
            io::ErrorKind::InvalidData => ReadErrorAction::SkipFrame(LinesCodecError::Io(e)),
            io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionAborted
            | io::ErrorKind::BrokenPipe => ReadErrorAction::Disconnect(PeerReadFailure::Reset(e)),
            io::ErrorKind::UnexpectedEof => ReadErrorAction::Disconnect(PeerReadFailure::Closed),
            _ => ReadErrorAction::Disconnect(PeerReadFailure::Other(e)),
        },
    }
}
