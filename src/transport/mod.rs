//! Transport write path beneath the output buffer
//!
//! The output buffer hands its queued chunks to a [`Transport`] as one
//! ordered batch. Implementations decide how the batch reaches the wire.

pub mod io;
pub mod memory;

pub use io::IoTransport;
pub use memory::MemoryTransport;

use async_trait::async_trait;
use bytes::Bytes;
use std::fmt;

/// Whether the transport encrypts what it writes
///
/// Encrypted transports pay per-record overhead on every write, which makes
/// coalescing worthwhile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransportKind {
    #[default]
    Plain,
    Encrypted,
}

impl TransportKind {
    pub fn is_encrypted(self) -> bool {
        self == TransportKind::Encrypted
    }
}

impl fmt::Display for TransportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportKind::Plain => f.write_str("plain"),
            TransportKind::Encrypted => f.write_str("encrypted"),
        }
    }
}

/// Write side of one connection
///
/// `write_batch` is the only place the output buffer suspends. A returned
/// error is surfaced to the caller unchanged; `ErrorKind::WouldBlock` means
/// the same batch may be offered again later.
#[async_trait]
pub trait Transport: Send {
    /// The kind of transport, used to pick buffering defaults
    fn kind(&self) -> TransportKind;

    /// Writes every chunk, in order
    async fn write_batch(&mut self, chunks: &[Bytes]) -> std::io::Result<()>;

    /// Pushes anything the transport holds on to out to the peer
    async fn flush(&mut self) -> std::io::Result<()>;
}
