use thiserror::Error;

/// Error types for the muxbuf library
#[derive(Error, Debug)]
pub enum MuxError {
    /// Socket and file errors outside the transport write path
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Transport write or flush failures, surfaced as the transport reported them
    #[error("Transport error: {0}")]
    Transport(std::io::Error),

    /// Settings that cannot be used to build a component
    #[error("Configuration error: {0}")]
    Config(String),

    /// A directive name that no tunable answers to
    #[error("Unknown directive: {0}")]
    UnknownDirective(String),

    /// A directive value that does not parse into the tunable's type
    #[error("Invalid value '{value}' for {directive}: {reason}")]
    InvalidValue {
        directive: String,
        value: String,
        reason: String,
    },

    /// Configuration file syntax errors
    #[error("Parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    /// Timeout errors
    #[error("Timeout error: {0}")]
    Timeout(String),
}

impl MuxError {
    /// Returns true if this is a transport failure the caller may retry as-is
    pub fn is_would_block(&self) -> bool {
        matches!(self, MuxError::Transport(e) if e.kind() == std::io::ErrorKind::WouldBlock)
    }
}

/// Result type for the muxbuf library
pub type Result<T> = std::result::Result<T, MuxError>;

pub mod common;
pub mod config;
pub mod output;
pub mod session;
pub mod transport;

// Re-export main types for convenience
pub use config::{ConfigFile, ConfigResolver, DefaultConfig, ScopeKind, ScopedConfig, Tunable};
pub use output::{BufferSettings, OutputBuffer};
pub use session::{MuxServer, SessionConfig};
pub use transport::{IoTransport, MemoryTransport, Transport, TransportKind};
