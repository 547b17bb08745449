//! Session server driving connections through the output buffer
//!
//! This is the producer side the buffer is designed for: a loop that writes
//! whatever it has, polls the buffer, and flushes when input goes quiet.

pub mod config;
pub mod connection;
pub mod server;

pub use config::SessionConfig;
pub use connection::drive_connection;
pub use server::MuxServer;
