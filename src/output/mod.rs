//! Adaptive output buffering for one connection

pub mod buffer;
mod scratch;
pub mod settings;

pub use buffer::OutputBuffer;
pub use settings::{BufferSettings, WRITE_SIZE_INITIAL, WRITE_SIZE_MAX};
