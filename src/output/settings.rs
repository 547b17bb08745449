use crate::transport::TransportKind;
use crate::{MuxError, Result};
use std::time::Duration;

/// Write size a cold connection starts with; fits one TCP segment
pub const WRITE_SIZE_INITIAL: usize = 1300;

/// Write size of a warm connection; one TLS record minus framing overhead
pub const WRITE_SIZE_MAX: usize = 16 * 1024 - 100;

/// Tunables of the output buffer
///
/// # Examples
///
/// ```
/// use muxbuf::output::BufferSettings;
/// use std::time::Duration;
///
/// let settings = BufferSettings::default()
///     .with_flush_threshold(32 * 1024)
///     .with_cooldown(Duration::from_millis(500));
///
/// assert_eq!(settings.flush_threshold, 32 * 1024);
/// assert!(settings.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct BufferSettings {
    /// Force buffering on or off; `None` buffers only encrypted transports
    pub buffer_output: Option<bool>,
    /// Buffered bytes at which the buffer asks to be flushed
    pub flush_threshold: usize,
    /// Bytes written since going cold after which the connection is warm
    pub warmup_size: u64,
    /// Idle time after which a warm connection goes cold again
    pub cooldown: Duration,
    /// Scratch size while cold
    pub initial_write_size: usize,
    /// Scratch size while warm
    pub max_write_size: usize,
}

impl Default for BufferSettings {
    fn default() -> Self {
        Self {
            buffer_output: None,
            flush_threshold: 64 * 1024,
            warmup_size: 1024 * 1024,
            cooldown: Duration::from_secs(1),
            initial_write_size: WRITE_SIZE_INITIAL,
            max_write_size: WRITE_SIZE_MAX,
        }
    }
}

impl BufferSettings {
    /// Force buffering on or off regardless of transport kind
    pub fn with_buffering(mut self, enabled: bool) -> Self {
        self.buffer_output = Some(enabled);
        self
    }

    /// Set the flush threshold
    pub fn with_flush_threshold(mut self, threshold: usize) -> Self {
        self.flush_threshold = threshold;
        self
    }

    /// Set the warm-up size
    pub fn with_warmup_size(mut self, size: u64) -> Self {
        self.warmup_size = size;
        self
    }

    /// Set the cooldown interval; zero disables the warm/cold cycle
    pub fn with_cooldown(mut self, cooldown: Duration) -> Self {
        self.cooldown = cooldown;
        self
    }

    /// Set the cold and warm write sizes
    pub fn with_write_sizes(mut self, initial: usize, max: usize) -> Self {
        self.initial_write_size = initial;
        self.max_write_size = max;
        self
    }

    /// Whether output to a transport of `kind` is buffered
    pub fn buffers(&self, kind: TransportKind) -> bool {
        self.buffer_output.unwrap_or(kind.is_encrypted())
    }

    /// Checks that the settings can size a scratch buffer
    pub fn validate(&self) -> Result<()> {
        if self.flush_threshold == 0 {
            return Err(MuxError::Config("flush threshold must be positive".to_string()));
        }
        if self.initial_write_size == 0 || self.max_write_size == 0 {
            return Err(MuxError::Config("write sizes must be positive".to_string()));
        }
        if self.initial_write_size > self.max_write_size {
            return Err(MuxError::Config(format!(
                "initial write size {} exceeds maximum {}",
                self.initial_write_size, self.max_write_size
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffering_follows_transport_kind() {
        let settings = BufferSettings::default();
        assert!(settings.buffers(TransportKind::Encrypted));
        assert!(!settings.buffers(TransportKind::Plain));

        let forced = settings.with_buffering(true);
        assert!(forced.buffers(TransportKind::Plain));
    }

    #[test]
    fn test_validate_rejects_unusable_sizes() {
        assert!(BufferSettings::default().with_flush_threshold(0).validate().is_err());
        assert!(BufferSettings::default().with_write_sizes(0, 100).validate().is_err());
        assert!(BufferSettings::default().with_write_sizes(200, 100).validate().is_err());
        assert!(BufferSettings::default().with_write_sizes(100, 100).validate().is_ok());
    }
}
