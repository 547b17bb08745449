use crate::config::{ConfigResolver, ScopedConfig, Tunable};
use crate::output::BufferSettings;
use crate::transport::TransportKind;
use std::net::SocketAddr;
use std::time::Duration;
use tracing::warn;

/// Configuration for the session server
///
/// # Examples
///
/// ```
/// use muxbuf::session::SessionConfig;
/// use muxbuf::transport::TransportKind;
/// use std::time::Duration;
///
/// let config = SessionConfig {
///     bind_addr: "127.0.0.1:8443".parse().unwrap(),
///     max_connections: 256,
///     transport_kind: TransportKind::Encrypted,
///     ..Default::default()
/// };
/// assert_eq!(config.linger, Duration::from_millis(5));
/// ```
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Address to bind the server to
    pub bind_addr: SocketAddr,
    /// Maximum number of concurrent connections
    pub max_connections: usize,
    /// Buffer size for reading from a connection
    pub read_buffer_size: usize,
    /// How long input may stay quiet before pending output is flushed
    pub linger: Duration,
    /// Idle time after which a connection is closed
    pub read_timeout: Duration,
    /// Upper bound for one transport write or flush
    pub write_timeout: Duration,
    /// Kind of transport accepted connections are treated as
    pub transport_kind: TransportKind,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
            max_connections: 100,
            read_buffer_size: 8192,
            linger: Duration::from_millis(5),
            read_timeout: Duration::from_secs(30),
            write_timeout: Duration::from_secs(30),
            transport_kind: TransportKind::Plain,
        }
    }
}

impl SessionConfig {
    /// Applies a server scope's tunables to this configuration
    ///
    /// `H2MaxWorkers` bounds concurrent connections. Output buffering keeps
    /// following the transport kind unless the scope explicitly turns
    /// `H2Engine` off, which passes all output through unbuffered.
    pub fn apply_scope(
        mut self,
        scope: &ScopedConfig,
        resolver: &ConfigResolver,
    ) -> (SessionConfig, BufferSettings) {
        let resolved = resolver.resolve(scope);
        self.max_connections = resolved.max_workers as usize;

        let mut settings = BufferSettings::default();
        if scope.is_set(Tunable::Enabled) && !resolved.enabled {
            warn!(scope = scope.name(), "H2Engine is off, output is passed through unbuffered");
            settings = settings.with_buffering(false);
        }
        (self, settings)
    }
}
