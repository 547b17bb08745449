use crate::output::BufferSettings;
use crate::session::{MuxServer, SessionConfig};
use crate::transport::TransportKind;
use crate::{MuxError, Result};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// Creates a controlled test server with connection limit for integration tests
///
/// The listener is bound before the server task starts, so clients can
/// connect to the returned address right away.
pub async fn create_controlled_test_server_with_limit(
    max_connections: usize,
    transport_kind: TransportKind,
    buffer_settings: BufferSettings,
) -> Result<(JoinHandle<Result<()>>, SocketAddr)> {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .map_err(|e| MuxError::Config(format!("Failed to bind listener: {e}")))?;
    let addr = listener
        .local_addr()
        .map_err(|e| MuxError::Config(format!("Failed to get local address: {e}")))?;

    let config = SessionConfig {
        bind_addr: addr,
        max_connections,
        linger: Duration::from_millis(5),
        read_timeout: Duration::from_secs(30),
        write_timeout: Duration::from_secs(30),
        transport_kind,
        ..Default::default()
    };

    let server = MuxServer::new(config, buffer_settings);
    let server_handle = tokio::spawn(async move { server.serve(listener).await });

    Ok((server_handle, addr))
}
