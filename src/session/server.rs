use super::{SessionConfig, drive_connection};
use crate::output::BufferSettings;
use crate::{MuxError, Result};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{Instrument, error, info, warn};

/// TCP server whose connections write through an adaptive output buffer
///
/// # Examples
///
/// ```no_run
/// use muxbuf::output::BufferSettings;
/// use muxbuf::session::{MuxServer, SessionConfig};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = SessionConfig {
///         bind_addr: "127.0.0.1:8080".parse()?,
///         ..Default::default()
///     };
///
///     let server = MuxServer::new(config, BufferSettings::default());
///     server.run().await?;
///     Ok(())
/// }
/// ```
pub struct MuxServer {
    config: SessionConfig,
    buffer_settings: BufferSettings,
    shutdown_signal: Arc<tokio::sync::broadcast::Sender<()>>,
}

impl MuxServer {
    /// Creates a new server with the given configuration
    pub fn new(config: SessionConfig, buffer_settings: BufferSettings) -> Self {
        let (shutdown_signal, _) = tokio::sync::broadcast::channel(1);
        Self {
            config,
            buffer_settings,
            shutdown_signal: Arc::new(shutdown_signal),
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Binds the configured address
    pub async fn bind(&self) -> Result<TcpListener> {
        TcpListener::bind(self.config.bind_addr)
            .await
            .map_err(|e| MuxError::Config(format!("Failed to bind TCP listener: {e}")))
    }

    /// Binds the configured address and serves until shut down
    pub async fn run(&self) -> Result<()> {
        let listener = self.bind().await?;
        self.serve(listener).await
    }

    /// Serves connections from an already bound listener
    pub async fn serve(&self, listener: TcpListener) -> Result<()> {
        self.buffer_settings.validate()?;
        let local_addr = listener.local_addr()?;
        info!(
            address = %local_addr,
            transport = %self.config.transport_kind,
            "Session server listening"
        );

        let connection_count = Arc::new(AtomicUsize::new(0));
        let mut shutdown_rx = self.shutdown_signal.subscribe();

        loop {
            tokio::select! {
                accept_result = listener.accept() => {
                    match accept_result {
                        Ok((stream, addr)) => {
                            let current_count = connection_count.load(Ordering::SeqCst);
                            if current_count >= self.config.max_connections {
                                warn!(%addr, current = current_count, limit = self.config.max_connections, "Connection rejected: limit reached");
                                continue;
                            }

                            let new_count = connection_count.fetch_add(1, Ordering::SeqCst) + 1;
                            info!(%addr, current = new_count, "Accepted connection");

                            if let Err(e) = stream.set_nodelay(true) {
                                warn!(%addr, error = %e, "Failed to disable Nagle's algorithm");
                            }

                            let config = self.config.clone();
                            let settings = self.buffer_settings.clone();
                            let connection_count = connection_count.clone();
                            let span = tracing::info_span!("connection", %addr, current = new_count);
                            tokio::spawn(async move {
                                if let Err(e) = drive_connection(stream, addr, &config, &settings).instrument(span).await {
                                    error!(%addr, error = %e, "Error handling connection");
                                }
                                let final_count = connection_count.fetch_sub(1, Ordering::SeqCst) - 1;
                                info!(%addr, current = final_count, "Connection closed");
                            });
                        }
                        Err(e) => {
                            error!(error = %e, "Failed to accept connection");
                        }
                    }
                }
                _ = signal::ctrl_c() => {
                    info!("Received shutdown signal, stopping server");
                    break;
                }
                _ = shutdown_rx.recv() => {
                    info!("Received internal shutdown signal, stopping server");
                    break;
                }
            }
        }

        info!("Session server stopped");
        Ok(())
    }

    /// Returns a sender that stops the accept loop when signalled
    pub fn shutdown_signal(&self) -> tokio::sync::broadcast::Sender<()> {
        self.shutdown_signal.as_ref().clone()
    }
}
