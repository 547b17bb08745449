use super::SessionConfig;
use crate::output::{BufferSettings, OutputBuffer};
use crate::transport::IoTransport;
use crate::{MuxError, Result};
use std::future::Future;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite};
use tokio::time::timeout;
use tracing::{info, trace, warn};

/// Drives one connection, routing everything it writes through an
/// [`OutputBuffer`]
///
/// Received bytes are written back. Output is passed on whenever the buffer
/// asks for it, and flushed once input has been quiet for `linger`.
pub async fn drive_connection<S>(
    stream: S,
    addr: SocketAddr,
    config: &SessionConfig,
    settings: &BufferSettings,
) -> Result<()>
where
    S: AsyncRead + AsyncWrite + Send + Unpin,
{
    let (mut reader, writer) = tokio::io::split(stream);
    let transport = IoTransport::new(writer, config.transport_kind);
    let mut out = OutputBuffer::new(transport, settings)?;
    let mut buffer = vec![0; config.read_buffer_size];

    loop {
        let wait = if out.needs_assure() {
            config.linger
        } else {
            config.read_timeout
        };

        let n = match timeout(wait, reader.read(&mut buffer)).await {
            Ok(Ok(n)) => n,
            Ok(Err(e)) => {
                return Err(e.into());
            }
            Err(_) if out.needs_assure() => {
                trace!(%addr, buffered = out.buffered_len(), "Input quiet, flushing");
                within(config.write_timeout, "flush", out.assure_flushed()).await?;
                continue;
            }
            Err(_) => {
                warn!(%addr, "Read timeout");
                break;
            }
        };

        if n == 0 {
            info!(%addr, "Client closed connection");
            break;
        }

        out.record_read(n);
        out.add_data(&buffer[..n]);
        if out.needs_flush() {
            within(config.write_timeout, "write", out.pass()).await?;
        }
    }

    within(config.write_timeout, "flush", out.assure_flushed()).await?;
    info!(
        %addr,
        bytes_read = out.bytes_read(),
        bytes_written = out.bytes_written(),
        warm = out.is_warm(),
        "Connection finished"
    );
    Ok(())
}

async fn within<F>(limit: Duration, what: &str, fut: F) -> Result<()>
where
    F: Future<Output = Result<()>>,
{
    timeout(limit, fut)
        .await
        .map_err(|_| MuxError::Timeout(format!("{what} did not complete within {limit:?}")))?
}
