use super::{Transport, TransportKind};
use async_trait::async_trait;
use bytes::Bytes;
use tokio::io::{AsyncWrite, AsyncWriteExt};

/// Transport over any async writer (a socket half, a TLS stream, ...)
///
/// A batch is written chunk by chunk with `write_all`. If one of those
/// writes fails, earlier chunks of the batch may already have reached the
/// peer, so a failed connection should be torn down rather than retried.
#[derive(Debug)]
pub struct IoTransport<W> {
    writer: W,
    kind: TransportKind,
}

impl<W> IoTransport<W>
where
    W: AsyncWrite + Unpin + Send,
{
    /// Wraps a writer of the given kind
    pub fn new(writer: W, kind: TransportKind) -> Self {
        Self { writer, kind }
    }

    /// Borrows the wrapped writer
    pub fn get_ref(&self) -> &W {
        &self.writer
    }

    /// Unwraps the writer
    pub fn into_inner(self) -> W {
        self.writer
    }
}

#[async_trait]
impl<W> Transport for IoTransport<W>
where
    W: AsyncWrite + Unpin + Send,
{
    fn kind(&self) -> TransportKind {
        self.kind
    }

    async fn write_batch(&mut self, chunks: &[Bytes]) -> std::io::Result<()> {
        for chunk in chunks {
            self.writer.write_all(chunk).await?;
        }
        Ok(())
    }

    async fn flush(&mut self) -> std::io::Result<()> {
        self.writer.flush().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::{BufferSettings, OutputBuffer};
    use tokio::io::AsyncReadExt;

    #[tokio::test]
    async fn test_batch_reaches_the_reader_in_order() {
        let (client, mut server) = tokio::io::duplex(64);
        let mut transport = IoTransport::new(client, TransportKind::Plain);

        let batch = [Bytes::from_static(b"he"), Bytes::from_static(b"llo")];
        transport.write_batch(&batch).await.unwrap();
        transport.flush().await.unwrap();
        drop(transport);

        let mut received = Vec::new();
        server.read_to_end(&mut received).await.unwrap();
        assert_eq!(received, b"hello");
    }

    #[tokio::test]
    async fn test_writer_is_reachable_through_the_buffer() {
        let transport = IoTransport::new(Vec::new(), TransportKind::Encrypted);
        let mut out = OutputBuffer::new(transport, &BufferSettings::default()).unwrap();

        out.add_data(b"PRI * HTTP/2.0");
        assert!(out.transport().get_ref().is_empty());

        out.assure_flushed().await.unwrap();
        assert_eq!(out.transport().get_ref().as_slice(), b"PRI * HTTP/2.0");
        assert_eq!(out.into_transport().into_inner(), b"PRI * HTTP/2.0");
    }

    #[tokio::test]
    async fn test_closed_peer_is_an_error() {
        let (client, server) = tokio::io::duplex(8);
        drop(server);
        let mut transport = IoTransport::new(client, TransportKind::Encrypted);

        assert!(transport.kind().is_encrypted());
        let result = transport.write_batch(&[Bytes::from_static(b"lost")]).await;
        assert!(result.is_err());
    }
}
