use super::scratch::Scratch;
use super::settings::BufferSettings;
use crate::transport::{Transport, TransportKind};
use crate::{MuxError, Result};
use bytes::Bytes;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, trace};

/// Adaptive output buffer for one multiplexed connection
///
/// Frames from many streams are appended here and handed to the transport
/// in batches. Short writes are coalesced in a scratch area whose size
/// follows the connection's temperature: a cold connection uses small
/// chunks so data leaves promptly, a warm one (many bytes written without a
/// pause longer than the cooldown) uses chunks close to one TLS record.
///
/// The buffer never flushes on its own. The driving loop polls
/// [`needs_flush`](Self::needs_flush) and calls [`pass`](Self::pass), and
/// calls [`assure_flushed`](Self::assure_flushed) when it runs out of work.
/// Dropping the buffer discards anything still pending.
///
/// # Examples
///
/// ```
/// use muxbuf::output::{BufferSettings, OutputBuffer};
/// use muxbuf::transport::{MemoryTransport, TransportKind};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let transport = MemoryTransport::new(TransportKind::Encrypted);
///     let mut out = OutputBuffer::new(transport, &BufferSettings::default())?;
///
///     out.add_data(b"HEADERS");
///     out.add_data(b"DATA");
///     assert!(out.pending());
///     assert!(!out.needs_flush());
///
///     out.assure_flushed().await?;
///     assert!(!out.pending());
///     assert_eq!(out.transport().written(), b"HEADERSDATA");
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct OutputBuffer<T> {
    transport: T,
    kind: TransportKind,
    queue: Vec<Bytes>,
    scratch: Option<Scratch>,

    buffer_output: bool,
    write_size: usize,
    initial_write_size: usize,
    max_write_size: usize,
    flush_threshold: usize,
    buffered_len: usize,
    is_flushed: bool,
    unflushed: bool,

    last_write: Instant,
    cooldown: Duration,
    warmup_size: u64,
    warm_bytes: u64,

    bytes_read: u64,
    bytes_written: u64,
}

impl<T: Transport> OutputBuffer<T> {
    /// Creates the buffer for a connection writing to `transport`
    ///
    /// Output is buffered for encrypted transports unless the settings say
    /// otherwise. Fails if the settings cannot size the scratch area.
    pub fn new(transport: T, settings: &BufferSettings) -> Result<Self> {
        settings.validate()?;

        let kind = transport.kind();
        let buffer_output = settings.buffers(kind);
        let (warmup_size, cooldown, write_size) = if buffer_output {
            let write_size = if settings.cooldown.is_zero() {
                settings.max_write_size
            } else {
                settings.initial_write_size
            };
            (settings.warmup_size, settings.cooldown, write_size)
        } else {
            (0, Duration::ZERO, 0)
        };

        debug!(%kind, buffer_output, write_size, "Output buffer initialized");

        Ok(Self {
            transport,
            kind,
            queue: Vec::new(),
            scratch: buffer_output.then(|| Scratch::new(write_size)),
            buffer_output,
            write_size,
            initial_write_size: settings.initial_write_size,
            max_write_size: settings.max_write_size,
            flush_threshold: settings.flush_threshold,
            buffered_len: 0,
            is_flushed: true,
            unflushed: false,
            last_write: Instant::now(),
            cooldown,
            warmup_size,
            warm_bytes: 0,
            bytes_read: 0,
            bytes_written: 0,
        })
    }

    /// Appends raw bytes, coalescing them in the scratch area
    pub fn add_data(&mut self, data: &[u8]) {
        if data.is_empty() {
            return;
        }
        if self.buffered_len == 0 {
            self.cool_down_if_idle(Instant::now());
        }
        self.is_flushed = false;
        self.buffered_len += data.len();

        let Some(scratch) = self.scratch.as_mut() else {
            self.queue.push(Bytes::copy_from_slice(data));
            return;
        };

        let mut rest = data;
        while !rest.is_empty() {
            if scratch.is_full() {
                if let Some(chunk) = scratch.take(self.write_size) {
                    self.queue.push(chunk);
                }
            }
            if scratch.is_empty() && rest.len() > scratch.capacity() {
                // Large writes go straight to the queue in scratch-sized chunks
                let (head, tail) = rest.split_at(scratch.capacity());
                self.queue.push(Bytes::copy_from_slice(head));
                rest = tail;
                continue;
            }
            let n = scratch.push(rest);
            rest = &rest[n..];
        }
    }

    /// Appends a ready-made chunk behind everything buffered so far
    pub fn add(&mut self, chunk: Bytes) {
        if chunk.is_empty() {
            return;
        }
        if self.buffered_len == 0 {
            self.cool_down_if_idle(Instant::now());
        }
        self.spill_scratch();
        self.is_flushed = false;
        self.buffered_len += chunk.len();
        self.queue.push(chunk);
    }

    /// Appends a sequence of chunks in order
    pub fn append<I>(&mut self, chunks: I)
    where
        I: IntoIterator<Item = Bytes>,
    {
        for chunk in chunks {
            self.add(chunk);
        }
    }

    /// Whether the buffer holds bytes the transport has not seen
    pub fn pending(&self) -> bool {
        self.buffered_len > 0
    }

    /// Whether the buffered bytes should be passed on now
    ///
    /// True once the flush threshold is reached, on every write when
    /// buffering is off, and when data is pending on a connection that has
    /// not written for a whole cooldown interval.
    pub fn needs_flush(&self) -> bool {
        if self.buffered_len == 0 {
            return false;
        }
        if !self.buffer_output || self.buffered_len >= self.flush_threshold {
            return true;
        }
        !self.cooldown.is_zero() && self.last_write.elapsed() >= self.cooldown
    }

    /// Hands everything buffered to the transport as one batch
    ///
    /// On failure the buffered data is kept, so the same `pass` can be
    /// tried again.
    pub async fn pass(&mut self) -> Result<()> {
        self.spill_scratch();
        if self.queue.is_empty() {
            return Ok(());
        }

        let len = self.buffered_len;
        trace!(chunks = self.queue.len(), bytes = len, "Passing output to transport");
        self.transport
            .write_batch(&self.queue)
            .await
            .map_err(MuxError::Transport)?;

        let now = Instant::now();
        self.cool_down_if_idle(now);
        self.queue.clear();
        self.buffered_len = 0;
        self.bytes_written += len as u64;
        self.warm_bytes += len as u64;
        self.last_write = now;
        self.is_flushed = true;
        self.unflushed = true;
        self.warm_up_if_hot();
        Ok(())
    }

    /// Whether [`assure_flushed`](Self::assure_flushed) has work to do
    ///
    /// Stays true after a [`pass`](Self::pass) until the transport itself
    /// has been flushed, so output a buffering transport is still holding
    /// is not forgotten once the buffer is empty.
    pub fn needs_assure(&self) -> bool {
        self.pending() || !self.is_flushed || self.unflushed
    }

    /// Passes pending data and flushes the transport
    ///
    /// Does nothing if nothing was written since the last flush.
    pub async fn assure_flushed(&mut self) -> Result<()> {
        if !self.needs_assure() {
            return Ok(());
        }
        self.pass().await?;
        self.transport.flush().await.map_err(MuxError::Transport)?;
        self.unflushed = false;
        self.is_flushed = true;
        Ok(())
    }

    /// Counts bytes read from the connection
    pub fn record_read(&mut self, n: usize) {
        self.bytes_read += n as u64;
    }

    pub fn kind(&self) -> TransportKind {
        self.kind
    }

    pub fn is_buffering(&self) -> bool {
        self.buffer_output
    }

    /// Current scratch chunk size; zero when buffering is off
    pub fn write_size(&self) -> usize {
        self.write_size
    }

    pub fn is_warm(&self) -> bool {
        self.buffer_output && self.write_size == self.max_write_size
    }

    pub fn is_flushed(&self) -> bool {
        self.is_flushed
    }

    pub fn buffered_len(&self) -> usize {
        self.buffered_len
    }

    /// Chunks waiting in the queue, not counting the scratch area
    pub fn queued_chunks(&self) -> usize {
        self.queue.len()
    }

    pub fn scratch_len(&self) -> usize {
        self.scratch.as_ref().map_or(0, Scratch::len)
    }

    pub fn bytes_read(&self) -> u64 {
        self.bytes_read
    }

    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Unwraps the transport, dropping anything still buffered
    pub fn into_transport(self) -> T {
        self.transport
    }

    fn spill_scratch(&mut self) {
        if let Some(scratch) = self.scratch.as_mut() {
            if let Some(chunk) = scratch.take(self.write_size) {
                self.queue.push(chunk);
            }
        }
    }

    fn cool_down_if_idle(&mut self, now: Instant) {
        if self.cooldown.is_zero() || now.duration_since(self.last_write) < self.cooldown {
            return;
        }
        self.warm_bytes = 0;
        if self.write_size > self.initial_write_size {
            debug!(
                idle_ms = now.duration_since(self.last_write).as_millis() as u64,
                write_size = self.initial_write_size,
                "Connection went cold"
            );
            self.write_size = self.initial_write_size;
            if let Some(scratch) = self.scratch.as_mut() {
                scratch.resize(self.write_size);
            }
        }
    }

    fn warm_up_if_hot(&mut self) {
        if !self.buffer_output
            || self.write_size >= self.max_write_size
            || self.warm_bytes < self.warmup_size
        {
            return;
        }
        debug!(
            bytes = self.warm_bytes,
            write_size = self.max_write_size,
            "Connection warmed up"
        );
        self.write_size = self.max_write_size;
        if let Some(scratch) = self.scratch.as_mut() {
            scratch.resize(self.write_size);
        }
    }
}
