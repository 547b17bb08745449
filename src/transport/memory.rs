use super::{Transport, TransportKind};
use async_trait::async_trait;
use bytes::Bytes;
use std::io;

/// In-memory transport that records every batch it is handed
///
/// Used by tests and benchmarks to observe what the output buffer writes.
/// It can be told to fail upcoming writes and flushes.
#[derive(Debug, Default)]
pub struct MemoryTransport {
    kind: TransportKind,
    batches: Vec<Vec<Bytes>>,
    flushes: usize,
    fail_writes: usize,
    fail_flushes: usize,
    fail_kind: Option<io::ErrorKind>,
}

impl MemoryTransport {
    pub fn new(kind: TransportKind) -> Self {
        Self {
            kind,
            ..Default::default()
        }
    }

    /// Makes the next `count` writes fail with `kind`
    pub fn fail_next_writes(&mut self, count: usize, kind: io::ErrorKind) {
        self.fail_writes = count;
        self.fail_kind = Some(kind);
    }

    /// Makes the next `count` flushes fail with `kind`
    pub fn fail_next_flushes(&mut self, count: usize, kind: io::ErrorKind) {
        self.fail_flushes = count;
        self.fail_kind = Some(kind);
    }

    /// Every successful batch, oldest first
    pub fn batches(&self) -> &[Vec<Bytes>] {
        &self.batches
    }

    /// Number of successful batch writes
    pub fn write_count(&self) -> usize {
        self.batches.len()
    }

    /// Number of successful flushes
    pub fn flush_count(&self) -> usize {
        self.flushes
    }

    /// All bytes written so far, concatenated
    pub fn written(&self) -> Vec<u8> {
        self.batches
            .iter()
            .flatten()
            .flat_map(|chunk| chunk.iter().copied())
            .collect()
    }

    fn injected_error(&self, what: &str) -> io::Error {
        let kind = self.fail_kind.unwrap_or(io::ErrorKind::BrokenPipe);
        io::Error::new(kind, format!("injected {what} failure"))
    }
}

#[async_trait]
impl Transport for MemoryTransport {
    fn kind(&self) -> TransportKind {
        self.kind
    }

    async fn write_batch(&mut self, chunks: &[Bytes]) -> io::Result<()> {
        if self.fail_writes > 0 {
            self.fail_writes -= 1;
            return Err(self.injected_error("write"));
        }
        self.batches.push(chunks.to_vec());
        Ok(())
    }

    async fn flush(&mut self) -> io::Result<()> {
        if self.fail_flushes > 0 {
            self.fail_flushes -= 1;
            return Err(self.injected_error("flush"));
        }
        self.flushes += 1;
        Ok(())
    }
}
