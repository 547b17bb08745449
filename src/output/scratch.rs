use bytes::{Bytes, BytesMut};

/// Bounded staging area that coalesces short writes into one chunk
///
/// The length never exceeds the capacity fixed when the scratch was last
/// emptied.
#[derive(Debug)]
pub struct Scratch {
    buf: BytesMut,
    capacity: usize,
}

impl Scratch {
    pub fn new(capacity: usize) -> Self {
        Self {
            buf: BytesMut::with_capacity(capacity),
            capacity,
        }
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn remaining(&self) -> usize {
        self.capacity - self.buf.len()
    }

    pub fn is_full(&self) -> bool {
        self.remaining() == 0
    }

    /// Copies as much of `data` as fits and returns how much that was
    pub fn push(&mut self, data: &[u8]) -> usize {
        let n = data.len().min(self.remaining());
        self.buf.extend_from_slice(&data[..n]);
        n
    }

    /// Empties the scratch, returning its contents
    ///
    /// The next fill is bounded by `next_capacity`.
    pub fn take(&mut self, next_capacity: usize) -> Option<Bytes> {
        self.capacity = next_capacity;
        if self.buf.is_empty() {
            return None;
        }
        let full = std::mem::replace(&mut self.buf, BytesMut::with_capacity(next_capacity));
        Some(full.freeze())
    }

    /// Changes the capacity of an empty scratch
    pub fn resize(&mut self, capacity: usize) {
        if self.buf.is_empty() {
            self.capacity = capacity;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_stops_at_capacity() {
        let mut scratch = Scratch::new(4);
        assert_eq!(scratch.push(b"ab"), 2);
        assert_eq!(scratch.push(b"cdef"), 2);
        assert!(scratch.is_full());
        assert_eq!(scratch.push(b"g"), 0);
        assert_eq!(scratch.len(), 4);
    }

    #[test]
    fn test_take_resets_with_new_capacity() {
        let mut scratch = Scratch::new(4);
        scratch.push(b"abcd");

        let chunk = scratch.take(8).unwrap();
        assert_eq!(&chunk[..], b"abcd");
        assert!(scratch.is_empty());
        assert_eq!(scratch.capacity(), 8);
        assert!(scratch.take(8).is_none());
    }

    #[test]
    fn test_resize_only_when_empty() {
        let mut scratch = Scratch::new(4);
        scratch.push(b"a");
        scratch.resize(2);
        assert_eq!(scratch.capacity(), 4);

        scratch.take(4);
        scratch.resize(2);
        assert_eq!(scratch.capacity(), 2);
    }
}
