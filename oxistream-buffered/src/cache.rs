//! Cache bookkeeping shared by the blocking and suspending buffered streams.
//!
//! The caches only track bytes and cursors. All I/O against the underlying
//! stream is done by the stream types, so the same bookkeeping serves both
//! execution modes.

/// Read-ahead window: bytes read from the underlying stream but not yet
/// consumed by the caller.
///
/// Invariant: `start <= end <= buf.len()`. Bytes `buf[start..end]` are
/// unconsumed.
#[derive(Debug)]
pub(crate) struct ReadCache {
    buf: Box<[u8]>,
    start: usize,
    end: usize,
}

impl ReadCache {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            buf: vec![0u8; capacity].into_boxed_slice(),
            start: 0,
            end: 0,
        }
    }

    #[inline]
    pub(crate) fn capacity(&self) -> usize {
        self.buf.len()
    }

    /// Number of unconsumed bytes.
    #[inline]
    pub(crate) fn available(&self) -> usize {
        self.end - self.start
    }

    #[inline]
    pub(crate) fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Copy unconsumed bytes into `out`, returning how many were copied.
    pub(crate) fn consume_into(&mut self, out: &mut [u8]) -> usize {
        let n = out.len().min(self.available());
        out[..n].copy_from_slice(&self.buf[self.start..self.start + n]);
        self.start += n;
        n
    }

    /// Discard every unconsumed byte.
    #[inline]
    pub(crate) fn invalidate(&mut self) {
        self.start = 0;
        self.end = 0;
    }

    /// Empty the window and hand out the region a refill of at most `max`
    /// bytes should be read into. Follow with [`ReadCache::set_filled`].
    pub(crate) fn fill_target(&mut self, max: usize) -> &mut [u8] {
        self.invalidate();
        let len = max.min(self.buf.len());
        &mut self.buf[..len]
    }

    /// Record that a refill produced `count` bytes.
    #[inline]
    pub(crate) fn set_filled(&mut self, count: usize) {
        debug_assert!(count <= self.buf.len());
        self.start = 0;
        self.end = count;
    }

    /// Free the storage. The cache is unusable afterwards.
    pub(crate) fn release(&mut self) {
        self.invalidate();
        self.buf = Box::default();
    }
}

/// Write-back staging area: bytes accepted from the caller but not yet
/// written to the underlying stream.
///
/// Invariant: `len <= buf.len()`. Bytes `buf[..len]` are pending, in the order
/// they were written.
#[derive(Debug)]
pub(crate) struct WriteCache {
    buf: Box<[u8]>,
    len: usize,
}

impl WriteCache {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            buf: vec![0u8; capacity].into_boxed_slice(),
            len: 0,
        }
    }

    #[inline]
    pub(crate) fn capacity(&self) -> usize {
        self.buf.len()
    }

    /// Number of pending bytes.
    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub(crate) fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub(crate) fn is_full(&self) -> bool {
        self.len == self.buf.len()
    }

    /// Number of bytes [`WriteCache::push`] would accept from a long slice.
    #[inline]
    pub(crate) fn space(&self) -> usize {
        self.buf.len() - self.len
    }

    #[inline]
    pub(crate) fn pending(&self) -> &[u8] {
        &self.buf[..self.len]
    }

    /// Append as much of `data` as fits, returning how much was accepted.
    pub(crate) fn push(&mut self, data: &[u8]) -> usize {
        let n = data.len().min(self.space());
        self.buf[self.len..self.len + n].copy_from_slice(&data[..n]);
        self.len += n;
        n
    }

    /// Drop the first `count` pending bytes after the underlying stream
    /// accepted them, keeping the rest in order.
    pub(crate) fn consume(&mut self, count: usize) {
        debug_assert!(count <= self.len);
        self.buf.copy_within(count..self.len, 0);
        self.len -= count;
    }

    /// Free the storage. The cache is unusable afterwards.
    pub(crate) fn release(&mut self) {
        self.len = 0;
        self.buf = Box::default();
    }
}
