//! Circular transmit buffer shared by the producer and the transmit engine.

/// Fixed-capacity circular byte buffer with power-of-two wraparound.
///
/// `head` is advanced only by the producer, `tail` only by the transmit
/// engine; both stay in `0..N`. Equal indices mean empty, so at most `N - 1`
/// bytes can be pending. There is no internal locking: the owning port holds
/// the port lock around every operation visible to the interrupt path.
pub struct RingBuffer<const N: usize> {
    /// Backing storage
    buf: [u8; N],
    /// Next slot the producer writes
    head: usize,
    /// Next slot the consumer reads
    tail: usize,
}

impl<const N: usize> RingBuffer<N> {
    const MASK: usize = {
        assert!(N.is_power_of_two(), "ring size must be a power of two");
        N - 1
    };

    /// Create an empty ring
    #[must_use]
    pub const fn new() -> Self {
        Self {
            buf: [0; N],
            head: 0,
            tail: 0,
        }
    }

    /// Number of bytes that can be pending at once
    #[inline(always)]
    #[must_use]
    pub const fn capacity(&self) -> usize {
        Self::MASK
    }

    /// Number of bytes waiting to be transmitted
    #[inline(always)]
    #[must_use]
    pub const fn pending_count(&self) -> usize {
        self.head.wrapping_sub(self.tail) & Self::MASK
    }

    /// Number of bytes the producer may still enqueue
    #[inline(always)]
    #[must_use]
    pub const fn free_count(&self) -> usize {
        Self::MASK - self.pending_count()
    }

    /// Check if nothing is pending
    #[inline(always)]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.head == self.tail
    }

    /// Check if the producer must stop
    #[inline(always)]
    #[must_use]
    pub const fn is_full(&self) -> bool {
        self.pending_count() == Self::MASK
    }

    /// Enqueue one byte, returning `false` when the ring is full
    pub fn try_enqueue(&mut self, byte: u8) -> bool {
        if self.is_full() {
            return false;
        }
        self.buf[self.head] = byte;
        self.head = (self.head + 1) & Self::MASK;
        true
    }

    /// Enqueue as many bytes of `data` as fit, returning the accepted count
    pub fn enqueue_slice(&mut self, data: &[u8]) -> usize {
        let mut accepted = 0;
        while accepted < data.len() {
            // Largest run that fits before the physical end or before full
            let to_end = N - self.head;
            let run = to_end.min(self.free_count()).min(data.len() - accepted);
            if run == 0 {
                break;
            }
            self.buf[self.head..self.head + run].copy_from_slice(&data[accepted..accepted + run]);
            self.head = (self.head + run) & Self::MASK;
            accepted += run;
        }
        accepted
    }

    /// Remove and return the oldest pending byte
    pub fn dequeue(&mut self) -> Option<u8> {
        if self.is_empty() {
            return None;
        }
        let byte = self.buf[self.tail];
        self.tail = (self.tail + 1) & Self::MASK;
        Some(byte)
    }

    /// Pending bytes readable without wrapping past the end of storage
    #[inline]
    #[must_use]
    pub const fn contiguous_pending(&self) -> usize {
        let to_end = N - self.tail;
        let pending = self.pending_count();
        if pending < to_end { pending } else { to_end }
    }

    /// Dequeue up to `n` bytes as one contiguous slice.
    ///
    /// The slice stops at the physical end of storage, so fewer than `n`
    /// bytes may be returned even when more are pending.
    pub fn dequeue_up_to(&mut self, n: usize) -> &[u8] {
        let len = self.contiguous_pending().min(n);
        let start = self.tail;
        self.tail = (self.tail + len) & Self::MASK;
        &self.buf[start..start + len]
    }

    /// Discard everything pending
    pub fn clear(&mut self) {
        self.tail = self.head;
    }
}

impl<const N: usize> Default for RingBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Tests
// =============================================================================
