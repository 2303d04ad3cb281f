//! Double-buffered receive slots for DMA capture.
//!
//! One slot is always *landing* (owned by the DMA channel), the other is
//! *ready* (holding the last capture). While a delivery task runs, the ready
//! slot is lent out to it, so the pair cannot swap until it comes back.

/// Captured bytes lent to the deferred delivery task.
///
/// Obtained from [`Uart::begin_rx_work`](crate::Uart::begin_rx_work) and
/// handed back through [`Uart::finish_rx_work`](crate::Uart::finish_rx_work).
///
/// Work that is dropped instead of returned stalls DMA receive until the
/// next [`Uart::startup`](crate::Uart::startup), which reclaims the slot.
/// Data read from work held across a restart is stale.
#[must_use = "return the capture with `Uart::finish_rx_work`"]
pub struct RxWork {
    slot: &'static mut [u8],
    len: usize,
    epoch: u32,
}

impl RxWork {
    /// Captured bytes
    #[inline]
    #[must_use]
    pub fn data(&self) -> &[u8] {
        &self.slot[..self.len]
    }

    /// Number of captured bytes
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check if the capture is empty (never true for scheduled work)
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl core::fmt::Debug for RxWork {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RxWork").field("len", &self.len).finish()
    }
}

/// Landing/ready slot pair of equal size `S`.
pub struct PingPong {
    /// Slot currently written by the DMA channel
    landing: &'static mut [u8],
    /// Slot awaiting delivery; `None` while lent to the delivery task
    ready: Option<&'static mut [u8]>,
    /// Delivery task scheduled or running
    busy: bool,
    /// Bytes captured in the ready slot at the last swap
    pending: usize,
    /// Address and length of the lent slot
    lent: Option<(usize, usize)>,
    /// Bumped whenever a lent slot is reclaimed
    epoch: u32,
}

impl PingPong {
    /// Split one DMA buffer into two equal slots.
    ///
    /// An odd trailing byte is left unused.
    pub fn split(buffer: &'static mut [u8]) -> Self {
        let half = buffer.len() / 2;
        let (a, rest) = buffer.split_at_mut(half);
        let (b, _) = rest.split_at_mut(half);
        Self {
            landing: a,
            ready: Some(b),
            busy: false,
            pending: 0,
            lent: None,
            epoch: 0,
        }
    }

    /// Size of each slot
    #[inline(always)]
    pub fn slot_size(&self) -> usize {
        self.landing.len()
    }

    /// Check if a delivery task is scheduled or running
    #[inline(always)]
    pub fn is_busy(&self) -> bool {
        self.busy
    }

    /// Check if scheduled work is waiting to be lent
    #[inline(always)]
    pub fn has_work(&self) -> bool {
        self.busy && self.ready.is_some()
    }

    /// Address of byte `offset` of the landing slot (DMA destination)
    #[inline(always)]
    pub fn landing_addr(&mut self, offset: usize) -> usize {
        self.landing[offset..].as_mut_ptr() as usize
    }

    /// Exchange the landing and ready roles.
    ///
    /// Returns `false` when the ready slot is lent out.
    pub fn swap(&mut self) -> bool {
        match self.ready.as_mut() {
            Some(ready) => {
                core::mem::swap(&mut self.landing, ready);
                true
            }
            None => false,
        }
    }

    /// Record `len` captured bytes in the ready slot and mark the pair busy
    pub fn schedule(&mut self, len: usize) {
        self.pending = len;
        self.busy = true;
    }

    /// Lend the ready slot to the delivery task.
    ///
    /// Returns `None` if nothing is scheduled or the slot is already lent.
    pub fn lend(&mut self) -> Option<RxWork> {
        if !self.busy {
            return None;
        }
        let slot = self.ready.take()?;
        self.lent = Some((slot.as_mut_ptr() as usize, slot.len()));
        Some(RxWork {
            slot,
            len: self.pending,
            epoch: self.epoch,
        })
    }

    /// Take back a lent slot and clear the busy flag.
    ///
    /// Returns the number of bytes the task delivered, or 0 for work lent
    /// before the last [`reset`](Self::reset), whose slot was already
    /// reclaimed.
    pub fn restore(&mut self, work: RxWork) -> usize {
        if work.epoch != self.epoch {
            return 0;
        }
        debug_assert!(self.ready.is_none(), "ready slot restored twice");
        self.ready = Some(work.slot);
        self.lent = None;
        self.pending = 0;
        self.busy = false;
        work.len
    }

    /// Drop any scheduled delivery.
    ///
    /// A slot still lent out is reclaimed, so work dropped by the delivery
    /// task cannot wedge the pair. Outstanding work becomes stale.
    pub fn reset(&mut self) {
        if self.ready.is_none()
            && let Some((addr, len)) = self.lent.take()
        {
            // SAFETY: (addr, len) came from the 'static slot handed out by
            // `lend`. The RxWork holding it was dropped or is now stale, and
            // `restore` refuses stale work, so the slot has one owner again.
            let slot = unsafe { core::slice::from_raw_parts_mut(addr as *mut u8, len) };
            self.ready = Some(slot);
            self.epoch = self.epoch.wrapping_add(1);
        }
        self.busy = false;
        self.pending = 0;
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use std::boxed::Box;
    use std::vec;

    fn leak(len: usize) -> &'static mut [u8] {
        Box::leak(vec![0u8; len].into_boxed_slice())
    }

    #[test]
    fn split_produces_equal_slots() {
        let pp = PingPong::split(leak(64));
        assert_eq!(pp.slot_size(), 32);
        assert!(!pp.is_busy());
    }

    #[test]
    fn split_ignores_odd_trailing_byte() {
        let pp = PingPong::split(leak(9));
        assert_eq!(pp.slot_size(), 4);
    }

    #[test]
    fn swap_exchanges_landing_address() {
        let mut pp = PingPong::split(leak(16));
        let first = pp.landing_addr(0);
        assert!(pp.swap());
        let second = pp.landing_addr(0);
        assert_eq!(second, first + 8);
        assert!(pp.swap());
        assert_eq!(pp.landing_addr(0), first);
    }

    #[test]
    fn lend_requires_schedule() {
        let mut pp = PingPong::split(leak(16));
        assert!(pp.lend().is_none());

        pp.schedule(3);
        let work = pp.lend().unwrap();
        assert_eq!(work.len(), 3);
        assert!(pp.is_busy());

        // Lent slot blocks both a second lend and a swap
        assert!(pp.lend().is_none());
        assert!(!pp.swap());

        assert_eq!(pp.restore(work), 3);
        assert!(!pp.is_busy());
        assert!(pp.swap());
    }

    #[test]
    fn lent_work_exposes_captured_prefix() {
        let mut pp = PingPong::split(leak(8));
        let addr = pp.landing_addr(0);
        // SAFETY: addr points at the 4-byte landing slot owned by `pp`.
        unsafe {
            core::ptr::copy_nonoverlapping(b"hi!".as_ptr(), addr as *mut u8, 3);
        }
        assert!(pp.swap());
        pp.schedule(3);

        let work = pp.lend().unwrap();
        assert_eq!(work.data(), b"hi!");
        pp.restore(work);
    }

    #[test]
    fn reset_clears_scheduled_work() {
        let mut pp = PingPong::split(leak(8));
        pp.schedule(2);
        pp.reset();
        assert!(!pp.is_busy());
        assert!(pp.lend().is_none());
    }

    #[test]
    fn reset_reclaims_dropped_work() {
        let mut pp = PingPong::split(leak(8));
        pp.schedule(2);
        drop(pp.lend().unwrap());
        assert!(!pp.swap());

        pp.reset();
        assert!(!pp.is_busy());
        assert!(pp.swap());

        pp.schedule(1);
        let work = pp.lend().unwrap();
        assert_eq!(work.len(), 1);
        assert_eq!(pp.restore(work), 1);
    }

    #[test]
    fn work_lent_before_reset_is_refused() {
        let mut pp = PingPong::split(leak(8));
        pp.schedule(2);
        let stale = pp.lend().unwrap();

        pp.reset();
        assert_eq!(pp.restore(stale), 0);

        // The reclaimed slot is lendable exactly once
        pp.schedule(3);
        let work = pp.lend().unwrap();
        assert!(pp.lend().is_none());
        assert_eq!(pp.restore(work), 3);
        assert!(pp.swap());
    }
}
