//! Receive engine.
//!
//! Polled mode drains the RX FIFO from the interrupt handler, classifying
//! each byte's error bits. DMA mode captures into a ping-pong slot pair and
//! hands full (or timed-out partial) slots to a deferred delivery task.

use bitflags::bitflags;

use super::counters::PortCounters;
use crate::hal::dma::{Descriptor, DmaChannel, Transfer};
use crate::hal::registers::UartRegisters;
use crate::internal::constants::{RX_BATCH_SIZE, RX_POLL_LIMIT};
use crate::internal::pingpong::{PingPong, RxWork};
use crate::internal::register::uart::{
    UARTDR_BE, UARTDR_DATA_MASK, UARTDR_FE, UARTDR_OE, UARTDR_OFFSET, UARTDR_PE, UARTFR_OFFSET,
    UARTFR_RXFE,
};

// =============================================================================
// Status and Flags
// =============================================================================

bitflags! {
    /// Error bits attached to a received character (upper bits of `UARTDR`).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct RxStatus: u32 {
        /// Framing error
        const FRAMING = UARTDR_FE;
        /// Parity error
        const PARITY = UARTDR_PE;
        /// Break condition
        const BREAK = UARTDR_BE;
        /// FIFO overrun
        const OVERRUN = UARTDR_OE;
    }
}

/// Per-byte flag delivered to the line discipline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RxFlag {
    /// Received without error
    #[default]
    Normal,
    /// Break condition
    Break,
    /// Parity error
    Parity,
    /// Framing error
    Frame,
    /// Marker inserted after a byte that overran the FIFO
    Overrun,
}

/// Flags accompanying one delivery
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RxFlags<'a> {
    /// Every byte is [`RxFlag::Normal`]
    Normal,
    /// One flag per delivered byte
    PerByte(&'a [RxFlag]),
}

impl RxFlags<'_> {
    /// Flag of byte `index`
    #[must_use]
    pub fn get(&self, index: usize) -> RxFlag {
        match self {
            RxFlags::Normal => RxFlag::Normal,
            RxFlags::PerByte(flags) => flags.get(index).copied().unwrap_or_default(),
        }
    }
}

// =============================================================================
// Line Discipline Interface
// =============================================================================

/// Consumer of received data and transmit wakeups.
pub trait SerialClient {
    /// Deliver received bytes
    fn receive(&mut self, data: &[u8], flags: RxFlags<'_>);

    /// Offer a break condition for special handling.
    ///
    /// Returning `true` consumes the break byte.
    fn handle_break(&mut self) -> bool {
        false
    }

    /// Transmit ring dropped below the low-water mark
    fn write_wakeup(&mut self);
}

// =============================================================================
// Polled Receive
// =============================================================================

/// Fixed-size batch of bytes and flags awaiting delivery
struct Batch {
    data: [u8; RX_BATCH_SIZE],
    flags: [RxFlag; RX_BATCH_SIZE],
    len: usize,
    flagged: bool,
}

impl Batch {
    const fn new() -> Self {
        Self {
            data: [0; RX_BATCH_SIZE],
            flags: [RxFlag::Normal; RX_BATCH_SIZE],
            len: 0,
            flagged: false,
        }
    }

    fn push<C: SerialClient>(&mut self, client: &mut C, byte: u8, flag: RxFlag) {
        // Unreachable within one drain; keeps push total
        if self.len == RX_BATCH_SIZE {
            self.flush(client);
        }
        self.data[self.len] = byte;
        self.flags[self.len] = flag;
        self.flagged |= flag != RxFlag::Normal;
        self.len += 1;
    }

    fn flush<C: SerialClient>(&mut self, client: &mut C) {
        if self.len == 0 {
            return;
        }
        let flags = if self.flagged {
            RxFlags::PerByte(&self.flags[..self.len])
        } else {
            RxFlags::Normal
        };
        client.receive(&self.data[..self.len], flags);
        self.len = 0;
        self.flagged = false;
    }
}

/// Record one byte's primary error class.
///
/// Returns `true` if the byte was consumed by the break hook.
fn classify<C: SerialClient>(raw: RxStatus, counters: &mut PortCounters, client: &mut C) -> bool {
    if raw.contains(RxStatus::BREAK) {
        counters.brk = counters.brk.wrapping_add(1);
        return client.handle_break();
    }
    if raw.contains(RxStatus::PARITY) {
        counters.parity = counters.parity.wrapping_add(1);
    } else if raw.contains(RxStatus::OVERRUN) {
        counters.overrun = counters.overrun.wrapping_add(1);
    } else if raw.contains(RxStatus::FRAMING) {
        counters.frame = counters.frame.wrapping_add(1);
    }
    false
}

fn flag_for(status: RxStatus) -> RxFlag {
    if status.contains(RxStatus::BREAK) {
        RxFlag::Break
    } else if status.contains(RxStatus::PARITY) {
        RxFlag::Parity
    } else if status.contains(RxStatus::FRAMING) {
        RxFlag::Frame
    } else {
        RxFlag::Normal
    }
}

/// Drain the RX FIFO and deliver what it held.
///
/// Reads at most [`RX_POLL_LIMIT`] characters. Returns the number read.
pub fn drain_polled<R: UartRegisters, C: SerialClient>(
    regs: &mut R,
    read_mask: RxStatus,
    ignore_mask: RxStatus,
    counters: &mut PortCounters,
    client: &mut C,
) -> usize {
    let mut batch = Batch::new();
    let mut read = 0;

    while read < RX_POLL_LIMIT && regs.read(UARTFR_OFFSET) & UARTFR_RXFE == 0 {
        let word = regs.read(UARTDR_OFFSET);
        read += 1;
        counters.add_rx(1);

        let ch = (word & UARTDR_DATA_MASK) as u8;
        let raw = RxStatus::from_bits_truncate(word);

        if !raw.is_empty() && classify(raw, counters, client) {
            continue;
        }

        let status = raw & read_mask;
        if (status & ignore_mask).difference(RxStatus::OVERRUN).is_empty() {
            batch.push(client, ch, flag_for(status));
        }
        if status.contains(RxStatus::OVERRUN) && !ignore_mask.contains(RxStatus::OVERRUN) {
            batch.push(client, 0, RxFlag::Overrun);
        }
    }

    batch.flush(client);

    #[cfg(feature = "defmt")]
    defmt::trace!("rx polled: {} chars", read);

    read
}

// =============================================================================
// DMA Receive
// =============================================================================

/// RX DMA channel and its ping-pong slots.
pub struct RxDma<D: DmaChannel> {
    channel: D,
    slots: PingPong,
}

impl<D: DmaChannel> RxDma<D> {
    /// Pair a channel with the buffer its two slots are carved from
    pub fn new(channel: D, buffer: &'static mut [u8]) -> Self {
        Self {
            channel,
            slots: PingPong::split(buffer),
        }
    }

    /// Size of each slot
    #[inline]
    pub fn slot_size(&self) -> usize {
        self.slots.slot_size()
    }

    /// Check if a delivery is scheduled or running
    #[inline]
    pub fn is_busy(&self) -> bool {
        self.slots.is_busy()
    }

    /// Check if a capture is waiting for the delivery task to pick it up
    #[inline]
    pub fn has_work(&self) -> bool {
        self.slots.has_work()
    }

    /// The underlying channel
    #[inline]
    pub fn channel_mut(&mut self) -> &mut D {
        &mut self.channel
    }

    /// Give back the channel
    pub fn release(self) -> D {
        self.channel
    }

    /// Program the chained descriptor pair on the landing slot and start.
    ///
    /// Primary takes byte 0 and alternate bytes `1..S`, so a capture can be
    /// cut after any byte and still be counted exactly.
    pub fn arm<R: UartRegisters>(&mut self, regs: &R) {
        let data_reg = regs.data_register_addr();
        let size = self.slots.slot_size();
        let first = self.slots.landing_addr(0);
        let rest = self.slots.landing_addr(1);

        self.channel
            .setup_transfer(Descriptor::Primary, Transfer::rx_pingpong(data_reg, first, 1));
        self.channel
            .setup_transfer(Descriptor::Alternate, Transfer::rx_pingpong(data_reg, rest, size - 1));
        self.channel.start();
    }

    /// Cut the current capture and schedule it for delivery.
    ///
    /// No-op while a delivery is in flight. Returns `true` if new work was
    /// scheduled.
    pub fn service<R: UartRegisters>(&mut self, regs: &R) -> bool {
        if self.slots.is_busy() {
            #[cfg(feature = "defmt")]
            defmt::trace!("rx dma: delivery in flight");
            return false;
        }

        self.channel.stop();
        if !self.slots.swap() {
            return false;
        }

        let left = self.channel.units_left(Descriptor::Primary)
            + self.channel.units_left(Descriptor::Alternate);
        let captured = self.slots.slot_size().saturating_sub(left);

        // Re-arm before anything else to keep the capture gap short
        self.arm(regs);

        #[cfg(feature = "defmt")]
        defmt::trace!("rx dma: captured {}", captured);

        if captured > 0 {
            self.slots.schedule(captured);
            true
        } else {
            false
        }
    }

    /// Lend the captured slot to the delivery task
    pub fn begin_work(&mut self) -> Option<RxWork> {
        self.slots.lend()
    }

    /// Take the slot back, returning how many bytes it carried
    pub fn finish_work(&mut self, work: RxWork) -> usize {
        self.slots.restore(work)
    }

    /// Stop capturing
    pub fn stop(&mut self) {
        self.channel.stop();
    }

    /// Stop capturing and forget any scheduled delivery
    pub fn reset(&mut self) {
        self.channel.stop();
        self.slots.reset();
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
