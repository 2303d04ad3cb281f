//! Transmit engine.
//!
//! Moves bytes from the transmit ring to the hardware, either by pushing
//! them into the TX FIFO from the interrupt handler (polled mode) or by
//! staging one contiguous run at a time for a single-shot DMA transfer.
//!
//! ```text
//!            kick() with data
//!   Idle  ─────────────────────▶  Active
//!    ▲                              │
//!    └──── ring drained / stop() ───┘
//! ```
//!
//! All methods run with the port lock held.

use super::counters::PortCounters;
use crate::hal::dma::{Descriptor, DmaChannel, Transfer};
use crate::hal::registers::UartRegisters;
use crate::internal::constants::WAKEUP_CHARS;
use crate::internal::register::uart::{
    UARTDR_OFFSET, UARTFR_OFFSET, UARTFR_TXFF, UARTIM_OFFSET, UARTINT_TX,
};
use crate::internal::ring::RingBuffer;

/// Transmit engine state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TxState {
    /// Nothing pending and nothing owed to the hardware
    #[default]
    Idle,
    /// FIFO refill armed or a DMA transfer outstanding
    Active,
}

/// DMA resources owned by the transmit engine
pub struct TxDma<D: DmaChannel> {
    channel: D,
    staging: &'static mut [u8],
}

impl<D: DmaChannel> TxDma<D> {
    /// Pair a channel with its DMA-visible staging area
    pub fn new(channel: D, staging: &'static mut [u8]) -> Self {
        Self { channel, staging }
    }

    /// Largest run moved per transfer
    #[inline]
    pub fn capacity(&self) -> usize {
        self.staging.len()
    }

    /// The underlying channel
    #[inline]
    pub fn channel_mut(&mut self) -> &mut D {
        &mut self.channel
    }

    /// Give back the channel and staging area
    pub fn release(self) -> (D, &'static mut [u8]) {
        (self.channel, self.staging)
    }
}

/// Ring buffer plus the Idle/Active transmit state machine.
pub struct TransmitEngine<const N: usize> {
    ring: RingBuffer<N>,
    state: TxState,
    /// Transmission held off by the line discipline (flow control)
    stopped: bool,
    /// High-priority character sent ahead of ring data
    x_char: Option<u8>,
    /// Pending count dropped below the low-water mark since last taken
    wakeup: bool,
    /// Bytes in the outstanding DMA transfer; non-zero means busy
    in_flight: usize,
}

impl<const N: usize> TransmitEngine<N> {
    /// Idle engine with an empty ring
    #[must_use]
    pub const fn new() -> Self {
        Self {
            ring: RingBuffer::new(),
            state: TxState::Idle,
            stopped: false,
            x_char: None,
            wakeup: false,
            in_flight: 0,
        }
    }

    /// Current state
    #[inline]
    pub fn state(&self) -> TxState {
        self.state
    }

    /// Transmit ring
    #[inline]
    pub fn ring(&self) -> &RingBuffer<N> {
        &self.ring
    }

    /// Check if a DMA transfer is outstanding
    #[inline]
    pub fn is_busy(&self) -> bool {
        self.in_flight != 0
    }

    /// Check if transmission is held off
    #[inline]
    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// Bytes in the outstanding DMA transfer
    #[inline]
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Enqueue as much of `data` as fits, returning the accepted count
    pub fn enqueue(&mut self, data: &[u8]) -> usize {
        self.ring.enqueue_slice(data)
    }

    /// Queue a high-priority character, replacing any not yet sent
    pub fn set_x_char(&mut self, ch: u8) {
        self.x_char = Some(ch);
    }

    /// Hold off or release transmission
    pub fn set_stopped(&mut self, stopped: bool) {
        self.stopped = stopped;
    }

    /// Consume the low-water wakeup latch
    pub fn take_wakeup(&mut self) -> bool {
        core::mem::take(&mut self.wakeup)
    }

    fn note_low_water(&mut self) {
        if self.ring.pending_count() < WAKEUP_CHARS {
            self.wakeup = true;
        }
    }

    fn send_x_char<R: UartRegisters>(&mut self, regs: &mut R, counters: &mut PortCounters) {
        if let Some(ch) = self.x_char
            && regs.read(UARTFR_OFFSET) & UARTFR_TXFF == 0
        {
            regs.write(UARTDR_OFFSET, u32::from(ch));
            self.x_char = None;
            counters.add_tx(1);
        }
    }

    // =========================================================================
    // Polled mode
    // =========================================================================

    /// Refill the TX FIFO from the ring.
    ///
    /// Returns the number of ring bytes written to the FIFO.
    pub fn kick_polled<R: UartRegisters>(
        &mut self,
        regs: &mut R,
        counters: &mut PortCounters,
    ) -> usize {
        self.send_x_char(regs, counters);

        if self.ring.is_empty() || self.stopped {
            regs.clear_bits(UARTIM_OFFSET, UARTINT_TX);
            self.state = TxState::Idle;
            return 0;
        }

        // FIFO status is checked before ring emptiness on every byte
        let mut pushed = 0;
        while regs.read(UARTFR_OFFSET) & UARTFR_TXFF == 0 {
            let Some(byte) = self.ring.dequeue() else {
                break;
            };
            regs.write(UARTDR_OFFSET, u32::from(byte));
            pushed += 1;
        }
        counters.add_tx(pushed);
        self.note_low_water();

        if self.ring.is_empty() {
            regs.clear_bits(UARTIM_OFFSET, UARTINT_TX);
            self.state = TxState::Idle;
        } else {
            regs.set_bits(UARTIM_OFFSET, UARTINT_TX);
            self.state = TxState::Active;
        }

        #[cfg(feature = "defmt")]
        defmt::trace!(
            "tx polled: pushed {}, pending {}",
            pushed,
            self.ring.pending_count()
        );

        pushed
    }

    // =========================================================================
    // DMA mode
    // =========================================================================

    /// Start a DMA transfer of the next contiguous run, unless one is
    /// already outstanding.
    ///
    /// Returns the number of bytes handed to the channel.
    pub fn kick_dma<R: UartRegisters, D: DmaChannel>(
        &mut self,
        regs: &mut R,
        dma: &mut TxDma<D>,
        counters: &mut PortCounters,
    ) -> usize {
        if self.is_busy() {
            return 0;
        }

        self.send_x_char(regs, counters);

        if self.ring.is_empty() || self.stopped {
            dma.channel.stop();
            self.state = TxState::Idle;
            return 0;
        }

        let run = self.ring.dequeue_up_to(dma.staging.len());
        let len = run.len();
        dma.staging[..len].copy_from_slice(run);

        let transfer =
            Transfer::tx_basic(dma.staging.as_ptr() as usize, regs.data_register_addr(), len);
        dma.channel.setup_transfer(Descriptor::Primary, transfer);
        dma.channel.start();
        self.in_flight = len;
        self.state = TxState::Active;
        self.note_low_water();

        #[cfg(feature = "defmt")]
        defmt::trace!("tx dma: started {} bytes, pending {}", len, self.ring.pending_count());

        len
    }

    /// Account for a finished DMA transfer and start the next one.
    pub fn complete_dma<R: UartRegisters, D: DmaChannel>(
        &mut self,
        regs: &mut R,
        dma: &mut TxDma<D>,
        counters: &mut PortCounters,
    ) -> usize {
        counters.add_tx(core::mem::take(&mut self.in_flight));
        self.kick_dma(regs, dma, counters)
    }

    // =========================================================================
    // Stop
    // =========================================================================

    /// Cancel transmission in polled mode. Bytes already in the FIFO still
    /// go out.
    pub fn stop_polled<R: UartRegisters>(&mut self, regs: &mut R) {
        regs.clear_bits(UARTIM_OFFSET, UARTINT_TX);
        self.state = TxState::Idle;
    }

    /// Cancel the outstanding DMA transfer. Its bytes are abandoned.
    pub fn stop_dma<D: DmaChannel>(&mut self, dma: &mut TxDma<D>) {
        dma.channel.stop();
        self.in_flight = 0;
        self.state = TxState::Idle;
    }

    /// Drop all queued data and return to Idle (port shutdown)
    pub fn reset(&mut self) {
        self.ring.clear();
        self.state = TxState::Idle;
        self.x_char = None;
        self.wakeup = false;
        self.in_flight = 0;
    }
}

impl<const N: usize> Default for TransmitEngine<N> {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
