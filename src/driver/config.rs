//! Configuration types for the LM3S UART driver

use bitflags::bitflags;

use crate::hal::dma::{DmaChannel, NoDma};
use crate::internal::constants::{DEFAULT_BAUD, DEFAULT_MAX_BAUD};

// =============================================================================
// Line Configuration
// =============================================================================

/// Number of data bits per character
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DataBits {
    /// 5 data bits
    Five,
    /// 6 data bits
    Six,
    /// 7 data bits
    Seven,
    /// 8 data bits
    #[default]
    Eight,
}

/// Parity mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Parity {
    /// No parity bit
    #[default]
    None,
    /// Odd parity
    Odd,
    /// Even parity
    Even,
    /// Parity bit always 1
    Mark,
    /// Parity bit always 0
    Space,
}

/// Number of stop bits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StopBits {
    /// One stop bit
    #[default]
    One,
    /// Two stop bits
    Two,
}

bitflags! {
    /// Receive error reporting policy supplied by the line discipline.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct InputFlags: u8 {
        /// Report parity and framing errors on received bytes
        const CHECK_PARITY = 1 << 0;
        /// Report break conditions
        const REPORT_BREAK = 1 << 1;
        /// Discard bytes with parity or framing errors
        const IGNORE_PARITY = 1 << 2;
        /// Discard break conditions (with `IGNORE_PARITY`, overruns too)
        const IGNORE_BREAK = 1 << 3;
    }
}

/// Abstract line configuration requested by the line discipline.
///
/// # Example
///
/// ```ignore
/// let line = LineConfig::new()
///     .with_baud(115_200)
///     .with_parity(Parity::Even)
///     .with_input_flags(InputFlags::CHECK_PARITY);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineConfig {
    /// Requested baud rate (0 selects the default rate)
    pub baud: u32,
    /// Data bits per character
    pub data_bits: DataBits,
    /// Parity mode
    pub parity: Parity,
    /// Stop bits
    pub stop_bits: StopBits,
    /// Receive error policy
    pub input: InputFlags,
}

impl LineConfig {
    /// 9600 baud, 8 data bits, no parity, 1 stop bit, no error reporting
    #[must_use]
    pub const fn new() -> Self {
        Self {
            baud: DEFAULT_BAUD,
            data_bits: DataBits::Eight,
            parity: Parity::None,
            stop_bits: StopBits::One,
            input: InputFlags::empty(),
        }
    }

    /// Set the baud rate
    #[must_use]
    pub const fn with_baud(mut self, baud: u32) -> Self {
        self.baud = baud;
        self
    }

    /// Set the number of data bits
    #[must_use]
    pub const fn with_data_bits(mut self, data_bits: DataBits) -> Self {
        self.data_bits = data_bits;
        self
    }

    /// Set the parity mode
    #[must_use]
    pub const fn with_parity(mut self, parity: Parity) -> Self {
        self.parity = parity;
        self
    }

    /// Set the number of stop bits
    #[must_use]
    pub const fn with_stop_bits(mut self, stop_bits: StopBits) -> Self {
        self.stop_bits = stop_bits;
        self
    }

    /// Set the receive error policy
    #[must_use]
    pub const fn with_input_flags(mut self, input: InputFlags) -> Self {
        self.input = input;
        self
    }
}

impl Default for LineConfig {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Platform Configuration
// =============================================================================

/// DMA resources handed to a port at attach time.
///
/// Both buffers must live in DMA-reachable SRAM. The receive buffer is split
/// into two equal ping-pong slots.
pub struct DmaConfig<D: DmaChannel> {
    /// Channel used for transmit
    pub tx_channel: D,
    /// Channel used for receive
    pub rx_channel: D,
    /// Staging area the transmit engine copies ring data into
    pub tx_buffer: &'static mut [u8],
    /// Backing store for the two receive slots
    pub rx_buffer: &'static mut [u8],
}

/// Platform description of one UART instance.
///
/// # Example
///
/// ```ignore
/// let regs = unsafe { MmioUart::new(UART0_BASE, SYSCTL_RCGC1_UART0) };
/// let config = PortConfig::new(regs, 50_000_000).with_dma(DmaConfig {
///     tx_channel: udma.channel(9),
///     rx_channel: udma.channel(8),
///     tx_buffer: TX_STAGING.take(),
///     rx_buffer: RX_SLOTS.take(),
/// });
/// ```
pub struct PortConfig<R, D: DmaChannel = NoDma> {
    /// Register bank for this port
    pub regs: R,
    /// UART reference clock in Hz
    pub uart_clock_hz: u32,
    /// Highest baud rate that will be programmed. The clock bounds it
    /// further at `uart_clock_hz / 16`.
    pub max_baud: u32,
    /// DMA resources; `None` selects polled mode
    pub dma: Option<DmaConfig<D>>,
}

impl<R> PortConfig<R, NoDma> {
    /// Polled-mode port with the default maximum baud rate
    #[must_use]
    pub const fn new(regs: R, uart_clock_hz: u32) -> Self {
        Self {
            regs,
            uart_clock_hz,
            max_baud: DEFAULT_MAX_BAUD,
            dma: None,
        }
    }

    /// Switch the port to DMA mode
    #[must_use]
    pub fn with_dma<D: DmaChannel>(self, dma: DmaConfig<D>) -> PortConfig<R, D> {
        PortConfig {
            regs: self.regs,
            uart_clock_hz: self.uart_clock_hz,
            max_baud: self.max_baud,
            dma: Some(dma),
        }
    }
}

impl<R, D: DmaChannel> PortConfig<R, D> {
    /// Set the highest baud rate that will be programmed
    #[must_use]
    pub fn with_max_baud(mut self, max_baud: u32) -> Self {
        self.max_baud = max_baud;
        self
    }
}

// =============================================================================
// Port State
// =============================================================================

/// Transfer mode of a port, fixed at attach time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Mode {
    /// Interrupt per FIFO event, bytes moved by the CPU
    Polled,
    /// Bulk transfers through DMA channels
    Dma,
}

/// Port lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum State {
    /// Attached but not started (or shut down)
    #[default]
    Closed,
    /// Started: interrupts enabled, engines running
    Open,
}

// =============================================================================
// Unit Tests
// =============================================================================
