//! DMA channel capability.
//!
//! The driver uses a uDMA-style channel with a primary and an alternate
//! control descriptor. Transmit uses a single basic transfer on the primary
//! descriptor; receive chains primary (1 byte) and alternate (`S - 1` bytes)
//! in ping-pong mode so the capture can be cut after any byte.

/// Control descriptor selector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Descriptor {
    /// Primary control structure
    Primary,
    /// Alternate control structure
    Alternate,
}

/// Transfer direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    /// Peripheral register to memory (receive)
    DeviceToMemory,
    /// Memory to peripheral register (transmit)
    MemoryToDevice,
}

/// Transfer mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransferMode {
    /// Single-shot transfer
    Basic,
    /// Alternating primary/alternate descriptors
    PingPong,
}

/// One byte-unit transfer description
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Transfer {
    /// Source address (fixed for device-to-memory)
    pub src: usize,
    /// Destination address (fixed for memory-to-device)
    pub dst: usize,
    /// Number of byte units
    pub units: usize,
    /// Transfer direction
    pub direction: Direction,
    /// Transfer mode
    pub mode: TransferMode,
}

impl Transfer {
    /// Device-to-memory ping-pong leg writing `units` bytes at `dst`
    #[must_use]
    pub const fn rx_pingpong(data_reg: usize, dst: usize, units: usize) -> Self {
        Self {
            src: data_reg,
            dst,
            units,
            direction: Direction::DeviceToMemory,
            mode: TransferMode::PingPong,
        }
    }

    /// Single-shot memory-to-device transfer of `units` bytes from `src`
    #[must_use]
    pub const fn tx_basic(src: usize, data_reg: usize, units: usize) -> Self {
        Self {
            src,
            dst: data_reg,
            units,
            direction: Direction::MemoryToDevice,
            mode: TransferMode::Basic,
        }
    }
}

/// A single DMA channel as seen by the UART driver.
///
/// All methods are called with the port lock held and must not block.
pub trait DmaChannel {
    /// Channel number (used to reject TX/RX sharing one channel)
    fn channel(&self) -> u32;

    /// Apply the default channel configuration (called once at attach)
    fn configure(&mut self);

    /// Program one control descriptor
    fn setup_transfer(&mut self, descriptor: Descriptor, transfer: Transfer);

    /// Enable the channel and request the transfer
    fn start(&mut self);

    /// Disable the channel, freezing the remaining unit counts
    fn stop(&mut self);

    /// Units not yet transferred by a descriptor
    fn units_left(&self, descriptor: Descriptor) -> usize;

    /// Acknowledge this channel's completion interrupt.
    ///
    /// Returns `true` if the channel had signalled completion.
    fn ack_interrupt(&mut self) -> bool;
}

/// Channel type for ports without DMA.
///
/// Uninhabited: a `Uart<R, NoDma>` can only run in polled mode.
#[derive(Debug)]
pub enum NoDma {}

impl DmaChannel for NoDma {
    fn channel(&self) -> u32 {
        match *self {}
    }

    fn configure(&mut self) {
        match *self {}
    }

    fn setup_transfer(&mut self, _descriptor: Descriptor, _transfer: Transfer) {
        match *self {}
    }

    fn start(&mut self) {
        match *self {}
    }

    fn stop(&mut self) {
        match *self {}
    }

    fn units_left(&self, _descriptor: Descriptor) -> usize {
        match *self {}
    }

    fn ack_interrupt(&mut self) -> bool {
        match *self {}
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
