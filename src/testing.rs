//! Testing utilities and mock implementations
//!
//! This module provides mock implementations for testing the UART driver
//! on the host without hardware access.
//!
//! Only available when running `cargo test`.

// Note: The #[cfg(test)] attribute is applied in lib.rs where this module is declared
#![allow(missing_docs)]
#![allow(clippy::std_instead_of_core, clippy::std_instead_of_alloc)]

extern crate std;

use core::cell::RefCell;
use std::boxed::Box;
use std::collections::{BTreeMap, VecDeque};
use std::rc::Rc;
use std::vec;
use std::vec::Vec;

use crate::driver::rx::{RxFlag, RxFlags, SerialClient};
use crate::hal::dma::{Descriptor, DmaChannel, Transfer};
use crate::hal::registers::UartRegisters;
use crate::internal::constants::FIFO_DEPTH;
use crate::internal::register::uart::{
    UARTCTL_OFFSET, UARTCTL_RXE, UARTCTL_TXE, UARTDR_OFFSET, UARTFR_BUSY, UARTFR_OFFSET,
    UARTFR_RXFE, UARTFR_RXFF, UARTFR_TXFE, UARTFR_TXFF, UARTICR_OFFSET, UARTIM_OFFSET,
    UARTINT_RT, UARTINT_RX, UARTINT_TX, UARTMIS_OFFSET, UARTRIS_OFFSET,
};

/// Leak a zeroed buffer to get the `'static` lifetime DMA resources need
pub fn leak_buffer(len: usize) -> &'static mut [u8] {
    Box::leak(vec![0u8; len].into_boxed_slice())
}

// =============================================================================
// Mock UART Register Bank
// =============================================================================

/// Simulated data-register address handed to DMA descriptors
pub const MOCK_DR_ADDR: usize = 0x4000_C000;

#[derive(Debug, Default)]
struct UartState {
    /// Plain read/write registers
    regs: BTreeMap<usize, u32>,
    /// Raw interrupt status
    ris: u32,
    tx_fifo: VecDeque<u8>,
    rx_fifo: VecDeque<u32>,
    /// Bytes shifted out of the TX FIFO, in order
    wire: Vec<u8>,
    /// Record of writes: (offset, value)
    write_log: Vec<(usize, u32)>,
    clock: bool,
    /// Shift one byte out on every flag register read
    auto_drain: bool,
}

impl UartState {
    fn flags(&self) -> u32 {
        let mut fr = 0;
        if self.rx_fifo.is_empty() {
            fr |= UARTFR_RXFE;
        }
        if self.rx_fifo.len() >= FIFO_DEPTH {
            fr |= UARTFR_RXFF;
        }
        if self.tx_fifo.is_empty() {
            fr |= UARTFR_TXFE;
        } else {
            fr |= UARTFR_BUSY;
        }
        if self.tx_fifo.len() >= FIFO_DEPTH {
            fr |= UARTFR_TXFF;
        }
        fr
    }

    fn shift_out(&mut self, n: usize) {
        let n = n.min(self.tx_fifo.len());
        self.wire.extend(self.tx_fifo.drain(..n));
        // TX interrupt fires when the FIFO drains to half
        if n > 0 && self.tx_fifo.len() <= FIFO_DEPTH / 2 {
            self.ris |= UARTINT_TX;
        }
    }

    fn peek(&self, offset: usize) -> u32 {
        match offset {
            UARTFR_OFFSET => self.flags(),
            UARTRIS_OFFSET => self.ris,
            UARTMIS_OFFSET => self.ris & self.regs.get(&UARTIM_OFFSET).copied().unwrap_or(0),
            _ => self.regs.get(&offset).copied().unwrap_or(0),
        }
    }
}

/// Simulated UART register bank with TX/RX FIFOs.
///
/// Clones share state, so a test can keep a handle after giving one to
/// the port.
///
/// # Example
///
/// ```ignore
/// let regs = MockUart::new();
/// let mut uart: Uart<_, NoDma, 64> = Uart::new(PortConfig::new(regs.clone(), 16_000_000))?;
/// uart.startup()?;
/// uart.write(b"hi")?;
/// regs.shift_out(16);
/// assert_eq!(regs.wire(), b"hi");
/// ```
#[derive(Debug, Clone)]
pub struct MockUart {
    state: Rc<RefCell<UartState>>,
}

impl MockUart {
    /// Create a bank with reset values
    pub fn new() -> Self {
        let mut state = UartState::default();
        state.regs.insert(UARTCTL_OFFSET, UARTCTL_TXE | UARTCTL_RXE);
        Self {
            state: Rc::new(RefCell::new(state)),
        }
    }

    /// Set a register without logging the write
    pub fn poke(&self, offset: usize, value: u32) {
        self.state.borrow_mut().regs.insert(offset, value);
    }

    /// Read a register without side effects
    pub fn peek(&self, offset: usize) -> u32 {
        self.state.borrow().peek(offset)
    }

    /// Get all writes made through the register interface
    pub fn write_log(&self) -> Vec<(usize, u32)> {
        self.state.borrow().write_log.clone()
    }

    /// Clear the write log
    pub fn clear_write_log(&self) {
        self.state.borrow_mut().write_log.clear();
    }

    /// Bytes currently in the TX FIFO
    pub fn tx_fifo(&self) -> Vec<u8> {
        self.state.borrow().tx_fifo.iter().copied().collect()
    }

    /// Bytes shifted onto the line so far
    pub fn wire(&self) -> Vec<u8> {
        self.state.borrow().wire.clone()
    }

    /// Move up to `n` bytes from the TX FIFO onto the line
    pub fn shift_out(&self, n: usize) {
        self.state.borrow_mut().shift_out(n);
    }

    /// Fill the TX FIFO so it reports full
    pub fn fill_tx_fifo(&self) {
        let mut state = self.state.borrow_mut();
        while state.tx_fifo.len() < FIFO_DEPTH {
            state.tx_fifo.push_back(0);
        }
    }

    /// Shift one byte out on every flag register read
    pub fn set_auto_drain(&self, enabled: bool) {
        self.state.borrow_mut().auto_drain = enabled;
    }

    /// Push one data register word (character plus error bits) into the
    /// RX FIFO
    pub fn inject_rx(&self, word: u32) {
        let mut state = self.state.borrow_mut();
        state.rx_fifo.push_back(word);
        state.ris |= UARTINT_RX | UARTINT_RT;
    }

    /// Push error-free characters into the RX FIFO
    pub fn inject_rx_bytes(&self, bytes: &[u8]) {
        for &byte in bytes {
            self.inject_rx(u32::from(byte));
        }
    }

    /// Assert raw interrupt sources
    pub fn raise(&self, bits: u32) {
        self.state.borrow_mut().ris |= bits;
    }

    /// Check if the peripheral clock is ungated
    pub fn clock_enabled(&self) -> bool {
        self.state.borrow().clock
    }
}

impl Default for MockUart {
    fn default() -> Self {
        Self::new()
    }
}

impl UartRegisters for MockUart {
    fn read(&self, offset: usize) -> u32 {
        let mut state = self.state.borrow_mut();
        match offset {
            UARTDR_OFFSET => {
                let word = state.rx_fifo.pop_front().unwrap_or(0);
                if state.rx_fifo.is_empty() {
                    state.ris &= !(UARTINT_RX | UARTINT_RT);
                }
                word
            }
            UARTFR_OFFSET => {
                if state.auto_drain {
                    state.shift_out(1);
                }
                state.flags()
            }
            _ => state.peek(offset),
        }
    }

    fn write(&mut self, offset: usize, value: u32) {
        let mut state = self.state.borrow_mut();
        state.write_log.push((offset, value));
        match offset {
            UARTDR_OFFSET => {
                if state.tx_fifo.len() < FIFO_DEPTH {
                    state.tx_fifo.push_back(value as u8);
                }
            }
            UARTICR_OFFSET => state.ris &= !value,
            _ => {
                state.regs.insert(offset, value);
            }
        }
    }

    fn data_register_addr(&self) -> usize {
        MOCK_DR_ADDR
    }

    fn enable_clock(&mut self) {
        self.state.borrow_mut().clock = true;
    }

    fn disable_clock(&mut self) {
        self.state.borrow_mut().clock = false;
    }
}

// =============================================================================
// Mock DMA Channel
// =============================================================================

#[derive(Debug, Default)]
struct DmaState {
    number: u32,
    configured: usize,
    descriptors: [Option<Transfer>; 2],
    left: [usize; 2],
    running: bool,
    ack: bool,
    starts: usize,
    transmitted: Vec<u8>,
}

const fn slot(descriptor: Descriptor) -> usize {
    match descriptor {
        Descriptor::Primary => 0,
        Descriptor::Alternate => 1,
    }
}

/// Simulated uDMA channel.
///
/// Receive captures write straight into the programmed destination
/// addresses, so the port's ping-pong slots see real data. Clones share
/// state.
#[derive(Debug, Clone)]
pub struct MockDmaChannel {
    state: Rc<RefCell<DmaState>>,
}

impl MockDmaChannel {
    /// Create channel `number`
    pub fn new(number: u32) -> Self {
        Self {
            state: Rc::new(RefCell::new(DmaState {
                number,
                ..Default::default()
            })),
        }
    }

    /// Descriptor as last programmed
    pub fn descriptor(&self, descriptor: Descriptor) -> Option<Transfer> {
        self.state.borrow().descriptors[slot(descriptor)]
    }

    /// Check if the channel is enabled
    pub fn is_running(&self) -> bool {
        self.state.borrow().running
    }

    /// Number of `start` calls
    pub fn start_count(&self) -> usize {
        self.state.borrow().starts
    }

    /// Number of `configure` calls
    pub fn configure_count(&self) -> usize {
        self.state.borrow().configured
    }

    /// Bytes read out by completed transmit transfers
    pub fn transmitted(&self) -> Vec<u8> {
        self.state.borrow().transmitted.clone()
    }

    /// Simulate the peripheral delivering `bytes` into a running
    /// device-to-memory transfer. Primary is filled before alternate; a
    /// filled alternate raises completion.
    ///
    /// Returns the number of bytes stored.
    pub fn capture(&self, bytes: &[u8]) -> usize {
        let mut state = self.state.borrow_mut();
        if !state.running {
            return 0;
        }

        let mut stored = 0;
        for &byte in bytes {
            let Some(idx) = (0..2).find(|&i| state.descriptors[i].is_some() && state.left[i] > 0)
            else {
                break;
            };
            let Some(transfer) = state.descriptors[idx] else {
                break;
            };
            let offset = transfer.units - state.left[idx];
            // SAFETY: the driver programmed `dst` from a live 'static slot
            // of at least `units` bytes.
            unsafe { core::ptr::write_volatile((transfer.dst + offset) as *mut u8, byte) };
            state.left[idx] -= 1;
            stored += 1;
        }

        if stored > 0 && state.descriptors[1].is_some() && state.left[1] == 0 {
            state.ack = true;
        }
        stored
    }

    /// Simulate the outstanding memory-to-device transfer finishing
    pub fn complete_tx(&self) {
        let mut state = self.state.borrow_mut();
        let Some(transfer) = state.descriptors[0] else {
            return;
        };
        if !state.running {
            return;
        }
        // SAFETY: `src` is the driver's 'static staging buffer holding
        // `units` bytes.
        let data = unsafe { core::slice::from_raw_parts(transfer.src as *const u8, transfer.units) };
        state.transmitted.extend_from_slice(data);
        state.left[0] = 0;
        state.running = false;
        state.ack = true;
    }
}

impl DmaChannel for MockDmaChannel {
    fn channel(&self) -> u32 {
        self.state.borrow().number
    }

    fn configure(&mut self) {
        self.state.borrow_mut().configured += 1;
    }

    fn setup_transfer(&mut self, descriptor: Descriptor, transfer: Transfer) {
        let mut state = self.state.borrow_mut();
        state.descriptors[slot(descriptor)] = Some(transfer);
        state.left[slot(descriptor)] = transfer.units;
    }

    fn start(&mut self) {
        let mut state = self.state.borrow_mut();
        state.running = true;
        state.starts += 1;
    }

    fn stop(&mut self) {
        self.state.borrow_mut().running = false;
    }

    fn units_left(&self, descriptor: Descriptor) -> usize {
        self.state.borrow().left[slot(descriptor)]
    }

    fn ack_interrupt(&mut self) -> bool {
        core::mem::take(&mut self.state.borrow_mut().ack)
    }
}

// =============================================================================
// Recording Client
// =============================================================================

/// Line discipline stand-in that records everything it is given
#[derive(Debug, Default)]
pub struct RecordingClient {
    received: Vec<u8>,
    flags: Vec<RxFlag>,
    deliveries: usize,
    wakeups: usize,
    breaks_offered: usize,
    consume_breaks: bool,
}

impl RecordingClient {
    /// Create an empty recorder
    pub fn new() -> Self {
        Self::default()
    }

    /// All delivered bytes, in order
    pub fn received(&self) -> Vec<u8> {
        self.received.clone()
    }

    /// Flag of every delivered byte
    pub fn flags(&self) -> Vec<RxFlag> {
        self.flags.clone()
    }

    /// Number of `receive` calls
    pub fn deliveries(&self) -> usize {
        self.deliveries
    }

    /// Number of `write_wakeup` calls
    pub fn wakeups(&self) -> usize {
        self.wakeups
    }

    /// Number of `handle_break` calls
    pub fn breaks_offered(&self) -> usize {
        self.breaks_offered
    }

    /// Make `handle_break` consume the break byte
    pub fn consume_breaks(&mut self, consume: bool) {
        self.consume_breaks = consume;
    }
}

impl SerialClient for RecordingClient {
    fn receive(&mut self, data: &[u8], flags: RxFlags<'_>) {
        self.received.extend_from_slice(data);
        self.flags.extend((0..data.len()).map(|i| flags.get(i)));
        self.deliveries += 1;
    }

    fn handle_break(&mut self) -> bool {
        self.breaks_offered += 1;
        self.consume_breaks
    }

    fn write_wakeup(&mut self) {
        self.wakeups += 1;
    }
}

// =============================================================================
// Mock Delay
// =============================================================================

/// Mock delay that records elapsed time instead of sleeping
#[derive(Debug, Default)]
pub struct MockDelay {
    /// Total nanoseconds delayed
    total_ns: RefCell<u64>,
}

impl MockDelay {
    /// Create a new mock delay
    pub fn new() -> Self {
        Self::default()
    }

    /// Get total nanoseconds that were "delayed"
    pub fn total_ns(&self) -> u64 {
        *self.total_ns.borrow()
    }
}

impl embedded_hal::delay::DelayNs for MockDelay {
    fn delay_ns(&mut self, ns: u32) {
        *self.total_ns.borrow_mut() += u64::from(ns);
    }
}

// =============================================================================
// Self-tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal::delay::DelayNs;

    #[test]
    fn mock_uart_fifo_flags() {
        let mut regs = MockUart::new();
        assert_ne!(regs.read(UARTFR_OFFSET) & UARTFR_TXFE, 0);
        assert_ne!(regs.read(UARTFR_OFFSET) & UARTFR_RXFE, 0);

        for _ in 0..FIFO_DEPTH {
            regs.write(UARTDR_OFFSET, 0x41);
        }
        assert_ne!(regs.read(UARTFR_OFFSET) & UARTFR_TXFF, 0);

        // Writes to a full FIFO are lost
        regs.write(UARTDR_OFFSET, 0x42);
        assert_eq!(regs.tx_fifo().len(), FIFO_DEPTH);
    }

    #[test]
    fn mock_uart_rx_clears_interrupt_when_drained() {
        let regs = MockUart::new();
        regs.inject_rx(0x31);
        assert_ne!(regs.peek(UARTRIS_OFFSET) & UARTINT_RX, 0);
        assert_eq!(regs.read(UARTDR_OFFSET), 0x31);
        assert_eq!(regs.peek(UARTRIS_OFFSET) & (UARTINT_RX | UARTINT_RT), 0);
    }

    #[test]
    fn mock_uart_mis_is_masked() {
        let mut regs = MockUart::new();
        regs.raise(UARTINT_RX | UARTINT_TX);
        regs.write(UARTIM_OFFSET, UARTINT_TX);
        assert_eq!(regs.read(UARTMIS_OFFSET), UARTINT_TX);
        regs.write(UARTICR_OFFSET, UARTINT_TX);
        assert_eq!(regs.read(UARTMIS_OFFSET), 0);
    }

    #[test]
    fn mock_dma_capture_fills_primary_then_alternate() {
        let buf = leak_buffer(4);
        let base = buf.as_mut_ptr() as usize;
        let mut chan = MockDmaChannel::new(1);
        chan.setup_transfer(Descriptor::Primary, Transfer::rx_pingpong(MOCK_DR_ADDR, base, 1));
        chan.setup_transfer(Descriptor::Alternate, Transfer::rx_pingpong(MOCK_DR_ADDR, base + 1, 3));
        chan.start();

        assert_eq!(chan.capture(b"ab"), 2);
        assert_eq!(chan.units_left(Descriptor::Primary), 0);
        assert_eq!(chan.units_left(Descriptor::Alternate), 2);
        assert!(!chan.ack_interrupt());

        assert_eq!(chan.capture(b"cdef"), 2);
        assert!(chan.ack_interrupt());
        assert_eq!(buf, b"abcd");
    }

    #[test]
    fn mock_delay_accumulates() {
        let mut delay = MockDelay::new();
        delay.delay_us(3);
        assert_eq!(delay.total_ns(), 3000);
    }
}
