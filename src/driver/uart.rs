//! Core LM3S UART port implementation.
//!
//! This module contains the main [`Uart`] structure:
//!
//! - Attach-time validation and DMA channel setup
//! - Startup/shutdown sequencing
//! - Line configuration
//! - Ring-buffered writes and transmit flow control
//! - Interrupt dispatch
//! - Deferred DMA receive delivery
//! - Synchronous console output

use embedded_hal::delay::DelayNs;

use super::baud::min_baud;
use super::config::{DmaConfig, InputFlags, LineConfig, Mode, PortConfig, State};
use super::counters::PortCounters;
use super::error::{ConfigError, DmaError, IoError, IoResult, Result};
use super::interrupt::{InterruptStatus, IrqOutcome};
use super::line::{self, CommittedConfig, status_masks};
use super::rx::{RxDma, RxStatus, SerialClient, drain_polled};
use super::tx::{TransmitEngine, TxDma, TxState};
use crate::hal::dma::{DmaChannel, NoDma};
use crate::hal::registers::UartRegisters;
use crate::internal::constants::{
    CONSOLE_POLL_INTERVAL_US, CONSOLE_TX_TIMEOUT_US, DEFAULT_TX_RING_SIZE, MIN_RX_SLOT_SIZE,
};
use crate::internal::pingpong::RxWork;
use crate::internal::register::uart::{
    UARTCTL_OFFSET, UARTCTL_UARTEN, UARTDMACTL_OFFSET, UARTDMACTL_RXDMAE, UARTDMACTL_TXDMAE,
    UARTDR_OFFSET, UARTFR_OFFSET, UARTFR_TXFE, UARTFR_TXFF, UARTICR_ALL, UARTICR_OFFSET,
    UARTIFLS_OFFSET, UARTIFLS_RXIFLSEL_1_8, UARTIFLS_RXIFLSEL_MASK, UARTIM_OFFSET, UARTINT_RT,
    UARTINT_RX, UARTLCRH_BRK, UARTLCRH_FEN, UARTLCRH_OFFSET, UARTMIS_OFFSET,
};

// =============================================================================
// UART Port
// =============================================================================

/// One LM3S UART port.
///
/// # Type Parameters
/// * `R` - Register bank
/// * `D` - DMA channel type ([`NoDma`] for polled-only ports)
/// * `TX_SIZE` - Transmit ring size in bytes (power of two)
///
/// Every method expects exclusive access, normally obtained through
/// [`SharedUart`](crate::sync::SharedUart), whose critical section is the
/// port lock.
///
/// # Example
/// ```ignore
/// let regs = unsafe { MmioUart::new(UART0_BASE, SYSCTL_RCGC1_UART0) };
/// let mut uart: Uart<_> = Uart::new(PortConfig::new(regs, 50_000_000))?;
/// uart.startup()?;
/// uart.configure(&LineConfig::new().with_baud(115_200))?;
/// uart.write(b"hello\r\n")?;
/// ```
pub struct Uart<R, D: DmaChannel = NoDma, const TX_SIZE: usize = DEFAULT_TX_RING_SIZE> {
    /// Register bank
    regs: R,
    /// UART reference clock
    uart_clock_hz: u32,
    /// Clamp ceiling for requested baud rates
    max_baud: u32,
    /// Lifecycle state
    state: State,
    /// Ring buffer and transmit state machine
    tx: TransmitEngine<TX_SIZE>,
    /// Transmit DMA resources (DMA mode only)
    tx_dma: Option<TxDma<D>>,
    /// Receive DMA resources (DMA mode only)
    rx_dma: Option<RxDma<D>>,
    /// Last committed line configuration
    line: Option<CommittedConfig>,
    /// Error classes reported on received bytes
    read_status_mask: RxStatus,
    /// Error classes whose bytes are dropped
    ignore_status_mask: RxStatus,
    /// Traffic and error counters
    counters: PortCounters,
}

impl<R: UartRegisters, D: DmaChannel, const TX_SIZE: usize> Uart<R, D, TX_SIZE> {
    /// Attach a port.
    ///
    /// Validates the platform description and gives each DMA channel its
    /// default configuration. The port is left [`State::Closed`].
    ///
    /// # Errors
    ///
    /// - [`ConfigError::InvalidClock`] if the reference clock is zero
    /// - [`ConfigError::InvalidMaxBaud`] if the maximum baud rate is below
    ///   the lowest programmable rate
    /// - [`DmaError`] variants for unusable DMA resources
    pub fn new(config: PortConfig<R, D>) -> Result<Self> {
        let PortConfig {
            regs,
            uart_clock_hz,
            max_baud,
            dma,
        } = config;

        if uart_clock_hz == 0 {
            return Err(ConfigError::InvalidClock.into());
        }
        if max_baud == 0 || max_baud < min_baud(uart_clock_hz) {
            return Err(ConfigError::InvalidMaxBaud.into());
        }

        let (tx_dma, rx_dma) = match dma {
            Some(dma) => {
                let (tx, rx) = Self::attach_dma(dma)?;
                (Some(tx), Some(rx))
            }
            None => (None, None),
        };

        let (read_status_mask, ignore_status_mask) = status_masks(InputFlags::empty());

        #[cfg(feature = "defmt")]
        defmt::debug!(
            "UART attached: clock {} Hz, max baud {}, dma {}",
            uart_clock_hz,
            max_baud,
            tx_dma.is_some()
        );

        Ok(Self {
            regs,
            uart_clock_hz,
            max_baud,
            state: State::Closed,
            tx: TransmitEngine::new(),
            tx_dma,
            rx_dma,
            line: None,
            read_status_mask,
            ignore_status_mask,
            counters: PortCounters::default(),
        })
    }

    fn attach_dma(dma: DmaConfig<D>) -> Result<(TxDma<D>, RxDma<D>)> {
        let DmaConfig {
            mut tx_channel,
            mut rx_channel,
            tx_buffer,
            rx_buffer,
        } = dma;

        if tx_buffer.is_empty() {
            return Err(DmaError::StagingBufferTooSmall.into());
        }
        if rx_buffer.len() / 2 < MIN_RX_SLOT_SIZE {
            return Err(DmaError::RxBufferTooSmall.into());
        }
        if tx_channel.channel() == rx_channel.channel() {
            return Err(DmaError::ChannelConflict.into());
        }

        tx_channel.configure();
        rx_channel.configure();

        Ok((TxDma::new(tx_channel, tx_buffer), RxDma::new(rx_channel, rx_buffer)))
    }

    // =========================================================================
    // State Accessors
    // =========================================================================

    /// Get the current state
    #[inline(always)]
    pub fn state(&self) -> State {
        self.state
    }

    /// Get the transfer mode
    #[inline(always)]
    pub fn mode(&self) -> Mode {
        if self.tx_dma.is_some() {
            Mode::Dma
        } else {
            Mode::Polled
        }
    }

    /// Get the traffic and error counters
    #[inline(always)]
    pub fn counters(&self) -> PortCounters {
        self.counters
    }

    /// Get the last committed line configuration
    #[inline(always)]
    pub fn line_config(&self) -> Option<CommittedConfig> {
        self.line
    }

    /// Get the transmit engine state
    #[inline(always)]
    pub fn tx_state(&self) -> TxState {
        self.tx.state()
    }

    /// Bytes waiting in the transmit ring
    #[inline(always)]
    pub fn tx_pending(&self) -> usize {
        self.tx.ring().pending_count()
    }

    /// Bytes the transmit ring can still accept
    #[inline(always)]
    pub fn tx_free(&self) -> usize {
        self.tx.ring().free_count()
    }

    /// Check if a DMA receive delivery is scheduled or running
    #[inline]
    pub fn rx_busy(&self) -> bool {
        self.rx_dma.as_ref().is_some_and(RxDma::is_busy)
    }

    /// Register bank
    #[inline(always)]
    pub fn regs(&self) -> &R {
        &self.regs
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Power up the port and enable receive.
    ///
    /// # Errors
    ///
    /// [`ConfigError::AlreadyOpen`] if the port is already started.
    pub fn startup(&mut self) -> Result<()> {
        if self.state == State::Open {
            return Err(ConfigError::AlreadyOpen.into());
        }

        self.regs.enable_clock();
        // No surprise interrupts while the block comes up
        self.regs.write(UARTIM_OFFSET, 0);
        self.regs.set_bits(UARTLCRH_OFFSET, UARTLCRH_FEN);
        self.regs.modify(UARTIFLS_OFFSET, |v| {
            (v & !UARTIFLS_RXIFLSEL_MASK) | UARTIFLS_RXIFLSEL_1_8
        });
        self.regs.set_bits(UARTCTL_OFFSET, UARTCTL_UARTEN);

        self.tx.reset();
        match self.rx_dma.as_mut() {
            Some(rx) => {
                self.regs
                    .write(UARTDMACTL_OFFSET, UARTDMACTL_TXDMAE | UARTDMACTL_RXDMAE);
                rx.reset();
                rx.arm(&self.regs);
                self.regs.write(UARTIM_OFFSET, UARTINT_RT);
            }
            None => {
                self.regs.write(UARTIM_OFFSET, UARTINT_RX | UARTINT_RT);
            }
        }

        self.state = State::Open;

        #[cfg(feature = "defmt")]
        defmt::debug!("UART started ({})", self.mode());

        Ok(())
    }

    /// Disable the port.
    ///
    /// Non-draining: queued and in-flight transmit data is abandoned.
    pub fn shutdown(&mut self) {
        if self.state == State::Closed {
            return;
        }

        self.regs.write(UARTIM_OFFSET, 0);
        if let Some(dma) = self.tx_dma.as_mut() {
            self.tx.stop_dma(dma);
        }
        if let Some(rx) = self.rx_dma.as_mut() {
            rx.reset();
        }
        self.regs.clear_bits(UARTCTL_OFFSET, UARTCTL_UARTEN);
        self.regs.disable_clock();

        self.tx.reset();
        self.state = State::Closed;

        #[cfg(feature = "defmt")]
        defmt::debug!("UART shut down");
    }

    /// Shut the port down and hand back its register bank and channels
    /// (TX, RX).
    pub fn detach(mut self) -> (R, Option<(D, D)>) {
        self.shutdown();
        let channels = match (self.tx_dma, self.rx_dma) {
            (Some(tx), Some(rx)) => Some((tx.release().0, rx.release())),
            _ => None,
        };
        (self.regs, channels)
    }

    // =========================================================================
    // Configuration
    // =========================================================================

    /// Apply a line configuration.
    ///
    /// Out-of-range baud rates are clamped; the returned configuration
    /// carries the rate actually programmed.
    ///
    /// # Errors
    ///
    /// [`IoError::InvalidState`] if the port is not started.
    pub fn configure(&mut self, config: &LineConfig) -> Result<CommittedConfig> {
        if self.state != State::Open {
            return Err(IoError::InvalidState.into());
        }

        let committed = line::apply(&mut self.regs, self.uart_clock_hz, self.max_baud, config);
        self.read_status_mask = committed.read_status_mask;
        self.ignore_status_mask = committed.ignore_status_mask;
        self.line = Some(committed);
        Ok(committed)
    }

    /// Drive a break condition on the line.
    ///
    /// Ignored while the port is closed.
    pub fn set_break(&mut self, on: bool) {
        if self.state != State::Open {
            return;
        }
        if on {
            self.regs.set_bits(UARTLCRH_OFFSET, UARTLCRH_BRK);
        } else {
            self.regs.clear_bits(UARTLCRH_OFFSET, UARTLCRH_BRK);
        }
    }

    /// Check if the hardware transmit FIFO is empty.
    ///
    /// A closed port has nothing to send and reports empty without touching
    /// the gated block.
    #[inline]
    pub fn query_transmit_empty(&self) -> bool {
        self.state != State::Open || self.regs.read(UARTFR_OFFSET) & UARTFR_TXFE != 0
    }

    // =========================================================================
    // Transmit
    // =========================================================================

    /// Queue bytes for transmission.
    ///
    /// Returns how many bytes were accepted. A short count means the ring
    /// is full; retry after [`SerialClient::write_wakeup`].
    ///
    /// # Errors
    ///
    /// [`IoError::InvalidState`] if the port is not started.
    pub fn write(&mut self, data: &[u8]) -> Result<usize> {
        if self.state != State::Open {
            return Err(IoError::InvalidState.into());
        }

        let accepted = self.tx.enqueue(data);
        if accepted > 0 {
            self.kick_tx();
        }
        Ok(accepted)
    }

    /// Resume transmission after [`stop_tx`](Self::stop_tx).
    ///
    /// In DMA mode this does nothing while a transfer is outstanding; the
    /// completion interrupt continues the flow.
    pub fn start_tx(&mut self) {
        self.tx.set_stopped(false);
        if self.state == State::Open {
            self.kick_tx();
        }
    }

    /// Hold off transmission
    pub fn stop_tx(&mut self) {
        self.tx.set_stopped(true);
        if self.state != State::Open {
            return;
        }
        match self.tx_dma.as_mut() {
            Some(dma) => self.tx.stop_dma(dma),
            None => self.tx.stop_polled(&mut self.regs),
        }
    }

    /// Send `ch` ahead of any queued data (XON/XOFF)
    pub fn send_xchar(&mut self, ch: u8) {
        self.tx.set_x_char(ch);
        if self.state == State::Open {
            self.kick_tx();
        }
    }

    /// Consume the pending transmit wakeup, if any.
    ///
    /// Wakeups are normally delivered by
    /// [`handle_interrupt`](Self::handle_interrupt).
    pub fn take_write_wakeup(&mut self) -> bool {
        self.tx.take_wakeup()
    }

    fn kick_tx(&mut self) {
        match self.tx_dma.as_mut() {
            Some(dma) => {
                self.tx.kick_dma(&mut self.regs, dma, &mut self.counters);
            }
            None => {
                self.tx.kick_polled(&mut self.regs, &mut self.counters);
            }
        }
    }

    // =========================================================================
    // Receive
    // =========================================================================

    /// Stop receiving
    pub fn stop_rx(&mut self) {
        if self.state != State::Open {
            return;
        }
        match self.rx_dma.as_mut() {
            Some(rx) => rx.stop(),
            None => self.regs.clear_bits(UARTIM_OFFSET, UARTINT_RX | UARTINT_RT),
        }
    }

    /// Lend the pending DMA capture to the delivery task.
    ///
    /// The returned data can be copied to the consumer without holding the
    /// port lock. Returns `None` if nothing is pending.
    pub fn begin_rx_work(&mut self) -> Option<RxWork> {
        self.rx_dma.as_mut()?.begin_work()
    }

    /// Return a delivered capture and re-check the landing slot.
    ///
    /// Returns `true` if the re-check captured more data, in which case the
    /// delivery task should run again.
    pub fn finish_rx_work(&mut self, work: RxWork) -> bool {
        let Some(rx) = self.rx_dma.as_mut() else {
            return false;
        };

        // Work lent before a restart comes back empty-handed
        let delivered = rx.finish_work(work);
        if delivered == 0 {
            return false;
        }
        self.counters.add_rx(delivered);

        self.state == State::Open && rx.service(&self.regs)
    }

    // =========================================================================
    // Interrupt Handling
    // =========================================================================

    /// Service the port interrupt.
    ///
    /// Reads and acknowledges every pending source, then runs receive
    /// handling before transmit handling. In DMA mode the channels'
    /// own completion flags decide which engine runs; a receive timeout
    /// additionally cuts a partial capture.
    pub fn handle_interrupt<C: SerialClient>(&mut self, client: &mut C) -> IrqOutcome {
        let mis = self.regs.read(UARTMIS_OFFSET);
        self.regs.write(UARTICR_OFFSET, UARTICR_ALL);

        let status = InterruptStatus::from_raw(mis);
        let mut outcome = IrqOutcome {
            status,
            ..Default::default()
        };

        #[cfg(feature = "defmt")]
        defmt::trace!("UART irq: mis {:#x}", mis);

        if self.state != State::Open {
            return outcome;
        }

        match (self.rx_dma.as_mut(), self.tx_dma.as_mut()) {
            (Some(rx), Some(tx_dma)) => {
                let rx_done = rx.channel_mut().ack_interrupt();
                if rx_done || status.rx_timeout {
                    rx.service(&self.regs);
                    outcome.rx_serviced = true;
                }
                outcome.rx_work_pending = rx.has_work();

                if tx_dma.channel_mut().ack_interrupt() {
                    self.tx
                        .complete_dma(&mut self.regs, tx_dma, &mut self.counters);
                    outcome.tx_serviced = true;
                }
            }
            _ => {
                if status.rx_pending() {
                    drain_polled(
                        &mut self.regs,
                        self.read_status_mask,
                        self.ignore_status_mask,
                        &mut self.counters,
                        client,
                    );
                    outcome.rx_serviced = true;
                }
                if status.tx {
                    self.tx.kick_polled(&mut self.regs, &mut self.counters);
                    outcome.tx_serviced = true;
                }
            }
        }

        if self.tx.take_wakeup() {
            client.write_wakeup();
        }

        outcome
    }

    // =========================================================================
    // Console
    // =========================================================================

    /// Write directly to the FIFO, bypassing the ring and DMA.
    ///
    /// Polls for FIFO space with a bounded wait per character and
    /// translates `\n` to `\r\n`. Intended for diagnostics and early output.
    ///
    /// # Errors
    ///
    /// - [`IoError::InvalidState`] if the port is not started
    /// - [`IoError::Timeout`] if the FIFO stays full
    pub fn console_write<Dl: DelayNs>(&mut self, bytes: &[u8], delay: &mut Dl) -> IoResult<()> {
        if self.state != State::Open {
            return Err(IoError::InvalidState);
        }
        for &byte in bytes {
            if byte == b'\n' {
                self.console_putc(b'\r', delay)?;
            }
            self.console_putc(byte, delay)?;
        }
        Ok(())
    }

    fn console_putc<Dl: DelayNs>(&mut self, ch: u8, delay: &mut Dl) -> IoResult<()> {
        let mut waited = 0;
        while self.regs.read(UARTFR_OFFSET) & UARTFR_TXFF != 0 {
            if waited >= CONSOLE_TX_TIMEOUT_US {
                return Err(IoError::Timeout);
            }
            delay.delay_us(CONSOLE_POLL_INTERVAL_US);
            waited += CONSOLE_POLL_INTERVAL_US;
        }
        self.regs.write(UARTDR_OFFSET, u32::from(ch));
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
