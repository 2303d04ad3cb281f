//! ISR-safe port wrapper using critical sections.

use super::primitives::CriticalSectionCell;
use crate::driver::error::{IoError, Result};
use crate::driver::interrupt::IrqOutcome;
use crate::driver::rx::{RxFlags, SerialClient};
use crate::driver::uart::Uart;
use crate::hal::dma::{DmaChannel, NoDma};
use crate::hal::registers::UartRegisters;
use crate::internal::constants::{DEFAULT_TX_RING_SIZE, RX_WORK_MAX_PASSES};

/// Outcome of one run of the deferred receive task
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RxWorkStatus {
    /// Bytes handed to the client
    pub delivered: usize,
    /// Pass limit reached with data still pending; run the task again
    pub reschedule: bool,
}

/// ISR-safe UART wrapper using critical sections.
///
/// All access goes through `critical_section::with()`, which is the port
/// lock. The one exception is the byte copy in [`run_rx_work`], which runs
/// unlocked on a slot the port has lent out.
///
/// [`run_rx_work`]: Self::run_rx_work
///
/// # Example
///
/// ```ignore
/// static UART0: SharedUart<MmioUart> = SharedUart::new();
///
/// UART0.install(Uart::new(PortConfig::new(regs, 50_000_000))?);
/// UART0.with(|uart| uart.startup())?;
/// UART0.write(b"ready\r\n")?;
/// ```
pub struct SharedUart<R, D: DmaChannel = NoDma, const TX_SIZE: usize = DEFAULT_TX_RING_SIZE> {
    inner: CriticalSectionCell<Option<Uart<R, D, TX_SIZE>>>,
}

impl<R, D: DmaChannel, const TX_SIZE: usize> SharedUart<R, D, TX_SIZE> {
    /// Create an empty slot (const, suitable for static initialization).
    pub const fn new() -> Self {
        Self {
            inner: CriticalSectionCell::new(None),
        }
    }
}

impl<R: UartRegisters, D: DmaChannel, const TX_SIZE: usize> SharedUart<R, D, TX_SIZE> {
    /// Install an attached port, returning the one it replaces
    pub fn install(&self, uart: Uart<R, D, TX_SIZE>) -> Option<Uart<R, D, TX_SIZE>> {
        self.inner.with(|slot| slot.replace(uart))
    }

    /// Remove the port
    pub fn take(&self) -> Option<Uart<R, D, TX_SIZE>> {
        self.inner.with(Option::take)
    }

    /// Check if a port is installed
    pub fn is_installed(&self) -> bool {
        self.inner.with(|slot| slot.is_some())
    }

    /// Execute a closure with exclusive access to the port.
    ///
    /// Returns `None` if no port is installed.
    #[inline]
    pub fn with<T, F>(&self, f: F) -> Option<T>
    where
        F: FnOnce(&mut Uart<R, D, TX_SIZE>) -> T,
    {
        self.inner.with(|slot| slot.as_mut().map(f))
    }

    /// Queue bytes for transmission.
    ///
    /// # Errors
    ///
    /// [`IoError::InvalidState`] if no port is installed or it is not
    /// started.
    pub fn write(&self, data: &[u8]) -> Result<usize> {
        self.with(|uart| uart.write(data))
            .unwrap_or(Err(IoError::InvalidState.into()))
    }

    /// Interrupt entry point
    pub fn on_interrupt<C: SerialClient>(&self, client: &mut C) -> IrqOutcome {
        self.with(|uart| uart.handle_interrupt(client))
            .unwrap_or_default()
    }

    /// Deferred receive task body.
    ///
    /// Delivers the lent capture outside the lock, hands it back, and
    /// repeats while the re-check keeps finding data, up to a fixed number
    /// of passes.
    pub fn run_rx_work<C: SerialClient>(&self, client: &mut C) -> RxWorkStatus {
        let mut status = RxWorkStatus::default();

        for _ in 0..RX_WORK_MAX_PASSES {
            let Some(work) = self.with(Uart::begin_rx_work).flatten() else {
                return status;
            };

            client.receive(work.data(), RxFlags::Normal);
            status.delivered += work.len();

            let again = self.with(|uart| uart.finish_rx_work(work));
            if again != Some(true) {
                return status;
            }
        }

        #[cfg(feature = "defmt")]
        defmt::warn!("rx work: pass limit reached, rescheduling");

        status.reschedule = true;
        status
    }
}

impl<R, D: DmaChannel, const TX_SIZE: usize> Default for SharedUart<R, D, TX_SIZE> {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
