//! Interrupt status handling for the LM3S UART.
//!
//! This module provides the [`InterruptStatus`] structure for parsing the
//! masked interrupt status register, and [`IrqOutcome`] describing what one
//! dispatcher pass did.

use crate::internal::register::uart::{
    UARTINT_BE, UARTINT_FE, UARTINT_OE, UARTINT_PE, UARTINT_RT, UARTINT_RX, UARTINT_TX,
};

// =============================================================================
// Interrupt Status
// =============================================================================

/// Interrupt status flags parsed from `UARTMIS`.
///
/// # Example
///
/// ```ignore
/// let outcome = uart.handle_interrupt(&mut client);
/// if outcome.status.has_error() {
///     // Line errors were latched
/// }
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InterruptStatus {
    /// RX FIFO reached its trigger level
    pub rx: bool,
    /// RX FIFO not empty and idle for 32 bit periods
    pub rx_timeout: bool,
    /// TX FIFO drained to its trigger level
    pub tx: bool,
    /// Framing error
    pub framing: bool,
    /// Parity error
    pub parity: bool,
    /// Break condition
    pub brk: bool,
    /// Receive overrun
    pub overrun: bool,
}

impl InterruptStatus {
    /// Create from a raw `UARTMIS` value
    #[inline]
    pub fn from_raw(status: u32) -> Self {
        Self {
            rx: (status & UARTINT_RX) != 0,
            rx_timeout: (status & UARTINT_RT) != 0,
            tx: (status & UARTINT_TX) != 0,
            framing: (status & UARTINT_FE) != 0,
            parity: (status & UARTINT_PE) != 0,
            brk: (status & UARTINT_BE) != 0,
            overrun: (status & UARTINT_OE) != 0,
        }
    }

    /// Convert back to the register encoding (for `UARTICR`)
    #[inline]
    pub fn to_raw(&self) -> u32 {
        let mut val = 0u32;
        if self.rx {
            val |= UARTINT_RX;
        }
        if self.rx_timeout {
            val |= UARTINT_RT;
        }
        if self.tx {
            val |= UARTINT_TX;
        }
        if self.framing {
            val |= UARTINT_FE;
        }
        if self.parity {
            val |= UARTINT_PE;
        }
        if self.brk {
            val |= UARTINT_BE;
        }
        if self.overrun {
            val |= UARTINT_OE;
        }
        val
    }

    /// Check if any interrupt source is asserted
    #[inline]
    pub fn any(&self) -> bool {
        self.to_raw() != 0
    }

    /// Check if receive data needs servicing
    #[inline]
    pub fn rx_pending(&self) -> bool {
        self.rx || self.rx_timeout
    }

    /// Check if any line error was signalled
    #[inline]
    pub fn has_error(&self) -> bool {
        self.framing || self.parity || self.brk || self.overrun
    }
}

// =============================================================================
// Dispatcher Outcome
// =============================================================================

/// Result of one interrupt dispatcher pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct IrqOutcome {
    /// Masked status as read on entry
    pub status: InterruptStatus,
    /// Receive path serviced (polled drain or DMA capture)
    pub rx_serviced: bool,
    /// Transmit path serviced
    pub tx_serviced: bool,
    /// DMA capture waiting for the deferred delivery task
    pub rx_work_pending: bool,
}

impl IrqOutcome {
    /// Check if the interrupt was for this port
    #[inline]
    pub fn handled(&self) -> bool {
        self.status.any() || self.rx_serviced || self.tx_serviced
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
