//! UART register bank access.
//!
//! The driver never dereferences register addresses itself. It goes through
//! [`UartRegisters`], which is implemented for real hardware by [`MmioUart`]
//! and by a simulated bank in the host tests.

use crate::internal::register::sysctl::SYSCTL_RCGC1;
use crate::internal::register::uart::UARTDR_OFFSET;
use crate::internal::register::{modify_reg, read_reg, write_reg};

// =============================================================================
// Register Bank Trait
// =============================================================================

/// Typed access to one UART's register block.
///
/// Offsets are the `UART*_OFFSET` values relative to the port base.
/// Implementations must not block: every method may be called from
/// interrupt context with the port lock held.
pub trait UartRegisters {
    /// Read a register
    fn read(&self, offset: usize) -> u32;

    /// Write a register
    fn write(&mut self, offset: usize, value: u32);

    /// Bus address of the data register, used as the DMA peripheral endpoint
    fn data_register_addr(&self) -> usize;

    /// Ungate the peripheral clock for this UART
    fn enable_clock(&mut self) {}

    /// Gate the peripheral clock for this UART
    fn disable_clock(&mut self) {}

    /// Read-modify-write a register
    #[inline]
    fn modify<F>(&mut self, offset: usize, f: F)
    where
        F: FnOnce(u32) -> u32,
        Self: Sized,
    {
        let value = self.read(offset);
        self.write(offset, f(value));
    }

    /// Set bits in a register
    #[inline]
    fn set_bits(&mut self, offset: usize, bits: u32)
    where
        Self: Sized,
    {
        self.modify(offset, |v| v | bits);
    }

    /// Clear bits in a register
    #[inline]
    fn clear_bits(&mut self, offset: usize, bits: u32)
    where
        Self: Sized,
    {
        self.modify(offset, |v| v & !bits);
    }
}

// =============================================================================
// Memory-Mapped Implementation
// =============================================================================

/// Memory-mapped UART register block.
#[derive(Debug)]
pub struct MmioUart {
    /// Base address of the register block
    base: usize,
    /// This port's clock gate bit(s) in RCGC1
    rcgc1_mask: u32,
}

impl MmioUart {
    /// Create an accessor for the block at `base`.
    ///
    /// # Safety
    ///
    /// `base` must be the address of an LM3S UART register block and no other
    /// `MmioUart` may exist for the same block.
    #[must_use]
    pub const unsafe fn new(base: usize, rcgc1_mask: u32) -> Self {
        Self { base, rcgc1_mask }
    }

    /// Base address of the register block
    #[inline(always)]
    pub const fn base(&self) -> usize {
        self.base
    }
}

impl UartRegisters for MmioUart {
    #[inline(always)]
    fn read(&self, offset: usize) -> u32 {
        // SAFETY: construction guarantees a valid register block
        unsafe { read_reg(self.base + offset) }
    }

    #[inline(always)]
    fn write(&mut self, offset: usize, value: u32) {
        // SAFETY: construction guarantees a valid register block
        unsafe { write_reg(self.base + offset, value) }
    }

    #[inline(always)]
    fn data_register_addr(&self) -> usize {
        self.base + UARTDR_OFFSET
    }

    fn enable_clock(&mut self) {
        // SAFETY: RCGC1 is always mapped on LM3S parts
        unsafe {
            let value = read_reg(SYSCTL_RCGC1) | self.rcgc1_mask;
            // Written twice: the first write after reset is not always latched
            write_reg(SYSCTL_RCGC1, value);
            write_reg(SYSCTL_RCGC1, value);
        }

        #[cfg(feature = "defmt")]
        defmt::debug!("UART clock enabled (RCGC1 mask {:#x})", self.rcgc1_mask);
    }

    fn disable_clock(&mut self) {
        let mask = self.rcgc1_mask;
        // SAFETY: RCGC1 is always mapped on LM3S parts
        unsafe { modify_reg(SYSCTL_RCGC1, |v| v & !mask) }
    }
}
