//! LM3S UART Driver
//!
//! A `no_std`, `no_alloc` Rust driver for the UART peripheral found on TI
//! Stellaris LM3S microcontrollers (LM3S6965 and relatives).
//!
//! The block is a close relative of the ARM PL011: 16-entry TX and RX
//! FIFOs, a 16.6 fixed-point baud divisor and per-character receive status
//! in the upper bits of the data register.
//!
//! # Architecture
//!
//! The driver is organized into three layers:
//!
//! 1. **Port Layer** ([`driver`]): [`Uart`] lifecycle, line configuration,
//!    the transmit and receive engines and the interrupt handler
//! 2. **Sync Layer** ([`sync`]): [`SharedUart`], the port behind its
//!    critical-section lock, plus the deferred receive task
//! 3. **HAL Layer** ([`hal`]): register bank and DMA channel capabilities
//!
//! ## Transfer Modes
//!
//! - **Polled**: the interrupt handler drains the RX FIFO into the line
//!   discipline and refills the TX FIFO from the transmit ring.
//! - **DMA**: transmit goes through a staging buffer on one uDMA channel.
//!   Receive runs a ping-pong pair on another channel, one byte on the
//!   primary descriptor and `S - 1` bytes on the alternate, so a capture
//!   can be cut after any byte. Captures are delivered from a deferred task
//!   outside the lock.
//!
//! The mode is chosen at attach time: a [`PortConfig`] with
//! [`DmaConfig`] runs in DMA mode, one without runs polled.
//!
//! # Features
//!
//! - `defmt`: Enable defmt logging and formatting for public types
//!
//! # Example
//!
//! ```ignore
//! use ph_lm3s_uart::hal::MmioUart;
//! use ph_lm3s_uart::unsafe_registers::SYSCTL_RCGC1_UART0;
//! use ph_lm3s_uart::{LineConfig, Parity, PortConfig, SharedUart, Uart};
//!
//! static UART0: SharedUart<MmioUart> = SharedUart::new();
//!
//! // SAFETY: UART0 block, nothing else owns it
//! let regs = unsafe { MmioUart::new(0x4000_C000, SYSCTL_RCGC1_UART0) };
//! UART0.install(Uart::new(PortConfig::new(regs, 50_000_000))?);
//!
//! UART0.with(|uart| {
//!     uart.startup()?;
//!     uart.configure(&LineConfig::new().with_baud(115_200).with_parity(Parity::None))
//! });
//!
//! UART0.write(b"hello\r\n")?;
//! ```
//!
//! # Memory Requirements
//!
//! The transmit ring is stored inline (`TX_SIZE` bytes, 4 KiB by default).
//! DMA mode additionally borrows two caller-provided `'static` buffers.

#![no_std]
#![deny(missing_docs)]
#![allow(unsafe_code)]
#![deny(unsafe_op_in_unsafe_fn)]
// Clippy lint levels live here; thresholds and config are in Cargo.toml.
#![deny(clippy::correctness)]
#![warn(
    clippy::suspicious,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::cloned_instead_of_copied,
    clippy::explicit_iter_loop,
    clippy::implicit_clone,
    clippy::inconsistent_struct_constructor,
    clippy::manual_assert,
    clippy::manual_let_else,
    clippy::match_same_arms,
    clippy::needless_pass_by_value,
    clippy::semicolon_if_nothing_returned,
    clippy::uninlined_format_args,
    clippy::unnested_or_patterns,
    clippy::std_instead_of_core,
    clippy::std_instead_of_alloc,
    clippy::alloc_instead_of_core
)]
#![allow(
    clippy::mod_module_files,
    clippy::self_named_module_files,
    clippy::similar_names,
    clippy::struct_excessive_bools,
    clippy::type_complexity,
    clippy::must_use_candidate,
    clippy::assertions_on_constants,
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap,
    clippy::cast_sign_loss,
    clippy::cast_lossless,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::module_name_repetitions,
    clippy::wildcard_imports,
    clippy::items_after_statements
)]

// =============================================================================
// Modules
// =============================================================================

pub mod driver;
pub mod hal;
pub mod sync;

// Internal implementation details (pub(crate) only)
mod internal;

// Test utilities (only available during testing)
#[cfg(test)]
pub mod testing;

// =============================================================================
// Re-exports
// =============================================================================

pub use driver::config::{
    DataBits, DmaConfig, InputFlags, LineConfig, Mode, Parity, PortConfig, State, StopBits,
};
pub use driver::error::{
    ConfigError, ConfigResult, DmaError, DmaResult, Error, IoError, IoResult, Result,
};
pub use driver::interrupt::{InterruptStatus, IrqOutcome};
pub use driver::line::CommittedConfig;
pub use driver::rx::{RxFlag, RxFlags, SerialClient};
pub use driver::uart::Uart;
pub use internal::pingpong::RxWork;
pub use internal::ring::RingBuffer;
pub use sync::{RxWorkStatus, SharedUart};

/// Low-level register definitions for advanced use.
///
/// Most users should go through [`Uart`]. These are exposed for board code
/// that builds its own [`hal::UartRegisters`] implementation or needs the
/// clock gate masks for [`hal::MmioUart::new`].
///
/// # Safety
///
/// Writing these registers behind the driver's back bypasses its state
/// tracking. Hold the port lock and restore anything you change.
pub mod unsafe_registers {
    pub use crate::internal::register::sysctl::{
        SYSCTL_RCGC1, SYSCTL_RCGC1_UART0, SYSCTL_RCGC1_UART1, SYSCTL_RCGC1_UART2,
    };
    pub use crate::internal::register::uart::*;
}

/// Shared driver constants.
///
/// These are grouped into a dedicated module to keep the top-level facade
/// focused on driver types.
pub mod constants {
    pub use crate::internal::constants::{
        // Timing
        CONSOLE_POLL_INTERVAL_US,
        CONSOLE_TX_TIMEOUT_US,
        // Baud rate
        DEFAULT_BAUD,
        DEFAULT_MAX_BAUD,
        // Buffer sizes
        DEFAULT_TX_RING_SIZE,
        FIFO_DEPTH,
        FRACTIONAL_STEPS,
        MAX_INTEGER_DIVISOR,
        MIN_RX_SLOT_SIZE,
        OVERSAMPLING,
        RX_BATCH_SIZE,
        // Handler bounds
        RX_POLL_LIMIT,
        RX_WORK_MAX_PASSES,
        WAKEUP_CHARS,
    };
}

// =============================================================================
// Macro Helpers
// =============================================================================

/// Declare a static, ISR-safe UART instance.
///
/// # Examples
///
/// ```ignore
/// ph_lm3s_uart::uart_static!(UART0, MmioUart);
/// ph_lm3s_uart::uart_static!(UART1, MmioUart, UdmaChannel, 1024);
/// ```
#[macro_export]
macro_rules! uart_static {
    ($name:ident, $regs:ty) => {
        static $name: $crate::sync::SharedUart<$regs> = $crate::sync::SharedUart::new();
    };
    ($name:ident, $regs:ty, $dma:ty, $tx:expr) => {
        static $name: $crate::sync::SharedUart<$regs, $dma, { $tx }> =
            $crate::sync::SharedUart::new();
    };
}
