//! Core driver components for the LM3S UART.
//!
//! - [`config`] - Platform and line configuration types
//! - [`error`] - Error types and result aliases
//! - [`baud`] - Fractional baud divisor calculation
//! - [`line`] - Line configuration commit
//! - [`tx`] / [`rx`] - Transmit and receive engines
//! - [`interrupt`] - Interrupt status parsing
//! - [`uart`] - The port itself
//!
//! # Example
//!
//! ```ignore
//! use ph_lm3s_uart::driver::{LineConfig, Parity, PortConfig, Uart};
//!
//! let mut uart: Uart<_> = Uart::new(PortConfig::new(regs, 50_000_000))?;
//! uart.startup()?;
//! uart.configure(&LineConfig::new().with_baud(38_400).with_parity(Parity::Even))?;
//! ```

// Submodules
pub mod baud;
pub mod config;
pub mod counters;
pub mod error;
pub mod interrupt;
pub mod line;
pub mod rx;
pub mod tx;
pub mod uart;

// Re-exports for convenience
pub use baud::{BaudDivisor, clamp_baud, max_baud, min_baud};
pub use config::{
    DataBits, DmaConfig, InputFlags, LineConfig, Mode, Parity, PortConfig, State, StopBits,
};
pub use counters::PortCounters;
pub use error::{ConfigError, ConfigResult, DmaError, DmaResult, Error, IoError, IoResult, Result};
pub use interrupt::{InterruptStatus, IrqOutcome};
pub use line::CommittedConfig;
pub use rx::{RxFlag, RxFlags, RxStatus, SerialClient};
pub use tx::TxState;
pub use uart::Uart;
