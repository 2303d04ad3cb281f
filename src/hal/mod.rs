//! Hardware Abstraction Layer
//!
//! Capability traits the driver core is written against, plus their
//! memory-mapped implementations.
//!
//! # Modules
//!
//! - [`registers`]: UART register bank access and clock gating
//! - [`dma`]: DMA channel control (descriptor setup, start/stop, acknowledge)
//!
//! Substituting these traits is how the host tests drive the engines against
//! a simulated peripheral.

pub mod dma;
pub mod registers;

// Re-export commonly used types
pub use dma::{Descriptor, Direction, DmaChannel, NoDma, Transfer, TransferMode};
pub use registers::{MmioUart, UartRegisters};
