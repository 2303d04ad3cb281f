//! Synchronization support
//!
//! - [`CriticalSectionCell`] - ISR-safe interior mutability
//! - [`SharedUart`] - A port behind its critical-section lock, reachable
//!   from thread code, the UART interrupt and the deferred receive task
//!
//! # Example
//!
//! ```ignore
//! use ph_lm3s_uart::sync::SharedUart;
//!
//! static UART0: SharedUart<MmioUart, UdmaChannel> = SharedUart::new();
//!
//! #[interrupt]
//! fn UART0() {
//!     let outcome = UART0.on_interrupt(&mut TTY);
//!     if outcome.rx_work_pending {
//!         RX_TASK.pend();
//!     }
//! }
//!
//! fn rx_task() {
//!     if UART0.run_rx_work(&mut TTY).reschedule {
//!         RX_TASK.pend();
//!     }
//! }
//! ```

mod primitives;

pub use primitives::CriticalSectionCell;

mod shared;

pub use shared::{RxWorkStatus, SharedUart};
