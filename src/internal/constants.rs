//! Centralized Constants
//!
//! This module provides a single source of truth for the sizes, limits and
//! timing values used throughout the UART driver.
//!
//! # Organization
//!
//! Constants are grouped by category:
//! - **Buffer sizes**: transmit ring, receive batch, hardware FIFO depth
//! - **Baud rate**: default, maximum and divisor limits
//! - **Handler bounds**: per-interrupt and per-task work limits
//! - **Timing**: console polling timeout
//!
//! # Note
//!
//! Hardware register bit definitions remain in `register/uart.rs` and
//! `register/sysctl.rs` as they are specific to those hardware blocks.

// =============================================================================
// Buffer Sizes
// =============================================================================

/// Default transmit ring size in bytes (must be a power of two)
pub const DEFAULT_TX_RING_SIZE: usize = 4096;

/// Pending-byte count below which the producer is invited to refill
pub const WAKEUP_CHARS: usize = 256;

/// Depth of the hardware TX and RX FIFOs
pub const FIFO_DEPTH: usize = 16;

/// Capacity of the polled receive batch. Every drained character may be
/// followed by an overrun marker, so one interrupt's worth always fits and
/// reaches the line discipline in a single delivery.
pub const RX_BATCH_SIZE: usize = 2 * RX_POLL_LIMIT;

/// Smallest usable ping-pong slot (one byte descriptor plus at least one
/// byte in the chained descriptor)
pub const MIN_RX_SLOT_SIZE: usize = 2;

// =============================================================================
// Baud Rate
// =============================================================================

/// Baud rate used when none (zero) is requested
pub const DEFAULT_BAUD: u32 = 9600;

/// Highest baud rate the driver will program by default
pub const DEFAULT_MAX_BAUD: u32 = 230_400;

/// Largest value accepted by the 16-bit integer divisor register
pub const MAX_INTEGER_DIVISOR: u32 = 0xFFFF;

/// Number of fractional divisor steps (6-bit field)
pub const FRACTIONAL_STEPS: u32 = 64;

/// Baud16 oversampling factor
pub const OVERSAMPLING: u32 = 16;

// =============================================================================
// Handler Bounds
// =============================================================================

/// Maximum characters drained by the polled receive path per interrupt
pub const RX_POLL_LIMIT: usize = 256;

/// Maximum passes of the deferred receive loop before it asks to be
/// rescheduled
pub const RX_WORK_MAX_PASSES: usize = 8;

// =============================================================================
// Timing
// =============================================================================

/// Console write timeout per character in microseconds
pub const CONSOLE_TX_TIMEOUT_US: u32 = 10_000;

/// Console poll interval in microseconds
pub const CONSOLE_POLL_INTERVAL_US: u32 = 1;
