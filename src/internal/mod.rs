//! Internal Implementation Details
//!
//! This module contains implementation details that are not part of the public API.
//! Types in this module may change without notice between minor versions.
//!
//! # Contents
//!
//! - [`register`]: Raw memory-mapped register definitions
//! - [`constants`]: Internal constants and magic numbers
//! - [`ring`]: Transmit ring buffer
//! - [`pingpong`]: Double-buffered DMA receive slots
//!
//! # Stability
//!
//! **WARNING:** This module is `pub(crate)` only. Do not depend on any types
//! or functions in this module from external code. They are subject to change
//! without notice.

pub(crate) mod constants;
pub(crate) mod pingpong;
pub(crate) mod register;
pub(crate) mod ring;
