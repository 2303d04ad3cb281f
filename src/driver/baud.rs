//! Fractional baud-rate divisor calculation.
//!
//! The UART divides its reference clock by `16 * BRD`, where the divisor
//! `BRD = BRDI + DIVFRAC / 64` has a 16-bit integer part and a 6-bit
//! fractional part:
//!
//! ```text
//! BRD     = clock / (16 * baud)
//! DIVFRAC = integer(fraction(BRD) * 64 + 0.5)
//! ```
//!
//! Both registers are latched into the baud generator only by a following
//! write to the line control register (see [`line`](super::line)).

use crate::internal::constants::{
    DEFAULT_BAUD, FRACTIONAL_STEPS, MAX_INTEGER_DIVISOR, OVERSAMPLING,
};

/// Integer and fractional divisor register values
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BaudDivisor {
    /// Integer part (`UARTIBRD`)
    pub integer: u32,
    /// 6-bit fractional part (`UARTFBRD`)
    pub fractional: u32,
}

impl BaudDivisor {
    /// Compute the divisor for `baud` from `clock_hz`.
    ///
    /// `baud` must be non-zero; callers clamp it first with [`clamp_baud`].
    #[must_use]
    pub const fn compute(clock_hz: u32, baud: u32) -> Self {
        let clock = clock_hz as u64;
        let den = baud as u64 * OVERSAMPLING as u64;
        let integer = (clock / den) as u32;
        let remainder = clock - den * integer as u64;
        // remainder < den < 2^36, so remainder * 64 stays inside u64
        let fractional = ((remainder * FRACTIONAL_STEPS as u64 + (den >> 1)) / den) as u32;

        // Rounding can carry a whole step into the integer part
        if fractional == FRACTIONAL_STEPS {
            Self {
                integer: integer + 1,
                fractional: 0,
            }
        } else {
            Self {
                integer,
                fractional,
            }
        }
    }

    /// Divisor in 1/64 steps
    #[inline]
    #[must_use]
    pub const fn in_steps(&self) -> u32 {
        self.integer * FRACTIONAL_STEPS + self.fractional
    }

    /// Baud rate the hardware will actually generate from `clock_hz`
    #[must_use]
    pub const fn effective_baud(&self, clock_hz: u32) -> u32 {
        let steps = self.in_steps() as u64;
        if steps == 0 {
            return 0;
        }
        // clock * 64 / (16 * steps), rounded to nearest
        let num = clock_hz as u64 * FRACTIONAL_STEPS as u64;
        let den = OVERSAMPLING as u64 * steps;
        ((num + den / 2) / den) as u32
    }
}

/// Lowest baud rate whose integer divisor fits the 16-bit register
#[must_use]
pub const fn min_baud(clock_hz: u32) -> u32 {
    let per_step = OVERSAMPLING * (MAX_INTEGER_DIVISOR + 1);
    clock_hz.div_ceil(per_step)
}

/// Highest baud rate the clock can generate, where `BRDI` is 1
#[must_use]
pub const fn max_baud(clock_hz: u32) -> u32 {
    clock_hz / OVERSAMPLING
}

/// Resolve a requested baud rate to one the port will program.
///
/// Zero selects [`DEFAULT_BAUD`]; anything outside
/// `[min_baud(clock_hz), min(max_baud, clock_hz / 16)]` is clamped, never
/// rejected.
#[must_use]
pub fn clamp_baud(requested: u32, clock_hz: u32, max_baud_limit: u32) -> u32 {
    let baud = if requested == 0 {
        DEFAULT_BAUD
    } else {
        requested
    };
    let low = min_baud(clock_hz).max(1);
    let high = max_baud_limit.min(max_baud(clock_hz)).max(low);
    baud.clamp(low, high)
}

// =============================================================================
// Unit Tests
// =============================================================================
