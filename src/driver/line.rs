//! Line configuration: translating a [`LineConfig`] into register writes.
//!
//! # Commit protocol
//!
//! The integer and fractional divisor registers form one internal register
//! with `UARTLCRH` and are only latched by a write to `UARTLCRH`. The commit
//! therefore always runs:
//!
//! 1. `UARTCTL = 0` (UART disabled)
//! 2. `UARTIBRD = BRDI`
//! 3. `UARTFBRD = DIVFRAC`
//! 4. `UARTLCRH = line control`
//! 5. `UARTCTL = previous value`
//!
//! Any other order leaves a stale or half-written divisor in effect.

use super::baud::{BaudDivisor, clamp_baud};
use super::config::{DataBits, InputFlags, LineConfig, Parity, StopBits};
use super::rx::RxStatus;
use crate::hal::registers::UartRegisters;
use crate::internal::register::uart::{
    UARTCTL_OFFSET, UARTFBRD_OFFSET, UARTIBRD_OFFSET, UARTLCRH_EPS, UARTLCRH_OFFSET,
    UARTLCRH_PEN, UARTLCRH_SPS, UARTLCRH_STP2, UARTLCRH_WLEN_MASK, UARTLCRH_WLEN_SHIFT, wlen,
};

/// Configuration as written to the hardware
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommittedConfig {
    /// Line configuration as requested
    pub requested: LineConfig,
    /// Baud rate after clamping
    pub baud: u32,
    /// Divisor programmed for `baud`
    pub divisor: BaudDivisor,
    /// Value written to `UARTLCRH`
    pub lcrh: u32,
    /// Error classes reported to the line discipline
    pub read_status_mask: RxStatus,
    /// Error classes whose bytes are discarded
    pub ignore_status_mask: RxStatus,
}

/// Word length field value for `bits`
const fn wlen_bits(bits: DataBits) -> u32 {
    let field = match bits {
        DataBits::Five => wlen::WLEN_5,
        DataBits::Six => wlen::WLEN_6,
        DataBits::Seven => wlen::WLEN_7,
        DataBits::Eight => wlen::WLEN_8,
    };
    field << UARTLCRH_WLEN_SHIFT
}

/// Derive the new `UARTLCRH` value from the current one.
///
/// Only word length, parity and stop-bit fields are replaced; break and
/// FIFO-enable bits are carried over.
#[must_use]
pub fn line_control(current: u32, line: &LineConfig) -> u32 {
    let mut lcrh = current & !(UARTLCRH_WLEN_MASK | UARTLCRH_PEN | UARTLCRH_EPS | UARTLCRH_SPS);
    lcrh |= wlen_bits(line.data_bits);

    // EPS selects even parity; with SPS it selects the stuck value (0 = mark)
    lcrh |= match line.parity {
        Parity::None => 0,
        Parity::Odd => UARTLCRH_PEN,
        Parity::Even => UARTLCRH_PEN | UARTLCRH_EPS,
        Parity::Mark => UARTLCRH_PEN | UARTLCRH_SPS,
        Parity::Space => UARTLCRH_PEN | UARTLCRH_EPS | UARTLCRH_SPS,
    };

    match line.stop_bits {
        StopBits::One => lcrh & !UARTLCRH_STP2,
        StopBits::Two => lcrh | UARTLCRH_STP2,
    }
}

/// Compute the (read, ignore) status masks for an input policy.
#[must_use]
pub fn status_masks(input: InputFlags) -> (RxStatus, RxStatus) {
    let mut read = RxStatus::OVERRUN;
    if input.contains(InputFlags::CHECK_PARITY) {
        read |= RxStatus::FRAMING | RxStatus::PARITY;
    }
    if input.contains(InputFlags::REPORT_BREAK) {
        read |= RxStatus::BREAK;
    }

    let mut ignore = RxStatus::empty();
    if input.contains(InputFlags::IGNORE_PARITY) {
        ignore |= RxStatus::FRAMING | RxStatus::PARITY;
    }
    if input.contains(InputFlags::IGNORE_BREAK) {
        ignore |= RxStatus::BREAK;
        // Ignoring both parity and break means raw mode: drop overruns too
        if input.contains(InputFlags::IGNORE_PARITY) {
            ignore |= RxStatus::OVERRUN;
        }
    }

    (read, ignore)
}

/// Program `line` into the port and return what was committed.
///
/// The caller holds the port lock.
pub fn apply<R: UartRegisters>(
    regs: &mut R,
    clock_hz: u32,
    max_baud: u32,
    line: &LineConfig,
) -> CommittedConfig {
    let baud = clamp_baud(line.baud, clock_hz, max_baud);
    let divisor = BaudDivisor::compute(clock_hz, baud);
    let (read_status_mask, ignore_status_mask) = status_masks(line.input);

    let ctl = regs.read(UARTCTL_OFFSET);
    let lcrh = line_control(regs.read(UARTLCRH_OFFSET), line);

    regs.write(UARTCTL_OFFSET, 0);
    regs.write(UARTIBRD_OFFSET, divisor.integer);
    regs.write(UARTFBRD_OFFSET, divisor.fractional);
    regs.write(UARTLCRH_OFFSET, lcrh);
    regs.write(UARTCTL_OFFSET, ctl);

    #[cfg(feature = "defmt")]
    defmt::debug!(
        "line config: baud {} (requested {}), ibrd {}, fbrd {}, lcrh {:#x}",
        baud,
        line.baud,
        divisor.integer,
        divisor.fractional,
        lcrh
    );

    CommittedConfig {
        requested: *line,
        baud,
        divisor,
        lcrh,
        read_status_mask,
        ignore_status_mask,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::internal::register::uart::{UARTCTL_UARTEN, UARTLCRH_BRK, UARTLCRH_FEN};
    use crate::testing::MockUart;

    #[test]
    fn line_control_8n1() {
        let lcrh = line_control(0, &LineConfig::new());
        assert_eq!(lcrh, 3 << 5);
    }

    #[test]
    fn line_control_word_lengths() {
        for (bits, field) in [
            (DataBits::Five, 0),
            (DataBits::Six, 1),
            (DataBits::Seven, 2),
            (DataBits::Eight, 3),
        ] {
            let lcrh = line_control(0, &LineConfig::new().with_data_bits(bits));
            assert_eq!((lcrh & UARTLCRH_WLEN_MASK) >> UARTLCRH_WLEN_SHIFT, field);
        }
    }

    #[test]
    fn line_control_parity_modes() {
        let parity_bits = |p| {
            line_control(0, &LineConfig::new().with_parity(p))
                & (UARTLCRH_PEN | UARTLCRH_EPS | UARTLCRH_SPS)
        };
        assert_eq!(parity_bits(Parity::None), 0);
        assert_eq!(parity_bits(Parity::Odd), UARTLCRH_PEN);
        assert_eq!(parity_bits(Parity::Even), UARTLCRH_PEN | UARTLCRH_EPS);
        assert_eq!(parity_bits(Parity::Mark), UARTLCRH_PEN | UARTLCRH_SPS);
        assert_eq!(
            parity_bits(Parity::Space),
            UARTLCRH_PEN | UARTLCRH_EPS | UARTLCRH_SPS
        );
    }

    #[test]
    fn line_control_two_stop_bits() {
        let lcrh = line_control(0, &LineConfig::new().with_stop_bits(StopBits::Two));
        assert_ne!(lcrh & UARTLCRH_STP2, 0);

        let lcrh = line_control(UARTLCRH_STP2, &LineConfig::new());
        assert_eq!(lcrh & UARTLCRH_STP2, 0);
    }

    #[test]
    fn line_control_preserves_break_and_fifo_bits() {
        let current = UARTLCRH_BRK | UARTLCRH_FEN | UARTLCRH_PEN | UARTLCRH_EPS;
        let lcrh = line_control(current, &LineConfig::new());
        assert_ne!(lcrh & UARTLCRH_BRK, 0);
        assert_ne!(lcrh & UARTLCRH_FEN, 0);
        assert_eq!(lcrh & (UARTLCRH_PEN | UARTLCRH_EPS), 0);
    }

    #[test]
    fn status_masks_default_reports_overrun_only() {
        let (read, ignore) = status_masks(InputFlags::empty());
        assert_eq!(read, RxStatus::OVERRUN);
        assert!(ignore.is_empty());
    }

    #[test]
    fn status_masks_check_and_report() {
        let (read, _) = status_masks(InputFlags::CHECK_PARITY | InputFlags::REPORT_BREAK);
        assert_eq!(read, RxStatus::all());
    }

    #[test]
    fn status_masks_ignore_parity_only() {
        let (_, ignore) = status_masks(InputFlags::IGNORE_PARITY);
        assert_eq!(ignore, RxStatus::FRAMING | RxStatus::PARITY);
    }

    #[test]
    fn status_masks_ignore_break_only_keeps_overrun() {
        let (_, ignore) = status_masks(InputFlags::IGNORE_BREAK);
        assert_eq!(ignore, RxStatus::BREAK);
    }

    #[test]
    fn status_masks_raw_mode_ignores_overrun() {
        let (_, ignore) = status_masks(InputFlags::IGNORE_BREAK | InputFlags::IGNORE_PARITY);
        assert_eq!(ignore, RxStatus::all());
    }

    #[test]
    fn apply_writes_in_latch_order() {
        let mut regs = MockUart::new();
        regs.poke(UARTCTL_OFFSET, UARTCTL_UARTEN);
        regs.poke(UARTLCRH_OFFSET, UARTLCRH_FEN);
        regs.clear_write_log();

        let committed = apply(&mut regs, 16_000_000, 230_400, &LineConfig::new().with_baud(115_200));

        let expected_lcrh = UARTLCRH_FEN | (3 << 5);
        assert_eq!(
            regs.write_log(),
            [
                (UARTCTL_OFFSET, 0),
                (UARTIBRD_OFFSET, 8),
                (UARTFBRD_OFFSET, 44),
                (UARTLCRH_OFFSET, expected_lcrh),
                (UARTCTL_OFFSET, UARTCTL_UARTEN),
            ]
        );
        assert_eq!(committed.baud, 115_200);
        assert_eq!(committed.divisor, BaudDivisor { integer: 8, fractional: 44 });
        assert_eq!(committed.lcrh, expected_lcrh);
    }

    #[test]
    fn apply_reports_clamped_baud() {
        let mut regs = MockUart::new();
        let committed = apply(&mut regs, 16_000_000, 230_400, &LineConfig::new().with_baud(1_000_000));
        assert_eq!(committed.requested.baud, 1_000_000);
        assert_eq!(committed.baud, 230_400);
        assert_eq!(regs.peek(UARTIBRD_OFFSET), committed.divisor.integer);
    }
}
