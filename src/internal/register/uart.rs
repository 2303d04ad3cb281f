//! UART Register Definitions
//!
//! Offsets are relative to a port's base address. Field encodings follow the
//! Stellaris LM3S data sheet (PL011-derived UART block).

// =============================================================================
// Register Offsets
// =============================================================================

/// Data Register offset
pub const UARTDR_OFFSET: usize = 0x000;
/// Receive Status / Error Clear Register offset
pub const UARTRSR_OFFSET: usize = 0x004;
/// Flag Register offset
pub const UARTFR_OFFSET: usize = 0x018;
/// Integer Baud-Rate Divisor Register offset
pub const UARTIBRD_OFFSET: usize = 0x024;
/// Fractional Baud-Rate Divisor Register offset
pub const UARTFBRD_OFFSET: usize = 0x028;
/// Line Control, High Byte Register offset
pub const UARTLCRH_OFFSET: usize = 0x02C;
/// Control Register offset
pub const UARTCTL_OFFSET: usize = 0x030;
/// Interrupt FIFO Level Select Register offset
pub const UARTIFLS_OFFSET: usize = 0x034;
/// Interrupt Mask Register offset
pub const UARTIM_OFFSET: usize = 0x038;
/// Raw Interrupt Status Register offset
pub const UARTRIS_OFFSET: usize = 0x03C;
/// Masked Interrupt Status Register offset
pub const UARTMIS_OFFSET: usize = 0x040;
/// Interrupt Clear Register offset
pub const UARTICR_OFFSET: usize = 0x044;
/// DMA Control Register offset
pub const UARTDMACTL_OFFSET: usize = 0x048;

// =============================================================================
// Data Register (UARTDR) Bits
// =============================================================================

/// Received/transmitted character
pub const UARTDR_DATA_MASK: u32 = 0xFF;
/// Framing error
pub const UARTDR_FE: u32 = 1 << 8;
/// Parity error
pub const UARTDR_PE: u32 = 1 << 9;
/// Break error
pub const UARTDR_BE: u32 = 1 << 10;
/// Overrun error
pub const UARTDR_OE: u32 = 1 << 11;

// =============================================================================
// Flag Register (UARTFR) Bits
// =============================================================================

/// UART busy transmitting
pub const UARTFR_BUSY: u32 = 1 << 3;
/// Receive FIFO empty
pub const UARTFR_RXFE: u32 = 1 << 4;
/// Transmit FIFO full
pub const UARTFR_TXFF: u32 = 1 << 5;
/// Receive FIFO full
pub const UARTFR_RXFF: u32 = 1 << 6;
/// Transmit FIFO empty
pub const UARTFR_TXFE: u32 = 1 << 7;

// =============================================================================
// Line Control Register (UARTLCRH) Bits
// =============================================================================

/// Send break
pub const UARTLCRH_BRK: u32 = 1 << 0;
/// Parity enable
pub const UARTLCRH_PEN: u32 = 1 << 1;
/// Even parity select
pub const UARTLCRH_EPS: u32 = 1 << 2;
/// Two stop bits select
pub const UARTLCRH_STP2: u32 = 1 << 3;
/// FIFO enable
pub const UARTLCRH_FEN: u32 = 1 << 4;
/// Word length shift
pub const UARTLCRH_WLEN_SHIFT: u32 = 5;
/// Word length mask
pub const UARTLCRH_WLEN_MASK: u32 = 0x3 << 5;
/// Stick parity select
pub const UARTLCRH_SPS: u32 = 1 << 7;

/// Word length field values
pub mod wlen {
    /// 5 data bits
    pub const WLEN_5: u32 = 0;
    /// 6 data bits
    pub const WLEN_6: u32 = 1;
    /// 7 data bits
    pub const WLEN_7: u32 = 2;
    /// 8 data bits
    pub const WLEN_8: u32 = 3;
}

// =============================================================================
// Control Register (UARTCTL) Bits
// =============================================================================

/// UART enable
pub const UARTCTL_UARTEN: u32 = 1 << 0;
/// Transmit enable
pub const UARTCTL_TXE: u32 = 1 << 8;
/// Receive enable
pub const UARTCTL_RXE: u32 = 1 << 9;

// =============================================================================
// Interrupt FIFO Level Select (UARTIFLS) Bits
// =============================================================================

/// RX FIFO level select shift
pub const UARTIFLS_RXIFLSEL_SHIFT: u32 = 3;
/// RX FIFO level select mask
pub const UARTIFLS_RXIFLSEL_MASK: u32 = 0x7 << 3;
/// RX interrupt when FIFO is 1/8 full
pub const UARTIFLS_RXIFLSEL_1_8: u32 = 0 << 3;

// =============================================================================
// Interrupt Mask / Status Bits (UARTIM, UARTRIS, UARTMIS, UARTICR)
// =============================================================================

/// Receive interrupt
pub const UARTINT_RX: u32 = 1 << 4;
/// Transmit interrupt
pub const UARTINT_TX: u32 = 1 << 5;
/// Receive timeout interrupt
pub const UARTINT_RT: u32 = 1 << 6;
/// Framing error interrupt
pub const UARTINT_FE: u32 = 1 << 7;
/// Parity error interrupt
pub const UARTINT_PE: u32 = 1 << 8;
/// Break error interrupt
pub const UARTINT_BE: u32 = 1 << 9;
/// Overrun error interrupt
pub const UARTINT_OE: u32 = 1 << 10;

/// Value written to UARTICR to acknowledge every source
pub const UARTICR_ALL: u32 = 0xFFFF_FFFF;

// =============================================================================
// DMA Control Register (UARTDMACTL) Bits
// =============================================================================

/// Receive DMA enable
pub const UARTDMACTL_RXDMAE: u32 = 1 << 0;
/// Transmit DMA enable
pub const UARTDMACTL_TXDMAE: u32 = 1 << 1;
