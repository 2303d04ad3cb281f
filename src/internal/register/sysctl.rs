//! System Control register definitions used by the UART driver.

/// Run-Mode Clock Gating Control Register 1 (absolute address)
pub const SYSCTL_RCGC1: usize = 0x400F_E104;

/// UART0 clock gate bit in RCGC1
pub const SYSCTL_RCGC1_UART0: u32 = 1 << 0;
/// UART1 clock gate bit in RCGC1
pub const SYSCTL_RCGC1_UART1: u32 = 1 << 1;
/// UART2 clock gate bit in RCGC1
pub const SYSCTL_RCGC1_UART2: u32 = 1 << 2;
