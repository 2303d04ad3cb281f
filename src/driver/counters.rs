//! Per-port traffic and line-error counters.

/// Running counters for one port.
///
/// Error counters record one primary class per received byte, chosen in
/// the order break, parity, overrun, framing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PortCounters {
    /// Bytes received from the line
    pub rx: u32,
    /// Bytes handed to the hardware for transmission
    pub tx: u32,
    /// Bytes flagged with a receive overrun
    pub overrun: u32,
    /// Bytes flagged with a parity error
    pub parity: u32,
    /// Bytes flagged with a framing error
    pub frame: u32,
    /// Break conditions
    pub brk: u32,
}

impl PortCounters {
    /// Total line errors of any class
    #[must_use]
    pub const fn errors(&self) -> u32 {
        self.overrun
            .wrapping_add(self.parity)
            .wrapping_add(self.frame)
            .wrapping_add(self.brk)
    }

    pub(crate) fn add_rx(&mut self, n: usize) {
        self.rx = self.rx.wrapping_add(n as u32);
    }

    pub(crate) fn add_tx(&mut self, n: usize) {
        self.tx = self.tx.wrapping_add(n as u32);
    }
}
