//! Error types for the LM3S UART driver
//!
//! Errors are organized by domain for better diagnostics:
//! - [`ConfigError`]: Attach-time and lifecycle failures
//! - [`DmaError`]: DMA channel and buffer setup issues
//! - [`IoError`]: Runtime read/write failures
//!
//! The unified [`Error`] enum wraps all domain errors.
//!
//! Conditions the hardware raises at runtime (break, parity, framing and
//! overrun on a received byte), out-of-range baud requests and a full
//! transmit ring are *not* errors: they are counted, clamped, or reported as
//! a short accepted count.

// =============================================================================
// Configuration Errors
// =============================================================================

/// Attach-time and lifecycle errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Port already started
    AlreadyOpen,
    /// Reference clock is zero
    InvalidClock,
    /// Maximum baud rate is zero or unreachable with the reference clock
    InvalidMaxBaud,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ConfigError {
    /// Returns a human-readable description of the error
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            ConfigError::AlreadyOpen => "port already open",
            ConfigError::InvalidClock => "invalid reference clock",
            ConfigError::InvalidMaxBaud => "invalid maximum baud rate",
        }
    }
}

// =============================================================================
// DMA Errors
// =============================================================================

/// DMA channel and buffer errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DmaError {
    /// Transmit staging buffer is empty
    StagingBufferTooSmall,
    /// Receive buffer cannot hold two slots of at least two bytes
    RxBufferTooSmall,
    /// Transmit and receive were given the same channel
    ChannelConflict,
}

impl core::fmt::Display for DmaError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl DmaError {
    /// Returns a human-readable description of the error
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            DmaError::StagingBufferTooSmall => "TX staging buffer too small",
            DmaError::RxBufferTooSmall => "RX ping-pong buffer too small",
            DmaError::ChannelConflict => "TX and RX share a DMA channel",
        }
    }
}

// =============================================================================
// I/O Errors
// =============================================================================

/// Runtime I/O errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum IoError {
    /// Operation timed out
    Timeout,
    /// Invalid state for operation (e.g., port not started)
    InvalidState,
}

impl core::fmt::Display for IoError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl IoError {
    /// Returns a human-readable description of the error
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            IoError::Timeout => "operation timed out",
            IoError::InvalidState => "invalid state for operation",
        }
    }
}

// =============================================================================
// Unified Error Type
// =============================================================================

/// This enum wraps all domain-specific errors for unified error handling.
///
/// ```ignore
/// match Uart::new(config) {
///     Err(Error::Config(ConfigError::InvalidClock)) => { /* ... */ }
///     Err(Error::Dma(DmaError::ChannelConflict)) => { /* ... */ }
///     _ => {}
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// Configuration error
    Config(ConfigError),
    /// DMA error
    Dma(DmaError),
    /// I/O error
    Io(IoError),
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Error::Config(e) => write!(f, "config: {}", e.as_str()),
            Error::Dma(e) => write!(f, "dma: {}", e.as_str()),
            Error::Io(e) => write!(f, "io: {}", e.as_str()),
        }
    }
}

// From impls for automatic conversion
impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Error::Config(e)
    }
}

impl From<DmaError> for Error {
    fn from(e: DmaError) -> Self {
        Error::Dma(e)
    }
}

impl From<IoError> for Error {
    fn from(e: IoError) -> Self {
        Error::Io(e)
    }
}

/// Result type alias for UART operations
pub type Result<T> = core::result::Result<T, Error>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = core::result::Result<T, ConfigError>;

/// Result type alias for DMA operations
pub type DmaResult<T> = core::result::Result<T, DmaError>;

/// Result type alias for I/O operations
pub type IoResult<T> = core::result::Result<T, IoError>;

// =============================================================================
// Unit Tests
// =============================================================================
