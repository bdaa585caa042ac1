//! Error types for the W5500 driver
//!
//! Errors are organized by domain for better diagnostics:
//! - [`BusError`]: SPI transport failures (fatal to the in-progress call)
//! - [`ConfigError`]: Reset, identity, and verified-write failures
//! - [`SocketError`]: Socket state machine and deadline failures
//!
//! All variants are `Copy` and carry at most a small diagnostic payload,
//! so errors can cross ISR boundaries and be matched exhaustively in
//! tests. [`Error`] unifies the three domains; `From` impls let `?`
//! promote a domain error wherever the unified type is expected.

use embedded_hal::spi;

// =============================================================================
// Bus Errors
// =============================================================================

/// SPI transport errors.
///
/// A transport failure is fatal to the operation that issued it; nothing
/// at this layer retries. Retries (where appropriate) belong to the
/// verified-write logic above.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BusError {
    /// The SPI bus reported an error; the HAL's error kind is retained.
    Spi(spi::ErrorKind),
    /// The chip-select pin could not be driven.
    ChipSelect,
    /// The reset pin could not be driven.
    ResetPin,
}

impl BusError {
    /// Get a static string description of the error.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Spi(_) => "SPI bus fault",
            Self::ChipSelect => "chip-select pin fault",
            Self::ResetPin => "reset pin fault",
        }
    }
}

impl core::fmt::Display for BusError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Configuration Errors
// =============================================================================

/// Initialization and verified-write errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// The mode register did not read back zero within the bounded wait
    /// after a software reset.
    ResetFailed,
    /// The version register did not match the W5500 signature.
    ///
    /// Carries the value actually read. Raised only under
    /// [`ChipCheck::Strict`](crate::driver::ChipCheck); lenient mode logs
    /// and proceeds.
    ChipNotDetected {
        /// Raw version register contents.
        version: u8,
    },
    /// A verified register write still read back wrong after the full
    /// retry budget.
    VerificationFailed,
}

impl ConfigError {
    /// Get a static string description of the error.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::ResetFailed => "soft reset did not complete",
            Self::ChipNotDetected { .. } => "chip version mismatch",
            Self::VerificationFailed => "register write verification failed",
        }
    }
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Socket Errors
// =============================================================================

/// Socket state machine errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SocketError {
    /// The PHY reports no link; open/listen/connect refuse to start.
    LinkDown,
    /// Every socket slot is in use.
    NoFreeSocket,
    /// The socket was not in an openable state, or did not reach the
    /// INIT/UDP/MACRAW status after the OPEN command.
    OpenFailed,
    /// The socket fell back to CLOSED while waiting for LISTEN.
    ListenRejected,
    /// The peer refused or the socket closed before ESTABLISHED.
    ConnectFailed,
    /// A bounded wait elapsed (send-complete, connect, command-clear,
    /// or stable size read).
    Timeout,
    /// The status register returned a value outside the documented set.
    ///
    /// Usually indicates bus corruption; carries the raw byte.
    UnknownStatus(u8),
}

impl SocketError {
    /// Get a static string description of the error.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::LinkDown => "ethernet link down",
            Self::NoFreeSocket => "no free socket slot",
            Self::OpenFailed => "socket open failed",
            Self::ListenRejected => "listen rejected",
            Self::ConnectFailed => "connect failed",
            Self::Timeout => "operation timed out",
            Self::UnknownStatus(_) => "undocumented socket status",
        }
    }
}

impl core::fmt::Display for SocketError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Unified Error
// =============================================================================

/// Unified driver error covering all domains.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// SPI transport failure.
    Bus(BusError),
    /// Initialization or verified-write failure.
    Config(ConfigError),
    /// Socket state machine failure.
    Socket(SocketError),
}

impl Error {
    /// Get a static string description of the error.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Bus(e) => e.as_str(),
            Self::Config(e) => e.as_str(),
            Self::Socket(e) => e.as_str(),
        }
    }
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<BusError> for Error {
    fn from(err: BusError) -> Self {
        Self::Bus(err)
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Self::Config(err)
    }
}

impl From<SocketError> for Error {
    fn from(err: SocketError) -> Self {
        Self::Socket(err)
    }
}

// =============================================================================
// Result Aliases
// =============================================================================

/// Result alias for the unified error type.
pub type Result<T> = core::result::Result<T, Error>;

/// Result alias for transport-level operations.
pub type BusResult<T> = core::result::Result<T, BusError>;

/// Result alias for configuration operations.
pub type ConfigResult<T> = core::result::Result<T, ConfigError>;

/// Result alias for socket operations.
pub type SocketResult<T> = core::result::Result<T, SocketError>;

// =============================================================================
// Unit Tests
// =============================================================================
