//! Configuration types for the W5500 driver.

use crate::constants::{
    DEFAULT_CONNECT_TIMEOUT_MS, DEFAULT_MAC, DEFAULT_PORT_SEED, DEFAULT_VERIFY_RETRIES,
    SEND_POLL_US, STATUS_POLL_US,
};
use crate::net::MacAddress;
use crate::registers::sock_mode;

// =============================================================================
// Chip Identity
// =============================================================================

/// Detected chip model.
///
/// The family shares one register layout; only the W5500 is supported
/// today, but identity is carried explicitly so callers can log it and
/// future family members can extend the enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ChipId {
    /// WIZnet W5500, version register `0x04`.
    #[default]
    W5500,
}

impl ChipId {
    /// Human-readable chip name.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::W5500 => "w5500",
        }
    }
}

/// Policy applied when the version register does not match the
/// expected chip signature at initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ChipCheck {
    /// Fail initialization with
    /// [`ConfigError::ChipNotDetected`](crate::error::ConfigError).
    #[default]
    Strict,
    /// Log a warning and proceed assuming a W5500 is present.
    ///
    /// Risky: a mismatched device's registers will be written as if it
    /// were a W5500.
    Lenient,
}

// =============================================================================
// Protocol
// =============================================================================

/// Protocol mode a socket can be opened in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Protocol {
    /// TCP stream socket.
    #[default]
    Tcp,
    /// UDP datagram socket.
    Udp,
    /// Raw MAC frames (hardware restricts this to socket 0).
    Macraw,
}

impl Protocol {
    /// The `Sn_MR` value programming this protocol.
    pub const fn mode_bits(self) -> u8 {
        match self {
            Self::Tcp => sock_mode::TCP,
            Self::Udp => sock_mode::UDP,
            Self::Macraw => sock_mode::MACRAW,
        }
    }
}

// =============================================================================
// Link Reporting
// =============================================================================

/// Physical-layer connectivity, independent of any socket state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkStatus {
    /// Cable present and negotiation complete.
    Up,
    /// No cable or negotiation not complete.
    #[default]
    Down,
}

impl LinkStatus {
    /// `true` when the link is up.
    pub const fn is_up(self) -> bool {
        matches!(self, Self::Up)
    }
}

/// Negotiated link speed. Meaningful only while the link is up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Speed {
    /// 10 Mbps.
    Mbps10,
    /// 100 Mbps.
    #[default]
    Mbps100,
}

/// Negotiated duplex mode. Meaningful only while the link is up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Duplex {
    /// Half duplex.
    Half,
    /// Full duplex.
    #[default]
    Full,
}

// =============================================================================
// Poll Limits
// =============================================================================

/// Bound on a polling loop.
///
/// Every wait in the driver (status transitions, command self-clear,
/// stable size reads, send completion) takes one of these; `Infinite`
/// is an explicit caller choice, never a default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PollLimit {
    /// Give up after this many poll iterations.
    Bounded(u32),
    /// Poll until the condition holds, however long that takes.
    Infinite,
}

impl PollLimit {
    /// Whether `iterations` completed polls exhaust this limit.
    pub const fn expired(self, iterations: u32) -> bool {
        match self {
            Self::Bounded(max) => iterations >= max,
            Self::Infinite => false,
        }
    }

    /// A bound equivalent to `ms` milliseconds of polling at
    /// `interval_us` microseconds per iteration.
    pub const fn from_millis(ms: u32, interval_us: u32) -> Self {
        if interval_us == 0 {
            Self::Bounded(ms)
        } else {
            Self::Bounded(ms.saturating_mul(1_000) / interval_us)
        }
    }
}

// =============================================================================
// Device Configuration
// =============================================================================

/// Complete driver configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DeviceConfig {
    /// Hardware MAC address programmed at initialization.
    pub mac: MacAddress,
    /// Policy on a version-register mismatch.
    pub chip_check: ChipCheck,
    /// Verified-write attempt budget (including the first write).
    pub verify_retries: u8,
    /// Bound on the TCP connect establishment wait.
    pub connect_limit: PollLimit,
    /// Bound on the send-complete wait in `socket_write`.
    pub send_limit: PollLimit,
    /// Seed for the ephemeral source-port generator. Must be nonzero.
    pub port_seed: u32,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl DeviceConfig {
    /// Create a configuration with the reference defaults.
    pub const fn new() -> Self {
        Self {
            mac: MacAddress(DEFAULT_MAC),
            chip_check: ChipCheck::Strict,
            verify_retries: DEFAULT_VERIFY_RETRIES,
            connect_limit: PollLimit::from_millis(DEFAULT_CONNECT_TIMEOUT_MS, STATUS_POLL_US),
            send_limit: PollLimit::from_millis(DEFAULT_CONNECT_TIMEOUT_MS, SEND_POLL_US),
            port_seed: DEFAULT_PORT_SEED,
        }
    }

    /// Set the MAC address.
    #[must_use]
    pub const fn with_mac(mut self, mac: MacAddress) -> Self {
        self.mac = mac;
        self
    }

    /// Set the chip-identity policy.
    #[must_use]
    pub const fn with_chip_check(mut self, check: ChipCheck) -> Self {
        self.chip_check = check;
        self
    }

    /// Set the verified-write attempt budget.
    #[must_use]
    pub const fn with_verify_retries(mut self, retries: u8) -> Self {
        self.verify_retries = retries;
        self
    }

    /// Set the TCP connect wait bound.
    #[must_use]
    pub const fn with_connect_limit(mut self, limit: PollLimit) -> Self {
        self.connect_limit = limit;
        self
    }

    /// Set the send-complete wait bound.
    #[must_use]
    pub const fn with_send_limit(mut self, limit: PollLimit) -> Self {
        self.send_limit = limit;
        self
    }

    /// Set the ephemeral-port generator seed.
    #[must_use]
    pub const fn with_port_seed(mut self, seed: u32) -> Self {
        self.port_seed = seed;
        self
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
