//! Network address types and formatting helpers.
//!
//! [`IpAddress`] and [`MacAddress`] are thin newtypes over the raw byte
//! arrays the chip's registers hold, with the dotted-quad and colon-hex
//! renderings the rest of the firmware prints. [`IfConfig`] bundles the
//! four addresses an interface configuration commits in one write.

use core::fmt;

// =============================================================================
// IP Address
// =============================================================================

/// An IPv4 address in register byte order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct IpAddress(pub [u8; 4]);

impl IpAddress {
    /// The all-zero address, used before configuration is committed.
    pub const UNSPECIFIED: Self = Self([0, 0, 0, 0]);

    /// Create an address from its four octets.
    pub const fn new(a: u8, b: u8, c: u8, d: u8) -> Self {
        Self([a, b, c, d])
    }

    /// Raw octets in transmission order.
    pub const fn octets(&self) -> [u8; 4] {
        self.0
    }

    /// Parse a dotted-quad string (`"192.168.1.10"`).
    ///
    /// Returns `None` unless the input is exactly four `.`-separated
    /// decimal octets in `0..=255`.
    pub fn parse(s: &str) -> Option<Self> {
        let mut octets = [0u8; 4];
        let mut count = 0;
        for part in s.split('.') {
            if count == 4 || part.is_empty() || part.len() > 3 {
                return None;
            }
            let mut value: u16 = 0;
            for c in part.bytes() {
                if !c.is_ascii_digit() {
                    return None;
                }
                value = value * 10 + u16::from(c - b'0');
            }
            if value > 255 {
                return None;
            }
            octets[count] = value as u8;
            count += 1;
        }
        if count == 4 { Some(Self(octets)) } else { None }
    }
}

impl fmt::Display for IpAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}.{}", self.0[0], self.0[1], self.0[2], self.0[3])
    }
}

impl From<[u8; 4]> for IpAddress {
    fn from(octets: [u8; 4]) -> Self {
        Self(octets)
    }
}

// =============================================================================
// MAC Address
// =============================================================================

/// A 48-bit Ethernet hardware address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MacAddress(pub [u8; 6]);

impl MacAddress {
    /// Create an address from its six octets.
    pub const fn new(octets: [u8; 6]) -> Self {
        Self(octets)
    }

    /// Raw octets in transmission order.
    pub const fn octets(&self) -> [u8; 6] {
        self.0
    }
}

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}",
            self.0[0], self.0[1], self.0[2], self.0[3], self.0[4], self.0[5]
        )
    }
}

impl From<[u8; 6]> for MacAddress {
    fn from(octets: [u8; 6]) -> Self {
        Self(octets)
    }
}

// =============================================================================
// Interface Configuration
// =============================================================================

/// One complete interface configuration: address, mask, gateway, DNS.
///
/// Committed to the chip with
/// [`set_ifconfig`](crate::driver::Wiznet5k::set_ifconfig); the DNS
/// server is not a chip register and is cached by the driver for the
/// DNS client to read back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct IfConfig {
    /// Source IP address (`SIPR`).
    pub ip: IpAddress,
    /// Subnet mask (`SUBR`).
    pub subnet: IpAddress,
    /// Gateway address (`GAR`).
    pub gateway: IpAddress,
    /// DNS server, cached driver-side.
    pub dns: IpAddress,
}

impl IfConfig {
    /// Create a configuration from its four addresses.
    pub const fn new(ip: IpAddress, subnet: IpAddress, gateway: IpAddress, dns: IpAddress) -> Self {
        Self {
            ip,
            subnet,
            gateway,
            dns,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
