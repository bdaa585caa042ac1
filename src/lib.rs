//! W5500 SPI Ethernet Controller Driver
//!
//! A `no_std`, `no_alloc` Rust driver for the WIZnet W5500, the
//! SPI-attached Ethernet controller with a built-in TCP/IP offload
//! engine and eight hardware sockets.
//!
//! # Architecture
//!
//! The driver is organized into three layers:
//!
//! 1. **Device Layer** ([`driver::device`]): Reset, detection, bring-up,
//!    and verified register access
//! 2. **Socket Layer** ([`driver::socket`], [`driver::transfer`]): The
//!    eight-slot state machine and the TCP/UDP data path over the
//!    chip's 2 KB ring buffers
//! 3. **HAL Layer** ([`hal`]): SPI transaction framing and reset
//!    sequencing over `embedded-hal 1.0` traits
//!
//! Every wait is bounded by default; chip identity is checked strictly
//! at bring-up unless [`ChipCheck::Lenient`] is configured.
//!
//! # Features
//!
//! - `defmt`: Enable defmt formatting for driver types and structured
//!   logging at initialization and socket milestones
//! - `critical-section`: Enable the ISR-safe [`SharedW5500`](sync)
//!   wrapper
//!
//! # Example
//!
//! ```ignore
//! use wiznet5k::hal::SpiTransport;
//! use wiznet5k::{DeviceConfig, IfConfig, IpAddress, Protocol, Wiznet5k};
//!
//! // spi, cs, and delay come from your HAL.
//! let bus = SpiTransport::new(spi, cs, delay_a);
//! let mut eth = Wiznet5k::new(bus, delay_b, DeviceConfig::new());
//!
//! eth.initialize()?;
//! eth.set_ifconfig(IfConfig::new(
//!     IpAddress::new(192, 168, 1, 100),
//!     IpAddress::new(255, 255, 255, 0),
//!     IpAddress::new(192, 168, 1, 1),
//!     IpAddress::new(192, 168, 1, 1),
//! ))?;
//!
//! let sock = eth.get_socket()?;
//! eth.socket_connect(sock, IpAddress::new(192, 168, 1, 10), 80, Protocol::Tcp)?;
//! eth.socket_write(sock, b"GET / HTTP/1.0\r\n\r\n")?;
//! ```
//!
//! # Hardware Notes
//!
//! The default bus timings are deliberately conservative (settle delays
//! around every transaction edge), proven on jumper-wired modules at
//! 2 MHz. On clean, short traces use
//! [`BusTiming::fast`](hal::BusTiming::fast).

#![no_std]

// =============================================================================
// Modules
// =============================================================================

pub mod constants;
pub mod driver;
pub mod error;
pub mod hal;
pub mod net;
pub mod registers;

#[cfg(feature = "critical-section")]
#[cfg_attr(docsrs, doc(cfg(feature = "critical-section")))]
pub mod sync;

// Test utilities (only available during testing)
#[cfg(test)]
pub mod test_utils;

// =============================================================================
// Re-exports
// =============================================================================

pub use driver::{
    ChipCheck, ChipId, DeviceConfig, Duplex, LinkStatus, PollLimit, Protocol, RecvResult,
    SocketId, SocketInterrupt, SocketStatus, Speed, Wiznet5k,
};
pub use error::{
    BusError, BusResult, ConfigError, ConfigResult, Error, Result, SocketError, SocketResult,
};
pub use hal::{BusTiming, BusTransport, ResetController, SpiTransport, Transfer};
pub use net::{IfConfig, IpAddress, MacAddress};

#[cfg(feature = "critical-section")]
pub use sync::{CriticalSectionCell, SharedW5500};
