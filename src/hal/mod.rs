//! Hardware abstraction: SPI bus transport and reset sequencing.
//!
//! The driver consumes hardware exclusively through `embedded-hal 1.0`
//! traits: [`SpiBus`](embedded_hal::spi::SpiBus) for the serial bus,
//! [`OutputPin`](embedded_hal::digital::OutputPin) for chip-select and
//! reset, and [`DelayNs`](embedded_hal::delay::DelayNs) for every
//! settle delay and poll interval.

pub mod bus;
pub mod reset;

pub use bus::{BusTiming, BusTransport, SpiTransport, Transfer};
pub use reset::{ResetController, hardware_reset};
