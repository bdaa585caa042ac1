//! W5500 driver core: configuration, the device handle, and the socket
//! state machine with its TCP/UDP data path.

pub mod config;
pub mod device;
pub mod interrupt;
pub mod socket;
pub mod transfer;

pub use config::{ChipCheck, ChipId, DeviceConfig, Duplex, LinkStatus, PollLimit, Protocol, Speed};
pub use device::Wiznet5k;
pub use interrupt::SocketInterrupt;
pub use socket::{SocketId, SocketStatus};
pub use transfer::RecvResult;
