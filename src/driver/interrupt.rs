//! Socket interrupt flags.
//!
//! Each socket latches five event bits in `Sn_IR`. The driver consumes
//! SEND_OK internally during transmits; everything else is left for the
//! application to poll and acknowledge.

use embedded_hal::delay::DelayNs;

use crate::driver::device::Wiznet5k;
use crate::driver::socket::SocketId;
use crate::error::Result;
use crate::hal::BusTransport;
use crate::registers::{sock_ir, socket};

// =============================================================================
// Interrupt Flags
// =============================================================================

/// Decoded socket interrupt register (`Sn_IR`).
///
/// Flags stay latched until acknowledged with
/// [`clear_socket_interrupt`](Wiznet5k::clear_socket_interrupt).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SocketInterrupt {
    /// Connection established (TCP handshake completed).
    pub connected: bool,
    /// Peer sent FIN.
    pub disconnected: bool,
    /// Data arrived in the RX buffer.
    pub recv_pending: bool,
    /// ARP or TCP retransmission gave up.
    pub timeout: bool,
    /// A SEND command completed.
    pub send_ok: bool,
}

impl SocketInterrupt {
    /// Decode a raw `Sn_IR` byte.
    pub const fn from_raw(raw: u8) -> Self {
        Self {
            connected: raw & sock_ir::CON != 0,
            disconnected: raw & sock_ir::DISCON != 0,
            recv_pending: raw & sock_ir::RECV != 0,
            timeout: raw & sock_ir::TIMEOUT != 0,
            send_ok: raw & sock_ir::SEND_OK != 0,
        }
    }

    /// Encode back to the raw register layout (for write-1-to-clear).
    pub const fn to_raw(self) -> u8 {
        let mut raw = 0;
        if self.connected {
            raw |= sock_ir::CON;
        }
        if self.disconnected {
            raw |= sock_ir::DISCON;
        }
        if self.recv_pending {
            raw |= sock_ir::RECV;
        }
        if self.timeout {
            raw |= sock_ir::TIMEOUT;
        }
        if self.send_ok {
            raw |= sock_ir::SEND_OK;
        }
        raw
    }

    /// Whether any flag is set.
    pub const fn any(self) -> bool {
        self.connected || self.disconnected || self.recv_pending || self.timeout || self.send_ok
    }

    /// All flags set; clears everything when passed to
    /// [`clear_socket_interrupt`](Wiznet5k::clear_socket_interrupt).
    pub const fn all() -> Self {
        Self {
            connected: true,
            disconnected: true,
            recv_pending: true,
            timeout: true,
            send_ok: true,
        }
    }
}

impl<B, D> Wiznet5k<B, D>
where
    B: BusTransport,
    D: DelayNs,
{
    /// Read a socket's latched interrupt flags without clearing them.
    pub fn socket_interrupt(&mut self, sock: SocketId) -> Result<SocketInterrupt> {
        let raw = self.read_u8(sock.regs(), socket::SN_IR)?;
        Ok(SocketInterrupt::from_raw(raw))
    }

    /// Acknowledge the given flags (write-1-to-clear); others stay
    /// latched.
    pub fn clear_socket_interrupt(&mut self, sock: SocketId, flags: SocketInterrupt) -> Result<()> {
        self.write_u8(sock.regs(), socket::SN_IR, flags.to_raw())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
