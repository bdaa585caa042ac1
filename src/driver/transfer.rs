//! TX/RX buffer management: ring pointers, stable size reads, and the
//! TCP/UDP data path.
//!
//! The chip exposes each socket's 2 KB buffers through free-running
//! 16-bit pointers that wrap modulo 65536; the hardware masks them down
//! to the buffer, so the driver only ever adds and writes back. The
//! free-size and received-size registers can tear while the chip
//! updates them, so they are read until two consecutive bursts agree.

use embedded_hal::delay::DelayNs;

use crate::constants::{SEND_POLL_US, SOCKET_BUFFER_SIZE, STABLE_READ_ATTEMPTS, UDP_HEADER_SIZE};
use crate::driver::config::Protocol;
use crate::driver::device::Wiznet5k;
use crate::driver::socket::{SocketId, SocketStatus};
use crate::error::{Result, SocketError};
use crate::hal::BusTransport;
use crate::net::IpAddress;
use crate::registers::{sock_cmd, sock_ir, socket};

// =============================================================================
// Receive Types
// =============================================================================

/// Outcome of a receive call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RecvResult {
    /// This many bytes were copied into the caller's buffer.
    Received(usize),
    /// Nothing pending; the connection is still alive.
    WouldBlock,
    /// Nothing pending and the peer has closed: end of stream.
    Closed,
}

/// State of the UDP datagram currently being drained from a socket.
///
/// The chip prepends an 8-byte header (source IP, source port, payload
/// length) to every received datagram; the driver parses it once and
/// tracks how much of the payload the caller has consumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct UdpDatagram {
    pub remote_ip: IpAddress,
    pub remote_port: u16,
    pub bytes_remaining: u16,
}

impl UdpDatagram {
    pub(crate) const EMPTY: Self = Self {
        remote_ip: IpAddress::UNSPECIFIED,
        remote_port: 0,
        bytes_remaining: 0,
    };
}

// =============================================================================
// Data Path
// =============================================================================

impl<B, D> Wiznet5k<B, D>
where
    B: BusTransport,
    D: DelayNs,
{
    /// TX free space, read until two consecutive bursts agree.
    pub fn get_tx_free_size(&mut self, sock: SocketId) -> Result<u16> {
        self.stable_u16(sock, socket::SN_TX_FSR)
    }

    /// RX pending byte count, read until two consecutive bursts agree.
    pub fn get_rx_received_size(&mut self, sock: SocketId) -> Result<u16> {
        self.stable_u16(sock, socket::SN_RX_RSR)
    }

    fn stable_u16(&mut self, sock: SocketId, address: u16) -> Result<u16> {
        let mut last = self.read_u16(sock.regs(), address)?;
        for _ in 0..STABLE_READ_ATTEMPTS {
            let next = self.read_u16(sock.regs(), address)?;
            if next == last {
                return Ok(next);
            }
            last = next;
        }
        Err(SocketError::Timeout.into())
    }

    /// Queue bytes into the socket's TX buffer and transmit them.
    ///
    /// Payloads larger than one buffer are clipped to 2 KB (callers
    /// loop for more); the clipped payload always goes out whole, so a
    /// UDP datagram is never split at a SEND boundary. Returns the byte
    /// count actually sent. `Ok(0)` means the connection was gone
    /// before anything went out; [`SocketError::Timeout`] means the
    /// wait for space or for the send acknowledgment expired.
    pub fn socket_write(&mut self, sock: SocketId, data: &[u8]) -> Result<usize> {
        if data.is_empty() {
            return Ok(0);
        }
        if !self.socket_sendable(sock)? {
            return Ok(0);
        }

        let count = data.len().min(SOCKET_BUFFER_SIZE as usize);

        // Wait for room for the whole clipped payload, bounded; the
        // peer may have stalled its window.
        let mut free = self.get_tx_free_size(sock)?;
        let mut iterations = 0u32;
        while (free as usize) < count {
            if !self.socket_sendable(sock)? {
                return Ok(0);
            }
            iterations = iterations.saturating_add(1);
            if self.config.send_limit.expired(iterations) {
                return Err(SocketError::Timeout.into());
            }
            self.delay.delay_us(SEND_POLL_US);
            free = self.get_tx_free_size(sock)?;
        }

        // The write pointer is free-running; the chip masks it into the
        // buffer, so wrap handling is a single wrapping add.
        let ptr = self.read_u16(sock.regs(), socket::SN_TX_WR)?;
        self.write(sock.tx(), ptr, &data[..count])?;
        self.write_u16(sock.regs(), socket::SN_TX_WR, ptr.wrapping_add(count as u16))?;

        self.send_command(sock, sock_cmd::SEND)?;
        if !self.wait_send_complete(sock)? {
            return Ok(0);
        }

        #[cfg(feature = "defmt")]
        defmt::trace!("w5500: socket {} sent {} bytes", sock.index(), count);
        Ok(count)
    }

    /// Block until the chip acknowledges the SEND, bounded by the
    /// configured send limit. `Ok(false)` means the connection unwound
    /// before the acknowledgment could arrive.
    fn wait_send_complete(&mut self, sock: SocketId) -> Result<bool> {
        let mut iterations = 0u32;
        loop {
            let ir = self.read_u8(sock.regs(), socket::SN_IR)?;
            if ir & sock_ir::SEND_OK != 0 {
                self.write_u8(sock.regs(), socket::SN_IR, sock_ir::SEND_OK)?;
                return Ok(true);
            }
            // A send can never complete once the connection unwinds.
            if self.socket_status(sock)?.send_aborted() {
                return Ok(false);
            }
            iterations = iterations.saturating_add(1);
            if self.config.send_limit.expired(iterations) {
                return Err(SocketError::Timeout.into());
            }
            self.delay.delay_us(SEND_POLL_US);
        }
    }

    fn socket_sendable(&mut self, sock: SocketId) -> Result<bool> {
        Ok(matches!(
            self.socket_status(sock)?,
            SocketStatus::Established
                | SocketStatus::CloseWait
                | SocketStatus::Udp
                | SocketStatus::Macraw
        ))
    }

    /// Read pending TCP (or raw) bytes into `buf`.
    ///
    /// Never blocks: with nothing pending the result distinguishes a
    /// live connection ([`RecvResult::WouldBlock`]) from end-of-stream
    /// ([`RecvResult::Closed`]).
    pub fn socket_read(&mut self, sock: SocketId, buf: &mut [u8]) -> Result<RecvResult> {
        let avail = self.get_rx_received_size(sock)?;
        if avail == 0 {
            let status = self.socket_status(sock)?;
            return Ok(if status.is_drained_eof() {
                RecvResult::Closed
            } else {
                RecvResult::WouldBlock
            });
        }

        let count = buf.len().min(avail as usize);
        if count == 0 {
            return Ok(RecvResult::Received(0));
        }
        self.consume_rx(sock, &mut buf[..count])?;
        Ok(RecvResult::Received(count))
    }

    /// Bytes pending on a socket, honoring UDP datagram framing.
    ///
    /// For UDP this parses the next datagram header when one is fully
    /// buffered and reports the unconsumed payload of the current
    /// datagram, so a caller never reads across a datagram boundary.
    pub fn socket_available(&mut self, sock: SocketId, protocol: Protocol) -> Result<u16> {
        let pending = self.get_rx_received_size(sock)?;
        if protocol != Protocol::Udp {
            return Ok(pending);
        }

        let idx = sock.index() as usize;
        if self.udp[idx].bytes_remaining == 0 && pending >= UDP_HEADER_SIZE {
            self.read_udp_header(sock)?;
        }
        Ok(self.udp[idx].bytes_remaining)
    }

    /// Read payload bytes of the current UDP datagram into `buf`.
    ///
    /// Stops at the datagram boundary; the next call moves on to the
    /// following datagram once this one is fully consumed.
    pub fn read_udp(&mut self, sock: SocketId, buf: &mut [u8]) -> Result<RecvResult> {
        let idx = sock.index() as usize;
        if self.udp[idx].bytes_remaining == 0 {
            let pending = self.get_rx_received_size(sock)?;
            if pending >= UDP_HEADER_SIZE {
                self.read_udp_header(sock)?;
            }
        }

        let remaining = self.udp[idx].bytes_remaining;
        if remaining == 0 {
            return Ok(RecvResult::WouldBlock);
        }

        let count = buf.len().min(remaining as usize);
        if count == 0 {
            return Ok(RecvResult::Received(0));
        }
        self.consume_rx(sock, &mut buf[..count])?;
        self.udp[idx].bytes_remaining = remaining - count as u16;
        Ok(RecvResult::Received(count))
    }

    /// Unconsumed payload bytes of the current UDP datagram.
    pub const fn udp_remaining(&self, sock: SocketId) -> u16 {
        self.udp[sock.index() as usize].bytes_remaining
    }

    /// Source address of the current UDP datagram.
    pub const fn udp_remote(&self, sock: SocketId) -> (IpAddress, u16) {
        let datagram = &self.udp[sock.index() as usize];
        (datagram.remote_ip, datagram.remote_port)
    }

    /// Copy `buf.len()` bytes out of the RX buffer at the read pointer,
    /// advance the pointer, and acknowledge with RECV.
    fn consume_rx(&mut self, sock: SocketId, buf: &mut [u8]) -> Result<()> {
        let ptr = self.read_u16(sock.regs(), socket::SN_RX_RD)?;
        self.read(sock.rx(), ptr, buf)?;
        self.write_u16(
            sock.regs(),
            socket::SN_RX_RD,
            ptr.wrapping_add(buf.len() as u16),
        )?;
        self.send_command(sock, sock_cmd::RECV)
    }

    /// Parse the chip's 8-byte UDP header at the read pointer into the
    /// per-socket datagram state.
    fn read_udp_header(&mut self, sock: SocketId) -> Result<()> {
        let mut header = [0u8; UDP_HEADER_SIZE as usize];
        self.consume_rx(sock, &mut header)?;

        let idx = sock.index() as usize;
        self.udp[idx] = UdpDatagram {
            remote_ip: IpAddress([header[0], header[1], header[2], header[3]]),
            remote_port: u16::from_be_bytes([header[4], header[5]]),
            bytes_remaining: u16::from_be_bytes([header[6], header[7]]),
        };

        #[cfg(feature = "defmt")]
        defmt::trace!(
            "w5500: socket {} udp datagram from {}:{}, {} bytes",
            sock.index(),
            self.udp[idx].remote_ip.octets(),
            self.udp[idx].remote_port,
            self.udp[idx].bytes_remaining
        );
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
