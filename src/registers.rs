//! W5500 register map and control-byte encoding.
//!
//! Every SPI transaction carries a 16-bit offset address and a control
//! byte selecting the memory block (common registers, one socket's
//! registers, or one socket's TX/RX buffer), the transfer direction,
//! and the operation mode (always variable-length here).
//!
//! Register offsets and the status/command/interrupt codes follow the
//! W5500 datasheet. Driver policy constants (timings, poll bounds) live
//! in [`crate::constants`].

// =============================================================================
// Common Register Offsets
// =============================================================================

/// Common register block offsets (control byte block `0b00000`).
pub mod common {
    /// Mode register. Bit 7 is the software reset bit.
    pub const MR: u16 = 0x0000;
    /// Gateway IP address, 4 bytes.
    pub const GAR: u16 = 0x0001;
    /// Subnet mask, 4 bytes.
    pub const SUBR: u16 = 0x0005;
    /// Source hardware (MAC) address, 6 bytes.
    pub const SHAR: u16 = 0x0009;
    /// Source IP address, 4 bytes.
    pub const SIPR: u16 = 0x000F;
    /// PHY configuration and status.
    pub const PHYCFGR: u16 = 0x002E;
    /// Chip version, reads `0x04` on a W5500.
    pub const VERSIONR: u16 = 0x0039;
}

/// Mode register (`MR`) bits.
pub mod mode {
    /// Software reset. Self-clears once the reset completes.
    pub const RST: u8 = 0x80;
}

/// PHY configuration register (`PHYCFGR`) bits.
pub mod phycfg {
    /// Link status: 1 = link up.
    pub const LINK_UP: u8 = 0x01;
    /// Link speed: 1 = 100 Mbps, 0 = 10 Mbps. Valid only while the link is up.
    pub const SPEED_100: u8 = 0x02;
    /// Duplex: 1 = full, 0 = half. Valid only while the link is up.
    pub const FULL_DUPLEX: u8 = 0x04;
}

// =============================================================================
// Per-Socket Register Offsets
// =============================================================================

/// Socket register block offsets (control byte block `(n << 5) | 0x08`).
///
/// The W5500 selects the socket from the control byte, so these offsets
/// are identical for every socket.
pub mod socket {
    /// Socket mode register (protocol selection).
    pub const SN_MR: u16 = 0x0000;
    /// Socket command register. Self-clears once the command is accepted.
    pub const SN_CR: u16 = 0x0001;
    /// Socket interrupt register, write-1-to-clear.
    pub const SN_IR: u16 = 0x0002;
    /// Socket status register.
    pub const SN_SR: u16 = 0x0003;
    /// Source port, 2 bytes.
    pub const SN_PORT: u16 = 0x0004;
    /// Destination IP address, 4 bytes.
    pub const SN_DIPR: u16 = 0x000C;
    /// Destination port, 2 bytes.
    pub const SN_DPORT: u16 = 0x0010;
    /// RX buffer size register, programmed in KB at bring-up.
    pub const SN_RXBUF_SIZE: u16 = 0x001E;
    /// TX buffer size register, programmed in KB at bring-up.
    pub const SN_TXBUF_SIZE: u16 = 0x001F;
    /// TX free size, 2 bytes.
    pub const SN_TX_FSR: u16 = 0x0020;
    /// TX write pointer, 2 bytes, free-running modulo 65536.
    pub const SN_TX_WR: u16 = 0x0024;
    /// RX received size, 2 bytes.
    pub const SN_RX_RSR: u16 = 0x0026;
    /// RX read pointer, 2 bytes, free-running modulo 65536.
    pub const SN_RX_RD: u16 = 0x0028;
}

/// Socket mode register (`Sn_MR`) protocol values.
pub mod sock_mode {
    /// Socket closed, no protocol.
    pub const CLOSED: u8 = 0x00;
    /// TCP with the ND/ACK flag, as the reference firmware programs it.
    pub const TCP: u8 = 0x21;
    /// UDP.
    pub const UDP: u8 = 0x02;
    /// Raw IP.
    pub const IPRAW: u8 = 0x03;
    /// Raw MAC frames (socket 0 only on real hardware).
    pub const MACRAW: u8 = 0x04;
}

/// Socket command register (`Sn_CR`) values.
pub mod sock_cmd {
    /// Open the socket in the mode programmed into `Sn_MR`.
    pub const OPEN: u8 = 0x01;
    /// Start listening (TCP server).
    pub const LISTEN: u8 = 0x02;
    /// Initiate a TCP connection to `Sn_DIPR:Sn_DPORT`.
    pub const CONNECT: u8 = 0x04;
    /// Send FIN (orderly TCP close).
    pub const DISCON: u8 = 0x08;
    /// Close immediately.
    pub const CLOSE: u8 = 0x10;
    /// Transmit the data between the TX read and write pointers.
    pub const SEND: u8 = 0x20;
    /// Transmit to the MAC address cached from the last receive (UDP).
    pub const SEND_MAC: u8 = 0x21;
    /// Send a TCP keep-alive.
    pub const SEND_KEEP: u8 = 0x22;
    /// Acknowledge receipt up to the RX read pointer.
    pub const RECV: u8 = 0x40;
}

/// Socket interrupt register (`Sn_IR`) bits.
pub mod sock_ir {
    /// Connection established.
    pub const CON: u8 = 0x01;
    /// Peer sent FIN.
    pub const DISCON: u8 = 0x02;
    /// Data received.
    pub const RECV: u8 = 0x04;
    /// ARP or TCP retransmission gave up.
    pub const TIMEOUT: u8 = 0x08;
    /// SEND command completed.
    pub const SEND_OK: u8 = 0x10;
    /// Mask covering every defined bit; written to clear all pending.
    pub const ALL: u8 = 0x1F;
}

/// Socket status register (`Sn_SR`) raw codes.
pub mod sock_status {
    /// No connection, slot reusable.
    pub const CLOSED: u8 = 0x00;
    /// TCP socket opened, not yet listening or connecting.
    pub const INIT: u8 = 0x13;
    /// TCP server waiting for a peer.
    pub const LISTEN: u8 = 0x14;
    /// SYN sent, waiting for SYN-ACK.
    pub const SYN_SENT: u8 = 0x15;
    /// SYN received, handshake in progress.
    pub const SYN_RECV: u8 = 0x16;
    /// TCP connection established.
    pub const ESTABLISHED: u8 = 0x17;
    /// FIN sent, waiting for the peer to close.
    pub const FIN_WAIT: u8 = 0x18;
    /// Both sides closing simultaneously.
    pub const CLOSING: u8 = 0x1A;
    /// Waiting out the 2MSL timer.
    pub const TIME_WAIT: u8 = 0x1B;
    /// Peer closed its side; local data may still be sent.
    pub const CLOSE_WAIT: u8 = 0x1C;
    /// Final ACK outstanding.
    pub const LAST_ACK: u8 = 0x1D;
    /// UDP socket open.
    pub const UDP: u8 = 0x22;
    /// Raw IP socket open.
    pub const IPRAW: u8 = 0x32;
    /// Raw MAC socket open.
    pub const MACRAW: u8 = 0x42;
    /// PPPoE socket open.
    pub const PPPOE: u8 = 0x5F;
}

// =============================================================================
// Control Byte Encoding
// =============================================================================

/// Read/write bit inside the control byte.
const CONTROL_WRITE: u8 = 0x04;

/// Block-select base for a socket's register bank.
const BLOCK_SOCKET_REG: u8 = 0x08;

/// Block-select base for a socket's TX buffer.
const BLOCK_SOCKET_TX: u8 = 0x10;

/// Block-select base for a socket's RX buffer.
const BLOCK_SOCKET_RX: u8 = 0x18;

/// Memory block addressed by one bus transaction.
///
/// The W5500 encodes the target block into bits 7..3 of the control
/// byte; bit 2 is the direction and bits 1..0 select variable-length
/// mode (always zero here).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BlockSelect {
    /// Common register bank.
    Common,
    /// Register bank of socket `n`.
    SocketReg(u8),
    /// TX buffer of socket `n`.
    SocketTx(u8),
    /// RX buffer of socket `n`.
    SocketRx(u8),
}

impl BlockSelect {
    /// Encode the control byte for a read transaction on this block.
    pub const fn read_control(self) -> u8 {
        self.base()
    }

    /// Encode the control byte for a write transaction on this block.
    pub const fn write_control(self) -> u8 {
        self.base() | CONTROL_WRITE
    }

    const fn base(self) -> u8 {
        match self {
            Self::Common => 0x00,
            Self::SocketReg(n) => (n << 5) | BLOCK_SOCKET_REG,
            Self::SocketTx(n) => (n << 5) | BLOCK_SOCKET_TX,
            Self::SocketRx(n) => (n << 5) | BLOCK_SOCKET_RX,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
