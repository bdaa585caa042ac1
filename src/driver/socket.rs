//! Socket identity, status decoding, and the open/listen/connect/close
//! state machine.
//!
//! All eight hardware slots share one register layout; the slot index
//! only selects the control-byte block. [`SocketId`] keeps that index
//! provably in range so register access never needs a bounds check.

use embedded_hal::delay::DelayNs;

use crate::constants::{
    COMMAND_CLEAR_ATTEMPTS, COMMAND_POLL_US, OPEN_POLL_ATTEMPTS, OPEN_SETTLE_US, SOCKET_COUNT,
    STATUS_POLL_US,
};
use crate::driver::config::Protocol;
use crate::driver::device::Wiznet5k;
use crate::driver::transfer::UdpDatagram;
use crate::error::{Result, SocketError};
use crate::hal::BusTransport;
use crate::net::IpAddress;
use crate::registers::{BlockSelect, sock_cmd, sock_ir, sock_status, socket};

// =============================================================================
// Socket Identity
// =============================================================================

/// Index of one hardware socket slot, guaranteed in `0..8`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SocketId(u8);

impl SocketId {
    /// Wrap a slot index, `None` if it is out of range.
    pub const fn new(index: u8) -> Option<Self> {
        if (index as usize) < SOCKET_COUNT {
            Some(Self(index))
        } else {
            None
        }
    }

    /// The raw slot index.
    pub const fn index(self) -> u8 {
        self.0
    }

    /// Iterate every slot in ascending order.
    pub fn all() -> impl Iterator<Item = Self> {
        (0..SOCKET_COUNT as u8).map(Self)
    }

    /// This slot's register bank.
    pub(crate) const fn regs(self) -> BlockSelect {
        BlockSelect::SocketReg(self.0)
    }

    /// This slot's TX buffer block.
    pub(crate) const fn tx(self) -> BlockSelect {
        BlockSelect::SocketTx(self.0)
    }

    /// This slot's RX buffer block.
    pub(crate) const fn rx(self) -> BlockSelect {
        BlockSelect::SocketRx(self.0)
    }
}

// =============================================================================
// Socket Status
// =============================================================================

/// Decoded socket status register (`Sn_SR`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SocketStatus {
    /// No connection, slot reusable.
    Closed,
    /// TCP socket opened, not yet listening or connecting.
    Init,
    /// TCP server waiting for a peer.
    Listen,
    /// SYN sent, waiting for SYN-ACK.
    SynSent,
    /// SYN received, handshake in progress.
    SynRecv,
    /// TCP connection established.
    Established,
    /// FIN sent, waiting for the peer to close.
    FinWait,
    /// Both sides closing simultaneously.
    Closing,
    /// Waiting out the 2MSL timer.
    TimeWait,
    /// Peer closed its side; local sends are still possible.
    CloseWait,
    /// Final ACK outstanding.
    LastAck,
    /// UDP socket open.
    Udp,
    /// Raw IP socket open.
    IpRaw,
    /// Raw MAC socket open.
    Macraw,
    /// PPPoE socket open.
    Pppoe,
}

impl SocketStatus {
    /// Decode a raw status byte, `None` for undocumented values.
    pub const fn from_raw(raw: u8) -> Option<Self> {
        match raw {
            sock_status::CLOSED => Some(Self::Closed),
            sock_status::INIT => Some(Self::Init),
            sock_status::LISTEN => Some(Self::Listen),
            sock_status::SYN_SENT => Some(Self::SynSent),
            sock_status::SYN_RECV => Some(Self::SynRecv),
            sock_status::ESTABLISHED => Some(Self::Established),
            sock_status::FIN_WAIT => Some(Self::FinWait),
            sock_status::CLOSING => Some(Self::Closing),
            sock_status::TIME_WAIT => Some(Self::TimeWait),
            sock_status::CLOSE_WAIT => Some(Self::CloseWait),
            sock_status::LAST_ACK => Some(Self::LastAck),
            sock_status::UDP => Some(Self::Udp),
            sock_status::IPRAW => Some(Self::IpRaw),
            sock_status::MACRAW => Some(Self::Macraw),
            sock_status::PPPOE => Some(Self::Pppoe),
            _ => None,
        }
    }

    /// The raw register encoding of this status.
    pub const fn to_raw(self) -> u8 {
        match self {
            Self::Closed => sock_status::CLOSED,
            Self::Init => sock_status::INIT,
            Self::Listen => sock_status::LISTEN,
            Self::SynSent => sock_status::SYN_SENT,
            Self::SynRecv => sock_status::SYN_RECV,
            Self::Established => sock_status::ESTABLISHED,
            Self::FinWait => sock_status::FIN_WAIT,
            Self::Closing => sock_status::CLOSING,
            Self::TimeWait => sock_status::TIME_WAIT,
            Self::CloseWait => sock_status::CLOSE_WAIT,
            Self::LastAck => sock_status::LAST_ACK,
            Self::Udp => sock_status::UDP,
            Self::IpRaw => sock_status::IPRAW,
            Self::Macraw => sock_status::MACRAW,
            Self::Pppoe => sock_status::PPPOE,
        }
    }

    /// Whether an OPEN command may be issued from this status.
    ///
    /// Half-closed and draining states count as openable: the hardware
    /// tears down the old connection when the slot is re-opened.
    pub const fn is_openable(self) -> bool {
        matches!(
            self,
            Self::Closed
                | Self::TimeWait
                | Self::FinWait
                | Self::CloseWait
                | Self::Closing
                | Self::Udp
                | Self::Listen
        )
    }

    /// Whether an in-flight SEND can no longer complete.
    ///
    /// `CloseWait` is deliberately absent: the peer has closed its
    /// half, but local data still flows.
    pub const fn send_aborted(self) -> bool {
        matches!(
            self,
            Self::Closed | Self::TimeWait | Self::FinWait | Self::Closing
        )
    }

    /// Whether zero pending bytes mean end-of-stream rather than
    /// "nothing yet".
    pub const fn is_drained_eof(self) -> bool {
        matches!(self, Self::Closed | Self::Listen | Self::CloseWait)
    }

    /// Short status name for logs.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Closed => "CLOSED",
            Self::Init => "INIT",
            Self::Listen => "LISTEN",
            Self::SynSent => "SYN_SENT",
            Self::SynRecv => "SYN_RECV",
            Self::Established => "ESTABLISHED",
            Self::FinWait => "FIN_WAIT",
            Self::Closing => "CLOSING",
            Self::TimeWait => "TIME_WAIT",
            Self::CloseWait => "CLOSE_WAIT",
            Self::LastAck => "LAST_ACK",
            Self::Udp => "UDP",
            Self::IpRaw => "IPRAW",
            Self::Macraw => "MACRAW",
            Self::Pppoe => "PPPOE",
        }
    }
}

// =============================================================================
// Socket State Machine
// =============================================================================

impl<B, D> Wiznet5k<B, D>
where
    B: BusTransport,
    D: DelayNs,
{
    /// Decode the socket's current status register.
    pub fn socket_status(&mut self, sock: SocketId) -> Result<SocketStatus> {
        let raw = self.read_u8(sock.regs(), socket::SN_SR)?;
        SocketStatus::from_raw(raw).ok_or_else(|| SocketError::UnknownStatus(raw).into())
    }

    /// Claim the lowest-numbered CLOSED slot.
    ///
    /// Purely a query: the slot is not reserved until it is opened, so
    /// callers must open it before asking again.
    pub fn get_socket(&mut self) -> Result<SocketId> {
        for sock in SocketId::all() {
            if self.socket_status(sock)? == SocketStatus::Closed {
                return Ok(sock);
            }
        }
        Err(SocketError::NoFreeSocket.into())
    }

    /// Open a socket in the given protocol mode with an ephemeral
    /// source port.
    ///
    /// The slot must be in an openable status and the link must be up;
    /// otherwise the call fails without touching any socket register.
    pub fn socket_open(&mut self, sock: SocketId, protocol: Protocol) -> Result<()> {
        self.require_link()?;
        self.open_socket(sock, protocol, None)
    }

    /// Open a socket on a fixed port and, for TCP, start listening.
    ///
    /// A UDP "listener" is just an open UDP socket bound to the port.
    /// Returns once the socket reports LISTEN (or ESTABLISHED, if a
    /// peer connected during the wait).
    pub fn socket_listen(&mut self, sock: SocketId, port: u16, protocol: Protocol) -> Result<()> {
        self.require_link()?;
        self.open_socket(sock, protocol, Some(port))?;

        if protocol != Protocol::Tcp {
            return Ok(());
        }

        #[cfg(feature = "defmt")]
        defmt::debug!("w5500: socket {} listening on {}", sock.index(), port);

        self.send_command(sock, sock_cmd::LISTEN)?;
        for _ in 0..OPEN_POLL_ATTEMPTS {
            match self.socket_status(sock)? {
                SocketStatus::Listen | SocketStatus::Established => return Ok(()),
                SocketStatus::Closed => return Err(SocketError::ListenRejected.into()),
                _ => self.delay.delay_us(STATUS_POLL_US),
            }
        }
        Err(SocketError::Timeout.into())
    }

    /// Open a socket and connect it to `dest:port`.
    ///
    /// TCP blocks until the connection is established, bounded by the
    /// configured connect limit. UDP just records the destination; the
    /// first send resolves it.
    pub fn socket_connect(
        &mut self,
        sock: SocketId,
        dest: IpAddress,
        port: u16,
        protocol: Protocol,
    ) -> Result<()> {
        self.require_link()?;
        self.open_socket(sock, protocol, None)?;

        self.write(sock.regs(), socket::SN_DIPR, &dest.octets())?;
        self.write_u16(sock.regs(), socket::SN_DPORT, port)?;

        if protocol != Protocol::Tcp {
            self.udp[sock.index() as usize] = UdpDatagram::EMPTY;
            return Ok(());
        }

        #[cfg(feature = "defmt")]
        defmt::debug!(
            "w5500: socket {} connecting to {}:{}",
            sock.index(),
            dest.octets(),
            port
        );

        self.send_command(sock, sock_cmd::CONNECT)?;
        let limit = self.config.connect_limit;
        let mut iterations = 0u32;
        loop {
            match self.socket_status(sock)? {
                SocketStatus::Established => return Ok(()),
                SocketStatus::Closed => return Err(SocketError::ConnectFailed.into()),
                _ => {}
            }
            iterations = iterations.saturating_add(1);
            if limit.expired(iterations) {
                return Err(SocketError::Timeout.into());
            }
            self.delay.delay_us(STATUS_POLL_US);
        }
    }

    /// Accept a pending connection on a listening slot.
    ///
    /// Returns the peer address together with a fresh CLOSED slot the
    /// caller should re-listen on; the connection itself stays on
    /// `sock`.
    pub fn socket_accept(&mut self, sock: SocketId) -> Result<(SocketId, IpAddress, u16)> {
        let ip = self.remote_ip(sock)?;
        let port = self.remote_port(sock)?;
        let next = self.get_socket()?;

        #[cfg(feature = "defmt")]
        defmt::debug!(
            "w5500: socket {} accepted {}:{}, next slot {}",
            sock.index(),
            ip.octets(),
            port,
            next.index()
        );
        Ok((next, ip, port))
    }

    /// The peer address of a connected (or connecting) socket.
    pub fn remote_ip(&mut self, sock: SocketId) -> Result<IpAddress> {
        let mut octets = [0u8; 4];
        self.read(sock.regs(), socket::SN_DIPR, &mut octets)?;
        Ok(IpAddress(octets))
    }

    /// The peer port of a connected (or connecting) socket.
    pub fn remote_port(&mut self, sock: SocketId) -> Result<u16> {
        self.read_u16(sock.regs(), socket::SN_DPORT)
    }

    /// The source port bound to a slot, zero when unbound.
    pub const fn local_port(&self, sock: SocketId) -> u16 {
        self.src_ports[sock.index() as usize]
    }

    /// Close a socket immediately and release its source port.
    pub fn socket_close(&mut self, sock: SocketId) -> Result<()> {
        self.send_command(sock, sock_cmd::CLOSE)?;
        self.write_u8(sock.regs(), socket::SN_IR, sock_ir::ALL)?;
        self.src_ports[sock.index() as usize] = 0;
        self.udp[sock.index() as usize] = UdpDatagram::EMPTY;

        #[cfg(feature = "defmt")]
        defmt::debug!("w5500: socket {} closed", sock.index());
        Ok(())
    }

    /// Begin an orderly TCP close (send FIN).
    ///
    /// The slot keeps its source port until
    /// [`socket_close`](Self::socket_close) releases it.
    pub fn socket_disconnect(&mut self, sock: SocketId) -> Result<()> {
        self.send_command(sock, sock_cmd::DISCON)
    }

    /// Issue a socket command and wait for the command register to
    /// self-clear (the chip's acknowledgment that it latched it).
    pub(crate) fn send_command(&mut self, sock: SocketId, command: u8) -> Result<()> {
        self.write_u8(sock.regs(), socket::SN_CR, command)?;
        for _ in 0..COMMAND_CLEAR_ATTEMPTS {
            if self.read_u8(sock.regs(), socket::SN_CR)? == 0 {
                return Ok(());
            }
            self.delay.delay_us(COMMAND_POLL_US);
        }
        Err(SocketError::Timeout.into())
    }

    fn require_link(&mut self) -> Result<()> {
        if self.link_status()?.is_up() {
            Ok(())
        } else {
            Err(SocketError::LinkDown.into())
        }
    }

    /// Shared open path: program mode, clear interrupts, bind the
    /// source port, issue OPEN, and wait for the protocol's open
    /// status.
    fn open_socket(&mut self, sock: SocketId, protocol: Protocol, port: Option<u16>) -> Result<()> {
        let status = self.socket_status(sock)?;
        if !status.is_openable() {
            #[cfg(feature = "defmt")]
            defmt::warn!(
                "w5500: socket {} not openable from {=str}",
                sock.index(),
                status.as_str()
            );
            return Err(SocketError::OpenFailed.into());
        }
        self.delay.delay_us(OPEN_SETTLE_US);

        self.write_u8(sock.regs(), socket::SN_MR, protocol.mode_bits())?;
        self.write_u8(sock.regs(), socket::SN_IR, sock_ir::ALL)?;

        let port = match port {
            Some(p) => p,
            None => self.claim_ephemeral_port(),
        };
        self.write_u16(sock.regs(), socket::SN_PORT, port)?;
        self.src_ports[sock.index() as usize] = port;
        self.udp[sock.index() as usize] = UdpDatagram::EMPTY;

        self.send_command(sock, sock_cmd::OPEN)?;

        let expected = match protocol {
            Protocol::Tcp => SocketStatus::Init,
            Protocol::Udp => SocketStatus::Udp,
            Protocol::Macraw => SocketStatus::Macraw,
        };
        for _ in 0..OPEN_POLL_ATTEMPTS {
            if self.socket_status(sock)? == expected {
                return Ok(());
            }
            self.delay.delay_us(STATUS_POLL_US);
        }
        Err(SocketError::OpenFailed.into())
    }

    /// Draw ephemeral-port candidates until one is not already bound to
    /// another slot.
    fn claim_ephemeral_port(&mut self) -> u16 {
        loop {
            let candidate = self.next_port_candidate();
            if !self.src_ports.contains(&candidate) {
                return candidate;
            }
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
#[allow(clippy::std_instead_of_core)]
mod tests {
    extern crate std;

    use super::*;
    use crate::constants::EPHEMERAL_PORT_MIN;
    use crate::driver::config::{DeviceConfig, PollLimit};
    use crate::error::Error;
    use crate::test_utils::{MockBus, MockDelay};

    fn device<'a>(bus: &'a MockBus, delay: &'a MockDelay) -> Wiznet5k<&'a MockBus, &'a MockDelay> {
        Wiznet5k::new(bus, delay, DeviceConfig::new())
    }

    fn sock(n: u8) -> SocketId {
        SocketId::new(n).unwrap()
    }

    #[test]
    fn socket_id_bounds() {
        assert!(SocketId::new(0).is_some());
        assert!(SocketId::new(7).is_some());
        assert!(SocketId::new(8).is_none());
        assert_eq!(SocketId::all().count(), 8);
    }

    #[test]
    fn status_raw_roundtrip() {
        for raw in [0x00, 0x13, 0x14, 0x15, 0x16, 0x17, 0x18, 0x1A, 0x1B, 0x1C, 0x1D, 0x22, 0x32, 0x42, 0x5F] {
            let status = SocketStatus::from_raw(raw).unwrap();
            assert_eq!(status.to_raw(), raw);
        }
        assert_eq!(SocketStatus::from_raw(0x99), None);
    }

    #[test]
    fn close_wait_is_sendable_but_eof() {
        assert!(!SocketStatus::CloseWait.send_aborted());
        assert!(SocketStatus::CloseWait.is_drained_eof());
        assert!(SocketStatus::FinWait.send_aborted());
        assert!(!SocketStatus::Established.is_drained_eof());
    }

    #[test]
    fn get_socket_skips_busy_slots() {
        let bus = MockBus::new();
        let delay = MockDelay::new();
        let mut dev = device(&bus, &delay);

        bus.set_register(sock(0).regs(), socket::SN_SR, sock_status::ESTABLISHED);
        bus.set_register(sock(1).regs(), socket::SN_SR, sock_status::LISTEN);

        assert_eq!(dev.get_socket().unwrap(), sock(2));
    }

    #[test]
    fn get_socket_exhausted() {
        let bus = MockBus::new();
        let delay = MockDelay::new();
        let mut dev = device(&bus, &delay);

        for s in SocketId::all() {
            bus.set_register(s.regs(), socket::SN_SR, sock_status::UDP);
        }
        assert_eq!(
            dev.get_socket(),
            Err(Error::Socket(SocketError::NoFreeSocket))
        );
    }

    #[test]
    fn open_tcp_reaches_init_with_ephemeral_port() {
        let bus = MockBus::new();
        let delay = MockDelay::new();
        let mut dev = device(&bus, &delay);

        dev.socket_open(sock(0), Protocol::Tcp).unwrap();

        assert_eq!(dev.socket_status(sock(0)).unwrap(), SocketStatus::Init);
        assert_eq!(bus.get_register(sock(0).regs(), socket::SN_MR), 0x21);
        assert!(dev.local_port(sock(0)) >= EPHEMERAL_PORT_MIN);
    }

    #[test]
    fn open_udp_reaches_udp_status() {
        let bus = MockBus::new();
        let delay = MockDelay::new();
        let mut dev = device(&bus, &delay);

        dev.socket_open(sock(3), Protocol::Udp).unwrap();
        assert_eq!(dev.socket_status(sock(3)).unwrap(), SocketStatus::Udp);
    }

    #[test]
    fn open_on_established_slot_writes_nothing() {
        let bus = MockBus::new();
        let delay = MockDelay::new();
        let mut dev = device(&bus, &delay);

        bus.set_register(sock(0).regs(), socket::SN_SR, sock_status::ESTABLISHED);
        bus.clear_writes();

        assert_eq!(
            dev.socket_open(sock(0), Protocol::Tcp),
            Err(Error::Socket(SocketError::OpenFailed))
        );
        assert!(bus.writes().is_empty());
    }

    #[test]
    fn connect_reaches_established() {
        let bus = MockBus::new();
        let delay = MockDelay::new();
        let mut dev = device(&bus, &delay);

        let dest = IpAddress::new(10, 0, 0, 2);
        dev.socket_connect(sock(0), dest, 443, Protocol::Tcp).unwrap();

        assert_eq!(
            dev.socket_status(sock(0)).unwrap(),
            SocketStatus::Established
        );
        assert_eq!(dev.remote_ip(sock(0)).unwrap(), dest);
        assert_eq!(dev.remote_port(sock(0)).unwrap(), 443);
    }

    #[test]
    fn connect_refused_reports_failure() {
        let bus = MockBus::new();
        let delay = MockDelay::new();
        let mut dev = device(&bus, &delay);

        bus.set_connect_status(0, sock_status::CLOSED);
        assert_eq!(
            dev.socket_connect(sock(0), IpAddress::new(10, 0, 0, 2), 80, Protocol::Tcp),
            Err(Error::Socket(SocketError::ConnectFailed))
        );
    }

    #[test]
    fn connect_unanswered_times_out() {
        let bus = MockBus::new();
        let delay = MockDelay::new();
        let config = DeviceConfig::new().with_connect_limit(PollLimit::Bounded(5));
        let mut dev = Wiznet5k::new(&bus, &delay, config);

        // SYN never answered: the status stays SYN_SENT.
        bus.set_connect_status(0, sock_status::SYN_SENT);
        assert_eq!(
            dev.socket_connect(sock(0), IpAddress::new(10, 0, 0, 2), 80, Protocol::Tcp),
            Err(Error::Socket(SocketError::Timeout))
        );
    }

    #[test]
    fn connect_with_link_down_touches_no_socket_register() {
        let bus = MockBus::new();
        let delay = MockDelay::new();
        let mut dev = device(&bus, &delay);

        bus.simulate_link_down();
        bus.clear_writes();

        assert_eq!(
            dev.socket_connect(sock(0), IpAddress::new(10, 0, 0, 2), 80, Protocol::Tcp),
            Err(Error::Socket(SocketError::LinkDown))
        );
        assert!(bus.writes().is_empty());
    }

    #[test]
    fn connect_udp_records_destination_without_handshake() {
        let bus = MockBus::new();
        let delay = MockDelay::new();
        let mut dev = device(&bus, &delay);

        dev.socket_connect(sock(1), IpAddress::new(10, 0, 0, 9), 5000, Protocol::Udp)
            .unwrap();
        assert_eq!(dev.socket_status(sock(1)).unwrap(), SocketStatus::Udp);
        assert_eq!(dev.remote_port(sock(1)).unwrap(), 5000);
    }

    #[test]
    fn listen_binds_fixed_port() {
        let bus = MockBus::new();
        let delay = MockDelay::new();
        let mut dev = device(&bus, &delay);

        dev.socket_listen(sock(0), 8080, Protocol::Tcp).unwrap();
        assert_eq!(dev.socket_status(sock(0)).unwrap(), SocketStatus::Listen);
        assert_eq!(dev.local_port(sock(0)), 8080);
    }

    #[test]
    fn listen_rejection_is_surfaced() {
        let bus = MockBus::new();
        let delay = MockDelay::new();
        let mut dev = device(&bus, &delay);

        bus.set_listen_status(0, sock_status::CLOSED);
        assert_eq!(
            dev.socket_listen(sock(0), 8080, Protocol::Tcp),
            Err(Error::Socket(SocketError::ListenRejected))
        );
    }

    #[test]
    fn udp_listen_is_just_an_open_socket() {
        let bus = MockBus::new();
        let delay = MockDelay::new();
        let mut dev = device(&bus, &delay);

        dev.socket_listen(sock(2), 6000, Protocol::Udp).unwrap();
        assert_eq!(dev.socket_status(sock(2)).unwrap(), SocketStatus::Udp);
        assert_eq!(dev.local_port(sock(2)), 6000);
    }

    #[test]
    fn close_releases_the_port() {
        let bus = MockBus::new();
        let delay = MockDelay::new();
        let mut dev = device(&bus, &delay);

        dev.socket_open(sock(0), Protocol::Tcp).unwrap();
        assert_ne!(dev.local_port(sock(0)), 0);

        dev.socket_close(sock(0)).unwrap();
        assert_eq!(dev.local_port(sock(0)), 0);
        assert_eq!(dev.socket_status(sock(0)).unwrap(), SocketStatus::Closed);
    }

    #[test]
    fn accept_returns_peer_and_fresh_slot() {
        let bus = MockBus::new();
        let delay = MockDelay::new();
        let mut dev = device(&bus, &delay);

        bus.set_register(sock(0).regs(), socket::SN_SR, sock_status::ESTABLISHED);
        bus.set_register(sock(0).regs(), socket::SN_DIPR, 192);
        bus.set_register(sock(0).regs(), socket::SN_DIPR + 1, 168);
        bus.set_register(sock(0).regs(), socket::SN_DIPR + 2, 1);
        bus.set_register(sock(0).regs(), socket::SN_DIPR + 3, 55);
        bus.set_register(sock(0).regs(), socket::SN_DPORT, 0xC0);
        bus.set_register(sock(0).regs(), socket::SN_DPORT + 1, 0x01);

        let (next, ip, port) = dev.socket_accept(sock(0)).unwrap();
        assert_eq!(next, sock(1));
        assert_eq!(ip, IpAddress::new(192, 168, 1, 55));
        assert_eq!(port, 0xC001);
    }

    #[test]
    fn unknown_status_byte_is_an_error() {
        let bus = MockBus::new();
        let delay = MockDelay::new();
        let mut dev = device(&bus, &delay);

        bus.set_register(sock(5).regs(), socket::SN_SR, 0x99);
        assert_eq!(
            dev.socket_status(sock(5)),
            Err(Error::Socket(SocketError::UnknownStatus(0x99)))
        );
    }

    #[test]
    fn stuck_command_register_times_out() {
        let bus = MockBus::new();
        let delay = MockDelay::new();
        let mut dev = device(&bus, &delay);

        bus.stall_commands();
        assert_eq!(
            dev.send_command(sock(0), sock_cmd::OPEN),
            Err(Error::Socket(SocketError::Timeout))
        );
    }

    #[test]
    fn ephemeral_ports_avoid_bound_slots() {
        let bus = MockBus::new();
        let delay = MockDelay::new();
        let mut dev = device(&bus, &delay);

        dev.socket_open(sock(0), Protocol::Udp).unwrap();
        dev.socket_open(sock(1), Protocol::Udp).unwrap();
        assert_ne!(dev.local_port(sock(0)), dev.local_port(sock(1)));
    }
}
