//! Test doubles shared across the unit tests.
//!
//! [`MockBus`] is an in-memory register map that emulates the chip's
//! side effects (command self-clear, status transitions, ring-pointer
//! bookkeeping) just enough to exercise the driver's state machine.
//! [`MockDelay`] counts requested delay time instead of sleeping.
//!
//! Both use interior mutability and implement the driver traits for
//! shared references, so a test can hand them to a device and still
//! inspect them afterwards.

extern crate std;

use core::cell::{Cell, RefCell};
use std::collections::{HashMap, VecDeque};
use std::vec::Vec;

use embedded_hal::delay::DelayNs;

use crate::constants::{SOCKET_BUFFER_MASK, SOCKET_BUFFER_SIZE, SOCKET_COUNT, VERSION_W5500};
use crate::error::BusResult;
use crate::hal::{BusTransport, Transfer};
use crate::registers::{BlockSelect, common, sock_cmd, sock_ir, sock_status, socket};

// =============================================================================
// Mock Delay
// =============================================================================

/// Delay provider that records total requested time.
#[derive(Default)]
pub struct MockDelay {
    total_ns: RefCell<u64>,
}

impl MockDelay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn total_ns(&self) -> u64 {
        *self.total_ns.borrow()
    }

    pub fn total_us(&self) -> u64 {
        self.total_ns() / 1_000
    }

    pub fn total_ms(&self) -> u64 {
        self.total_ns() / 1_000_000
    }

    pub fn reset(&self) {
        *self.total_ns.borrow_mut() = 0;
    }
}

impl DelayNs for MockDelay {
    fn delay_ns(&mut self, ns: u32) {
        *self.total_ns.borrow_mut() += u64::from(ns);
    }
}

impl DelayNs for &MockDelay {
    fn delay_ns(&mut self, ns: u32) {
        *self.total_ns.borrow_mut() += u64::from(ns);
    }
}

// =============================================================================
// Mock Bus
// =============================================================================

/// In-memory chip emulation behind the [`BusTransport`] seam.
///
/// Registers and buffer bytes live in one map keyed by (block, offset);
/// buffer offsets are masked the way the chip masks its free-running
/// pointers. Writes are logged before they are applied so tests can
/// assert on exact bus traffic.
#[derive(Default)]
pub struct MockBus {
    mem: RefCell<HashMap<(u8, u16), u8>>,
    writes: RefCell<Vec<(u16, u8, Vec<u8>)>>,
    drop_writes: Cell<u32>,
    stall_reset: Cell<bool>,
    stall_cmds: Cell<bool>,
    no_send_ok: Cell<bool>,
    close_on_send: RefCell<[bool; SOCKET_COUNT]>,
    connect_status: RefCell<[Option<u8>; SOCKET_COUNT]>,
    listen_status: RefCell<[Option<u8>; SOCKET_COUNT]>,
    last_rx_rd: RefCell<[u16; SOCKET_COUNT]>,
    fsr_queues: RefCell<[VecDeque<u16>; SOCKET_COUNT]>,
}

/// Normalize a control byte and offset into a map key. Buffer blocks
/// mask the offset like the hardware does.
fn key(control: u8, address: u16) -> (u8, u16) {
    let block = control & 0xF8;
    if block & 0x10 != 0 {
        (block, address & SOCKET_BUFFER_MASK)
    } else {
        (block, address)
    }
}

impl MockBus {
    /// A freshly powered chip: correct version signature, link up at
    /// 100 Mbps full duplex, every TX buffer empty.
    pub fn new() -> Self {
        let bus = Self::default();
        bus.set_register(BlockSelect::Common, common::VERSIONR, VERSION_W5500);
        bus.set_register(BlockSelect::Common, common::PHYCFGR, 0x07);
        for n in 0..SOCKET_COUNT as u8 {
            bus.set_u16(n, socket::SN_TX_FSR, SOCKET_BUFFER_SIZE);
        }
        bus
    }

    // -------------------------------------------------------------------------
    // Direct register access
    // -------------------------------------------------------------------------

    pub fn set_register(&self, block: BlockSelect, address: u16, value: u8) {
        self.mem
            .borrow_mut()
            .insert(key(block.read_control(), address), value);
    }

    pub fn get_register(&self, block: BlockSelect, address: u16) -> u8 {
        self.mem
            .borrow()
            .get(&key(block.read_control(), address))
            .copied()
            .unwrap_or(0)
    }

    fn sock_reg(&self, n: u8, address: u16) -> u8 {
        self.get_register(BlockSelect::SocketReg(n), address)
    }

    fn set_sock_reg(&self, n: u8, address: u16, value: u8) {
        self.set_register(BlockSelect::SocketReg(n), address, value);
    }

    fn get_u16(&self, n: u8, address: u16) -> u16 {
        u16::from_be_bytes([self.sock_reg(n, address), self.sock_reg(n, address + 1)])
    }

    fn set_u16(&self, n: u8, address: u16, value: u16) {
        let [hi, lo] = value.to_be_bytes();
        self.set_sock_reg(n, address, hi);
        self.set_sock_reg(n, address + 1, lo);
    }

    // -------------------------------------------------------------------------
    // Scenario controls
    // -------------------------------------------------------------------------

    /// Swallow the next `count` write transactions (logged, not applied).
    pub fn drop_next_writes(&self, count: u32) {
        self.drop_writes.set(count);
    }

    /// The mode register's reset bit never self-clears.
    pub fn stall_soft_reset(&self) {
        self.stall_reset.set(true);
    }

    /// Socket command registers never self-clear.
    pub fn stall_commands(&self) {
        self.stall_cmds.set(true);
    }

    /// SEND commands complete without ever raising SEND_OK.
    pub fn suppress_send_ok(&self) {
        self.no_send_ok.set(true);
    }

    /// The connection drops to CLOSED the moment SEND is issued.
    pub fn close_on_send(&self, n: u8) {
        self.close_on_send.borrow_mut()[n as usize] = true;
    }

    /// Status the socket lands in after a CONNECT command (default
    /// ESTABLISHED).
    pub fn set_connect_status(&self, n: u8, raw: u8) {
        self.connect_status.borrow_mut()[n as usize] = Some(raw);
    }

    /// Status the socket lands in after a LISTEN command (default
    /// LISTEN).
    pub fn set_listen_status(&self, n: u8, raw: u8) {
        self.listen_status.borrow_mut()[n as usize] = Some(raw);
    }

    pub fn simulate_link_down(&self) {
        self.set_register(BlockSelect::Common, common::PHYCFGR, 0x00);
    }

    pub fn simulate_link_up(&self) {
        self.set_register(BlockSelect::Common, common::PHYCFGR, 0x07);
    }

    /// Force the TX free-size register to a fixed value.
    pub fn set_tx_free(&self, n: u8, free: u16) {
        self.set_u16(n, socket::SN_TX_FSR, free);
    }

    /// Script a sequence of TX free-size burst reads; afterwards reads
    /// fall back to the register value.
    pub fn queue_tx_fsr(&self, n: u8, values: &[u16]) {
        self.fsr_queues.borrow_mut()[n as usize].extend(values.iter().copied());
    }

    /// Deliver bytes into a socket's RX ring at the hardware write
    /// position and raise the RECV interrupt.
    pub fn simulate_recv(&self, n: u8, payload: &[u8]) {
        let rd = self.get_u16(n, socket::SN_RX_RD);
        let rsr = self.get_u16(n, socket::SN_RX_RSR);
        let head = rd.wrapping_add(rsr);

        let rx = (n << 5) | 0x18;
        let mut mem = self.mem.borrow_mut();
        for (i, byte) in payload.iter().enumerate() {
            mem.insert(key(rx, head.wrapping_add(i as u16)), *byte);
        }
        drop(mem);

        self.set_u16(n, socket::SN_RX_RSR, rsr + payload.len() as u16);
        let ir = self.sock_reg(n, socket::SN_IR);
        self.set_sock_reg(n, socket::SN_IR, ir | sock_ir::RECV);
    }

    /// Deliver one UDP datagram: the chip's 8-byte header followed by
    /// the payload.
    pub fn simulate_recv_udp(&self, n: u8, from: [u8; 4], port: u16, payload: &[u8]) {
        let mut frame = Vec::with_capacity(8 + payload.len());
        frame.extend_from_slice(&from);
        frame.extend_from_slice(&port.to_be_bytes());
        frame.extend_from_slice(&(payload.len() as u16).to_be_bytes());
        frame.extend_from_slice(payload);
        self.simulate_recv(n, &frame);
    }

    /// All write transactions so far, as (address, control, data).
    pub fn writes(&self) -> Vec<(u16, u8, Vec<u8>)> {
        self.writes.borrow().clone()
    }

    pub fn clear_writes(&self) {
        self.writes.borrow_mut().clear();
    }

    // -------------------------------------------------------------------------
    // Emulation
    // -------------------------------------------------------------------------

    fn apply_write(&self, address: u16, control: u8, data: &[u8]) {
        let block = control & 0xF8;
        let is_socket_regs = (block & 0x18) == 0x08;

        for (i, byte) in data.iter().enumerate() {
            let offset = address.wrapping_add(i as u16);
            // Sn_IR is write-1-to-clear.
            if is_socket_regs && offset == socket::SN_IR {
                let k = key(control, offset);
                let mut mem = self.mem.borrow_mut();
                let old = mem.get(&k).copied().unwrap_or(0);
                mem.insert(k, old & !byte);
                continue;
            }
            self.mem.borrow_mut().insert(key(control, offset), *byte);
        }

        if block == 0x00 && address == common::MR && !self.stall_reset.get() {
            let mr = self.get_register(BlockSelect::Common, common::MR);
            if mr == 0x80 {
                self.set_register(BlockSelect::Common, common::MR, 0x00);
            }
        }

        if is_socket_regs && address == socket::SN_CR && data.len() == 1 {
            self.handle_command(control >> 5, data[0]);
        }
    }

    fn handle_command(&self, n: u8, cmd: u8) {
        if self.stall_cmds.get() {
            return;
        }
        self.set_sock_reg(n, socket::SN_CR, 0);

        match cmd {
            sock_cmd::OPEN => {
                let sr = match self.sock_reg(n, socket::SN_MR) {
                    0x21 => sock_status::INIT,
                    0x02 => sock_status::UDP,
                    0x04 => sock_status::MACRAW,
                    _ => sock_status::CLOSED,
                };
                self.set_sock_reg(n, socket::SN_SR, sr);
                self.set_u16(n, socket::SN_TX_FSR, SOCKET_BUFFER_SIZE);
                self.set_u16(n, socket::SN_TX_WR, 0);
                self.set_u16(n, socket::SN_RX_RD, 0);
                self.set_u16(n, socket::SN_RX_RSR, 0);
                self.last_rx_rd.borrow_mut()[n as usize] = 0;
            }
            sock_cmd::LISTEN => {
                let sr = self.listen_status.borrow()[n as usize].unwrap_or(sock_status::LISTEN);
                self.set_sock_reg(n, socket::SN_SR, sr);
            }
            sock_cmd::CONNECT => {
                let sr =
                    self.connect_status.borrow()[n as usize].unwrap_or(sock_status::ESTABLISHED);
                self.set_sock_reg(n, socket::SN_SR, sr);
            }
            sock_cmd::DISCON | sock_cmd::CLOSE => {
                self.set_sock_reg(n, socket::SN_SR, sock_status::CLOSED);
            }
            sock_cmd::SEND => {
                if self.close_on_send.borrow()[n as usize] {
                    self.set_sock_reg(n, socket::SN_SR, sock_status::CLOSED);
                    return;
                }
                if !self.no_send_ok.get() {
                    let ir = self.sock_reg(n, socket::SN_IR);
                    self.set_sock_reg(n, socket::SN_IR, ir | sock_ir::SEND_OK);
                }
                self.set_u16(n, socket::SN_TX_FSR, SOCKET_BUFFER_SIZE);
            }
            sock_cmd::RECV => {
                let new_rd = self.get_u16(n, socket::SN_RX_RD);
                let consumed = new_rd.wrapping_sub(self.last_rx_rd.borrow()[n as usize]);
                let rsr = self.get_u16(n, socket::SN_RX_RSR);
                self.set_u16(n, socket::SN_RX_RSR, rsr.saturating_sub(consumed));
                self.last_rx_rd.borrow_mut()[n as usize] = new_rd;
            }
            _ => {}
        }
    }

    fn fill_read(&self, address: u16, control: u8, buf: &mut [u8]) {
        let block = control & 0xF8;

        // Scripted free-size bursts take priority over the register.
        if (block & 0x18) == 0x08 && address == socket::SN_TX_FSR && buf.len() == 2 {
            let n = (control >> 5) as usize;
            if let Some(value) = self.fsr_queues.borrow_mut()[n].pop_front() {
                buf.copy_from_slice(&value.to_be_bytes());
                return;
            }
        }

        let mem = self.mem.borrow();
        for (i, slot) in buf.iter_mut().enumerate() {
            let k = key(control, address.wrapping_add(i as u16));
            *slot = mem.get(&k).copied().unwrap_or(0);
        }
    }

    fn handle(&self, address: u16, control: u8, transfer: Transfer<'_>) -> BusResult<()> {
        match transfer {
            Transfer::Write(data) => {
                self.writes
                    .borrow_mut()
                    .push((address, control, data.to_vec()));
                if self.drop_writes.get() > 0 {
                    self.drop_writes.set(self.drop_writes.get() - 1);
                    return Ok(());
                }
                self.apply_write(address, control, data);
            }
            Transfer::Read(buf) => self.fill_read(address, control, buf),
        }
        Ok(())
    }
}

impl BusTransport for MockBus {
    fn transact(&mut self, address: u16, control: u8, transfer: Transfer<'_>) -> BusResult<()> {
        self.handle(address, control, transfer)
    }
}

impl BusTransport for &MockBus {
    fn transact(&mut self, address: u16, control: u8, transfer: Transfer<'_>) -> BusResult<()> {
        self.handle(address, control, transfer)
    }
}
