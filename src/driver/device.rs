//! W5500 device handle: register access, reset, detection, bring-up,
//! and interface configuration.
//!
//! [`Wiznet5k`] owns the bus transport and the delay source for the
//! lifetime of the driver. All socket and transfer operations hang off
//! this handle; they live in sibling modules but share its register
//! primitives.

use embedded_hal::delay::DelayNs;

use crate::constants::{
    BUFFER_PROG_GAP_US, BUFFER_SIZE_KB, CS_IDLE_SETTLE_US, DEFAULT_PORT_SEED, EPHEMERAL_PORT_MAX,
    EPHEMERAL_PORT_MIN, POWER_UP_SETTLE_US, SOCKET_COUNT, SOFT_RESET_ATTEMPTS, SOFT_RESET_POLL_US,
    SOFT_RESET_WAIT_US, VERIFY_RETRY_DELAY_US, VERIFY_SETTLE_US, VERSION_W5500,
};
use crate::driver::config::{ChipCheck, ChipId, DeviceConfig, Duplex, LinkStatus, Speed};
use crate::driver::transfer::UdpDatagram;
use crate::error::{ConfigError, Error, Result};
use crate::hal::{BusTransport, Transfer};
use crate::net::{IfConfig, IpAddress, MacAddress};
use crate::registers::{BlockSelect, common, mode, phycfg, socket};

// =============================================================================
// Device Handle
// =============================================================================

/// Driver handle for one W5500 chip.
///
/// Generic over the bus transport and the delay source so the same
/// driver runs against real SPI hardware and against an in-memory
/// register map in tests.
pub struct Wiznet5k<B, D> {
    pub(crate) bus: B,
    pub(crate) delay: D,
    pub(crate) config: DeviceConfig,
    chip: ChipId,
    dns: IpAddress,
    /// Source port programmed into each slot, zero when unassigned.
    pub(crate) src_ports: [u16; SOCKET_COUNT],
    /// Per-slot UDP datagram state parsed from the chip's RX header.
    pub(crate) udp: [UdpDatagram; SOCKET_COUNT],
    /// xorshift32 state for ephemeral port assignment.
    rng: u32,
}

impl<B, D> Wiznet5k<B, D>
where
    B: BusTransport,
    D: DelayNs,
{
    /// Create a driver handle. No bus traffic is issued until
    /// [`initialize`](Self::initialize).
    pub const fn new(bus: B, delay: D, config: DeviceConfig) -> Self {
        Self {
            bus,
            delay,
            config,
            chip: ChipId::W5500,
            dns: IpAddress::UNSPECIFIED,
            src_ports: [0; SOCKET_COUNT],
            udp: [UdpDatagram::EMPTY; SOCKET_COUNT],
            rng: if config.port_seed == 0 {
                DEFAULT_PORT_SEED
            } else {
                config.port_seed
            },
        }
    }

    /// The active configuration.
    pub const fn config(&self) -> &DeviceConfig {
        &self.config
    }

    /// The chip identity established at initialization.
    pub const fn chip(&self) -> ChipId {
        self.chip
    }

    /// Number of hardware socket slots.
    pub const fn max_sockets(&self) -> usize {
        SOCKET_COUNT
    }

    /// Tear down the driver, returning the bus and delay.
    pub fn release(self) -> (B, D) {
        (self.bus, self.delay)
    }

    // =========================================================================
    // Register Primitives
    // =========================================================================

    /// Read `buf.len()` bytes starting at `address` in `block`.
    pub(crate) fn read(&mut self, block: BlockSelect, address: u16, buf: &mut [u8]) -> Result<()> {
        self.bus
            .transact(address, block.read_control(), Transfer::Read(buf))
            .map_err(Error::Bus)
    }

    /// Write `data` starting at `address` in `block`.
    pub(crate) fn write(&mut self, block: BlockSelect, address: u16, data: &[u8]) -> Result<()> {
        self.bus
            .transact(address, block.write_control(), Transfer::Write(data))
            .map_err(Error::Bus)
    }

    pub(crate) fn read_u8(&mut self, block: BlockSelect, address: u16) -> Result<u8> {
        let mut buf = [0u8; 1];
        self.read(block, address, &mut buf)?;
        Ok(buf[0])
    }

    pub(crate) fn write_u8(&mut self, block: BlockSelect, address: u16, value: u8) -> Result<()> {
        self.write(block, address, &[value])
    }

    /// Read a big-endian 16-bit register as one two-byte burst.
    ///
    /// A burst read latches both bytes in a single transaction, so the
    /// value cannot tear even while the chip is updating it.
    pub(crate) fn read_u16(&mut self, block: BlockSelect, address: u16) -> Result<u16> {
        let mut buf = [0u8; 2];
        self.read(block, address, &mut buf)?;
        Ok(u16::from_be_bytes(buf))
    }

    /// Write a big-endian 16-bit register as one two-byte burst.
    pub(crate) fn write_u16(&mut self, block: BlockSelect, address: u16, value: u16) -> Result<()> {
        self.write(block, address, &value.to_be_bytes())
    }

    /// Write `data` and read it back until it matches, within the
    /// configured retry budget.
    ///
    /// On success the register is guaranteed to have held `data` at the
    /// verification read. Exhausting the budget is
    /// [`ConfigError::VerificationFailed`].
    pub(crate) fn write_verified(
        &mut self,
        block: BlockSelect,
        address: u16,
        data: &[u8],
    ) -> Result<()> {
        debug_assert!(data.len() <= 8);
        let attempts = self.config.verify_retries.max(1);
        for _ in 0..attempts {
            self.write(block, address, data)?;
            self.delay.delay_us(VERIFY_SETTLE_US);

            let mut scratch = [0u8; 8];
            let readback = &mut scratch[..data.len()];
            self.read(block, address, readback)?;
            if readback == data {
                return Ok(());
            }

            #[cfg(feature = "defmt")]
            defmt::warn!("w5500: verify mismatch at {=u16:#x}, retrying", address);
            self.delay.delay_us(VERIFY_RETRY_DELAY_US);
        }
        Err(ConfigError::VerificationFailed.into())
    }

    // =========================================================================
    // Initialization
    // =========================================================================

    /// Bring the chip from power-on to a configured idle state.
    ///
    /// Performs the settle wait, software reset, chip detection, buffer
    /// programming, and MAC assignment. Must complete before any socket
    /// operation.
    pub fn initialize(&mut self) -> Result<()> {
        #[cfg(feature = "defmt")]
        defmt::info!("w5500: initializing, mac={}", self.config.mac.octets());

        // === STEP 1: Power-up settle ===
        // The chip ignores bus traffic while its PLL locks.
        self.delay.delay_us(POWER_UP_SETTLE_US);
        self.delay.delay_us(CS_IDLE_SETTLE_US);

        // === STEP 2: Software reset ===
        self.soft_reset()?;

        // === STEP 3: Clear the mode register ===
        self.write_verified(BlockSelect::Common, common::MR, &[0x00])?;

        // === STEP 4: Chip detection ===
        self.chip = self.detect()?;

        // === STEP 5: Program the buffer split ===
        // Fixed 2 KB TX / 2 KB RX per socket. The gap between writes
        // gives the chip time to re-partition its memory.
        for n in 0..SOCKET_COUNT as u8 {
            let block = BlockSelect::SocketReg(n);
            self.write_u8(block, socket::SN_RXBUF_SIZE, BUFFER_SIZE_KB)?;
            self.delay.delay_us(BUFFER_PROG_GAP_US);
            self.write_u8(block, socket::SN_TXBUF_SIZE, BUFFER_SIZE_KB)?;
            self.delay.delay_us(BUFFER_PROG_GAP_US);
        }

        // === STEP 6: Program the MAC address ===
        let mac = self.config.mac;
        self.set_mac_address(mac)?;

        #[cfg(feature = "defmt")]
        defmt::info!("w5500: ready, chip={=str}", self.chip.as_str());
        Ok(())
    }

    /// Issue a software reset and wait for the mode register to clear.
    pub fn soft_reset(&mut self) -> Result<()> {
        self.write_u8(BlockSelect::Common, common::MR, mode::RST)?;
        self.delay.delay_us(SOFT_RESET_WAIT_US);

        for _ in 0..SOFT_RESET_ATTEMPTS {
            if self.read_u8(BlockSelect::Common, common::MR)? == 0x00 {
                return Ok(());
            }
            self.delay.delay_us(SOFT_RESET_POLL_US);
        }
        Err(ConfigError::ResetFailed.into())
    }

    /// Read the version register and check it against the W5500
    /// signature, applying the configured [`ChipCheck`] policy.
    pub fn detect(&mut self) -> Result<ChipId> {
        let version = self.read_u8(BlockSelect::Common, common::VERSIONR)?;
        if version == VERSION_W5500 {
            #[cfg(feature = "defmt")]
            defmt::info!("w5500: detected, version {=u8:#x}", version);
            return Ok(ChipId::W5500);
        }

        match self.config.chip_check {
            ChipCheck::Strict => Err(ConfigError::ChipNotDetected { version }.into()),
            ChipCheck::Lenient => {
                #[cfg(feature = "defmt")]
                defmt::warn!(
                    "w5500: version register read {=u8:#x}, expected {=u8:#x}; proceeding",
                    version,
                    VERSION_W5500
                );
                Ok(ChipId::W5500)
            }
        }
    }

    /// Raw contents of the version register.
    pub fn version(&mut self) -> Result<u8> {
        self.read_u8(BlockSelect::Common, common::VERSIONR)
    }

    // =========================================================================
    // Addressing
    // =========================================================================

    /// The MAC address currently programmed into the chip.
    pub fn mac_address(&mut self) -> Result<MacAddress> {
        let mut octets = [0u8; 6];
        self.read(BlockSelect::Common, common::SHAR, &mut octets)?;
        Ok(MacAddress(octets))
    }

    /// Program the hardware MAC address, verified.
    pub fn set_mac_address(&mut self, mac: MacAddress) -> Result<()> {
        self.write_verified(BlockSelect::Common, common::SHAR, &mac.octets())?;
        self.config.mac = mac;
        Ok(())
    }

    /// The source IP address currently programmed into the chip.
    pub fn ip_address(&mut self) -> Result<IpAddress> {
        let mut octets = [0u8; 4];
        self.read(BlockSelect::Common, common::SIPR, &mut octets)?;
        Ok(IpAddress(octets))
    }

    /// Read back the full interface configuration.
    ///
    /// The DNS server is not a chip register; the cached value from the
    /// last [`set_ifconfig`](Self::set_ifconfig) is returned.
    pub fn ifconfig(&mut self) -> Result<IfConfig> {
        let mut ip = [0u8; 4];
        let mut subnet = [0u8; 4];
        let mut gateway = [0u8; 4];
        self.read(BlockSelect::Common, common::SIPR, &mut ip)?;
        self.read(BlockSelect::Common, common::SUBR, &mut subnet)?;
        self.read(BlockSelect::Common, common::GAR, &mut gateway)?;
        Ok(IfConfig {
            ip: IpAddress(ip),
            subnet: IpAddress(subnet),
            gateway: IpAddress(gateway),
            dns: self.dns,
        })
    }

    /// Commit an interface configuration, each address verified.
    pub fn set_ifconfig(&mut self, config: IfConfig) -> Result<()> {
        self.write_verified(BlockSelect::Common, common::SIPR, &config.ip.octets())?;
        self.write_verified(BlockSelect::Common, common::SUBR, &config.subnet.octets())?;
        self.write_verified(BlockSelect::Common, common::GAR, &config.gateway.octets())?;
        self.dns = config.dns;

        #[cfg(feature = "defmt")]
        defmt::info!(
            "w5500: ifconfig ip={} gw={}",
            config.ip.octets(),
            config.gateway.octets()
        );
        Ok(())
    }

    /// The cached DNS server address.
    pub const fn dns_server(&self) -> IpAddress {
        self.dns
    }

    // =========================================================================
    // Link
    // =========================================================================

    /// Physical link state from the PHY configuration register.
    pub fn link_status(&mut self) -> Result<LinkStatus> {
        let phy = self.read_u8(BlockSelect::Common, common::PHYCFGR)?;
        Ok(if phy & phycfg::LINK_UP != 0 {
            LinkStatus::Up
        } else {
            LinkStatus::Down
        })
    }

    /// Negotiated link speed. Meaningful only while the link is up.
    pub fn link_speed(&mut self) -> Result<Speed> {
        let phy = self.read_u8(BlockSelect::Common, common::PHYCFGR)?;
        Ok(if phy & phycfg::SPEED_100 != 0 {
            Speed::Mbps100
        } else {
            Speed::Mbps10
        })
    }

    /// Negotiated duplex mode. Meaningful only while the link is up.
    pub fn link_duplex(&mut self) -> Result<Duplex> {
        let phy = self.read_u8(BlockSelect::Common, common::PHYCFGR)?;
        Ok(if phy & phycfg::FULL_DUPLEX != 0 {
            Duplex::Full
        } else {
            Duplex::Half
        })
    }

    // =========================================================================
    // Ephemeral Ports
    // =========================================================================

    /// Next ephemeral-port candidate from the IANA dynamic range.
    ///
    /// Callers must still check the candidate against ports already in
    /// use before programming it.
    pub(crate) fn next_port_candidate(&mut self) -> u16 {
        // xorshift32; the seed is kept nonzero so the state never
        // collapses.
        let mut x = self.rng;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.rng = x;

        let span = u32::from(EPHEMERAL_PORT_MAX - EPHEMERAL_PORT_MIN) + 1;
        (u32::from(EPHEMERAL_PORT_MIN) + x % span) as u16
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
