//! SPI bus transport.
//!
//! This module frames one W5500 register transaction: chip-select low,
//! address high byte, address low byte, control byte, then the data
//! phase, then chip-select high. Each edge is followed by a settle
//! delay from [`BusTiming`]; the defaults are the conservative values
//! the reference firmware needed on slow jumper wiring, and
//! [`BusTiming::fast`] zeroes them for clean short traces.
//!
//! The [`BusTransport`] trait is the seam the rest of the driver talks
//! through, so tests can substitute an in-memory register map.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use embedded_hal::spi::{Error as SpiError, SpiBus};

use crate::constants::{BYTE_GAP_US, CS_HOLD_US, CS_RECOVERY_US, CS_SETUP_US, DATA_SETUP_US};
use crate::error::{BusError, BusResult};

// =============================================================================
// Transport Trait
// =============================================================================

/// Direction and buffer of a transaction's data phase.
#[derive(Debug)]
pub enum Transfer<'a> {
    /// Read `buffer.len()` bytes from the chip into the buffer.
    Read(&'a mut [u8]),
    /// Write the buffer's bytes to the chip.
    Write(&'a [u8]),
}

/// One complete, blocking register transaction.
///
/// Only one transaction may be in flight per device; the protocol has
/// no framing that would let two interleave. The driver serializes all
/// access through a single owner (or [`SharedW5500`](crate::sync) under
/// the `critical-section` feature).
pub trait BusTransport {
    /// Execute one transaction: address, control byte, then the data phase.
    ///
    /// A transport failure is fatal to the in-progress operation and is
    /// surfaced, never retried at this layer.
    fn transact(&mut self, address: u16, control: u8, transfer: Transfer<'_>) -> BusResult<()>;
}

// =============================================================================
// Bus Timing
// =============================================================================

/// Settle delays applied around each transaction edge, in microseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BusTiming {
    /// After asserting chip-select, before the first address byte.
    pub cs_setup_us: u32,
    /// Between the address and control bytes.
    pub byte_gap_us: u32,
    /// Between the control byte and the data phase.
    pub data_setup_us: u32,
    /// After the data phase, before releasing chip-select.
    pub cs_hold_us: u32,
    /// After releasing chip-select, before the call returns.
    pub cs_recovery_us: u32,
}

impl BusTiming {
    /// Conservative reference timings, proven on slow wiring at 2 MHz.
    pub const fn conservative() -> Self {
        Self {
            cs_setup_us: CS_SETUP_US,
            byte_gap_us: BYTE_GAP_US,
            data_setup_us: DATA_SETUP_US,
            cs_hold_us: CS_HOLD_US,
            cs_recovery_us: CS_RECOVERY_US,
        }
    }

    /// No settle delays. Byte ordering is still strictly preserved.
    pub const fn fast() -> Self {
        Self {
            cs_setup_us: 0,
            byte_gap_us: 0,
            data_setup_us: 0,
            cs_hold_us: 0,
            cs_recovery_us: 0,
        }
    }

    /// Set the chip-select setup delay.
    #[must_use]
    pub const fn with_cs_setup_us(mut self, us: u32) -> Self {
        self.cs_setup_us = us;
        self
    }

    /// Set the inter-byte gap for the address/control phase.
    #[must_use]
    pub const fn with_byte_gap_us(mut self, us: u32) -> Self {
        self.byte_gap_us = us;
        self
    }

    /// Set the delay between the control byte and the data phase.
    #[must_use]
    pub const fn with_data_setup_us(mut self, us: u32) -> Self {
        self.data_setup_us = us;
        self
    }
}

impl Default for BusTiming {
    fn default() -> Self {
        Self::conservative()
    }
}

// =============================================================================
// SPI Transport
// =============================================================================

/// [`BusTransport`] over an `embedded-hal` SPI bus with a dedicated
/// chip-select pin.
///
/// The chip-select is driven manually rather than through an
/// `SpiDevice` because the W5500 needs the whole four-phase frame under
/// one assertion, with settle delays the `SpiDevice` abstraction cannot
/// express.
#[derive(Debug)]
pub struct SpiTransport<SPI, CS, D> {
    spi: SPI,
    cs: CS,
    delay: D,
    timing: BusTiming,
}

impl<SPI, CS, D> SpiTransport<SPI, CS, D>
where
    SPI: SpiBus,
    CS: OutputPin,
    D: DelayNs,
{
    /// Create a transport with the conservative reference timings.
    pub fn new(spi: SPI, cs: CS, delay: D) -> Self {
        Self::with_timing(spi, cs, delay, BusTiming::conservative())
    }

    /// Create a transport with explicit timings.
    pub fn with_timing(spi: SPI, cs: CS, delay: D, timing: BusTiming) -> Self {
        Self {
            spi,
            cs,
            delay,
            timing,
        }
    }

    /// Current timing configuration.
    pub fn timing(&self) -> BusTiming {
        self.timing
    }

    /// Replace the timing configuration.
    pub fn set_timing(&mut self, timing: BusTiming) {
        self.timing = timing;
    }

    /// Tear down the transport, returning its parts.
    pub fn release(self) -> (SPI, CS, D) {
        (self.spi, self.cs, self.delay)
    }

    fn settle(&mut self, us: u32) {
        if us > 0 {
            self.delay.delay_us(us);
        }
    }

    fn write_byte(&mut self, byte: u8) -> BusResult<()> {
        self.spi
            .write(&[byte])
            .map_err(|e| BusError::Spi(e.kind()))
    }

    /// Deassert chip-select after a failure without clobbering the
    /// original error.
    fn abort(&mut self, err: BusError) -> BusError {
        let _ = self.cs.set_high();
        err
    }

    fn frame(&mut self, address: u16, control: u8, transfer: Transfer<'_>) -> BusResult<()> {
        self.cs.set_low().map_err(|_| BusError::ChipSelect)?;
        self.settle(self.timing.cs_setup_us);

        // Strict ordering: address high, address low, control, data.
        for byte in [(address >> 8) as u8, (address & 0xFF) as u8] {
            if let Err(e) = self.write_byte(byte) {
                return Err(self.abort(e));
            }
            self.settle(self.timing.byte_gap_us);
        }
        if let Err(e) = self.write_byte(control) {
            return Err(self.abort(e));
        }
        self.settle(self.timing.data_setup_us);

        let result = match transfer {
            Transfer::Read(buffer) => self.spi.read(buffer),
            Transfer::Write(data) => self.spi.write(data),
        };
        if let Err(e) = result {
            return Err(self.abort(BusError::Spi(e.kind())));
        }

        self.settle(self.timing.cs_hold_us);
        self.cs.set_high().map_err(|_| BusError::ChipSelect)?;
        self.settle(self.timing.cs_recovery_us);
        Ok(())
    }
}

impl<SPI, CS, D> BusTransport for SpiTransport<SPI, CS, D>
where
    SPI: SpiBus,
    CS: OutputPin,
    D: DelayNs,
{
    fn transact(&mut self, address: u16, control: u8, transfer: Transfer<'_>) -> BusResult<()> {
        self.frame(address, control, transfer)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
