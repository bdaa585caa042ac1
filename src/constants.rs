//! Centralized Constants
//!
//! This module provides a single source of truth for the chip-family
//! geometry and the timing values used throughout the W5500 driver.
//!
//! # Organization
//!
//! Constants are grouped by category:
//! - **Socket geometry**: socket count and hardware buffer dimensions
//! - **Chip identity**: version register signature
//! - **Timing**: bus settle delays, reset sequencing, polling intervals
//! - **Polling bounds**: iteration limits for bounded waits
//! - **Defaults**: MAC address, ephemeral port range, RNG seed
//!
//! # Note
//!
//! Register addresses, control-byte encodings, and status/command codes
//! live in [`crate::registers`] as they are specific to the chip's
//! register map rather than to driver policy.
//!
//! The bus settle delays are conservative values proven on slow wiring
//! (jumper-wired modules at 2 MHz). [`crate::hal::BusTiming::fast`]
//! zeroes them for clean, short traces.

// =============================================================================
// Socket Geometry
// =============================================================================

/// Number of hardware sockets on the W5500 (also W5200).
pub const SOCKET_COUNT: usize = 8;

/// Size of each socket's TX buffer and each socket's RX buffer, in bytes.
///
/// The driver programs every socket to the fixed 2 KB / 2 KB split at
/// initialization; a single write can never exceed this.
pub const SOCKET_BUFFER_SIZE: u16 = 0x0800;

/// Mask that maps a free-running 16-bit pointer to an offset inside one
/// socket's 2 KB buffer block.
pub const SOCKET_BUFFER_MASK: u16 = SOCKET_BUFFER_SIZE - 1;

/// Base address of socket 0's TX buffer block in chip memory.
pub const TX_BUFFER_BASE: u16 = 0x8000;

/// Buffer size value programmed into `Sn_RXBUF_SIZE` / `Sn_TXBUF_SIZE`
/// at initialization, in kilobytes.
pub const BUFFER_SIZE_KB: u8 = 2;

/// Size of the header the chip prepends to every received UDP datagram
/// (4 bytes remote IP, 2 bytes remote port, 2 bytes payload length).
pub const UDP_HEADER_SIZE: u16 = 8;

// =============================================================================
// Chip Identity
// =============================================================================

/// Value the W5500 version register (`VERSIONR`) reads back as.
pub const VERSION_W5500: u8 = 0x04;

// =============================================================================
// Bus Timing (reference values, see BusTiming)
// =============================================================================

/// Settle time after asserting chip-select, in microseconds.
pub const CS_SETUP_US: u32 = 5_000;

/// Gap between consecutive bytes of the address/control phase, in microseconds.
pub const BYTE_GAP_US: u32 = 2_000;

/// Settle time between the control byte and the data phase, in microseconds.
pub const DATA_SETUP_US: u32 = 5_000;

/// Settle time before releasing chip-select, in microseconds.
pub const CS_HOLD_US: u32 = 5_000;

/// Recovery time after releasing chip-select, in microseconds.
pub const CS_RECOVERY_US: u32 = 2_000;

// =============================================================================
// Reset and Bring-up Timing
// =============================================================================

/// Hold time with the reset pin high before pulling it low, in microseconds.
pub const HW_RESET_ASSERT_US: u32 = 50_000;

/// Hold time with the reset pin low (datasheet minimum is 2 ms), in microseconds.
pub const HW_RESET_LOW_US: u32 = 10_000;

/// Settle time after releasing the reset pin, in microseconds.
pub const HW_RESET_SETTLE_US: u32 = 100_000;

/// Power-up settle time before the first bus transaction, in microseconds.
pub const POWER_UP_SETTLE_US: u32 = 200_000;

/// Settle time after forcing chip-select high at bring-up, in microseconds.
pub const CS_IDLE_SETTLE_US: u32 = 50_000;

/// Wait after writing the reset bit before polling the mode register, in microseconds.
pub const SOFT_RESET_WAIT_US: u32 = 20_000;

/// Interval between mode-register polls while a soft reset completes, in microseconds.
pub const SOFT_RESET_POLL_US: u32 = 10_000;

/// Gap between the per-socket buffer-size register writes at bring-up, in microseconds.
pub const BUFFER_PROG_GAP_US: u32 = 1_000;

// =============================================================================
// Operation Timing
// =============================================================================

/// Settle delay after a write before its verification read, in microseconds.
pub const VERIFY_SETTLE_US: u32 = 10_000;

/// Delay between attempts of a verified write, in microseconds.
pub const VERIFY_RETRY_DELAY_US: u32 = 10_000;

/// Settle delay before programming the socket mode register on open, in microseconds.
pub const OPEN_SETTLE_US: u32 = 250;

/// Interval between socket status polls (open/listen/connect), in microseconds.
pub const STATUS_POLL_US: u32 = 1_000;

/// Interval between interrupt-register polls while waiting for send
/// completion, in microseconds.
pub const SEND_POLL_US: u32 = 10_000;

/// Interval between command-register polls while waiting for self-clear,
/// in microseconds.
pub const COMMAND_POLL_US: u32 = 10;

// =============================================================================
// Polling Bounds
// =============================================================================

/// Maximum mode-register polls before a soft reset is declared failed.
pub const SOFT_RESET_ATTEMPTS: u32 = 10;

/// Maximum command-register polls before a socket command is declared stuck.
pub const COMMAND_CLEAR_ATTEMPTS: u32 = 1_000;

/// Maximum status polls for open/listen to reach their target state.
pub const OPEN_POLL_ATTEMPTS: u32 = 100;

/// Maximum attempts to obtain two agreeing reads of a free-size or
/// received-size register.
pub const STABLE_READ_ATTEMPTS: u32 = 32;

// =============================================================================
// Defaults
// =============================================================================

/// Default write-verify retry budget (attempts, including the first write).
pub const DEFAULT_VERIFY_RETRIES: u8 = 3;

/// Default deadline for TCP connect establishment, in milliseconds.
pub const DEFAULT_CONNECT_TIMEOUT_MS: u32 = 5_000;

/// Default hardware MAC address, used when none is configured.
pub const DEFAULT_MAC: [u8; 6] = [0xDE, 0xAD, 0xBE, 0xEF, 0xFE, 0xED];

/// Lowest ephemeral source port the driver assigns.
pub const EPHEMERAL_PORT_MIN: u16 = 49_152;

/// Highest ephemeral source port the driver assigns.
pub const EPHEMERAL_PORT_MAX: u16 = 65_535;

/// Default seed for the ephemeral-port generator.
pub const DEFAULT_PORT_SEED: u32 = 0x5749_5A6E;
