//! ISR-safe shared access to the driver, behind the `critical-section`
//! feature.
//!
//! The bus protocol admits only one transaction at a time, so every
//! shared use goes through `critical_section::with()`; interrupts are
//! disabled for the duration of the closure.

use core::cell::RefCell;

use critical_section::Mutex;
use embedded_hal::delay::DelayNs;

use crate::driver::Wiznet5k;
use crate::hal::BusTransport;

/// Cell providing interior mutability with critical section protection.
///
/// Combines `critical_section::Mutex` with `RefCell` for safe mutable
/// access from both normal code and interrupt handlers.
pub struct CriticalSectionCell<T> {
    inner: Mutex<RefCell<T>>,
}

impl<T> CriticalSectionCell<T> {
    /// Create a new cell (const, suitable for static initialization).
    pub const fn new(value: T) -> Self {
        Self {
            inner: Mutex::new(RefCell::new(value)),
        }
    }

    /// Execute a closure with exclusive mutable access.
    ///
    /// Interrupts are disabled for the duration of the closure.
    #[inline]
    pub fn with<R, F>(&self, f: F) -> R
    where
        F: FnOnce(&mut T) -> R,
    {
        critical_section::with(|cs| {
            let mut value = self.inner.borrow_ref_mut(cs);
            f(&mut value)
        })
    }

    /// Try to execute a closure, returning `None` if already borrowed.
    #[inline]
    pub fn try_with<R, F>(&self, f: F) -> Option<R>
    where
        F: FnOnce(&mut T) -> R,
    {
        critical_section::with(|cs| {
            self.inner
                .borrow(cs)
                .try_borrow_mut()
                .ok()
                .map(|mut value| f(&mut value))
        })
    }
}

// SAFETY: CriticalSectionCell uses critical sections to protect all access.
unsafe impl<T> Sync for CriticalSectionCell<T> {}

/// ISR-safe driver wrapper using critical sections.
///
/// # Example
///
/// ```ignore
/// static ETH: SharedW5500<Transport, Delay> =
///     SharedW5500::new(Wiznet5k::new(transport, delay, DeviceConfig::new()));
///
/// ETH.with(|eth| {
///     eth.socket_write(sock, &data).ok();
/// });
/// ```
pub struct SharedW5500<B, D> {
    inner: CriticalSectionCell<Wiznet5k<B, D>>,
}

impl<B, D> SharedW5500<B, D>
where
    B: BusTransport,
    D: DelayNs,
{
    /// Wrap a driver (const, suitable for static initialization).
    pub const fn new(device: Wiznet5k<B, D>) -> Self {
        Self {
            inner: CriticalSectionCell::new(device),
        }
    }

    /// Execute a closure with exclusive access to the driver.
    ///
    /// Interrupts are disabled for the duration of the closure.
    #[inline]
    pub fn with<R, F>(&self, f: F) -> R
    where
        F: FnOnce(&mut Wiznet5k<B, D>) -> R,
    {
        self.inner.with(f)
    }

    /// Try to execute a closure, returning `None` if already borrowed.
    #[inline]
    pub fn try_with<R, F>(&self, f: F) -> Option<R>
    where
        F: FnOnce(&mut Wiznet5k<B, D>) -> R,
    {
        self.inner.try_with(f)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
