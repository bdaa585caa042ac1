//! Hardware reset sequencing.
//!
//! The W5500's RSTn pin must be held low for at least 2 ms and the chip
//! needs a settle period after release before the first transaction.
//! The sequencer is separate from the device so an application can wire
//! the pin elsewhere (or omit it and rely on soft reset alone).

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;

use crate::constants::{HW_RESET_ASSERT_US, HW_RESET_LOW_US, HW_RESET_SETTLE_US};
use crate::error::{BusError, BusResult};

// =============================================================================
// Reset Controller
// =============================================================================

/// Drives the chip's reset pin through the datasheet sequence.
#[derive(Debug)]
pub struct ResetController<P> {
    pin: P,
    /// Hold time with the pin high before asserting, in microseconds.
    assert_us: u32,
    /// Hold time with the pin low, in microseconds.
    low_us: u32,
    /// Settle time after release, in microseconds.
    settle_us: u32,
}

impl<P: OutputPin> ResetController<P> {
    /// Create a controller with the reference hold times.
    pub fn new(pin: P) -> Self {
        Self {
            pin,
            assert_us: HW_RESET_ASSERT_US,
            low_us: HW_RESET_LOW_US,
            settle_us: HW_RESET_SETTLE_US,
        }
    }

    /// Create a controller with custom hold times, in microseconds.
    ///
    /// `low_us` below the datasheet's 2 ms minimum will not reliably
    /// reset the chip.
    pub fn with_timing(pin: P, assert_us: u32, low_us: u32, settle_us: u32) -> Self {
        Self {
            pin,
            assert_us,
            low_us,
            settle_us,
        }
    }

    /// Run the full reset sequence: high, low, high, settle.
    ///
    /// Blocks for the sum of the configured hold times.
    pub fn reset<D: DelayNs>(&mut self, delay: &mut D) -> BusResult<()> {
        self.pin.set_high().map_err(|_| BusError::ResetPin)?;
        delay.delay_us(self.assert_us);
        self.pin.set_low().map_err(|_| BusError::ResetPin)?;
        delay.delay_us(self.low_us);
        self.pin.set_high().map_err(|_| BusError::ResetPin)?;
        delay.delay_us(self.settle_us);
        Ok(())
    }

    /// Tear down the controller, returning the pin.
    pub fn release(self) -> P {
        self.pin
    }
}

/// One-shot hardware reset with the reference hold times.
pub fn hardware_reset<P: OutputPin, D: DelayNs>(pin: &mut P, delay: &mut D) -> BusResult<()> {
    pin.set_high().map_err(|_| BusError::ResetPin)?;
    delay.delay_us(HW_RESET_ASSERT_US);
    pin.set_low().map_err(|_| BusError::ResetPin)?;
    delay.delay_us(HW_RESET_LOW_US);
    pin.set_high().map_err(|_| BusError::ResetPin)?;
    delay.delay_us(HW_RESET_SETTLE_US);
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
#[allow(clippy::std_instead_of_core, clippy::std_instead_of_alloc)]
mod tests {
    extern crate std;

    use core::convert::Infallible;
    use std::vec::Vec;

    use super::*;
    use crate::test_utils::MockDelay;

    #[derive(Default)]
    struct RecordingPin {
        levels: Vec<bool>,
    }

    impl embedded_hal::digital::ErrorType for RecordingPin {
        type Error = Infallible;
    }

    impl OutputPin for RecordingPin {
        fn set_low(&mut self) -> Result<(), Self::Error> {
            self.levels.push(false);
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), Self::Error> {
            self.levels.push(true);
            Ok(())
        }
    }

    #[test]
    fn reset_sequence_is_high_low_high() {
        let mut ctrl = ResetController::new(RecordingPin::default());
        let delay = MockDelay::new();
        ctrl.reset(&mut &delay).unwrap();

        let pin = ctrl.release();
        assert_eq!(pin.levels, [true, false, true]);
    }

    #[test]
    fn reset_holds_for_configured_times() {
        let mut ctrl = ResetController::with_timing(RecordingPin::default(), 100, 2_000, 5_000);
        let delay = MockDelay::new();
        ctrl.reset(&mut &delay).unwrap();

        assert_eq!(delay.total_us(), 100 + 2_000 + 5_000);
    }

    #[test]
    fn free_function_matches_controller_defaults() {
        let mut pin = RecordingPin::default();
        let delay = MockDelay::new();
        hardware_reset(&mut pin, &mut &delay).unwrap();

        assert_eq!(pin.levels, [true, false, true]);
        assert_eq!(
            delay.total_us(),
            u64::from(HW_RESET_ASSERT_US + HW_RESET_LOW_US + HW_RESET_SETTLE_US)
        );
    }
}
