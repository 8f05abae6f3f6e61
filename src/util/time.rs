//! This file implements custom timing functions and macros used by buscheck,
//! plus the bus settle/cycle timings the verifier runs to.
//!
//! In some cases we reimplement embassy-time functions, primarily to make it
//! clear what they are doing under the covers.

// Copyright (c) 2025 Piers Finlayson <piers@piers.rocks>
//
// GPLv3 licensed - see https://www.gnu.org/licenses/gpl-3.0.html

use embassy_time::{Duration, Instant};

/// Functiom to block until a specific instant.  This is similar to the
/// embassy-time::Delay::block_for function.
///
/// We always inline it to reduce function call/return overhead, as this is
/// typically used in timing critical functions
#[inline(always)]
pub fn block_until(expires: Instant) {
    while Instant::now() < expires {}
}

/// Function to block for a specific Duration.  This is similar to the
/// embassy-time::Delay::block_for function.
///
/// We always inline it to reduce function call/return overhead, as this is
/// typically used in timing critical functions
#[inline(always)]
pub fn block_for(duration: Duration) {
    block_until(Instant::now() + duration);
}

/// Block for a specific number of microseconds.
macro_rules! block_us {
    ($us:expr) => {
        crate::util::time::block_for(embassy_time::Duration::from_micros($us))
    };
}
pub(crate) use block_us;

/// Macro to briefly delay in order to let a driven pin slew before anything
/// samples it.
macro_rules! pin_delay {
    () => {
        block_us!(2)
    };
}
pub(crate) use pin_delay;

/// Macro which yields to the scheduler for at least the specified time.  As
/// embassy will only come back to us after whatever has been scheduled has
/// paused, it could be longer than specified.  If you need a more accurate
/// pause, considering using block_us! instead.
macro_rules! yield_ms {
    ($ms:expr) => {
        embassy_time::Timer::after_millis($ms).await
    };
}
pub(crate) use yield_ms;

/// Macro which yields to the scheduler for at least the specified time.  As
/// embassy will only come back to us after whatever has been scheduled has
/// paused, it could be longer than specified.  If you need a more accurate
/// pause, considering using block_for() instead.
macro_rules! yield_for {
    ($dur:expr) => {
        embassy_time::Timer::after($dur).await
    };
}
pub(crate) use yield_for;

pub mod bus {
    //! Bus verifier timings.
    //!
    //! None of these are protocol timings - the tested interface is not
    //! being spoken to, only driven and sampled - so they only need to be
    //! long enough for the physical line to reach steady state.

    use embassy_time::Duration;

    /// How long to let the lines settle after driving or releasing an
    /// output, before sampling the inputs.
    pub const SETTLE: Duration = Duration::from_millis(40);

    /// How long the verifier pauses between cycles.  Also the pace of the
    /// dispatch loop when a failed check session has parked the verifier.
    pub const CYCLE_GAP: Duration = Duration::from_millis(2000);

    /// How long a restored line is given to return to rest before the next
    /// guided step is presented to the operator.
    pub const RESTORE_GAP_MS: u64 = 10;
}
