//! Contains a multi-task capable watchdog, that ensures all expected tasks
//! are running, and resets the device if not.
//!
//! A device reset is also the only supported way to re-run the guided check
//! sequence, so the watchdog doubles as the recovery path if the procedure
//! ever wedges.

// Copyright (c) 2025 Piers Finlayson <piers@piers.rocks>
//
// GPLv3 licensed - see https://www.gnu.org/licenses/gpl-3.0.html

#[allow(unused_imports)]
use defmt::{debug, error, info, trace, warn};
use embassy_rp::peripherals::WATCHDOG as p_WATCHDOG;
use static_cell::StaticCell;
use task_watchdog::embassy_rp::{WatchdogRunner, watchdog_run};
use task_watchdog::{Id, WatchdogConfig};

use crate::constants::{WATCHDOG_CHECK_INTERVAL, WATCHDOG_HW_TIMEOUT};

// Create a type alias for the WatchdogRunner to make it easier to use.
pub type WatchdogType = WatchdogRunner<TaskId, NUM_TASK_IDS>;

// We use the WATCHDOG static to store the Watchdog object, so we can feed it
// from all of our tasks and objects.
pub static WATCHDOG: StaticCell<WatchdogType> = StaticCell::new();

/// The tasks which are policed by the watchdog.
#[derive(Clone, Copy, PartialEq, Eq, defmt::Format)]
pub enum TaskId {
    /// The checker task - guided sequence first, then the verifier
    /// dispatch loop.  Fed from the confirmation wait as well, as that
    /// can sit for minutes at a time.
    Checker = 0,

    /// The [`StatusDisplay`] task.
    Display,

    // Add any other tasks here
    // ...
    //
    /// The is the number of tasks which are policed by the watchdog.
    Num,
}
impl Id for TaskId {}
const NUM_TASK_IDS: usize = TaskId::Num as usize;

/// A helper function to create the watchdog.
pub fn create_watchdog(p_watchdog: p_WATCHDOG) -> &'static mut WatchdogType {
    // Create watchdog configuration
    let config = WatchdogConfig {
        hardware_timeout: WATCHDOG_HW_TIMEOUT,
        check_interval: WATCHDOG_CHECK_INTERVAL,
    };

    // Create and configure the watchdog runner
    let watchdog = WatchdogRunner::new(p_watchdog, config);

    // Make watchdog static so it can be shared with tasks
    WATCHDOG.init(watchdog)
}

/// A task to run the watchdog.
#[embassy_executor::task]
pub async fn watchdog_task(watchdog: &'static WatchdogType) -> ! {
    watchdog_run(watchdog.create_task()).await
}
