//! This module contains constants for the buscheck firmware.
//!
//! Electrical thresholds that the operator is asked to verify are part of
//! the prompt text in `check.rs` - this module holds the timers, console
//! settings and line polarities.

// Copyright (c) 2025 Piers Finlayson <piers@piers.rocks>
//
// GPLv3 licensed - see https://www.gnu.org/licenses/gpl-3.0.html

use embassy_rp::gpio::Level;
use embassy_time::Duration;
use static_assertions::const_assert;

use crate::util::time::bus;

//
// Watchdog timers
//

/// Hardware watchdog timeout - the watchdog resets the system if the runner
/// task hasn't fed it within this time.
pub const WATCHDOG_HW_TIMEOUT: Duration = Duration::from_secs(1);

/// How often the watchdog runner checks that all policed tasks have fed.
pub const WATCHDOG_CHECK_INTERVAL: Duration = Duration::from_millis(100);

/// How often the checker task must feed the watchdog to prevent a reset.
/// Must comfortably exceed the verifier's inter-cycle gap, as the checker
/// sleeps for the whole gap without feeding.
pub const CHECKER_WATCHDOG_TIMER: Duration = Duration::from_secs(5);
const_assert!(CHECKER_WATCHDOG_TIMER.as_millis() > bus::CYCLE_GAP.as_millis());

/// How often the status display must feed the watchdog to prevent a reset.
pub const STATUS_DISPLAY_WATCHDOG_TIMER: Duration = Duration::from_secs(1);

//
// Task main runner and related timers.
//

// Timer for the StatusDisplay spend on and off when blinking.
pub const STATUS_DISPLAY_BLINK_TIMER: Duration = Duration::from_millis(100);

// Timer for the StatusDisplay to pause between doing work.  Must be less
// than the minimum time the status LED can be on off, and when the code
// changes the device status, it will take up to this time for the new status
// to be applied.
pub const STATUS_DISPLAY_TIMER: Duration = Duration::from_millis(50);

// How often we aim to log from the verifier dispatch loop to prove it is
// still alive.
pub const LOOP_LOG_INTERVAL: Duration = Duration::from_secs(5);

//
// Serial console
//

/// Baud rate of the operator console on UART0.
pub const CONSOLE_BAUD: u32 = 115_200;

/// How long the confirmation wait lets a UART read run before waking up to
/// feed the watchdog.  The operator can take as long as they like; this only
/// bounds the time between feeds.
pub const CONSOLE_POLL_TIMER: Duration = Duration::from_millis(100);
const_assert!(CONSOLE_POLL_TIMER.as_millis() < CHECKER_WATCHDOG_TIMER.as_millis());

//
// Pin constants
//
// The bus line pins are in `infra/gpio.rs` - these are the fixed ones.
//

/// Status LED pin.
pub const STATUS_LED_PIN: u8 = 25;

/// Console TX pin (UART0 default).
pub const CONSOLE_TX_PIN: u8 = 0;

/// Console RX pin (UART0 default).
pub const CONSOLE_RX_PIN: u8 = 1;

/// Maximum length of the board serial string shown on the banner.
pub const MAX_SERIAL_STRING_LEN: usize = 16;

//
// Line polarities
//
// The downlink line carries controller-to-peripheral signaling, the uplink
// line peripheral-to-controller.  The two output driver stages are wired
// with opposite polarity on the tested hardware: driving the downlink
// output pin low switches the interface to its high-current state (active),
// while driving the uplink output pin low leaves the line at its high
// voltage rest state (idle).  Keep these as four separate constants - the
// asymmetry is a property of the hardware, not a convention to unify.
//

/// Downlink (controller) output level when the line is at rest.
pub const DOWNLINK_OUT_IDLE: Level = Level::High;

/// Downlink (controller) output level for the high-current active drive.
pub const DOWNLINK_OUT_ACTIVE: Level = Level::Low;

/// Uplink (peripheral) output level when the line is at rest (high voltage).
pub const UPLINK_OUT_IDLE: Level = Level::Low;

/// Uplink (peripheral) output level for the active drive.
pub const UPLINK_OUT_ACTIVE: Level = Level::High;
