//! Entry point for the buscheck firmware.  The binary calls
//! [`common_main`], which brings up the hardware and spawns the tasks.

// Copyright (c) 2025 Piers Finlayson <piers@piers.rocks>
//
// GPLv3 licensed - see https://www.gnu.org/licenses/gpl-3.0.html

#[allow(unused_imports)]
use defmt::{debug, error, info, trace, warn};
use embassy_executor::Spawner;
use embassy_time::Timer;

use crate::check::checker_task;
use crate::console::Console;
use crate::constants::MAX_SERIAL_STRING_LEN;
use crate::infra::display::{StatusDisplay, status_task};
use crate::infra::gpio::{GPIO, Gpio};
use crate::infra::watchdog::{WatchdogType, create_watchdog, watchdog_task};
use crate::util::built;
use crate::util::dev_info;

/// Common main function.  Never returns - after spawning the tasks this
/// context has nothing left to do.
pub async fn common_main(spawner: Spawner, bin_name: &str) -> ! {
    // Initialize the HAL.
    let mut p = embassy_rp::init(Default::default());

    // Read the board identity and log what firmware this is.
    let mut serial = heapless::String::<MAX_SERIAL_STRING_LEN>::new();
    dev_info::get_serial(&mut p.FLASH, &mut p.DMA_CH2, &mut serial);
    built::log_fw_info(bin_name, serial.as_str());

    // Create the watchdog.  Shared immutably with every task that feeds it.
    let watchdog: &'static WatchdogType = create_watchdog(p.WATCHDOG);

    // Create the console before the Gpio object - it owns the typed UART0
    // pins (PIN_0/PIN_1), which the Gpio allocator deliberately skips.
    let mut console = Console::new(p.UART0, p.PIN_0, p.PIN_1, p.DMA_CH0, p.DMA_CH1, watchdog);

    // Set up the GPIO object, which manages the remaining pins.
    Gpio::create_static(
        p.PIN_2, p.PIN_3, p.PIN_4, p.PIN_5, p.PIN_6, p.PIN_7, p.PIN_8, p.PIN_9, p.PIN_10,
        p.PIN_11, p.PIN_12, p.PIN_13, p.PIN_14, p.PIN_15, p.PIN_16, p.PIN_17, p.PIN_18, p.PIN_19,
        p.PIN_20, p.PIN_21, p.PIN_22, p.PIN_23, p.PIN_24, p.PIN_25, p.PIN_26, p.PIN_27, p.PIN_28,
        p.PIN_29, None,
    )
    .await;

    // Create the status display and the bus lines from the allocated pins.
    let bus = {
        let mut gpio_guard = GPIO.lock().await;
        let gpio = gpio_guard.as_mut().expect("GPIO object doesn't exist");
        StatusDisplay::create_static(gpio.get_status_display_pin());
        gpio.create_loop_bus()
    };

    // Console banner, so the operator knows the tester is alive before the
    // first step appears.
    console.blank_line().await;
    console
        .line_parts(&["buscheck ", built::PKG_VERSION, " - board ", serial.as_str()])
        .await;

    // Spawn the tasks.  The checker owns the console and the bus for the
    // lifetime of the session.
    spawn_or_reboot(spawner.spawn(watchdog_task(watchdog)), "Watchdog");
    spawn_or_reboot(spawner.spawn(status_task(watchdog)), "StatusDisplay");
    spawn_or_reboot(spawner.spawn(checker_task(watchdog, console, bus)), "Checker");

    // All the work happens in the spawned tasks.
    loop {
        Timer::after_secs(60).await;
    }
}

/// Method to spawn tasks.
///
/// Using the Spawner object to spawn can fail, because too many instances of
/// that task are already running.  That shouldn't happen when tasks are only
/// spawned at start of day - if it does, reset and start over.
pub fn spawn_or_reboot<T, E: defmt::Format>(spawn_result: Result<T, E>, task_name: &str) {
    match spawn_result {
        Ok(_) => debug!("Spawned task {}", task_name),
        Err(e) => {
            error!("Failed to spawn task: {}, error: {}", task_name, e);
            // The watchdog may not be running yet, so reset directly.
            cortex_m::peripheral::SCB::sys_reset();
        }
    }
}
