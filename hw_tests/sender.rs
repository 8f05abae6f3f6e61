//! test_sender
//!
//! Tests the tester hardware, by "sending" - toggles each bus output
//! between its idle and active levels in turn.  This is intended to be used
//! in conjunction with the `test_receiver` program running on a second
//! board (or a scope on the output pins), to prove the drive stages and
//! wiring before an interface board is fitted.

// Copyright (c) 2025 Piers Finlayson <piers@piers.rocks>
//
// GPLv3 licensed - see https://www.gnu.org/licenses/gpl-3.0.html

#![no_std]
#![no_main]

use buscheck_rs::test::create_pins;
use defmt::info;
use embassy_executor::Spawner;
use embassy_time::Timer;
use {defmt_rtt as _, panic_probe as _};

pub const DELAY_MS: u64 = 2500;

#[embassy_executor::main]
async fn main(_spawner: Spawner) -> ! {
    info!("buscheck test sender");

    // Create the pin objects
    let p = embassy_rp::init(Default::default());
    let (_, pins) = create_pins(p, false, true);
    let mut pins = pins.unwrap();

    loop {
        for pin in pins.iter_mut() {
            Timer::after_millis(DELAY_MS).await;
            if pin.is_active() {
                info!("Set pin {} {} idle", pin.name, pin.num);
                pin.set_idle();
            } else {
                info!("Set pin {} {} active", pin.name, pin.num);
                pin.set_active();
            }
        }
    }
}
