//! test_receiver
//!
//! Tests the tester hardware, by "receiving" - detects when either bus
//! input changes level, and outputs a log message using RTT.  This is
//! intended to be used in conjunction with the `test_sender` program, which
//! drives the lines in turn.

// Copyright (c) 2025 Piers Finlayson <piers@piers.rocks>
//
// GPLv3 licensed - see https://www.gnu.org/licenses/gpl-3.0.html

#![no_std]
#![no_main]

use buscheck_rs::test::create_pins;
use defmt::info;
use embassy_executor::Spawner;
use embassy_rp::gpio::Level;
use embassy_time::Timer;
use {defmt_rtt as _, panic_probe as _};

#[embassy_executor::main]
async fn main(_spawner: Spawner) -> ! {
    info!("buscheck test receiver");

    let p = embassy_rp::init(Default::default());

    let (pins, _) = create_pins(p, true, false);
    let mut pins = pins.unwrap();

    loop {
        for pin in pins.iter_mut() {
            if pin.has_changed() {
                if pin.get_level() == Level::High {
                    info!("Pin {} {} changed to high", pin.name, pin.num);
                } else {
                    info!("Pin {} {} changed to low", pin.name, pin.num);
                }
            }
        }

        // Keep the poll tight enough to catch the sender's edges but still
        // let the executor breathe.
        Timer::after_millis(1).await;
    }
}
