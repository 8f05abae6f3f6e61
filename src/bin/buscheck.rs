//! buscheck
//!
//! The tester firmware binary.  Everything interesting lives in the
//! library - this just hands control to the common entry point.

// Copyright (c) 2025 Piers Finlayson <piers@piers.rocks>
//
// GPLv3 licensed - see https://www.gnu.org/licenses/gpl-3.0.html

#![no_std]
#![no_main]

use {defmt_rtt as _, panic_probe as _};

#[embassy_executor::main]
async fn main(spawner: embassy_executor::Spawner) -> ! {
    buscheck_rs::entry::common_main(spawner, env!("CARGO_BIN_NAME")).await
}
