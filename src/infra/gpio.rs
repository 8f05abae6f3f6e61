//! This file handles GPIO pin allocation.
//!
//! The source code serves as the master list of pin assignments for the
//! tester hardware.  PIN_0 and PIN_1 are not managed here - they are the
//! UART0 console pins and are claimed, typed, by the console before the
//! Gpio object is created.

// Copyright (c) 2025 Piers Finlayson <piers@piers.rocks>
//
// GPLv3 licensed - see https://www.gnu.org/licenses/gpl-3.0.html

#[allow(unused_imports)]
use defmt::{debug, error, info, trace, warn};
use embassy_rp::gpio::{AnyPin, Flex, Pin};
use embassy_rp::peripherals::{
    PIN_2, PIN_3, PIN_4, PIN_5, PIN_6, PIN_7, PIN_8, PIN_9, PIN_10, PIN_11, PIN_12, PIN_13,
    PIN_14, PIN_15, PIN_16, PIN_17, PIN_18, PIN_19, PIN_20, PIN_21, PIN_22, PIN_23, PIN_24,
    PIN_25, PIN_26, PIN_27, PIN_28, PIN_29,
};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::mutex::Mutex;

use crate::bus::{Line, LoopBus};
use crate::constants::{
    DOWNLINK_OUT_ACTIVE, DOWNLINK_OUT_IDLE, UPLINK_OUT_ACTIVE, UPLINK_OUT_IDLE,
};

//
// Statics
//

// Static Gpio object
pub static GPIO: Mutex<CriticalSectionRawMutex, Option<Gpio>> = Mutex::new(None);

/// GPIO configurations for different board revisions
pub mod config {
    use super::{BusPinConfig, PinConfig};
    use crate::constants::STATUS_LED_PIN;

    /// Configuration for the v0.1 tester board
    pub fn standard_v0_1() -> PinConfig {
        PinConfig {
            status_display_pin: STATUS_LED_PIN,
            bus_pins: bus_v0_1(),
        }
    }

    // Pinout used for the v0.1 tester board.  The *_in pins sit behind the
    // interface's receiver stages, the *_out pins ahead of its driver
    // stages.
    fn bus_v0_1() -> BusPinConfig {
        BusPinConfig {
            ctl_in: 2,
            ctl_out: 3,
            per_in: 4,
            per_out: 5,
        }
    }
}

/// Pin configuration for different board revisions
pub struct PinConfig {
    pub status_display_pin: u8,
    pub bus_pins: BusPinConfig,
}

/// Bus line pin configuration
#[derive(Clone)]
pub struct BusPinConfig {
    pub ctl_in: u8,
    pub ctl_out: u8,
    pub per_in: u8,
    pub per_out: u8,
}

impl IntoIterator for BusPinConfig {
    type Item = u8;
    type IntoIter = core::array::IntoIter<u8, 4>;

    fn into_iter(self) -> Self::IntoIter {
        [self.ctl_in, self.ctl_out, self.per_in, self.per_out].into_iter()
    }
}

/// Default pin configuration
impl Default for PinConfig {
    fn default() -> Self {
        config::standard_v0_1()
    }
}

/// Object which provides methods to create objects that require GPIO pins.
pub struct Gpio {
    pins: [Option<AnyPin>; 30],
    config: PinConfig,
}

impl Gpio {
    // Create a new instance of the Gpio object and create the GPIO static.
    // PIN_0 and PIN_1 belong to the console, so the array slots for them
    // stay empty.
    #[allow(clippy::too_many_arguments)]
    pub async fn create_static(
        pin2: PIN_2,
        pin3: PIN_3,
        pin4: PIN_4,
        pin5: PIN_5,
        pin6: PIN_6,
        pin7: PIN_7,
        pin8: PIN_8,
        pin9: PIN_9,
        pin10: PIN_10,
        pin11: PIN_11,
        pin12: PIN_12,
        pin13: PIN_13,
        pin14: PIN_14,
        pin15: PIN_15,
        pin16: PIN_16,
        pin17: PIN_17,
        pin18: PIN_18,
        pin19: PIN_19,
        pin20: PIN_20,
        pin21: PIN_21,
        pin22: PIN_22,
        pin23: PIN_23,
        pin24: PIN_24,
        pin25: PIN_25,
        pin26: PIN_26,
        pin27: PIN_27,
        pin28: PIN_28,
        pin29: PIN_29,
        config: Option<PinConfig>,
    ) {
        let config = config.unwrap_or_default();

        // Convert all pins to AnyPin and place in array
        let pins_array = [
            None,
            None,
            Some(pin2.degrade()),
            Some(pin3.degrade()),
            Some(pin4.degrade()),
            Some(pin5.degrade()),
            Some(pin6.degrade()),
            Some(pin7.degrade()),
            Some(pin8.degrade()),
            Some(pin9.degrade()),
            Some(pin10.degrade()),
            Some(pin11.degrade()),
            Some(pin12.degrade()),
            Some(pin13.degrade()),
            Some(pin14.degrade()),
            Some(pin15.degrade()),
            Some(pin16.degrade()),
            Some(pin17.degrade()),
            Some(pin18.degrade()),
            Some(pin19.degrade()),
            Some(pin20.degrade()),
            Some(pin21.degrade()),
            Some(pin22.degrade()),
            Some(pin23.degrade()),
            Some(pin24.degrade()),
            Some(pin25.degrade()),
            Some(pin26.degrade()),
            Some(pin27.degrade()),
            Some(pin28.degrade()),
            Some(pin29.degrade()),
        ];

        let gpio = Self {
            pins: pins_array,
            config,
        };

        // Locking section
        {
            // Put the gpio object into the GPIO static.
            let mut g = GPIO.lock().await;
            if g.is_some() {
                panic!("GPIO static already set");
            }
            let _ = g.insert(gpio);
        }
    }

    /// Get the pin used for the status display.
    pub fn get_status_display_pin(&mut self) -> AnyPin {
        self.take_pin(self.config.status_display_pin as usize)
    }

    /// Creates the LoopBus object for the bus interface under test.
    pub fn create_loop_bus(&mut self) -> LoopBus {
        let pins = self.config.bus_pins.clone();

        // The downlink line pairs the controller-side output with the
        // peripheral-side receiver; the uplink line is the reverse.  Each
        // line carries its own output polarity.
        let downlink = Line::new(
            pins.per_in,
            Flex::new(self.take_pin(pins.per_in as usize)),
            pins.ctl_out,
            Flex::new(self.take_pin(pins.ctl_out as usize)),
            DOWNLINK_OUT_IDLE,
            DOWNLINK_OUT_ACTIVE,
        );
        let uplink = Line::new(
            pins.ctl_in,
            Flex::new(self.take_pin(pins.ctl_in as usize)),
            pins.per_out,
            Flex::new(self.take_pin(pins.per_out as usize)),
            UPLINK_OUT_IDLE,
            UPLINK_OUT_ACTIVE,
        );

        LoopBus::new(downlink, uplink)
    }

    /// Helper to take a pin by index
    fn take_pin(&mut self, index: usize) -> AnyPin {
        match self.pins[index].take() {
            Some(pin) => pin,
            None => {
                error!("Pin {} already taken", index);
                panic!()
            }
        }
    }
}
