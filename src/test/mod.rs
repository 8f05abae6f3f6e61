//! Various test objects for buscheck hardware bring-up.
//!
//! These are used by the binaries under `hw_tests/`, which exercise a bare
//! tester board (no interface under test fitted) or the pure decision
//! logic, without the guided procedure in the way.

// Copyright (c) 2025 Piers Finlayson <piers@piers.rocks>
//
// GPLv3 licensed - see https://www.gnu.org/licenses/gpl-3.0.html

use defmt::assert_eq;
use embassy_rp::Peripherals;
use embassy_rp::gpio::{AnyPin, Drive, Input, Level, Output, Pin, Pull};

use crate::constants::{
    DOWNLINK_OUT_ACTIVE, DOWNLINK_OUT_IDLE, UPLINK_OUT_ACTIVE, UPLINK_OUT_IDLE,
};

/// Bus pin numbers, mirrored from the v0.1 config in `infra/gpio.rs`.  The
/// create functions assert the two stay in step.
pub struct BusPins {
    pub ctl_in: u8,
    pub ctl_out: u8,
    pub per_in: u8,
    pub per_out: u8,
}

pub const BUS_PINS: BusPins = BusPins {
    ctl_in: 2,
    ctl_out: 3,
    per_in: 4,
    per_out: 5,
};

/// An output pin that knows its line's idle and active levels, so test
/// binaries drive the same polarities as the firmware proper.
pub struct OutputPin {
    pub name: &'static str,
    pub num: u8,
    idle: Level,
    active: Level,
    pin: Output<'static>,
}

impl OutputPin {
    #[must_use]
    pub fn new(name: &'static str, pin: AnyPin, idle: Level, active: Level) -> Self {
        let num = pin.pin();
        let mut output = Output::new(pin, idle);
        output.set_drive_strength(Drive::_12mA);
        OutputPin {
            name,
            num,
            idle,
            active,
            pin: output,
        }
    }

    pub fn set_idle(&mut self) {
        self.pin.set_level(self.idle);
    }

    pub fn set_active(&mut self) {
        self.pin.set_level(self.active);
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        let level = if self.pin.is_set_high() {
            Level::High
        } else {
            Level::Low
        };
        level == self.active
    }
}

/// An input pin that remembers its last sampled level, for edge logging.
pub struct InputPin {
    pub name: &'static str,
    pub num: u8,
    pin: Input<'static>,
    last_level: Level,
}

impl InputPin {
    #[must_use]
    pub fn new(name: &'static str, pin: AnyPin, pull: Pull) -> Self {
        let num = pin.pin();
        let input = Input::new(pin, pull);
        let last_level = input.get_level();
        InputPin {
            name,
            num,
            pin: input,
            last_level,
        }
    }

    pub fn has_changed(&mut self) -> bool {
        let level = self.pin.get_level();
        if level == self.last_level {
            false
        } else {
            self.last_level = level;
            true
        }
    }

    #[must_use]
    pub fn get_level(&self) -> Level {
        self.last_level
    }
}

const NUM_LINE_PINS: usize = 2;

/// Create the bus pins as plain inputs and/or outputs.  Inputs use the same
/// pull-ups as the firmware, so an unwired pin reads as rest; outputs start
/// at their line's idle level.
#[must_use]
pub fn create_pins(
    p: Peripherals,
    input: bool,
    output: bool,
) -> (
    Option<[InputPin; NUM_LINE_PINS]>,
    Option<[OutputPin; NUM_LINE_PINS]>,
) {
    let output_pins = if output {
        let ctl_out = OutputPin::new(
            "ctl_out",
            p.PIN_3.into(),
            DOWNLINK_OUT_IDLE,
            DOWNLINK_OUT_ACTIVE,
        );
        assert_eq!(ctl_out.num, BUS_PINS.ctl_out);
        let per_out = OutputPin::new(
            "per_out",
            p.PIN_5.into(),
            UPLINK_OUT_IDLE,
            UPLINK_OUT_ACTIVE,
        );
        assert_eq!(per_out.num, BUS_PINS.per_out);

        Some([ctl_out, per_out])
    } else {
        None
    };

    let input_pins = if input {
        let ctl_in = InputPin::new("ctl_in", p.PIN_2.into(), Pull::Up);
        assert_eq!(ctl_in.num, BUS_PINS.ctl_in);
        let per_in = InputPin::new("per_in", p.PIN_4.into(), Pull::Up);
        assert_eq!(per_in.num, BUS_PINS.per_in);

        Some([ctl_in, per_in])
    } else {
        None
    };

    (input_pins, output_pins)
}
