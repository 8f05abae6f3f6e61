//! This file implements the driver for the four GPIO lines of the bus
//! interface under test.
//!
//! The tester sits between the two halves of a two-wire field bus interface
//! board.  The downlink line carries controller-to-peripheral signaling and
//! pairs the controller-side output pin with the peripheral-side input pin;
//! the uplink line is the reverse.  Each input samples the line behind the
//! interface's receiver stage, so a line is only seen active here if the
//! signal made it through the hardware under test.

// Copyright (c) 2025 Piers Finlayson <piers@piers.rocks>
//
// GPLv3 licensed - see https://www.gnu.org/licenses/gpl-3.0.html

use bitflags::bitflags;
#[allow(unused_imports)]
use defmt::{debug, error, info, trace, warn};
use embassy_rp::gpio::{Flex, Level, Pull};

use crate::util::time::{block_us, pin_delay};

bitflags! {
    /// A snapshot of which line inputs currently read active.  An empty set
    /// means both lines are at rest.
    #[derive(Clone, Copy, PartialEq, Eq)]
    pub struct LineLevels: u8 {
        const DOWNLINK = 0x01;
        const UPLINK = 0x02;
    }
}

impl defmt::Format for LineLevels {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(
            f,
            "downlink {}, uplink {}",
            if self.contains(Self::DOWNLINK) { "active" } else { "rest" },
            if self.contains(Self::UPLINK) { "active" } else { "rest" },
        );
    }
}

/// Represents a single bus line using separate input and output pins.
///
/// The receiver inputs idle high (pull-up) and read low when the line is
/// active.  The output polarity differs per line - see the `*_OUT_IDLE` /
/// `*_OUT_ACTIVE` constants - so each Line carries its own idle and active
/// levels rather than assuming an inversion.
pub struct Line {
    input_pin_num: u8,
    input: Flex<'static>,
    output_pin_num: u8,
    output: Flex<'static>,
    idle: Level,
    active: Level,
}

impl Line {
    /// Create a new Line with the specified input and output pins and the
    /// output's idle/active levels.  The output is parked at its idle level.
    pub fn new(
        input_pin_num: u8,
        input_pin: Flex<'static>,
        output_pin_num: u8,
        output_pin: Flex<'static>,
        idle: Level,
        active: Level,
    ) -> Self {
        // Initialize the input pin as an input with pull-up, so an undriven
        // line reads as rest.
        let mut input = input_pin;
        input.set_as_input();
        input.set_pull(Pull::Up);

        // Initialize the output pin as an output at the line's idle level.
        let mut output = output_pin;
        output.set_as_output();
        output.set_level(idle);

        Self {
            input_pin_num,
            input,
            output_pin_num,
            output,
            idle,
            active,
        }
    }

    /// Drive the output to the line's active level.
    pub fn set(&mut self) {
        self.output.set_level(self.active);
        // Give the driver stage a moment to slew before anything samples.
        pin_delay!();
    }

    /// Return the output to the line's idle level.
    pub fn release(&mut self) {
        self.output.set_level(self.idle);
        pin_delay!();
    }

    /// Read the current state of the line's receiver.  Returns true if the
    /// line reads active - the receiver idles high, so active means low.
    pub fn get(&self) -> bool {
        self.input.is_low()
    }

    /// Check whether this side is currently driving the line active.
    #[allow(dead_code)]
    pub fn is_set(&self) -> bool {
        let level = if self.output.is_set_high() {
            Level::High
        } else {
            Level::Low
        };
        level == self.active
    }

    /// Input pin number, for logging.
    pub fn input_pin_num(&self) -> u8 {
        self.input_pin_num
    }

    /// Output pin number, for logging.
    pub fn output_pin_num(&self) -> u8 {
        self.output_pin_num
    }
}

/// An object representing the bus interface under test.  Each Line is a pair
/// of pins, one input and one output.  Pin assignments are in
/// `infra/gpio.rs`; polarities are in `constants.rs`.
pub struct LoopBus {
    downlink: Line,
    uplink: Line,
}

impl LoopBus {
    /// Create a new bus from its two lines.  Both outputs are released so
    /// the interface starts from rest.
    pub fn new(downlink: Line, uplink: Line) -> Self {
        let mut bus = Self { downlink, uplink };
        bus.release_all();

        debug!(
            "LoopBus: downlink out pin {} -> in pin {}, uplink out pin {} -> in pin {}",
            bus.downlink.output_pin_num(),
            bus.downlink.input_pin_num(),
            bus.uplink.output_pin_num(),
            bus.uplink.input_pin_num(),
        );

        bus
    }

    // Downlink (controller output, peripheral-side receiver) control.
    pub fn set_downlink(&mut self) {
        self.downlink.set();
    }

    pub fn release_downlink(&mut self) {
        self.downlink.release();
    }

    /// True if the peripheral-side receiver sees the downlink active.
    pub fn get_downlink(&self) -> bool {
        self.downlink.get()
    }

    // Uplink (peripheral output, controller-side receiver) control.
    pub fn set_uplink(&mut self) {
        self.uplink.set();
    }

    pub fn release_uplink(&mut self) {
        self.uplink.release();
    }

    /// True if the controller-side receiver sees the uplink active.
    pub fn get_uplink(&self) -> bool {
        self.uplink.get()
    }

    /// Return both outputs to their idle levels.
    pub fn release_all(&mut self) {
        self.release_downlink();
        self.release_uplink();
    }

    /// Sample both receivers at once.
    pub fn poll_lines(&self) -> LineLevels {
        let mut levels = LineLevels::empty();
        if self.get_downlink() {
            levels |= LineLevels::DOWNLINK;
        }
        if self.get_uplink() {
            levels |= LineLevels::UPLINK;
        }
        levels
    }
}
