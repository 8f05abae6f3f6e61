//! This file implements the bidirectional line verifier.
//!
//! Each cycle checks both signaling directions independently.  A direction
//! check has two phases: with everything released, both receivers must read
//! rest; with the direction's sender driven active, exactly the receiving
//! side must follow while the sender's own receiver stays at rest.  Every
//! check ends with both outputs released, whatever the outcome.
//!
//! Failures are observational - they are reported on the console and via
//! defmt, and the next cycle simply tries again.

// Copyright (c) 2025 Piers Finlayson <piers@piers.rocks>
//
// GPLv3 licensed - see https://www.gnu.org/licenses/gpl-3.0.html

#[allow(unused_imports)]
use defmt::{debug, error, info, trace, warn};

use crate::bus::{LineLevels, LoopBus};
use crate::console::Console;
use crate::util::time::{bus as bus_time, yield_for};

/// One of the two signaling paths checked per cycle.
#[derive(Clone, Copy, PartialEq, Eq, defmt::Format)]
pub enum Direction {
    ControllerToPeripheral,
    PeripheralToController,
}

impl Direction {
    /// Both directions, in the order they are checked each cycle.
    pub const ALL: [Direction; 2] = [
        Direction::ControllerToPeripheral,
        Direction::PeripheralToController,
    ];

    /// Console name for this direction.
    pub fn name(&self) -> &'static str {
        match self {
            Direction::ControllerToPeripheral => "controller -> peripheral",
            Direction::PeripheralToController => "peripheral -> controller",
        }
    }

    /// The snapshot bit the receiving side's input raises when this
    /// direction's sender is asserting.
    fn receiver_bit(&self) -> LineLevels {
        match self {
            Direction::ControllerToPeripheral => LineLevels::DOWNLINK,
            Direction::PeripheralToController => LineLevels::UPLINK,
        }
    }

    /// The snapshot bit of the sender's own receiver - the line that must
    /// stay at rest while this direction is driven.
    fn loopback_bit(&self) -> LineLevels {
        match self {
            Direction::ControllerToPeripheral => LineLevels::UPLINK,
            Direction::PeripheralToController => LineLevels::DOWNLINK,
        }
    }
}

/// Why a direction check failed.
///
/// The causes are illustrative rather than diagnostic: from two input bits
/// alone the tester mostly cannot tell which side of the interface is at
/// fault, only which expectation the snapshot broke.
#[derive(Clone, Copy, PartialEq, Eq, defmt::Format)]
pub enum LineFault {
    /// A receiver read active before anything was driven.
    IdleAsserted,

    /// The receiving side did not register the active drive.
    NoSignal,

    /// The sender's own receiver went active while driving - the two lines
    /// are not isolated from each other.
    LoopbackEcho,
}

impl LineFault {
    /// The console text for this fault.
    pub fn describe(&self) -> &'static str {
        match self {
            LineFault::IdleAsserted => "line asserted with no signal sent",
            LineFault::NoSignal => {
                "no signal received (receiver not registering or sender not asserting)"
            }
            LineFault::LoopbackEcho => "sender-side line went active (loopback isolation broken)",
        }
    }
}

/// Judge the idle phase: with both outputs released, both receivers must
/// read rest.
pub fn judge_idle(levels: LineLevels) -> Result<(), LineFault> {
    if levels.is_empty() {
        Ok(())
    } else {
        Err(LineFault::IdleAsserted)
    }
}

/// Judge the active phase for a direction: the receiving side must have
/// followed the drive, the sender's own receiver must not have.
///
/// When the receiver hasn't registered, the observed bits cannot say
/// whether the sender failed to assert or the receiver failed to see it,
/// so a single combined cause covers both.
pub fn judge_active(direction: Direction, levels: LineLevels) -> Result<(), LineFault> {
    if !levels.contains(direction.receiver_bit()) {
        return Err(LineFault::NoSignal);
    }
    if levels.contains(direction.loopback_bit()) {
        return Err(LineFault::LoopbackEcho);
    }
    Ok(())
}

// Drive the sender output for a direction.
fn drive(bus: &mut LoopBus, direction: Direction) {
    match direction {
        Direction::ControllerToPeripheral => bus.set_downlink(),
        Direction::PeripheralToController => bus.set_uplink(),
    }
}

// Check a single direction.  Both outputs are released on the way in and,
// unconditionally, on the way out.
async fn check_direction(bus: &mut LoopBus, direction: Direction) -> Result<(), LineFault> {
    // Phase 1: everything released; both receivers must read rest.
    bus.release_all();
    yield_for!(bus_time::SETTLE);
    let idle = bus.poll_lines();
    trace!("Verify {}: idle snapshot: {}", direction, idle);

    let result = match judge_idle(idle) {
        Ok(()) => {
            // Phase 2: drive this direction's sender; exactly the receiving
            // side must follow.
            drive(bus, direction);
            yield_for!(bus_time::SETTLE);
            let active = bus.poll_lines();
            trace!("Verify {}: active snapshot: {}", direction, active);
            judge_active(direction, active)
        }
        // A stuck line fails the direction outright - driving on top of it
        // would only confuse the diagnosis.
        Err(fault) => Err(fault),
    };

    // However the check went, the cycle ends with the bus at rest.
    bus.release_all();
    result
}

// Report one direction's outcome on the console and via defmt.
async fn report(console: &mut Console, direction: Direction, result: Result<(), LineFault>) {
    match result {
        Ok(()) => {
            debug!("Verify {}: OK", direction);
            console.line_parts(&[direction.name(), ": OK"]).await;
        }
        Err(fault) => {
            warn!("Verify {}: FAILED: {}", direction, fault);
            console
                .line_parts(&[direction.name(), ": FAILED - ", fault.describe()])
                .await;
        }
    }
}

/// Run one verification cycle: both directions, one report each.  The
/// caller owns the pacing between cycles.
pub async fn run_cycle(console: &mut Console, bus: &mut LoopBus) {
    for direction in Direction::ALL {
        let result = check_direction(bus, direction).await;
        report(console, direction, result).await;
    }
}
