//! This file implements the guided check sequencer.
//!
//! The sequence walks the operator through the electrical commissioning
//! checks of the bus interface: a fixed, ordered list of steps, each of
//! which optionally drives a bus output, prints measurement instructions
//! and then blocks on a y/n confirmation gate.  The first declined gate
//! latches the session verdict to FAIL and the remaining steps are
//! skipped; the verdict banner and the per-step summary are printed either
//! way.  Re-running the sequence requires a device reset.

// Copyright (c) 2025 Piers Finlayson <piers@piers.rocks>
//
// GPLv3 licensed - see https://www.gnu.org/licenses/gpl-3.0.html

use core::sync::atomic::{AtomicBool, Ordering};
#[allow(unused_imports)]
use defmt::{debug, error, info, trace, warn};
use embassy_time::Instant;
use heapless::Vec;

use crate::bus::LoopBus;
use crate::console::{Confirmation, Console};
use crate::constants::{CHECKER_WATCHDOG_TIMER, LOOP_LOG_INTERVAL};
use crate::infra::display::{DisplayType, update_status};
use crate::infra::watchdog::{TaskId, WatchdogType};
use crate::util::time::{bus as bus_time, yield_for, yield_ms};
use crate::verify;

// Static holding the latched session verdict.  Initialized true; the first
// declined gate clears it and nothing sets it again - a restart is the only
// way back.  Accessed via the helper functions below.
static CHECKS_PASSED: AtomicBool = AtomicBool::new(true);

/// Whether every gate answered so far has been affirmed.  The verifier
/// dispatch checks this before every cycle.
pub fn checks_passed() -> bool {
    CHECKS_PASSED.load(Ordering::Relaxed)
}

// Latch the session verdict to FAIL.
fn record_decline() {
    CHECKS_PASSED.store(false, Ordering::Relaxed);
}

/// What a step drives on the bus while its measurements are taken.  The
/// drive is always restored when the step's gate resolves, affirmed or not.
#[derive(Clone, Copy, PartialEq, Eq, defmt::Format)]
pub enum Actuation {
    /// No drive - the interface is measured at rest.
    None,

    /// The controller (downlink) output is held at its active, high-current
    /// level.
    Controller,

    /// The peripheral (uplink) output is held at its active level.
    Peripheral,
}

/// A single guided step: an actuation, instruction/measurement prompts and
/// one confirmation gate.
pub struct Step {
    /// Short name, used in logs and the summary table.
    pub name: &'static str,

    /// Bus drive applied before the prompts are shown.
    pub actuate: Actuation,

    /// Instruction lines shown to the operator.  These carry the expected
    /// measurement ranges - the tester has no way to read a meter itself.
    pub prompts: &'static [&'static str],

    /// The question the operator answers at the gate.
    pub question: &'static str,
}

/// Number of guided steps.
pub const NUM_STEPS: usize = 8;

/// The check sequence.  Order is significant: later steps assume the bus
/// state the earlier ones left behind (terminals apart until step 6,
/// bridged from then on).
pub const STEPS: [Step; NUM_STEPS] = [
    Step {
        name: "wiring",
        actuate: Actuation::None,
        prompts: &[
            "Disconnect the link between the controller terminals (TP3)",
            "and the peripheral terminals (TP4).",
            "The peripheral indicator LED (D2) must be unlit.",
        ],
        question: "Terminals separated and D2 unlit? (y/n)",
    },
    Step {
        name: "supply voltage",
        actuate: Actuation::None,
        prompts: &[
            "Measure between the supply test point (TP1) and ground.",
            "Expect approximately 24V.",
        ],
        question: "Supply reads ~24V? (y/n)",
    },
    Step {
        name: "idle line voltage",
        actuate: Actuation::None,
        prompts: &[
            "Measure the controller line at TP2 against ground.",
            "Expect approximately 24V with the bus at rest.",
        ],
        question: "Line reads ~24V? (y/n)",
    },
    Step {
        name: "idle line current",
        actuate: Actuation::None,
        prompts: &[
            "Switch the meter to mA and measure in series at TP2.",
            "Expect 5-9 mA quiescent current.",
            "The peripheral indicator LED (D2) must be unlit.",
        ],
        question: "Current in range and D2 unlit? (y/n)",
    },
    Step {
        name: "active-drive current",
        actuate: Actuation::Controller,
        prompts: &[
            "The controller output is now held at its high-current level.",
            "Expect 17-23 mA at TP2.",
            "The peripheral indicator LED (D2) must remain unlit.",
        ],
        question: "Current in range and D2 unlit? (y/n)",
    },
    Step {
        name: "cross-connect voltage",
        actuate: Actuation::None,
        prompts: &[
            "Reconnect the link between the controller terminals (TP3)",
            "and the peripheral terminals (TP4).",
            "Measure across the bridge at TP3/TP4.",
            "Expect 15-18V.",
        ],
        question: "Bridge reads 15-18V? (y/n)",
    },
    Step {
        name: "controller-to-peripheral signal",
        actuate: Actuation::Controller,
        prompts: &[
            "The controller output is now driven active.",
            "The peripheral indicator LED (D2) must light.",
        ],
        question: "D2 lit? (y/n)",
    },
    Step {
        name: "peripheral-to-controller signal",
        actuate: Actuation::Peripheral,
        prompts: &[
            "The peripheral output is now driven active.",
            "The controller indicator LED (D1) must extinguish.",
            "Expect the bridge voltage at TP3/TP4 to drop to 5-7V.",
        ],
        question: "D1 out and bridge at 5-7V? (y/n)",
    },
];

/// How a guided step ended up in the summary table.
#[derive(Clone, Copy, PartialEq, Eq, defmt::Format)]
pub enum StepResult {
    Passed,
    Failed,
    Skipped,
}

impl StepResult {
    pub fn label(&self) -> &'static str {
        match self {
            StepResult::Passed => "passed",
            StepResult::Failed => "FAILED",
            StepResult::Skipped => "skipped",
        }
    }
}

// A recorded outcome for the summary table.
struct StepOutcome {
    name: &'static str,
    result: StepResult,
}

/// Fold one step's gate answer into a summary result.  `None` means the
/// step never ran because an earlier gate was declined.
pub fn step_result(answer: Option<Confirmation>) -> StepResult {
    match answer {
        Some(Confirmation::Affirmed) => StepResult::Passed,
        Some(Confirmation::Declined) => StepResult::Failed,
        None => StepResult::Skipped,
    }
}

// Apply a step's actuation.
fn apply(bus: &mut LoopBus, actuation: Actuation) {
    match actuation {
        Actuation::None => {}
        Actuation::Controller => bus.set_downlink(),
        Actuation::Peripheral => bus.set_uplink(),
    }
}

// Undo a step's actuation.  Called whatever the gate answered, so a
// declined session never leaves the bus driven.
fn restore(bus: &mut LoopBus, actuation: Actuation) {
    match actuation {
        Actuation::None => {}
        Actuation::Controller => bus.release_downlink(),
        Actuation::Peripheral => bus.release_uplink(),
    }
}

// Run a single step and return the gate's answer.  Actuation is applied
// before the prompts and restored unconditionally after the gate.
async fn run_step(console: &mut Console, bus: &mut LoopBus, step: &Step) -> Confirmation {
    console.separator().await;
    console.line_parts(&["Step: ", step.name]).await;
    info!("Guided step: {}", step.name);

    apply(bus, step.actuate);
    if step.actuate != Actuation::None {
        // Let the operator measure a settled line.
        yield_for!(bus_time::SETTLE);
    }

    for prompt in step.prompts {
        console.line(prompt).await;
    }
    console.line(step.question).await;

    update_status(DisplayType::AwaitingOperator);
    let confirmation = console.confirm().await;
    update_status(DisplayType::Init);

    restore(bus, step.actuate);
    if step.actuate != Actuation::None {
        yield_ms!(bus_time::RESTORE_GAP_MS);
    }

    match confirmation {
        Confirmation::Affirmed => console.line("-> confirmed").await,
        Confirmation::Declined => {
            console
                .line("-> declined - the session is marked FAILED")
                .await;
        }
    }

    confirmation
}

// Run the whole guided sequence once, latch the verdict, print the banner
// and the summary.
async fn run_guided_checks(console: &mut Console, bus: &mut LoopBus) {
    console.blank_line().await;
    console
        .line("Two-wire bus interface commissioning check")
        .await;
    console
        .line("Answer each gate with y (pass, continue) or n (fail the session).")
        .await;

    let mut outcomes: Vec<StepOutcome, NUM_STEPS> = Vec::new();

    for step in &STEPS {
        // A declined gate skips everything downstream - no prompts, no
        // actuation, no gate.
        let answer = if checks_passed() {
            Some(run_step(console, bus, step).await)
        } else {
            None
        };

        let result = step_result(answer);
        if result == StepResult::Failed {
            record_decline();
        }

        // Capacity matches the step table, so this cannot fail.
        let _ = outcomes.push(StepOutcome {
            name: step.name,
            result,
        });
    }

    console.separator().await;
    if checks_passed() {
        info!("Guided checks: PASS");
        console.line("CHECK RESULT: PASS").await;
    } else {
        info!("Guided checks: FAIL");
        console
            .line("CHECK RESULT: FAIL - restart the tester to run the checks again")
            .await;
    }
    for outcome in &outcomes {
        console
            .line_parts(&["  ", outcome.name, ": ", outcome.result.label()])
            .await;
    }
    console.separator().await;
}

/// The checker task: runs the guided sequence once, then hands over to the
/// verifier dispatch loop for the rest of the session.
#[embassy_executor::task]
pub async fn checker_task(
    watchdog: &'static WatchdogType,
    mut console: Console,
    mut bus: LoopBus,
) -> ! {
    // Register with the watchdog
    let id = TaskId::Checker;
    watchdog.register_task(&id, CHECKER_WATCHDOG_TIMER).await;

    run_guided_checks(&mut console, &mut bus).await;

    if checks_passed() {
        update_status(DisplayType::Verifying);
        console
            .line("Entering continuous line verification.")
            .await;
    } else {
        update_status(DisplayType::Failed);
        console
            .line("Line verification disabled - restart the tester to re-run the checks.")
            .await;
    }

    // The dispatch loop re-checks the latched verdict before every cycle.
    // Nothing can set it true again without a restart, but keeping the gate
    // here keeps the verifier itself unconditional.
    let mut next_log_instant = Instant::now();
    loop {
        let now = Instant::now();
        if now >= next_log_instant {
            trace!("Verifier dispatch loop");
            next_log_instant += LOOP_LOG_INTERVAL;
        }

        // Feed the watchdog
        watchdog.feed(&id).await;

        if checks_passed() {
            verify::run_cycle(&mut console, &mut bus).await;
        }

        yield_for!(bus_time::CYCLE_GAP);
    }
}
