//! test_selftest
//!
//! Runs the pure decision logic of the firmware on the target and asserts
//! the properties the guided procedure relies on: key classification for
//! the confirmation gate, the verifier's idle and active judgements, and
//! the shape of the guided step table.  Needs no wiring - a bare board is
//! enough.  A failed assert panics via panic-probe; success logs ALL TESTS
//! PASSED and parks.

// Copyright (c) 2025 Piers Finlayson <piers@piers.rocks>
//
// GPLv3 licensed - see https://www.gnu.org/licenses/gpl-3.0.html

#![no_std]
#![no_main]

use buscheck_rs::bus::LineLevels;
use buscheck_rs::check::{Actuation, NUM_STEPS, STEPS, StepResult, step_result};
use buscheck_rs::console::{Confirmation, classify_key};
use buscheck_rs::verify::{Direction, LineFault, judge_active, judge_idle};
use defmt::{assert, assert_eq, info};
use embassy_executor::Spawner;
use embassy_time::Timer;
use {defmt_rtt as _, panic_probe as _};

#[embassy_executor::main]
async fn main(_spawner: Spawner) -> ! {
    info!("buscheck logic selftest");

    // Init the HAL even though no pins are used, so the clocks and the
    // time driver are up.
    let _p = embassy_rp::init(Default::default());

    test_classify_key();
    test_judge_idle();
    test_judge_active();
    test_step_table();
    test_session_fold();

    info!("ALL TESTS PASSED");
    loop {
        Timer::after_secs(60).await;
    }
}

// The confirmation gate resolves on exactly y/Y/n/N and nothing else, so a
// stream of other bytes followed by a recognized one always resolves to
// that one.
fn test_classify_key() {
    assert_eq!(classify_key(b'y'), Some(Confirmation::Affirmed));
    assert_eq!(classify_key(b'Y'), Some(Confirmation::Affirmed));
    assert_eq!(classify_key(b'n'), Some(Confirmation::Declined));
    assert_eq!(classify_key(b'N'), Some(Confirmation::Declined));

    // Bytes an operator is likely to hit by accident.
    for byte in [b' ', b'\r', b'\n', b'\t', b'x', b'0', 0x1b, 0x7f] {
        assert_eq!(classify_key(byte), None);
    }

    // Exhaustive: only the four recognized bytes resolve the wait.
    let mut recognized = 0;
    for byte in 0..=255u8 {
        if classify_key(byte).is_some() {
            recognized += 1;
        }
    }
    assert_eq!(recognized, 4);

    info!("classify_key: ok");
}

// With nothing driven, any active receiver is a fault.
fn test_judge_idle() {
    assert!(judge_idle(LineLevels::empty()).is_ok());
    assert_eq!(
        judge_idle(LineLevels::DOWNLINK),
        Err(LineFault::IdleAsserted)
    );
    assert_eq!(judge_idle(LineLevels::UPLINK), Err(LineFault::IdleAsserted));
    assert_eq!(judge_idle(LineLevels::all()), Err(LineFault::IdleAsserted));

    info!("judge_idle: ok");
}

// With one sender driven, exactly the receiving side must follow.
fn test_judge_active() {
    // controller -> peripheral: the peripheral-side receiver follows, the
    // controller-side receiver stays at rest.
    let c2p = Direction::ControllerToPeripheral;
    assert!(judge_active(c2p, LineLevels::DOWNLINK).is_ok());
    assert_eq!(judge_active(c2p, LineLevels::empty()), Err(LineFault::NoSignal));
    assert_eq!(judge_active(c2p, LineLevels::UPLINK), Err(LineFault::NoSignal));
    assert_eq!(judge_active(c2p, LineLevels::all()), Err(LineFault::LoopbackEcho));

    // And mirrored for peripheral -> controller.
    let p2c = Direction::PeripheralToController;
    assert!(judge_active(p2c, LineLevels::UPLINK).is_ok());
    assert_eq!(judge_active(p2c, LineLevels::empty()), Err(LineFault::NoSignal));
    assert_eq!(judge_active(p2c, LineLevels::DOWNLINK), Err(LineFault::NoSignal));
    assert_eq!(judge_active(p2c, LineLevels::all()), Err(LineFault::LoopbackEcho));

    info!("judge_active: ok");
}

// The guided sequence is fixed: eight steps, each with instructions and a
// gate, and exactly three of them drive the bus - the high-current check
// and one signal check per direction, in that order.
fn test_step_table() {
    assert_eq!(STEPS.len(), NUM_STEPS);

    for step in &STEPS {
        assert!(!step.name.is_empty());
        assert!(!step.prompts.is_empty());
        assert!(!step.question.is_empty());
    }

    let mut driven = [Actuation::None; NUM_STEPS];
    let mut count = 0;
    for step in &STEPS {
        if step.actuate != Actuation::None {
            driven[count] = step.actuate;
            count += 1;
        }
    }
    assert_eq!(count, 3);
    assert_eq!(driven[0], Actuation::Controller);
    assert_eq!(driven[1], Actuation::Controller);
    assert_eq!(driven[2], Actuation::Peripheral);

    info!("step table: ok");
}

// An affirmed gate passes the step, a declined gate fails it, and a step
// that never ran (because an earlier gate was declined) reports skipped.
// A session where every gate is affirmed therefore ends with every step
// passed, and a decline at step N leaves steps N+1.. skipped.
fn test_session_fold() {
    assert_eq!(
        step_result(Some(Confirmation::Affirmed)),
        StepResult::Passed
    );
    assert_eq!(
        step_result(Some(Confirmation::Declined)),
        StepResult::Failed
    );
    assert_eq!(step_result(None), StepResult::Skipped);

    // Simulate a session declined at the third gate: every step after it
    // sees no answer at all.
    let mut passing = true;
    let mut results = [StepResult::Skipped; NUM_STEPS];
    for (index, result) in results.iter_mut().enumerate() {
        let answer = if passing {
            Some(if index == 2 {
                Confirmation::Declined
            } else {
                Confirmation::Affirmed
            })
        } else {
            None
        };
        *result = step_result(answer);
        if *result == StepResult::Failed {
            passing = false;
        }
    }
    assert_eq!(results[0], StepResult::Passed);
    assert_eq!(results[1], StepResult::Passed);
    assert_eq!(results[2], StepResult::Failed);
    for result in &results[3..] {
        assert_eq!(*result, StepResult::Skipped);
    }
    assert!(!passing);

    info!("session fold: ok");
}
