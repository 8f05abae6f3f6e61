//! buscheck
//!
//! This implements a bench tester for two-wire field bus interface boards.
//! At power-on it walks the operator through the electrical commissioning
//! checks over a serial console; once every check is confirmed it exercises
//! the bus continuously in both directions, reporting per-direction
//! OK/FAILED results until the device is reset.

// Copyright (c) 2025 Piers Finlayson <piers@piers.rocks>
//
// GPLv3 licensed - see https://www.gnu.org/licenses/gpl-3.0.html

#![no_std]
#![no_main]

// Provide some feature guidance when compiling the library.
#[cfg(not(any(feature = "pico", feature = "pico2")))]
compile_error!("Either 'pico' or 'pico2' feature must be enabled");
#[cfg(all(feature = "pico", feature = "pico2"))]
compile_error!("Features 'pico' and 'pico2' cannot be enabled simultaneously");

// Declare all of this library's modules.  The bus, check, console and
// verify modules are public so the hw_tests binaries can exercise them.
pub mod bus;
pub mod check;
pub mod console;
pub mod constants;
pub mod entry;
pub mod infra;
pub mod test;
pub(crate) mod util;
pub mod verify;

// Extra binary information that picotool can read.
#[unsafe(link_section = ".bi_entries")]
#[used]
pub static PICOTOOL_ENTRIES: [embassy_rp::binary_info::EntryAddr; 4] = [
    embassy_rp::binary_info::rp_program_name!(c"buscheck by piers.rocks"),
    embassy_rp::binary_info::rp_program_description!(c"A Pico-based commissioning tester for two-wire field bus interface boards: guides the operator through the electrical checks, then continuously verifies signal integrity in both directions."),
    embassy_rp::binary_info::rp_cargo_version!(),
    embassy_rp::binary_info::rp_program_build_attribute!(),
];

// A note about Statics
//
// Statics are used to avoid lifetime issues when spawning tasks and when
// splitting the code into modules.  The guidance followed here:
//
// - StaticCell for statics that cannot be initialized at compile time
//   (the watchdog).
// - A blocking Mutex + RefCell for shared mutable objects driven from
//   multiple tasks (the status display), using CriticalSectionRawMutex.
// - An async Mutex for objects handed out during startup (the Gpio
//   allocator).
// - A plain AtomicBool for the latched session verdict.
//
// Each static lives in the module that creates it.
