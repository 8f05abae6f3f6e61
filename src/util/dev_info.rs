//! Reads the board's unique identity, reported on the console banner and in
//! the defmt boot log so a bench full of testers can be told apart.

// Copyright (c) 2025 Piers Finlayson <piers@piers.rocks>
//
// GPLv3 licensed - see https://www.gnu.org/licenses/gpl-3.0.html

use core::fmt::Write;

use embassy_rp::flash::Async;
use embassy_rp::peripherals::{DMA_CH2, FLASH};

use crate::constants::MAX_SERIAL_STRING_LEN;

/// Read the unique Pico ID from the flash device and format it as a hex
/// string into `serial`.
///
/// If reading the unique flash ID fails, the serial number will be all
/// zeroes.
pub fn get_serial(
    flash: &mut FLASH,
    dma: &mut DMA_CH2,
    serial: &mut heapless::String<MAX_SERIAL_STRING_LEN>,
) {
    // Clear any previous content
    serial.clear();

    // Get the Pico serial number
    const FLASH_SIZE: usize = 2 * 1024 * 1024;
    let mut byte_buf = [0u8; 16];
    let mut flash = embassy_rp::flash::Flash::<_, Async, FLASH_SIZE>::new(flash, dma);
    let _ = flash.blocking_unique_id(&mut byte_buf);

    // Format only the last bytes that fit the string as hex.
    let keep = MAX_SERIAL_STRING_LEN / 2;
    let bytes_to_format = if byte_buf.len() > keep {
        &byte_buf[byte_buf.len() - keep..]
    } else {
        &byte_buf[..]
    };

    for b in bytes_to_format {
        // A full buffer just truncates the serial - not worth failing over.
        if write!(serial, "{b:02x}").is_err() {
            break;
        }
    }
}
