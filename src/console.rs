//! This file implements the operator console on UART0.
//!
//! Output is purely informational text - instructions, measurement ranges
//! and verdict banners.  Input recognizes only y/Y/n/N; everything else is
//! consumed and ignored.  Console output is best-effort: the console is the
//! reporting channel itself, so a write failure is logged via defmt and
//! otherwise dropped.

// Copyright (c) 2025 Piers Finlayson <piers@piers.rocks>
//
// GPLv3 licensed - see https://www.gnu.org/licenses/gpl-3.0.html

#[allow(unused_imports)]
use defmt::{debug, error, info, trace, warn};
use embassy_futures::select::{Either, select};
use embassy_rp::bind_interrupts;
use embassy_rp::peripherals::{DMA_CH0, DMA_CH1, PIN_0, PIN_1, UART0};
use embassy_rp::uart::{Async, Config, InterruptHandler, Uart};
use embassy_time::Timer;

use crate::constants::{CONSOLE_BAUD, CONSOLE_POLL_TIMER};
use crate::infra::watchdog::{TaskId, WatchdogType};

bind_interrupts!(struct Irqs {
    UART0_IRQ => InterruptHandler<UART0>;
});

/// The outcome of a confirmation gate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, defmt::Format)]
pub enum Confirmation {
    /// The operator pressed y/Y.
    Affirmed,

    /// The operator pressed n/N.
    Declined,
}

/// Map a received byte to a confirmation outcome.  Anything other than
/// y/Y/n/N does not resolve the wait.
pub fn classify_key(byte: u8) -> Option<Confirmation> {
    match byte {
        b'y' | b'Y' => Some(Confirmation::Affirmed),
        b'n' | b'N' => Some(Confirmation::Declined),
        _ => None,
    }
}

/// The operator console.  Owned by the checker task - all prompts,
/// confirmations and verifier reports flow through here.
pub struct Console {
    uart: Uart<'static, UART0, Async>,
    watchdog: &'static WatchdogType,
}

impl Console {
    /// Create the console on UART0 at the fixed baud rate.
    pub fn new(
        uart: UART0,
        tx: PIN_0,
        rx: PIN_1,
        tx_dma: DMA_CH0,
        rx_dma: DMA_CH1,
        watchdog: &'static WatchdogType,
    ) -> Self {
        let mut config = Config::default();
        config.baudrate = CONSOLE_BAUD;
        let uart = Uart::new(uart, tx, rx, Irqs, tx_dma, rx_dma, config);
        Self { uart, watchdog }
    }

    // Raw best-effort write.  The console being down is not a reason to
    // stop the procedure - defmt still carries every report.
    async fn write(&mut self, s: &str) {
        if let Err(e) = self.uart.write(s.as_bytes()).await {
            warn!("Console write failed: {}", e);
        }
    }

    /// Write a single line.
    pub async fn line(&mut self, s: &str) {
        self.write(s).await;
        self.write("\r\n").await;
    }

    /// Write a line assembled from parts, avoiding any formatting buffer.
    pub async fn line_parts(&mut self, parts: &[&str]) {
        for part in parts {
            self.write(part).await;
        }
        self.write("\r\n").await;
    }

    /// Write an empty line.
    pub async fn blank_line(&mut self) {
        self.write("\r\n").await;
    }

    /// Write the separator printed between guided steps and around the
    /// verdict banner.
    pub async fn separator(&mut self) {
        self.line("------------------------------------------------------------")
            .await;
    }

    /// Block until the operator resolves a confirmation gate.
    ///
    /// There is deliberately no timeout - the operator may need minutes at
    /// the meter.  The wait polls the UART in short slices so the watchdog
    /// keeps getting fed while we sit here.
    pub async fn confirm(&mut self) -> Confirmation {
        loop {
            let byte = self.read_key().await;
            if let Some(confirmation) = classify_key(byte) {
                debug!("Operator: {}", confirmation);
                return confirmation;
            }
            trace!("Ignoring console byte 0x{:02x}", byte);
        }
    }

    // Read a single byte, feeding the watchdog every poll slice while no
    // input is pending.
    async fn read_key(&mut self) -> u8 {
        let mut buf = [0u8; 1];
        loop {
            self.watchdog.feed(&TaskId::Checker).await;
            match select(self.uart.read(&mut buf), Timer::after(CONSOLE_POLL_TIMER)).await {
                Either::First(Ok(())) => return buf[0],
                Either::First(Err(e)) => warn!("Console read failed: {}", e),
                Either::Second(()) => {}
            }
        }
    }
}
