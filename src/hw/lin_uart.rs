// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! USART1 in LIN mode, the board end of [`crate::hw::LinPort`].
//!
//! [`LinUart`] drives the transmitter. [`LinRxIrq`] belongs in the USART1 interrupt handler and
//! moves every received byte, break and error into the port's receive queue. Break detection uses
//! the 11-bit LBD threshold.
//!
//! Wiring: PA9 TX (alternate push-pull), PA10 RX (floating input).

use stm32f1xx_hal::pac;

use crate::hw::lin_port::{Error, LinTransmit, RxEvent, RxFeed};

/// Spin limit for TXE/SBK while sending. Far above one byte time at 2400 baud and 72 MHz.
const SPIN_LIMIT: u32 = 100_000;

pub struct LinUart {
    usart: pac::USART1,
    pclk2_hz: u32,
}

impl LinUart {
    /// Clock USART1. Pins must already be in their alternate modes.
    pub fn new(usart: pac::USART1, pclk2_hz: u32) -> Self {
        let rcc = unsafe { &*pac::RCC::ptr() };
        rcc.apb2enr.modify(|_, w| w.usart1en().set_bit());

        Self { usart, pclk2_hz }
    }

    fn wait<F: Fn(&pac::usart1::RegisterBlock) -> bool>(&self, ready: F) -> Result<(), Error> {
        for _ in 0..SPIN_LIMIT {
            if ready(&self.usart) {
                return Ok(());
            }
        }
        Err(Error::Timeout)
    }
}

impl LinTransmit for LinUart {
    fn enable(&mut self, baudrate: u32) {
        let brr = (self.pclk2_hz + baudrate / 2) / baudrate.max(1);
        let u = &self.usart;
        u.cr1.reset();
        u.brr.write(|w| unsafe { w.bits(brr) });
        // LIN mode requires CLKEN, STOP, SCEN, HDSEL and IREN cleared; reset values do that.
        u.cr2
            .write(|w| w.linen().set_bit().lbdl().set_bit().lbdie().set_bit());
        u.cr3.reset();
        u.cr1.write(|w| {
            w.ue()
                .set_bit()
                .te()
                .set_bit()
                .re()
                .set_bit()
                .rxneie()
                .set_bit()
        });
    }

    fn send_break(&mut self) -> Result<(), Error> {
        self.wait(|u| u.sr.read().txe().bit_is_set())?;
        self.usart.cr1.modify(|_, w| w.sbk().set_bit());
        self.wait(|u| u.cr1.read().sbk().bit_is_clear())
    }

    fn write(&mut self, byte: u8) -> Result<(), Error> {
        self.wait(|u| u.sr.read().txe().bit_is_set())?;
        self.usart.dr.write(|w| unsafe { w.dr().bits(byte as u16) });
        Ok(())
    }
}

/// Receive half, owned by the USART1 interrupt handler.
pub struct LinRxIrq {
    feed: RxFeed<'static>,
}

impl LinRxIrq {
    pub fn new(feed: RxFeed<'static>) -> Self {
        Self { feed }
    }

    /// Drain the receiver. Call on every USART1 interrupt.
    pub fn on_interrupt(&mut self) {
        // Status reads and the LBD write-0-to-clear only; TX registers belong to `LinUart`.
        let usart = unsafe { &*pac::USART1::ptr() };
        let sr = usart.sr.read();

        if sr.lbd().bit_is_set() {
            usart.sr.modify(|_, w| w.lbd().clear_bit());
            self.feed.push(RxEvent::Break);
        }
        if sr.rxne().bit_is_clear() && sr.ore().bit_is_clear() {
            return;
        }

        // Reading DR after SR clears RXNE and the error flags.
        let byte = usart.dr.read().dr().bits() as u8;
        if sr.ore().bit_is_set() {
            self.feed.push(RxEvent::Overrun);
        }
        self.feed.push(if sr.fe().bit_is_set() {
            RxEvent::Framing(byte)
        } else {
            RxEvent::Data(byte)
        });
    }
}
