// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Controller Area Network (CAN) abstraction layer.
//!
//! - `CanBus` wraps the HAL CAN1 peripheral in `bxcan::Can`.
//! - Provides simple helpers for sending and receiving frames, filter setup, and the
//!   [`CanHw`] binding used by [`crate::mcal::Can`].
//!
//! The blue pill has a single controller, so the controller index passed through [`CanHw`] is
//! ignored.

use core::convert::Infallible;
use nb::block;

use bxcan::filter::Mask32;
use bxcan::{Data, Fifo, Frame, Interrupts, Mailbox, OverrunError, StandardId, TransmitStatus};
use stm32f1xx_hal::{can as hal_can, pac};

use crate::mcal::can::{CanHw, ErrorCounters, Overrun};
use crate::protocol::can_timing::BitTiming;

type Can1 = hal_can::Can<pac::CAN1>;

/// Wrapper around the bxcan instance for CAN1.
pub struct CanBus {
    can: bxcan::Can<Can1>,
}

impl CanBus {
    /// Configure the controller and leave it in initialization mode.
    ///
    /// * `hal_can` – the HAL CAN wrapper, pins already assigned
    /// * `timing` – bit timing for the current APB1 clock
    /// * `loopback` – enable internal loopback
    /// * `silent` – enable silent mode
    pub fn new(hal_can: Can1, timing: BitTiming, loopback: bool, silent: bool) -> Self {
        let can = bxcan::Can::builder(hal_can)
            .set_bit_timing(timing.btr())
            .set_loopback(loopback)
            .set_silent(silent)
            .leave_disabled();

        Self { can }
    }

    /// Block until the controller has joined the bus.
    pub fn enable(&mut self) {
        let _ = block!(self.can.enable_non_blocking());
    }

    /// Route every frame to FIFO 0.
    pub fn accept_all(&mut self) {
        self.can
            .modify_filters()
            .enable_bank(0, Fifo::Fifo0, Mask32::accept_all());
    }

    /// Route only data and remote frames with standard id `id` to FIFO 0.
    pub fn accept_standard(&mut self, id: StandardId) {
        self.can.modify_filters().clear().enable_bank(
            0,
            Fifo::Fifo0,
            Mask32::frames_with_std_id(id, StandardId::MAX),
        );
    }

    /// Transmit a data frame with a standard 11-bit ID.
    ///
    /// `data` must be at most 8 bytes, otherwise this returns `None`.
    pub fn transmit_data(
        &mut self,
        id: StandardId,
        data: &[u8],
    ) -> Option<Result<TransmitStatus, Infallible>> {
        let data = Data::new(data)?;
        let frame = Frame::new_data(id, data);
        Some(block!(self.can.transmit(&frame)))
    }

    /// Blocking receive of a frame.
    pub fn receive(&mut self) -> Result<Frame, OverrunError> {
        block!(self.can.receive())
    }

    fn regs() -> &'static pac::can1::RegisterBlock {
        // Read-only status access and write-1-to-clear flags only.
        unsafe { &*pac::CAN1::ptr() }
    }
}

impl CanHw for CanBus {
    fn apply_timing(&mut self, _ctrl: u8, timing: BitTiming, loopback: bool, silent: bool) {
        self.can
            .modify_config()
            .set_bit_timing(timing.btr())
            .set_loopback(loopback)
            .set_silent(silent)
            .leave_disabled();
    }

    fn start(&mut self, _ctrl: u8) -> nb::Result<(), Infallible> {
        self.can.enable_non_blocking()
    }

    fn stop(&mut self, _ctrl: u8) {
        // Requesting configuration access puts the controller back in initialization mode.
        self.can.modify_config().leave_disabled();
    }

    fn sleep(&mut self, _ctrl: u8) {
        self.can.sleep();
    }

    fn wakeup(&mut self, _ctrl: u8) {
        self.can.wakeup();
    }

    fn transmit(&mut self, _ctrl: u8, frame: &Frame) -> nb::Result<Mailbox, Infallible> {
        self.can.transmit(frame).map(|status| status.mailbox())
    }

    fn poll_tx_complete(&mut self, _ctrl: u8) -> Option<Mailbox> {
        self.can.clear_request_completed_flag()
    }

    fn receive(&mut self, _ctrl: u8) -> nb::Result<Frame, Overrun> {
        self.can.receive().map_err(|e| e.map(|_| Overrun))
    }

    fn error_counters(&self, _ctrl: u8) -> ErrorCounters {
        let esr = Self::regs().esr.read();
        ErrorCounters {
            tec: esr.tec().bits(),
            rec: esr.rec().bits(),
            bus_off: esr.boff().bit_is_set(),
        }
    }

    fn set_interrupts(&mut self, _ctrl: u8, enabled: bool) {
        let irqs = Interrupts::TRANSMIT_MAILBOX_EMPTY
            | Interrupts::FIFO0_MESSAGE_PENDING
            | Interrupts::FIFO0_OVERRUN
            | Interrupts::BUS_OFF;
        if enabled {
            self.can.enable_interrupts(irqs);
        } else {
            self.can.disable_interrupts(irqs);
        }
    }

    fn wakeup_pending(&mut self, _ctrl: u8) -> bool {
        let regs = Self::regs();
        if regs.msr.read().wkui().bit_is_set() {
            regs.msr.write(|w| w.wkui().set_bit());
            true
        } else {
            false
        }
    }
}
