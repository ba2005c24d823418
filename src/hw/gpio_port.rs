// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Port-wide GPIO access for [`crate::mcal::Dio`].
//!
//! Pin modes are set up through the HAL first (`split()`, `into_push_pull_output`, ...). After
//! that the DIO driver only touches IDR, ODR and BSRR, which are safe to access from here without
//! owning the HAL pin types: IDR/ODR reads have no side effects and a BSRR write is a single
//! atomic set/reset.

use stm32f1xx_hal::pac;

use crate::mcal::dio::{PortAccess, PortId, PortLevel};

type Regs = pac::gpioa::RegisterBlock;

/// GPIOA..GPIOD of the STM32F103.
pub struct GpioPorts {
    _private: (),
}

impl GpioPorts {
    /// The ports must already be clocked (any HAL `split()` does that).
    pub fn new() -> Self {
        Self { _private: () }
    }

    fn regs(port: PortId) -> Option<&'static Regs> {
        let ptr = match port {
            PortId::A => pac::GPIOA::ptr(),
            PortId::B => pac::GPIOB::ptr(),
            PortId::C => pac::GPIOC::ptr(),
            PortId::D => pac::GPIOD::ptr(),
            _ => return None,
        };
        Some(unsafe { &*ptr })
    }
}

impl Default for GpioPorts {
    fn default() -> Self {
        Self::new()
    }
}

impl PortAccess for GpioPorts {
    fn read_input(&self, port: PortId) -> PortLevel {
        Self::regs(port).map_or(0, |r| r.idr.read().bits() as PortLevel)
    }

    fn read_output(&self, port: PortId) -> PortLevel {
        Self::regs(port).map_or(0, |r| r.odr.read().bits() as PortLevel)
    }

    fn set_reset(&mut self, port: PortId, set: PortLevel, reset: PortLevel) {
        if let Some(r) = Self::regs(port) {
            // BSRR: low half sets, high half resets, set wins.
            r.bsrr
                .write(|w| unsafe { w.bits(((reset as u32) << 16) | set as u32) });
        }
    }
}
