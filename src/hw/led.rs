// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Status LED.
//!
//! The blue pill's PC13 LED sinks current, so it is lit when the pin is low. Use
//! [`Led::active_low`] for it.

use embedded_hal::digital::v2::OutputPin;

use crate::mcal::Level;

/// Whether the LED is driven active-high or active-low on the board wiring.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ActiveLevel {
    High,
    Low,
}

impl ActiveLevel {
    /// Pin level that lights the LED when `on`, dark otherwise.
    fn pin_level(self, on: bool) -> Level {
        match self {
            ActiveLevel::High => Level::from(on),
            ActiveLevel::Low => Level::from(!on),
        }
    }
}

pub struct Led<PIN: OutputPin> {
    pin: PIN,
    active: ActiveLevel,
    is_on: bool,
}

impl<PIN: OutputPin> Led<PIN> {
    /// Wrap `pin` and switch the LED off.
    pub fn new(pin: PIN, active: ActiveLevel) -> Self {
        let mut led = Self {
            pin,
            active,
            is_on: false,
        };
        led.set(false);
        led
    }

    pub fn active_high(pin: PIN) -> Self {
        Self::new(pin, ActiveLevel::High)
    }

    pub fn active_low(pin: PIN) -> Self {
        Self::new(pin, ActiveLevel::Low)
    }

    pub fn set(&mut self, on: bool) {
        match self.active.pin_level(on) {
            Level::High => self.pin.set_high().ok(),
            Level::Low => self.pin.set_low().ok(),
        };
        self.is_on = on;
    }

    #[inline]
    pub fn on(&mut self) {
        self.set(true);
    }

    #[inline]
    pub fn off(&mut self) {
        self.set(false);
    }

    pub fn toggle(&mut self) {
        self.set(!self.is_on);
    }

    #[inline]
    pub fn is_on(&self) -> bool {
        self.is_on
    }

    /// Level currently driven on the pin.
    pub fn pin_level(&self) -> Level {
        self.active.pin_level(self.is_on)
    }

    pub fn free(self) -> PIN {
        self.pin
    }
}
