// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Serial Peripheral Interface (SPI) abstraction layer.
//!
//! - `SpiBus` wraps a configured SPI master with 8-bit words.
//! - `ChipSelect` is an active-low GPIO output wrapper for manual CS control.
//! - `SpiUnit` binds one bus and its chip selects to the MCAL SPI handler.

use embedded_hal::blocking::spi::Transfer;
use embedded_hal::digital::v2::OutputPin;

use crate::mcal::spi::{HwUnit, SpiHw};

/// Wrapper around an enabled SPI master (8-bit words).
pub struct SpiBus<S> {
    spi: S,
}

impl<S, E> SpiBus<S>
where
    S: Transfer<u8, Error = E>,
{
    pub fn new(spi: S) -> Self {
        Self { spi }
    }

    /// Perform a blocking, full-duplex transfer of one byte.
    pub fn transfer_byte(&mut self, byte: u8) -> Result<u8, E> {
        let mut tmp = [byte];
        self.spi.transfer(&mut tmp)?;
        Ok(tmp[0])
    }

    /// Read a byte, sending 0x00.
    #[inline]
    pub fn read_byte(&mut self) -> Result<u8, E> {
        self.transfer_byte(0x00)
    }

    /// Transfer a byte buffer in place.
    pub fn transfer_in_place(&mut self, buf: &mut [u8]) -> Result<(), E> {
        self.spi.transfer(buf)?;
        Ok(())
    }

    pub fn free(self) -> S {
        self.spi
    }
}

/// Manual chip-select line, active-low.
pub struct ChipSelect<P> {
    pin: P,
}

impl<P: OutputPin> ChipSelect<P> {
    /// Wrap `pin` and drive it to the inactive (high) state.
    pub fn active_low(mut pin: P) -> Self {
        pin.set_high().ok();
        Self { pin }
    }

    #[inline]
    pub fn select(&mut self) {
        self.pin.set_low().ok();
    }

    #[inline]
    pub fn deselect(&mut self) {
        self.pin.set_high().ok();
    }

    pub fn free(self) -> P {
        self.pin
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum UnitError<E> {
    Bus(E),
    /// The job addressed a hardware unit this binding does not own.
    UnknownUnit(HwUnit),
}

/// One SPI peripheral and its `N` chip selects as seen by [`crate::mcal::Spi`].
///
/// Chip select `cs` of a job indexes into `cs_lines`; unknown indices are ignored.
pub struct SpiUnit<S, P, const N: usize> {
    unit: HwUnit,
    bus: SpiBus<S>,
    cs_lines: [ChipSelect<P>; N],
}

impl<S, P, E, const N: usize> SpiUnit<S, P, N>
where
    S: Transfer<u8, Error = E>,
    P: OutputPin,
{
    pub fn new(unit: HwUnit, bus: SpiBus<S>, cs_lines: [ChipSelect<P>; N]) -> Self {
        Self {
            unit,
            bus,
            cs_lines,
        }
    }

    fn line(&mut self, unit: HwUnit, cs: u8) -> Option<&mut ChipSelect<P>> {
        if unit != self.unit {
            return None;
        }
        self.cs_lines.get_mut(cs as usize)
    }

    pub fn free(self) -> (SpiBus<S>, [ChipSelect<P>; N]) {
        (self.bus, self.cs_lines)
    }
}

impl<S, P, E, const N: usize> SpiHw for SpiUnit<S, P, N>
where
    S: Transfer<u8, Error = E>,
    P: OutputPin,
    E: core::fmt::Debug,
{
    type Error = UnitError<E>;

    fn select(&mut self, unit: HwUnit, cs: u8) {
        if let Some(line) = self.line(unit, cs) {
            line.select();
        }
    }

    fn deselect(&mut self, unit: HwUnit, cs: u8) {
        if let Some(line) = self.line(unit, cs) {
            line.deselect();
        }
    }

    fn transfer(&mut self, unit: HwUnit, buf: &mut [u8]) -> Result<(), Self::Error> {
        if unit != self.unit {
            return Err(UnitError::UnknownUnit(unit));
        }
        self.bus.transfer_in_place(buf).map_err(UnitError::Bus)
    }
}
