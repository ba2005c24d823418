// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Single-channel blocking ADC reads.
//!
//! The STM32F1 ADC is 12-bit with a 3.3 V reference on the blue pill.
//!
//! Example:
//! ```ignore
//! let adc1 = Adc::adc1(dp.ADC1, clocks);
//! let pa0 = gpioa.pa0.into_analog(&mut gpioa.crl);
//! let mut pot = AdcChannel::new(adc1, pa0);
//! let raw = pot.read_raw()?;
//! ```

use core::cell::RefCell;
use core::marker::PhantomData;

use embedded_hal::adc::{Channel, OneShot};

pub const FULL_SCALE: u16 = 4095;
pub const VREF_MV: u32 = 3300;

/// Trait for reading one fixed input.
pub trait AdcRead {
    type Error;

    fn read_raw(&mut self) -> Result<u16, Self::Error>;

    /// Reading scaled to millivolts.
    fn read_mv(&mut self) -> Result<u32, Self::Error> {
        self.read_raw().map(raw_to_mv)
    }
}

#[inline]
pub fn raw_to_mv(raw: u16) -> u32 {
    raw.min(FULL_SCALE) as u32 * VREF_MV / FULL_SCALE as u32
}

/// An ADC peripheral paired with the pin it samples.
pub struct AdcChannel<A, ADC, PIN> {
    adc: A,
    pin: PIN,
    _adc: PhantomData<ADC>,
}

impl<A, ADC, PIN> AdcChannel<A, ADC, PIN> {
    pub fn new(adc: A, pin: PIN) -> Self {
        Self {
            adc,
            pin,
            _adc: PhantomData,
        }
    }

    pub fn free(self) -> (A, PIN) {
        (self.adc, self.pin)
    }
}

impl<A, ADC, PIN> AdcRead for AdcChannel<A, ADC, PIN>
where
    A: OneShot<ADC, u16, PIN>,
    PIN: Channel<ADC>,
{
    type Error = A::Error;

    fn read_raw(&mut self) -> Result<u16, A::Error> {
        nb::block!(self.adc.read(&mut self.pin))
    }
}

/// Create a closure that samples a shared channel, yielding 0 on a failed conversion.
pub fn make_reader<'a, R: AdcRead>(adc_ref: &'a RefCell<R>) -> impl FnMut() -> u16 + 'a {
    move || adc_ref.borrow_mut().read_raw().unwrap_or(0)
}
