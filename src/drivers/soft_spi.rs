// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Bit-banged SPI, mode 0 (CPOL = 0, CPHA = 0), MSB first.
//!
//! The master asserts CS around every byte, so a slave on the other end can resynchronize on each
//! CS edge. The slave side polls its pins and gives up on a byte as soon as CS is released.

use core::convert::Infallible;

use embedded_hal::blocking::delay::DelayUs;
use embedded_hal::blocking::spi::{Transfer, Write};
use embedded_hal::digital::v2::{InputPin, OutputPin};

pub struct SoftSpiMaster<SCK, MOSI, MISO, CS, D> {
    sck: SCK,
    mosi: MOSI,
    miso: MISO,
    cs: CS,
    delay: D,
    half_period_us: u16,
}

impl<SCK, MOSI, MISO, CS, D> SoftSpiMaster<SCK, MOSI, MISO, CS, D>
where
    SCK: OutputPin,
    MOSI: OutputPin,
    MISO: InputPin,
    CS: OutputPin,
    D: DelayUs<u16>,
{
    /// Idle the bus (SCK low, MOSI low, CS high). One bit takes `2 * half_period_us` plus the
    /// MOSI setup time.
    pub fn new(sck: SCK, mosi: MOSI, miso: MISO, cs: CS, delay: D, half_period_us: u16) -> Self {
        let mut spi = Self {
            sck,
            mosi,
            miso,
            cs,
            delay,
            half_period_us,
        };
        spi.sck.set_low().ok();
        spi.mosi.set_low().ok();
        spi.cs.set_high().ok();
        spi
    }

    pub fn free(self) -> (SCK, MOSI, MISO, CS, D) {
        (self.sck, self.mosi, self.miso, self.cs, self.delay)
    }

    /// Clock one byte out on MOSI and return what the slave shifted back on MISO.
    pub fn transfer_byte(&mut self, mut out: u8) -> u8 {
        let mut received = 0u8;
        let half = self.half_period_us;

        self.cs.set_low().ok();
        self.delay.delay_us(half);

        for _ in 0..8 {
            if out & 0x80 != 0 {
                self.mosi.set_high().ok();
            } else {
                self.mosi.set_low().ok();
            }
            out <<= 1;
            self.delay.delay_us(half);

            self.sck.set_high().ok();
            self.delay.delay_us(half);
            received = (received << 1) | self.miso.is_high().unwrap_or(false) as u8;
            self.sck.set_low().ok();
            self.delay.delay_us(half);
        }

        self.cs.set_high().ok();
        self.delay.delay_us(half);
        received
    }
}

impl<SCK, MOSI, MISO, CS, D> Transfer<u8> for SoftSpiMaster<SCK, MOSI, MISO, CS, D>
where
    SCK: OutputPin,
    MOSI: OutputPin,
    MISO: InputPin,
    CS: OutputPin,
    D: DelayUs<u16>,
{
    type Error = Infallible;

    fn transfer<'w>(&mut self, words: &'w mut [u8]) -> Result<&'w [u8], Infallible> {
        for w in words.iter_mut() {
            *w = self.transfer_byte(*w);
        }
        Ok(words)
    }
}

impl<SCK, MOSI, MISO, CS, D> Write<u8> for SoftSpiMaster<SCK, MOSI, MISO, CS, D>
where
    SCK: OutputPin,
    MOSI: OutputPin,
    MISO: InputPin,
    CS: OutputPin,
    D: DelayUs<u16>,
{
    type Error = Infallible;

    fn write(&mut self, words: &[u8]) -> Result<(), Infallible> {
        for &w in words {
            self.transfer_byte(w);
        }
        Ok(())
    }
}

/// Receive-only slave. MISO is left to the application.
pub struct SoftSpiSlave<SCK, MOSI, CS> {
    sck: SCK,
    mosi: MOSI,
    cs: CS,
}

impl<SCK, MOSI, CS> SoftSpiSlave<SCK, MOSI, CS>
where
    SCK: InputPin,
    MOSI: InputPin,
    CS: InputPin,
{
    pub fn new(sck: SCK, mosi: MOSI, cs: CS) -> Self {
        Self { sck, mosi, cs }
    }

    pub fn free(self) -> (SCK, MOSI, CS) {
        (self.sck, self.mosi, self.cs)
    }

    #[inline]
    fn deselected(&self) -> bool {
        self.cs.is_high().unwrap_or(true)
    }

    /// Spin until SCK reaches `level`. Fails if CS is released first.
    fn wait_sck(&self, level: bool) -> nb::Result<(), Infallible> {
        loop {
            if self.deselected() {
                return Err(nb::Error::WouldBlock);
            }
            if self.sck.is_high().unwrap_or(false) == level {
                return Ok(());
            }
        }
    }

    /// Receive one byte, sampling MOSI while SCK is high.
    ///
    /// Returns `WouldBlock` while CS is high, and drops a partial byte if CS goes high mid-byte.
    pub fn receive_byte(&mut self) -> nb::Result<u8, Infallible> {
        if self.deselected() {
            return Err(nb::Error::WouldBlock);
        }

        let mut byte = 0u8;
        for _ in 0..8 {
            self.wait_sck(true)?;
            byte = (byte << 1) | self.mosi.is_high().unwrap_or(false) as u8;
            self.wait_sck(false)?;
        }
        Ok(byte)
    }
}
