// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Bit-banged I2C master.
//!
//! Both lines must be open-drain outputs with pull-ups: driving a line high releases it, and SDA is
//! read back to see what the slave drives. Standard-mode timing (about 100 kHz).

use embedded_hal::blocking::delay::DelayUs;
use embedded_hal::blocking::i2c::{Read, Write, WriteRead};
use embedded_hal::digital::v2::{InputPin, OutputPin};

/// Setup and hold time around SCL edges, in microseconds.
const T_SETUP: u16 = 3;
/// SCL high time while shifting a data bit.
const T_HIGH: u16 = 5;
/// Hold time after SCL falls.
const T_HOLD: u16 = 2;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Error {
    /// The slave did not acknowledge an address or data byte.
    Nack,
}

pub struct SoftI2c<SCL, SDA, D> {
    scl: SCL,
    sda: SDA,
    delay: D,
}

impl<SCL, SDA, D> SoftI2c<SCL, SDA, D>
where
    SCL: OutputPin,
    SDA: OutputPin + InputPin,
    D: DelayUs<u16>,
{
    /// Take the pins and release the bus.
    pub fn new(scl: SCL, sda: SDA, delay: D) -> Self {
        let mut bus = Self { scl, sda, delay };
        bus.sda_high();
        bus.delay.delay_us(1);
        bus.scl_high();
        bus.delay.delay_us(1);
        bus
    }

    pub fn free(self) -> (SCL, SDA, D) {
        (self.scl, self.sda, self.delay)
    }

    // Pin errors are ignored: GPIO writes on this MCU cannot fail.
    #[inline]
    fn scl_high(&mut self) {
        self.scl.set_high().ok();
    }

    #[inline]
    fn scl_low(&mut self) {
        self.scl.set_low().ok();
    }

    #[inline]
    fn sda_high(&mut self) {
        self.sda.set_high().ok();
    }

    #[inline]
    fn sda_low(&mut self) {
        self.sda.set_low().ok();
    }

    #[inline]
    fn sda_is_high(&self) -> bool {
        self.sda.is_high().unwrap_or(true)
    }

    /// START (or repeated START): SDA falls while SCL is high.
    pub fn start(&mut self) {
        self.scl_high();
        self.delay.delay_us(T_SETUP);
        self.sda_high();
        self.delay.delay_us(T_SETUP);
        self.sda_low();
        self.delay.delay_us(T_SETUP);
        self.scl_low();
        self.delay.delay_us(T_SETUP);
    }

    /// STOP: SDA rises while SCL is high.
    pub fn stop(&mut self) {
        self.sda_low();
        self.delay.delay_us(T_SETUP);
        self.scl_high();
        self.delay.delay_us(T_SETUP);
        self.sda_high();
        self.delay.delay_us(T_SETUP);
    }

    /// Shift out one byte MSB first. Returns true if the slave acknowledged it.
    pub fn write_byte(&mut self, mut byte: u8) -> bool {
        for _ in 0..8 {
            if byte & 0x80 != 0 {
                self.sda_high();
            } else {
                self.sda_low();
            }
            self.delay.delay_us(T_SETUP);
            self.scl_high();
            self.delay.delay_us(T_HIGH);
            self.scl_low();
            self.delay.delay_us(T_HOLD);
            byte <<= 1;
        }

        // Release SDA and clock in the acknowledge bit.
        self.sda_high();
        self.delay.delay_us(T_SETUP);
        self.scl_high();
        self.delay.delay_us(T_SETUP);
        let ack = !self.sda_is_high();
        self.delay.delay_us(T_HOLD);
        self.scl_low();
        self.delay.delay_us(T_HIGH);
        ack
    }

    /// Shift in one byte MSB first, then send ACK (`true`) or NACK.
    pub fn read_byte(&mut self, ack: bool) -> u8 {
        let mut byte = 0u8;
        self.sda_high();
        self.delay.delay_us(T_SETUP);

        for _ in 0..8 {
            byte <<= 1;
            self.scl_high();
            self.delay.delay_us(T_SETUP);
            if self.sda_is_high() {
                byte |= 0x01;
            }
            self.delay.delay_us(T_HOLD);
            self.scl_low();
            self.delay.delay_us(T_HIGH);
        }

        if ack {
            self.sda_low();
        } else {
            self.sda_high();
        }
        self.delay.delay_us(T_SETUP);
        self.scl_high();
        self.delay.delay_us(T_HIGH);
        self.scl_low();
        self.delay.delay_us(T_HIGH);
        byte
    }

    fn send(&mut self, byte: u8) -> Result<(), Error> {
        if self.write_byte(byte) {
            Ok(())
        } else {
            Err(Error::Nack)
        }
    }

    fn write_frame(&mut self, address: u8, bytes: &[u8]) -> Result<(), Error> {
        self.send(address << 1)?;
        bytes.iter().try_for_each(|&b| self.send(b))
    }

    fn read_frame(&mut self, address: u8, buffer: &mut [u8]) -> Result<(), Error> {
        self.send((address << 1) | 0x01)?;
        let last = buffer.len().saturating_sub(1);
        for (i, b) in buffer.iter_mut().enumerate() {
            *b = self.read_byte(i != last);
        }
        Ok(())
    }

    /// Run a transaction and always finish it with a STOP.
    fn transaction<F>(&mut self, f: F) -> Result<(), Error>
    where
        F: FnOnce(&mut Self) -> Result<(), Error>,
    {
        self.start();
        let result = f(self);
        self.stop();
        result
    }
}

impl<SCL, SDA, D> Write for SoftI2c<SCL, SDA, D>
where
    SCL: OutputPin,
    SDA: OutputPin + InputPin,
    D: DelayUs<u16>,
{
    type Error = Error;

    fn write(&mut self, address: u8, bytes: &[u8]) -> Result<(), Error> {
        self.transaction(|bus| bus.write_frame(address, bytes))
    }
}

impl<SCL, SDA, D> Read for SoftI2c<SCL, SDA, D>
where
    SCL: OutputPin,
    SDA: OutputPin + InputPin,
    D: DelayUs<u16>,
{
    type Error = Error;

    fn read(&mut self, address: u8, buffer: &mut [u8]) -> Result<(), Error> {
        self.transaction(|bus| bus.read_frame(address, buffer))
    }
}

impl<SCL, SDA, D> WriteRead for SoftI2c<SCL, SDA, D>
where
    SCL: OutputPin,
    SDA: OutputPin + InputPin,
    D: DelayUs<u16>,
{
    type Error = Error;

    fn write_read(&mut self, address: u8, bytes: &[u8], buffer: &mut [u8]) -> Result<(), Error> {
        self.transaction(|bus| {
            bus.write_frame(address, bytes)?;
            bus.start();
            bus.read_frame(address, buffer)
        })
    }
}
