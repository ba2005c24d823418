// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Microchip/Atmel AT24C32 serial EEPROM (4 KiB, 32-byte pages, 16-bit word address).
//!
//! Works over any `embedded-hal` blocking I2C bus, so the same driver runs on the hardware I2C
//! peripheral and on [`SoftI2c`](crate::drivers::SoftI2c).

use embedded_hal::blocking::delay::DelayMs;
use embedded_hal::blocking::i2c::{Write, WriteRead};

/// 7-bit address with A2..A0 tied low.
pub const BASE_ADDRESS: u8 = 0x50;
pub const CAPACITY: usize = 4096;
pub const PAGE_SIZE: usize = 32;

/// Worst-case internal write cycle (t_WR).
const WRITE_CYCLE_MS: u16 = 10;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Error<E> {
    I2c(E),
    /// The access would run past the end of the array.
    OutOfRange,
}

pub struct At24c32<I2C, D> {
    i2c: I2C,
    delay: D,
    address: u8,
}

impl<I2C, D, E> At24c32<I2C, D>
where
    I2C: Write<Error = E> + WriteRead<Error = E>,
    D: DelayMs<u16>,
{
    pub fn new(i2c: I2C, delay: D) -> Self {
        Self::with_address(i2c, delay, 0)
    }

    /// `pins` is the A2..A0 strap value.
    pub fn with_address(i2c: I2C, delay: D, pins: u8) -> Self {
        Self {
            i2c,
            delay,
            address: BASE_ADDRESS | (pins & 0x07),
        }
    }

    pub fn free(self) -> (I2C, D) {
        (self.i2c, self.delay)
    }

    fn check(addr: u16, len: usize) -> Result<(), Error<E>> {
        if addr as usize + len > CAPACITY {
            Err(Error::OutOfRange)
        } else {
            Ok(())
        }
    }

    /// Sequential read starting at `addr`.
    pub fn read(&mut self, addr: u16, buf: &mut [u8]) -> Result<(), Error<E>> {
        Self::check(addr, buf.len())?;
        if buf.is_empty() {
            return Ok(());
        }
        self.i2c
            .write_read(self.address, &addr.to_be_bytes(), buf)
            .map_err(Error::I2c)
    }

    /// Write `data` at `addr`, split on page boundaries. Waits out the write cycle after each page.
    pub fn write(&mut self, addr: u16, data: &[u8]) -> Result<(), Error<E>> {
        Self::check(addr, data.len())?;

        let mut addr = addr as usize;
        let mut rest = data;
        while !rest.is_empty() {
            let room = PAGE_SIZE - addr % PAGE_SIZE;
            let (chunk, tail) = rest.split_at(room.min(rest.len()));

            let mut frame = [0u8; 2 + PAGE_SIZE];
            frame[..2].copy_from_slice(&(addr as u16).to_be_bytes());
            frame[2..2 + chunk.len()].copy_from_slice(chunk);

            self.i2c
                .write(self.address, &frame[..2 + chunk.len()])
                .map_err(Error::I2c)?;
            self.delay.delay_ms(WRITE_CYCLE_MS);

            addr += chunk.len();
            rest = tail;
        }
        Ok(())
    }

    pub fn read_byte(&mut self, addr: u16) -> Result<u8, Error<E>> {
        let mut b = [0u8];
        self.read(addr, &mut b)?;
        Ok(b[0])
    }

    pub fn write_byte(&mut self, addr: u16, value: u8) -> Result<(), Error<E>> {
        self.write(addr, &[value])
    }
}
