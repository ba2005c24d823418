// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! SPI1 as a mode 0 slave with software NSS.
//!
//! The HAL only drives SPI as a master, so the peripheral is configured here at register level.
//! GPIO modes are still set through the HAL: SCK and MOSI as floating inputs, MISO as alternate
//! push-pull. With software NSS the slave is always selected; gating on a chip-select line is left
//! to the caller.

use stm32f1xx_hal::pac;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Error {
    /// A byte arrived before the previous one was read.
    Overrun,
}

pub struct SpiSlave {
    spi: pac::SPI1,
}

impl SpiSlave {
    /// Clock and enable SPI1. `lsb_first` selects the bit order.
    pub fn spi1(spi: pac::SPI1, lsb_first: bool) -> Self {
        let rcc = unsafe { &*pac::RCC::ptr() };
        rcc.apb2enr.modify(|_, w| w.spi1en().set_bit());

        spi.cr2.reset();
        spi.cr1.write(|w| {
            w.mstr()
                .clear_bit()
                .cpol()
                .clear_bit()
                .cpha()
                .clear_bit()
                .lsbfirst()
                .bit(lsb_first)
                .ssm()
                .set_bit()
                .ssi()
                .clear_bit()
                .spe()
                .set_bit()
        });

        Self { spi }
    }

    /// Next byte clocked in by the master.
    pub fn read(&mut self) -> nb::Result<u8, Error> {
        let sr = self.spi.sr.read();
        if sr.ovr().bit_is_set() {
            // OVR clears on a DR read followed by an SR read.
            let _ = self.spi.dr.read();
            let _ = self.spi.sr.read();
            return Err(nb::Error::Other(Error::Overrun));
        }
        if sr.rxne().bit_is_clear() {
            return Err(nb::Error::WouldBlock);
        }
        Ok(self.spi.dr.read().dr().bits() as u8)
    }

    /// Load the byte shifted out on MISO during the next transfer.
    pub fn write(&mut self, byte: u8) -> nb::Result<(), Error> {
        if self.spi.sr.read().txe().bit_is_clear() {
            return Err(nb::Error::WouldBlock);
        }
        self.spi.dr.write(|w| unsafe { w.dr().bits(byte as u16) });
        Ok(())
    }

    /// Hand reception to DMA1 channel 2, which copies every byte into `buf` and wraps at its end.
    pub fn into_circular_dma(self, buf: &'static mut [u8]) -> CircularRx {
        let rcc = unsafe { &*pac::RCC::ptr() };
        rcc.ahbenr.modify(|_, w| w.dma1en().set_bit());

        let dma = unsafe { &*pac::DMA1::ptr() };
        let len = buf.len().min(u16::MAX as usize);

        // Channel 2 is SPI1_RX.
        dma.ch2.cr.reset();
        dma.ch2
            .par
            .write(|w| unsafe { w.pa().bits(&self.spi.dr as *const _ as u32) });
        dma.ch2
            .mar
            .write(|w| unsafe { w.ma().bits(buf.as_mut_ptr() as u32) });
        dma.ch2
            .ndtr
            .write(|w| unsafe { w.ndt().bits(len as u16) });
        // Peripheral to memory, 8-bit both sides (reset value), memory increment, circular.
        dma.ch2
            .cr
            .write(|w| w.minc().set_bit().circ().set_bit().pl().medium().en().set_bit());

        self.spi.cr2.modify(|_, w| w.rxdmaen().set_bit());

        CircularRx {
            _spi: self.spi,
            base: buf.as_ptr(),
            len,
            read: 0,
        }
    }
}

/// SPI1 receive running in circular DMA mode.
pub struct CircularRx {
    _spi: pac::SPI1,
    base: *const u8,
    len: usize,
    read: usize,
}

impl CircularRx {
    /// Index the DMA writes next.
    fn write_index(&self) -> usize {
        let dma = unsafe { &*pac::DMA1::ptr() };
        let remaining = dma.ch2.ndtr.read().ndt().bits() as usize;
        (self.len - remaining.min(self.len)) % self.len
    }

    /// Oldest byte the DMA has stored and this reader has not seen yet, with its buffer slot.
    pub fn pop(&mut self) -> Option<(usize, u8)> {
        if self.len == 0 || self.read == self.write_index() {
            return None;
        }
        let slot = self.read;
        // The DMA owns the buffer; each slot is read once it has moved past it.
        let byte = unsafe { core::ptr::read_volatile(self.base.add(slot)) };
        self.read = (slot + 1) % self.len;
        Some((slot, byte))
    }
}
