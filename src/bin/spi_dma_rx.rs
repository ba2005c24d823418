// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! SPI1 as a receive-only slave (PA5 SCK, PA7 MOSI, software NSS) with DMA1 channel 2 copying
//! every received byte into a 10-byte circular buffer. The CPU only watches the DMA counter and
//! logs bytes as they land.

#![no_main]
#![no_std]

use core::fmt::Write as _;

use cortex_m::singleton;
use cortex_m_rt::entry;
use panic_halt as _;

use bluepill_mcal::hw::{SpiSlave, Usart};
use hal::{
    pac,
    prelude::*,
    serial::{Config, Serial},
};
use stm32f1xx_hal as hal;

const BUF_LEN: usize = 10;

#[entry]
fn main() -> ! {
    let dp = pac::Peripherals::take().unwrap();

    let mut flash = dp.FLASH.constrain();
    let rcc = dp.RCC.constrain();
    let clocks = rcc
        .cfgr
        .use_hse(8.MHz())
        .sysclk(72.MHz())
        .freeze(&mut flash.acr);

    let mut afio = dp.AFIO.constrain();
    let mut gpioa = dp.GPIOA.split();

    // USART2 (DBG)
    let tx = gpioa.pa2.into_alternate_push_pull(&mut gpioa.crl);
    let rx = gpioa.pa3;
    let serial = Serial::new(
        dp.USART2,
        (tx, rx),
        &mut afio.mapr,
        Config::default().baudrate(115_200.bps()),
        &clocks,
    );
    let (tx, _rx) = serial.split();
    let mut usart = Usart::new(tx);

    // Slave pins: SCK and MOSI in, MISO driven by the peripheral.
    let _sck = gpioa.pa5.into_floating_input(&mut gpioa.crl);
    let _miso = gpioa.pa6.into_alternate_push_pull(&mut gpioa.crl);
    let _mosi = gpioa.pa7.into_floating_input(&mut gpioa.crl);

    let buf = singleton!(: [u8; BUF_LEN] = [0; BUF_LEN]).unwrap();
    let mut rx = SpiSlave::spi1(dp.SPI1, true).into_circular_dma(buf);

    usart.println("spi_dma_rx: SPI1 slave, DMA1 ch2");

    loop {
        while let Some((slot, byte)) = rx.pop() {
            let _ = writeln!(usart, "[{}] {:#04x}\r", slot, byte);
        }
    }
}
