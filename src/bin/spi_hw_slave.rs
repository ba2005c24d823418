// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! SPI1 hardware slave with polled receive: PA4 NSS (input), PA5 SCK, PA6 MISO, PA7 MOSI.
//!
//! Waits for the master to pull NSS low, then reads four bytes and logs them on USART2. Pair with
//! `spi_hw_master` on a second board.

#![no_main]
#![no_std]

use core::fmt::Write as _;

use cortex_m_rt::entry;
use nb::block;
use panic_halt as _;

use bluepill_mcal::hw::{SpiSlave, Usart};
use hal::{
    pac,
    prelude::*,
    serial::{Config, Serial},
};
use stm32f1xx_hal as hal;

const BLOCK_LEN: usize = 4;

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

    let nss = gpioa.pa4.into_pull_up_input(&mut gpioa.crl);
    let _sck = gpioa.pa5.into_floating_input(&mut gpioa.crl);
    let _miso = gpioa.pa6.into_alternate_push_pull(&mut gpioa.crl);
    let _mosi = gpioa.pa7.into_floating_input(&mut gpioa.crl);

    let mut spi = SpiSlave::spi1(dp.SPI1, true);

    usart.println("spi_hw_slave: SPI1 slave, LSB first");

    let mut block = [0u8; BLOCK_LEN];
    loop {
        while nss.is_high() {}

        let mut n = 0;
        while n < BLOCK_LEN {
            match block!(spi.read()) {
                Ok(byte) => {
                    block[n] = byte;
                    n += 1;
                }
                Err(e) => {
                    let _ = writeln!(usart, "spi: {:?}\r", e);
                }
            }
        }

        usart.write_str("rx ");
        usart.print_bytes(&block);
        usart.println("");
    }
}
