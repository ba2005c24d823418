// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Bit-banged SPI slave: PA0 SCK, PA1 MISO (held high), PA2 MOSI, PA3 CS.
//!
//! Collects 8-byte blocks from `soft_spi_master` and logs each one on USART1.

#![no_main]
#![no_std]

use core::fmt::Write as _;

use cortex_m_rt::entry;
use nb::block;
use panic_halt as _;

use bluepill_mcal::drivers::SoftSpiSlave;
use bluepill_mcal::hw::{Led, Usart};
use hal::{
    pac,
    prelude::*,
    serial::{Config, Serial},
};
use stm32f1xx_hal as hal;

const BLOCK_LEN: usize = 8;

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
    let mut gpioc = dp.GPIOC.split();

    // USART1 (DBG)
    let tx = gpioa.pa9.into_alternate_push_pull(&mut gpioa.crh);
    let rx = gpioa.pa10;
    let serial = Serial::new(
        dp.USART1,
        (tx, rx),
        &mut afio.mapr,
        Config::default().baudrate(115_200.bps()),
        &clocks,
    );
    let (tx, _rx) = serial.split();
    let mut usart = Usart::new(tx);

    let mut led = Led::active_low(gpioc.pc13.into_push_pull_output(&mut gpioc.crh));

    let sck = gpioa.pa0.into_floating_input(&mut gpioa.crl);
    let mut miso = gpioa.pa1.into_push_pull_output(&mut gpioa.crl);
    miso.set_high();
    let mosi = gpioa.pa2.into_floating_input(&mut gpioa.crl);
    let cs = gpioa.pa3.into_floating_input(&mut gpioa.crl);
    let mut spi = SoftSpiSlave::new(sck, mosi, cs);

    usart.println("soft_spi_slave");

    let mut block = [0u8; BLOCK_LEN];
    loop {
        for b in block.iter_mut() {
            let byte = match block!(spi.receive_byte()) {
                Ok(byte) => byte,
                Err(never) => match never {},
            };
            *b = byte;
            led.toggle();
            let _ = writeln!(usart, "rx {:3}\r", byte);
        }
        usart.write_str("block: ");
        usart.print_bytes(&block);
        usart.println("");
    }
}
