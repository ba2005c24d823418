// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! AT24C32 on the I2C1 peripheral (PB6 SCL, PB7 SDA) at 100 kHz.
//!
//! Writes 0x55 to address 0, reads it back and then dumps the first 32 bytes.

#![no_main]
#![no_std]

use core::fmt::Write as _;

use cortex_m_rt::entry;
use panic_halt as _;

use bluepill_mcal::drivers::At24c32;
use bluepill_mcal::hw::Usart;
use hal::{
    i2c::{BlockingI2c, Mode},
    pac,
    prelude::*,
    serial::{Config, Serial},
};
use stm32f1xx_hal as hal;

#[entry]
fn main() -> ! {
    let dp = pac::Peripherals::take().unwrap();
    let cp = cortex_m::Peripherals::take().unwrap();

    let mut flash = dp.FLASH.constrain();
    let rcc = dp.RCC.constrain();
    let clocks = rcc
        .cfgr
        .use_hse(8.MHz())
        .sysclk(72.MHz())
        .pclk1(36.MHz())
        .freeze(&mut flash.acr);

    let mut afio = dp.AFIO.constrain();
    let mut gpioa = dp.GPIOA.split();
    let mut gpiob = dp.GPIOB.split();

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

    // I2C1
    let scl = gpiob.pb6.into_alternate_open_drain(&mut gpiob.crl);
    let sda = gpiob.pb7.into_alternate_open_drain(&mut gpiob.crl);
    let i2c = BlockingI2c::i2c1(
        dp.I2C1,
        (scl, sda),
        &mut afio.mapr,
        Mode::Standard {
            frequency: 100.kHz(),
        },
        clocks,
        1000,
        10,
        1000,
        1000,
    );
    let mut eeprom = At24c32::new(i2c, cp.SYST.delay(&clocks));

    usart.println("hw_i2c_eeprom: AT24C32 @ 0x50");

    if let Err(e) = eeprom.write_byte(0x0000, 0x55) {
        let _ = writeln!(usart, "write failed: {:?}\r", e);
    }
    match eeprom.read_byte(0x0000) {
        Ok(b) => {
            let _ = writeln!(usart, "addr 0x0000 = {:#04x}\r", b);
        }
        Err(e) => {
            let _ = writeln!(usart, "read failed: {:?}\r", e);
        }
    }

    let mut page = [0u8; 32];
    if eeprom.read(0x0000, &mut page).is_ok() {
        for (row, chunk) in page.chunks(8).enumerate() {
            let _ = write!(usart, "{:#06x}: ", row * 8);
            usart.print_bytes(chunk);
            usart.println("");
        }
    }

    loop {
        cortex_m::asm::wfi();
    }
}
