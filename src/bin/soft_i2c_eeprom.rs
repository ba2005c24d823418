// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! AT24C32 on a bit-banged I2C bus (PB6 SCL, PB7 SDA, open drain with external pull-ups).
//!
//! Writes a test pattern across a page boundary, reads it back and logs both.

#![no_main]
#![no_std]

use core::fmt::Write as _;

use cortex_m_rt::entry;
use panic_halt as _;

use bluepill_mcal::drivers::{At24c32, SoftI2c};
use bluepill_mcal::hw::Usart;
use hal::{
    pac,
    prelude::*,
    serial::{Config, Serial},
};
use stm32f1xx_hal as hal;

const TEST_ADDR: u16 = 0x001C;

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

    // Bit-banged bus: SysTick paces the bits, TIM2 waits out EEPROM write cycles.
    let scl = gpiob.pb6.into_open_drain_output(&mut gpiob.crl);
    let sda = gpiob.pb7.into_open_drain_output(&mut gpiob.crl);
    let i2c = SoftI2c::new(scl, sda, cp.SYST.delay(&clocks));
    let mut eeprom = At24c32::new(i2c, dp.TIM2.delay_us(&clocks));

    usart.println("soft_i2c_eeprom: AT24C32 @ 0x50");

    let pattern: [u8; 8] = [0x55, 0xAA, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06];
    match eeprom.write(TEST_ADDR, &pattern) {
        Ok(()) => {
            let _ = write!(usart, "wrote  {:#06x}: ", TEST_ADDR);
            usart.print_bytes(&pattern);
            usart.println("");
        }
        Err(e) => {
            let _ = writeln!(usart, "write failed: {:?}\r", e);
        }
    }

    let mut readback = [0u8; 8];
    match eeprom.read(TEST_ADDR, &mut readback) {
        Ok(()) => {
            let _ = write!(usart, "read   {:#06x}: ", TEST_ADDR);
            usart.print_bytes(&readback);
            usart.println("");
            usart.println(if readback == pattern { "match" } else { "MISMATCH" });
        }
        Err(e) => {
            let _ = writeln!(usart, "read failed: {:?}\r", e);
        }
    }

    loop {
        cortex_m::asm::wfi();
    }
}
