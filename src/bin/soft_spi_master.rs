// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Bit-banged SPI master: PA0 SCK, PA1 MISO, PA2 MOSI, PA3 CS.
//!
//! Sends a fixed 8-byte table, one byte per second, slow enough to follow on LEDs or a logic
//! analyzer. Pair with `soft_spi_slave` on a second board. Logs on USART1 because PA2/PA3 are
//! taken.

#![no_main]
#![no_std]

use core::fmt::Write as _;

use cortex_m_rt::entry;
use panic_halt as _;

use bluepill_mcal::drivers::SoftSpiMaster;
use bluepill_mcal::hw::Usart;
use hal::{
    pac,
    prelude::*,
    serial::{Config, Serial},
};
use stm32f1xx_hal as hal;

const DATA: [u8; 8] = [2, 9, 14, 25, 31, 37, 48, 79];

/// Half an SCK period.
const HALF_PERIOD_US: u16 = 1000;

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

    let sck = gpioa.pa0.into_push_pull_output(&mut gpioa.crl);
    let miso = gpioa.pa1.into_floating_input(&mut gpioa.crl);
    let mosi = gpioa.pa2.into_push_pull_output(&mut gpioa.crl);
    let cs = gpioa.pa3.into_push_pull_output(&mut gpioa.crl);
    let mut spi = SoftSpiMaster::new(sck, mosi, miso, cs, dp.TIM2.delay_us(&clocks), HALF_PERIOD_US);

    let mut delay = cp.SYST.delay(&clocks);

    usart.println("soft_spi_master");

    loop {
        for &b in DATA.iter() {
            let reply = spi.transfer_byte(b);
            let _ = writeln!(usart, "sent {:3}  miso {:#04x}\r", b, reply);
            delay.delay_ms(1000_u16);
        }
    }
}
