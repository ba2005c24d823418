// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! USART1 (PA9 TX, PA10 RX) at 9600 baud, polled: every received byte is echoed back with its
//! hex value and a running count.

#![no_main]
#![no_std]

use core::fmt::Write as _;

use cortex_m_rt::entry;
use nb::block;
use panic_halt as _;

use bluepill_mcal::hw::{Led, Usart};
use hal::{
    pac,
    prelude::*,
    serial::{Config, Serial},
};
use stm32f1xx_hal as hal;

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

    let tx = gpioa.pa9.into_alternate_push_pull(&mut gpioa.crh);
    let rx = gpioa.pa10;
    let serial = Serial::new(
        dp.USART1,
        (tx, rx),
        &mut afio.mapr,
        Config::default().baudrate(9600.bps()),
        &clocks,
    );
    let (tx, mut rx) = serial.split();
    let mut usart = Usart::new(tx);

    let mut led = Led::active_low(gpioc.pc13.into_push_pull_output(&mut gpioc.crh));

    usart.println("uart_polling: type something");

    let mut count: u32 = 0;
    loop {
        match block!(rx.read()) {
            Ok(b) => {
                count = count.wrapping_add(1);
                led.toggle();
                let shown = if b.is_ascii_graphic() { b as char } else { '.' };
                let _ = writeln!(usart, "#{} '{}' {:#04x}\r", count, shown, b);
            }
            Err(e) => {
                let _ = writeln!(usart, "rx error: {:?}\r", e);
            }
        }
    }
}
