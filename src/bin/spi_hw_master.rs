// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! SPI1 hardware master: PA4 CS, PA5 SCK, PA6 MISO, PA7 MOSI. Mode 0, LSB first, 4.5 MHz.
//!
//! Sends a fixed 7-byte table, one byte per second, with CS held low around each byte. Pair with
//! `spi_hw_slave` or `spi_dma_rx` on a second board.

#![no_main]
#![no_std]

use core::fmt::Write as _;

use cortex_m_rt::entry;
use panic_halt as _;

use bluepill_mcal::hw::{ChipSelect, SpiBus, Usart};
use hal::{
    pac,
    prelude::*,
    serial::{Config, Serial},
    spi::{Mode, Phase, Polarity, Spi, SpiBitFormat},
};
use stm32f1xx_hal as hal;

const DATA: [u8; 7] = [28, 4, 13, 55, 32, 41, 91];

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
        .pclk2(72.MHz())
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

    let sck = gpioa.pa5.into_alternate_push_pull(&mut gpioa.crl);
    let miso = gpioa.pa6;
    let mosi = gpioa.pa7.into_alternate_push_pull(&mut gpioa.crl);
    let mode = Mode {
        polarity: Polarity::IdleLow,
        phase: Phase::CaptureOnFirstTransition,
    };
    // 72 MHz / 16
    let mut spi1 = Spi::spi1(dp.SPI1, (sck, miso, mosi), &mut afio.mapr, mode, 4500.kHz(), clocks);
    spi1.bit_format(SpiBitFormat::LsbFirst);
    let mut bus = SpiBus::new(spi1);
    let mut cs = ChipSelect::active_low(gpioa.pa4.into_push_pull_output(&mut gpioa.crl));

    let mut delay = cp.SYST.delay(&clocks);

    usart.println("spi_hw_master: SPI1 master, LSB first");

    loop {
        for &b in DATA.iter() {
            cs.select();
            let reply = bus.transfer_byte(b);
            cs.deselect();
            match reply {
                Ok(miso) => {
                    let _ = writeln!(usart, "sent {:3}  miso {:#04x}\r", b, miso);
                }
                Err(e) => {
                    let _ = writeln!(usart, "sent {:3}  error {:?}\r", b, e);
                }
            }
            delay.delay_ms(1000_u16);
        }
    }
}
