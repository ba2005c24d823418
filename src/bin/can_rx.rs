// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Receives frames with standard id 0x321 into FIFO 0 and logs id and payload.

#![no_main]
#![no_std]

use core::fmt::Write as _;

use cortex_m_rt::entry;
use panic_halt as _;

use bluepill_mcal::hw::{CanBus, Led, Usart};
use bluepill_mcal::mcal::cfg::PCLK1_HZ;
use bluepill_mcal::protocol::can_timing::{Baudrate, BitTiming};
use bxcan::{Id, StandardId};
use hal::{
    can as hal_can, pac,
    prelude::*,
    serial::{Config, Serial},
};
use stm32f1xx_hal as hal;

const FILTER_ID: u16 = 0x321;

#[entry]
fn main() -> ! {
    let dp = pac::Peripherals::take().unwrap();

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
    let mut gpioc = dp.GPIOC.split();

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

    let mut led = Led::active_low(gpioc.pc13.into_push_pull_output(&mut gpioc.crh));

    // CAN1
    let mut can1 = hal_can::Can::new(dp.CAN1, dp.USB);
    let can_rx = gpioa.pa11.into_floating_input(&mut gpioa.crh);
    let can_tx = gpioa.pa12.into_alternate_push_pull(&mut gpioa.crh);
    can1.assign_pins((can_tx, can_rx), &mut afio.mapr);

    let timing = BitTiming::compute(PCLK1_HZ, Baudrate::Kbps500.bits_per_second()).unwrap();
    let mut can = CanBus::new(can1, timing, false, false);
    can.accept_standard(StandardId::new(FILTER_ID).unwrap());
    can.enable();

    let _ = writeln!(usart, "can_rx: filter {:#05x}\r", FILTER_ID);

    loop {
        match can.receive() {
            Ok(frame) => {
                led.toggle();
                if let Id::Standard(id) = frame.id() {
                    let _ = write!(usart, "id {:#05x} dlc {} : ", id.as_raw(), frame.dlc());
                }
                if let Some(data) = frame.data() {
                    usart.print_bytes(data);
                }
                usart.println("");
            }
            Err(_) => usart.println("fifo overrun"),
        }
    }
}
