// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Button on PA0 (to ground, internal pull-up). Each falling edge raises EXTI0 and the main loop
//! toggles the PC13 LED.

#![no_main]
#![no_std]

use core::fmt::Write as _;

use cortex_m::peripheral::NVIC;
use cortex_m_rt::entry;
use panic_halt as _;

use bluepill_mcal::hw::{EventFlag, Led, Usart};
use hal::{
    gpio::{Edge, ExtiPin},
    pac::{self, interrupt},
    prelude::*,
    serial::{Config, Serial},
};
use stm32f1xx_hal as hal;

static BUTTON_PRESSED: EventFlag = EventFlag::new();

#[interrupt]
fn EXTI0() {
    let exti = unsafe { &*pac::EXTI::ptr() };
    if exti.pr.read().pr0().bit_is_set() {
        // Write 1 to clear.
        exti.pr.write(|w| w.pr0().set_bit());
        BUTTON_PRESSED.set();
    }
}

#[entry]
fn main() -> ! {
    let mut dp = pac::Peripherals::take().unwrap();

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

    let mut button = gpioa.pa0.into_pull_up_input(&mut gpioa.crl);
    button.make_interrupt_source(&mut afio);
    button.trigger_on_edge(&mut dp.EXTI, Edge::Falling);
    button.enable_interrupt(&mut dp.EXTI);
    unsafe { NVIC::unmask(pac::Interrupt::EXTI0) };

    usart.println("exti_button: press PA0");

    let mut presses: u32 = 0;
    loop {
        if BUTTON_PRESSED.take() {
            presses += 1;
            led.toggle();
            let _ = writeln!(
                usart,
                "press {} -> led {}\r",
                presses,
                if led.is_on() { "on" } else { "off" }
            );
        }
        cortex_m::asm::wfi();
    }
}
