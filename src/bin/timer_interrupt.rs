// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! TIM2 update interrupt at 1 kHz. The main loop counts seconds from the tick count and blinks
//! PC13 once per second.

#![no_main]
#![no_std]

use core::fmt::Write as _;

use cortex_m::peripheral::NVIC;
use cortex_m_rt::entry;
use panic_halt as _;

use bluepill_mcal::hw::{Led, TickCounter, Usart};
use hal::{
    pac::{self, interrupt},
    prelude::*,
    serial::{Config, Serial},
    timer::Event,
};
use stm32f1xx_hal as hal;

const TICKS_PER_SECOND: u32 = 1000;

static TICKS: TickCounter = TickCounter::new();

#[interrupt]
fn TIM2() {
    let tim = unsafe { &*pac::TIM2::ptr() };
    if tim.sr.read().uif().bit_is_set() {
        tim.sr.modify(|_, w| w.uif().clear_bit());
        TICKS.tick();
    }
}

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

    // 1 ms tick
    let mut timer = dp.TIM2.counter_hz(&clocks);
    timer.start(1.kHz()).unwrap();
    timer.listen(Event::Update);
    unsafe { NVIC::unmask(pac::Interrupt::TIM2) };

    usart.println("timer_interrupt: 1 kHz tick");

    let mut seconds: u32 = 0;
    let mut since = TICKS.now();
    loop {
        if TICKS.expired(since, TICKS_PER_SECOND) {
            since = since.wrapping_add(TICKS_PER_SECOND);
            seconds += 1;
            led.toggle();
            let _ = writeln!(usart, "{} s (tick {})\r", seconds, TICKS.now());
        }
        cortex_m::asm::wfi();
    }
}
