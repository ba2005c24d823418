// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Servo signal on PA0 (TIM2 CH1). The timer runs at 1 MHz with a 2000-count period, and the
//! compare value ramps 0 -> 1999 -> 0 in steps of 20, one step every 100 ms.

#![no_main]
#![no_std]

use core::fmt::Write as _;

use cortex_m_rt::entry;
use panic_halt as _;

use bluepill_mcal::drivers::{Servo, Sweep};
use bluepill_mcal::hw::Usart;
use hal::{
    pac,
    prelude::*,
    serial::{Config, Serial},
    timer::Tim2NoRemap,
};
use stm32f1xx_hal as hal;

const PERIOD_US: u32 = 2000;
const STEP: u16 = 20;
const STEP_MS: u16 = 100;

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

    // TIM2 CH1 PWM at 500 Hz
    let c1 = gpioa.pa0.into_alternate_push_pull(&mut gpioa.crl);
    let pwm = dp
        .TIM2
        .pwm_hz::<Tim2NoRemap, _, _>(c1, &mut afio.mapr, (1_000_000 / PERIOD_US).Hz(), &clocks);
    let mut servo = Servo::with_period(pwm.split(), PERIOD_US);

    let mut delay = cp.SYST.delay(&clocks);

    usart.println("servo_sweep: PA0");

    loop {
        for (i, compare) in Sweep::new(PERIOD_US as u16 - 1, STEP).enumerate() {
            servo.set_pulse_us(compare as u32);
            if i % 10 == 0 {
                let _ = write!(usart, "pulse {:4} us", servo.pulse_us());
                match servo.angle() {
                    Some(deg) => {
                        let _ = writeln!(usart, "  {:3} deg\r", deg);
                    }
                    None => usart.println(""),
                }
            }
            delay.delay_ms(STEP_MS);
        }
    }
}
