// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Potentiometer on PA0, smoothed with a Kalman filter and logged once a second.

#![no_main]
#![no_std]

use core::cell::RefCell;
use core::fmt::Write as _;

use cortex_m_rt::entry;
use panic_halt as _;

use bluepill_mcal::filter::KalmanFilter;
use bluepill_mcal::hw::adc::{make_reader, raw_to_mv};
use bluepill_mcal::hw::{AdcChannel, Usart};
use hal::{
    adc::Adc,
    pac,
    prelude::*,
    serial::{Config, Serial},
};
use stm32f1xx_hal as hal;

/// Measurement noise, initial estimate error and process noise, in ADC counts.
const MEA_E: f32 = 1.0;
const EST_E: f32 = 2.0;
const Q: f32 = 0.01;

const PERIOD_MS: u16 = 1000;

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
        .adcclk(12.MHz())
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

    // ADC1 channel 0
    let adc1 = Adc::adc1(dp.ADC1, clocks);
    let pa0 = gpioa.pa0.into_analog(&mut gpioa.crl);
    let pot = RefCell::new(AdcChannel::<_, pac::ADC1, _>::new(adc1, pa0));
    let mut sample = make_reader(&pot);

    let mut kalman = KalmanFilter::new(MEA_E, EST_E, Q);
    let mut delay = cp.SYST.delay(&clocks);

    usart.println("adc_kalman: PA0");

    loop {
        let raw = sample();
        let filtered = kalman.update_estimate(raw as f32);
        let filtered_raw = filtered as u16;

        let _ = writeln!(
            usart,
            "raw {:4}  filtered {:4}  ({} mV)  gain {:.3}\r",
            raw,
            filtered_raw,
            raw_to_mv(filtered_raw),
            kalman.kalman_gain()
        );

        delay.delay_ms(PERIOD_MS);
    }
}
