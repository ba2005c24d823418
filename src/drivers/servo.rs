// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Hobby servo on a timer PWM channel.
//!
//! The servo reads the high time of each pulse: 1.0 ms is 0°, 2.0 ms is 180°. Standard servos want
//! a 20 ms frame (50 Hz); the period is configurable for the faster demo frame.

use embedded_hal::PwmPin;

pub const FRAME_US: u32 = 20_000;
pub const MIN_PULSE_US: u32 = 1_000;
pub const MAX_PULSE_US: u32 = 2_000;
pub const MAX_ANGLE: u8 = 180;

pub struct Servo<P> {
    pwm: P,
    period_us: u32,
    pulse_us: u32,
}

impl<P> Servo<P>
where
    P: PwmPin<Duty = u16>,
{
    /// 50 Hz servo. The timer must already run with a 20 ms period.
    pub fn new(pwm: P) -> Self {
        Self::with_period(pwm, FRAME_US)
    }

    pub fn with_period(mut pwm: P, period_us: u32) -> Self {
        pwm.set_duty(0);
        pwm.enable();
        Self {
            pwm,
            period_us: period_us.max(1),
            pulse_us: 0,
        }
    }

    /// Drive a raw pulse width. Clamped to the PWM period.
    pub fn set_pulse_us(&mut self, us: u32) {
        let us = us.min(self.period_us);
        let max = self.pwm.get_max_duty() as u64;
        let period = self.period_us as u64;
        // us <= period, so the quotient fits the timer's u16 duty.
        let duty = (us as u64 * max + period / 2) / period;
        self.pwm.set_duty(duty as u16);
        self.pulse_us = us;
    }

    /// Move to `deg` (clamped to 0..=180).
    pub fn set_angle(&mut self, deg: u8) {
        let deg = deg.min(MAX_ANGLE) as u32;
        let span = MAX_PULSE_US - MIN_PULSE_US;
        self.set_pulse_us(MIN_PULSE_US + (deg * span + MAX_ANGLE as u32 / 2) / MAX_ANGLE as u32);
    }

    /// Last commanded angle, or `None` if the pulse is outside the servo range.
    pub fn angle(&self) -> Option<u8> {
        if !(MIN_PULSE_US..=MAX_PULSE_US).contains(&self.pulse_us) {
            return None;
        }
        let span = MAX_PULSE_US - MIN_PULSE_US;
        let deg = ((self.pulse_us - MIN_PULSE_US) * MAX_ANGLE as u32 + span / 2) / span;
        Some(deg as u8)
    }

    pub fn pulse_us(&self) -> u32 {
        self.pulse_us
    }

    pub fn release(&mut self) {
        self.pwm.disable();
    }

    pub fn free(self) -> P {
        self.pwm
    }
}

/// One up-and-down ramp of compare values: `0, step, ..` up to `max`, then `max, max - step, ..`
/// while the value stays non-negative.
#[derive(Clone, Debug)]
pub struct Sweep {
    max: u16,
    step: u16,
    next: Option<u16>,
    rising: bool,
}

impl Sweep {
    pub fn new(max: u16, step: u16) -> Self {
        Self {
            max,
            step: step.max(1),
            next: Some(0),
            rising: true,
        }
    }
}

impl Iterator for Sweep {
    type Item = u16;

    fn next(&mut self) -> Option<u16> {
        let current = self.next?;
        self.next = if self.rising {
            match current.checked_add(self.step).filter(|&v| v <= self.max) {
                Some(v) => Some(v),
                None => {
                    self.rising = false;
                    if current == self.max {
                        current.checked_sub(self.step)
                    } else {
                        Some(self.max)
                    }
                }
            }
        } else {
            current.checked_sub(self.step)
        };
        Some(current)
    }
}
