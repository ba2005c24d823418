// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! # Device-Specific Drivers
//!
//! Drivers that sit above the raw `hw/` layer and below the demo binaries. All of them are generic
//! over `embedded-hal` traits, so they run against the STM32F1 HAL on the board and against the
//! pin and bus doubles in the host tests.
//!
//! ## Existing drivers
//!
//! - [`soft_i2c`] – bit-banged I2C master on two open-drain GPIOs
//! - [`soft_spi`] – bit-banged SPI master and polling slave
//! - [`at24cxx`] – AT24C32 I2C EEPROM
//! - [`servo`] – hobby servo on a PWM channel, plus the duty ramp used by the sweep demo

pub mod at24cxx;
pub mod servo;
pub mod soft_i2c;
pub mod soft_spi;

pub use at24cxx::At24c32;
pub use servo::{Servo, Sweep};
pub use soft_i2c::SoftI2c;
pub use soft_spi::{SoftSpiMaster, SoftSpiSlave};
