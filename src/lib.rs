// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! # Blue Pill MCAL
//!
//! This crate contains the firmware components for a set of STM32F103 ("blue pill") peripheral
//! demos and a small AUTOSAR-style MCAL layer, written in Rust.
//!
//! Everything that is not a register poke lives in this library and is written against the
//! `embedded-hal` traits, so it builds and tests on the host. The binaries under `src/bin/` bind
//! the library to the board through `stm32f1xx-hal` and are only built with the `board` feature.
//!
//! ## Crate Structure
//!
//! | Module | Purpose |
//! | ------ | -------- |
//! | [`hw`] | MCU-level wrappers around USART, SPI, CAN, ADC, GPIO ports, interrupt flags |
//! | [`drivers`] | Device-level drivers (bit-banged I2C/SPI, AT24C32 EEPROM, servo) |
//! | [`filter`] | Signal filtering (1-D Kalman filter) |
//! | [`protocol`] | LIN framing and CAN bit timing |
//! | [`mcal`] | DIO, SPI, CAN and LIN drivers with an AUTOSAR Classic style API |
//!
//! ## Getting Started
//!
//! Run the host tests:
//!
//! ```bash
//! cargo test
//! ```
//!
//! Flash a demo to the board:
//!
//! ```bash
//! cargo run --release --features board --target thumbv7m-none-eabi --bin adc_kalman
//! ```
//!
//! ## License
//!
//! Licensed under the **MIT License**.

#![cfg_attr(not(test), no_std)]

pub mod drivers;
pub mod filter;
pub mod hw;
pub mod mcal;
pub mod protocol;

#[cfg(test)]
pub(crate) mod mock;
