// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! # MCU-level wrappers
//!
//! The portable part (`led`, `spi`, `usart`, `adc`, `event`, `lin_port`) is written against
//! `embedded-hal` and `heapless` and is exercised by the host tests. The rest touches STM32F1
//! registers and only builds with the `board` feature.

pub mod adc;
pub mod event;
pub mod led;
pub mod lin_port;
pub mod spi;
pub mod usart;

#[cfg(feature = "board")]
pub mod can;
#[cfg(feature = "board")]
pub mod gpio_port;
#[cfg(feature = "board")]
pub mod lin_uart;
#[cfg(feature = "board")]
pub mod spi_slave;

pub use adc::{AdcChannel, AdcRead};
pub use event::{BlockCollector, EventFlag, TickCounter};
pub use led::Led;
pub use lin_port::LinPort;
pub use spi::{ChipSelect, SpiBus, SpiUnit};
pub use usart::Usart;

#[cfg(feature = "board")]
pub use can::CanBus;
#[cfg(feature = "board")]
pub use gpio_port::GpioPorts;
#[cfg(feature = "board")]
pub use lin_uart::{LinRxIrq, LinUart};
#[cfg(feature = "board")]
pub use spi_slave::SpiSlave;
