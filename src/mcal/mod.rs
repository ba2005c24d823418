// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! AUTOSAR Classic style microcontroller abstraction layer.
//!
//! Each driver is a struct that owns its hardware access object and its runtime state, and is
//! configured from the tables in [`cfg`].

pub mod can;
pub mod cfg;
pub mod dio;
pub mod lin;
pub mod spi;
pub mod std_types;

pub use can::Can;
pub use dio::Dio;
pub use lin::Lin;
pub use spi::Spi;
pub use std_types::{Level, VersionInfo};
