// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Bus protocol helpers shared by the MCAL drivers and the demos.
//!
//! - [`lin`] - LIN protected identifiers, checksums and response encoding.
//! - [`lin_parser`] - byte-at-a-time LIN frame receiver.
//! - [`can_timing`] - bxCAN bit timing calculation.

pub mod can_timing;
pub mod lin;
pub mod lin_parser;

pub use can_timing::{Baudrate, BitTiming};
pub use lin::{ChecksumModel, Pid};
pub use lin_parser::Parser;
