// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! # Signal Filters
//!
//! Reusable filters for noisy sensor readings.
//!
//! ## Modules
//!
//! - [`kalman`] - One-dimensional Kalman filter for scalar measurements (e.g. ADC samples).

pub mod kalman;

pub use kalman::KalmanFilter;
