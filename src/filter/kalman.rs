// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Scalar Kalman filter for smoothing noisy readings.
//!
//! Works in `no_std` and does not allocate memory. Used by the ADC demo to filter a light sensor
//! sampled once per second.

use micromath::F32Ext;

/// One-dimensional Kalman filter with a constant-state process model.
pub struct KalmanFilter {
    /// Measurement uncertainty (how much the sensor is expected to vary)
    err_measure: f32,
    /// Estimation uncertainty, updated every step
    err_estimate: f32,
    /// Process noise (how fast the true value is expected to move)
    q: f32,

    current_estimate: f32,
    last_estimate: f32,
    kalman_gain: f32,
}

impl KalmanFilter {
    /// Create a new filter.
    ///
    /// `mea_e`: measurement uncertainty
    /// `est_e`: initial estimation uncertainty
    /// `q`: process noise
    pub fn new(mea_e: f32, est_e: f32, q: f32) -> Self {
        Self {
            err_measure: mea_e,
            err_estimate: est_e,
            q,

            current_estimate: 0.0,
            last_estimate: 0.0,
            kalman_gain: 0.0,
        }
    }

    /// Feed one measurement and return the new estimate.
    pub fn update_estimate(&mut self, measurement: f32) -> f32 {
        self.kalman_gain = self.err_estimate / (self.err_estimate + self.err_measure);
        self.current_estimate =
            self.last_estimate + self.kalman_gain * (measurement - self.last_estimate);

        // Grow the uncertainty by how far the estimate just moved, scaled by process noise.
        self.err_estimate = (1.0 - self.kalman_gain) * self.err_estimate
            + (self.last_estimate - self.current_estimate).abs() * self.q;

        self.last_estimate = self.current_estimate;
        self.current_estimate
    }

    pub fn set_measurement_error(&mut self, mea_e: f32) {
        self.err_measure = mea_e;
    }

    pub fn set_estimate_error(&mut self, est_e: f32) {
        self.err_estimate = est_e;
    }

    pub fn set_process_noise(&mut self, q: f32) {
        self.q = q;
    }

    /// Gain applied by the most recent update.
    #[inline]
    pub fn kalman_gain(&self) -> f32 {
        self.kalman_gain
    }

    #[inline]
    pub fn estimate_error(&self) -> f32 {
        self.err_estimate
    }

    /// Latest estimate (0.0 before the first update).
    #[inline]
    pub fn estimate(&self) -> f32 {
        self.last_estimate
    }

    /// Restart the filter from a known value, keeping its tuning.
    pub fn reset(&mut self, initial: f32) {
        self.current_estimate = initial;
        self.last_estimate = initial;
        self.kalman_gain = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn first_update_matches_hand_computation() {
        let mut kf = KalmanFilter::new(1.0, 2.0, 0.01);
        let est = kf.update_estimate(100.0);

        // gain = 2 / (2 + 1)
        assert!(close(kf.kalman_gain(), 2.0 / 3.0));
        assert!(close(est, 200.0 / 3.0));
        // (1 - 2/3) * 2 + 66.67 * 0.01
        assert!(close(kf.estimate_error(), 2.0 / 3.0 + 2.0 / 3.0));
        assert!(close(kf.estimate(), est));
    }

    #[test]
    fn constant_input_converges() {
        let mut kf = KalmanFilter::new(1.0, 2.0, 0.01);
        let mut est = 0.0;
        for _ in 0..200 {
            est = kf.update_estimate(1234.0);
        }
        assert!((est - 1234.0).abs() < 1.0, "estimate {est}");
    }

    #[test]
    fn noisy_input_is_smoothed() {
        let mut kf = KalmanFilter::new(4.0, 4.0, 0.001);
        kf.reset(500.0);

        let mut max_dev: f32 = 0.0;
        for i in 0..100 {
            let noise = if i % 2 == 0 { 20.0 } else { -20.0 };
            let est = kf.update_estimate(500.0 + noise);
            if i > 20 {
                max_dev = max_dev.max((est - 500.0).abs());
            }
        }
        assert!(max_dev < 20.0, "filter did not attenuate noise: {max_dev}");
    }

    #[test]
    fn reset_keeps_tuning() {
        let mut kf = KalmanFilter::new(1.0, 2.0, 0.01);
        kf.update_estimate(10.0);
        kf.reset(42.0);
        assert_eq!(kf.estimate(), 42.0);
        assert_eq!(kf.kalman_gain(), 0.0);
        let est = kf.update_estimate(42.0);
        assert!(close(est, 42.0));
    }
}
