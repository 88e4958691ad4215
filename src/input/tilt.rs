//! Accelerometer tilt → horizontal axis
//!
//! The workshop boards steer by tilting an IMU. The raw X acceleration is
//! offset by a resting bias measured at startup, a deadzone removes drift,
//! and the remainder is scaled into -1.0..=1.0.

/// Default number of resting samples averaged for the bias
pub const CALIBRATION_SAMPLES: u32 = 30;
/// Tilt below this (m/s²) reads as centered
pub const TILT_DEADZONE: f32 = 0.8;
/// Tilt past the deadzone that maps to full deflection (m/s²)
pub const TILT_MAX: f32 = 6.0;

#[derive(Debug, Clone)]
pub struct TiltCalibrator {
    samples_needed: u32,
    samples_taken: u32,
    sum: f32,
    offset: f32,
    pub deadzone: f32,
    pub max: f32,
}

impl TiltCalibrator {
    pub fn new() -> Self {
        Self::with_samples(CALIBRATION_SAMPLES)
    }

    pub fn with_samples(samples: u32) -> Self {
        Self {
            samples_needed: samples.max(1),
            samples_taken: 0,
            sum: 0.0,
            offset: 0.0,
            deadzone: TILT_DEADZONE,
            max: TILT_MAX,
        }
    }

    /// Feed one resting sample. Returns true once calibration is complete.
    pub fn feed(&mut self, raw_x: f32) -> bool {
        if self.is_calibrated() {
            return true;
        }
        if raw_x.is_finite() {
            self.sum += raw_x;
            self.samples_taken += 1;
        }
        if self.is_calibrated() {
            self.offset = self.sum / self.samples_needed as f32;
            log::info!("Tilt calibrated, bias {:.2}", self.offset);
        }
        self.is_calibrated()
    }

    pub fn is_calibrated(&self) -> bool {
        self.samples_taken >= self.samples_needed
    }

    pub fn offset(&self) -> f32 {
        self.offset
    }

    /// Map a raw reading to the -1.0..=1.0 axis. Uncalibrated readers use a
    /// zero bias.
    pub fn axis(&self, raw_x: f32) -> f32 {
        if !raw_x.is_finite() {
            return 0.0;
        }
        let adjusted = raw_x - self.offset;
        if adjusted.abs() < self.deadzone {
            return 0.0;
        }
        if adjusted > 0.0 {
            ((adjusted - self.deadzone) / self.max).min(1.0)
        } else {
            ((adjusted + self.deadzone) / self.max).max(-1.0)
        }
    }
}

impl Default for TiltCalibrator {
    fn default() -> Self {
        Self::new()
    }
}
