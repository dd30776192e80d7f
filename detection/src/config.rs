//! Configuration for the detection engine.
//!
//! Thresholds are supplied in volts and pre-squared into the normalized form
//! the state machine compares against accumulator energy, so the per-tick
//! decision is a single comparison. The normalized values are always rederived
//! from the raw volts; nothing else writes them.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors produced when configuring the detection engine.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// The reference tables cover exactly 1 ms, so both the target and
    /// sampling frequencies must be integer multiples of 1000 Hz for the
    /// tables to be periodic over the window.
    #[error("{hz} Hz is not a nonzero multiple of 1000 Hz; reference tables would not be periodic over the 1 ms window")]
    NonPeriodicFrequency { hz: u32 },

    /// Hydrophone spacing must be a positive distance.
    #[error("side length must be positive, got {inches} in")]
    NonPositiveSideLength { inches: f32 },
}

/// Physical layout of the hydrophone array and the medium it sits in.
///
/// Units are inches and inches per second, matching the calibration of the
/// deployed array (0.65 in spacing, speed of sound in water 58425.2 in/s).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArrayGeometry {
    /// Speed of sound in the medium, inches per second.
    pub speed_of_sound: f32,
    /// Hydrophone spacing (side of the square), inches.
    pub side_length: f32,
}

impl Default for ArrayGeometry {
    fn default() -> Self {
        Self {
            speed_of_sound: 58_425.2,
            side_length: 0.65,
        }
    }
}

/// Engine-wide constants and tunables.
///
/// Defaults mirror the deployed hardware: 111 kHz sampling, a 1 ms validation
/// delay after a threshold crossing, a 250 ms post-detection sleep to let
/// reverberations die down, and 0.08 V / 0.03 V trigger tiers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Sample rate of the acquisition front end, Hz. Must be a multiple of
    /// 1000 Hz (the correlation window is exactly 1 ms of samples).
    pub sampling_rate_hz: u32,
    /// Time to keep accumulating after a threshold crossing before trusting
    /// the reading, seconds.
    pub trigger_delay_sec: f32,
    /// Post-detection cooldown during which new triggers are ignored, seconds.
    pub sleep_time_sec: f32,
    /// High-tier trigger threshold, volts.
    pub hi_threshold_volts: f32,
    /// Low-tier trigger threshold, volts.
    pub lo_threshold_volts: f32,
    /// Array layout and speed of sound.
    pub geometry: ArrayGeometry,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sampling_rate_hz: 111_000,
            trigger_delay_sec: 0.001,
            sleep_time_sec: 0.25,
            hi_threshold_volts: 0.08,
            lo_threshold_volts: 0.03,
            geometry: ArrayGeometry::default(),
        }
    }
}

impl EngineConfig {
    /// Samples per correlation window (1 ms worth).
    pub fn window_len(&self) -> usize {
        (self.sampling_rate_hz / 1000) as usize
    }

    /// Validation delay expressed in ticks.
    pub fn trigger_delay_ticks(&self) -> u32 {
        (self.trigger_delay_sec as f64 * self.sampling_rate_hz as f64) as u32
    }

    /// Post-detection sleep expressed in ticks.
    pub fn sleep_ticks(&self) -> u32 {
        (self.sleep_time_sec as f64 * self.sampling_rate_hz as f64) as u32
    }
}

/// Amplitude thresholds and their normalized-squared equivalents.
///
/// A pure tone of amplitude `A` correlated over a full window of `N` samples
/// produces a tone energy of `(A * N / 2)^2`, so a threshold of `v` volts
/// normalizes to `v^2 * N^2 / 4` in energy units. The normalized fields are
/// derived and private; mutate only through [`ThresholdConfig::set`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThresholdConfig {
    hi_volts: f32,
    lo_volts: f32,
    normalized_hi: f32,
    normalized_lo: f32,
}

impl ThresholdConfig {
    /// Build thresholds for a window of `window_len` samples.
    pub fn new(hi_volts: f32, lo_volts: f32, window_len: usize) -> Self {
        let mut thresholds = Self {
            hi_volts: 0.0,
            lo_volts: 0.0,
            normalized_hi: 0.0,
            normalized_lo: 0.0,
        };
        thresholds.set(hi_volts, lo_volts, window_len);
        thresholds
    }

    /// Replace both thresholds, rederiving the normalized forms.
    pub fn set(&mut self, hi_volts: f32, lo_volts: f32, window_len: usize) {
        let n = window_len as f32;
        self.hi_volts = hi_volts;
        self.lo_volts = lo_volts;
        self.normalized_hi = hi_volts * hi_volts * n * n / 4.0;
        self.normalized_lo = lo_volts * lo_volts * n * n / 4.0;
    }

    /// High-tier threshold, volts.
    pub fn hi_volts(&self) -> f32 {
        self.hi_volts
    }

    /// Low-tier threshold, volts.
    pub fn lo_volts(&self) -> f32 {
        self.lo_volts
    }

    /// High-tier threshold in tone-energy units.
    pub fn normalized_hi(&self) -> f32 {
        self.normalized_hi
    }

    /// Low-tier threshold in tone-energy units.
    pub fn normalized_lo(&self) -> f32 {
        self.normalized_lo
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_default_config_window() {
        let config = EngineConfig::default();
        assert_eq!(config.window_len(), 111);
        assert_eq!(config.trigger_delay_ticks(), 111);
        assert_eq!(config.sleep_ticks(), 27_750);
    }

    #[test]
    fn test_threshold_normalization() {
        let thresholds = ThresholdConfig::new(0.08, 0.03, 111);
        // v^2 * N^2 / 4
        assert_relative_eq!(
            thresholds.normalized_hi(),
            0.08 * 0.08 * 111.0 * 111.0 / 4.0,
            epsilon = 1e-3
        );
        assert_relative_eq!(
            thresholds.normalized_lo(),
            0.03 * 0.03 * 111.0 * 111.0 / 4.0,
            epsilon = 1e-3
        );
    }

    #[test]
    fn test_set_rederives_normalized() {
        let mut thresholds = ThresholdConfig::new(0.08, 0.03, 100);
        thresholds.set(0.5, 0.1, 100);
        assert_eq!(thresholds.hi_volts(), 0.5);
        assert_relative_eq!(thresholds.normalized_hi(), 0.25 * 10_000.0 / 4.0);
        assert_relative_eq!(thresholds.normalized_lo(), 0.01 * 10_000.0 / 4.0);
    }
}
