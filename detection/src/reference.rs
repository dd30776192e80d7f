//! Quadrature reference tables for single-frequency correlation.
//!
//! One window (exactly 1 ms of samples) of precomputed sine and cosine values
//! at the target frequency. Because the window is 1 ms, the tables are
//! periodic only when both the target and sampling frequencies are integer
//! multiples of 1000 Hz; construction rejects anything else rather than
//! silently building an aliased table.

use std::f64::consts::TAU;

use crate::config::ConfigError;

/// Precomputed sin/cos lookup tables covering one correlation window.
///
/// Immutable after construction; rebuilt from scratch whenever the target
/// frequency changes.
#[derive(Debug, Clone)]
pub struct QuadratureReference {
    sin_table: Vec<f32>,
    cos_table: Vec<f32>,
    target_hz: u32,
    sampling_hz: u32,
}

impl QuadratureReference {
    /// Build reference tables for `target_hz` sampled at `sampling_hz`.
    ///
    /// Both frequencies must be nonzero multiples of 1000 Hz. Values are
    /// computed in f64 and stored as f32 so table error stays well below
    /// sample quantization.
    pub fn new(target_hz: u32, sampling_hz: u32) -> Result<Self, ConfigError> {
        if target_hz == 0 || target_hz % 1000 != 0 {
            return Err(ConfigError::NonPeriodicFrequency { hz: target_hz });
        }
        if sampling_hz == 0 || sampling_hz % 1000 != 0 {
            return Err(ConfigError::NonPeriodicFrequency { hz: sampling_hz });
        }

        let window_len = (sampling_hz / 1000) as usize;
        let mut sin_table = Vec::with_capacity(window_len);
        let mut cos_table = Vec::with_capacity(window_len);
        for i in 0..window_len {
            let angle = TAU * target_hz as f64 * i as f64 / sampling_hz as f64;
            sin_table.push(angle.sin() as f32);
            cos_table.push(angle.cos() as f32);
        }

        Ok(Self {
            sin_table,
            cos_table,
            target_hz,
            sampling_hz,
        })
    }

    /// Samples per window.
    pub fn window_len(&self) -> usize {
        self.sin_table.len()
    }

    /// Target (pinger) frequency in Hz.
    pub fn target_hz(&self) -> u32 {
        self.target_hz
    }

    /// Sampling frequency in Hz.
    pub fn sampling_hz(&self) -> u32 {
        self.sampling_hz
    }

    /// Sine reference value for a window slot.
    pub fn sin_at(&self, slot: usize) -> f32 {
        self.sin_table[slot]
    }

    /// Cosine reference value for a window slot.
    pub fn cos_at(&self, slot: usize) -> f32 {
        self.cos_table[slot]
    }
}
