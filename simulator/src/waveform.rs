//! Tone burst synthesis.

use std::f64::consts::TAU;

/// A single-frequency burst: silence before `start_tick`, a sinusoid for
/// `duration_ticks`, silence after.
#[derive(Debug, Clone, Copy)]
pub struct ToneBurst {
    /// Tone frequency, Hz.
    pub frequency_hz: f64,
    /// Peak amplitude, volts.
    pub amplitude: f64,
    /// Phase at tick zero, radians. Per-channel arrival offsets are added on
    /// top of this.
    pub phase: f64,
    /// First tick of the burst.
    pub start_tick: u64,
    /// Burst length in ticks.
    pub duration_ticks: u64,
}

impl ToneBurst {
    /// Sample the burst at an absolute tick with an extra phase offset.
    ///
    /// The argument is the absolute tick so that phase stays continuous over
    /// the life of the scene; channels differ only by their `phase_offset`.
    pub fn sample_at(&self, tick: u64, sampling_rate_hz: u32, phase_offset: f64) -> f32 {
        if tick < self.start_tick || tick >= self.start_tick + self.duration_ticks {
            return 0.0;
        }
        let t = tick as f64 / sampling_rate_hz as f64;
        (self.amplitude * (TAU * self.frequency_hz * t + self.phase + phase_offset).sin()) as f32
    }
}
