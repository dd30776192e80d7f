//! Sliding-window tone correlation for a single hydrophone channel.
//!
//! Each channel keeps a ring buffer of the most recent window of samples plus
//! three running accumulators: the dot products of the window contents against
//! the sine and cosine reference tables, and the sum of squared samples. The
//! per-sample update is O(1) and algebraically equivalent to recomputing the
//! windowed dot products from scratch.
//!
//! The ring slot index is owned by the engine and shared by all four channels
//! so that every channel reads and writes the same slot number on every tick.

use crate::reference::QuadratureReference;

/// Per-hydrophone circular buffer and correlation accumulators.
#[derive(Debug, Clone)]
pub struct ChannelEstimator {
    buf: Vec<f32>,
    sin_accum: f32,
    cos_accum: f32,
    norm_accum: f32,
}

impl ChannelEstimator {
    /// Create a zeroed estimator for a window of `window_len` samples.
    pub fn new(window_len: usize) -> Self {
        Self {
            buf: vec![0.0; window_len],
            sin_accum: 0.0,
            cos_accum: 0.0,
            norm_accum: 0.0,
        }
    }

    /// Zero the buffer and all accumulators.
    ///
    /// Called at construction, on every frequency change, and after every
    /// trigger resolution to bound numerical drift in the running sums. The
    /// engine resets its shared slot index alongside.
    pub fn reset(&mut self) {
        self.buf.fill(0.0);
        self.sin_accum = 0.0;
        self.cos_accum = 0.0;
        self.norm_accum = 0.0;
    }

    /// Consume one sample at the shared ring slot, sliding the window by one.
    ///
    /// Removes the old slot contribution and adds the new one to each
    /// accumulator without rescanning the window.
    pub fn add(&mut self, sample: f32, slot: usize, reference: &QuadratureReference) {
        let old = self.buf[slot];
        self.norm_accum -= old * old;
        let diff = sample - old;
        self.sin_accum += diff * reference.sin_at(slot);
        self.cos_accum += diff * reference.cos_at(slot);
        self.buf[slot] = sample;
        self.norm_accum += sample * sample;
    }

    /// Squared magnitude of the correlation with the reference tone.
    ///
    /// For a full window of a pure tone of amplitude `A` this is
    /// `(A * window_len / 2)^2`.
    pub fn tone_energy(&self) -> f32 {
        self.sin_accum * self.sin_accum + self.cos_accum * self.cos_accum
    }

    /// Energy of the raw signal in the window, scaled so that a pure tone at
    /// the reference frequency reads the same as [`tone_energy`].
    ///
    /// [`tone_energy`]: ChannelEstimator::tone_energy
    pub fn total_energy(&self) -> f32 {
        self.norm_accum * self.buf.len() as f32 / 2.0
    }

    /// Instantaneous phase of the tone component, in (-pi, pi].
    ///
    /// Expensive relative to the accumulator updates; only call on a
    /// validated trigger, never per tick.
    pub fn phase(&self) -> f32 {
        self.sin_accum.atan2(self.cos_accum)
    }
}
