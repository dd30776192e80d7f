//! Plane-wave arrival model for the square hydrophone array.
//!
//! The array frame has x pointing forward, y to starboard, and hydrophones at
//! the square's corners in channel order front-left, front-right, back-right,
//! back-left. A plane wave from direction `u` (unit vector toward the source)
//! reaches hydrophones closer to the source earlier, giving each channel a
//! phase lead of `omega * (p_i . u) / c` where `p_i` is the corner position.
//! Spacing must stay under half a wavelength or the phase deltas wrap and the
//! bearing becomes ambiguous.

use std::f64::consts::TAU;

use detection::{ArrayGeometry, CHANNEL_COUNT};

use crate::waveform::ToneBurst;

/// Corner positions in units of half the side length: (forward, starboard),
/// channel order FL, FR, BR, BL.
const CORNERS: [(f64, f64); CHANNEL_COUNT] = [(1.0, -1.0), (1.0, 1.0), (-1.0, 1.0), (-1.0, -1.0)];

/// Per-channel phase leads for a plane wave arriving from `bearing`.
///
/// Only the in-plane components of the bearing matter for a planar array.
pub fn channel_phase_offsets(
    bearing: [f64; 3],
    geometry: &ArrayGeometry,
    frequency_hz: f64,
) -> [f64; CHANNEL_COUNT] {
    let half_side = geometry.side_length as f64 / 2.0;
    let omega_over_c = TAU * frequency_hz / geometry.speed_of_sound as f64;
    std::array::from_fn(|i| {
        let (fx, sy) = CORNERS[i];
        omega_over_c * half_side * (fx * bearing[0] + sy * bearing[1])
    })
}

/// A pinger burst arriving at the array from a known direction.
#[derive(Debug, Clone)]
pub struct PingScene {
    pub burst: ToneBurst,
    /// Unit vector toward the source in the array frame.
    pub bearing: [f64; 3],
    pub geometry: ArrayGeometry,
    pub sampling_rate_hz: u32,
}

impl PingScene {
    /// Noise-free four-channel sample tuple for one tick.
    pub fn samples_at(&self, tick: u64) -> [f32; CHANNEL_COUNT] {
        let offsets =
            channel_phase_offsets(self.bearing, &self.geometry, self.burst.frequency_hz);
        std::array::from_fn(|i| self.burst.sample_at(tick, self.sampling_rate_hz, offsets[i]))
    }
}
