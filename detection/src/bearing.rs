//! Phase-difference geometry for the square hydrophone array.
//!
//! Converts the four wrapped inter-channel phase differences into a 3D
//! direction estimate. With hydrophones spaced less than half a wavelength
//! apart, the phase delta between adjacent corners is proportional to the
//! in-plane component of the arrival direction along that edge.

use std::f32::consts::PI;

use crate::config::ArrayGeometry;

/// Wrap a phase difference into (-pi, pi] with at most one 2*pi correction.
///
/// Inputs come from differencing two atan2 results, so they are always within
/// (-2*pi, 2*pi) and a single correction suffices.
pub fn wrap_phase(radians: f32) -> f32 {
    if radians > PI {
        radians - 2.0 * PI
    } else if radians < -PI {
        radians + 2.0 * PI
    } else {
        radians
    }
}

/// Compute the bearing vector from wrapped phase deltas.
///
/// `phase_deltas[i]` is the wrapped difference `phase[i] - phase[(i + 1) % 4]`
/// in channel order front-left, front-right, back-right, back-left. The x
/// component points forward and y to starboard in the array frame.
///
/// The z component is `sqrt(max(0, 1 - x^2 - y^2))`: the radicand is clamped
/// at zero for near-planar or out-of-range arrivals, and the result is not
/// renormalized to unit length. Callers needing a true unit vector must
/// normalize themselves.
pub fn bearing_from_phase_deltas(
    phase_deltas: [f32; 4],
    geometry: &ArrayGeometry,
    signal_hz: u32,
) -> [f32; 3] {
    let scale = geometry.speed_of_sound
        / (4.0 * PI * signal_hz as f32 * geometry.side_length);
    let x = (phase_deltas[3] - phase_deltas[1]) * scale;
    let y = (phase_deltas[0] - phase_deltas[2]) * scale;
    let radicand = 1.0 - x * x - y * y;
    let z = if radicand < 0.0 { 0.0 } else { radicand.sqrt() };
    [x, y, z]
}
