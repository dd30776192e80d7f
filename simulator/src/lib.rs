//! Acoustic scene synthesis for the pinger locator.
//!
//! Generates the four-channel sample streams the detection engine consumes:
//! a tone burst arriving as a plane wave at the square hydrophone array from
//! a chosen bearing, optionally with additive Gaussian channel noise. Used by
//! the integration tests and the `pinger_tuning` binary; none of this runs on
//! the vehicle.

pub mod array;
pub mod noise;
pub mod waveform;

pub use array::PingScene;
pub use noise::ChannelNoise;
pub use waveform::ToneBurst;
