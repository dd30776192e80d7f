//! Pinger detection and direction finding for a four-hydrophone square array.
//!
//! The engine consumes one calibrated four-channel voltage sample per tick and
//! looks for a narrow-band tone at a configured target frequency. Each channel
//! runs a sliding-window single-frequency correlator; a dual-threshold state
//! machine decides when a reading is trustworthy, and on a validated trigger
//! the inter-channel phase differences are converted into a 3D bearing toward
//! the pinger.
//!
//! The tick path is allocation-free and bounded: buffers are sized once when
//! the target frequency is configured, and every per-sample update is O(1).
//! The caller (typically an acquisition interrupt or polling loop) must invoke
//! [`DetectionEngine::process`] exactly once per available sample tuple and
//! must tolerate the occasional [`TickOutcome::Rejected`] while a validated
//! trigger is being resolved.

pub mod bearing;
pub mod config;
pub mod engine;
pub mod estimator;
pub mod reference;

pub use bearing::{bearing_from_phase_deltas, wrap_phase};
pub use config::{ArrayGeometry, ConfigError, EngineConfig, ThresholdConfig};
pub use engine::{DetectionEngine, DetectionResult, Mode, TickOutcome};
pub use estimator::ChannelEstimator;
pub use reference::QuadratureReference;

/// Number of hydrophones in the array.
///
/// Channel order everywhere in this crate is front-left, front-right,
/// back-right, back-left.
pub const CHANNEL_COUNT: usize = 4;
