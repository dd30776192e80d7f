//! Detection engine: four channel estimators driven by one shared ring slot,
//! gated by a dual-threshold trigger/validate/sleep state machine.
//!
//! The engine is single-owner and cooperative: exactly one caller invokes
//! [`DetectionEngine::process`] once per available four-channel sample. The
//! validate-and-emit branch of a trigger runs four `atan2` calls and takes
//! substantially longer than a normal tick, so the acquisition side may
//! re-invoke before the call returns; the `busy` flag rejects such re-entrant
//! calls outright (the sample is dropped, no state is touched). That skipped
//! tick is accepted backpressure, not an error.

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::bearing::{bearing_from_phase_deltas, wrap_phase};
use crate::config::{ConfigError, EngineConfig, ThresholdConfig};
use crate::estimator::ChannelEstimator;
use crate::reference::QuadratureReference;
use crate::CHANNEL_COUNT;

/// Detection state shared by all four channels.
///
/// There is no terminal state; the machine runs for the life of the process
/// and self-heals back to [`Mode::Listening`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Idle, watching tone energy against both thresholds.
    Listening,
    /// High-tier crossing seen; accumulating until the validation delay ends.
    TriggeredHi,
    /// Low-tier crossing seen; accumulating until the validation delay ends.
    TriggeredLo,
    /// Cooldown after a high-tier detection; incoming energy is ignored.
    SleepingHi,
    /// Cooldown after a low-tier detection; incoming energy is ignored.
    SleepingLo,
}

/// Result of a validated trigger.
///
/// Transient: produced on the tick that validates a detection, handed to the
/// messaging side, and discarded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionResult {
    /// Direction toward the pinger in the array frame. Not renormalized; the
    /// z component is clamped at zero for out-of-range arrivals.
    pub bearing: [f32; 3],
    /// Wrapped phase differences between adjacent channels, radians.
    pub phase_deltas: [f32; 4],
    /// Tone energy of the gating channel on the validating tick.
    pub tone_energy: f32,
}

/// Outcome of one engine tick.
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// The call re-entered while a previous tick was still running. The
    /// sample was dropped and no state was modified.
    Rejected,
    /// Sample consumed; nothing to report.
    Quiet,
    /// A trigger validated on this tick.
    Detection(DetectionResult),
}

/// The per-sample detection and direction-finding engine.
///
/// Owns all mutable state: estimators, the shared ring slot, the reference
/// tables, thresholds, and the state machine. Nothing here blocks and the
/// tick path never allocates.
pub struct DetectionEngine {
    config: EngineConfig,
    reference: QuadratureReference,
    channels: [ChannelEstimator; CHANNEL_COUNT],
    thresholds: ThresholdConfig,
    signal_hz: u32,
    trigger_delay_ticks: u32,
    sleep_ticks: u32,
    /// Ring slot shared by all four channels; advances once per tick after
    /// every channel has consumed its sample, wrapping modulo the window.
    slot: usize,
    mode: Mode,
    ticks_since_mode_change: u32,
    busy: bool,
}

impl DetectionEngine {
    /// Create an engine listening for `target_khz` with the given config.
    pub fn new(target_khz: u32, config: EngineConfig) -> Result<Self, ConfigError> {
        let signal_hz = target_khz * 1000;
        let reference = QuadratureReference::new(signal_hz, config.sampling_rate_hz)?;
        let window_len = reference.window_len();
        let thresholds = ThresholdConfig::new(
            config.hi_threshold_volts,
            config.lo_threshold_volts,
            window_len,
        );

        Ok(Self {
            reference,
            channels: std::array::from_fn(|_| ChannelEstimator::new(window_len)),
            thresholds,
            signal_hz,
            trigger_delay_ticks: config.trigger_delay_ticks(),
            sleep_ticks: config.sleep_ticks(),
            slot: 0,
            mode: Mode::Listening,
            ticks_since_mode_change: 0,
            busy: false,
            config,
        })
    }

    /// Current state machine mode.
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Frequency currently being listened for, Hz.
    pub fn signal_hz(&self) -> u32 {
        self.signal_hz
    }

    /// Current thresholds.
    pub fn thresholds(&self) -> &ThresholdConfig {
        &self.thresholds
    }

    /// Retune to a new pinger frequency in kHz.
    ///
    /// Rebuilds the reference tables, zeroes all four estimators and the
    /// shared slot, and drops any in-progress trigger by returning to
    /// [`Mode::Listening`].
    pub fn set_target_frequency(&mut self, target_khz: u32) -> Result<(), ConfigError> {
        let signal_hz = target_khz * 1000;
        self.reference = QuadratureReference::new(signal_hz, self.config.sampling_rate_hz)?;
        self.signal_hz = signal_hz;
        self.reset_channels();
        self.enter(Mode::Listening);
        info!("retuned to {target_khz} kHz");
        Ok(())
    }

    /// Replace both trigger thresholds (volts). Affects only future decisions.
    pub fn set_thresholds(&mut self, hi_volts: f32, lo_volts: f32) {
        self.thresholds
            .set(hi_volts, lo_volts, self.reference.window_len());
        info!("thresholds set to hi {hi_volts} V / lo {lo_volts} V");
    }

    /// Change the hydrophone spacing used for bearing computation, inches.
    pub fn set_side_length(&mut self, inches: f32) -> Result<(), ConfigError> {
        if !(inches > 0.0) {
            return Err(ConfigError::NonPositiveSideLength { inches });
        }
        self.config.geometry.side_length = inches;
        info!("array side length set to {inches} in");
        Ok(())
    }

    /// Consume one four-channel sample tuple (channel order front-left,
    /// front-right, back-right, back-left) and advance the state machine.
    ///
    /// Must be called exactly once per available sample. Returns
    /// [`TickOutcome::Rejected`] without touching any state if a previous
    /// invocation has not yet returned.
    pub fn process(&mut self, samples: [f32; CHANNEL_COUNT]) -> TickOutcome {
        if self.busy {
            return TickOutcome::Rejected;
        }
        self.busy = true;

        for (channel, sample) in self.channels.iter_mut().zip(samples) {
            channel.add(sample, self.slot, &self.reference);
        }
        self.slot += 1;
        if self.slot == self.reference.window_len() {
            self.slot = 0;
        }

        // All four channels see the same acoustic event, so channel 0 alone
        // gates the state machine.
        let tone_energy = self.channels[0].tone_energy();
        self.ticks_since_mode_change += 1;

        let outcome = match self.mode {
            Mode::Listening => {
                if tone_energy > self.thresholds.normalized_hi() {
                    self.enter(Mode::TriggeredHi);
                } else if tone_energy > self.thresholds.normalized_lo() {
                    self.enter(Mode::TriggeredLo);
                }
                TickOutcome::Quiet
            }
            Mode::TriggeredHi | Mode::TriggeredLo => self.validate_trigger(tone_energy),
            Mode::SleepingHi | Mode::SleepingLo => {
                if self.ticks_since_mode_change > self.sleep_ticks {
                    self.enter(Mode::Listening);
                }
                TickOutcome::Quiet
            }
        };

        self.busy = false;
        outcome
    }

    /// Resolve a provisional trigger once the validation delay has elapsed.
    ///
    /// Re-checks tone energy against the same tier that armed the trigger to
    /// guard against a transient spike that decayed before the window filled.
    fn validate_trigger(&mut self, tone_energy: f32) -> TickOutcome {
        if self.ticks_since_mode_change <= self.trigger_delay_ticks {
            return TickOutcome::Quiet;
        }

        let hi_tier = self.mode == Mode::TriggeredHi;
        let threshold = if hi_tier {
            self.thresholds.normalized_hi()
        } else {
            self.thresholds.normalized_lo()
        };

        if tone_energy > threshold {
            let result = self.take_reading(tone_energy);
            self.reset_channels();
            self.enter(if hi_tier {
                Mode::SleepingHi
            } else {
                Mode::SleepingLo
            });
            TickOutcome::Detection(result)
        } else {
            // Spike decayed before the window filled: discard and rearm.
            self.reset_channels();
            self.enter(Mode::Listening);
            TickOutcome::Quiet
        }
    }

    /// Compute phases, wrapped deltas, and the bearing. Runs overtime
    /// relative to a normal tick; only reached on a validated trigger.
    fn take_reading(&self, tone_energy: f32) -> DetectionResult {
        let mut phase = [0.0f32; CHANNEL_COUNT];
        for (value, channel) in phase.iter_mut().zip(&self.channels) {
            *value = channel.phase();
        }

        let mut phase_deltas = [0.0f32; CHANNEL_COUNT];
        for i in 0..CHANNEL_COUNT {
            phase_deltas[i] = wrap_phase(phase[i] - phase[(i + 1) % CHANNEL_COUNT]);
        }

        let bearing =
            bearing_from_phase_deltas(phase_deltas, &self.config.geometry, self.signal_hz);
        DetectionResult {
            bearing,
            phase_deltas,
            tone_energy,
        }
    }

    /// Zero every estimator and the shared slot, bounding accumulator drift.
    fn reset_channels(&mut self) {
        for channel in &mut self.channels {
            channel.reset();
        }
        self.slot = 0;
    }

    fn enter(&mut self, mode: Mode) {
        if mode != self.mode {
            debug!(
                "{:?} -> {:?} after {} ticks",
                self.mode, mode, self.ticks_since_mode_change
            );
        }
        self.mode = mode;
        self.ticks_since_mode_change = 0;
    }

    #[cfg(test)]
    fn tone_energies(&self) -> [f32; CHANNEL_COUNT] {
        std::array::from_fn(|i| self.channels[i].tone_energy())
    }

    #[cfg(test)]
    fn total_energies(&self) -> [f32; CHANNEL_COUNT] {
        std::array::from_fn(|i| self.channels[i].total_energy())
    }
}
