//! Full-chain localization tests: synthesized plane-wave bursts through the
//! detection engine, with the telemetry line checked on the way out.

use approx::assert_abs_diff_eq;
use comms::{format_detection, parse_detection};
use detection::{DetectionEngine, DetectionResult, EngineConfig, Mode, TickOutcome};
use simulator::{ChannelNoise, PingScene, ToneBurst};

const TARGET_KHZ: u32 = 30;

fn scene(amplitude: f64, bearing_xy: (f64, f64)) -> PingScene {
    let config = EngineConfig::default();
    let (x, y) = bearing_xy;
    let z = (1.0 - x * x - y * y).sqrt();
    PingScene {
        burst: ToneBurst {
            frequency_hz: (TARGET_KHZ * 1000) as f64,
            amplitude,
            phase: 0.3,
            start_tick: 200,
            duration_ticks: 1_000,
        },
        bearing: [x, y, z],
        geometry: config.geometry,
        sampling_rate_hz: config.sampling_rate_hz,
    }
}

fn run(scene: &PingScene, noise_sigma: f64, seed: u64, ticks: u64) -> Vec<DetectionResult> {
    let config = EngineConfig::default();
    let mut engine = DetectionEngine::new(TARGET_KHZ, config).unwrap();
    let mut noise = ChannelNoise::new(noise_sigma, seed);

    let mut detections = Vec::new();
    for tick in 0..ticks {
        let mut samples = scene.samples_at(tick);
        let noise_samples: [f32; 4] = noise.sample_channels();
        for (sample, n) in samples.iter_mut().zip(noise_samples) {
            *sample += n;
        }
        if let TickOutcome::Detection(result) = engine.process(samples) {
            detections.push(result);
        }
    }
    detections
}

#[test]
fn test_clean_ping_recovers_bearing() {
    let truth = (0.3, 0.2);
    let scene = scene(0.1, truth);
    let detections = run(&scene, 0.0, 0, 3_200);

    assert_eq!(detections.len(), 1);
    let result = &detections[0];
    assert_abs_diff_eq!(result.bearing[0], truth.0 as f32, epsilon = 0.01);
    assert_abs_diff_eq!(result.bearing[1], truth.1 as f32, epsilon = 0.01);
    assert_abs_diff_eq!(result.bearing[2], scene.bearing[2] as f32, epsilon = 0.01);

    // The result survives the trip over the telemetry link.
    let parsed = parse_detection(&format_detection(result)).unwrap();
    assert_abs_diff_eq!(parsed.bearing[0], result.bearing[0], epsilon = 1e-6);
    assert_abs_diff_eq!(parsed.phase_deltas[2], result.phase_deltas[2], epsilon = 1e-6);
}

#[test]
fn test_noisy_ping_still_detected() {
    let truth = (-0.25, 0.4);
    let scene = scene(0.1, truth);
    // Sigma a tenth of the burst amplitude.
    let detections = run(&scene, 0.01, 7, 3_200);

    assert_eq!(detections.len(), 1);
    let result = &detections[0];
    assert_abs_diff_eq!(result.bearing[0], truth.0 as f32, epsilon = 0.05);
    assert_abs_diff_eq!(result.bearing[1], truth.1 as f32, epsilon = 0.05);
}

#[test]
fn test_quiet_ping_is_ignored() {
    // Steady-state tone energy for 0.02 V stays under the 0.03 V lo tier.
    let scene = scene(0.02, (0.3, 0.2));
    let detections = run(&scene, 0.0, 0, 3_200);
    assert!(detections.is_empty());
}

#[test]
fn test_engine_sleeps_after_detection() {
    let scene = scene(0.1, (0.0, 0.0));
    let config = EngineConfig::default();
    let mut engine = DetectionEngine::new(TARGET_KHZ, config).unwrap();

    let mut detected_at = None;
    for tick in 0..3_200u64 {
        if let TickOutcome::Detection(_) = engine.process(scene.samples_at(tick)) {
            detected_at = Some(tick);
            break;
        }
    }
    let detected_at = detected_at.expect("burst should be detected");
    assert!(detected_at > scene.burst.start_tick);

    // 250 ms of cooldown at 111 kHz lasts far past the end of this run.
    for tick in detected_at + 1..detected_at + 1_000 {
        assert_eq!(engine.process(scene.samples_at(tick)), TickOutcome::Quiet);
        assert!(matches!(
            engine.mode(),
            Mode::SleepingHi | Mode::SleepingLo
        ));
    }
}
