//! Detection threshold and noise-margin tuning tool.
//!
//! Synthesizes a pinger burst arriving at the array from a chosen bearing and
//! runs it through the detection engine, reporting what the vehicle would
//! have sent over the link.
//!
//! # Usage
//!
//! ```bash
//! # Single scenario: did we detect it, and how far off was the bearing?
//! cargo run --release --bin pinger_tuning -- quick
//! cargo run --release --bin pinger_tuning -- quick -a 0.05 -n 0.02 --bearing 0.3,0.2
//!
//! # Detection rate across an amplitude sweep at fixed noise
//! cargo run --release --bin pinger_tuning -- sweep -p amplitude -n 0.01
//!
//! # Detection rate across a noise sweep at fixed amplitude
//! cargo run --release --bin pinger_tuning -- sweep -p noise -a 0.1
//! ```

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use comms::format_detection;
use detection::{DetectionEngine, DetectionResult, EngineConfig, TickOutcome};
use log::info;
use simulator::{ChannelNoise, PingScene, ToneBurst};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one scenario and print the outcome
    Quick {
        /// Burst amplitude in volts
        #[arg(short, long, default_value_t = 0.1)]
        amplitude: f64,

        /// Channel noise sigma in volts
        #[arg(short, long, default_value_t = 0.0)]
        noise: f64,

        /// Pinger frequency in kHz
        #[arg(short, long, default_value_t = 30)]
        frequency_khz: u32,

        /// True bearing as "x,y" in-plane components
        #[arg(long, default_value = "0.3,0.2", value_parser = parse_bearing)]
        bearing: (f64, f64),

        /// Noise seed
        #[arg(long, default_value_t = 42)]
        seed: u64,
    },
    /// Sweep a parameter and report the detection rate at each step
    Sweep {
        /// Parameter to sweep: amplitude or noise
        #[arg(short, long)]
        parameter: String,

        /// Fixed amplitude in volts (for noise sweeps)
        #[arg(short, long, default_value_t = 0.1)]
        amplitude: f64,

        /// Fixed noise sigma in volts (for amplitude sweeps)
        #[arg(short, long, default_value_t = 0.01)]
        noise: f64,

        /// Number of sweep steps
        #[arg(short, long, default_value_t = 10)]
        steps: usize,

        /// Trials per step (different noise seeds)
        #[arg(short, long, default_value_t = 20)]
        trials: usize,
    },
}

/// Parse "x,y" into in-plane bearing components.
fn parse_bearing(s: &str) -> Result<(f64, f64), String> {
    let parts: Vec<&str> = s.split(',').collect();
    if parts.len() != 2 {
        return Err("bearing must be in format 'x,y'".to_string());
    }
    let x: f64 = parts[0]
        .trim()
        .parse()
        .map_err(|_| "invalid x component".to_string())?;
    let y: f64 = parts[1]
        .trim()
        .parse()
        .map_err(|_| "invalid y component".to_string())?;
    if x * x + y * y > 1.0 {
        return Err("in-plane bearing components must satisfy x^2 + y^2 <= 1".to_string());
    }
    Ok((x, y))
}

fn build_scene(amplitude: f64, frequency_khz: u32, bearing: (f64, f64)) -> PingScene {
    let config = EngineConfig::default();
    let z = (1.0 - bearing.0 * bearing.0 - bearing.1 * bearing.1).sqrt();
    PingScene {
        burst: ToneBurst {
            frequency_hz: (frequency_khz * 1000) as f64,
            amplitude,
            phase: 0.0,
            start_tick: 200,
            duration_ticks: 1_000, // ~9 ms at 111 kHz
        },
        bearing: [bearing.0, bearing.1, z],
        geometry: config.geometry,
        sampling_rate_hz: config.sampling_rate_hz,
    }
}

/// Run one scene through a fresh engine and collect every detection.
fn run_scenario(scene: &PingScene, noise_sigma: f64, seed: u64) -> Result<Vec<DetectionResult>> {
    let config = EngineConfig {
        sampling_rate_hz: scene.sampling_rate_hz,
        geometry: scene.geometry,
        ..EngineConfig::default()
    };
    let khz = (scene.burst.frequency_hz / 1000.0) as u32;
    let mut engine = DetectionEngine::new(khz, config).context("building detection engine")?;
    let mut noise = ChannelNoise::new(noise_sigma, seed);

    let total_ticks = scene.burst.start_tick + scene.burst.duration_ticks + 2_000;
    let mut detections = Vec::new();
    for tick in 0..total_ticks {
        let mut samples = scene.samples_at(tick);
        let noise_samples: [f32; 4] = noise.sample_channels();
        for (sample, n) in samples.iter_mut().zip(noise_samples) {
            *sample += n;
        }
        if let TickOutcome::Detection(result) = engine.process(samples) {
            detections.push(result);
        }
    }
    Ok(detections)
}

fn bearing_error(result: &DetectionResult, truth: [f64; 3]) -> f64 {
    let dx = result.bearing[0] as f64 - truth[0];
    let dy = result.bearing[1] as f64 - truth[1];
    let dz = result.bearing[2] as f64 - truth[2];
    (dx * dx + dy * dy + dz * dz).sqrt()
}

fn quick(amplitude: f64, noise: f64, frequency_khz: u32, bearing: (f64, f64), seed: u64) -> Result<()> {
    let scene = build_scene(amplitude, frequency_khz, bearing);
    info!(
        "quick scenario: {frequency_khz} kHz, amplitude {amplitude} V, noise sigma {noise} V"
    );

    let detections = run_scenario(&scene, noise, seed)?;
    if detections.is_empty() {
        println!("no detection");
        return Ok(());
    }

    for result in &detections {
        print!("{}", format_detection(result));
        println!(
            "bearing error: {:.4} (truth {:.3?})",
            bearing_error(result, scene.bearing),
            scene.bearing
        );
    }
    Ok(())
}

fn sweep(parameter: &str, amplitude: f64, noise: f64, steps: usize, trials: usize) -> Result<()> {
    println!("{:>12} {:>10} {:>12}", parameter, "detected", "mean error");
    for step in 1..=steps {
        let (step_amplitude, step_noise) = match parameter {
            "amplitude" => (amplitude * step as f64 / steps as f64, noise),
            "noise" => (amplitude, noise * 2.0 * step as f64 / steps as f64),
            other => bail!("unknown sweep parameter {other:?} (try amplitude or noise)"),
        };

        let scene = build_scene(step_amplitude, 30, (0.3, 0.2));
        let mut detected = 0;
        let mut error_sum = 0.0;
        for trial in 0..trials {
            let detections = run_scenario(&scene, step_noise, trial as u64)?;
            if let Some(result) = detections.first() {
                detected += 1;
                error_sum += bearing_error(result, scene.bearing);
            }
        }

        let value = match parameter {
            "amplitude" => step_amplitude,
            _ => step_noise,
        };
        let mean_error = if detected > 0 {
            format!("{:.4}", error_sum / detected as f64)
        } else {
            "-".to_string()
        };
        println!("{value:>12.4} {detected:>7}/{trials:<2} {mean_error:>12}");
    }
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Quick {
            amplitude,
            noise,
            frequency_khz,
            bearing,
            seed,
        } => quick(amplitude, noise, frequency_khz, bearing, seed),
        Commands::Sweep {
            parameter,
            amplitude,
            noise,
            steps,
            trials,
        } => sweep(&parameter, amplitude, noise, steps, trials),
    }
}
