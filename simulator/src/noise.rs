//! Additive Gaussian channel noise.
//!
//! Seeded so that every test and tuning run is reproducible.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};

/// Zero-mean Gaussian noise source for one or more channels.
pub struct ChannelNoise {
    rng: ChaCha8Rng,
    dist: Option<Normal<f64>>,
}

impl ChannelNoise {
    /// Create a noise source with the given standard deviation in volts.
    ///
    /// A non-positive sigma produces a silent source, which lets callers
    /// treat "no noise" as sigma = 0 without special-casing.
    pub fn new(sigma_volts: f64, seed: u64) -> Self {
        let dist = (sigma_volts > 0.0)
            .then(|| Normal::new(0.0, sigma_volts))
            .transpose()
            .expect("sigma is positive and finite");
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            dist,
        }
    }

    /// Draw one noise sample.
    pub fn sample(&mut self) -> f32 {
        match &self.dist {
            Some(dist) => dist.sample(&mut self.rng) as f32,
            None => 0.0,
        }
    }

    /// Draw one noise sample per channel.
    pub fn sample_channels<const N: usize>(&mut self) -> [f32; N] {
        std::array::from_fn(|_| self.sample())
    }
}
