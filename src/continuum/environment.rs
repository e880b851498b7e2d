use rand::RngCore;
use rand_distr::{Distribution, Pareto};
use serde::{Deserialize, Serialize};

use super::Environment;
use crate::error::{BanditError, Result};

/// Locations of the two reward peaks.
pub const PEAKS: [f64; 2] = [0.4, 0.8];

/// Two equally high peaks on [0, 1] with optional heavy-tailed noise.
///
/// The expected reward at `x` is `a - min(|x - 0.4|, |x - 0.8|)`. With a
/// `tail` index the reward also carries centred Pareto noise
/// `P - tail / (tail - 1)` where `P ~ Pareto(1, tail)`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TwinPeaks {
    height: f64,
    tail: Option<f64>,
}

impl TwinPeaks {
    /// Peaks of height `height` with Pareto noise of tail index `tail > 1`.
    pub fn new(height: f64, tail: f64) -> Result<Self> {
        if !height.is_finite() {
            return Err(BanditError::invalid(format!(
                "peak height must be finite, got {height}"
            )));
        }
        if !(tail > 1.0 && tail.is_finite()) {
            return Err(BanditError::invalid(format!(
                "tail index must be greater than 1 for the noise to have a mean, got {tail}"
            )));
        }
        Ok(Self {
            height,
            tail: Some(tail),
        })
    }

    /// Deterministic rewards.
    pub fn noiseless(height: f64) -> Self {
        Self { height, tail: None }
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn tail(&self) -> Option<f64> {
        self.tail
    }

    /// Expected reward at `x`.
    pub fn mean(&self, x: f64) -> f64 {
        self.height - distance_to_peak(x)
    }

    /// Upper bound on the second moment of the noise.
    fn noise_variance_bound(&self) -> f64 {
        let floor = 1.0 / (36.0 * 2.0_f64.sqrt());
        match self.tail {
            Some(a) if a > 2.0 => (a / ((a - 1.0).powi(2) * (a - 2.0))).max(floor),
            _ => floor,
        }
    }

    /// Bound `nu` on the third absolute moment of the reward, used to scale
    /// zooming radii. Needs a tail index above 3 when the rewards are noisy.
    pub fn third_moment_bound(&self) -> Result<f64> {
        let a_hat = self.height.abs().max((self.height - PEAKS[0]).abs());
        let sigma = self.noise_variance_bound();
        let noise = match self.tail {
            None => 0.0,
            Some(a) if a > 3.0 => {
                2.0 * a * (a + 1.0) / ((a - 1.0).powi(3) * (a - 2.0) * (a - 3.0))
            }
            Some(a) => {
                return Err(BanditError::degenerate(format!(
                    "third moment of Pareto noise is infinite for tail index {a}"
                )));
            }
        };
        Ok(a_hat.powi(3) + noise + 3.0 * a_hat * sigma)
    }
}

impl Environment for TwinPeaks {
    fn reward(&self, x: f64, rng: &mut dyn RngCore) -> f64 {
        let noise = match self.tail {
            // the shape was validated at construction
            Some(a) => match Pareto::new(1.0, a) {
                Ok(pareto) => pareto.sample(rng) - a / (a - 1.0),
                Err(_) => 0.0,
            },
            None => 0.0,
        };
        self.mean(x) + noise
    }

    fn gap(&self, x: f64) -> Option<f64> {
        Some(distance_to_peak(x))
    }
}

fn distance_to_peak(x: f64) -> f64 {
    (x - PEAKS[0]).abs().min((x - PEAKS[1]).abs())
}
