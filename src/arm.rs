//! Reward sources for discrete bandit sessions.
//!
//! An [`Arm`] wraps a stateless sampling function together with the optional
//! true statistics of its payout. The statistics are only read by the
//! session's regret accounting; policies never see an `Arm`, only the
//! outcomes it produced.

use std::fmt;
use std::sync::Arc;

use rand::RngCore;
use rand_distr::{Bernoulli, Distribution, Normal};

use crate::error::{BanditError, Result};

type Sampler = Arc<dyn Fn(&mut dyn RngCore) -> f64 + Send + Sync>;

#[derive(Clone)]
enum Payout {
    Bernoulli(Bernoulli),
    Normal(Normal<f64>),
    Custom(Sampler),
}

/// A single reward source (a "machine").
///
/// # Examples
///
/// ```
/// use banditry::Arm;
/// use rand::SeedableRng;
///
/// let arm = Arm::bernoulli(0.8).unwrap();
/// assert_eq!(arm.mean(), Some(0.8));
///
/// let mut rng = rand::rngs::StdRng::seed_from_u64(7);
/// let outcome = arm.sample(&mut rng);
/// assert!(outcome == 0.0 || outcome == 1.0);
/// ```
#[derive(Clone)]
pub struct Arm {
    payout: Payout,
    mean: Option<f64>,
    variance: Option<f64>,
}

impl fmt::Debug for Arm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.payout {
            Payout::Bernoulli(_) => "bernoulli",
            Payout::Normal(_) => "normal",
            Payout::Custom(_) => "custom",
        };
        f.debug_struct("Arm")
            .field("kind", &kind)
            .field("mean", &self.mean)
            .field("variance", &self.variance)
            .finish()
    }
}

impl Arm {
    /// Creates an arm paying 1 with probability `p` and 0 otherwise.
    pub fn bernoulli(p: f64) -> Result<Self> {
        let dist = Bernoulli::new(p)
            .map_err(|_| BanditError::invalid(format!("bernoulli p must be in [0, 1], got {p}")))?;
        Ok(Self {
            payout: Payout::Bernoulli(dist),
            mean: Some(p),
            variance: Some(p * (1.0 - p)),
        })
    }

    /// Creates an arm paying a normal variate with the given mean and standard deviation.
    pub fn normal(mean: f64, sd: f64) -> Result<Self> {
        if !mean.is_finite() || !sd.is_finite() || sd < 0.0 {
            return Err(BanditError::invalid(format!(
                "normal arm needs a finite mean and sd >= 0, got mean={mean}, sd={sd}"
            )));
        }
        let dist = Normal::new(mean, sd).map_err(|e| BanditError::invalid(e.to_string()))?;
        Ok(Self {
            payout: Payout::Normal(dist),
            mean: Some(mean),
            variance: Some(sd * sd),
        })
    }

    /// Creates an arm from an arbitrary sampling function with unknown statistics.
    ///
    /// Attach the true mean with [`Arm::with_mean`] if regret should be tracked.
    pub fn custom<F>(sampler: F) -> Self
    where
        F: Fn(&mut dyn RngCore) -> f64 + Send + Sync + 'static,
    {
        Self {
            payout: Payout::Custom(Arc::new(sampler)),
            mean: None,
            variance: None,
        }
    }

    /// Declares the true mean of the payout.
    pub fn with_mean(mut self, mean: f64) -> Result<Self> {
        if !mean.is_finite() {
            return Err(BanditError::invalid(format!(
                "arm mean must be finite, got {mean}"
            )));
        }
        self.mean = Some(mean);
        Ok(self)
    }

    /// Declares the true variance of the payout.
    pub fn with_variance(mut self, variance: f64) -> Result<Self> {
        if !variance.is_finite() || variance < 0.0 {
            return Err(BanditError::invalid(format!(
                "arm variance must be finite and >= 0, got {variance}"
            )));
        }
        self.variance = Some(variance);
        Ok(self)
    }

    /// Draws one outcome.
    pub fn sample(&self, rng: &mut dyn RngCore) -> f64 {
        match &self.payout {
            Payout::Bernoulli(dist) => {
                if dist.sample(rng) {
                    1.0
                } else {
                    0.0
                }
            }
            Payout::Normal(dist) => dist.sample(rng),
            Payout::Custom(sampler) => sampler(rng),
        }
    }

    /// True mean of the payout, if known.
    pub fn mean(&self) -> Option<f64> {
        self.mean
    }

    /// True variance of the payout, if known.
    pub fn variance(&self) -> Option<f64> {
        self.variance
    }
}

/// Builds one Bernoulli arm per probability.
pub fn bernoulli_arms(probabilities: &[f64]) -> Result<Vec<Arm>> {
    probabilities.iter().map(|&p| Arm::bernoulli(p)).collect()
}
