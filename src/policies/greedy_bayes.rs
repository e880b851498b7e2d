use rand::{Rng, RngCore};

use super::argmax;
use super::posterior::{BetaParams, Posteriors};
use crate::error::{BanditError, Result};
use crate::policy::Policy;
use crate::session::SessionView;

/// Greedy Bayesian policy over Beta posteriors.
///
/// Scores each arm by its posterior mean, or by the posterior quantile at
/// `quantile` when one is configured (an upper-confidence variant). The best
/// arm is pulled with probability `1 - threshold`; otherwise one of the
/// remaining arms is picked uniformly.
#[derive(Clone, Debug)]
pub struct GreedyBayes {
    threshold: f64,
    quantile: Option<f64>,
    posteriors: Posteriors,
}

impl GreedyBayes {
    /// Scores by posterior mean with uniform priors.
    pub fn new(threshold: f64) -> Result<Self> {
        Self::build(threshold, None, Posteriors::uniform())
    }

    /// Scores by the posterior quantile `quantile` with uniform priors.
    pub fn with_quantile(threshold: f64, quantile: f64) -> Result<Self> {
        Self::build(threshold, Some(quantile), Posteriors::uniform())
    }

    /// Replaces the priors with a copy of `priors`.
    pub fn with_priors(self, priors: &[BetaParams]) -> Self {
        Self {
            posteriors: Posteriors::with_prior(priors),
            ..self
        }
    }

    fn build(threshold: f64, quantile: Option<f64>, posteriors: Posteriors) -> Result<Self> {
        if !(0.0..=1.0).contains(&threshold) {
            return Err(BanditError::invalid(format!(
                "threshold must be in [0, 1], got {threshold}"
            )));
        }
        if let Some(q) = quantile {
            if !(q > 0.0 && q < 1.0) {
                return Err(BanditError::invalid(format!(
                    "quantile must be in (0, 1), got {q}"
                )));
            }
        }
        Ok(Self {
            threshold,
            quantile,
            posteriors,
        })
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn quantile(&self) -> Option<f64> {
        self.quantile
    }

    pub fn posteriors(&self) -> &[BetaParams] {
        self.posteriors.current()
    }

    /// Current score of every arm.
    pub fn scores(&self) -> Vec<f64> {
        self.posteriors
            .current()
            .iter()
            .map(|params| match self.quantile {
                Some(q) => params.quantile(q),
                None => params.mean(),
            })
            .collect()
    }
}

impl Policy for GreedyBayes {
    fn name(&self) -> &'static str {
        "greedy-bayes"
    }

    fn initialize(&mut self, arm_count: usize, _turns: usize) -> Result<()> {
        self.posteriors.initialize(arm_count)
    }

    fn decide(&mut self, view: &SessionView<'_>, rng: &mut dyn RngCore) -> Result<usize> {
        let best = argmax(self.scores()).ok_or(BanditError::EmptyArmSet)?;
        let arm_count = view.arm_count();
        if arm_count > 1 && rng.random::<f64>() < self.threshold {
            let other = rng.random_range(0..arm_count - 1);
            return Ok(if other >= best { other + 1 } else { other });
        }
        Ok(best)
    }

    fn observe(&mut self, arm: usize, outcome: f64) {
        self.posteriors.update(arm, outcome);
    }

    fn posterior(&self) -> Option<Vec<BetaParams>> {
        Some(self.posteriors.current().to_vec())
    }
}
