use rand::RngCore;
use rand::distr::Distribution;
use rand::distr::weighted::WeightedIndex;

use crate::error::{BanditError, Result};
use crate::policy::Policy;
use crate::session::SessionView;

/// Exp3 (exponential weights for exploration and exploitation).
///
/// Keeps a vector of cumulative importance-weighted gains `G`. Each turn the
/// arm is drawn from
///
/// ```text
/// Phat = (1 - gamma) * softmax(eta * G) + gamma / K
/// ```
///
/// with `eta = gamma / K` and, unless overridden,
/// `gamma = min(1, sqrt(K ln K / ((e - 1) T)))`. Only the pulled arm's gain
/// moves, by `reward / Phat[arm]`.
#[derive(Clone, Debug, Default)]
pub struct Exp3 {
    gamma_override: Option<f64>,
    gamma: f64,
    eta: f64,
    gains: Vec<f64>,
    probabilities: Vec<f64>,
    pending: Option<(usize, f64)>,
    chosen_probabilities: Vec<f64>,
}

impl Exp3 {
    /// Derives `gamma` from the arm count and horizon.
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses a fixed exploration rate `gamma` in (0, 1].
    pub fn with_gamma(gamma: f64) -> Result<Self> {
        if !(gamma > 0.0 && gamma <= 1.0) {
            return Err(BanditError::invalid(format!(
                "gamma must be in (0, 1], got {gamma}"
            )));
        }
        Ok(Self {
            gamma_override: Some(gamma),
            ..Self::default()
        })
    }

    /// Exploration rate derived for `arm_count` arms over `turns` turns.
    pub fn default_gamma(arm_count: usize, turns: usize) -> f64 {
        let k = arm_count as f64;
        let t = turns as f64;
        let e = std::f64::consts::E;
        (k * k.ln() / ((e - 1.0) * t)).sqrt().min(1.0)
    }

    pub fn gamma(&self) -> f64 {
        self.gamma
    }

    pub fn eta(&self) -> f64 {
        self.eta
    }

    pub fn gains(&self) -> &[f64] {
        &self.gains
    }

    /// The mixed distribution `Phat` used for the latest draw.
    pub fn probabilities(&self) -> &[f64] {
        &self.probabilities
    }

    /// Probability the chosen arm had, for every turn so far.
    pub fn chosen_probabilities(&self) -> &[f64] {
        &self.chosen_probabilities
    }

    fn mixed_distribution(&self) -> Vec<f64> {
        let k = self.gains.len() as f64;
        let top = self.gains.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let weights: Vec<f64> = self
            .gains
            .iter()
            .map(|g| (self.eta * (g - top)).exp())
            .collect();
        let total: f64 = weights.iter().sum();
        weights
            .iter()
            .map(|w| (1.0 - self.gamma) * w / total + self.gamma / k)
            .collect()
    }
}

impl Policy for Exp3 {
    fn name(&self) -> &'static str {
        "exp3"
    }

    fn initialize(&mut self, arm_count: usize, turns: usize) -> Result<()> {
        self.gamma = self
            .gamma_override
            .unwrap_or_else(|| Self::default_gamma(arm_count, turns));
        self.eta = self.gamma / arm_count as f64;
        self.gains = vec![0.0; arm_count];
        self.probabilities = vec![1.0 / arm_count as f64; arm_count];
        self.pending = None;
        self.chosen_probabilities = Vec::with_capacity(turns);
        Ok(())
    }

    fn decide(&mut self, _view: &SessionView<'_>, rng: &mut dyn RngCore) -> Result<usize> {
        self.probabilities = self.mixed_distribution();
        let dist = WeightedIndex::new(&self.probabilities)
            .map_err(|e| BanditError::degenerate(format!("exp3 distribution: {e}")))?;
        let arm = dist.sample(rng);
        let probability = self.probabilities[arm];
        self.pending = Some((arm, probability));
        self.chosen_probabilities.push(probability);
        Ok(arm)
    }

    fn observe(&mut self, arm: usize, outcome: f64) {
        if let Some((chosen, probability)) = self.pending.take() {
            if chosen == arm {
                self.gains[arm] += outcome / probability;
            }
        }
    }
}
