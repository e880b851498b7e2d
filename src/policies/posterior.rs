use rand::RngCore;
use rand_distr::{Beta, Distribution};
use serde::{Deserialize, Serialize};
use statrs::distribution::ContinuousCDF;

use crate::error::{BanditError, Result};

/// Shape parameters of a Beta belief over an arm's success probability.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BetaParams {
    pub alpha: f64,
    pub beta: f64,
}

impl BetaParams {
    /// Beta(1, 1), the uniform prior.
    pub const UNIFORM: BetaParams = BetaParams {
        alpha: 1.0,
        beta: 1.0,
    };

    pub fn new(alpha: f64, beta: f64) -> Result<Self> {
        let params = Self { alpha, beta };
        params.validate()?;
        Ok(params)
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.alpha > 0.0 && self.beta > 0.0 && self.alpha.is_finite() && self.beta.is_finite()
        {
            Ok(())
        } else {
            Err(BanditError::invalid(format!(
                "beta parameters must be positive and finite, got ({}, {})",
                self.alpha, self.beta
            )))
        }
    }

    pub fn mean(&self) -> f64 {
        self.alpha / (self.alpha + self.beta)
    }

    /// Draws one value from the distribution.
    pub fn sample(&self, rng: &mut dyn RngCore) -> f64 {
        match Beta::new(self.alpha, self.beta) {
            Ok(dist) => dist.sample(rng),
            // If Beta distribution creation fails, use mean
            Err(_) => self.mean(),
        }
    }

    /// Conjugate update with a reward in [0, 1].
    ///
    /// Rewards outside the unit interval are clamped, so a binary outcome
    /// adds one to exactly one of the two parameters.
    pub fn update(&mut self, reward: f64) {
        let reward = reward.clamp(0.0, 1.0);
        self.alpha += reward;
        self.beta += 1.0 - reward;
    }

    /// Value below which a fraction `q` of the probability mass lies.
    pub fn quantile(&self, q: f64) -> f64 {
        if q <= 0.0 {
            return 0.0;
        }
        if q >= 1.0 {
            return 1.0;
        }
        match statrs::distribution::Beta::new(self.alpha, self.beta) {
            Ok(dist) => dist.inverse_cdf(q),
            Err(_) => self.mean(),
        }
    }
}

impl Default for BetaParams {
    fn default() -> Self {
        Self::UNIFORM
    }
}

/// Per-arm Beta posteriors that start from an owned copy of a prior.
#[derive(Clone, Debug, Default)]
pub(crate) struct Posteriors {
    prior: Option<Vec<BetaParams>>,
    current: Vec<BetaParams>,
}

impl Posteriors {
    /// Uses Beta(1, 1) for every arm.
    pub fn uniform() -> Self {
        Self::default()
    }

    /// Copies `prior`; the caller's slice is never aliased.
    pub fn with_prior(prior: &[BetaParams]) -> Self {
        Self {
            prior: Some(prior.to_vec()),
            current: Vec::new(),
        }
    }

    pub fn initialize(&mut self, arm_count: usize) -> Result<()> {
        self.current = match &self.prior {
            None => vec![BetaParams::UNIFORM; arm_count],
            Some(prior) if prior.len() != arm_count => {
                return Err(BanditError::DimensionMismatch {
                    message: format!(
                        "{} prior parameter pairs for {} arms",
                        prior.len(),
                        arm_count
                    ),
                });
            }
            Some(prior) => {
                for params in prior {
                    params.validate()?;
                }
                prior.clone()
            }
        };
        Ok(())
    }

    pub fn prior(&self) -> Option<&[BetaParams]> {
        self.prior.as_deref()
    }

    pub fn current(&self) -> &[BetaParams] {
        &self.current
    }

    pub fn update(&mut self, arm: usize, reward: f64) {
        if let Some(params) = self.current.get_mut(arm) {
            params.update(reward);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use rand::SeedableRng;

    #[test]
    fn test_validation() {
        assert!(BetaParams::new(1.0, 1.0).is_ok());
        assert!(BetaParams::new(0.0, 1.0).is_err());
        assert!(BetaParams::new(2.0, f64::INFINITY).is_err());
        assert!(BetaParams::new(-1.0, 3.0).is_err());
    }

    #[test]
    fn test_binary_update() {
        let mut params = BetaParams::UNIFORM;
        params.update(1.0);
        params.update(0.0);
        params.update(1.0);
        assert_eq!(params, BetaParams::new(3.0, 2.0).unwrap());
        assert_abs_diff_eq!(params.mean(), 0.6);
    }

    #[test]
    fn test_update_clamps() {
        let mut params = BetaParams::UNIFORM;
        params.update(4.0);
        params.update(-2.0);
        assert_eq!(params, BetaParams::new(2.0, 2.0).unwrap());
    }

    #[test]
    fn test_samples_in_unit_interval() {
        let params = BetaParams::new(2.0, 5.0).unwrap();
        let mut rng = rand::rngs::StdRng::seed_from_u64(42);
        let n = 4000;
        let mut total = 0.0;
        for _ in 0..n {
            let x = params.sample(&mut rng);
            assert!((0.0..=1.0).contains(&x));
            total += x;
        }
        assert_abs_diff_eq!(total / n as f64, params.mean(), epsilon = 0.02);
    }

    #[test]
    fn test_quantiles() {
        // Beta(1, 1) is uniform
        assert_abs_diff_eq!(BetaParams::UNIFORM.quantile(0.3), 0.3, epsilon = 1e-6);
        // Beta(2, 1) has CDF x^2
        let rising = BetaParams::new(2.0, 1.0).unwrap();
        assert_abs_diff_eq!(rising.quantile(0.25), 0.5, epsilon = 1e-6);
        // Beta(1, 2) has CDF 1 - (1 - x)^2
        let falling = BetaParams::new(1.0, 2.0).unwrap();
        assert_abs_diff_eq!(falling.quantile(0.75), 0.5, epsilon = 1e-6);
        // symmetric median
        let symmetric = BetaParams::new(30.0, 30.0).unwrap();
        assert_abs_diff_eq!(symmetric.quantile(0.5), 0.5, epsilon = 1e-6);

        assert_eq!(rising.quantile(0.0), 0.0);
        assert_eq!(rising.quantile(1.0), 1.0);
    }

    #[test]
    fn test_quantile_is_monotone() {
        let params = BetaParams::new(3.0, 7.0).unwrap();
        let qs: Vec<f64> = [0.05, 0.25, 0.5, 0.75, 0.95]
            .iter()
            .map(|&q| params.quantile(q))
            .collect();
        for pair in qs.windows(2) {
            assert!(pair[1] > pair[0]);
        }
    }

    #[test]
    fn test_quantile_with_large_counts() {
        // near-normal posteriors after many observations
        let even = BetaParams::new(2e6, 2e6).unwrap();
        let sd = (0.25 / 4e6_f64).sqrt();
        assert_abs_diff_eq!((even.quantile(0.975) - 0.5) / sd, 1.96, epsilon = 0.01);

        let skewed = BetaParams::new(3e5, 1e5).unwrap();
        let sd = (0.75 * 0.25 / 4e5_f64).sqrt();
        assert_abs_diff_eq!((skewed.quantile(0.95) - 0.75) / sd, 1.645, epsilon = 0.01);

        // Beta(1, n) has CDF 1 - (1 - x)^n
        let sparse = BetaParams::new(1.0, 1e6).unwrap();
        let median = 1.0 - 0.5_f64.powf(1e-6);
        assert_abs_diff_eq!(sparse.quantile(0.5) / median, 1.0, epsilon = 1e-3);
    }

    #[test]
    fn test_posteriors_copy_prior() {
        let prior = vec![BetaParams::new(2.0, 3.0).unwrap(); 2];
        let mut first = Posteriors::with_prior(&prior);
        let mut second = Posteriors::with_prior(&prior);
        first.initialize(2).unwrap();
        second.initialize(2).unwrap();

        first.update(0, 1.0);
        assert_eq!(first.current()[0], BetaParams::new(3.0, 3.0).unwrap());
        assert_eq!(second.current()[0], prior[0]);
        assert_eq!(first.prior().unwrap(), prior.as_slice());
    }

    #[test]
    fn test_posteriors_initialize() {
        let mut uniform = Posteriors::uniform();
        uniform.initialize(3).unwrap();
        assert_eq!(uniform.current(), &[BetaParams::UNIFORM; 3]);

        let mut mismatched = Posteriors::with_prior(&[BetaParams::UNIFORM]);
        assert!(matches!(
            mismatched.initialize(2),
            Err(BanditError::DimensionMismatch { .. })
        ));

        let mut invalid = Posteriors::with_prior(&[BetaParams {
            alpha: 0.0,
            beta: 1.0,
        }]);
        assert!(matches!(
            invalid.initialize(1),
            Err(BanditError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_reinitialize_restores_prior() {
        let mut posteriors = Posteriors::uniform();
        posteriors.initialize(1).unwrap();
        posteriors.update(0, 1.0);
        posteriors.initialize(1).unwrap();
        assert_eq!(posteriors.current(), &[BetaParams::UNIFORM]);
    }
}
