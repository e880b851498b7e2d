use rand::RngCore;

use super::argmax;
use super::posterior::{BetaParams, Posteriors};
use crate::error::{BanditError, Result};
use crate::policy::Policy;
use crate::session::SessionView;

/// Thompson Sampling policy using Beta distribution
///
/// This policy maintains Beta posteriors for each arm, draws one sample from
/// each and pulls the arm with the largest draw. It's particularly effective
/// for binary reward scenarios.
#[derive(Clone, Debug, Default)]
pub struct ThompsonSampling {
    posteriors: Posteriors,
}

impl ThompsonSampling {
    /// Creates a new Thompson Sampling policy with uniform Beta(1,1) priors
    pub fn uniform() -> Self {
        Self::default()
    }

    /// Creates a policy starting from its own copy of `priors`, one pair per arm
    pub fn with_priors(priors: &[BetaParams]) -> Self {
        Self {
            posteriors: Posteriors::with_prior(priors),
        }
    }

    /// Gets the prior parameters, if they were given explicitly
    pub fn prior(&self) -> Option<&[BetaParams]> {
        self.posteriors.prior()
    }

    /// Gets the current posterior parameters
    pub fn posteriors(&self) -> &[BetaParams] {
        self.posteriors.current()
    }
}

impl Policy for ThompsonSampling {
    fn name(&self) -> &'static str {
        "thompson-sampling"
    }

    fn initialize(&mut self, arm_count: usize, _turns: usize) -> Result<()> {
        self.posteriors.initialize(arm_count)
    }

    fn decide(&mut self, _view: &SessionView<'_>, rng: &mut dyn RngCore) -> Result<usize> {
        let draws: Vec<f64> = self
            .posteriors
            .current()
            .iter()
            .map(|params| params.sample(rng))
            .collect();
        argmax(draws).ok_or(BanditError::EmptyArmSet)
    }

    fn observe(&mut self, arm: usize, outcome: f64) {
        self.posteriors.update(arm, outcome);
    }

    fn posterior(&self) -> Option<Vec<BetaParams>> {
        Some(self.posteriors.current().to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policies::harness::Harness;
    use approx::assert_relative_eq;
    use rand::SeedableRng;

    #[test]
    fn test_thompson_sampling_basic() {
        let mut policy = ThompsonSampling::uniform();
        let harness = Harness::new(&mut policy, 3, 10);
        let mut rng = rand::rngs::StdRng::seed_from_u64(42);

        let choice = policy.decide(&harness.view(), &mut rng).unwrap();
        assert!(choice < 3);
        assert_eq!(policy.posteriors(), &[BetaParams::UNIFORM; 3]);
        assert_eq!(policy.prior(), None);
    }

    #[test]
    fn test_thompson_sampling_learns_best_arm() {
        let mut policy = ThompsonSampling::uniform();
        let mut harness = Harness::new(&mut policy, 2, 1000);
        let mut rng = rand::rngs::StdRng::seed_from_u64(7);

        for _ in 0..1000 {
            harness.play(&mut policy, &[0.2, 0.8], &mut rng);
        }
        assert!(harness.pulls(1) > 900);
    }

    #[test]
    fn test_posterior_mass_tracks_pulls() {
        let priors = vec![
            BetaParams::new(1.0, 1.0).unwrap(),
            BetaParams::new(2.0, 5.0).unwrap(),
            BetaParams::new(0.5, 0.5).unwrap(),
        ];
        let mut policy = ThompsonSampling::with_priors(&priors);
        let mut harness = Harness::new(&mut policy, 3, 300);
        let mut rng = rand::rngs::StdRng::seed_from_u64(11);

        for _ in 0..300 {
            harness.play(&mut policy, &[0.33, 0.55, 0.6], &mut rng);
            for (arm, params) in policy.posteriors().iter().enumerate() {
                let prior_sum = priors[arm].alpha + priors[arm].beta;
                assert_relative_eq!(
                    params.alpha + params.beta,
                    prior_sum + harness.pulls(arm) as f64
                );
            }
        }
    }

    #[test]
    fn test_binary_rewards() {
        let mut policy = ThompsonSampling::uniform();
        let mut harness = Harness::new(&mut policy, 1, 10);
        harness.record(&mut policy, 0, 1.0);
        harness.record(&mut policy, 0, 0.0);
        harness.record(&mut policy, 0, 1.0);

        let params = policy.posteriors()[0];
        assert_eq!(params.alpha, 3.0);
        assert_eq!(params.beta, 2.0);
    }

    #[test]
    fn test_policies_from_one_prior_do_not_alias() {
        let priors = vec![BetaParams::UNIFORM; 2];
        let mut first = ThompsonSampling::with_priors(&priors);
        let mut second = ThompsonSampling::with_priors(&priors);
        let mut harness_a = Harness::new(&mut first, 2, 10);
        Harness::new(&mut second, 2, 10);

        harness_a.record(&mut first, 0, 1.0);
        harness_a.record(&mut first, 0, 1.0);

        assert_eq!(first.posteriors()[0], BetaParams::new(3.0, 1.0).unwrap());
        assert_eq!(second.posteriors()[0], BetaParams::UNIFORM);
        assert_eq!(priors[0], BetaParams::UNIFORM);
    }

    #[test]
    fn test_prior_count_must_match_arms() {
        let mut policy = ThompsonSampling::with_priors(&[BetaParams::UNIFORM; 2]);
        assert!(matches!(
            policy.initialize(3, 10),
            Err(BanditError::DimensionMismatch { .. })
        ));
    }
}
