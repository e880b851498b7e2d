use rand::RngCore;
use rand::distr::Distribution;
use rand::distr::weighted::WeightedIndex;

use super::posterior::{BetaParams, Posteriors};
use crate::error::{BanditError, Result};
use crate::policy::Policy;
use crate::session::SessionView;

/// Randomized probability matching (double sampling) with Beta posteriors.
///
/// Each turn draws `samples` Monte-Carlo values per arm. For every draw
/// index the arm with the largest value scores a win, and the next arm is
/// sampled with probability proportional to its wins, approximating the
/// posterior probability that each arm is the best one. Posterior updates
/// are the same conjugate updates Thompson Sampling uses.
#[derive(Clone, Debug)]
pub struct RandomizedProbabilityMatching {
    samples: usize,
    posteriors: Posteriors,
    wins: Vec<usize>,
}

impl RandomizedProbabilityMatching {
    /// Uniform Beta(1,1) priors and `samples` Monte-Carlo draws per arm.
    pub fn uniform(samples: usize) -> Result<Self> {
        Self::build(samples, Posteriors::uniform())
    }

    /// Starts from its own copy of `priors`, one pair per arm.
    pub fn with_priors(samples: usize, priors: &[BetaParams]) -> Result<Self> {
        Self::build(samples, Posteriors::with_prior(priors))
    }

    fn build(samples: usize, posteriors: Posteriors) -> Result<Self> {
        if samples == 0 {
            return Err(BanditError::invalid("samples must be at least 1"));
        }
        Ok(Self {
            samples,
            posteriors,
            wins: Vec::new(),
        })
    }

    pub fn samples(&self) -> usize {
        self.samples
    }

    pub fn posteriors(&self) -> &[BetaParams] {
        self.posteriors.current()
    }

    /// Win counts from the most recent decision.
    pub fn wins(&self) -> &[usize] {
        &self.wins
    }
}

impl Policy for RandomizedProbabilityMatching {
    fn name(&self) -> &'static str {
        "randomized-probability-matching"
    }

    fn initialize(&mut self, arm_count: usize, _turns: usize) -> Result<()> {
        self.wins = vec![0; arm_count];
        self.posteriors.initialize(arm_count)
    }

    fn decide(&mut self, _view: &SessionView<'_>, rng: &mut dyn RngCore) -> Result<usize> {
        let posteriors = self.posteriors.current();
        let draws: Vec<Vec<f64>> = posteriors
            .iter()
            .map(|params| (0..self.samples).map(|_| params.sample(rng)).collect())
            .collect();

        self.wins = vec![0; posteriors.len()];
        for j in 0..self.samples {
            let mut best = 0;
            for arm in 1..draws.len() {
                if draws[arm][j] > draws[best][j] {
                    best = arm;
                }
            }
            self.wins[best] += 1;
        }

        let dist = WeightedIndex::new(&self.wins)
            .map_err(|e| BanditError::degenerate(format!("probability matching weights: {e}")))?;
        Ok(dist.sample(rng))
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
    fn test_validation() {
        assert!(RandomizedProbabilityMatching::uniform(100).is_ok());
        assert!(matches!(
            RandomizedProbabilityMatching::uniform(0),
            Err(BanditError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_wins_sum_to_sample_count() {
        let mut policy = RandomizedProbabilityMatching::uniform(50).unwrap();
        let harness = Harness::new(&mut policy, 3, 10);
        let mut rng = rand::rngs::StdRng::seed_from_u64(3);
        policy.decide(&harness.view(), &mut rng).unwrap();
        assert_eq!(policy.wins().iter().sum::<usize>(), 50);
    }

    #[test]
    fn test_confident_posterior_wins_every_draw() {
        let priors = [
            BetaParams::new(1.0, 500.0).unwrap(),
            BetaParams::new(500.0, 1.0).unwrap(),
        ];
        let mut policy = RandomizedProbabilityMatching::with_priors(100, &priors).unwrap();
        let harness = Harness::new(&mut policy, 2, 10);
        let mut rng = rand::rngs::StdRng::seed_from_u64(3);
        for _ in 0..20 {
            assert_eq!(policy.decide(&harness.view(), &mut rng).unwrap(), 1);
        }
        assert_eq!(policy.wins(), &[0, 100]);
    }

    #[test]
    fn test_posterior_mass_tracks_pulls() {
        let priors = vec![BetaParams::UNIFORM; 3];
        let mut policy = RandomizedProbabilityMatching::with_priors(100, &priors).unwrap();
        let mut harness = Harness::new(&mut policy, 3, 200);
        let mut rng = rand::rngs::StdRng::seed_from_u64(19);

        for _ in 0..200 {
            harness.play(&mut policy, &[0.33, 0.55, 0.6], &mut rng);
            for (arm, params) in policy.posteriors().iter().enumerate() {
                assert_relative_eq!(params.alpha + params.beta, 2.0 + harness.pulls(arm) as f64);
            }
        }
    }

    #[test]
    fn test_learns_best_arm() {
        let mut policy = RandomizedProbabilityMatching::uniform(100).unwrap();
        let mut harness = Harness::new(&mut policy, 2, 1000);
        let mut rng = rand::rngs::StdRng::seed_from_u64(21);
        for _ in 0..1000 {
            harness.play(&mut policy, &[0.2, 0.8], &mut rng);
        }
        assert!(harness.pulls(1) > 900);
    }
}
