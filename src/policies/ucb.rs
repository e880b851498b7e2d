use rand::RngCore;

use super::stats::{self, ArmStats};
use super::{argmax, round_robin};
use crate::error::{BanditError, Result};
use crate::policy::Policy;
use crate::session::SessionView;

/// Upper Confidence Bound (UCB1) policy with a Hoeffding bonus
///
/// After pulling every arm once, this policy picks the arm maximising
/// `mean + sqrt(alpha * ln(t - 1) / (2 * n))`, where `t - 1` is the number of
/// turns played so far and `n` the arm's pull count. Arms with higher
/// uncertainty or higher average rewards are more likely to be selected.
#[derive(Clone, Debug)]
pub struct Ucb {
    /// Exploration constant (canonically 2)
    alpha: f64,
    /// Statistics for each arm
    arm_stats: Vec<ArmStats>,
}

impl Ucb {
    /// Creates a new UCB1 policy with the given exploration constant
    ///
    /// # Arguments
    /// * `alpha` - Exploration constant; higher values encourage more exploration
    pub fn new(alpha: f64) -> Result<Self> {
        if !(alpha > 0.0 && alpha.is_finite()) {
            return Err(BanditError::invalid(format!(
                "alpha must be positive, got {alpha}"
            )));
        }
        Ok(Self {
            alpha,
            arm_stats: Vec::new(),
        })
    }

    /// Gets the exploration constant
    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Upper confidence index of `arm` after `played` turns.
    ///
    /// Unpulled arms have an infinite index.
    pub fn index(&self, arm: usize, played: usize) -> f64 {
        let Some(s) = self.arm_stats.get(arm) else {
            return f64::NAN;
        };
        if s.pulls == 0 {
            return f64::INFINITY;
        }
        let bonus = (self.alpha * (played as f64).ln() / (2.0 * s.pulls as f64)).sqrt();
        s.average_reward() + bonus
    }

    /// Gets the pull count and average reward of an arm
    pub fn arm_stats(&self, arm: usize) -> Option<(usize, f64)> {
        self.arm_stats
            .get(arm)
            .map(|s| (s.pulls, s.average_reward()))
    }
}

impl Policy for Ucb {
    fn name(&self) -> &'static str {
        "ucb1"
    }

    fn initialize(&mut self, arm_count: usize, _turns: usize) -> Result<()> {
        self.arm_stats = ArmStats::table(arm_count);
        Ok(())
    }

    fn decide(&mut self, view: &SessionView<'_>, _rng: &mut dyn RngCore) -> Result<usize> {
        let arm_count = view.arm_count();
        if view.turn() <= arm_count {
            return Ok(round_robin(view));
        }
        let played = view.completed_turns();
        argmax((0..arm_count).map(|arm| self.index(arm, played))).ok_or(BanditError::EmptyArmSet)
    }

    fn observe(&mut self, arm: usize, outcome: f64) {
        stats::record(&mut self.arm_stats, arm, outcome);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policies::harness::Harness;
    use approx::assert_relative_eq;
    use rand::SeedableRng;

    #[test]
    fn test_alpha_validation() {
        assert_eq!(Ucb::new(2.0).unwrap().alpha(), 2.0);
        assert!(Ucb::new(0.0).is_err());
        assert!(Ucb::new(-1.0).is_err());
        assert!(Ucb::new(f64::NAN).is_err());
    }

    #[test]
    fn test_warm_up_pulls_each_arm_once_in_order() {
        let mut policy = Ucb::new(2.0).unwrap();
        let mut harness = Harness::new(&mut policy, 4, 100);
        let mut rng = rand::rngs::StdRng::seed_from_u64(42);

        let first: Vec<usize> = (0..4)
            .map(|_| harness.play(&mut policy, &[0.9, 0.1, 0.5, 0.3], &mut rng))
            .collect();
        assert_eq!(first, vec![1, 2, 3, 0]);
        for arm in 0..4 {
            assert_eq!(policy.arm_stats(arm).unwrap().0, 1);
        }
    }

    #[test]
    fn test_index_formula() {
        let mut policy = Ucb::new(2.0).unwrap();
        let mut harness = Harness::new(&mut policy, 2, 100);
        harness.record(&mut policy, 0, 1.0);
        harness.record(&mut policy, 1, 0.0);
        harness.record(&mut policy, 0, 0.0);

        // arm 0: mean 0.5, n = 2, three turns played
        let expected = 0.5 + (2.0 * 3.0_f64.ln() / 4.0).sqrt();
        assert_relative_eq!(policy.index(0, 3), expected);
        assert!(policy.index(1, 3) > 0.0);
    }

    #[test]
    fn test_unpulled_arm_has_infinite_index() {
        let mut policy = Ucb::new(2.0).unwrap();
        Harness::new(&mut policy, 2, 10);
        assert_eq!(policy.index(0, 5), f64::INFINITY);
    }

    #[test]
    fn test_deterministic_selection() {
        let mut policy = Ucb::new(2.0).unwrap();
        let mut harness = Harness::new(&mut policy, 3, 100);
        for (arm, reward) in [(0, 0.1), (1, 0.5), (2, 0.9), (0, 0.2), (1, 0.6), (2, 0.8)] {
            harness.record(&mut policy, arm, reward);
        }

        let mut rng1 = rand::rngs::StdRng::seed_from_u64(1);
        let mut rng2 = rand::rngs::StdRng::seed_from_u64(999);

        // UCB is deterministic - should select same arm regardless of RNG
        let choice1 = policy.decide(&harness.view(), &mut rng1).unwrap();
        let choice2 = policy.decide(&harness.view(), &mut rng2).unwrap();
        assert_eq!(choice1, choice2);
        assert_eq!(choice1, 2);
    }

    #[test]
    fn test_concentrates_on_best_arm() {
        let mut policy = Ucb::new(2.0).unwrap();
        let mut harness = Harness::new(&mut policy, 2, 3000);
        let mut rng = rand::rngs::StdRng::seed_from_u64(8);
        for _ in 0..3000 {
            harness.play(&mut policy, &[0.2, 0.8], &mut rng);
        }
        assert!(harness.pulls(1) > 2500);
    }
}
