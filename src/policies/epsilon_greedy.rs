use rand::{Rng, RngCore};

use super::stats::{self, ArmStats};
use super::{argmax, round_robin};
use crate::error::{BanditError, Result};
use crate::policy::Policy;
use crate::session::SessionView;

/// Epsilon-greedy policy - explores with probability epsilon, exploits otherwise
///
/// The first `arm_count` turns pull every arm once round-robin; after that
/// the arm with the highest average reward is chosen with probability
/// `1 - epsilon` and a uniformly random arm otherwise.
#[derive(Clone, Debug)]
pub struct EpsilonGreedy {
    epsilon: f64,
    arm_stats: Vec<ArmStats>,
}

impl EpsilonGreedy {
    /// Creates a new EpsilonGreedy policy with the given epsilon
    pub fn new(epsilon: f64) -> Result<Self> {
        if !(0.0..=1.0).contains(&epsilon) {
            return Err(BanditError::invalid(format!(
                "epsilon must be between 0 and 1, got {epsilon}"
            )));
        }
        Ok(Self {
            epsilon,
            arm_stats: Vec::new(),
        })
    }

    /// Gets the epsilon value
    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    /// Gets the pull count and average reward of an arm
    pub fn arm_stats(&self, arm: usize) -> Option<(usize, f64)> {
        self.arm_stats
            .get(arm)
            .map(|s| (s.pulls, s.average_reward()))
    }

    /// Find the arm with highest average reward
    fn best_arm(&self) -> Option<usize> {
        argmax(self.arm_stats.iter().map(ArmStats::average_reward))
    }
}

impl Policy for EpsilonGreedy {
    fn name(&self) -> &'static str {
        "epsilon-greedy"
    }

    fn initialize(&mut self, arm_count: usize, _turns: usize) -> Result<()> {
        self.arm_stats = ArmStats::table(arm_count);
        Ok(())
    }

    fn decide(&mut self, view: &SessionView<'_>, rng: &mut dyn RngCore) -> Result<usize> {
        if view.turn() <= view.arm_count() {
            return Ok(round_robin(view));
        }

        // Explore with probability epsilon
        if rng.random::<f64>() < self.epsilon {
            return Ok(rng.random_range(0..view.arm_count()));
        }
        self.best_arm().ok_or(BanditError::EmptyArmSet)
    }

    fn observe(&mut self, arm: usize, outcome: f64) {
        stats::record(&mut self.arm_stats, arm, outcome);
    }
}
