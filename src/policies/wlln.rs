use rand::RngCore;

use super::stats::{self, ArmStats};
use super::{argmax, round_robin};
use crate::error::{BanditError, Result};
use crate::policy::Policy;
use crate::session::SessionView;

/// Large-sample confidence policy.
///
/// Each arm is pulled `explore_count` times in round-robin order. From then
/// on the arm maximising `mean + z * sd / sqrt(n)` is pulled, with `sd` the
/// standard deviation of the arm's observed rewards, as the weak law of large
/// numbers suggests for a normal-approximation confidence bound.
#[derive(Clone, Debug)]
pub struct Wlln {
    explore_count: usize,
    z: f64,
    arm_stats: Vec<ArmStats>,
}

impl Wlln {
    pub fn new(explore_count: usize, z: f64) -> Result<Self> {
        if explore_count == 0 {
            return Err(BanditError::invalid("explore_count must be at least 1"));
        }
        if !(z >= 0.0 && z.is_finite()) {
            return Err(BanditError::invalid(format!(
                "z must be a non-negative number, got {z}"
            )));
        }
        Ok(Self {
            explore_count,
            z,
            arm_stats: Vec::new(),
        })
    }

    pub fn score(&self, arm: usize) -> Result<f64> {
        let s = self
            .arm_stats
            .get(arm)
            .ok_or(BanditError::InvalidDecision {
                index: arm,
                arm_count: self.arm_stats.len(),
            })?;
        let sd = s.population_variance()?.sqrt();
        Ok(s.average_reward() + self.z * sd / (s.pulls as f64).sqrt())
    }
}

impl Policy for Wlln {
    fn name(&self) -> &'static str {
        "wlln"
    }

    fn initialize(&mut self, arm_count: usize, _turns: usize) -> Result<()> {
        self.arm_stats = ArmStats::table(arm_count);
        Ok(())
    }

    fn decide(&mut self, view: &SessionView<'_>, _rng: &mut dyn RngCore) -> Result<usize> {
        let arm_count = view.arm_count();
        if view.turn() <= arm_count * self.explore_count {
            return Ok(round_robin(view));
        }
        let scores = (0..arm_count)
            .map(|arm| self.score(arm))
            .collect::<Result<Vec<f64>>>()?;
        argmax(scores).ok_or(BanditError::EmptyArmSet)
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
    fn test_validation() {
        assert!(Wlln::new(10, 1.96).is_ok());
        assert!(Wlln::new(0, 1.96).is_err());
        assert!(Wlln::new(10, -1.0).is_err());
    }

    #[test]
    fn test_explores_round_robin() {
        let mut policy = Wlln::new(2, 1.96).unwrap();
        let mut harness = Harness::new(&mut policy, 3, 100);
        let mut rng = rand::rngs::StdRng::seed_from_u64(42);
        let first: Vec<usize> = (0..6)
            .map(|_| harness.play(&mut policy, &[0.3, 0.5, 0.7], &mut rng))
            .collect();
        assert_eq!(first, vec![1, 2, 0, 1, 2, 0]);
    }

    #[test]
    fn test_score() {
        let mut policy = Wlln::new(1, 2.0).unwrap();
        let mut harness = Harness::new(&mut policy, 1, 10);
        for reward in [1.0, 0.0, 1.0, 0.0] {
            harness.record(&mut policy, 0, reward);
        }
        // mean 0.5, sd 0.5, n 4
        assert_relative_eq!(policy.score(0).unwrap(), 0.5 + 2.0 * 0.5 / 2.0);
    }
}
