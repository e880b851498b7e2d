use rand::RngCore;

use super::stats::{self, ArmStats};
use super::{argmax, round_robin};
use crate::error::{BanditError, Result};
use crate::policy::Policy;
use crate::session::SessionView;

/// Largest variance a reward in [0, 1] can have.
const VARIANCE_CAP: f64 = 0.25;

/// UCB-Tuned: UCB1 with a variance-aware exploration bonus.
///
/// With `t` turns played and `n` pulls of an arm, the arm's variance bound is
/// `V = var + sqrt(2 ln t / n)` and its index is
/// `mean + sqrt(ln t / n * min(1/4, V))`.
#[derive(Clone, Debug, Default)]
pub struct UcbTuned {
    arm_stats: Vec<ArmStats>,
}

impl UcbTuned {
    pub fn new() -> Self {
        Self::default()
    }

    /// Upper bound on the variance of `arm` after `played` turns.
    pub fn variance_bound(&self, arm: usize, played: usize) -> Result<f64> {
        let s = self
            .arm_stats
            .get(arm)
            .ok_or(BanditError::InvalidDecision {
                index: arm,
                arm_count: self.arm_stats.len(),
            })?;
        let variance = s.population_variance()?;
        Ok(variance + (2.0 * (played as f64).ln() / s.pulls as f64).sqrt())
    }

    /// Index of `arm` after `played` turns.
    pub fn index(&self, arm: usize, played: usize) -> Result<f64> {
        let bound = self.variance_bound(arm, played)?;
        let s = &self.arm_stats[arm];
        let scale = (played as f64).ln() / s.pulls as f64;
        Ok(s.average_reward() + (scale * bound.min(VARIANCE_CAP)).sqrt())
    }
}

impl Policy for UcbTuned {
    fn name(&self) -> &'static str {
        "ucb-tuned"
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
        let indices = (0..arm_count)
            .map(|arm| self.index(arm, played))
            .collect::<Result<Vec<f64>>>()?;
        argmax(indices).ok_or(BanditError::EmptyArmSet)
    }

    fn observe(&mut self, arm: usize, outcome: f64) {
        stats::record(&mut self.arm_stats, arm, outcome);
    }
}
