use rand::RngCore;

use super::stats::{self, ArmStats};
use super::{argmax, round_robin};
use crate::error::{BanditError, Result};
use crate::policy::Policy;
use crate::session::SessionView;

/// UCB1-Normal, for rewards that are roughly normally distributed.
///
/// Every arm is first pulled twice round-robin so that a sample variance
/// exists. Afterwards any arm pulled fewer than `ceil(8 ln t)` times is
/// pulled (the lowest such index first); once all arms are above that floor
/// the arm maximising
///
/// ```text
/// mean + sqrt(16 * s² * ln(t - 1) / n)
/// ```
///
/// is chosen, where `s²` is the unbiased sample variance.
#[derive(Clone, Debug, Default)]
pub struct UcbNormal {
    arm_stats: Vec<ArmStats>,
}

impl UcbNormal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index of `arm` after `played` turns.
    ///
    /// Fails with [`BanditError::DegenerateStatistic`] for arms with fewer
    /// than two pulls.
    pub fn index(&self, arm: usize, played: usize) -> Result<f64> {
        let s = self
            .arm_stats
            .get(arm)
            .ok_or(BanditError::InvalidDecision {
                index: arm,
                arm_count: self.arm_stats.len(),
            })?;
        let variance = s.sample_variance()?;
        let n = s.pulls as f64;
        Ok(s.average_reward() + (16.0 * variance * (played as f64).ln() / n).sqrt())
    }

    /// Minimum pull count an arm needs at turn `turn` before it competes on its index.
    pub fn required_pulls(turn: usize) -> usize {
        (8.0 * (turn as f64).ln()).ceil().max(0.0) as usize
    }
}

impl Policy for UcbNormal {
    fn name(&self) -> &'static str {
        "ucb1-normal"
    }

    fn initialize(&mut self, arm_count: usize, _turns: usize) -> Result<()> {
        self.arm_stats = ArmStats::table(arm_count);
        Ok(())
    }

    fn decide(&mut self, view: &SessionView<'_>, _rng: &mut dyn RngCore) -> Result<usize> {
        let arm_count = view.arm_count();
        if view.turn() <= 2 * arm_count {
            return Ok(round_robin(view));
        }

        let required = Self::required_pulls(view.turn());
        if let Some(arm) = self.arm_stats.iter().position(|s| s.pulls < required) {
            return Ok(arm);
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
