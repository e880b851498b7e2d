use rand::RngCore;

use super::stats::{self, ArmStats};
use super::{argmax, round_robin};
use crate::error::{BanditError, Result};
use crate::policy::Policy;
use crate::session::SessionView;

/// Explore-then-commit: cycle through the arms for a fixed number of turns,
/// then pull the arm with the best average reward for the rest of the session.
#[derive(Clone, Debug, Default)]
pub struct ExploreThenCommit {
    explore_turns: Option<usize>,
    resolved_turns: usize,
    arm_stats: Vec<ArmStats>,
    committed: Option<usize>,
}

impl ExploreThenCommit {
    /// Explores for the first half of the session.
    pub fn half() -> Self {
        Self::default()
    }

    /// Explores for exactly `explore_turns` turns.
    pub fn new(explore_turns: usize) -> Result<Self> {
        if explore_turns == 0 {
            return Err(BanditError::invalid("explore_turns must be at least 1"));
        }
        Ok(Self {
            explore_turns: Some(explore_turns),
            ..Self::default()
        })
    }

    /// Number of exploration turns in the current session.
    pub fn explore_turns(&self) -> usize {
        self.resolved_turns
    }

    /// The arm committed to, once exploration has ended.
    pub fn committed(&self) -> Option<usize> {
        self.committed
    }
}

impl Policy for ExploreThenCommit {
    fn name(&self) -> &'static str {
        "explore-then-commit"
    }

    fn initialize(&mut self, arm_count: usize, turns: usize) -> Result<()> {
        self.resolved_turns = self.explore_turns.unwrap_or(turns / 2);
        self.arm_stats = ArmStats::table(arm_count);
        self.committed = None;
        Ok(())
    }

    fn decide(&mut self, view: &SessionView<'_>, _rng: &mut dyn RngCore) -> Result<usize> {
        if view.turn() <= self.resolved_turns {
            return Ok(round_robin(view));
        }
        if let Some(arm) = self.committed {
            return Ok(arm);
        }
        let arm = argmax(self.arm_stats.iter().map(ArmStats::average_reward))
            .ok_or(BanditError::EmptyArmSet)?;
        log::debug!("committing to arm {} after {} turns", arm, view.completed_turns());
        self.committed = Some(arm);
        Ok(arm)
    }

    fn observe(&mut self, arm: usize, outcome: f64) {
        stats::record(&mut self.arm_stats, arm, outcome);
    }
}
