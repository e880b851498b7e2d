use rand::{Rng, RngCore};

use crate::error::Result;
use crate::policy::Policy;
use crate::session::SessionView;

/// Random selection policy - selects arms uniformly at random
#[derive(Clone, Copy, Debug, Default)]
pub struct Random;

impl Policy for Random {
    fn name(&self) -> &'static str {
        "random"
    }

    fn initialize(&mut self, _arm_count: usize, _turns: usize) -> Result<()> {
        // No state to reset
        Ok(())
    }

    fn decide(&mut self, view: &SessionView<'_>, rng: &mut dyn RngCore) -> Result<usize> {
        Ok(rng.random_range(0..view.arm_count()))
    }

    fn observe(&mut self, _arm: usize, _outcome: f64) {
        // Random policy doesn't learn from feedback
    }
}
