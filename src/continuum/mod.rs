//! Continuum-armed bandits
//!
//! Here the arm space is an interval of the real line rather than a fixed
//! set of arms. An [`Environment`] produces a reward for any location, and a
//! [`ContinuumPolicy`] picks the next location to try.

mod environment;
mod session;
mod zooming;

use std::fmt;

use rand::RngCore;

use crate::error::Result;

pub use environment::TwinPeaks;
pub use session::{ContinuumOutput, ContinuumSession};
pub use zooming::{ActiveArm, RadiusRule, Zooming, ZoomingConfig};

/// Reward oracle over a continuous arm space.
pub trait Environment: Send + Sync + fmt::Debug {
    /// Draws one reward for pulling location `x`.
    fn reward(&self, x: f64, rng: &mut dyn RngCore) -> f64;

    /// Gap between the best expected reward and the expected reward at `x`,
    /// when it is known. Regret is only tracked for environments that know it.
    fn gap(&self, _x: f64) -> Option<f64> {
        None
    }
}

/// Decision strategy over a continuous arm space.
pub trait ContinuumPolicy: Send + fmt::Debug {
    /// Get the name of this policy
    fn name(&self) -> &'static str;

    /// Resets all state for a run of `turns` turns.
    fn initialize(&mut self, turns: usize) -> Result<()>;

    /// Chooses the location to pull on 1-indexed turn `turn`.
    fn decide(&mut self, turn: usize, rng: &mut dyn RngCore) -> Result<f64>;

    /// Records the reward of the location returned by the last `decide`.
    fn observe(&mut self, turn: usize, reward: f64) -> Result<()>;
}
