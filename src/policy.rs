//! Policy trait definition for discrete multi-armed bandit algorithms

use std::fmt;

use rand::RngCore;

use crate::error::Result;
use crate::policies::BetaParams;
use crate::session::SessionView;

/// Decision strategy driven by a [`Session`](crate::Session).
///
/// A policy only ever reads the session through a [`SessionView`] and keeps
/// whatever it learns in its own private state. The session calls
/// [`initialize`](Policy::initialize) once at construction, then for every
/// turn calls [`decide`](Policy::decide), records the outcome of the chosen
/// arm, and finally reports it back through [`observe`](Policy::observe).
///
/// The trait takes `dyn RngCore` rather than a generic parameter so that
/// `Box<dyn Policy>` stays object-safe.
pub trait Policy: Send + fmt::Debug {
    /// Short display name of the algorithm.
    fn name(&self) -> &'static str;

    /// Prepare (or reset) private state for a session with `arm_count` arms
    /// and a budget of `turns` turns.
    fn initialize(&mut self, arm_count: usize, turns: usize) -> Result<()>;

    /// Choose the index of the arm to pull this turn.
    fn decide(&mut self, view: &SessionView<'_>, rng: &mut dyn RngCore) -> Result<usize>;

    /// Update private state with the outcome of the arm pulled this turn.
    fn observe(&mut self, arm: usize, outcome: f64);

    /// Current Beta posterior parameters per arm, for Bayesian policies.
    fn posterior(&self) -> Option<Vec<BetaParams>> {
        None
    }
}
