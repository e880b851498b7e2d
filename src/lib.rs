//! Banditry: a simulation engine for multi-armed bandit policies.
//!
//! A [`Session`] plays one [`Policy`] against a fixed set of [`Arm`]s turn by
//! turn, tracking wealth and, when the arms' true means are known, cumulative
//! regret. An [`Experiment`] repeats a session over many independent trials
//! and aggregates the regret series into means and percentile bands, which is
//! how policies are compared. Continuum-armed problems, where the arm is a
//! point of an interval, live in [`continuum`].
//!
//! # Quick Start
//!
//! ```
//! use banditry::{OutputMode, Session, SessionOutput, bernoulli_arms};
//! use banditry::policies::ThompsonSampling;
//!
//! let arms = bernoulli_arms(&[0.2, 0.8]).unwrap();
//! let session = Session::new(1000, arms, Box::new(ThompsonSampling::uniform()))
//!     .unwrap()
//!     .with_seed(7);
//!
//! if let SessionOutput::Series(regret) = session.run(OutputMode::Series).unwrap() {
//!     assert_eq!(regret.len(), 1001);
//! }
//! ```

mod arm;
pub mod bounds;
pub mod continuum;
mod error;
mod experiment;
pub mod policies;
mod policy;
mod session;

pub use arm::{Arm, bernoulli_arms};
pub use error::{BanditError, Result};
pub use experiment::{
    Experiment, ExperimentConfig, ExperimentResult, Interval, PercentileBand, TrialResult,
    TurnSummary,
};
pub use policies::{BetaParams, PolicyConfig};
pub use policy::Policy;
pub use session::{OutputMode, Session, SessionOutput, SessionView};

// Re-exported so callers can consume comparison results without a direct dependency
pub use indexmap::IndexMap;

/// Prelude module for convenient imports.
///
/// # Examples
///
/// ```
/// use banditry::prelude::*;
/// ```
pub mod prelude {
    pub use crate::continuum::{
        ContinuumPolicy, ContinuumSession, Environment, TwinPeaks, Zooming, ZoomingConfig,
    };
    pub use crate::policies::{
        EpsilonGreedy, Exp3, ExploreThenCommit, GreedyBayes, Random,
        RandomizedProbabilityMatching, ThompsonSampling, Ucb, UcbNormal, UcbTuned, Wlln,
    };
    pub use crate::{
        Arm, BanditError, BetaParams, Experiment, ExperimentConfig, ExperimentResult, OutputMode,
        Policy, PolicyConfig, Result, Session, SessionOutput, SessionView, bernoulli_arms,
    };
}
