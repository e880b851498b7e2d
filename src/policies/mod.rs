//! Discrete bandit policies
//!
//! Every policy implements [`Policy`](crate::Policy) and keeps its own
//! private state; the session only talks to it through `decide` and
//! `observe`.

mod config;
mod epsilon_greedy;
mod exp3;
mod explore_commit;
mod greedy_bayes;
#[cfg(test)]
pub(crate) mod harness;
mod posterior;
mod random;
mod rpm;
mod stats;
mod thompson;
mod ucb;
mod ucb_normal;
mod ucb_tuned;
mod wlln;

use ordered_float::OrderedFloat;

use crate::session::SessionView;

pub use config::PolicyConfig;
pub use epsilon_greedy::EpsilonGreedy;
pub use exp3::Exp3;
pub use explore_commit::ExploreThenCommit;
pub use greedy_bayes::GreedyBayes;
pub use posterior::BetaParams;
pub use random::Random;
pub use rpm::RandomizedProbabilityMatching;
pub use thompson::ThompsonSampling;
pub use ucb::Ucb;
pub use ucb_normal::UcbNormal;
pub use ucb_tuned::UcbTuned;
pub use wlln::Wlln;

/// Index of the largest value; ties go to the lowest index.
pub(crate) fn argmax<I>(values: I) -> Option<usize>
where
    I: IntoIterator<Item = f64>,
{
    let mut best: Option<(usize, OrderedFloat<f64>)> = None;
    for (index, value) in values.into_iter().enumerate() {
        let value = OrderedFloat(value);
        if best.is_none_or(|(_, top)| value > top) {
            best = Some((index, value));
        }
    }
    best.map(|(index, _)| index)
}

/// Arm to pull during a deterministic round-robin warm-up.
///
/// Turn `t` pulls arm `t mod K`, so the cycle starts at arm 1 and wraps to 0.
pub(crate) fn round_robin(view: &SessionView<'_>) -> usize {
    view.turn() % view.arm_count()
}
