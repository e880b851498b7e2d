//! One run of a policy against a fixed set of arms.

use std::fmt;
use std::str::FromStr;

use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;
use serde::{Deserialize, Serialize};

use crate::arm::Arm;
use crate::error::{BanditError, Result};
use crate::policies::BetaParams;
use crate::policy::Policy;

/// Which value [`Session::run`] hands back.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputMode {
    /// Final cumulative wealth.
    Wealth,
    /// Final cumulative regret (requires known arm means).
    Regret,
    /// Cumulative regret after every turn, starting with the turn-0 baseline.
    Series,
    /// The whole finished session.
    FullState,
}

impl FromStr for OutputMode {
    type Err = BanditError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "wealth" | "outcome" => Ok(OutputMode::Wealth),
            "regret" => Ok(OutputMode::Regret),
            "series" => Ok(OutputMode::Series),
            "full_state" | "fullState" => Ok(OutputMode::FullState),
            other => Err(BanditError::InvalidOutputMode {
                mode: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for OutputMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OutputMode::Wealth => "wealth",
            OutputMode::Regret => "regret",
            OutputMode::Series => "series",
            OutputMode::FullState => "full_state",
        };
        f.write_str(name)
    }
}

/// Value returned by [`Session::run`].
#[derive(Debug)]
pub enum SessionOutput {
    Wealth(f64),
    Regret(f64),
    Series(Vec<f64>),
    FullState(Box<Session>),
}

/// Read-only view of a session handed to a [`Policy`] each turn.
#[derive(Clone, Copy, Debug)]
pub struct SessionView<'a> {
    turn: usize,
    turns: usize,
    history: &'a [Vec<f64>],
    means: &'a [f64],
    wealth: f64,
    decisions: &'a [usize],
}

impl<'a> SessionView<'a> {
    /// Assembles a view from raw session state.
    ///
    /// `turn` is the 1-indexed turn about to be played.
    pub fn new(
        turn: usize,
        turns: usize,
        history: &'a [Vec<f64>],
        means: &'a [f64],
        wealth: f64,
        decisions: &'a [usize],
    ) -> Self {
        Self {
            turn,
            turns,
            history,
            means,
            wealth,
            decisions,
        }
    }

    /// The 1-indexed turn about to be played.
    pub fn turn(&self) -> usize {
        self.turn
    }

    /// Number of turns already played.
    pub fn completed_turns(&self) -> usize {
        self.turn - 1
    }

    /// Total turn budget.
    pub fn turns(&self) -> usize {
        self.turns
    }

    pub fn arm_count(&self) -> usize {
        self.history.len()
    }

    /// Times arm `index` has been pulled.
    pub fn pulls(&self, index: usize) -> usize {
        self.history[index].len()
    }

    /// Running mean outcome of arm `index` (0 before its first pull).
    pub fn mean(&self, index: usize) -> f64 {
        self.means[index]
    }

    pub fn means(&self) -> &'a [f64] {
        self.means
    }

    /// Outcomes recorded for arm `index`, oldest first.
    pub fn history(&self, index: usize) -> &'a [f64] {
        &self.history[index]
    }

    pub fn wealth(&self) -> f64 {
        self.wealth
    }

    pub fn decisions(&self) -> &'a [usize] {
        self.decisions
    }
}

#[derive(Clone, Debug)]
struct RegretTracker {
    best_mean: f64,
    total: f64,
    series: Vec<f64>,
}

/// State of one run of turns against a fixed set of arms and one policy.
///
/// Regret is tracked only when every arm exposes its true mean; otherwise
/// asking for it fails with [`BanditError::RegretUnavailable`].
///
/// # Examples
///
/// ```
/// use banditry::{Arm, OutputMode, Session, SessionOutput};
/// use banditry::policies::Ucb;
///
/// let arms = vec![Arm::bernoulli(0.2).unwrap(), Arm::bernoulli(0.8).unwrap()];
/// let session = Session::new(100, arms, Box::new(Ucb::new(2.0).unwrap()))
///     .unwrap()
///     .with_seed(42);
///
/// match session.run(OutputMode::Regret).unwrap() {
///     SessionOutput::Regret(regret) => assert!(regret >= 0.0),
///     _ => unreachable!(),
/// }
/// ```
#[derive(Debug)]
pub struct Session {
    arms: Vec<Arm>,
    policy: Box<dyn Policy>,
    rng: Xoshiro256PlusPlus,
    turns: usize,
    turn: usize,
    history: Vec<Vec<f64>>,
    means: Vec<f64>,
    wealth: f64,
    wealth_series: Vec<f64>,
    decisions: Vec<usize>,
    regret: Option<RegretTracker>,
    posterior_history: Option<Vec<Vec<BetaParams>>>,
}

impl Session {
    /// Creates a session and initializes `policy` for it.
    ///
    /// The generator is seeded from the thread-local RNG; use
    /// [`with_seed`](Session::with_seed) for reproducible runs.
    pub fn new(turns: usize, arms: Vec<Arm>, mut policy: Box<dyn Policy>) -> Result<Self> {
        if turns < 1 {
            return Err(BanditError::InvalidTurnBudget { turns });
        }
        if arms.is_empty() {
            return Err(BanditError::EmptyArmSet);
        }
        policy.initialize(arms.len(), turns)?;

        let regret = arms
            .iter()
            .map(Arm::mean)
            .collect::<Option<Vec<f64>>>()
            .map(|means| RegretTracker {
                best_mean: means.into_iter().fold(f64::NEG_INFINITY, f64::max),
                total: 0.0,
                series: vec![0.0],
            });

        let arm_count = arms.len();
        Ok(Self {
            arms,
            policy,
            rng: Xoshiro256PlusPlus::from_rng(&mut rand::rng()),
            turns,
            turn: 1,
            history: vec![Vec::new(); arm_count],
            means: vec![0.0; arm_count],
            wealth: 0.0,
            wealth_series: vec![0.0],
            decisions: Vec::with_capacity(turns),
            regret,
            posterior_history: None,
        })
    }

    /// Reseeds the session's generator.
    #[must_use]
    pub fn with_seed(self, seed: u64) -> Self {
        self.with_rng(Xoshiro256PlusPlus::seed_from_u64(seed))
    }

    /// Replaces the session's generator.
    #[must_use]
    pub fn with_rng(mut self, rng: Xoshiro256PlusPlus) -> Self {
        self.rng = rng;
        self
    }

    /// Records the policy's posterior after every turn.
    ///
    /// Index 0 holds the posterior at the moment this is called (the prior,
    /// on a fresh session). Policies without a posterior record nothing.
    #[must_use]
    pub fn with_posterior_history(mut self) -> Self {
        let mut snapshots = Vec::with_capacity(self.turns + 1);
        if let Some(posterior) = self.policy.posterior() {
            snapshots.push(posterior);
        }
        self.posterior_history = Some(snapshots);
        self
    }

    /// Plays one turn. Returns the arm pulled, or `None` once the budget is spent.
    pub fn step(&mut self) -> Result<Option<usize>> {
        if self.is_finished() {
            return Ok(None);
        }

        let view = SessionView::new(
            self.turn,
            self.turns,
            &self.history,
            &self.means,
            self.wealth,
            &self.decisions,
        );
        let index = self.policy.decide(&view, &mut self.rng)?;
        let arm_count = self.arms.len();
        let arm = self
            .arms
            .get(index)
            .ok_or(BanditError::InvalidDecision { index, arm_count })?;
        self.decisions.push(index);

        let outcome = arm.sample(&mut self.rng);
        self.history[index].push(outcome);
        let n = self.history[index].len() as f64;
        self.means[index] = (self.means[index] * (n - 1.0) + outcome) / n;
        self.wealth += outcome;
        self.wealth_series.push(self.wealth);

        if let Some(tracker) = self.regret.as_mut() {
            // every arm has a mean when the tracker exists
            let chosen = arm.mean().unwrap_or(tracker.best_mean);
            tracker.total += tracker.best_mean - chosen;
            tracker.series.push(tracker.total);
        }

        self.policy.observe(index, outcome);
        if let Some(snapshots) = self.posterior_history.as_mut() {
            if let Some(posterior) = self.policy.posterior() {
                snapshots.push(posterior);
            }
        }

        log::trace!("turn {} pulled arm {} -> {}", self.turn, index, outcome);
        self.turn += 1;
        Ok(Some(index))
    }

    /// Plays every remaining turn.
    pub fn finish(&mut self) -> Result<()> {
        while self.step()?.is_some() {}

        log::debug!(
            "{} session finished: {} turns, wealth {:.3}, regret {:?}",
            self.policy.name(),
            self.turns,
            self.wealth,
            self.regret()
        );
        Ok(())
    }

    /// Plays every remaining turn and returns the requested result.
    pub fn run(mut self, mode: OutputMode) -> Result<SessionOutput> {
        if matches!(mode, OutputMode::Regret | OutputMode::Series) && self.regret.is_none() {
            return Err(BanditError::RegretUnavailable);
        }

        self.finish()?;

        match mode {
            OutputMode::Wealth => Ok(SessionOutput::Wealth(self.wealth)),
            OutputMode::Regret => self
                .regret()
                .map(SessionOutput::Regret)
                .ok_or(BanditError::RegretUnavailable),
            OutputMode::Series => self
                .regret
                .take()
                .map(|tracker| SessionOutput::Series(tracker.series))
                .ok_or(BanditError::RegretUnavailable),
            OutputMode::FullState => Ok(SessionOutput::FullState(Box::new(self))),
        }
    }

    /// Current read-only view, as a policy would see it.
    pub fn view(&self) -> SessionView<'_> {
        SessionView::new(
            self.turn,
            self.turns,
            &self.history,
            &self.means,
            self.wealth,
            &self.decisions,
        )
    }

    pub fn is_finished(&self) -> bool {
        self.turn > self.turns
    }

    pub fn turns(&self) -> usize {
        self.turns
    }

    /// The 1-indexed turn to be played next.
    pub fn turn(&self) -> usize {
        self.turn
    }

    pub fn arms(&self) -> &[Arm] {
        &self.arms
    }

    pub fn policy(&self) -> &dyn Policy {
        self.policy.as_ref()
    }

    /// Outcomes per arm, oldest first.
    pub fn history(&self) -> &[Vec<f64>] {
        &self.history
    }

    pub fn means(&self) -> &[f64] {
        &self.means
    }

    pub fn pulls(&self, index: usize) -> usize {
        self.history[index].len()
    }

    pub fn wealth(&self) -> f64 {
        self.wealth
    }

    /// Wealth after every turn, starting with the turn-0 baseline.
    pub fn wealth_series(&self) -> &[f64] {
        &self.wealth_series
    }

    pub fn decisions(&self) -> &[usize] {
        &self.decisions
    }

    /// Cumulative regret, if every arm exposes its true mean.
    pub fn regret(&self) -> Option<f64> {
        self.regret.as_ref().map(|tracker| tracker.total)
    }

    /// Cumulative regret after every turn, starting with the turn-0 baseline.
    pub fn regret_series(&self) -> Option<&[f64]> {
        self.regret.as_ref().map(|tracker| tracker.series.as_slice())
    }

    pub fn posterior_history(&self) -> Option<&[Vec<BetaParams>]> {
        self.posterior_history.as_deref()
    }
}
