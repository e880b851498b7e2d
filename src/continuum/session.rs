use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;

use super::{ContinuumPolicy, Environment};
use crate::error::{BanditError, Result};
use crate::session::OutputMode;

/// Value returned by [`ContinuumSession::run`].
#[derive(Debug)]
pub enum ContinuumOutput<E: Environment> {
    Wealth(f64),
    Regret(f64),
    Series(Vec<f64>),
    FullState(Box<ContinuumSession<E>>),
}

#[derive(Clone, Debug)]
struct RegretTracker {
    total: f64,
    series: Vec<f64>,
}

/// One run of a continuum policy against an environment.
///
/// Regret is tracked when the environment reports gaps. The turn loop and
/// output modes mirror [`Session`](crate::Session).
#[derive(Debug)]
pub struct ContinuumSession<E: Environment> {
    environment: E,
    policy: Box<dyn ContinuumPolicy>,
    rng: Xoshiro256PlusPlus,
    turns: usize,
    turn: usize,
    locations: Vec<f64>,
    rewards: Vec<f64>,
    wealth: f64,
    wealth_series: Vec<f64>,
    regret: Option<RegretTracker>,
}

impl<E: Environment> ContinuumSession<E> {
    pub fn new(turns: usize, environment: E, mut policy: Box<dyn ContinuumPolicy>) -> Result<Self> {
        if turns < 1 {
            return Err(BanditError::InvalidTurnBudget { turns });
        }
        policy.initialize(turns)?;

        let regret = environment.gap(0.0).map(|_| RegretTracker {
            total: 0.0,
            series: vec![0.0],
        });

        Ok(Self {
            environment,
            policy,
            rng: Xoshiro256PlusPlus::from_rng(&mut rand::rng()),
            turns,
            turn: 1,
            locations: Vec::with_capacity(turns),
            rewards: Vec::with_capacity(turns),
            wealth: 0.0,
            wealth_series: vec![0.0],
            regret,
        })
    }

    #[must_use]
    pub fn with_seed(self, seed: u64) -> Self {
        self.with_rng(Xoshiro256PlusPlus::seed_from_u64(seed))
    }

    #[must_use]
    pub fn with_rng(mut self, rng: Xoshiro256PlusPlus) -> Self {
        self.rng = rng;
        self
    }

    /// Plays one turn. Returns the location pulled, or `None` once the budget is spent.
    pub fn step(&mut self) -> Result<Option<f64>> {
        if self.is_finished() {
            return Ok(None);
        }

        let x = self.policy.decide(self.turn, &mut self.rng)?;
        let reward = self.environment.reward(x, &mut self.rng);
        self.locations.push(x);
        self.rewards.push(reward);
        self.wealth += reward;
        self.wealth_series.push(self.wealth);

        if let Some(tracker) = self.regret.as_mut() {
            tracker.total += self.environment.gap(x).unwrap_or(0.0);
            tracker.series.push(tracker.total);
        }

        self.policy.observe(self.turn, reward)?;
        log::trace!("turn {} pulled {:.4} -> {}", self.turn, x, reward);
        self.turn += 1;
        Ok(Some(x))
    }

    /// Plays every remaining turn.
    pub fn finish(&mut self) -> Result<()> {
        while self.step()?.is_some() {}

        log::debug!(
            "{} continuum session finished: {} turns, wealth {:.3}, regret {:?}",
            self.policy.name(),
            self.turns,
            self.wealth,
            self.regret()
        );
        Ok(())
    }

    pub fn run(mut self, mode: OutputMode) -> Result<ContinuumOutput<E>> {
        if matches!(mode, OutputMode::Regret | OutputMode::Series) && self.regret.is_none() {
            return Err(BanditError::RegretUnavailable);
        }

        self.finish()?;

        match mode {
            OutputMode::Wealth => Ok(ContinuumOutput::Wealth(self.wealth)),
            OutputMode::Regret => self
                .regret()
                .map(ContinuumOutput::Regret)
                .ok_or(BanditError::RegretUnavailable),
            OutputMode::Series => self
                .regret
                .take()
                .map(|tracker| ContinuumOutput::Series(tracker.series))
                .ok_or(BanditError::RegretUnavailable),
            OutputMode::FullState => Ok(ContinuumOutput::FullState(Box::new(self))),
        }
    }

    pub fn is_finished(&self) -> bool {
        self.turn > self.turns
    }

    pub fn turns(&self) -> usize {
        self.turns
    }

    /// 1-indexed turn about to be played.
    pub fn turn(&self) -> usize {
        self.turn
    }

    pub fn environment(&self) -> &E {
        &self.environment
    }

    pub fn policy(&self) -> &dyn ContinuumPolicy {
        self.policy.as_ref()
    }

    /// Location pulled on every turn so far.
    pub fn locations(&self) -> &[f64] {
        &self.locations
    }

    pub fn rewards(&self) -> &[f64] {
        &self.rewards
    }

    pub fn wealth(&self) -> f64 {
        self.wealth
    }

    pub fn wealth_series(&self) -> &[f64] {
        &self.wealth_series
    }

    pub fn regret(&self) -> Option<f64> {
        self.regret.as_ref().map(|tracker| tracker.total)
    }

    pub fn regret_series(&self) -> Option<&[f64]> {
        self.regret.as_ref().map(|tracker| tracker.series.as_slice())
    }
}
