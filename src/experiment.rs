//! Repeated trials and aggregation across them.
//!
//! An [`Experiment`] runs many independent sessions of one configuration,
//! each with fresh arms, a fresh policy and its own random stream, and
//! summarises the per-turn regret series by their mean and percentile bands.

use indexmap::IndexMap;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::arm::Arm;
use crate::continuum::{ContinuumPolicy, ContinuumSession, Environment};
use crate::error::{BanditError, Result};
use crate::policies::PolicyConfig;
use crate::policy::Policy;
use crate::session::Session;

/// Shape of an experiment.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperimentConfig {
    /// Turns per trial.
    pub turns: usize,
    /// Number of independent trials.
    pub trials: usize,
    /// Master seed; every trial gets its own stream derived from it.
    pub seed: u64,
    /// Central interval widths in percent, e.g. 95 for the 2.5..97.5 band.
    pub confidences: Vec<f64>,
    /// Run trials on the rayon thread pool.
    pub parallel: bool,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            turns: 1000,
            trials: 100,
            seed: 0,
            confidences: vec![95.0, 70.0, 50.0],
            parallel: true,
        }
    }
}

/// Outcome of a single trial.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TrialResult {
    pub wealth: f64,
    pub regret: f64,
    /// Cumulative regret per turn, starting with the turn-0 baseline.
    pub series: Vec<f64>,
}

/// Percentile band of the regret series across trials.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PercentileBand {
    pub confidence: f64,
    pub lower: Vec<f64>,
    pub upper: Vec<f64>,
}

/// Band values at a single turn.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Interval {
    pub confidence: f64,
    pub lower: f64,
    pub upper: f64,
}

/// Aggregated regret at a single turn.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TurnSummary {
    pub turn: usize,
    pub mean: f64,
    pub bands: Vec<Interval>,
}

/// Regret statistics of one configuration over all trials.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ExperimentResult {
    turns: usize,
    trials: Vec<TrialResult>,
    mean: Vec<f64>,
    bands: Vec<PercentileBand>,
}

impl ExperimentResult {
    /// Aggregates finished trials. Every series must hold `turns + 1` values.
    pub fn from_trials(turns: usize, confidences: &[f64], trials: Vec<TrialResult>) -> Result<Self> {
        if trials.is_empty() {
            return Err(BanditError::InvalidTrialCount { trials: 0 });
        }
        validate_confidences(confidences)?;
        let len = turns + 1;
        if let Some((index, trial)) = trials
            .iter()
            .enumerate()
            .find(|(_, trial)| trial.series.len() != len)
        {
            return Err(BanditError::DimensionMismatch {
                message: format!(
                    "trial {index} has {} regret values, expected {len}",
                    trial.series.len()
                ),
            });
        }

        let count = trials.len() as f64;
        let mut mean = Vec::with_capacity(len);
        let mut bands: Vec<PercentileBand> = confidences
            .iter()
            .map(|&confidence| PercentileBand {
                confidence,
                lower: Vec::with_capacity(len),
                upper: Vec::with_capacity(len),
            })
            .collect();

        let mut column = Vec::with_capacity(trials.len());
        for turn in 0..len {
            column.clear();
            column.extend(trials.iter().map(|trial| trial.series[turn]));
            mean.push(column.iter().sum::<f64>() / count);
            column.sort_by(f64::total_cmp);
            for band in &mut bands {
                let tail = (100.0 - band.confidence) / 2.0;
                band.lower.push(percentile(&column, tail));
                band.upper.push(percentile(&column, 100.0 - tail));
            }
        }

        Ok(Self {
            turns,
            trials,
            mean,
            bands,
        })
    }

    pub fn turns(&self) -> usize {
        self.turns
    }

    pub fn trials(&self) -> &[TrialResult] {
        &self.trials
    }

    /// Mean cumulative regret per turn, turn 0 included.
    pub fn mean(&self) -> &[f64] {
        &self.mean
    }

    pub fn bands(&self) -> &[PercentileBand] {
        &self.bands
    }

    /// Summary at `turn`, or `None` past the horizon.
    pub fn at(&self, turn: usize) -> Option<TurnSummary> {
        let mean = *self.mean.get(turn)?;
        let bands = self
            .bands
            .iter()
            .map(|band| Interval {
                confidence: band.confidence,
                lower: band.lower[turn],
                upper: band.upper[turn],
            })
            .collect();
        Some(TurnSummary { turn, mean, bands })
    }

    /// Summaries for every turn from 0 to the horizon.
    pub fn summaries(&self) -> Vec<TurnSummary> {
        (0..=self.turns).filter_map(|turn| self.at(turn)).collect()
    }

    pub fn mean_wealth(&self) -> f64 {
        self.trials.iter().map(|trial| trial.wealth).sum::<f64>() / self.trials.len() as f64
    }

    pub fn mean_final_regret(&self) -> f64 {
        self.mean.last().copied().unwrap_or(0.0)
    }
}

/// Runs one configuration over many independent trials.
///
/// # Examples
///
/// ```
/// use banditry::{Experiment, ExperimentConfig, PolicyConfig, bernoulli_arms};
///
/// let experiment = Experiment::new(ExperimentConfig {
///     turns: 200,
///     trials: 20,
///     ..ExperimentConfig::default()
/// })
/// .unwrap();
/// let policy = PolicyConfig::ThompsonSampling { priors: None };
/// let result = experiment
///     .run(|| policy.build(), || bernoulli_arms(&[0.2, 0.8]))
///     .unwrap();
/// assert_eq!(result.mean().len(), 201);
/// ```
#[derive(Clone, Debug)]
pub struct Experiment {
    config: ExperimentConfig,
}

impl Experiment {
    pub fn new(config: ExperimentConfig) -> Result<Self> {
        if config.trials < 1 {
            return Err(BanditError::InvalidTrialCount {
                trials: config.trials,
            });
        }
        if config.turns < 1 {
            return Err(BanditError::InvalidTurnBudget {
                turns: config.turns,
            });
        }
        validate_confidences(&config.confidences)?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ExperimentConfig {
        &self.config
    }

    /// Runs every trial of a discrete policy against arms with known means.
    ///
    /// Both factories are called once per trial, so no state is shared
    /// between trials.
    pub fn run<P, A>(&self, policy: P, arms: A) -> Result<ExperimentResult>
    where
        P: Fn() -> Result<Box<dyn Policy>> + Sync,
        A: Fn() -> Result<Vec<Arm>> + Sync,
    {
        let turns = self.config.turns;
        let trials = self.run_trials(|rng| {
            let mut session = Session::new(turns, arms()?, policy()?)?.with_rng(rng);
            if session.regret().is_none() {
                return Err(BanditError::RegretUnavailable);
            }
            session.finish()?;
            Ok(TrialResult {
                wealth: session.wealth(),
                regret: session.regret().ok_or(BanditError::RegretUnavailable)?,
                series: session
                    .regret_series()
                    .ok_or(BanditError::RegretUnavailable)?
                    .to_vec(),
            })
        })?;
        ExperimentResult::from_trials(turns, &self.config.confidences, trials)
    }

    /// Runs each policy configuration against the same arm factory.
    ///
    /// Results are keyed by [`PolicyConfig::label`] in the order given.
    pub fn compare<A>(
        &self,
        policies: &[PolicyConfig],
        arms: A,
    ) -> Result<IndexMap<String, ExperimentResult>>
    where
        A: Fn() -> Result<Vec<Arm>> + Sync,
    {
        let mut results = IndexMap::with_capacity(policies.len());
        for config in policies {
            config.validate()?;
            let label = config.label();
            if results.contains_key(&label) {
                return Err(BanditError::invalid(format!(
                    "policy {label} appears more than once"
                )));
            }
            let result = self.run(|| config.build(), &arms)?;
            log::info!(
                "{label}: mean final regret {:.3}",
                result.mean_final_regret()
            );
            results.insert(label, result);
        }
        Ok(results)
    }

    /// Runs every trial of a continuum policy.
    pub fn run_continuum<P, V, E>(&self, policy: P, environment: V) -> Result<ExperimentResult>
    where
        P: Fn() -> Result<Box<dyn ContinuumPolicy>> + Sync,
        V: Fn() -> Result<E> + Sync,
        E: Environment,
    {
        let turns = self.config.turns;
        let trials = self.run_trials(|rng| {
            let mut session = ContinuumSession::new(turns, environment()?, policy()?)?.with_rng(rng);
            if session.regret().is_none() {
                return Err(BanditError::RegretUnavailable);
            }
            session.finish()?;
            Ok(TrialResult {
                wealth: session.wealth(),
                regret: session.regret().ok_or(BanditError::RegretUnavailable)?,
                series: session
                    .regret_series()
                    .ok_or(BanditError::RegretUnavailable)?
                    .to_vec(),
            })
        })?;
        ExperimentResult::from_trials(turns, &self.config.confidences, trials)
    }

    /// One generator per trial, each `2^128` steps apart from the previous.
    fn streams(&self) -> Vec<Xoshiro256PlusPlus> {
        let mut master = Xoshiro256PlusPlus::seed_from_u64(self.config.seed);
        (0..self.config.trials)
            .map(|_| {
                let stream = master.clone();
                master.jump();
                stream
            })
            .collect()
    }

    fn run_trials<F>(&self, trial: F) -> Result<Vec<TrialResult>>
    where
        F: Fn(Xoshiro256PlusPlus) -> Result<TrialResult> + Sync,
    {
        log::info!(
            "running {} trials of {} turns (seed {}, parallel {})",
            self.config.trials,
            self.config.turns,
            self.config.seed,
            self.config.parallel
        );
        let streams = self.streams();
        let results = if self.config.parallel {
            streams.into_par_iter().map(&trial).collect::<Result<Vec<_>>>()
        } else {
            streams.into_iter().map(&trial).collect::<Result<Vec<_>>>()
        }?;
        log::info!("finished {} trials", results.len());
        Ok(results)
    }
}

fn validate_confidences(confidences: &[f64]) -> Result<()> {
    match confidences.iter().find(|c| !(**c > 0.0 && **c < 100.0)) {
        Some(c) => Err(BanditError::invalid(format!(
            "confidence must be strictly between 0 and 100 percent, got {c}"
        ))),
        None => Ok(()),
    }
}

/// Percentile `p` (in percent) of sorted values, interpolating linearly
/// between the closest ranks.
fn percentile(sorted: &[f64], p: f64) -> f64 {
    let rank = p / 100.0 * (sorted.len() - 1) as f64;
    let below = rank.floor() as usize;
    let above = rank.ceil() as usize;
    sorted[below] + (sorted[above] - sorted[below]) * (rank - below as f64)
}
