use ordered_float::OrderedFloat;
use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};

use super::ContinuumPolicy;
use crate::error::{BanditError, Result};
use crate::policies::argmax;

/// Which turn count drives the confidence radii.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RadiusRule {
    /// `c * nu * t^(1/3) / sqrt(n)` with `t` the current turn.
    #[default]
    Anytime,
    /// `c * nu * T^(1/3) / sqrt(n)` with `T` the horizon; radii only shrink.
    FixedHorizon,
}

/// Parameters of the [`Zooming`] policy.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoomingConfig {
    /// Radius multiplier.
    pub c: f64,
    /// Bound on the reward's third absolute moment.
    pub nu: f64,
    /// Arm space `[low, high]`.
    pub domain: (f64, f64),
    pub radius_rule: RadiusRule,
}

impl Default for ZoomingConfig {
    fn default() -> Self {
        Self {
            c: 0.01,
            nu: 1.0,
            domain: (0.0, 1.0),
            radius_rule: RadiusRule::Anytime,
        }
    }
}

impl ZoomingConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.c > 0.0 && self.c.is_finite()) {
            return Err(BanditError::invalid(format!(
                "c must be positive, got {}",
                self.c
            )));
        }
        if !(self.nu > 0.0 && self.nu.is_finite()) {
            return Err(BanditError::invalid(format!(
                "nu must be positive, got {}",
                self.nu
            )));
        }
        let (low, high) = self.domain;
        if !(low.is_finite() && high.is_finite() && low < high) {
            return Err(BanditError::invalid(format!(
                "domain must be a non-empty finite interval, got [{low}, {high}]"
            )));
        }
        Ok(())
    }

    pub fn build(&self) -> Result<Zooming> {
        Zooming::new(self.clone())
    }
}

/// One arm the zooming policy has activated.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct ActiveArm {
    pub location: f64,
    pub mean: f64,
    pub pulls: usize,
    pub radius: f64,
}

impl ActiveArm {
    /// Optimistic score used once the domain is covered.
    pub fn score(&self) -> f64 {
        self.mean + 2.0 * self.radius
    }
}

/// The zooming algorithm for Lipschitz continuum-armed bandits.
///
/// Every active arm covers the ball `[x - r, x + r]` around its location.
/// While part of the domain is uncovered a new arm is activated at a uniform
/// point of the first gap and pulled; once the balls cover the whole domain
/// the active arm with the largest `mean + 2r` is pulled. Radii shrink with
/// the pull count, so well-sampled regions are refined by new arms.
///
/// # Examples
///
/// ```
/// use banditry::continuum::{ContinuumPolicy, Zooming, ZoomingConfig};
/// use rand::SeedableRng;
///
/// let mut zooming = Zooming::new(ZoomingConfig::default()).unwrap();
/// zooming.initialize(100).unwrap();
/// let mut rng = rand::rngs::StdRng::seed_from_u64(1);
/// let x = zooming.decide(1, &mut rng).unwrap();
/// assert!((0.0..=1.0).contains(&x));
/// zooming.observe(1, 0.5).unwrap();
/// assert_eq!(zooming.active_arms().len(), 1);
/// ```
#[derive(Clone, Debug)]
pub struct Zooming {
    config: ZoomingConfig,
    turns: usize,
    arms: Vec<ActiveArm>,
    pending: Option<usize>,
}

impl Zooming {
    pub fn new(config: ZoomingConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            turns: 0,
            arms: Vec::new(),
            pending: None,
        })
    }

    pub fn config(&self) -> &ZoomingConfig {
        &self.config
    }

    pub fn active_arms(&self) -> &[ActiveArm] {
        &self.arms
    }

    /// First part of the domain no confidence ball covers, if any.
    ///
    /// With no active arms the whole domain is uncovered.
    pub fn uncovered(&self) -> Option<(f64, f64)> {
        let (start, end) = self.config.domain;
        let mut balls: Vec<(f64, f64)> = self
            .arms
            .iter()
            .map(|arm| (arm.location - arm.radius, arm.location + arm.radius))
            .collect();
        balls.sort_by_key(|&(low, _)| OrderedFloat(low));

        let mut covered_to = start;
        for (low, high) in balls {
            if low > covered_to {
                return Some((covered_to, low));
            }
            covered_to = covered_to.max(high);
            if covered_to >= end {
                return None;
            }
        }
        Some((covered_to, end))
    }

    fn radius(&self, pulls: usize, turn: usize) -> f64 {
        if pulls == 0 {
            return 0.0;
        }
        let t = match self.config.radius_rule {
            RadiusRule::Anytime => turn,
            RadiusRule::FixedHorizon => self.turns.max(turn),
        };
        self.config.c * self.config.nu * (t as f64).cbrt() / (pulls as f64).sqrt()
    }
}

impl ContinuumPolicy for Zooming {
    fn name(&self) -> &'static str {
        "zooming"
    }

    fn initialize(&mut self, turns: usize) -> Result<()> {
        if turns < 1 {
            return Err(BanditError::InvalidTurnBudget { turns });
        }
        self.turns = turns;
        self.arms.clear();
        self.pending = None;
        Ok(())
    }

    fn decide(&mut self, turn: usize, rng: &mut dyn RngCore) -> Result<f64> {
        let index = match self.uncovered() {
            Some((low, high)) => {
                let location = rng.random_range(low..high);
                self.arms.push(ActiveArm {
                    location,
                    mean: 0.0,
                    pulls: 0,
                    radius: 0.0,
                });
                log::debug!(
                    "turn {turn}: activated arm {} at {location:.4} in gap [{low:.4}, {high:.4})",
                    self.arms.len() - 1
                );
                self.arms.len() - 1
            }
            None => argmax(self.arms.iter().map(ActiveArm::score))
                .ok_or(BanditError::EmptyArmSet)?,
        };
        self.pending = Some(index);
        Ok(self.arms[index].location)
    }

    fn observe(&mut self, turn: usize, reward: f64) -> Result<()> {
        let index = self.pending.take().ok_or(BanditError::NoPendingDecision)?;
        let arm = &mut self.arms[index];
        arm.mean = (arm.mean * arm.pulls as f64 + reward) / (arm.pulls + 1) as f64;
        arm.pulls += 1;

        // every radius depends on the turn, not only the pulled arm's
        let radii: Vec<f64> = self
            .arms
            .iter()
            .map(|arm| self.radius(arm.pulls, turn))
            .collect();
        for (arm, radius) in self.arms.iter_mut().zip(radii) {
            arm.radius = radius;
        }
        Ok(())
    }
}
