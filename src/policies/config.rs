use serde::{Deserialize, Serialize};

use super::{
    BetaParams, EpsilonGreedy, Exp3, ExploreThenCommit, GreedyBayes, Random,
    RandomizedProbabilityMatching, ThompsonSampling, Ucb, UcbNormal, UcbTuned, Wlln,
};
use crate::error::Result;
use crate::policy::Policy;

fn default_alpha() -> f64 {
    2.0
}

fn default_explore_count() -> usize {
    10
}

fn default_z() -> f64 {
    1.96
}

fn default_samples() -> usize {
    100
}

/// Serializable description of a discrete policy and its parameters.
///
/// ```
/// use banditry::PolicyConfig;
///
/// let config: PolicyConfig = serde_json::from_str(r#"{"policy": "ucb", "alpha": 2.0}"#).unwrap();
/// assert_eq!(config, PolicyConfig::Ucb { alpha: 2.0 });
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum PolicyConfig {
    Random,
    EpsilonGreedy {
        epsilon: f64,
    },
    ExploreThenCommit {
        #[serde(default)]
        explore_turns: Option<usize>,
    },
    Ucb {
        #[serde(default = "default_alpha")]
        alpha: f64,
    },
    UcbNormal,
    UcbTuned,
    Wlln {
        #[serde(default = "default_explore_count")]
        explore_count: usize,
        #[serde(default = "default_z")]
        z: f64,
    },
    Exp3 {
        #[serde(default)]
        gamma: Option<f64>,
    },
    ThompsonSampling {
        #[serde(default)]
        priors: Option<Vec<BetaParams>>,
    },
    Rpm {
        #[serde(default = "default_samples")]
        samples: usize,
        #[serde(default)]
        priors: Option<Vec<BetaParams>>,
    },
    GreedyBayes {
        threshold: f64,
        #[serde(default)]
        quantile: Option<f64>,
        #[serde(default)]
        priors: Option<Vec<BetaParams>>,
    },
}

impl PolicyConfig {
    /// Builds a fresh policy. Priors are copied, so policies built from one
    /// config never share posterior state.
    pub fn build(&self) -> Result<Box<dyn Policy>> {
        let policy: Box<dyn Policy> = match self {
            PolicyConfig::Random => Box::new(Random),
            PolicyConfig::EpsilonGreedy { epsilon } => Box::new(EpsilonGreedy::new(*epsilon)?),
            PolicyConfig::ExploreThenCommit { explore_turns } => match explore_turns {
                Some(n) => Box::new(ExploreThenCommit::new(*n)?),
                None => Box::new(ExploreThenCommit::half()),
            },
            PolicyConfig::Ucb { alpha } => Box::new(Ucb::new(*alpha)?),
            PolicyConfig::UcbNormal => Box::new(UcbNormal::new()),
            PolicyConfig::UcbTuned => Box::new(UcbTuned::new()),
            PolicyConfig::Wlln { explore_count, z } => Box::new(Wlln::new(*explore_count, *z)?),
            PolicyConfig::Exp3 { gamma } => match gamma {
                Some(g) => Box::new(Exp3::with_gamma(*g)?),
                None => Box::new(Exp3::new()),
            },
            PolicyConfig::ThompsonSampling { priors } => match priors {
                Some(p) => Box::new(ThompsonSampling::with_priors(p)),
                None => Box::new(ThompsonSampling::uniform()),
            },
            PolicyConfig::Rpm { samples, priors } => match priors {
                Some(p) => Box::new(RandomizedProbabilityMatching::with_priors(*samples, p)?),
                None => Box::new(RandomizedProbabilityMatching::uniform(*samples)?),
            },
            PolicyConfig::GreedyBayes {
                threshold,
                quantile,
                priors,
            } => {
                let policy = match quantile {
                    Some(q) => GreedyBayes::with_quantile(*threshold, *q)?,
                    None => GreedyBayes::new(*threshold)?,
                };
                match priors {
                    Some(p) => Box::new(policy.with_priors(p)),
                    None => Box::new(policy),
                }
            }
        };
        Ok(policy)
    }

    /// Checks every parameter range without keeping the built policy.
    pub fn validate(&self) -> Result<()> {
        if let Some(priors) = self.priors() {
            for params in priors {
                params.validate()?;
            }
        }
        self.build().map(|_| ())
    }

    fn priors(&self) -> Option<&[BetaParams]> {
        match self {
            PolicyConfig::ThompsonSampling { priors }
            | PolicyConfig::Rpm { priors, .. }
            | PolicyConfig::GreedyBayes { priors, .. } => priors.as_deref(),
            _ => None,
        }
    }

    /// Human-readable name including the distinguishing parameters.
    pub fn label(&self) -> String {
        match self {
            PolicyConfig::Random => "random".to_string(),
            PolicyConfig::EpsilonGreedy { epsilon } => format!("epsilon-greedy(ε={epsilon})"),
            PolicyConfig::ExploreThenCommit { explore_turns } => match explore_turns {
                Some(n) => format!("explore-then-commit({n})"),
                None => "explore-then-commit(T/2)".to_string(),
            },
            PolicyConfig::Ucb { alpha } => format!("ucb(α={alpha})"),
            PolicyConfig::UcbNormal => "ucb-normal".to_string(),
            PolicyConfig::UcbTuned => "ucb-tuned".to_string(),
            PolicyConfig::Wlln { explore_count, z } => format!("wlln({explore_count}, z={z})"),
            PolicyConfig::Exp3 { gamma } => match gamma {
                Some(g) => format!("exp3(γ={g})"),
                None => "exp3".to_string(),
            },
            PolicyConfig::ThompsonSampling { .. } => "thompson-sampling".to_string(),
            PolicyConfig::Rpm { samples, .. } => format!("rpm(m={samples})"),
            PolicyConfig::GreedyBayes {
                threshold,
                quantile,
                ..
            } => match quantile {
                Some(q) => format!("greedy-bayes({threshold}, q={q})"),
                None => format!("greedy-bayes({threshold})"),
            },
        }
    }
}
