//! Minimal session stand-in for driving a policy directly in unit tests.

use rand::{Rng, RngCore};

use crate::policy::Policy;
use crate::session::SessionView;

pub(crate) struct Harness {
    turns: usize,
    turn: usize,
    history: Vec<Vec<f64>>,
    means: Vec<f64>,
    wealth: f64,
    decisions: Vec<usize>,
}

impl Harness {
    pub fn new(policy: &mut dyn Policy, arm_count: usize, turns: usize) -> Self {
        policy
            .initialize(arm_count, turns)
            .expect("policy should initialize");
        Self {
            turns,
            turn: 1,
            history: vec![Vec::new(); arm_count],
            means: vec![0.0; arm_count],
            wealth: 0.0,
            decisions: Vec::new(),
        }
    }

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

    /// Records an outcome the way a session would, then lets the policy observe it.
    pub fn record(&mut self, policy: &mut dyn Policy, arm: usize, outcome: f64) {
        self.decisions.push(arm);
        self.history[arm].push(outcome);
        let n = self.history[arm].len() as f64;
        self.means[arm] = (self.means[arm] * (n - 1.0) + outcome) / n;
        self.wealth += outcome;
        self.turn += 1;
        policy.observe(arm, outcome);
    }

    /// Plays one turn with Bernoulli rewards of the given success probabilities.
    pub fn play(
        &mut self,
        policy: &mut dyn Policy,
        probabilities: &[f64],
        rng: &mut dyn RngCore,
    ) -> usize {
        let arm = policy
            .decide(&self.view(), rng)
            .expect("policy should decide");
        let outcome = if rng.random::<f64>() < probabilities[arm] {
            1.0
        } else {
            0.0
        };
        self.record(policy, arm, outcome);
        arm
    }

    pub fn pulls(&self, arm: usize) -> usize {
        self.history[arm].len()
    }
}
