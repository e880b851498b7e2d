//! Zooming on the twin-peaks environment.

use banditry::bounds::zooming_regret_bound;
use banditry::continuum::RadiusRule;
use banditry::prelude::*;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;

const TURNS: usize = 10_000;

/// Expected gap of a uniformly random location on the twin peaks.
const RANDOM_GAP: f64 = 0.14;

struct Outcome {
    regret: f64,
    arms: Vec<banditry::continuum::ActiveArm>,
}

fn play(seed: u64, config: ZoomingConfig, turns: usize) -> Outcome {
    let env = TwinPeaks::new(0.0, 3.1).unwrap();
    let mut zooming = Zooming::new(config).unwrap();
    zooming.initialize(turns).unwrap();
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
    let mut regret = 0.0;
    for turn in 1..=turns {
        let x = zooming.decide(turn, &mut rng).unwrap();
        regret += env.gap(x).unwrap();
        zooming.observe(turn, env.reward(x, &mut rng)).unwrap();
    }
    Outcome {
        regret,
        arms: zooming.active_arms().to_vec(),
    }
}

#[test]
fn test_zooming_concentrates_near_a_peak() {
    let trials = 10;
    let outcomes: Vec<Outcome> = (0..trials)
        .map(|seed| play(seed, ZoomingConfig::default(), TURNS))
        .collect();

    let mean_regret = outcomes.iter().map(|o| o.regret).sum::<f64>() / trials as f64;
    assert!(
        mean_regret < 0.7 * RANDOM_GAP * TURNS as f64,
        "mean regret {mean_regret}"
    );

    let env = TwinPeaks::noiseless(0.0);
    let mut favourite_gaps = 0.0;
    for outcome in &outcomes {
        assert!(outcome.arms.len() < TURNS / 50, "{} arms", outcome.arms.len());
        let favourite = outcome
            .arms
            .iter()
            .max_by_key(|arm| arm.pulls)
            .unwrap();
        favourite_gaps += env.gap(favourite.location).unwrap();
    }
    assert!(favourite_gaps / (trials as f64) < 0.1);
}

#[test]
fn test_active_arms_grow_sublinearly() {
    let short = play(1, ZoomingConfig::default(), 1000).arms.len();
    let long = play(1, ZoomingConfig::default(), TURNS).arms.len();
    assert!(long >= short);
    assert!(long < 10 * short);
}

#[test]
fn test_pull_counts_add_up() {
    let outcome = play(4, ZoomingConfig::default(), 2000);
    let pulls: usize = outcome.arms.iter().map(|arm| arm.pulls).sum();
    assert_eq!(pulls, 2000);
    for arm in &outcome.arms {
        assert!((0.0..=1.0).contains(&arm.location));
        assert!(arm.pulls >= 1);
    }
}

#[test]
fn test_fixed_horizon_radii_only_shrink() {
    let env = TwinPeaks::new(0.0, 3.1).unwrap();
    let turns = 3000;
    let mut zooming = Zooming::new(ZoomingConfig {
        c: 0.05,
        radius_rule: RadiusRule::FixedHorizon,
        ..ZoomingConfig::default()
    })
    .unwrap();
    zooming.initialize(turns).unwrap();
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(8);
    let mut radii: Vec<f64> = Vec::new();

    for turn in 1..=turns {
        let x = zooming.decide(turn, &mut rng).unwrap();
        zooming.observe(turn, env.reward(x, &mut rng)).unwrap();
        let current: Vec<f64> = zooming.active_arms().iter().map(|arm| arm.radius).collect();
        for (now, before) in current.iter().zip(&radii) {
            assert!(now <= before);
        }
        radii = current;
    }
}

#[test]
fn test_continuum_experiment() {
    let experiment = Experiment::new(ExperimentConfig {
        turns: 2000,
        trials: 8,
        seed: 11,
        ..ExperimentConfig::default()
    })
    .unwrap();
    let result = experiment
        .run_continuum(
            || Ok(Box::new(Zooming::new(ZoomingConfig::default())?) as Box<dyn ContinuumPolicy>),
            || TwinPeaks::new(0.0, 3.1),
        )
        .unwrap();

    assert_eq!(result.mean().len(), 2001);
    assert!(result.mean().windows(2).all(|w| w[1] >= w[0]));
    assert!(result.mean_final_regret() < RANDOM_GAP * 2000.0);
}

#[test]
fn test_theoretical_bound_dominates_early_regret() {
    let trials = 10;
    let mean_regret = (0..trials)
        .map(|seed| play(100 + seed, ZoomingConfig::default(), 1000).regret)
        .sum::<f64>()
        / trials as f64;
    let bound = zooming_regret_bound(1000, 0.1, 1.0, 0.01).unwrap();
    assert!(mean_regret < bound, "{mean_regret} >= {bound}");
}
