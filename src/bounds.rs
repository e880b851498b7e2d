//! Theoretical regret bounds to compare simulated regret against.

use crate::arm::Arm;
use crate::error::{BanditError, Result};

/// Gap `best_mean - mean` of every arm, or `None` if any mean is unknown.
pub fn gaps(arms: &[Arm]) -> Option<Vec<f64>> {
    let means = arms.iter().map(Arm::mean).collect::<Option<Vec<f64>>>()?;
    let best = means.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    Some(means.into_iter().map(|mean| best - mean).collect())
}

/// Upper bound on the expected regret of UCB with exploration constant
/// `alpha > 1` after `turns` turns:
///
/// ```text
/// sum over arms with gap > 0 of (alpha + 1) gap / (alpha - 1) + 2 alpha ln T / gap
/// ```
///
/// Horizons of two turns or fewer give 0.
pub fn ucb_regret_bound(gaps: &[f64], turns: usize, alpha: f64) -> Result<f64> {
    if !(alpha > 1.0 && alpha.is_finite()) {
        return Err(BanditError::invalid(format!(
            "the UCB bound needs alpha > 1, got {alpha}"
        )));
    }
    if let Some(gap) = gaps.iter().find(|gap| !(**gap >= 0.0 && gap.is_finite())) {
        return Err(BanditError::invalid(format!(
            "gaps must be non-negative, got {gap}"
        )));
    }
    if turns <= 2 {
        return Ok(0.0);
    }
    let log_t = (turns as f64).ln();
    Ok(gaps
        .iter()
        .filter(|gap| **gap > 0.0)
        .map(|gap| (alpha + 1.0) * gap / (alpha - 1.0) + 2.0 * alpha * log_t / gap)
        .sum())
}

/// Regret bound of the zooming algorithm at turn `t`:
/// `delta * t + multiplier * ln t * (1 / delta)^(1 + zooming_dimension)`.
pub fn zooming_regret_bound(
    t: usize,
    delta: f64,
    multiplier: f64,
    zooming_dimension: f64,
) -> Result<f64> {
    if !(delta > 0.0 && delta.is_finite()) {
        return Err(BanditError::invalid(format!(
            "delta must be positive, got {delta}"
        )));
    }
    if t == 0 {
        return Err(BanditError::InvalidTurnBudget { turns: t });
    }
    let t = t as f64;
    Ok(delta * t + multiplier * t.ln() * (1.0 / delta).powf(1.0 + zooming_dimension))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arm::bernoulli_arms;
    use approx::assert_relative_eq;

    #[test]
    fn test_gaps() {
        let arms = bernoulli_arms(&[0.25, 0.5, 0.75]).unwrap();
        assert_eq!(gaps(&arms).unwrap(), vec![0.5, 0.25, 0.0]);

        let mut arms = arms;
        arms.push(Arm::custom(|_| 1.0));
        assert!(gaps(&arms).is_none());
    }

    #[test]
    fn test_ucb_bound() {
        let bound = ucb_regret_bound(&[0.0, 0.25, 0.5], 100, 2.0).unwrap();
        let ln = 100.0_f64.ln();
        let expected = 3.0 * 0.25 + 4.0 * ln / 0.25 + 3.0 * 0.5 + 4.0 * ln / 0.5;
        assert_relative_eq!(bound, expected);
    }

    #[test]
    fn test_ucb_bound_edge_cases() {
        assert_eq!(ucb_regret_bound(&[0.0, 0.5], 2, 2.0).unwrap(), 0.0);
        assert_eq!(ucb_regret_bound(&[0.0, 0.0], 1000, 2.0).unwrap(), 0.0);
        assert!(ucb_regret_bound(&[0.5], 100, 1.0).is_err());
        assert!(ucb_regret_bound(&[-0.5], 100, 2.0).is_err());
    }

    #[test]
    fn test_zooming_bound() {
        let bound = zooming_regret_bound(10_000, 0.1, 1.0, 0.01).unwrap();
        let expected = 1000.0 + 10_000.0_f64.ln() * 10.0_f64.powf(1.01);
        assert_relative_eq!(bound, expected);
        assert!(zooming_regret_bound(10, 0.0, 1.0, 0.0).is_err());
        assert!(zooming_regret_bound(0, 0.1, 1.0, 0.0).is_err());
    }
}
