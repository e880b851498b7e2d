use crate::error::{BanditError, Result};

/// Running reward statistics for one arm.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub(crate) struct ArmStats {
    pub pulls: usize,
    pub total_reward: f64,
    pub sum_of_squares: f64,
}

impl ArmStats {
    /// Fresh statistics for `arm_count` arms.
    pub fn table(arm_count: usize) -> Vec<ArmStats> {
        vec![ArmStats::default(); arm_count]
    }

    pub fn record(&mut self, reward: f64) {
        self.pulls += 1;
        self.total_reward += reward;
        self.sum_of_squares += reward * reward;
    }

    pub fn average_reward(&self) -> f64 {
        if self.pulls == 0 {
            0.0
        } else {
            self.total_reward / self.pulls as f64
        }
    }

    /// Variance of the observed rewards around their mean (divides by n).
    pub fn population_variance(&self) -> Result<f64> {
        if self.pulls == 0 {
            return Err(BanditError::degenerate(
                "variance of an arm that was never pulled",
            ));
        }
        let n = self.pulls as f64;
        let mean = self.average_reward();
        Ok((self.sum_of_squares / n - mean * mean).max(0.0))
    }

    /// Unbiased sample variance (divides by n - 1).
    pub fn sample_variance(&self) -> Result<f64> {
        if self.pulls < 2 {
            return Err(BanditError::degenerate(format!(
                "sample variance needs two pulls, arm has {}",
                self.pulls
            )));
        }
        let n = self.pulls as f64;
        let mean = self.average_reward();
        Ok(((self.sum_of_squares - n * mean * mean) / (n - 1.0)).max(0.0))
    }
}

/// Records `reward` for `arm`, ignoring arms outside the table.
pub(crate) fn record(stats: &mut [ArmStats], arm: usize, reward: f64) {
    if let Some(entry) = stats.get_mut(arm) {
        entry.record(reward);
    }
}
