//! Error types for the banditry library.

use thiserror::Error;

/// Result type alias for simulation operations.
pub type Result<T> = std::result::Result<T, BanditError>;

/// Errors that can occur while configuring or running a simulation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BanditError {
    /// A result mode outside the recognized set was requested.
    #[error("invalid output mode: {mode}")]
    InvalidOutputMode { mode: String },

    /// A session was constructed without any arms.
    #[error("no arms available")]
    EmptyArmSet,

    /// A session was constructed with a turn budget below one.
    #[error("invalid turn budget: {turns} (must be at least 1)")]
    InvalidTurnBudget { turns: usize },

    /// Regret was requested but not every arm exposes its true mean.
    #[error("regret unavailable: not every arm exposes a true mean")]
    RegretUnavailable,

    /// A statistic was evaluated outside the region where it is defined.
    #[error("degenerate statistic: {message}")]
    DegenerateStatistic { message: String },

    /// Invalid parameter value.
    #[error("invalid parameter: {message}")]
    InvalidParameter { message: String },

    /// Mismatch in the dimensions of input or output data.
    #[error("dimension mismatch: {message}")]
    DimensionMismatch { message: String },

    /// An experiment was asked to run fewer than one trial.
    #[error("invalid trial count: {trials} (must be at least 1)")]
    InvalidTrialCount { trials: usize },

    /// A policy chose an arm that does not exist.
    #[error("policy chose arm {index} but only {arm_count} arms exist")]
    InvalidDecision { index: usize, arm_count: usize },

    /// A continuum policy was asked to observe a reward it never asked for.
    #[error("no pending decision to observe")]
    NoPendingDecision,
}

impl BanditError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        BanditError::InvalidParameter {
            message: message.into(),
        }
    }

    pub(crate) fn degenerate(message: impl Into<String>) -> Self {
        BanditError::DegenerateStatistic {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = BanditError::EmptyArmSet;
        assert_eq!(err.to_string(), "no arms available");

        let err = BanditError::InvalidParameter {
            message: "epsilon must be between 0 and 1".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "invalid parameter: epsilon must be between 0 and 1"
        );

        let err = BanditError::InvalidOutputMode {
            mode: "obj".to_string(),
        };
        assert_eq!(err.to_string(), "invalid output mode: obj");

        let err = BanditError::InvalidDecision {
            index: 5,
            arm_count: 3,
        };
        assert_eq!(err.to_string(), "policy chose arm 5 but only 3 arms exist");
    }

    #[test]
    fn test_error_helpers() {
        assert!(matches!(
            BanditError::invalid("alpha"),
            BanditError::InvalidParameter { .. }
        ));
        assert!(matches!(
            BanditError::degenerate("variance"),
            BanditError::DegenerateStatistic { .. }
        ));
    }
}
