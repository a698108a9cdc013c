use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum AlgoError {
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(ConfigIssue),
    #[error("x has {x} values but y has {y}")]
    LengthMismatch { x: usize, y: usize },
    #[error("fit of degree {degree} needs at least {needed} points, got {got}")]
    NotEnoughPoints {
        degree: usize,
        needed: usize,
        got: usize,
    },
    #[error("normal equations are singular")]
    SingularFit,
}

/// The parameter that failed validation, with the rejected value.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
#[error("{self:?}")]
pub enum ConfigIssue {
    ZeroDays,
    ZeroRuns,
    TauOutOfRange(f64),
    TssOutOfRange(f64),
    InvertedTssRange { min_tss: f64, max_tss: f64 },
    RideProbabilityOutOfRange(f64),
    NonFiniteSeed(f64),
    SweepStepOutOfRange(f64),
    TooManySweepPoints(f64),
}

impl From<ConfigIssue> for AlgoError {
    fn from(issue: ConfigIssue) -> Self {
        AlgoError::InvalidConfiguration(issue)
    }
}
