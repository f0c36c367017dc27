use thiserror::Error;

use crate::StateId;

/// Errors that can occur in the pathology system
#[derive(Error, Debug)]
pub enum PathologyError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Unknown heuristic: {0}")]
    UnknownHeuristic(String),

    #[error("Unknown algorithm: {0}")]
    UnknownAlgorithm(String),

    #[error("Move {mv} is outside [0, {branching_factor})")]
    MoveOutOfRange { mv: usize, branching_factor: usize },

    #[error("Unknown state: {0}")]
    UnknownState(StateId),

    #[error("State {0} is terminal")]
    TerminalState(StateId),

    #[error("Pathology probe outside its domain: {0}")]
    ProbeOutOfDomain(String),

    #[error("No heuristic attached to the game tree")]
    MissingHeuristic,

    #[error("Failed to load histogram: {0}")]
    HistogramLoad(String),

    #[error("Snapshot error: {0}")]
    Snapshot(String),

    #[error("Search stopped before completing")]
    Cancelled,
}

impl PathologyError {
    /// Configuration errors are raised at construction and never retried.
    pub fn is_config(&self) -> bool {
        matches!(
            self,
            PathologyError::InvalidConfig(_)
                | PathologyError::UnknownHeuristic(_)
                | PathologyError::UnknownAlgorithm(_)
        )
    }
}

/// Convenience Result type for pathology operations
pub type Result<T> = std::result::Result<T, PathologyError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_classification() {
        assert!(PathologyError::InvalidConfig("depth".into()).is_config());
        assert!(PathologyError::UnknownHeuristic("foo".into()).is_config());
        assert!(!PathologyError::MissingHeuristic.is_config());
        assert!(!PathologyError::MoveOutOfRange {
            mv: 3,
            branching_factor: 2
        }
        .is_config());
    }

    #[test]
    fn test_display() {
        let err = PathologyError::MoveOutOfRange {
            mv: 5,
            branching_factor: 2,
        };
        assert_eq!(err.to_string(), "Move 5 is outside [0, 2)");
        let err = PathologyError::UnknownState(StateId::new(7));
        assert_eq!(err.to_string(), "Unknown state: #7");
    }
}
