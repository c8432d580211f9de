//! Crate-level error type.
//!
//! Dialogue-level trouble (no match, silence, low confidence, an empty
//! knowledge-base answer) is handled inside the chart and never surfaces
//! here. These errors are programming or deployment mistakes, reported when
//! a chart or configuration is loaded.

use crate::chart::InvalidChart;
use crate::config::ConfigError;
use crate::engine::LookupError;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum DialogueError {
    #[error(transparent)]
    InvalidChart(#[from] InvalidChart),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Lookup(#[from] LookupError),
}

pub type Result<T, E = DialogueError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::BuildError;

    #[test]
    fn wraps_chart_problems() {
        let error: DialogueError = InvalidChart {
            problems: vec![BuildError::DuplicateState {
                path: "#meeting".to_string(),
            }],
        }
        .into();

        assert!(error.to_string().contains("1 problem(s)"));
        assert!(error.to_string().contains("#meeting"));
    }

    #[test]
    fn wraps_config_problems() {
        let error: DialogueError = ConfigError::NoTimeoutsAllowed.into();
        assert_eq!(error.to_string(), "max_timeouts must be at least 1");
    }
}
