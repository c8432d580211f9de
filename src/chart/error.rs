//! Chart build errors.

use crate::core::EventKind;
use thiserror::Error;

/// A single problem found while building a dialogue chart.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum BuildError {
    #[error("State '{state}' has children but no initial child. Call .compound(name, initial)")]
    MissingInitial { state: String },

    #[error("State '{state}' names initial child '{initial}', which does not exist")]
    UnknownInitial { state: String, initial: String },

    #[error("State '{state}' is not compound but declares children")]
    ChildrenOnLeaf { state: String },

    #[error("State path '{path}' is declared more than once")]
    DuplicateState { path: String },

    #[error("State '{state}' has malformed {event} target '{target}'")]
    MalformedTarget {
        state: String,
        event: EventKind,
        target: String,
    },

    #[error("State '{state}' has {event} target '{target}', which resolves to no state")]
    UnknownTarget {
        state: String,
        event: EventKind,
        target: String,
    },

    #[error("State '{state}' has an unguarded {event} transition that is not last")]
    CatchAllNotLast { state: String, event: EventKind },
}

/// Every problem found in a chart, reported together.
#[derive(Debug, Clone, Error, PartialEq)]
#[error(
    "invalid dialogue chart ({} problem(s)): {}",
    .problems.len(),
    .problems.first().map(ToString::to_string).unwrap_or_default()
)]
pub struct InvalidChart {
    pub problems: Vec<BuildError>,
}
