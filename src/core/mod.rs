//! Core dialogue types.
//!
//! This module contains the pure pieces the engine is assembled from:
//! - The dialogue context and its slots
//! - Events, directives and invocation tickets
//! - Guards, actions, prompt templates and resolved transitions
//! - State nodes of the dialogue tree
//! - Deep history and the transition journal
//!
//! Nothing here performs I/O; guards and reducers are plain functions.

mod action;
mod context;
mod event;
mod guard;
mod history;
mod state;
mod template;
mod transition;

pub use action::{Action, Reducer};
pub use context::{normalize, DialogueContext, Entity, KnowledgeAnswer, Slot};
pub use event::{Directive, Event, EventKind, Recognition, Ticket};
pub use guard::Guard;
pub use history::{HistoryTracker, TransitionJournal, TransitionRecord};
pub use state::{Invoke, NodeKind, StateId, StateNode, SubjectFn};
pub use template::Template;
pub use transition::Transition;
