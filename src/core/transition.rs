//! Resolved transitions.

use super::action::Action;
use super::context::DialogueContext;
use super::event::Event;
use super::guard::Guard;
use super::state::StateId;

/// A guarded move to `target`, running `actions` on the way.
///
/// A transition without a guard is a catch-all.
#[derive(Clone, Debug)]
pub struct Transition {
    pub guard: Option<Guard>,
    pub target: StateId,
    pub actions: Vec<Action>,
}

impl Transition {
    pub fn is_catch_all(&self) -> bool {
        self.guard.is_none()
    }

    /// Check whether this transition may fire for the given context (pure).
    pub fn is_enabled(&self, ctx: &DialogueContext, event: &Event) -> bool {
        self.guard.as_ref().is_none_or(|g| g.check(ctx, event))
    }
}
