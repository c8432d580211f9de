//! Guard predicates for controlling transitions.
//!
//! Guards are pure boolean functions over the dialogue context and the
//! event being processed. They decide whether a transition is eligible and
//! never mutate anything.

use super::context::DialogueContext;
use super::event::Event;
use std::fmt;
use std::sync::Arc;

type Predicate = dyn Fn(&DialogueContext, &Event) -> bool + Send + Sync;

/// Pure predicate that determines if a transition can fire.
///
/// # Example
///
/// ```rust
/// use parley::core::{DialogueContext, Event, Guard};
///
/// let confident = Guard::new(|ctx: &DialogueContext| ctx.confidence >= 0.6);
///
/// let ctx = DialogueContext { confidence: 0.9, ..DialogueContext::default() };
/// assert!(confident.check(&ctx, &Event::Timeout));
/// assert!(!confident.negate().check(&ctx, &Event::Timeout));
/// ```
#[derive(Clone)]
pub struct Guard {
    predicate: Arc<Predicate>,
}

impl Guard {
    /// Create a guard from a predicate over the context alone.
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(&DialogueContext) -> bool + Send + Sync + 'static,
    {
        Guard {
            predicate: Arc::new(move |ctx, _event| predicate(ctx)),
        }
    }

    /// Create a guard that also inspects the triggering event, e.g. the
    /// answer carried by a lookup completion.
    pub fn on_event<F>(predicate: F) -> Self
    where
        F: Fn(&DialogueContext, &Event) -> bool + Send + Sync + 'static,
    {
        Guard {
            predicate: Arc::new(predicate),
        }
    }

    pub fn check(&self, ctx: &DialogueContext, event: &Event) -> bool {
        (self.predicate)(ctx, event)
    }

    /// Both guards must hold. `other` is not evaluated if `self` fails.
    pub fn and(self, other: Guard) -> Guard {
        Guard::on_event(move |ctx, event| self.check(ctx, event) && other.check(ctx, event))
    }

    pub fn negate(self) -> Guard {
        Guard::on_event(move |ctx, event| !self.check(ctx, event))
    }
}

impl fmt::Debug for Guard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Guard(..)")
    }
}
