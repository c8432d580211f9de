//! Side effects attached to state entry and transitions.

use super::context::{DialogueContext, Slot};
use super::event::Event;
use super::template::Template;
use std::fmt;
use std::sync::Arc;

/// Pure context update: takes the current context and the triggering event,
/// returns the next context. The event is `None` for entry actions run while
/// the engine enters its initial state.
pub type Reducer = Arc<dyn Fn(&DialogueContext, Option<&Event>) -> DialogueContext + Send + Sync>;

/// One entry or transition action.
#[derive(Clone)]
pub enum Action {
    /// Ask the speech-output collaborator to say something.
    Speak(Template),

    /// Ask the speech-input collaborator for the next utterance.
    Listen,

    /// Replace the context with the reducer's output. `field` names what is
    /// being assigned, for logs.
    Assign {
        field: &'static str,
        reducer: Reducer,
    },
}

impl Action {
    pub fn speak(text: impl Into<Template>) -> Self {
        Action::Speak(text.into())
    }

    pub fn listen() -> Self {
        Action::Listen
    }

    pub fn assign<F>(field: &'static str, reducer: F) -> Self
    where
        F: Fn(&DialogueContext, Option<&Event>) -> DialogueContext + Send + Sync + 'static,
    {
        Action::Assign {
            field,
            reducer: Arc::new(reducer),
        }
    }

    /// Assign a slot from a value computed on the current context.
    pub fn assign_slot<F>(slot: Slot, value: F) -> Self
    where
        F: Fn(&DialogueContext) -> Option<String> + Send + Sync + 'static,
    {
        Action::assign(slot.name(), move |ctx, _event| {
            ctx.with_slot(slot, value(ctx))
        })
    }

    pub fn clear_slot(slot: Slot) -> Self {
        Action::assign(slot.name(), move |ctx, _event| ctx.with_slot(slot, None))
    }
}

impl fmt::Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Speak(template) => f.debug_tuple("Speak").field(&template.source()).finish(),
            Action::Listen => f.write_str("Listen"),
            Action::Assign { field, .. } => f.debug_struct("Assign").field("field", field).finish(),
        }
    }
}
