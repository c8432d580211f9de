//! Transition resolution.

use crate::core::{DialogueContext, Event, Transition};
use tracing::trace;

/// Pick the first enabled transition, in declaration order.
///
/// Guards are evaluated strictly in order and evaluation stops at the first
/// match; `None` means the event is ignored and the state is kept.
pub fn resolve<'a>(
    transitions: &'a [Transition],
    ctx: &DialogueContext,
    event: &Event,
) -> Option<&'a Transition> {
    transitions.iter().enumerate().find_map(|(position, transition)| {
        let enabled = transition.is_enabled(ctx, event);
        trace!(position, enabled, "evaluated guard");
        enabled.then_some(transition)
    })
}
