//! Action execution.

use crate::core::{Action, DialogueContext, Directive, Event};
use tracing::trace;

/// Run `actions` in order against `ctx`, pushing directives to `outbox`.
///
/// Each assignment replaces the context before the next action runs, so a
/// `Speak` placed after an `Assign` sees the new value.
pub fn execute(
    actions: &[Action],
    ctx: DialogueContext,
    event: Option<&Event>,
    outbox: &mut Vec<Directive>,
) -> DialogueContext {
    actions.iter().fold(ctx, |ctx, action| match action {
        Action::Speak(template) => {
            outbox.push(Directive::Speak {
                text: template.render(&ctx),
            });
            ctx
        }
        Action::Listen => {
            outbox.push(Directive::Listen);
            ctx
        }
        Action::Assign { field, reducer } => {
            trace!(field = *field, "assign");
            reducer(&ctx, event)
        }
    })
}
