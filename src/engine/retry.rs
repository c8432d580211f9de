//! Timeout escalation.
//!
//! Every `TIMEOUT` increments the context's retry count. When the count
//! reaches the limit the dialogue makes a hard reset to the initial state;
//! below the limit it apologizes and resumes the branch through history.

use crate::chart::TransitionDef;
use crate::core::{Action, DialogueContext, Guard, Template};
use serde::{Deserialize, Serialize};

/// Escalation policy for consecutive timeouts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    pub max_timeouts: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self { max_timeouts: 3 }
    }
}

impl RetryPolicy {
    pub fn new(max_timeouts: u32) -> Self {
        Self { max_timeouts }
    }

    /// Count after one more timeout. `None` (never timed out) becomes 1.
    pub fn next_count(ctx: &DialogueContext) -> u32 {
        ctx.retry_count.map_or(1, |count| count.saturating_add(1))
    }

    /// True if the next timeout reaches the limit.
    pub fn escalates(&self, ctx: &DialogueContext) -> bool {
        Self::next_count(ctx) >= self.max_timeouts
    }

    /// Reducer applied on a timeout below the limit.
    pub fn record_timeout(ctx: &DialogueContext) -> DialogueContext {
        DialogueContext {
            retry_count: Some(Self::next_count(ctx)),
            ..ctx.clone()
        }
    }

    /// Reducer applied on escalation: slots, knowledge result and retry
    /// count are all dropped.
    pub fn reset(ctx: &DialogueContext) -> DialogueContext {
        ctx.cleared()
    }

    /// `TIMEOUT` transitions for a branch: hard reset to `reset_target` at
    /// the limit, saying `farewell` on the way, otherwise `apology_target`.
    pub fn timeout_transitions(
        &self,
        reset_target: &str,
        apology_target: &str,
        farewell: Template,
    ) -> Vec<TransitionDef> {
        let policy = *self;
        vec![
            TransitionDef::to(reset_target)
                .guard(Guard::new(move |ctx: &DialogueContext| policy.escalates(ctx)))
                .action(Action::assign("retry_count", |ctx, _event| Self::reset(ctx)))
                .action(Action::Speak(farewell)),
            TransitionDef::to(apology_target)
                .action(Action::assign("retry_count", |ctx, _event| {
                    Self::record_timeout(ctx)
                })),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Directive, Event};
    use crate::engine::executor::execute;

    fn with_count(count: Option<u32>) -> DialogueContext {
        DialogueContext {
            retry_count: count,
            title: Some("lunch".to_string()),
            ..DialogueContext::default()
        }
    }

    #[test]
    fn first_timeout_counts_one() {
        assert_eq!(RetryPolicy::next_count(&with_count(None)), 1);
        assert_eq!(
            RetryPolicy::record_timeout(&with_count(None)).retry_count,
            Some(1)
        );
    }

    #[test]
    fn escalates_on_third_timeout() {
        let policy = RetryPolicy::default();

        assert!(!policy.escalates(&with_count(None)));
        assert!(!policy.escalates(&with_count(Some(1))));
        assert!(policy.escalates(&with_count(Some(2))));
    }

    #[test]
    fn reset_clears_count_and_slots() {
        let reset = RetryPolicy::reset(&with_count(Some(2)));

        assert_eq!(reset.retry_count, None);
        assert_eq!(reset.title, None);
    }

    #[test]
    fn custom_limit_is_respected() {
        let policy = RetryPolicy::new(1);
        assert!(policy.escalates(&with_count(None)));
    }

    #[test]
    fn timeout_transitions_put_escalation_first() {
        let transitions = RetryPolicy::default().timeout_transitions(
            "#idle",
            "#welcome_timeout",
            "Goodbye".into(),
        );

        assert_eq!(transitions.len(), 2);
        assert_eq!(transitions[0].target(), "#idle");
        assert!(!transitions[0].is_catch_all());
        assert_eq!(transitions[1].target(), "#welcome_timeout");
        assert!(transitions[1].is_catch_all());
    }

    #[test]
    fn reset_speaks_farewell_after_clearing() {
        let transitions = RetryPolicy::default().timeout_transitions(
            "#idle",
            "#welcome_timeout",
            "Sorry, we will start over. {title}".into(),
        );

        let mut outbox = Vec::new();
        let ctx = execute(
            transitions[0].effects(),
            with_count(Some(2)),
            Some(&Event::Timeout),
            &mut outbox,
        );

        assert_eq!(ctx.retry_count, None);
        assert_eq!(outbox, vec![Directive::speak("Sorry, we will start over. ")]);
    }
}
