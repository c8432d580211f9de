//! Help and timeout states shared by every branch.
//!
//! For a branch `b` these are the top-level states `b_help` and `b_timeout`.
//! Both return to `b.hist` when they finish speaking, so the branch resumes
//! at the exact sub-step it was interrupted in.

use super::cues::{Cue, Cues};
use crate::chart::{StateDef, TransitionDef};
use crate::config::Prompts;
use crate::core::{Action, EventKind, Slot, Template};
use crate::engine::RetryPolicy;

/// Target of a hard reset.
pub const RESET_TARGET: &str = "#idle";

pub fn help_name(branch: &str) -> String {
    format!("{branch}_help")
}

pub fn timeout_name(branch: &str) -> String {
    format!("{branch}_timeout")
}

fn resume_target(branch: &str) -> String {
    format!("#{branch}.hist")
}

/// `RECOGNISED` transition into the branch's help state. Goes first in the
/// branch's list so "help" wins over every other reading of the turn.
pub fn help_transition(branch: &str, cues: &Cues) -> TransitionDef {
    TransitionDef::to(format!("#{}", help_name(branch)))
        .guard(cues.present(Cue::Entity("help")))
        .action(cues.fill(Slot::Help, Cue::Entity("help")))
}

/// `TIMEOUT` transitions for the branch and its support states. The reset
/// says goodbye before going quiet.
pub fn timeout_transitions(
    branch: &str,
    policy: RetryPolicy,
    prompts: &Prompts,
) -> Vec<TransitionDef> {
    policy.timeout_transitions(
        RESET_TARGET,
        &format!("#{}", timeout_name(branch)),
        prompts.reset.clone(),
    )
}

/// Help text for the branch. Silence here counts like silence anywhere
/// else in the branch.
pub fn help_state(
    branch: &str,
    text: Template,
    policy: RetryPolicy,
    prompts: &Prompts,
) -> StateDef {
    StateDef::atomic(help_name(branch))
        .entry(Action::speak(text))
        .on(EventKind::EndSpeech, TransitionDef::to(resume_target(branch)))
        .on_each(EventKind::Timeout, timeout_transitions(branch, policy, prompts))
}

/// Apology after silence. A further timeout here counts towards the same
/// limit.
pub fn timeout_state(branch: &str, policy: RetryPolicy, prompts: &Prompts) -> StateDef {
    StateDef::atomic(timeout_name(branch))
        .entry(Action::Speak(prompts.timeout.clone()))
        .on(EventKind::EndSpeech, TransitionDef::to(resume_target(branch)))
        .on_each(EventKind::Timeout, timeout_transitions(branch, policy, prompts))
}

/// Both support states for `branch`.
pub fn support_states(
    branch: &str,
    help: Template,
    policy: RetryPolicy,
    prompts: &Prompts,
) -> [StateDef; 2] {
    [
        help_state(branch, help, policy, prompts),
        timeout_state(branch, policy, prompts),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_follow_branch() {
        assert_eq!(help_name("query"), "query_help");
        assert_eq!(timeout_name("meeting"), "meeting_timeout");
    }

    #[test]
    fn timeout_transitions_reset_then_apologize() {
        let transitions =
            timeout_transitions("welcome", RetryPolicy::default(), &Prompts::default());

        assert_eq!(transitions[0].target(), "#idle");
        assert_eq!(transitions[1].target(), "#welcome_timeout");
    }

    #[test]
    fn support_states_are_named_per_branch() {
        let [help, timeout] = support_states(
            "meeting",
            "Help".into(),
            RetryPolicy::default(),
            &Prompts::default(),
        );

        assert_eq!(help.name(), "meeting_help");
        assert_eq!(timeout.name(), "meeting_timeout");
    }
}
