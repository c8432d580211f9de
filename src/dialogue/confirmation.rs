//! Yes/no confirmation sub-flows.
//!
//! Every confirmation has the same shape: a compound state that asks a
//! question, listens, and apologizes on anything that is neither "yes" nor
//! "no". Accept and decline jump to absolute targets, so a flow nested deep
//! in one branch can finish anywhere in the chart.

use super::cues::{Cue, Cues};
use super::support;
use crate::chart::{StateDef, TransitionDef};
use crate::config::Prompts;
use crate::core::{Action, EventKind, Slot, Template};

/// A confirmation flow waiting to be built.
#[derive(Clone, Debug)]
pub struct Confirmation {
    name: String,
    question: Template,
    on_accept: String,
    on_decline: String,
    candidate: Option<Slot>,
    help: Option<String>,
}

impl Confirmation {
    pub fn new(
        name: impl Into<String>,
        question: Template,
        on_accept: impl Into<String>,
        on_decline: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            question,
            on_accept: on_accept.into(),
            on_decline: on_decline.into(),
            candidate: None,
            help: None,
        }
    }

    /// Clear `slot` when the user declines. Used for flows that confirm a
    /// value assigned on a low-confidence match.
    pub fn candidate(mut self, slot: Slot) -> Self {
        self.candidate = Some(slot);
        self
    }

    /// Route "help" to `branch`'s help state before anything else.
    pub fn help_from(mut self, branch: impl Into<String>) -> Self {
        self.help = Some(branch.into());
        self
    }

    pub fn build(self, cues: &Cues, prompts: &Prompts) -> StateDef {
        let mut decline = TransitionDef::to(self.on_decline)
            .guard(cues.present(Cue::Entity("decline")))
            .action(cues.fill(Slot::Decline, Cue::Entity("decline")));
        if let Some(slot) = self.candidate {
            decline = decline.action(Action::clear_slot(slot));
        }

        let help = self
            .help
            .map(|branch| support::help_transition(&branch, cues));

        StateDef::compound(self.name, "prompt")
            .on_each(EventKind::Recognised, help)
            .on(
                EventKind::Recognised,
                TransitionDef::to(self.on_accept)
                    .guard(cues.present(Cue::Entity("accept")))
                    .action(cues.fill(Slot::Accept, Cue::Entity("accept"))),
            )
            .on(EventKind::Recognised, decline)
            .on(EventKind::Recognised, TransitionDef::to(".nomatch"))
            .child(
                StateDef::atomic("prompt")
                    .entry(Action::Speak(self.question))
                    .on(EventKind::EndSpeech, TransitionDef::to("ask")),
            )
            .child(StateDef::atomic("ask").entry(Action::listen()))
            .child(
                StateDef::atomic("nomatch")
                    .entry(Action::Speak(prompts.nomatch.clone()))
                    .on(EventKind::EndSpeech, TransitionDef::to("ask")),
            )
    }
}

/// Confirmation of a value heard with low confidence: asks whether the
/// normalized utterance is what the user meant.
pub fn heard(
    branch: &str,
    name: &str,
    candidate: Slot,
    on_accept: &str,
    on_decline: &str,
    prompts: &Prompts,
) -> Confirmation {
    Confirmation::new(name, prompts.confirm_heard.clone(), on_accept, on_decline)
        .candidate(candidate)
        .help_from(branch)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::ChartBuilder;
    use crate::core::{DialogueContext, Event};
    use crate::engine::DialogueEngine;
    use crate::nlu::GrammarResolver;
    use std::sync::Arc;

    fn engine() -> DialogueEngine {
        let prompts = Prompts::default();
        let cues = Cues::new(Arc::new(GrammarResolver::default()), 0.6);
        let chart = ChartBuilder::new()
            .initial("idle")
            .state(StateDef::atomic("idle").on(
                EventKind::Click,
                TransitionDef::to("check").action(Action::assign_slot(Slot::Title, |_ctx| {
                    Some("lunch".to_string())
                })),
            ))
            .state(
                Confirmation::new("check", prompts.confirm_heard.clone(), "#accepted", "#declined")
                    .candidate(Slot::Title)
                    .build(&cues, &prompts),
            )
            .state(StateDef::atomic("accepted"))
            .state(StateDef::atomic("declined"))
            .build()
            .unwrap();
        DialogueEngine::new(Arc::new(chart))
    }

    #[test]
    fn asks_then_listens() {
        let mut engine = engine();
        engine.process_event(Event::Click);
        assert!(engine.is_in("check.prompt"));

        let step = engine.process_event(Event::EndSpeech);
        assert!(engine.is_in("check.ask"));
        assert_eq!(step.directives(), &[crate::core::Directive::Listen]);
    }

    #[test]
    fn accept_keeps_candidate() {
        let mut engine = engine();
        engine.process_event(Event::Click);
        engine.process_event(Event::recognised("yes", 0.9));

        assert!(engine.is_in("accepted"));
        assert_eq!(engine.context().accept.as_deref(), Some("yes"));
        assert_eq!(engine.context().title.as_deref(), Some("lunch"));
    }

    #[test]
    fn decline_clears_candidate() {
        let mut engine = engine();
        engine.process_event(Event::Click);
        engine.process_event(Event::recognised("no", 0.9));

        assert!(engine.is_in("declined"));
        assert_eq!(engine.context().decline.as_deref(), Some("no"));
        assert_eq!(engine.context().title, None);
    }

    #[test]
    fn anything_else_apologizes() {
        let mut engine = engine();
        engine.process_event(Event::Click);
        let step = engine.process_event(Event::recognised("maybe", 0.9));

        assert!(engine.is_in("check.nomatch"));
        assert_eq!(
            step.spoken(),
            vec!["Sorry, I can't seem to recognize what is maybe, try a different word."]
        );
        assert_eq!(engine.context(), &DialogueContext {
            last_utterance: "maybe".to_string(),
            confidence: 0.9,
            title: Some("lunch".to_string()),
            ..DialogueContext::default()
        });
    }
}
