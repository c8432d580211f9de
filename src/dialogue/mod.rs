//! The appointment and question-answering assistant.
//!
//! ```text
//! idle --CLICK--> init --CLICK/TTS_READY--> welcome
//! welcome: "meeting" -> meeting, "query" -> query
//! query:   "who is X" -> lookup -> answer -> "yes" -> meeting.when
//! meeting: title -> day -> whole day? -> [time] -> confirmation -> finalized -> init
//! ```
//!
//! Each branch checks its `RECOGNISED` transitions in a fixed order: help
//! first, then every cue as a confident/tentative pair, then a catch-all to
//! the branch's no-match state. A tentative match assigns the candidate and
//! asks for confirmation. Silence in any branch goes through the retry
//! policy.

mod confirmation;
mod cues;
pub mod support;

pub use confirmation::Confirmation;
pub use cues::{Cue, Cues};

use crate::chart::{ChartBuilder, StateChart, StateDef, TransitionDef};
use crate::config::{DialogueConfig, Prompts};
use crate::core::{Action, DialogueContext, Event, EventKind, Guard, Invoke, Slot, Template};
use crate::engine::RetryPolicy;
use crate::error::Result;
use crate::nlu::SlotResolver;
use std::sync::Arc;

/// Build the full assistant chart.
///
/// # Example
///
/// ```rust
/// use parley::config::DialogueConfig;
/// use parley::dialogue::appointment_chart;
/// use parley::engine::DialogueEngine;
/// use parley::nlu::GrammarResolver;
/// use parley::core::Event;
/// use std::sync::Arc;
///
/// let chart = appointment_chart(Arc::new(GrammarResolver::default()), &DialogueConfig::default())
///     .unwrap();
/// let mut engine = DialogueEngine::new(Arc::new(chart));
///
/// engine.process_event(Event::Click);
/// engine.process_event(Event::Click);
/// assert!(engine.is_in("welcome.prompt"));
/// ```
pub fn appointment_chart(
    resolver: Arc<dyn SlotResolver>,
    config: &DialogueConfig,
) -> Result<StateChart> {
    config.validate()?;

    let cues = Cues::new(resolver, config.confidence_threshold);
    let prompts = &config.prompts;
    let policy = config.retry_policy();

    let chart = ChartBuilder::new()
        .initial("idle")
        .state(StateDef::atomic("idle").on(EventKind::Click, TransitionDef::to("init")))
        .state(
            StateDef::atomic("init")
                .on(EventKind::TtsReady, TransitionDef::to("welcome"))
                .on(EventKind::Click, TransitionDef::to("welcome")),
        )
        .state(welcome(&cues, prompts, policy))
        .state(query(&cues, prompts, policy))
        .state(meeting(&cues, prompts, policy))
        .states(support::support_states(
            "welcome",
            prompts.welcome_help.clone(),
            policy,
            prompts,
        ))
        .states(support::support_states(
            "query",
            prompts.query_help.clone(),
            policy,
            prompts,
        ))
        .states(support::support_states(
            "meeting",
            prompts.meeting_help.clone(),
            policy,
            prompts,
        ))
        .build()?;

    Ok(chart)
}

/// Speak, then move to the sibling `next` when speech ends.
fn say(name: &str, text: &Template, next: &str) -> StateDef {
    StateDef::atomic(name)
        .entry(Action::Speak(text.clone()))
        .on(EventKind::EndSpeech, TransitionDef::to(next))
}

fn listen() -> StateDef {
    StateDef::atomic("ask").entry(Action::listen())
}

fn welcome(cues: &Cues, prompts: &Prompts, policy: RetryPolicy) -> StateDef {
    let [to_query, confirm_query] =
        cues.gated(Cue::Entity("query"), Slot::Category, "#query", ".confirm_query");
    let [to_meeting, confirm_meeting] =
        cues.gated(Cue::Entity("meeting"), Slot::Category, "#meeting", ".confirm_meeting");

    StateDef::compound("welcome", "prompt")
        .on(EventKind::Recognised, support::help_transition("welcome", cues))
        .on_each(
            EventKind::Recognised,
            [to_query, confirm_query, to_meeting, confirm_meeting],
        )
        .on(EventKind::Recognised, TransitionDef::to(".nomatch"))
        .on_each(EventKind::Timeout, support::timeout_transitions("welcome", policy, prompts))
        .children([
            say("prompt", &prompts.welcome, "ask"),
            listen(),
            say("nomatch", &prompts.nomatch, "ask"),
            StateDef::history("hist"),
            confirmation::heard(
                "welcome",
                "confirm_query",
                Slot::Category,
                "#query",
                "#welcome.prompt",
                prompts,
            )
            .build(cues, prompts),
            confirmation::heard(
                "welcome",
                "confirm_meeting",
                Slot::Category,
                "#meeting",
                "#welcome.prompt",
                prompts,
            )
            .build(cues, prompts),
        ])
}

fn query(cues: &Cues, prompts: &Prompts, policy: RetryPolicy) -> StateDef {
    let [understood, confirm_request] =
        cues.gated(Cue::Subject, Slot::Title, ".understood", ".confirm_request");

    StateDef::compound("query", "question")
        .on(EventKind::Recognised, support::help_transition("query", cues))
        .on_each(EventKind::Recognised, [understood, confirm_request])
        .on(
            EventKind::Recognised,
            TransitionDef::to("#meeting.when")
                .guard(cues.present(Cue::Entity("accept")))
                .action(cues.fill(Slot::Accept, Cue::Entity("accept"))),
        )
        .on(
            EventKind::Recognised,
            TransitionDef::to("#init")
                .guard(cues.present(Cue::Entity("decline")))
                .action(cues.fill(Slot::Decline, Cue::Entity("decline"))),
        )
        .on(EventKind::Recognised, TransitionDef::to(".no_matches"))
        .on_each(EventKind::Timeout, support::timeout_transitions("query", policy, prompts))
        .children([
            say("question", &prompts.question, "ask"),
            StateDef::atomic("understood")
                .invoke(Invoke::new(|ctx: &DialogueContext| {
                    ctx.title.clone().unwrap_or_default()
                }))
                .on(
                    EventKind::LookupDone,
                    TransitionDef::to("speak_result")
                        .guard(Guard::on_event(|_ctx, event| {
                            event.answer().is_some_and(|answer| answer.has_abstract())
                        }))
                        .action(Action::assign("knowledge_base_result", |ctx, event| {
                            DialogueContext {
                                knowledge_base_result: event.and_then(Event::answer).cloned(),
                                ..ctx.clone()
                            }
                        })),
                )
                .on(EventKind::LookupDone, TransitionDef::to("no_results")),
            say("speak_result", &prompts.answer, "meet_person"),
            say("meet_person", &prompts.meet_person, "ask"),
            say("no_results", &prompts.no_results, "question"),
            listen(),
            say("no_matches", &prompts.nomatch, "ask"),
            StateDef::history("hist"),
            confirmation::heard(
                "query",
                "confirm_request",
                Slot::Title,
                "#query.understood",
                "#query.question",
                prompts,
            )
            .build(cues, prompts),
        ])
}

fn meeting(cues: &Cues, prompts: &Prompts, policy: RetryPolicy) -> StateDef {
    let [to_when, confirm_what] =
        cues.gated(Cue::Entity("title"), Slot::Title, ".when", ".confirm_what");
    let [to_whole_day, confirm_when] =
        cues.gated(Cue::Entity("day"), Slot::Day, ".whole_day", ".confirm_when");
    let [to_confirmation, confirm_time] =
        cues.gated(Cue::Entity("time"), Slot::Time, ".confirmation", ".confirm_time");

    StateDef::compound("meeting", "start_meeting")
        .on(EventKind::Recognised, support::help_transition("meeting", cues))
        .on_each(
            EventKind::Recognised,
            [
                to_when,
                confirm_what,
                to_whole_day,
                confirm_when,
                to_confirmation,
                confirm_time,
            ],
        )
        .on(EventKind::Recognised, TransitionDef::to(".nomatch"))
        .on_each(EventKind::Timeout, support::timeout_transitions("meeting", policy, prompts))
        .children([
            say("start_meeting", &prompts.start_meeting, "what"),
            say("what", &prompts.what, "ask"),
            say("when", &prompts.when, "ask"),
            say("time", &prompts.time, "ask"),
            listen(),
            say("nomatch", &prompts.nomatch, "ask"),
            StateDef::history("hist"),
            Confirmation::new(
                "whole_day",
                prompts.whole_day.clone(),
                "#meeting.whole_day_confirmation",
                "#meeting.time",
            )
            .help_from("meeting")
            .build(cues, prompts),
            Confirmation::new(
                "whole_day_confirmation",
                prompts.confirm_whole_day.clone(),
                "#meeting.finalized",
                "#meeting.what",
            )
            .help_from("meeting")
            .build(cues, prompts),
            Confirmation::new(
                "confirmation",
                prompts.confirm_meeting.clone(),
                "#meeting.finalized",
                "#meeting.what",
            )
            .help_from("meeting")
            .build(cues, prompts),
            StateDef::atomic("finalized")
                .entry(Action::Speak(prompts.finalized.clone()))
                .on(EventKind::EndSpeech, TransitionDef::to("#init")),
            confirmation::heard(
                "meeting",
                "confirm_what",
                Slot::Title,
                "#meeting.when",
                "#meeting.what",
                prompts,
            )
            .build(cues, prompts),
            confirmation::heard(
                "meeting",
                "confirm_when",
                Slot::Day,
                "#meeting.whole_day",
                "#meeting.when",
                prompts,
            )
            .build(cues, prompts),
            confirmation::heard(
                "meeting",
                "confirm_time",
                Slot::Time,
                "#meeting.confirmation",
                "#meeting.time",
                prompts,
            )
            .build(cues, prompts),
        ])
}
