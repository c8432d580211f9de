//! Async driver that answers knowledge-base lookups.
//!
//! The engine never waits: it emits a `LOOKUP` directive and expects a
//! `LOOKUP_DONE` event later. [`Session`] closes that loop by running each
//! lookup as an effect against its environment and feeding the answer back,
//! so callers only ever see speech directives.

use crate::config::DialogueConfig;
use crate::core::{Directive, Event, KnowledgeAnswer, TransitionJournal};
use crate::dialogue::appointment_chart;
use crate::engine::{lookup, DialogueEngine, KnowledgeBase};
use crate::error::Result;
use crate::nlu::SlotResolver;
use std::collections::VecDeque;
use std::sync::Arc;
use stillwater::prelude::*;
use tracing::warn;

/// One dialogue session bound to a knowledge-base environment.
pub struct Session<Env> {
    engine: DialogueEngine,
    env: Env,
}

impl<Env> Session<Env>
where
    Env: KnowledgeBase + Clone + Send + Sync + 'static,
{
    pub fn new(engine: DialogueEngine, env: Env) -> Self {
        Self { engine, env }
    }

    /// Session over the appointment assistant.
    pub fn appointment(
        resolver: Arc<dyn SlotResolver>,
        config: &DialogueConfig,
        env: Env,
    ) -> Result<Self> {
        let chart = appointment_chart(resolver, config)?;
        let engine = DialogueEngine::with_journal(
            Arc::new(chart),
            TransitionJournal::with_capacity(config.journal_capacity),
        );
        Ok(Self::new(engine, env))
    }

    pub fn engine(&self) -> &DialogueEngine {
        &self.engine
    }

    pub fn env(&self) -> &Env {
        &self.env
    }

    /// Process `event` and every lookup completion it leads to.
    ///
    /// Returns the speech directives produced along the way, in order. A
    /// failed lookup is logged and answered with an empty abstract, which
    /// the dialogue treats as "no results".
    pub async fn dispatch(&mut self, event: Event) -> Vec<Directive> {
        let mut queue = VecDeque::from([event]);
        let mut speech = Vec::new();

        while let Some(event) = queue.pop_front() {
            let step = self.engine.process_event(event);
            for directive in step.into_directives() {
                match directive {
                    Directive::Lookup { ticket, subject } => {
                        let answer = match lookup::<Env>(subject.clone()).run(&self.env).await {
                            Ok(answer) => answer,
                            Err(error) => {
                                warn!(%error, subject = %subject, "knowledge base lookup failed");
                                KnowledgeAnswer::default()
                            }
                        };
                        queue.push_back(Event::lookup_done(ticket, answer));
                    }
                    speech_directive => speech.push(speech_directive),
                }
            }
        }

        speech
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{LookupError, StaticKnowledgeBase};
    use crate::nlu::GrammarResolver;

    #[derive(Clone)]
    struct Offline;

    impl KnowledgeBase for Offline {
        fn lookup(&self, _subject: &str) -> Result<KnowledgeAnswer, LookupError> {
            Err(LookupError::Unavailable("offline".to_string()))
        }
    }

    async fn asking<Env>(env: Env) -> Session<Env>
    where
        Env: KnowledgeBase + Clone + Send + Sync + 'static,
    {
        let mut session = Session::appointment(
            Arc::new(GrammarResolver::default()),
            &DialogueConfig::default(),
            env,
        )
        .unwrap();
        session.dispatch(Event::Click).await;
        session.dispatch(Event::Click).await;
        session.dispatch(Event::recognised("query", 0.9)).await;
        session.dispatch(Event::EndSpeech).await;
        session
    }

    #[tokio::test]
    async fn answers_lookup_in_one_dispatch() {
        let kb = StaticKnowledgeBase::new()
            .with_entry("ada lovelace", "Ada Lovelace was a mathematician.");
        let mut session = asking(kb).await;

        let speech = session
            .dispatch(Event::recognised("who is Ada Lovelace", 0.9))
            .await;

        assert_eq!(speech, vec![Directive::speak("Ada Lovelace was a mathematician.")]);
        assert!(session.engine().is_in("query.speak_result"));
        assert_eq!(session.engine().pending_lookup(), None);
    }

    #[tokio::test]
    async fn failed_lookup_means_no_results() {
        let mut session = asking(Offline).await;

        let speech = session
            .dispatch(Event::recognised("who is Ada Lovelace", 0.9))
            .await;

        assert_eq!(speech, vec![Directive::speak("There seem to be no results for that.")]);
        assert!(session.engine().is_in("query.no_results"));
    }
}
