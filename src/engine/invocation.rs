//! Knowledge-base invocations bound to a state.
//!
//! Entering an invoking state starts a lookup and hands out a [`Ticket`].
//! Leaving the state cancels it by bumping the generation counter, so a
//! completion that arrives late no longer matches and is discarded.

use crate::core::{normalize, KnowledgeAnswer, StateId, Ticket};
use std::collections::HashMap;
use stillwater::effect::BoxedEffect;
use stillwater::prelude::*;
use thiserror::Error;

/// Errors reported by the knowledge-base collaborator.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum LookupError {
    #[error("Knowledge base unavailable: {0}")]
    Unavailable(String),

    #[error("Malformed knowledge base response: {0}")]
    Malformed(String),
}

/// Knowledge-base collaborator: answers a free-text subject.
///
/// An answer with an empty abstract means nothing was found; that is not an
/// error.
pub trait KnowledgeBase {
    fn lookup(&self, subject: &str) -> Result<KnowledgeAnswer, LookupError>;
}

/// Parse a JSON answer object. Only `Abstract` is required.
pub fn parse_answer(json: &str) -> Result<KnowledgeAnswer, LookupError> {
    serde_json::from_str(json).map_err(|e| LookupError::Malformed(e.to_string()))
}

/// Effect that queries the environment's knowledge base.
pub fn lookup<Env>(subject: String) -> BoxedEffect<KnowledgeAnswer, LookupError, Env>
where
    Env: KnowledgeBase + Clone + Send + Sync + 'static,
{
    from_fn(move |env: &Env| env.lookup(&subject)).boxed()
}

/// In-memory knowledge base keyed by normalized subject.
#[derive(Clone, Debug, Default)]
pub struct StaticKnowledgeBase {
    entries: HashMap<String, KnowledgeAnswer>,
}

impl StaticKnowledgeBase {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(mut self, subject: &str, abstract_text: impl Into<String>) -> Self {
        self.entries
            .insert(normalize(subject), KnowledgeAnswer::new(abstract_text));
        self
    }
}

impl KnowledgeBase for StaticKnowledgeBase {
    fn lookup(&self, subject: &str) -> Result<KnowledgeAnswer, LookupError> {
        Ok(self
            .entries
            .get(&normalize(subject))
            .cloned()
            .unwrap_or_default())
    }
}

/// Tracks the single live invocation and its generation.
#[derive(Clone, Debug, Default)]
pub struct InvocationHandler {
    generation: u64,
    live: Option<Ticket>,
}

impl InvocationHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start an invocation for `state`, replacing any previous one.
    pub fn start(&mut self, state: StateId) -> Ticket {
        self.generation += 1;
        let ticket = Ticket {
            state,
            generation: self.generation,
        };
        self.live = Some(ticket);
        ticket
    }

    /// Cancel the invocation bound to `state`, if it is live. Returns the
    /// cancelled ticket.
    pub fn cancel(&mut self, state: StateId) -> Option<Ticket> {
        match self.live {
            Some(ticket) if ticket.state == state => {
                self.generation += 1;
                self.live = None;
                Some(ticket)
            }
            _ => None,
        }
    }

    /// Accept a completion. Returns `false` for stale or unknown tickets,
    /// which must be discarded.
    pub fn complete(&mut self, ticket: Ticket) -> bool {
        if self.live == Some(ticket) {
            self.live = None;
            true
        } else {
            false
        }
    }

    pub fn live(&self) -> Option<Ticket> {
        self.live
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}
