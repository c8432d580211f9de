//! Slot and intent resolution.
//!
//! Guards never read utterances directly. They ask a [`SlotResolver`] for the
//! value of a category, so the same dialogue runs on the fixed-phrase
//! [`GrammarResolver`] or on predictions from an NLU service
//! ([`NluResolver`]).

mod grammar;
mod service;

pub use grammar::{default_grammar, Grammar, GrammarResolver, GrammarRule};
pub use service::NluResolver;

use crate::core::DialogueContext;

/// Extracts slot values from the current turn.
pub trait SlotResolver: Send + Sync {
    /// Value of `category` in the last recognition, if any.
    fn entity(&self, ctx: &DialogueContext, category: &str) -> Option<String>;

    /// Subject of a "who is" question, if the last recognition was one.
    fn question_subject(&self, ctx: &DialogueContext) -> Option<String>;
}
