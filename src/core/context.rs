//! Dialogue context: the mutable record every guard and action reads.
//!
//! The context has a single owner, the engine. Slot fields are only ever
//! written through `Assign` actions. The turn metadata (`last_utterance`,
//! `confidence`, `entities`, `top_intent`) is refreshed by the engine when
//! a recognition event arrives.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A typed fragment extracted from an utterance, e.g. `time` / `"10"`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    pub category: String,
    pub text: String,
}

impl Entity {
    pub fn new(category: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            text: text.into(),
        }
    }
}

/// Answer returned by the knowledge-base collaborator.
///
/// Only `Abstract` is required; an empty abstract means "no answer found".
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeAnswer {
    #[serde(rename = "Abstract")]
    pub abstract_text: String,

    #[serde(rename = "Heading", default, skip_serializing_if = "Option::is_none")]
    pub heading: Option<String>,

    #[serde(
        rename = "AbstractURL",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub source_url: Option<String>,
}

impl KnowledgeAnswer {
    pub fn new(abstract_text: impl Into<String>) -> Self {
        Self {
            abstract_text: abstract_text.into(),
            ..Self::default()
        }
    }

    /// Whether the lookup produced something worth speaking.
    pub fn has_abstract(&self) -> bool {
        !self.abstract_text.trim().is_empty()
    }
}

/// Named slots of the dialogue context.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Slot {
    Title,
    Day,
    Time,
    Accept,
    Decline,
    Category,
    Help,
}

impl Slot {
    pub const ALL: [Slot; 7] = [
        Slot::Title,
        Slot::Day,
        Slot::Time,
        Slot::Accept,
        Slot::Decline,
        Slot::Category,
        Slot::Help,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Day => "day",
            Self::Time => "time",
            Self::Accept => "accept",
            Self::Decline => "decline",
            Self::Category => "category",
            Self::Help => "help",
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Accumulated state of one conversation.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DialogueContext {
    pub last_utterance: String,
    pub confidence: f64,
    pub entities: Vec<Entity>,
    pub top_intent: Option<String>,

    pub title: Option<String>,
    pub day: Option<String>,
    pub time: Option<String>,
    pub accept: Option<String>,
    pub decline: Option<String>,
    pub category: Option<String>,
    pub help: Option<String>,

    pub knowledge_base_result: Option<KnowledgeAnswer>,

    /// Consecutive timeouts. `None` until the first one.
    pub retry_count: Option<u32>,
}

impl DialogueContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn slot(&self, slot: Slot) -> Option<&str> {
        let value = match slot {
            Slot::Title => &self.title,
            Slot::Day => &self.day,
            Slot::Time => &self.time,
            Slot::Accept => &self.accept,
            Slot::Decline => &self.decline,
            Slot::Category => &self.category,
            Slot::Help => &self.help,
        };
        value.as_deref()
    }

    /// Return a copy of the context with `slot` replaced.
    pub fn with_slot(&self, slot: Slot, value: Option<String>) -> Self {
        let mut next = self.clone();
        let field = match slot {
            Slot::Title => &mut next.title,
            Slot::Day => &mut next.day,
            Slot::Time => &mut next.time,
            Slot::Accept => &mut next.accept,
            Slot::Decline => &mut next.decline,
            Slot::Category => &mut next.category,
            Slot::Help => &mut next.help,
        };
        *field = value;
        next
    }

    /// The utterance as the grammar sees it: lowercased, trimmed, trailing
    /// punctuation removed.
    pub fn normalized_utterance(&self) -> String {
        normalize(&self.last_utterance)
    }

    /// Context after a hard reset: slots, knowledge result and retry count
    /// are dropped, the last turn is kept.
    pub fn cleared(&self) -> Self {
        Self {
            last_utterance: self.last_utterance.clone(),
            confidence: self.confidence,
            entities: self.entities.clone(),
            top_intent: self.top_intent.clone(),
            ..Self::default()
        }
    }

    /// Look up a named field for prompt interpolation.
    pub fn field(&self, name: &str) -> Option<String> {
        match name {
            "utterance" => Some(self.last_utterance.clone()),
            "heard" => Some(self.normalized_utterance()),
            "confidence" => Some(format!("{:.2}", self.confidence)),
            "intent" => self.top_intent.clone(),
            "abstract" => self
                .knowledge_base_result
                .as_ref()
                .map(|answer| answer.abstract_text.clone()),
            "heading" => self
                .knowledge_base_result
                .as_ref()
                .and_then(|answer| answer.heading.clone()),
            "retry_count" => self.retry_count.map(|count| count.to_string()),
            other => Slot::ALL
                .iter()
                .find(|slot| slot.name() == other)
                .and_then(|slot| self.slot(*slot).map(str::to_string)),
        }
    }
}

/// Lowercase, trim and strip trailing punctuation.
pub fn normalize(text: &str) -> String {
    text.trim_start()
        .trim_end_matches(|c: char| c.is_whitespace() || matches!(c, '.' | '?' | '!' | ','))
        .to_lowercase()
}
