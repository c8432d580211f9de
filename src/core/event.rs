//! Inbound events and outbound directives.

use super::context::{Entity, KnowledgeAnswer};
use super::state::StateId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One speech-input turn as delivered by the recognizer (and, optionally,
/// an external NLU service).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Recognition {
    pub utterance: String,
    pub confidence: f64,
    #[serde(default)]
    pub entities: Vec<Entity>,
    #[serde(rename = "topIntent", default, skip_serializing_if = "Option::is_none")]
    pub top_intent: Option<String>,
}

/// Identifies one knowledge-base invocation.
///
/// A completion is only applied if its ticket is still the live one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Ticket {
    pub state: StateId,
    pub generation: u64,
}

/// Events consumed by the engine.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    #[serde(rename = "CLICK")]
    Click,
    #[serde(rename = "TTS_READY")]
    TtsReady,
    #[serde(rename = "RECOGNISED")]
    Recognised(Recognition),
    #[serde(rename = "ENDSPEECH")]
    EndSpeech,
    #[serde(rename = "TIMEOUT")]
    Timeout,
    #[serde(rename = "LOOKUP_DONE")]
    LookupDone {
        ticket: Ticket,
        answer: KnowledgeAnswer,
    },
}

impl Event {
    /// Recognition event without NLU output.
    pub fn recognised(utterance: impl Into<String>, confidence: f64) -> Self {
        Self::Recognised(Recognition {
            utterance: utterance.into(),
            confidence,
            entities: Vec::new(),
            top_intent: None,
        })
    }

    /// Recognition event carrying an NLU prediction.
    pub fn understood(
        utterance: impl Into<String>,
        confidence: f64,
        top_intent: impl Into<String>,
        entities: Vec<Entity>,
    ) -> Self {
        Self::Recognised(Recognition {
            utterance: utterance.into(),
            confidence,
            entities,
            top_intent: Some(top_intent.into()),
        })
    }

    pub fn lookup_done(ticket: Ticket, answer: KnowledgeAnswer) -> Self {
        Self::LookupDone { ticket, answer }
    }

    pub fn kind(&self) -> EventKind {
        match self {
            Self::Click => EventKind::Click,
            Self::TtsReady => EventKind::TtsReady,
            Self::Recognised(_) => EventKind::Recognised,
            Self::EndSpeech => EventKind::EndSpeech,
            Self::Timeout => EventKind::Timeout,
            Self::LookupDone { .. } => EventKind::LookupDone,
        }
    }

    /// The knowledge answer carried by a completion event.
    pub fn answer(&self) -> Option<&KnowledgeAnswer> {
        match self {
            Self::LookupDone { answer, .. } => Some(answer),
            _ => None,
        }
    }
}

/// Discriminant used to key transition lists.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    Click,
    TtsReady,
    Recognised,
    EndSpeech,
    Timeout,
    LookupDone,
}

impl EventKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Click => "CLICK",
            Self::TtsReady => "TTS_READY",
            Self::Recognised => "RECOGNISED",
            Self::EndSpeech => "ENDSPEECH",
            Self::Timeout => "TIMEOUT",
            Self::LookupDone => "LOOKUP_DONE",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Directives produced for the speech and knowledge-base collaborators.
///
/// All directives are fire-and-forget from the engine's point of view.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Directive {
    #[serde(rename = "SPEAK")]
    Speak { text: String },
    #[serde(rename = "LISTEN")]
    Listen,
    #[serde(rename = "LOOKUP")]
    Lookup { ticket: Ticket, subject: String },
}

impl Directive {
    pub fn speak(text: impl Into<String>) -> Self {
        Self::Speak { text: text.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognised_event_deserializes_with_optional_nlu_fields() {
        let json = r#"{"type": "RECOGNISED", "utterance": "at 10", "confidence": 0.82}"#;
        let event: Event = serde_json::from_str(json).unwrap();

        assert_eq!(event, Event::recognised("at 10", 0.82));
        assert_eq!(event.kind(), EventKind::Recognised);
    }

    #[test]
    fn recognised_event_reads_top_intent_and_entities() {
        let json = r#"{
            "type": "RECOGNISED",
            "utterance": "book a lecture",
            "confidence": 0.9,
            "topIntent": "create a meeting",
            "entities": [{"category": "meeting", "text": "lecture"}]
        }"#;
        let event: Event = serde_json::from_str(json).unwrap();

        match event {
            Event::Recognised(recognition) => {
                assert_eq!(recognition.top_intent.as_deref(), Some("create a meeting"));
                assert_eq!(recognition.entities, vec![Entity::new("meeting", "lecture")]);
            }
            other => panic!("Expected recognition, got {:?}", other),
        }
    }

    #[test]
    fn unit_events_use_wire_names() {
        let event: Event = serde_json::from_str(r#"{"type": "ENDSPEECH"}"#).unwrap();
        assert_eq!(event, Event::EndSpeech);

        let json = serde_json::to_string(&Event::TtsReady).unwrap();
        assert_eq!(json, r#"{"type":"TTS_READY"}"#);
    }

    #[test]
    fn directives_serialize_with_type_tag() {
        let json = serde_json::to_string(&Directive::speak("On what day?")).unwrap();
        assert_eq!(json, r#"{"type":"SPEAK","text":"On what day?"}"#);

        let json = serde_json::to_string(&Directive::Listen).unwrap();
        assert_eq!(json, r#"{"type":"LISTEN"}"#);
    }
}
