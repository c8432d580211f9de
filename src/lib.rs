//! Parley: a hierarchical dialogue state machine for spoken assistants
//!
//! Parley drives a voice conversation by tracking where the dialogue is in a
//! tree of nested states and deciding, for every recognized utterance, what
//! to say next and where to go. The chart is built once; each session runs
//! it in its own [`engine::DialogueEngine`].
//!
//! # Core Concepts
//!
//! - **Context**: the slots and turn metadata guards read and actions write
//! - **Chart**: an arena of states with targets resolved at build time
//! - **Guards**: ordered, first-match predicates over context and event
//! - **History**: interrupted sub-dialogues resume at their deepest leaf
//! - **Invocations**: knowledge-base lookups that are cancelled on exit
//!
//! # Example
//!
//! ```rust
//! use parley::config::DialogueConfig;
//! use parley::core::{Directive, Event};
//! use parley::dialogue::appointment_chart;
//! use parley::engine::DialogueEngine;
//! use parley::nlu::GrammarResolver;
//! use std::sync::Arc;
//!
//! let chart = appointment_chart(Arc::new(GrammarResolver::default()), &DialogueConfig::default())
//!     .unwrap();
//! let mut engine = DialogueEngine::new(Arc::new(chart));
//!
//! engine.process_event(Event::Click);
//! engine.process_event(Event::Click);
//! engine.process_event(Event::recognised("meeting", 0.9));
//! engine.process_event(Event::EndSpeech);
//!
//! let step = engine.process_event(Event::EndSpeech);
//! assert_eq!(step.directives(), &[Directive::Listen]);
//!
//! let step = engine.process_event(Event::recognised("Lunch.", 0.8));
//! assert!(engine.is_in("meeting.when"));
//! assert_eq!(step.spoken(), vec!["On what day?"]);
//! assert_eq!(engine.context().title.as_deref(), Some("lunch"));
//! ```

pub mod chart;
pub mod config;
pub mod core;
pub mod dialogue;
pub mod engine;
pub mod error;
pub mod nlu;
pub mod session;

// Re-export commonly used types
pub use config::DialogueConfig;
pub use core::{DialogueContext, Directive, Event, Slot};
pub use engine::{DialogueEngine, StepResult};
pub use error::DialogueError;
pub use session::Session;
