//! Booking Conversation
//!
//! This example drives a full conversation through a `Session`: a question
//! answered from an in-memory knowledge base, then a whole-day meeting with
//! the person asked about.
//!
//! Key concepts:
//! - The engine only emits directives; the session resolves lookups
//! - Speech-end events move the dialogue past each prompt
//! - History and confirmation flows stay inside the chart
//!
//! Run with: cargo run --example booking_conversation
//! Set RUST_LOG=parley=debug to see every transition.

use parley::config::DialogueConfig;
use parley::core::{Directive, Event};
use parley::engine::StaticKnowledgeBase;
use parley::nlu::GrammarResolver;
use parley::Session;
use std::sync::Arc;

fn show(speech: &[Directive]) {
    for directive in speech {
        match directive {
            Directive::Speak { text } => println!("  assistant: {text}"),
            Directive::Listen => println!("  (listening)"),
            Directive::Lookup { subject, .. } => println!("  (looking up {subject})"),
        }
    }
}

async fn say(session: &mut Session<StaticKnowledgeBase>, utterance: &str) {
    println!("user: {utterance}");
    show(&session.dispatch(Event::recognised(utterance, 0.9)).await);
}

async fn finish_speaking(session: &mut Session<StaticKnowledgeBase>) {
    show(&session.dispatch(Event::EndSpeech).await);
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    println!("=== Booking Conversation Example ===\n");

    let knowledge = StaticKnowledgeBase::new().with_entry(
        "ada lovelace",
        "Ada Lovelace was an English mathematician and the first computer programmer.",
    );
    let mut session = Session::appointment(
        Arc::new(GrammarResolver::default()),
        &DialogueConfig::default(),
        knowledge,
    )?;

    println!("(click)");
    show(&session.dispatch(Event::Click).await);
    println!("(click)");
    show(&session.dispatch(Event::Click).await);
    finish_speaking(&mut session).await;

    say(&mut session, "query").await;
    finish_speaking(&mut session).await;

    say(&mut session, "Who is Ada Lovelace?").await;
    finish_speaking(&mut session).await;
    finish_speaking(&mut session).await;

    say(&mut session, "yes").await;
    finish_speaking(&mut session).await;

    say(&mut session, "Friday").await;
    finish_speaking(&mut session).await;

    say(&mut session, "yes").await;
    finish_speaking(&mut session).await;

    say(&mut session, "yes").await;
    finish_speaking(&mut session).await;

    let engine = session.engine();
    println!("\nFinal state: {}", engine.configuration().leaf());
    println!("Meeting: {:?} on {:?}", engine.context().title, engine.context().day);
    println!("Transitions taken: {}", engine.journal().records().len());

    println!("\n=== Example Complete ===");
    Ok(())
}
