//! The statechart interpreter.
//!
//! [`DialogueEngine`] owns one session: the active configuration, the
//! context, deep history and the live invocation. Events are processed one at
//! a time, each to completion.

use super::executor::execute;
use super::invocation::InvocationHandler;
use super::resolver::resolve;
use crate::chart::StateChart;
use crate::core::{
    DialogueContext, Directive, Event, EventKind, HistoryTracker, Recognition, StateId, Ticket,
    TransitionJournal, TransitionRecord,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::mem;
use std::sync::Arc;
use tracing::{debug, debug_span, info, trace};
use uuid::Uuid;

/// Why an event produced no transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum IgnoreReason {
    /// No active state declares the event kind.
    NoHandler,
    /// A state declares it but no guard matched.
    NoMatch,
    /// A knowledge-base completion for an invocation that is no longer live.
    StaleCompletion,
}

/// Snapshot of the active states, outermost first. The root is omitted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveConfiguration {
    pub states: Vec<String>,
}

impl ActiveConfiguration {
    /// The innermost active state.
    pub fn leaf(&self) -> &str {
        self.states.last().map(String::as_str).unwrap_or_default()
    }

    pub fn contains(&self, path: &str) -> bool {
        self.states.iter().any(|state| state == path)
    }
}

/// Result of processing a single event
#[derive(Clone, Debug, PartialEq)]
pub enum StepResult {
    /// A transition was taken
    Transitioned {
        from: String,
        to: String,
        configuration: ActiveConfiguration,
        directives: Vec<Directive>,
    },

    /// No transition was taken; the configuration is unchanged
    Ignored { reason: IgnoreReason },
}

impl StepResult {
    pub fn is_transitioned(&self) -> bool {
        matches!(self, StepResult::Transitioned { .. })
    }

    pub fn directives(&self) -> &[Directive] {
        match self {
            StepResult::Transitioned { directives, .. } => directives,
            StepResult::Ignored { .. } => &[],
        }
    }

    pub fn into_directives(self) -> Vec<Directive> {
        match self {
            StepResult::Transitioned { directives, .. } => directives,
            StepResult::Ignored { .. } => Vec::new(),
        }
    }

    /// Text of every `Speak` directive, in order.
    pub fn spoken(&self) -> Vec<&str> {
        self.directives()
            .iter()
            .filter_map(|directive| match directive {
                Directive::Speak { text } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Pending knowledge-base lookups, in order.
    pub fn lookups(&self) -> Vec<(Ticket, &str)> {
        self.directives()
            .iter()
            .filter_map(|directive| match directive {
                Directive::Lookup { ticket, subject } => Some((*ticket, subject.as_str())),
                _ => None,
            })
            .collect()
    }
}

/// Runs one dialogue session over a shared chart.
pub struct DialogueEngine {
    chart: Arc<StateChart>,
    context: DialogueContext,
    configuration: Vec<StateId>,
    history: HistoryTracker,
    invocations: InvocationHandler,
    journal: TransitionJournal,
    outbox: Vec<Directive>,
    session_id: Uuid,
}

impl DialogueEngine {
    /// Create an engine in the chart's initial state.
    ///
    /// Directives emitted by initial entry actions are held until the first
    /// accepted transition.
    pub fn new(chart: Arc<StateChart>) -> Self {
        Self::with_journal(chart, TransitionJournal::default())
    }

    pub fn with_journal(chart: Arc<StateChart>, journal: TransitionJournal) -> Self {
        let root = chart.root();
        let mut engine = Self {
            chart: Arc::clone(&chart),
            context: DialogueContext::new(),
            configuration: vec![root],
            history: HistoryTracker::new(),
            invocations: InvocationHandler::new(),
            journal,
            outbox: Vec::new(),
            session_id: Uuid::new_v4(),
        };
        for id in chart.initial_descent(root) {
            engine.enter(&chart, id, None);
        }
        debug!(session = %engine.session_id, state = engine.leaf_path(), "dialogue started");
        engine
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn chart(&self) -> &StateChart {
        &self.chart
    }

    pub fn context(&self) -> &DialogueContext {
        &self.context
    }

    pub fn history(&self) -> &HistoryTracker {
        &self.history
    }

    pub fn journal(&self) -> &TransitionJournal {
        &self.journal
    }

    /// The ticket of the invocation currently awaiting completion.
    pub fn pending_lookup(&self) -> Option<Ticket> {
        self.invocations.live()
    }

    /// Directives queued but not yet returned by a step.
    pub fn pending_directives(&self) -> &[Directive] {
        &self.outbox
    }

    pub fn active_leaf(&self) -> StateId {
        self.configuration
            .last()
            .copied()
            .unwrap_or_else(|| self.chart.root())
    }

    pub fn configuration(&self) -> ActiveConfiguration {
        ActiveConfiguration {
            states: self
                .configuration
                .iter()
                .skip(1)
                .map(|id| self.chart.path(*id).to_string())
                .collect(),
        }
    }

    /// True if the state at `path` is active. Accepts every path form the
    /// chart accepts.
    pub fn is_in(&self, path: &str) -> bool {
        self.chart
            .lookup(path)
            .is_some_and(|id| self.configuration.contains(&id))
    }

    /// Process one event to completion.
    pub fn process_event(&mut self, event: Event) -> StepResult {
        let kind = event.kind();
        let span = debug_span!("dialogue", session = %self.session_id, event = %kind);
        let _enter = span.enter();

        match &event {
            Event::Recognised(recognition) => {
                self.context = observe(&self.context, recognition);
            }
            Event::LookupDone { ticket, .. } => {
                if !self.invocations.complete(*ticket) {
                    debug!(
                        state = %ticket.state,
                        generation = ticket.generation,
                        "discarding stale lookup completion"
                    );
                    return StepResult::Ignored {
                        reason: IgnoreReason::StaleCompletion,
                    };
                }
            }
            _ => {}
        }

        let chart = Arc::clone(&self.chart);
        let handler = self
            .configuration
            .iter()
            .rev()
            .find_map(|id| chart.node(*id).transitions(kind).map(|list| (*id, list)));
        let Some((source, transitions)) = handler else {
            trace!(state = self.leaf_path(), "no state handles event");
            return StepResult::Ignored {
                reason: IgnoreReason::NoHandler,
            };
        };
        let Some(transition) = resolve(transitions, &self.context, &event) else {
            trace!(state = chart.path(source), "no transition matched");
            return StepResult::Ignored {
                reason: IgnoreReason::NoMatch,
            };
        };

        let from = self.leaf_path().to_string();
        let context = mem::take(&mut self.context);
        self.context = execute(&transition.actions, context, Some(&event), &mut self.outbox);
        self.take(&chart, source, transition.target, &event);
        let to = self.leaf_path().to_string();

        let reset = kind == EventKind::Timeout && self.is_initial_configuration();
        if reset {
            info!(from = %from, "too many timeouts, dialogue reset");
        } else {
            debug!(from = %from, to = %to, "transition");
        }

        self.journal.record(TransitionRecord {
            from: from.clone(),
            to: to.clone(),
            event: kind,
            timestamp: Utc::now(),
            attempt: self.context.retry_count.unwrap_or(0),
        });

        StepResult::Transitioned {
            from,
            to,
            configuration: self.configuration(),
            directives: mem::take(&mut self.outbox),
        }
    }

    fn leaf_path(&self) -> &str {
        self.chart.path(self.active_leaf())
    }

    fn is_initial_configuration(&self) -> bool {
        let root = self.chart.root();
        self.configuration[1..] == self.chart.initial_descent(root)[..]
    }

    /// Exit below the domain, then enter down to `target` and beyond.
    fn take(&mut self, chart: &StateChart, source: StateId, target: StateId, event: &Event) {
        let target_node = chart.node(target);
        let (effective, via_history) = match target_node.parent() {
            Some(parent) if target_node.is_history() => (parent, true),
            _ => (target, false),
        };

        let domain = transition_domain(chart, source, effective);
        self.exit_below(chart, domain);

        let mut entering = chart.path_between(domain, effective);
        let resumed = if via_history {
            self.history.resume(effective)
        } else {
            None
        };
        match resumed {
            Some(leaf) => {
                trace!(
                    state = chart.path(effective),
                    leaf = chart.path(leaf),
                    "resuming from history"
                );
                entering.extend(chart.path_between(effective, leaf));
            }
            None => entering.extend(chart.initial_descent(effective)),
        }

        for id in entering {
            self.enter(chart, id, Some(event));
        }
    }

    fn exit_below(&mut self, chart: &StateChart, domain: StateId) {
        let Some(position) = self.configuration.iter().position(|id| *id == domain) else {
            return;
        };
        let leaf = self.active_leaf();
        while self.configuration.len() > position + 1 {
            let Some(id) = self.configuration.pop() else {
                break;
            };
            let node = chart.node(id);
            if let Some(ticket) = self.invocations.cancel(id) {
                debug!(
                    state = node.path(),
                    generation = ticket.generation,
                    "cancelled pending lookup"
                );
            }
            if node.is_compound() {
                self.history.record(id, leaf);
            }
            trace!(state = node.path(), "exit");
        }
    }

    fn enter(&mut self, chart: &StateChart, id: StateId, event: Option<&Event>) {
        let node = chart.node(id);
        self.configuration.push(id);
        trace!(state = node.path(), "enter");

        let context = mem::take(&mut self.context);
        self.context = execute(node.entry_actions(), context, event, &mut self.outbox);

        if let Some(invoke) = node.invoke() {
            let subject = invoke.subject(&self.context);
            let ticket = self.invocations.start(id);
            debug!(
                state = node.path(),
                generation = ticket.generation,
                subject = %subject,
                "starting lookup"
            );
            self.outbox.push(Directive::Lookup { ticket, subject });
        }
    }
}

/// Write the turn metadata of a recognition. Slots are untouched; the
/// silence streak ends.
fn observe(context: &DialogueContext, recognition: &Recognition) -> DialogueContext {
    DialogueContext {
        last_utterance: recognition.utterance.clone(),
        confidence: recognition.confidence.clamp(0.0, 1.0),
        entities: recognition.entities.clone(),
        top_intent: recognition.top_intent.clone(),
        retry_count: None,
        ..context.clone()
    }
}

/// The node below which states are exited and re-entered.
///
/// A target strictly inside the source keeps the source active. Otherwise the
/// domain is the nearest proper ancestor of the source that contains the
/// target without being the target itself, so targeting an ancestor exits and
/// re-enters it.
fn transition_domain(chart: &StateChart, source: StateId, target: StateId) -> StateId {
    if target != source && chart.contains(source, target) {
        return source;
    }
    let mut current = chart.parent(source);
    while let Some(id) = current {
        if id != target && chart.contains(id, target) {
            return id;
        }
        current = chart.parent(id);
    }
    chart.root()
}
