//! State nodes of the dialogue tree.
//!
//! Nodes live in an arena owned by [`crate::chart::StateChart`] and refer to
//! each other by [`StateId`]. A node is immutable once the chart is built.

use super::action::Action;
use super::context::DialogueContext;
use super::event::EventKind;
use super::transition::Transition;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Index of a node in the chart arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StateId(pub(crate) usize);

impl StateId {
    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for StateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What kind of node this is.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeKind {
    /// Leaf state.
    Atomic,
    /// Has children; entered through `initial` unless resumed from history.
    Compound { initial: StateId },
    /// Pseudo-state: targeting it resumes the parent's deepest remembered leaf.
    History,
}

/// Computes the knowledge-base subject when an invoking node is entered.
pub type SubjectFn = Arc<dyn Fn(&DialogueContext) -> String + Send + Sync>;

/// External call bound to a node.
#[derive(Clone)]
pub struct Invoke {
    pub(crate) subject: SubjectFn,
}

impl Invoke {
    pub fn new<F>(subject: F) -> Self
    where
        F: Fn(&DialogueContext) -> String + Send + Sync + 'static,
    {
        Self {
            subject: Arc::new(subject),
        }
    }

    pub fn subject(&self, ctx: &DialogueContext) -> String {
        (self.subject)(ctx)
    }
}

impl fmt::Debug for Invoke {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Invoke(..)")
    }
}

/// A resolved node in the dialogue tree.
#[derive(Debug)]
pub struct StateNode {
    pub(crate) id: StateId,
    pub(crate) name: String,
    pub(crate) path: String,
    pub(crate) parent: Option<StateId>,
    pub(crate) kind: NodeKind,
    pub(crate) children: Vec<StateId>,
    pub(crate) entry: Vec<Action>,
    pub(crate) transitions: HashMap<EventKind, Vec<Transition>>,
    pub(crate) invoke: Option<Invoke>,
}

impl StateNode {
    pub fn id(&self) -> StateId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Dotted path from the root, e.g. `meeting.confirmation.ask`. The root
    /// itself has an empty path.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn parent(&self) -> Option<StateId> {
        self.parent
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn children(&self) -> &[StateId] {
        &self.children
    }

    pub fn entry_actions(&self) -> &[Action] {
        &self.entry
    }

    pub fn transitions(&self, kind: EventKind) -> Option<&[Transition]> {
        self.transitions.get(&kind).map(Vec::as_slice)
    }

    pub fn invoke(&self) -> Option<&Invoke> {
        self.invoke.as_ref()
    }

    pub fn is_compound(&self) -> bool {
        matches!(self.kind, NodeKind::Compound { .. })
    }

    pub fn is_history(&self) -> bool {
        matches!(self.kind, NodeKind::History)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invoke_computes_subject_from_context() {
        let invoke = Invoke::new(|ctx: &DialogueContext| ctx.title.clone().unwrap_or_default());
        let ctx = DialogueContext {
            title: Some("ada lovelace".to_string()),
            ..DialogueContext::default()
        };

        assert_eq!(invoke.subject(&ctx), "ada lovelace");
    }

    #[test]
    fn state_id_displays_index() {
        assert_eq!(StateId(4).to_string(), "#4");
        assert_eq!(StateId(4).index(), 4);
    }
}
