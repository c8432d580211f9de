//! The dialogue chart: an arena of state nodes built once at startup.
//!
//! Nodes are addressed by [`StateId`]; all transition targets were resolved
//! to ids by the builder, so the engine only follows indices at runtime.

mod builder;
mod error;
pub(crate) mod path;

pub use builder::{ChartBuilder, StateDef, TransitionDef};
pub use error::{BuildError, InvalidChart};

use crate::core::{NodeKind, StateId, StateNode};
use std::collections::HashMap;

/// Immutable, validated state tree.
#[derive(Debug)]
pub struct StateChart {
    nodes: Vec<StateNode>,
    index: HashMap<String, StateId>,
    root: StateId,
}

impl StateChart {
    pub fn root(&self) -> StateId {
        self.root
    }

    pub fn node(&self, id: StateId) -> &StateNode {
        &self.nodes[id.0]
    }

    pub fn nodes(&self) -> impl Iterator<Item = &StateNode> {
        self.nodes.iter()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Find a state by path. `#root.a.b`, `#a.b` and `a.b` are equivalent.
    pub fn lookup(&self, raw: &str) -> Option<StateId> {
        self.index.get(path::canonical(raw)).copied()
    }

    pub fn path(&self, id: StateId) -> &str {
        &self.node(id).path
    }

    pub fn parent(&self, id: StateId) -> Option<StateId> {
        self.node(id).parent
    }

    /// True if `ancestor` is `node` or one of its ancestors.
    pub fn contains(&self, ancestor: StateId, node: StateId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.parent(id);
        }
        false
    }

    /// Nodes from just below `ancestor` down to `node`, top-down. Empty if
    /// `node == ancestor`.
    pub fn path_between(&self, ancestor: StateId, node: StateId) -> Vec<StateId> {
        let mut chain = Vec::new();
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                break;
            }
            chain.push(id);
            current = self.parent(id);
        }
        chain.reverse();
        chain
    }

    /// Follow `initial` children from `from` down to a leaf. The returned
    /// chain excludes `from` itself.
    pub fn initial_descent(&self, from: StateId) -> Vec<StateId> {
        let mut chain = Vec::new();
        let mut current = from;
        while let NodeKind::Compound { initial } = self.node(current).kind {
            chain.push(initial);
            current = initial;
        }
        chain
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::EventKind;

    fn chart() -> StateChart {
        ChartBuilder::new()
            .initial("idle")
            .state(StateDef::atomic("idle").on(EventKind::Click, TransitionDef::to("outer")))
            .state(
                StateDef::compound("outer", "inner").child(
                    StateDef::compound("inner", "leaf")
                        .child(StateDef::atomic("leaf"))
                        .child(StateDef::atomic("other")),
                ),
            )
            .build()
            .unwrap()
    }

    #[test]
    fn lookup_accepts_all_path_forms() {
        let chart = chart();
        let id = chart.lookup("outer.inner.leaf").unwrap();

        assert_eq!(chart.lookup("#root.outer.inner.leaf"), Some(id));
        assert_eq!(chart.lookup("#outer.inner.leaf"), Some(id));
        assert_eq!(chart.lookup("#root"), Some(chart.root()));
        assert_eq!(chart.lookup("outer.missing"), None);
    }

    #[test]
    fn initial_descent_reaches_leaf() {
        let chart = chart();
        let outer = chart.lookup("outer").unwrap();

        let descent: Vec<&str> = chart
            .initial_descent(outer)
            .into_iter()
            .map(|id| chart.path(id))
            .collect();
        assert_eq!(descent, vec!["outer.inner", "outer.inner.leaf"]);

        let root_descent = chart.initial_descent(chart.root());
        assert_eq!(root_descent, vec![chart.lookup("idle").unwrap()]);
    }

    #[test]
    fn contains_and_path_between() {
        let chart = chart();
        let outer = chart.lookup("outer").unwrap();
        let other = chart.lookup("outer.inner.other").unwrap();
        let idle = chart.lookup("idle").unwrap();

        assert!(chart.contains(outer, other));
        assert!(chart.contains(other, other));
        assert!(!chart.contains(idle, other));
        assert!(chart.contains(chart.root(), idle));

        let between: Vec<&str> = chart
            .path_between(chart.root(), other)
            .into_iter()
            .map(|id| chart.path(id))
            .collect();
        assert_eq!(between, vec!["outer", "outer.inner", "outer.inner.other"]);
        assert!(chart.path_between(other, other).is_empty());
    }
}
