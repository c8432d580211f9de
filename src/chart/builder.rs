//! Builder for constructing dialogue charts.
//!
//! States are declared as a tree of [`StateDef`]s with string targets.
//! [`ChartBuilder::build`] flattens the tree into an arena, resolves every
//! target to a [`StateId`] once, and accumulates all problems instead of
//! stopping at the first one.

use super::error::{BuildError, InvalidChart};
use super::path::{self, TargetPath, ROOT_NAME};
use super::StateChart;
use crate::core::{
    Action, DialogueContext, EventKind, Guard, Invoke, NodeKind, StateId, StateNode, Transition,
};
use std::collections::HashMap;
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;

type Check = Validation<(), NonEmptyVec<BuildError>>;

#[derive(Clone, Debug)]
enum DefKind {
    Atomic,
    Compound { initial: String },
    History,
}

/// Declarative definition of one state and its subtree.
#[derive(Clone, Debug)]
pub struct StateDef {
    name: String,
    kind: DefKind,
    entry: Vec<Action>,
    transitions: Vec<(EventKind, Vec<TransitionDef>)>,
    children: Vec<StateDef>,
    invoke: Option<Invoke>,
}

impl StateDef {
    fn new(name: impl Into<String>, kind: DefKind) -> Self {
        Self {
            name: name.into(),
            kind,
            entry: Vec::new(),
            transitions: Vec::new(),
            children: Vec::new(),
            invoke: None,
        }
    }

    /// A leaf state.
    pub fn atomic(name: impl Into<String>) -> Self {
        Self::new(name, DefKind::Atomic)
    }

    /// A state with children, entered through `initial`.
    pub fn compound(name: impl Into<String>, initial: impl Into<String>) -> Self {
        Self::new(
            name,
            DefKind::Compound {
                initial: initial.into(),
            },
        )
    }

    /// A deep-history pseudo-state. Targeting it resumes the parent's last
    /// active leaf.
    pub fn history(name: impl Into<String>) -> Self {
        Self::new(name, DefKind::History)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Append an entry action.
    pub fn entry(mut self, action: Action) -> Self {
        self.entry.push(action);
        self
    }

    /// Append a transition to the list for `event`. Declaration order is
    /// evaluation order.
    pub fn on(mut self, event: EventKind, transition: TransitionDef) -> Self {
        match self.transitions.iter_mut().find(|(kind, _)| *kind == event) {
            Some((_, list)) => list.push(transition),
            None => self.transitions.push((event, vec![transition])),
        }
        self
    }

    /// Append several transitions for `event`, in order.
    pub fn on_each(
        self,
        event: EventKind,
        transitions: impl IntoIterator<Item = TransitionDef>,
    ) -> Self {
        transitions
            .into_iter()
            .fold(self, |def, transition| def.on(event, transition))
    }

    pub fn child(mut self, child: StateDef) -> Self {
        self.children.push(child);
        self
    }

    pub fn children(mut self, children: impl IntoIterator<Item = StateDef>) -> Self {
        self.children.extend(children);
        self
    }

    /// Bind an external invocation that starts whenever this state is entered.
    pub fn invoke(mut self, invoke: Invoke) -> Self {
        self.invoke = Some(invoke);
        self
    }
}

/// Declarative transition with an unresolved target.
#[derive(Clone, Debug)]
pub struct TransitionDef {
    target: String,
    guard: Option<Guard>,
    actions: Vec<Action>,
}

impl TransitionDef {
    pub fn to(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            guard: None,
            actions: Vec::new(),
        }
    }

    /// Add a guard using a closure over the context.
    pub fn when<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&DialogueContext) -> bool + Send + Sync + 'static,
    {
        self.guard = Some(Guard::new(predicate));
        self
    }

    pub fn guard(mut self, guard: Guard) -> Self {
        self.guard = Some(guard);
        self
    }

    pub fn action(mut self, action: Action) -> Self {
        self.actions.push(action);
        self
    }

    pub fn actions(mut self, actions: impl IntoIterator<Item = Action>) -> Self {
        self.actions.extend(actions);
        self
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn condition(&self) -> Option<&Guard> {
        self.guard.as_ref()
    }

    /// Actions run when the transition is taken, in order.
    pub fn effects(&self) -> &[Action] {
        &self.actions
    }

    pub fn is_catch_all(&self) -> bool {
        self.guard.is_none()
    }
}

/// Builder for a whole chart. Top-level states become children of an
/// implicit root.
///
/// # Example
///
/// ```rust
/// use parley::chart::{ChartBuilder, StateDef, TransitionDef};
/// use parley::core::{Action, EventKind};
///
/// let chart = ChartBuilder::new()
///     .initial("idle")
///     .state(StateDef::atomic("idle").on(EventKind::Click, TransitionDef::to("greet")))
///     .state(
///         StateDef::compound("greet", "hello")
///             .child(StateDef::atomic("hello").entry(Action::speak("Hello!")))
///             .child(StateDef::history("hist")),
///     )
///     .build()
///     .unwrap();
///
/// assert!(chart.lookup("greet.hello").is_some());
/// ```
#[derive(Default)]
pub struct ChartBuilder {
    initial: Option<String>,
    states: Vec<StateDef>,
}

struct PendingTransitions {
    state: StateId,
    lists: Vec<(EventKind, Vec<TransitionDef>)>,
}

impl ChartBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Name the top-level state entered on construction (required).
    pub fn initial(mut self, name: impl Into<String>) -> Self {
        self.initial = Some(name.into());
        self
    }

    pub fn state(mut self, state: StateDef) -> Self {
        self.states.push(state);
        self
    }

    pub fn states(mut self, states: impl IntoIterator<Item = StateDef>) -> Self {
        self.states.extend(states);
        self
    }

    /// Build the chart, reporting every problem found.
    pub fn build(self) -> Result<StateChart, InvalidChart> {
        let mut checks: Vec<Check> = Vec::new();
        let mut nodes: Vec<StateNode> = Vec::new();
        let mut pending: Vec<PendingTransitions> = Vec::new();

        let root_def = StateDef::compound(ROOT_NAME, self.initial.unwrap_or_default())
            .children(self.states);
        let root = flatten(root_def, None, &mut nodes, &mut pending, &mut checks);

        let mut index: HashMap<String, StateId> = HashMap::with_capacity(nodes.len());
        for node in &nodes {
            if index.insert(node.path.clone(), node.id).is_some() {
                checks.push(Validation::fail(BuildError::DuplicateState {
                    path: path::display(&node.path),
                }));
            }
        }

        for PendingTransitions { state, lists } in pending {
            let declaring = nodes[state.0].path.clone();
            let parent = nodes[state.0].parent.map(|p| nodes[p.0].path.clone());

            for (event, defs) in lists {
                checks.push(check_catch_all_last(&declaring, event, &defs));

                let mut resolved = Vec::with_capacity(defs.len());
                for def in defs {
                    let Some(target) = TargetPath::parse(&def.target) else {
                        checks.push(Validation::fail(BuildError::MalformedTarget {
                            state: path::display(&declaring),
                            event,
                            target: def.target,
                        }));
                        continue;
                    };
                    let full = target.resolve(&declaring, parent.as_deref());
                    match index.get(&full) {
                        Some(id) => resolved.push(Transition {
                            guard: def.guard,
                            target: *id,
                            actions: def.actions,
                        }),
                        None => checks.push(Validation::fail(BuildError::UnknownTarget {
                            state: path::display(&declaring),
                            event,
                            target: def.target,
                        })),
                    }
                }
                nodes[state.0]
                    .transitions
                    .entry(event)
                    .or_default()
                    .extend(resolved);
            }
        }

        match Validation::all_vec(checks) {
            Validation::Success(_) => Ok(StateChart { nodes, index, root }),
            Validation::Failure(problems) => Err(InvalidChart {
                problems: problems.iter().cloned().collect(),
            }),
        }
    }
}

fn check_catch_all_last(declaring: &str, event: EventKind, defs: &[TransitionDef]) -> Check {
    let last = defs.len().saturating_sub(1);
    let misplaced = defs
        .iter()
        .enumerate()
        .any(|(position, def)| def.is_catch_all() && position != last);

    if misplaced {
        Validation::fail(BuildError::CatchAllNotLast {
            state: path::display(declaring),
            event,
        })
    } else {
        Validation::success(())
    }
}

/// Push `def` and its subtree into the arena, depth first.
fn flatten(
    def: StateDef,
    parent: Option<StateId>,
    nodes: &mut Vec<StateNode>,
    pending: &mut Vec<PendingTransitions>,
    checks: &mut Vec<Check>,
) -> StateId {
    let id = StateId(nodes.len());
    let node_path = match parent {
        Some(parent) => path::join(&nodes[parent.0].path, &def.name),
        None => String::new(),
    };
    let shown = path::display(&node_path);

    nodes.push(StateNode {
        id,
        name: def.name,
        path: node_path,
        parent,
        kind: NodeKind::Atomic,
        children: Vec::new(),
        entry: def.entry,
        transitions: HashMap::new(),
        invoke: def.invoke,
    });

    if !def.transitions.is_empty() {
        pending.push(PendingTransitions {
            state: id,
            lists: def.transitions,
        });
    }

    let children: Vec<(String, StateId)> = def
        .children
        .into_iter()
        .map(|child| {
            let name = child.name.clone();
            (name, flatten(child, Some(id), nodes, pending, checks))
        })
        .collect();

    let kind = match def.kind {
        DefKind::Atomic | DefKind::History if !children.is_empty() => {
            checks.push(Validation::fail(BuildError::ChildrenOnLeaf { state: shown }));
            NodeKind::Atomic
        }
        DefKind::Atomic => NodeKind::Atomic,
        DefKind::History => NodeKind::History,
        DefKind::Compound { initial } => {
            match children.iter().find(|(name, _)| *name == initial) {
                Some((_, child)) => NodeKind::Compound { initial: *child },
                None if initial.is_empty() => {
                    checks.push(Validation::fail(BuildError::MissingInitial { state: shown }));
                    NodeKind::Atomic
                }
                None => {
                    checks.push(Validation::fail(BuildError::UnknownInitial {
                        state: shown,
                        initial,
                    }));
                    NodeKind::Atomic
                }
            }
        }
    };

    let node = &mut nodes[id.0];
    node.kind = kind;
    node.children = children.into_iter().map(|(_, child)| child).collect();
    id
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_chart() -> ChartBuilder {
        ChartBuilder::new()
            .initial("idle")
            .state(StateDef::atomic("idle").on(EventKind::Click, TransitionDef::to("branch")))
            .state(
                StateDef::compound("branch", "first")
                    .on(EventKind::Timeout, TransitionDef::to("#idle"))
                    .child(
                        StateDef::atomic("first")
                            .on(EventKind::EndSpeech, TransitionDef::to("second")),
                    )
                    .child(StateDef::atomic("second"))
                    .child(StateDef::history("hist")),
            )
    }

    #[test]
    fn builds_valid_chart() {
        let chart = small_chart().build().unwrap();

        let branch = chart.lookup("branch").unwrap();
        let first = chart.lookup("branch.first").unwrap();
        assert_eq!(chart.node(branch).kind(), NodeKind::Compound { initial: first });
        assert_eq!(chart.node(first).parent(), Some(branch));
        assert!(chart.node(chart.lookup("#root.branch.hist").unwrap()).is_history());
    }

    #[test]
    fn resolves_sibling_and_absolute_targets() {
        let chart = small_chart().build().unwrap();

        let first = chart.node(chart.lookup("branch.first").unwrap());
        let to_second = &first.transitions(EventKind::EndSpeech).unwrap()[0];
        assert_eq!(chart.path(to_second.target), "branch.second");

        let branch = chart.node(chart.lookup("branch").unwrap());
        let to_idle = &branch.transitions(EventKind::Timeout).unwrap()[0];
        assert_eq!(chart.path(to_idle.target), "idle");
    }

    #[test]
    fn builder_requires_initial_state() {
        let result = ChartBuilder::new().state(StateDef::atomic("idle")).build();

        let err = result.unwrap_err();
        assert_eq!(
            err.problems,
            vec![BuildError::MissingInitial {
                state: "#root".to_string()
            }]
        );
    }

    #[test]
    fn builder_accumulates_all_problems() {
        let result = ChartBuilder::new()
            .initial("idle")
            .state(
                StateDef::atomic("idle")
                    .on(EventKind::Click, TransitionDef::to("nowhere"))
                    .on(EventKind::Click, TransitionDef::to("idle"))
                    .on(EventKind::Timeout, TransitionDef::to("a..b")),
            )
            .state(StateDef::compound("branch", "missing").child(StateDef::atomic("only")))
            .state(StateDef::atomic("leaf").child(StateDef::atomic("inner")))
            .build();

        let problems = result.unwrap_err().problems;
        assert_eq!(problems.len(), 5);
        assert!(problems
            .iter()
            .any(|p| matches!(p, BuildError::UnknownTarget { target, .. } if target == "nowhere")));
        assert!(problems
            .iter()
            .any(|p| matches!(p, BuildError::CatchAllNotLast { .. })));
        assert!(problems
            .iter()
            .any(|p| matches!(p, BuildError::MalformedTarget { .. })));
        assert!(problems.iter().any(|p| matches!(
            p,
            BuildError::UnknownInitial { initial, .. } if initial == "missing"
        )));
        assert!(problems
            .iter()
            .any(|p| matches!(p, BuildError::ChildrenOnLeaf { state } if state == "leaf")));
    }

    #[test]
    fn duplicate_paths_are_rejected() {
        let result = ChartBuilder::new()
            .initial("idle")
            .state(StateDef::atomic("idle"))
            .state(StateDef::atomic("idle"))
            .build();

        assert_eq!(
            result.unwrap_err().problems,
            vec![BuildError::DuplicateState {
                path: "idle".to_string()
            }]
        );
    }

    #[test]
    fn guarded_transitions_keep_declaration_order() {
        let chart = ChartBuilder::new()
            .initial("idle")
            .state(
                StateDef::atomic("idle")
                    .on(
                        EventKind::Recognised,
                        TransitionDef::to("a").when(|ctx| ctx.help.is_some()),
                    )
                    .on(
                        EventKind::Recognised,
                        TransitionDef::to("b").when(|ctx| ctx.title.is_some()),
                    )
                    .on(EventKind::Recognised, TransitionDef::to("idle")),
            )
            .state(StateDef::atomic("a"))
            .state(StateDef::atomic("b"))
            .build()
            .unwrap();

        let idle = chart.node(chart.lookup("idle").unwrap());
        let targets: Vec<&str> = idle
            .transitions(EventKind::Recognised)
            .unwrap()
            .iter()
            .map(|t| chart.path(t.target))
            .collect();
        assert_eq!(targets, vec!["a", "b", "idle"]);
    }
}
