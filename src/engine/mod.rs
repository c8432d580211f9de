//! The runtime half of the crate.
//!
//! # Key Concepts
//!
//! - **Resolver**: picks the first enabled transition, in declaration order
//! - **Executor**: folds actions over the context and queues directives
//! - **Invocations**: generation tickets for knowledge-base lookups
//! - **Retry policy**: timeout counting and escalation
//! - **Engine**: exits, enters and remembers states for one session

pub mod executor;
pub mod invocation;
pub mod machine;
pub mod resolver;
pub mod retry;

pub use invocation::{
    lookup, parse_answer, InvocationHandler, KnowledgeBase, LookupError, StaticKnowledgeBase,
};
pub use machine::{ActiveConfiguration, DialogueEngine, IgnoreReason, StepResult};
pub use retry::RetryPolicy;
