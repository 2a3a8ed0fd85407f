//! Federated query plan IR and the passes that run over it.
//!
//! ```text
//!   parser ──► Plan ──► collect_triples ──► (prober) ──► planner ──► Plan + requests
//!                                                                       │
//!                                                   ExclusiveGroupRewriter
//!                                                                       ▼
//!                                                                  optimized Plan
//! ```
//!
//! - [`plan`]: the closed operator tree shared by every pass.
//! - [`collect`]: triple patterns that still need source selection.
//! - [`simplify`]: a restricted normalization used to test mergeability.
//! - [`rewrite`]: the exclusive-group optimization.
//!
//! All passes are synchronous and pure; they borrow their input and return a
//! new tree.

pub mod collect;
pub mod error;
mod group;
pub mod plan;
pub mod rewrite;
pub mod simplify;

pub use collect::collect_triples;
pub use error::PlanError;
pub use plan::{
    ask_query, Aggregate, EndpointId, Expr, OrderCondition, Plan, PlanKind, Term, TriplePattern,
};
pub use rewrite::{rewrite_exclusive_groups, ExclusiveGroupRewriter};
pub use simplify::PlanSimplifier;
