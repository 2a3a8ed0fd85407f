//! Exclusive-group rewriting.
//!
//! Sibling `EndpointRequest`s under the same union, join or `Conditional`
//! (n-ary or binary) that target the same endpoint are merged into one request,
//! so the executor issues one remote call instead of several.
//!
//! ```text
//!   Mu[ Req(A,P1), Req(A,P2), Req(B,P3) ]  ==>  Mu[ Req(A, P1 ∪ P2), Req(B,P3) ]
//!   Mj[ Req(A,P1), Req(A,P2) ]             ==>  Req(A, Seq(P1,P2))
//!   Join( Req(A,P1), Req(A,P2) )           ==>  Req(A, Seq(P1,P2))
//!   Cond( Req(A,L), Req(A,R) )             ==>  Req(A, Cond(L,R))
//! ```
//!
//! The pass is a pure function over a borrowed tree. Filters, slices,
//! projections and the other modifiers are kept where they are and only
//! their subplan is rewritten; nothing is pushed into remote requests.
//!
//! Order among subplans merged under a `MultiJoin` follows first occurrence
//! but is not a semantic guarantee of the `Sequence` they end up in.

use crate::error::{PlanError, Result};
use crate::group::{group_children, merge_pair, Combinator, PairOp};
use crate::plan::Plan;
use crate::simplify::PlanSimplifier;

const PASS: &str = "exclusive-group rewriter";

#[derive(Debug, Default, Clone, Copy)]
pub struct ExclusiveGroupRewriter {
    simplifier: PlanSimplifier,
}

impl ExclusiveGroupRewriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rewrite(&self, plan: &Plan) -> Result<Plan> {
        match plan {
            Plan::MultiUnion(children) => Ok(Plan::multi_union(group_children(
                children,
                Combinator::Union,
                |c| self.rewrite(c),
            )?)),
            Plan::MultiJoin(children) => Ok(Plan::multi_join(group_children(
                children,
                Combinator::Sequence,
                |c| self.rewrite(c),
            )?)),
            Plan::Conditional { left, right } => self.rewrite_conditional(left, right),

            // Already bound to one endpoint, or nothing to group.
            Plan::EndpointRequest { .. } | Plan::Empty | Plan::Triple(_) | Plan::Bgp(_) => {
                Ok(plan.clone())
            }

            Plan::Union(left, right) => self.rewrite_pair(PairOp::Union, left, right),
            Plan::Join(left, right) => self.rewrite_pair(PairOp::Join, left, right),
            Plan::Sequence(children) => Ok(Plan::Sequence(
                children
                    .iter()
                    .map(|c| self.rewrite(c))
                    .collect::<Result<Vec<_>>>()?,
            )),

            Plan::Graph { subplan, .. }
            | Plan::Filter { subplan, .. }
            | Plan::Project { subplan, .. }
            | Plan::Distinct(subplan)
            | Plan::Slice { subplan, .. }
            | Plan::OrderBy { subplan, .. }
            | Plan::Group { subplan, .. } => {
                let inner = self.rewrite(subplan)?;
                plan.with_subplan(inner)
                    .ok_or(PlanError::UnsupportedPlanNode {
                        kind: plan.kind(),
                        pass: PASS,
                    })
            }
        }
    }

    fn rewrite_pair(&self, op: PairOp, left: &Plan, right: &Plan) -> Result<Plan> {
        let left = self.rewrite(left)?;
        let right = self.rewrite(right)?;
        Ok(merge_pair(op, left, right).unwrap_or_else(|(left, right)| op.rebuild(left, right)))
    }

    fn rewrite_conditional(&self, left: &Plan, right: &Plan) -> Result<Plan> {
        let l = self.simplifier.simplify(left)?;
        let r = self.simplifier.simplify(right)?;
        match merge_pair(PairOp::Conditional, l, r) {
            Ok(merged) => Ok(merged),
            Err(_) => Ok(Plan::conditional(self.rewrite(left)?, self.rewrite(right)?)),
        }
    }
}

/// Rewrite `plan` with a default [`ExclusiveGroupRewriter`].
pub fn rewrite_exclusive_groups(plan: &Plan) -> Result<Plan> {
    ExclusiveGroupRewriter::new().rewrite(plan)
}
