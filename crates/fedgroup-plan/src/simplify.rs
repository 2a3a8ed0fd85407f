//! Plan simplification used as a mergeability probe.
//!
//! The simplifier runs the exclusive-group logic over `MultiUnion`,
//! `MultiJoin` and the binary `Union`, `Join` and `Conditional` only. Every
//! other node is an opaque leaf for this pass: it is returned as-is and
//! never descended into. Its output
//! answers "does this subtree reduce to a single request?" and is not the
//! canonical rewrite of the tree.

use crate::error::Result;
use crate::group::{group_children, merge_pair, Combinator, PairOp};
use crate::plan::{EndpointId, Plan};

#[derive(Debug, Default, Clone, Copy)]
pub struct PlanSimplifier;

impl PlanSimplifier {
    pub fn simplify(&self, plan: &Plan) -> Result<Plan> {
        match plan {
            Plan::MultiUnion(children) => Ok(Plan::multi_union(group_children(
                children,
                Combinator::Union,
                |c| self.simplify(c),
            )?)),
            Plan::MultiJoin(children) => Ok(Plan::multi_join(group_children(
                children,
                Combinator::Sequence,
                |c| self.simplify(c),
            )?)),
            Plan::Union(left, right) => self.simplify_pair(PairOp::Union, left, right),
            Plan::Join(left, right) => self.simplify_pair(PairOp::Join, left, right),
            Plan::Conditional { left, right } => {
                self.simplify_pair(PairOp::Conditional, left, right)
            }
            Plan::EndpointRequest { .. }
            | Plan::Empty
            | Plan::Triple(_)
            | Plan::Bgp(_)
            | Plan::Sequence(_)
            | Plan::Graph { .. }
            | Plan::Filter { .. }
            | Plan::Project { .. }
            | Plan::Distinct(_)
            | Plan::Slice { .. }
            | Plan::OrderBy { .. }
            | Plan::Group { .. } => Ok(plan.clone()),
        }
    }

    fn simplify_pair(&self, op: PairOp, left: &Plan, right: &Plan) -> Result<Plan> {
        let left = self.simplify(left)?;
        let right = self.simplify(right)?;
        Ok(merge_pair(op, left, right).unwrap_or_else(|(left, right)| op.rebuild(left, right)))
    }

    /// Endpoint the whole subtree reduces to, if it reduces to one request.
    pub fn single_endpoint(&self, plan: &Plan) -> Result<Option<EndpointId>> {
        Ok(self.simplify(plan)?.endpoint().cloned())
    }
}
