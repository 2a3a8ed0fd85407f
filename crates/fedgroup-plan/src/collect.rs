//! Triple collection for source probing.
//!
//! Walks the not-yet-assigned part of a plan and returns its triple patterns
//! in traversal order (duplicates kept). `EndpointRequest` subtrees already
//! target one endpoint and contribute nothing.

use crate::error::{PlanError, Result};
use crate::plan::{Plan, TriplePattern};

const PASS: &str = "triple collector";

/// Collect the probe-candidate triple patterns of `plan`.
///
/// Fails with [`PlanError::UnsupportedPlanNode`] on the first operator that
/// has no traversal rule; no partial result is returned.
pub fn collect_triples(plan: &Plan) -> Result<Vec<TriplePattern>> {
    let mut out = Vec::new();
    collect_into(plan, &mut out)?;
    Ok(out)
}

fn collect_into(plan: &Plan, out: &mut Vec<TriplePattern>) -> Result<()> {
    match plan {
        Plan::Triple(tp) => out.push(tp.clone()),
        Plan::Bgp(patterns) => out.extend(patterns.iter().cloned()),
        Plan::Empty | Plan::EndpointRequest { .. } => {}
        Plan::Project { subplan, .. }
        | Plan::Slice { subplan, .. }
        | Plan::Graph { subplan, .. } => collect_into(subplan, out)?,
        Plan::Join(left, right) | Plan::Union(left, right) => {
            collect_into(left, out)?;
            collect_into(right, out)?;
        }
        Plan::MultiJoin(children) | Plan::MultiUnion(children) => {
            for child in children {
                collect_into(child, out)?;
            }
        }
        Plan::Sequence(_)
        | Plan::Conditional { .. }
        | Plan::Filter { .. }
        | Plan::Distinct(_)
        | Plan::OrderBy { .. }
        | Plan::Group { .. } => {
            return Err(PlanError::UnsupportedPlanNode {
                kind: plan.kind(),
                pass: PASS,
            })
        }
    }
    Ok(())
}
