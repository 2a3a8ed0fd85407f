//! Exclusive-group formation shared by the rewriter and the simplifier.

use crate::error::{PlanError, Result};
use crate::plan::{EndpointId, Plan};

/// How the subplans of one exclusive group are combined inside the merged
/// request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Combinator {
    /// Left-deep binary `Union`.
    Union,
    /// One ordered `Sequence`.
    Sequence,
}

/// Requests for one endpoint, in the order they were met.
struct Group {
    endpoint: EndpointId,
    members: Vec<(EndpointId, Plan)>,
}

/// Normalize the children of an n-ary node and merge sibling requests that
/// target the same endpoint.
///
/// Children go through `recurse` first, so a child that collapses into a
/// request takes part in grouping. The result lists merged requests in
/// first-occurrence order of their endpoint, followed by every other child
/// in input order. The caller applies the arity-collapse rule.
pub(crate) fn group_children<F>(
    children: &[Plan],
    combinator: Combinator,
    recurse: F,
) -> Result<Vec<Plan>>
where
    F: Fn(&Plan) -> Result<Plan>,
{
    let mut groups: Vec<Group> = Vec::new();
    let mut others = Vec::new();

    for child in children {
        match recurse(child)? {
            Plan::EndpointRequest { endpoint, subplan } => {
                match groups.iter_mut().find(|g| g.endpoint == endpoint) {
                    Some(group) => group.members.push((endpoint, *subplan)),
                    None => groups.push(Group {
                        endpoint: endpoint.clone(),
                        members: vec![(endpoint, *subplan)],
                    }),
                }
            }
            other => others.push(other),
        }
    }

    let mut out = Vec::with_capacity(groups.len() + others.len());
    for group in groups {
        out.push(merge_group(group, combinator)?);
    }
    out.extend(others);
    Ok(out)
}

fn merge_group(group: Group, combinator: Combinator) -> Result<Plan> {
    let Group {
        endpoint,
        mut members,
    } = group;

    if let Some((found, _)) = members.iter().find(|(e, _)| *e != endpoint) {
        return Err(PlanError::InvalidMergeTarget {
            expected: endpoint.clone(),
            found: found.clone(),
        });
    }

    if members.len() == 1 {
        if let Some((_, subplan)) = members.pop() {
            return Ok(Plan::request(endpoint, subplan));
        }
    }

    tracing::debug!(
        endpoint = %endpoint,
        members = members.len(),
        ?combinator,
        "merging exclusive group"
    );

    let subplans = members.into_iter().map(|(_, subplan)| subplan);
    let merged = match combinator {
        Combinator::Union => subplans
            .reduce(Plan::union)
            .unwrap_or(Plan::Empty),
        Combinator::Sequence => Plan::Sequence(subplans.collect()),
    };
    Ok(Plan::request(endpoint, merged))
}

/// A binary node whose two sides can be shipped to one endpoint together.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PairOp {
    Union,
    Join,
    Conditional,
}

impl PairOp {
    /// The node over both sides when they stay apart.
    pub(crate) fn rebuild(self, left: Plan, right: Plan) -> Plan {
        match self {
            PairOp::Union => Plan::union(left, right),
            PairOp::Join => Plan::join(left, right),
            PairOp::Conditional => Plan::conditional(left, right),
        }
    }

    /// The subplan of the merged request. A join becomes a `Sequence`, as
    /// under `MultiJoin`.
    fn combine(self, left: Plan, right: Plan) -> Plan {
        match self {
            PairOp::Join => Plan::Sequence(vec![left, right]),
            PairOp::Union | PairOp::Conditional => self.rebuild(left, right),
        }
    }
}

/// Merge both sides of a binary node into one request when they already
/// target the same endpoint; otherwise hand both sides back untouched.
pub(crate) fn merge_pair(
    op: PairOp,
    left: Plan,
    right: Plan,
) -> std::result::Result<Plan, (Plan, Plan)> {
    match (left, right) {
        (
            Plan::EndpointRequest {
                endpoint,
                subplan: l,
            },
            Plan::EndpointRequest {
                endpoint: other,
                subplan: r,
            },
        ) if endpoint == other => {
            tracing::debug!(endpoint = %endpoint, ?op, "merging both sides into one request");
            Ok(Plan::request(endpoint, op.combine(*l, *r)))
        }
        (left, right) => Err((left, right)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(name: &str) -> Plan {
        Plan::Project {
            vars: vec![name.to_string()],
            subplan: Box::new(Plan::Empty),
        }
    }

    #[test]
    fn mismatched_member_is_rejected() {
        let group = Group {
            endpoint: EndpointId::new("A"),
            members: vec![
                (EndpointId::new("A"), leaf("x")),
                (EndpointId::new("B"), leaf("y")),
            ],
        };
        let err = merge_group(group, Combinator::Union).unwrap_err();
        assert_eq!(
            err,
            PlanError::InvalidMergeTarget {
                expected: EndpointId::new("A"),
                found: EndpointId::new("B"),
            }
        );
    }

    #[test]
    fn union_merge_is_left_deep() {
        let group = Group {
            endpoint: EndpointId::new("A"),
            members: vec![
                (EndpointId::new("A"), leaf("x")),
                (EndpointId::new("A"), leaf("y")),
                (EndpointId::new("A"), leaf("z")),
            ],
        };
        let merged = merge_group(group, Combinator::Union).unwrap();
        assert_eq!(
            merged,
            Plan::request(
                "A",
                Plan::union(Plan::union(leaf("x"), leaf("y")), leaf("z"))
            )
        );
    }

    #[test]
    fn pair_with_different_endpoints_is_handed_back() {
        let l = Plan::request("A", leaf("x"));
        let r = Plan::request("B", leaf("y"));
        let (l2, r2) = merge_pair(PairOp::Conditional, l.clone(), r.clone()).unwrap_err();
        assert_eq!((l2, r2), (l, r));
    }

    #[test]
    fn joined_pair_merges_into_sequence() {
        let merged = merge_pair(
            PairOp::Join,
            Plan::request("A", leaf("x")),
            Plan::request("A", leaf("y")),
        )
        .unwrap();
        assert_eq!(
            merged,
            Plan::request("A", Plan::Sequence(vec![leaf("x"), leaf("y")]))
        );
    }
}
