//! Property tests for exclusive-group rewriting and triple collection.

use fedgroup_plan::{
    collect_triples, rewrite_exclusive_groups, Expr, Plan, PlanSimplifier, Term, TriplePattern,
};
use proptest::prelude::*;

// ============================================================================
// Strategies
// ============================================================================

fn pattern_strategy() -> impl Strategy<Value = TriplePattern> {
    (0u8..4, 0u8..3, any::<bool>()).prop_map(|(s, p, bound_object)| {
        let subject = if s == 0 {
            Term::var("s")
        } else {
            Term::iri(format!("http://auth/s{s}"))
        };
        let object = if bound_object {
            Term::iri("http://auth/cat")
        } else {
            Term::var("o")
        };
        TriplePattern::new(subject, Term::iri(format!("http://auth/p{p}")), object)
    })
}

fn endpoint_strategy() -> impl Strategy<Value = &'static str> {
    prop_oneof![
        Just("http://a.example/sparql"),
        Just("http://b.example/sparql"),
        Just("http://c.example/sparql"),
    ]
}

fn leaf_strategy() -> impl Strategy<Value = Plan> {
    prop_oneof![
        3 => (endpoint_strategy(), prop::collection::vec(pattern_strategy(), 1..3))
            .prop_map(|(e, tps)| Plan::request(e, Plan::Bgp(tps))),
        1 => prop::collection::vec(pattern_strategy(), 1..3).prop_map(Plan::Bgp),
        1 => Just(Plan::Empty),
    ]
}

fn plan_strategy() -> impl Strategy<Value = Plan> {
    leaf_strategy().prop_recursive(4, 48, 4, |inner| {
        prop_oneof![
            3 => prop::collection::vec(inner.clone(), 0..4).prop_map(Plan::MultiUnion),
            3 => prop::collection::vec(inner.clone(), 0..4).prop_map(Plan::MultiJoin),
            2 => (inner.clone(), inner.clone()).prop_map(|(l, r)| Plan::conditional(l, r)),
            1 => (inner.clone(), inner.clone()).prop_map(|(l, r)| Plan::union(l, r)),
            1 => (inner.clone(), inner.clone()).prop_map(|(l, r)| Plan::join(l, r)),
            1 => inner.clone().prop_map(|p| Plan::filter(vec![Expr::new("bound(?o)")], p)),
            1 => inner.clone().prop_map(|p| Plan::project(vec!["s".to_string()], p)),
            1 => inner.prop_map(Plan::distinct),
        ]
    })
}

/// Plans made only of collectable operators.
fn collectable_strategy() -> impl Strategy<Value = Plan> {
    prop::collection::vec(pattern_strategy(), 0..3)
        .prop_map(Plan::Bgp)
        .prop_recursive(3, 24, 3, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..3).prop_map(Plan::MultiUnion),
                prop::collection::vec(inner.clone(), 0..3).prop_map(Plan::MultiJoin),
                (inner.clone(), inner.clone()).prop_map(|(l, r)| Plan::join(l, r)),
                inner.prop_map(|p| Plan::slice(None, Some(3), p)),
            ]
        })
}

// ============================================================================
// Structural checks
// ============================================================================

/// Visit every node outside `EndpointRequest` interiors.
fn for_each_outside_requests(plan: &Plan, f: &mut dyn FnMut(&Plan)) {
    f(plan);
    match plan {
        Plan::EndpointRequest { .. } | Plan::Empty | Plan::Triple(_) | Plan::Bgp(_) => {}
        Plan::Sequence(children) | Plan::MultiUnion(children) | Plan::MultiJoin(children) => {
            for child in children {
                for_each_outside_requests(child, f);
            }
        }
        Plan::Union(l, r) | Plan::Join(l, r) => {
            for_each_outside_requests(l, f);
            for_each_outside_requests(r, f);
        }
        Plan::Conditional { left, right } => {
            for_each_outside_requests(left, f);
            for_each_outside_requests(right, f);
        }
        Plan::Graph { subplan, .. }
        | Plan::Filter { subplan, .. }
        | Plan::Project { subplan, .. }
        | Plan::Distinct(subplan)
        | Plan::Slice { subplan, .. }
        | Plan::OrderBy { subplan, .. }
        | Plan::Group { subplan, .. } => for_each_outside_requests(subplan, f),
    }
}

fn bgp_len_sum(plan: &Plan) -> usize {
    match plan {
        Plan::Bgp(tps) => tps.len(),
        Plan::MultiUnion(children) | Plan::MultiJoin(children) => {
            children.iter().map(bgp_len_sum).sum()
        }
        Plan::Join(l, r) => bgp_len_sum(l) + bgp_len_sum(r),
        Plan::Slice { subplan, .. } => bgp_len_sum(subplan),
        _ => 0,
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(512))]

    #[test]
    fn rewrite_is_idempotent(plan in plan_strategy()) {
        let once = rewrite_exclusive_groups(&plan).unwrap();
        let twice = rewrite_exclusive_groups(&once).unwrap();
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn no_sibling_requests_share_an_endpoint(plan in plan_strategy()) {
        let out = rewrite_exclusive_groups(&plan).unwrap();
        let mut violations = Vec::new();
        for_each_outside_requests(&out, &mut |node| match node {
            Plan::MultiUnion(children) | Plan::MultiJoin(children) => {
                let endpoints: Vec<_> = children.iter().filter_map(Plan::endpoint).collect();
                for (i, e) in endpoints.iter().enumerate() {
                    if endpoints[i + 1..].contains(e) {
                        violations.push(format!("duplicate sibling {e}"));
                    }
                }
            }
            Plan::Union(left, right)
            | Plan::Join(left, right)
            | Plan::Conditional { left, right } => {
                if let (Some(l), Some(r)) = (left.endpoint(), right.endpoint()) {
                    if l == r {
                        violations.push(format!("unmerged {} on {l}", node.kind()));
                    }
                }
            }
            _ => {}
        });
        prop_assert!(violations.is_empty(), "{:?}", violations);
    }

    #[test]
    fn rewritten_multi_nodes_have_two_or_more_children(plan in plan_strategy()) {
        let out = rewrite_exclusive_groups(&plan).unwrap();
        let mut small = 0usize;
        for_each_outside_requests(&out, &mut |node| {
            if let Plan::MultiUnion(children) | Plan::MultiJoin(children) = node {
                if children.len() < 2 {
                    small += 1;
                }
            }
        });
        prop_assert_eq!(small, 0);
    }

    #[test]
    fn simplifier_agrees_with_rewriter_on_single_endpoint(plan in plan_strategy()) {
        let simplified = PlanSimplifier.single_endpoint(&plan).unwrap();
        let rewritten = rewrite_exclusive_groups(&plan).unwrap();
        prop_assert_eq!(simplified.as_ref(), rewritten.endpoint());
    }

    #[test]
    fn collector_returns_every_pattern(plan in collectable_strategy()) {
        let triples = collect_triples(&plan).unwrap();
        prop_assert_eq!(triples.len(), bgp_len_sum(&plan));
    }
}
