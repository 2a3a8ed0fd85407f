//! Federated plan IR.
//!
//! A [`Plan`] is a closed tree of operators. Every node owns its children
//! outright; there are no parent links, so passes consume a borrowed tree and
//! build a new one instead of patching nodes in place.

use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Terms and triple patterns
// ============================================================================

/// Identifier of a remote endpoint (usually its SPARQL service URL).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EndpointId(pub String);

impl EndpointId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EndpointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EndpointId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// A slot of a triple pattern: either bound to an RDF term or a variable.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Term {
    Iri {
        value: String,
    },
    Literal {
        lexical: String,
        datatype: Option<String>,
        language: Option<String>,
    },
    Variable {
        name: String,
    },
}

impl Term {
    pub fn iri(value: impl Into<String>) -> Self {
        Term::Iri {
            value: value.into(),
        }
    }

    pub fn literal(lexical: impl Into<String>) -> Self {
        Term::Literal {
            lexical: lexical.into(),
            datatype: None,
            language: None,
        }
    }

    pub fn typed_literal(lexical: impl Into<String>, datatype: impl Into<String>) -> Self {
        Term::Literal {
            lexical: lexical.into(),
            datatype: Some(datatype.into()),
            language: None,
        }
    }

    pub fn lang_literal(lexical: impl Into<String>, language: impl Into<String>) -> Self {
        Term::Literal {
            lexical: lexical.into(),
            datatype: None,
            language: Some(language.into()),
        }
    }

    pub fn var(name: impl Into<String>) -> Self {
        Term::Variable { name: name.into() }
    }

    pub fn is_variable(&self) -> bool {
        matches!(self, Term::Variable { .. })
    }

    pub fn is_bound(&self) -> bool {
        !self.is_variable()
    }
}

/// SPARQL surface syntax (`<iri>`, `"lit"@en`, `"1"^^<dt>`, `?x`).
impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Iri { value } => write!(f, "<{value}>"),
            Term::Literal {
                lexical,
                datatype,
                language,
            } => {
                write!(f, "\"")?;
                for c in lexical.chars() {
                    match c {
                        '"' => write!(f, "\\\"")?,
                        '\\' => write!(f, "\\\\")?,
                        '\n' => write!(f, "\\n")?,
                        '\r' => write!(f, "\\r")?,
                        _ => write!(f, "{c}")?,
                    }
                }
                write!(f, "\"")?;
                if let Some(lang) = language {
                    write!(f, "@{lang}")
                } else if let Some(dt) = datatype {
                    write!(f, "^^<{dt}>")
                } else {
                    Ok(())
                }
            }
            Term::Variable { name } => write!(f, "?{name}"),
        }
    }
}

/// Subject / predicate / object template.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TriplePattern {
    pub subject: Term,
    pub predicate: Term,
    pub object: Term,
}

impl TriplePattern {
    pub fn new(subject: Term, predicate: Term, object: Term) -> Self {
        Self {
            subject,
            predicate,
            object,
        }
    }

    /// Number of bound (non-variable) slots.
    pub fn bound_count(&self) -> usize {
        [&self.subject, &self.predicate, &self.object]
            .into_iter()
            .filter(|t| t.is_bound())
            .count()
    }

    pub fn is_fully_variable(&self) -> bool {
        self.bound_count() == 0
    }
}

impl fmt::Display for TriplePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.subject, self.predicate, self.object)
    }
}

/// Boolean existence query for a single pattern.
pub fn ask_query(pattern: &TriplePattern) -> String {
    format!("ASK {{ {pattern} . }}")
}

// ============================================================================
// Modifier payloads
// ============================================================================

/// A filter/order/group expression in SPARQL text form.
///
/// Expressions are built upstream and carried through every pass untouched.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Expr(pub String);

impl Expr {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderCondition {
    pub expr: Expr,
    pub descending: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Aggregate {
    pub var: String,
    pub expr: Expr,
}

// ============================================================================
// Plan
// ============================================================================

/// A node of a federated query plan.
///
/// `MultiUnion` / `MultiJoin` are n-ary and unordered: with no children they
/// denote the empty result ([`Plan::Empty`]), with one child they denote
/// that child. `Sequence` is an ordered conjunction, used when several
/// subplans are shipped to one endpoint as a single request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "op", content = "args", rename_all = "snake_case")]
pub enum Plan {
    /// The empty result.
    Empty,
    Triple(TriplePattern),
    Bgp(Vec<TriplePattern>),
    Sequence(Vec<Plan>),
    Union(Box<Plan>, Box<Plan>),
    Join(Box<Plan>, Box<Plan>),
    MultiUnion(Vec<Plan>),
    MultiJoin(Vec<Plan>),
    /// Left outer join; `right` may contribute no bindings.
    Conditional {
        left: Box<Plan>,
        right: Box<Plan>,
    },
    /// A subplan evaluated entirely by one endpoint.
    EndpointRequest {
        endpoint: EndpointId,
        subplan: Box<Plan>,
    },
    Graph {
        name: Term,
        subplan: Box<Plan>,
    },
    Filter {
        exprs: Vec<Expr>,
        subplan: Box<Plan>,
    },
    Project {
        vars: Vec<String>,
        subplan: Box<Plan>,
    },
    Distinct(Box<Plan>),
    Slice {
        offset: Option<u64>,
        limit: Option<u64>,
        subplan: Box<Plan>,
    },
    OrderBy {
        conditions: Vec<OrderCondition>,
        subplan: Box<Plan>,
    },
    Group {
        vars: Vec<String>,
        aggregates: Vec<Aggregate>,
        subplan: Box<Plan>,
    },
}

/// Operator kind, used in diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanKind {
    Empty,
    Triple,
    Bgp,
    Sequence,
    Union,
    Join,
    MultiUnion,
    MultiJoin,
    Conditional,
    EndpointRequest,
    Graph,
    Filter,
    Project,
    Distinct,
    Slice,
    OrderBy,
    Group,
}

impl fmt::Display for PlanKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PlanKind::Empty => "Empty",
            PlanKind::Triple => "Triple",
            PlanKind::Bgp => "BasicGraphPattern",
            PlanKind::Sequence => "Sequence",
            PlanKind::Union => "Union",
            PlanKind::Join => "Join",
            PlanKind::MultiUnion => "MultiUnion",
            PlanKind::MultiJoin => "MultiJoin",
            PlanKind::Conditional => "Conditional",
            PlanKind::EndpointRequest => "EndpointRequest",
            PlanKind::Graph => "Graph",
            PlanKind::Filter => "Filter",
            PlanKind::Project => "Project",
            PlanKind::Distinct => "Distinct",
            PlanKind::Slice => "Slice",
            PlanKind::OrderBy => "OrderBy",
            PlanKind::Group => "Group",
        };
        f.write_str(name)
    }
}

impl Plan {
    pub fn kind(&self) -> PlanKind {
        match self {
            Plan::Empty => PlanKind::Empty,
            Plan::Triple(_) => PlanKind::Triple,
            Plan::Bgp(_) => PlanKind::Bgp,
            Plan::Sequence(_) => PlanKind::Sequence,
            Plan::Union(..) => PlanKind::Union,
            Plan::Join(..) => PlanKind::Join,
            Plan::MultiUnion(_) => PlanKind::MultiUnion,
            Plan::MultiJoin(_) => PlanKind::MultiJoin,
            Plan::Conditional { .. } => PlanKind::Conditional,
            Plan::EndpointRequest { .. } => PlanKind::EndpointRequest,
            Plan::Graph { .. } => PlanKind::Graph,
            Plan::Filter { .. } => PlanKind::Filter,
            Plan::Project { .. } => PlanKind::Project,
            Plan::Distinct(_) => PlanKind::Distinct,
            Plan::Slice { .. } => PlanKind::Slice,
            Plan::OrderBy { .. } => PlanKind::OrderBy,
            Plan::Group { .. } => PlanKind::Group,
        }
    }

    // ------------------------------------------------------------------------
    // Constructors
    // ------------------------------------------------------------------------

    pub fn request(endpoint: impl Into<EndpointId>, subplan: Plan) -> Self {
        Plan::EndpointRequest {
            endpoint: endpoint.into(),
            subplan: Box::new(subplan),
        }
    }

    pub fn union(left: Plan, right: Plan) -> Self {
        Plan::Union(Box::new(left), Box::new(right))
    }

    pub fn join(left: Plan, right: Plan) -> Self {
        Plan::Join(Box::new(left), Box::new(right))
    }

    pub fn conditional(left: Plan, right: Plan) -> Self {
        Plan::Conditional {
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn graph(name: Term, subplan: Plan) -> Self {
        Plan::Graph {
            name,
            subplan: Box::new(subplan),
        }
    }

    pub fn filter(exprs: Vec<Expr>, subplan: Plan) -> Self {
        Plan::Filter {
            exprs,
            subplan: Box::new(subplan),
        }
    }

    pub fn project(vars: Vec<String>, subplan: Plan) -> Self {
        Plan::Project {
            vars,
            subplan: Box::new(subplan),
        }
    }

    pub fn distinct(subplan: Plan) -> Self {
        Plan::Distinct(Box::new(subplan))
    }

    pub fn slice(offset: Option<u64>, limit: Option<u64>, subplan: Plan) -> Self {
        Plan::Slice {
            offset,
            limit,
            subplan: Box::new(subplan),
        }
    }

    pub fn order_by(conditions: Vec<OrderCondition>, subplan: Plan) -> Self {
        Plan::OrderBy {
            conditions,
            subplan: Box::new(subplan),
        }
    }

    pub fn group(vars: Vec<String>, aggregates: Vec<Aggregate>, subplan: Plan) -> Self {
        Plan::Group {
            vars,
            aggregates,
            subplan: Box::new(subplan),
        }
    }

    /// Build a `MultiUnion`, applying the arity-collapse rule.
    pub fn multi_union(children: Vec<Plan>) -> Self {
        collapse(children, Plan::MultiUnion)
    }

    /// Build a `MultiJoin`, applying the arity-collapse rule.
    pub fn multi_join(children: Vec<Plan>) -> Self {
        collapse(children, Plan::MultiJoin)
    }

    /// Endpoint of an `EndpointRequest`, `None` for any other node.
    pub fn endpoint(&self) -> Option<&EndpointId> {
        match self {
            Plan::EndpointRequest { endpoint, .. } => Some(endpoint),
            _ => None,
        }
    }

    /// Rebuild a unary modifier around a new subplan, keeping its payload.
    ///
    /// Returns `None` when `self` is not a unary modifier.
    pub(crate) fn with_subplan(&self, subplan: Plan) -> Option<Plan> {
        let subplan = Box::new(subplan);
        Some(match self {
            Plan::Graph { name, .. } => Plan::Graph {
                name: name.clone(),
                subplan,
            },
            Plan::Filter { exprs, .. } => Plan::Filter {
                exprs: exprs.clone(),
                subplan,
            },
            Plan::Project { vars, .. } => Plan::Project {
                vars: vars.clone(),
                subplan,
            },
            Plan::Distinct(_) => Plan::Distinct(subplan),
            Plan::Slice { offset, limit, .. } => Plan::Slice {
                offset: *offset,
                limit: *limit,
                subplan,
            },
            Plan::OrderBy { conditions, .. } => Plan::OrderBy {
                conditions: conditions.clone(),
                subplan,
            },
            Plan::Group {
                vars, aggregates, ..
            } => Plan::Group {
                vars: vars.clone(),
                aggregates: aggregates.clone(),
                subplan,
            },
            _ => return None,
        })
    }
}

fn collapse(mut children: Vec<Plan>, build: fn(Vec<Plan>) -> Plan) -> Plan {
    match children.len() {
        0 => Plan::Empty,
        1 => children.pop().unwrap_or(Plan::Empty),
        _ => build(children),
    }
}
