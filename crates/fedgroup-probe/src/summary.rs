//! Dataset summaries consulted before any network probe.
//!
//! A summary answers "could endpoint E hold anything matching P?" and may
//! over-approximate (say yes when the real answer is no) but must never
//! under-approximate. Summaries are read concurrently by every probe task,
//! so implementations are immutable once shared behind an `Arc`.

use fedgroup_plan::{EndpointId, Term, TriplePattern};
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, BTreeSet};

pub trait DatasetSummary: Send + Sync {
    /// `false` only if `endpoint` certainly holds no match for `pattern`.
    fn may_contain(&self, endpoint: &EndpointId, pattern: &TriplePattern) -> bool;
}

/// Placeholder every literal is summarized to.
const ANY_LITERAL: &str = "\"any\"";

/// In-memory summary that abstracts IRIs by hashing their local suffix.
///
/// `http://auth/Alice` with modulo `m` becomes `http://auth/<h % m>` where `h`
/// is a stable hash of `Alice`. Predicates are kept verbatim, literals
/// collapse to one placeholder. Smaller moduli give smaller summaries and
/// coarser answers.
#[derive(Debug, Clone)]
pub struct ModuloSummary {
    modulo: u64,
    graphs: BTreeMap<EndpointId, BTreeSet<[String; 3]>>,
}

impl ModuloSummary {
    pub fn new(modulo: u64) -> Self {
        Self {
            modulo: modulo.max(1),
            graphs: BTreeMap::new(),
        }
    }

    pub fn modulo(&self) -> u64 {
        self.modulo
    }

    /// Record a ground triple held by `endpoint`.
    ///
    /// Triples with a variable slot are not data and are skipped.
    pub fn add(&mut self, endpoint: &EndpointId, triple: &TriplePattern) {
        let (Some(s), Some(p), Some(o)) = (
            self.summarize(&triple.subject),
            self.summarize_predicate(&triple.predicate),
            self.summarize(&triple.object),
        ) else {
            tracing::warn!(endpoint = %endpoint, triple = %triple, "skipping non-ground triple");
            return;
        };
        self.graphs
            .entry(endpoint.clone())
            .or_default()
            .insert([s, p, o]);
    }

    /// Number of distinct summarized triples stored for `endpoint`.
    pub fn size(&self, endpoint: &EndpointId) -> usize {
        self.graphs.get(endpoint).map_or(0, BTreeSet::len)
    }

    fn summarize(&self, term: &Term) -> Option<String> {
        match term {
            Term::Variable { .. } => None,
            Term::Literal { .. } => Some(ANY_LITERAL.to_string()),
            Term::Iri { value } => {
                let cut = value.rfind(|c: char| c == '/' || c == '#').map_or(0, |i| i + 1);
                let (namespace, suffix) = value.split_at(cut);
                Some(format!("{namespace}{}", self.bucket(suffix)))
            }
        }
    }

    fn summarize_predicate(&self, term: &Term) -> Option<String> {
        match term {
            Term::Iri { value } => Some(value.clone()),
            other => self.summarize(other),
        }
    }

    fn bucket(&self, suffix: &str) -> u64 {
        let digest = Sha256::digest(suffix.as_bytes());
        let mut head = [0u8; 8];
        head.copy_from_slice(&digest[..8]);
        u64::from_be_bytes(head) % self.modulo
    }
}

impl DatasetSummary for ModuloSummary {
    fn may_contain(&self, endpoint: &EndpointId, pattern: &TriplePattern) -> bool {
        // An endpoint the summary never saw cannot be ruled out.
        let Some(graph) = self.graphs.get(endpoint) else {
            return true;
        };
        let wanted = [
            self.summarize(&pattern.subject),
            self.summarize_predicate(&pattern.predicate),
            self.summarize(&pattern.object),
        ];
        graph.iter().any(|stored| {
            stored
                .iter()
                .zip(wanted.iter())
                .all(|(have, want)| want.as_ref().map_or(true, |w| w == have))
        })
    }
}
