//! Relevance matrix: (endpoint, triple pattern) → tri-state relevance.

use crate::config::UnknownPolicy;
use crate::error::ProbeStatus;
use fedgroup_plan::{EndpointId, TriplePattern};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Relevance {
    Present,
    Absent,
    /// Not probed, or the probe failed.
    Unknown,
}

/// How an entry was decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "by", rename_all = "snake_case")]
pub enum Resolution {
    /// An ASK probe was issued.
    Probed { status: ProbeStatus },
    /// The dataset summary ruled the pattern out.
    SummaryPruned,
    /// The pattern is not selective enough to probe.
    Ineligible,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProbeOutcome {
    pub relevance: Relevance,
    pub resolution: Resolution,
}

impl ProbeOutcome {
    pub fn answered(exists: bool) -> Self {
        Self {
            relevance: if exists {
                Relevance::Present
            } else {
                Relevance::Absent
            },
            resolution: Resolution::Probed {
                status: ProbeStatus::Ok,
            },
        }
    }

    pub fn failed(status: ProbeStatus) -> Self {
        Self {
            relevance: Relevance::Unknown,
            resolution: Resolution::Probed { status },
        }
    }

    pub fn pruned() -> Self {
        Self {
            relevance: Relevance::Absent,
            resolution: Resolution::SummaryPruned,
        }
    }

    pub fn ineligible() -> Self {
        Self {
            relevance: Relevance::Unknown,
            resolution: Resolution::Ineligible,
        }
    }

    /// Status of the issued probe, `None` when no probe was issued.
    pub fn status(&self) -> Option<ProbeStatus> {
        match self.resolution {
            Resolution::Probed { status } => Some(status),
            Resolution::SummaryPruned | Resolution::Ineligible => None,
        }
    }
}

/// Fully populated result of one probing batch. Read-only once built.
///
/// Keys are unique and iteration is ordered by (endpoint, pattern), so two
/// runs over the same inputs walk the matrix identically.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelevanceMatrix {
    entries: BTreeMap<(EndpointId, TriplePattern), ProbeOutcome>,
}

impl RelevanceMatrix {
    pub(crate) fn from_entries(
        entries: BTreeMap<(EndpointId, TriplePattern), ProbeOutcome>,
    ) -> Self {
        Self { entries }
    }

    pub fn get(&self, endpoint: &EndpointId, pattern: &TriplePattern) -> Option<&ProbeOutcome> {
        self.entries.get(&(endpoint.clone(), pattern.clone()))
    }

    pub fn relevance(&self, endpoint: &EndpointId, pattern: &TriplePattern) -> Option<Relevance> {
        self.get(endpoint, pattern).map(|o| o.relevance)
    }

    pub fn status(&self, endpoint: &EndpointId, pattern: &TriplePattern) -> Option<ProbeStatus> {
        self.get(endpoint, pattern).and_then(ProbeOutcome::status)
    }

    /// Endpoints that may hold matches for `pattern`, in endpoint order.
    pub fn candidates(&self, pattern: &TriplePattern, policy: UnknownPolicy) -> Vec<&EndpointId> {
        self.entries
            .iter()
            .filter(|((_, tp), _)| tp == pattern)
            .filter(|(_, outcome)| match outcome.relevance {
                Relevance::Present => true,
                Relevance::Absent => false,
                Relevance::Unknown => policy == UnknownPolicy::Candidate,
            })
            .map(|((endpoint, _), _)| endpoint)
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&EndpointId, &TriplePattern, &ProbeOutcome)> {
        self.entries.iter().map(|((e, tp), o)| (e, tp, o))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fedgroup_plan::Term;

    #[test]
    fn candidates_follow_unknown_policy() {
        let tp = TriplePattern::new(Term::iri("http://s"), Term::var("p"), Term::var("o"));
        let a = EndpointId::new("http://a");
        let b = EndpointId::new("http://b");
        let c = EndpointId::new("http://c");

        let mut entries = BTreeMap::new();
        entries.insert((a.clone(), tp.clone()), ProbeOutcome::answered(true));
        entries.insert((b.clone(), tp.clone()), ProbeOutcome::failed(ProbeStatus::Timeout));
        entries.insert((c.clone(), tp.clone()), ProbeOutcome::pruned());
        let matrix = RelevanceMatrix::from_entries(entries);

        assert_eq!(matrix.candidates(&tp, UnknownPolicy::Candidate), vec![&a, &b]);
        assert_eq!(matrix.candidates(&tp, UnknownPolicy::Excluded), vec![&a]);
        assert_eq!(matrix.status(&b, &tp), Some(ProbeStatus::Timeout));
        assert_eq!(matrix.status(&c, &tp), None);
        assert_eq!(matrix.relevance(&c, &tp), Some(Relevance::Absent));
    }
}
