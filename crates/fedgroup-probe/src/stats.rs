use crate::error::ProbeStatus;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Counters for probing, per batch or accumulated over a prober's lifetime.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeStats {
    /// ASK probes actually sent.
    pub probes_issued: usize,
    pub ok: usize,
    pub timeouts: usize,
    pub errors: usize,
    /// Probes answered `true`.
    pub solutions_found: usize,
    /// Pairs ruled out by the dataset summary, no network call.
    pub summary_pruned: usize,
    /// Pairs skipped because the pattern was not selective enough.
    pub ineligible: usize,
    pub elapsed: Duration,
}

impl ProbeStats {
    pub(crate) fn record(&mut self, status: ProbeStatus, exists: bool) {
        match status {
            ProbeStatus::Ok => self.ok += 1,
            ProbeStatus::Timeout => self.timeouts += 1,
            ProbeStatus::Error => self.errors += 1,
        }
        if exists {
            self.solutions_found += 1;
        }
    }

    pub(crate) fn absorb(&mut self, other: &ProbeStats) {
        self.probes_issued += other.probes_issued;
        self.ok += other.ok;
        self.timeouts += other.timeouts;
        self.errors += other.errors;
        self.solutions_found += other.solutions_found;
        self.summary_pruned += other.summary_pruned;
        self.ineligible += other.ineligible;
        self.elapsed += other.elapsed;
    }

    /// Probes that did not come back with an answer.
    pub fn failures(&self) -> usize {
        self.timeouts + self.errors
    }
}
