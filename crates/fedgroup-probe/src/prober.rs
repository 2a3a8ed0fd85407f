//! Concurrent ASK probing over (endpoint, triple pattern) pairs.
//!
//! ```text
//!   patterns ──► eligibility ──► summary ──► ASK fan-out ──► barrier ──► RelevanceMatrix
//!                    │              │           (bounded,
//!                 Unknown         Absent      per-probe timeout)
//! ```
//!
//! A batch never fails as a whole. A probe that times out or errors is
//! recorded as `Unknown` with its status and the remaining probes carry on.

use crate::config::ProbeConfig;
use crate::error::{ProbeError, ProbeStatus};
use crate::matrix::{ProbeOutcome, RelevanceMatrix};
use crate::stats::ProbeStats;
use crate::summary::DatasetSummary;
use async_trait::async_trait;
use fedgroup_plan::{EndpointId, TriplePattern};
use parking_lot::Mutex;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;

/// The network boundary: one boolean existence query against one endpoint.
#[async_trait]
pub trait EndpointProbe: Send + Sync {
    async fn ask(&self, endpoint: &EndpointId, pattern: &TriplePattern) -> Result<bool, ProbeError>;
}

/// Result of one probing batch.
#[derive(Debug, Clone)]
pub struct ProbeReport {
    pub matrix: RelevanceMatrix,
    pub stats: ProbeStats,
}

pub struct SourceProber {
    endpoints: BTreeSet<EndpointId>,
    client: Arc<dyn EndpointProbe>,
    summary: Option<Arc<dyn DatasetSummary>>,
    config: ProbeConfig,
    totals: Mutex<ProbeStats>,
}

impl SourceProber {
    pub fn new(
        endpoints: impl IntoIterator<Item = EndpointId>,
        client: Arc<dyn EndpointProbe>,
    ) -> Self {
        Self {
            endpoints: endpoints.into_iter().collect(),
            client,
            summary: None,
            config: ProbeConfig::default(),
            totals: Mutex::new(ProbeStats::default()),
        }
    }

    pub fn with_config(mut self, config: ProbeConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_summary(mut self, summary: Arc<dyn DatasetSummary>) -> Self {
        self.summary = Some(summary);
        self
    }

    /// Install (or replace) the dataset summary used by later batches.
    pub fn set_summary(&mut self, summary: Arc<dyn DatasetSummary>) {
        self.summary = Some(summary);
    }

    pub fn config(&self) -> &ProbeConfig {
        &self.config
    }

    pub fn endpoints(&self) -> impl Iterator<Item = &EndpointId> {
        self.endpoints.iter()
    }

    /// Running totals over every batch this prober has run.
    pub fn stats(&self) -> ProbeStats {
        self.totals.lock().clone()
    }

    /// Probe every endpoint for every distinct pattern and wait for all of
    /// them. The returned matrix has one entry per (endpoint, pattern) pair.
    pub async fn probe(&self, patterns: &[TriplePattern]) -> ProbeReport {
        let started = Instant::now();
        let mut batch = ProbeStats::default();
        let mut entries = BTreeMap::new();
        let permits = Arc::new(Semaphore::new(self.config.max_concurrent_probes.max(1)));
        let mut scheduled: Vec<(EndpointId, TriplePattern, JoinHandle<Result<bool, ProbeError>>)> =
            Vec::new();

        let distinct: BTreeSet<&TriplePattern> = patterns.iter().collect();
        for pattern in distinct {
            if !self.config.eligibility.admits(pattern) {
                tracing::debug!(pattern = %pattern, "pattern not selective enough, not probing");
                for endpoint in &self.endpoints {
                    entries.insert((endpoint.clone(), pattern.clone()), ProbeOutcome::ineligible());
                    batch.ineligible += 1;
                }
                continue;
            }

            for endpoint in &self.endpoints {
                if let Some(summary) = &self.summary {
                    if !summary.may_contain(endpoint, pattern) {
                        tracing::debug!(
                            endpoint = %endpoint,
                            pattern = %pattern,
                            "summary rules pattern out"
                        );
                        entries.insert((endpoint.clone(), pattern.clone()), ProbeOutcome::pruned());
                        batch.summary_pruned += 1;
                        continue;
                    }
                }

                tracing::debug!(endpoint = %endpoint, pattern = %pattern, "scheduling ASK probe");
                let handle = self.spawn_probe(endpoint.clone(), pattern.clone(), permits.clone());
                scheduled.push((endpoint.clone(), pattern.clone(), handle));
                batch.probes_issued += 1;
            }
        }

        for (endpoint, pattern, handle) in scheduled {
            let result = match handle.await {
                Ok(result) => result,
                Err(join_err) => Err(ProbeError::Connection(format!(
                    "probe task failed: {join_err}"
                ))),
            };
            let outcome = match result {
                Ok(exists) => {
                    batch.record(ProbeStatus::Ok, exists);
                    ProbeOutcome::answered(exists)
                }
                Err(err) => {
                    tracing::warn!(
                        endpoint = %endpoint,
                        pattern = %pattern,
                        error = %err,
                        "ASK probe failed, relevance unknown"
                    );
                    batch.record(err.status(), false);
                    ProbeOutcome::failed(err.status())
                }
            };
            entries.insert((endpoint, pattern), outcome);
        }

        batch.elapsed = started.elapsed();
        self.totals.lock().absorb(&batch);

        tracing::info!(
            issued = batch.probes_issued,
            ok = batch.ok,
            timeouts = batch.timeouts,
            errors = batch.errors,
            pruned = batch.summary_pruned,
            elapsed = ?batch.elapsed,
            "source probing finished"
        );

        ProbeReport {
            matrix: RelevanceMatrix::from_entries(entries),
            stats: batch,
        }
    }

    /// Candidate sources for `pattern` in `report`, reading `Unknown`
    /// entries through the configured [`UnknownPolicy`](crate::UnknownPolicy).
    pub fn candidates<'r>(
        &self,
        report: &'r ProbeReport,
        pattern: &TriplePattern,
    ) -> Vec<&'r EndpointId> {
        report
            .matrix
            .candidates(pattern, self.config.unknown_policy)
    }

    /// [`probe`](Self::probe) for synchronous callers, on a private
    /// current-thread runtime. Fails when called from inside a runtime.
    pub fn probe_blocking(&self, patterns: &[TriplePattern]) -> anyhow::Result<ProbeReport> {
        if tokio::runtime::Handle::try_current().is_ok() {
            anyhow::bail!("probe_blocking called from within an async runtime; use probe().await");
        }
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        Ok(runtime.block_on(self.probe(patterns)))
    }

    fn spawn_probe(
        &self,
        endpoint: EndpointId,
        pattern: TriplePattern,
        permits: Arc<Semaphore>,
    ) -> JoinHandle<Result<bool, ProbeError>> {
        let client = Arc::clone(&self.client);
        let bound = self.config.probe_timeout;
        tokio::spawn(async move {
            let Ok(_permit) = permits.acquire_owned().await else {
                return Err(ProbeError::Connection("probe pool closed".to_string()));
            };
            match tokio::time::timeout(bound, client.ask(&endpoint, &pattern)).await {
                Ok(answer) => answer,
                Err(_) => Err(ProbeError::Timeout(bound)),
            }
        })
    }
}
