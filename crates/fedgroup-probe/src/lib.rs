//! Source candidate probing for federated SPARQL.
//!
//! Decides which endpoints plausibly hold data for each triple pattern of a
//! query, before any plan is built:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                       SOURCE PROBER                              │
//! ├──────────────────────────────────────────────────────────────────┤
//! │                                                                  │
//! │  patterns ──► eligibility ──┬──► Unknown (no network call)       │
//! │                             │                                    │
//! │                             ▼                                    │
//! │                      DatasetSummary ──┬──► Absent (pruned)       │
//! │                                       │                          │
//! │                                       ▼                          │
//! │              ┌────────────────────────────────────┐              │
//! │              │  ASK fan-out (bounded pool,        │              │
//! │              │  per-probe timeout)                │              │
//! │              └────────────────────────────────────┘              │
//! │                                       │ barrier                  │
//! │                                       ▼                          │
//! │                       RelevanceMatrix + ProbeStats               │
//! │                                                                  │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The network is reached only through [`EndpointProbe`]; the `http`
//! feature provides a SPARQL-protocol implementation.

pub mod config;
pub mod error;
#[cfg(feature = "http")]
pub mod http;
pub mod matrix;
pub mod prober;
pub mod stats;
pub mod summary;

pub use config::{ConfigError, EligibilityPolicy, ProbeConfig, UnknownPolicy};
pub use error::{ProbeError, ProbeStatus};
#[cfg(feature = "http")]
pub use http::SparqlAskClient;
pub use matrix::{ProbeOutcome, Relevance, RelevanceMatrix, Resolution};
pub use prober::{EndpointProbe, ProbeReport, SourceProber};
pub use stats::ProbeStats;
pub use summary::{DatasetSummary, ModuloSummary};
