//! Prober configuration.

use fedgroup_plan::TriplePattern;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;

/// Which triple patterns are worth an ASK probe.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EligibilityPolicy {
    /// Subject or object is bound.
    #[default]
    BoundSubjectOrObject,
    /// Any slot is bound, predicate included.
    AnyBoundTerm,
    /// Every pattern, even `?s ?p ?o`.
    All,
}

impl EligibilityPolicy {
    pub fn admits(&self, pattern: &TriplePattern) -> bool {
        match self {
            EligibilityPolicy::BoundSubjectOrObject => {
                pattern.subject.is_bound() || pattern.object.is_bound()
            }
            EligibilityPolicy::AnyBoundTerm => !pattern.is_fully_variable(),
            EligibilityPolicy::All => true,
        }
    }
}

impl FromStr for EligibilityPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bound_subject_or_object" => Ok(EligibilityPolicy::BoundSubjectOrObject),
            "any_bound_term" => Ok(EligibilityPolicy::AnyBoundTerm),
            "all" => Ok(EligibilityPolicy::All),
            other => Err(ConfigError::Invalid(format!(
                "unknown eligibility policy `{other}`"
            ))),
        }
    }
}

/// How source selection reads an `Unknown` relevance entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownPolicy {
    /// The endpoint stays a candidate.
    #[default]
    Candidate,
    /// The endpoint is dropped.
    Excluded,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeConfig {
    /// Upper bound on a single ASK probe.
    pub probe_timeout: Duration,
    /// Probes in flight at once.
    pub max_concurrent_probes: usize,
    pub eligibility: EligibilityPolicy,
    pub unknown_policy: UnknownPolicy,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            probe_timeout: Duration::from_secs(10),
            max_concurrent_probes: 32,
            eligibility: EligibilityPolicy::default(),
            unknown_policy: UnknownPolicy::default(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

impl ProbeConfig {
    /// Defaults overridden by `FEDGROUP_PROBE_TIMEOUT_MS`,
    /// `FEDGROUP_MAX_CONCURRENT_PROBES` and `FEDGROUP_PROBE_ELIGIBILITY`.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Ok(ms) = std::env::var("FEDGROUP_PROBE_TIMEOUT_MS") {
            let ms: u64 = ms.trim().parse().map_err(|_| {
                ConfigError::Invalid(format!("FEDGROUP_PROBE_TIMEOUT_MS: `{ms}` is not a number"))
            })?;
            config.probe_timeout = Duration::from_millis(ms);
        }
        if let Ok(n) = std::env::var("FEDGROUP_MAX_CONCURRENT_PROBES") {
            config.max_concurrent_probes = n.trim().parse().map_err(|_| {
                ConfigError::Invalid(format!(
                    "FEDGROUP_MAX_CONCURRENT_PROBES: `{n}` is not a number"
                ))
            })?;
        }
        if let Ok(policy) = std::env::var("FEDGROUP_PROBE_ELIGIBILITY") {
            config.eligibility = policy.trim().parse()?;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.probe_timeout.is_zero() {
            return Err(ConfigError::Invalid("probe_timeout must be positive".into()));
        }
        if self.max_concurrent_probes == 0 {
            return Err(ConfigError::Invalid(
                "max_concurrent_probes must be at least 1".into(),
            ));
        }
        Ok(())
    }

    pub fn with_probe_timeout(mut self, timeout: Duration) -> Self {
        self.probe_timeout = timeout;
        self
    }

    pub fn with_max_concurrent_probes(mut self, n: usize) -> Self {
        self.max_concurrent_probes = n;
        self
    }

    pub fn with_eligibility(mut self, eligibility: EligibilityPolicy) -> Self {
        self.eligibility = eligibility;
        self
    }

    pub fn with_unknown_policy(mut self, policy: UnknownPolicy) -> Self {
        self.unknown_policy = policy;
        self
    }
}
