//! Availability probing for a single episode.
//!
//! The probe never fails: lookup errors degrade to "primary unavailable, no
//! override links", and the outcome records whether that happened so callers
//! and tests can tell a genuine answer from a fallback.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::db::OverrideStore;
use crate::domain::PlaybackKey;

/// Remote existence check for the dubbed source.
#[async_trait]
pub trait AvailabilityCheck: Send + Sync {
    /// `true` iff the remote endpoint reports exactly one matching item.
    async fn primary_available(&self, key: PlaybackKey) -> anyhow::Result<bool>;
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProbeResult {
    pub primary_available: bool,
    pub override_links: Vec<String>,
}

/// Why a probe fell back to the default result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DegradeReason {
    OverrideLookup(String),
    RemoteCheck(String),
    Timeout(Duration),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    Probed(ProbeResult),
    DegradedDefault(DegradeReason),
}

impl ProbeOutcome {
    #[must_use]
    pub const fn is_degraded(&self) -> bool {
        matches!(self, Self::DegradedDefault(_))
    }

    /// The result to act on. A degraded outcome yields the default result.
    #[must_use]
    pub fn into_result(self) -> ProbeResult {
        match self {
            Self::Probed(result) => result,
            Self::DegradedDefault(_) => ProbeResult::default(),
        }
    }
}

pub struct AvailabilityProbe {
    overrides: Arc<dyn OverrideStore>,
    remote: Arc<dyn AvailabilityCheck>,
    timeout: Duration,
}

impl AvailabilityProbe {
    #[must_use]
    pub fn new(
        overrides: Arc<dyn OverrideStore>,
        remote: Arc<dyn AvailabilityCheck>,
        timeout: Duration,
    ) -> Self {
        Self {
            overrides,
            remote,
            timeout,
        }
    }

    /// An override document wins over the remote check and counts as the
    /// primary source being available.
    pub async fn probe(&self, key: PlaybackKey) -> ProbeOutcome {
        match self.overrides.get(key.series, key.episode).await {
            Ok(Some(doc)) => {
                debug!(%key, links = doc.links.len(), "Override document found");
                return ProbeOutcome::Probed(ProbeResult {
                    primary_available: true,
                    override_links: doc.links,
                });
            }
            Ok(None) => {}
            Err(e) => {
                warn!(%key, error = %e, "Override lookup failed, using fallback sources");
                return ProbeOutcome::DegradedDefault(DegradeReason::OverrideLookup(e.to_string()));
            }
        }

        match tokio::time::timeout(self.timeout, self.remote.primary_available(key)).await {
            Ok(Ok(available)) => {
                debug!(%key, available, "Remote availability check finished");
                ProbeOutcome::Probed(ProbeResult {
                    primary_available: available,
                    override_links: Vec::new(),
                })
            }
            Ok(Err(e)) => {
                warn!(%key, error = %e, "Remote availability check failed");
                ProbeOutcome::DegradedDefault(DegradeReason::RemoteCheck(e.to_string()))
            }
            Err(_) => {
                warn!(%key, timeout_secs = self.timeout.as_secs(), "Remote availability check timed out");
                ProbeOutcome::DegradedDefault(DegradeReason::Timeout(self.timeout))
            }
        }
    }
}
