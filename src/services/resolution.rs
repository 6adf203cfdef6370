//! Source resolution for the currently selected episode.
//!
//! `Idle -> Resolving(key) -> Resolved(key, ..)`. Starting a resolution
//! supersedes any in-flight one; a superseded resolution is discarded when
//! its probe returns.

use tokio::sync::RwLock;
use tracing::debug;

use crate::domain::PlaybackKey;
use crate::models::source::{SourceKind, SourceSelection};
use crate::services::availability::AvailabilityProbe;
use crate::services::sources::SourceSelector;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub key: PlaybackKey,
    pub selection: SourceSelection,
    /// The probe fell back to its default after a lookup failure.
    pub degraded: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ResolutionState {
    #[default]
    Idle,
    Resolving(PlaybackKey),
    Resolved(Resolution),
}

#[derive(Default)]
struct Inner {
    generation: u64,
    state: ResolutionState,
}

pub struct PlaybackResolver {
    probe: AvailabilityProbe,
    selector: SourceSelector,
    inner: RwLock<Inner>,
}

impl PlaybackResolver {
    #[must_use]
    pub fn new(probe: AvailabilityProbe, selector: SourceSelector) -> Self {
        Self {
            probe,
            selector,
            inner: RwLock::new(Inner::default()),
        }
    }

    /// Probes `key` and publishes the resulting selection.
    ///
    /// Returns `None` when another `resolve` or [`reset`](Self::reset)
    /// started while this one was waiting on the probe.
    pub async fn resolve(&self, key: PlaybackKey) -> Option<Resolution> {
        let generation = {
            let mut inner = self.inner.write().await;
            inner.generation += 1;
            inner.state = ResolutionState::Resolving(key);
            inner.generation
        };

        let outcome = self.probe.probe(key).await;
        let degraded = outcome.is_degraded();
        let selection = self.selector.select_sources(key, &outcome.into_result());

        let mut inner = self.inner.write().await;
        if inner.generation != generation {
            debug!(%key, "Discarding stale resolution");
            return None;
        }

        let resolution = Resolution {
            key,
            selection,
            degraded,
        };
        inner.state = ResolutionState::Resolved(resolution.clone());
        Some(resolution)
    }

    pub async fn current(&self) -> ResolutionState {
        self.inner.read().await.state.clone()
    }

    /// Explicit user choice of a source for the resolved episode.
    pub async fn select(&self, kind: SourceKind) -> bool {
        let mut inner = self.inner.write().await;
        match &mut inner.state {
            ResolutionState::Resolved(resolution) => resolution.selection.select(kind),
            _ => false,
        }
    }

    /// Back to `Idle`, invalidating any in-flight resolution.
    pub async fn reset(&self) {
        let mut inner = self.inner.write().await;
        inner.generation += 1;
        inner.state = ResolutionState::Idle;
    }
}
