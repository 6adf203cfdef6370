use serde::Serialize;
use std::fmt;

/// Where a playable source comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "index")]
pub enum SourceKind {
    /// Dubbed source, offered only when the availability probe reports it.
    Primary,
    /// Original-language fallback, always offered.
    Alternate,
    /// Operator-supplied link, by position in the override document.
    Custom(usize),
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Primary => write!(f, "primary"),
            Self::Alternate => write!(f, "alternate"),
            Self::Custom(index) => write!(f, "custom#{index}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceCandidate {
    pub label: String,
    pub kind: SourceKind,
    pub uri: String,
}

/// Ordered candidates for one episode plus the one currently selected.
///
/// Always holds at least the alternate candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceSelection {
    candidates: Vec<SourceCandidate>,
    selected: SourceKind,
}

impl SourceSelection {
    pub(crate) fn new(candidates: Vec<SourceCandidate>, selected: SourceKind) -> Self {
        debug_assert!(candidates.iter().any(|c| c.kind == SourceKind::Alternate));
        debug_assert!(candidates.iter().any(|c| c.kind == selected));
        Self {
            candidates,
            selected,
        }
    }

    #[must_use]
    pub fn candidates(&self) -> &[SourceCandidate] {
        &self.candidates
    }

    #[must_use]
    pub fn selected(&self) -> &SourceCandidate {
        self.candidates
            .iter()
            .find(|c| c.kind == self.selected)
            .unwrap_or(&self.candidates[0])
    }

    #[must_use]
    pub fn has_primary(&self) -> bool {
        self.candidates.iter().any(|c| c.kind == SourceKind::Primary)
    }

    pub fn custom(&self) -> impl Iterator<Item = &SourceCandidate> {
        self.candidates
            .iter()
            .filter(|c| matches!(c.kind, SourceKind::Custom(_)))
    }

    /// Switches to `kind` on explicit user request.
    ///
    /// Returns `false` and keeps the current selection when no candidate of
    /// that kind exists.
    pub fn select(&mut self, kind: SourceKind) -> bool {
        if self.candidates.iter().any(|c| c.kind == kind) {
            self.selected = kind;
            true
        } else {
            false
        }
    }

    /// Advisory shown when the dubbed source is missing.
    #[must_use]
    pub fn notice(&self) -> Option<&'static str> {
        if self.has_primary() {
            None
        } else {
            Some(
                "This episode is not available on the primary source; \
                 the original-language player may still have it.",
            )
        }
    }
}
