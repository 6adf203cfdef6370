use crate::config::SourcesConfig;
use crate::domain::PlaybackKey;
use crate::models::source::{SourceCandidate, SourceKind, SourceSelection};
use crate::services::availability::ProbeResult;

pub const PRIMARY_LABEL: &str = "VF";
pub const ALTERNATE_LABEL: &str = "VO/VOSTFR";
pub const CUSTOM_LABEL: &str = "Lecteur";

/// Turns a probe result into the ordered, labeled candidates for one episode.
#[derive(Debug, Clone)]
pub struct SourceSelector {
    primary_template: String,
    alternate_template: String,
}

impl SourceSelector {
    #[must_use]
    pub fn new(primary_template: impl Into<String>, alternate_template: impl Into<String>) -> Self {
        Self {
            primary_template: primary_template.into(),
            alternate_template: alternate_template.into(),
        }
    }

    #[must_use]
    pub fn from_config(config: &SourcesConfig) -> Self {
        Self::new(&config.primary_template, &config.alternate_template)
    }

    /// Candidates are ordered primary, alternate, then custom links in
    /// document order. The default is primary when present, else alternate;
    /// custom links are never selected automatically.
    #[must_use]
    pub fn select_sources(&self, key: PlaybackKey, probe: &ProbeResult) -> SourceSelection {
        let mut candidates = Vec::with_capacity(2 + probe.override_links.len());

        if probe.primary_available {
            candidates.push(SourceCandidate {
                label: PRIMARY_LABEL.to_string(),
                kind: SourceKind::Primary,
                uri: render(&self.primary_template, key),
            });
        }

        candidates.push(SourceCandidate {
            label: ALTERNATE_LABEL.to_string(),
            kind: SourceKind::Alternate,
            uri: render(&self.alternate_template, key),
        });

        // Lecteur numbering follows the visible buttons, so it starts after VF.
        let offset = if probe.primary_available { 2 } else { 1 };
        candidates.extend(
            probe
                .override_links
                .iter()
                .enumerate()
                .map(|(index, uri)| SourceCandidate {
                    label: format!("{CUSTOM_LABEL} {}", index + offset),
                    kind: SourceKind::Custom(index),
                    uri: uri.clone(),
                }),
        );

        let selected = if probe.primary_available {
            SourceKind::Primary
        } else {
            SourceKind::Alternate
        };

        SourceSelection::new(candidates, selected)
    }
}

fn render(template: &str, key: PlaybackKey) -> String {
    template
        .replace("{id}", &key.series.to_string())
        .replace("{season}", &key.episode.season().to_string())
        .replace("{episode}", &key.episode.episode().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{EpisodeRef, SeriesId};

    fn selector() -> SourceSelector {
        SourceSelector::from_config(&SourcesConfig::default())
    }

    fn key() -> PlaybackKey {
        PlaybackKey::new(SeriesId::new(1399), EpisodeRef::new(2, 5).unwrap())
    }

    fn links(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("https://custom/{i}")).collect()
    }

    #[test]
    fn default_uris_follow_templates() {
        let result = ProbeResult {
            primary_available: true,
            override_links: Vec::new(),
        };
        let selection = selector().select_sources(key(), &result);
        let uris: Vec<_> = selection.candidates().iter().map(|c| c.uri.as_str()).collect();
        assert_eq!(
            uris,
            vec![
                "https://frembed.xyz/api/serie.php?id=1399&sa=2&epi=5",
                "https://vidsrc.wtf/api/3/tv/?id=1399&s=2&e=5",
            ]
        );
    }

    #[test]
    fn default_selection_for_any_override_count() {
        for primary_available in [true, false] {
            for n in [0, 1, 4] {
                let result = ProbeResult {
                    primary_available,
                    override_links: links(n),
                };
                let selection = selector().select_sources(key(), &result);

                let expected = if primary_available {
                    SourceKind::Primary
                } else {
                    SourceKind::Alternate
                };
                assert_eq!(selection.selected().kind, expected);
                assert_eq!(selection.has_primary(), primary_available);
                assert_eq!(selection.custom().count(), n);
                assert!(
                    selection
                        .candidates()
                        .iter()
                        .any(|c| c.kind == SourceKind::Alternate)
                );
            }
        }
    }

    #[test]
    fn degraded_result_yields_alternate_only() {
        let selection = selector().select_sources(key(), &ProbeResult::default());
        assert_eq!(selection.candidates().len(), 1);
        assert_eq!(selection.selected().kind, SourceKind::Alternate);
        assert_eq!(selection.selected().label, ALTERNATE_LABEL);
        assert!(selection.notice().is_some());
    }

    #[test]
    fn custom_labels_follow_visible_buttons() {
        let with_primary = selector().select_sources(
            key(),
            &ProbeResult {
                primary_available: true,
                override_links: links(2),
            },
        );
        let labels: Vec<_> = with_primary.custom().map(|c| c.label.as_str()).collect();
        assert_eq!(labels, vec!["Lecteur 2", "Lecteur 3"]);

        let without_primary = selector().select_sources(
            key(),
            &ProbeResult {
                primary_available: false,
                override_links: links(2),
            },
        );
        let labels: Vec<_> = without_primary.custom().map(|c| c.label.as_str()).collect();
        assert_eq!(labels, vec!["Lecteur 1", "Lecteur 2"]);
    }

    #[test]
    fn custom_sources_are_opt_in() {
        let mut selection = selector().select_sources(
            key(),
            &ProbeResult {
                primary_available: false,
                override_links: links(1),
            },
        );
        assert_eq!(selection.selected().kind, SourceKind::Alternate);

        assert!(selection.select(SourceKind::Custom(0)));
        assert_eq!(selection.selected().uri, "https://custom/0");

        assert!(!selection.select(SourceKind::Primary));
        assert_eq!(selection.selected().kind, SourceKind::Custom(0));
    }
}
