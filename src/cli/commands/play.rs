//! Source resolution and playback command handlers

use tracing::warn;

use crate::domain::{EpisodeRef, PlaybackKey, SeriesId};
use crate::models::source::{SourceKind, SourceSelection};
use crate::models::watch::ContinueWatchingEntry;
use crate::services::Resolution;
use crate::services::sources::CUSTOM_LABEL;
use crate::state::SharedState;

pub async fn cmd_sources(
    state: &SharedState,
    series: SeriesId,
    season: u32,
    episode: u32,
) -> anyhow::Result<()> {
    let key = PlaybackKey::new(series, EpisodeRef::new(season, episode)?);

    if let Some(resolution) = state.resolver.resolve(key).await {
        print_resolution(&resolution);
    }

    Ok(())
}

pub async fn cmd_play(
    state: &SharedState,
    series: SeriesId,
    season: u32,
    episode: u32,
    source: Option<&str>,
    progress: Option<f32>,
) -> anyhow::Result<()> {
    let episode = EpisodeRef::new(season, episode)?;
    let key = PlaybackKey::new(series, episode);

    let (summary, resolution) = tokio::join!(state.summary(series), state.resolver.resolve(key));
    let Some(mut resolution) = resolution else {
        return Ok(());
    };

    if let Some(source) = source {
        match parse_source(&resolution.selection, source) {
            Some(kind) if resolution.selection.select(kind) => {}
            _ => println!("⚠ Source '{source}' is not available for {episode}, keeping default"),
        }
    }

    print_resolution(&resolution);

    let entry = ContinueWatchingEntry::new(&summary, episode, chrono::Utc::now());
    let entry = match progress {
        Some(p) => entry.with_progress(p.clamp(0.0, 100.0)),
        None => entry,
    };

    if let Err(e) = state.watch.record_continue_watching(entry).await {
        warn!(error = %e, "Continue-watching entry kept in memory only");
        println!("⚠ Could not save watch progress: {e}");
    }

    Ok(())
}

/// `vf`, `vo`/`vostfr`, or the number shown on a lecteur button.
fn parse_source(selection: &SourceSelection, input: &str) -> Option<SourceKind> {
    match input.to_ascii_lowercase().as_str() {
        "vf" | "primary" => Some(SourceKind::Primary),
        "vo" | "vostfr" | "alternate" => Some(SourceKind::Alternate),
        other => {
            let number: usize = other
                .trim_start_matches("lecteur")
                .trim_start_matches("player")
                .trim()
                .parse()
                .ok()?;
            let label = format!("{CUSTOM_LABEL} {number}");
            selection
                .custom()
                .find(|c| c.label == label)
                .map(|c| c.kind)
        }
    }
}

fn print_resolution(resolution: &Resolution) {
    let selection = &resolution.selection;
    let selected = selection.selected();

    println!("Sources for {}", resolution.key);
    println!("{:-<60}", "");
    for candidate in selection.candidates() {
        let marker = if candidate.kind == selected.kind { "▶" } else { " " };
        println!("{marker} {:<10} {}", candidate.label, candidate.uri);
    }

    if let Some(notice) = selection.notice() {
        println!();
        println!("ℹ {notice}");
    }
    if resolution.degraded {
        println!("ℹ Availability lookup failed; showing fallback sources.");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SourcesConfig;
    use crate::services::{ProbeResult, SourceSelector};

    #[test]
    fn source_names_map_to_candidates() {
        let selector = SourceSelector::from_config(&SourcesConfig::default());
        let key = PlaybackKey::new(SeriesId::new(1), EpisodeRef::new(1, 1).unwrap());
        let selection = selector.select_sources(
            key,
            &ProbeResult {
                primary_available: true,
                override_links: vec!["https://a".into(), "https://b".into()],
            },
        );

        assert_eq!(parse_source(&selection, "VF"), Some(SourceKind::Primary));
        assert_eq!(parse_source(&selection, "vostfr"), Some(SourceKind::Alternate));
        assert_eq!(parse_source(&selection, "3"), Some(SourceKind::Custom(1)));
        assert_eq!(parse_source(&selection, "Lecteur 2"), Some(SourceKind::Custom(0)));
        assert_eq!(parse_source(&selection, "player 3"), Some(SourceKind::Custom(1)));
        assert_eq!(parse_source(&selection, "7"), None);
        assert_eq!(parse_source(&selection, "bogus"), None);
    }
}
