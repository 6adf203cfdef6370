//! Watch flag command handlers

use std::collections::BTreeMap;

use crate::domain::{EpisodeKey, EpisodeRef, SeriesId};
use crate::models::watch::{EpisodeFlag, SeriesFlag, WatchStatus};
use crate::state::SharedState;

use super::show::mark;

pub async fn cmd_flag(
    state: &SharedState,
    series: SeriesId,
    flag: SeriesFlag,
    value: bool,
) -> anyhow::Result<()> {
    let summary = state.summary(series).await;

    match state.watch.set_series_flag(&summary, flag, value).await {
        Ok(status) => {
            println!("✓ {flag} {} for {}", on_off(value), display_title(&summary.title, series));
            print_status(&status);
        }
        Err(e) => println!("⚠ Flag updated for this session only: {e}"),
    }

    Ok(())
}

pub async fn cmd_episode_flag(
    state: &SharedState,
    series: SeriesId,
    season: u32,
    episode: u32,
    flag: EpisodeFlag,
    value: bool,
) -> anyhow::Result<()> {
    let episode = EpisodeRef::new(season, episode)?;
    let summary = state.summary(series).await;

    match state
        .watch
        .set_episode_flag(&summary, episode, flag, value)
        .await
    {
        Ok(_) => println!(
            "✓ {flag} {} for {} {episode}",
            on_off(value),
            display_title(&summary.title, series)
        ),
        Err(e) => println!("⚠ Flag updated for this session only: {e}"),
    }

    Ok(())
}

pub async fn cmd_status(state: &SharedState, series: SeriesId) -> anyhow::Result<()> {
    let status = state.watch.load(series).await;
    println!("Watch status for series {series}");
    println!("{:-<60}", "");
    print_status(&status);
    Ok(())
}

fn print_status(status: &WatchStatus) {
    println!(
        "Watchlist: {} | Favorite: {} | Watched: {}",
        mark(status.watchlist),
        mark(status.favorite),
        mark(status.watched)
    );

    let watchlist = enabled(&status.episode_watchlist);
    if !watchlist.is_empty() {
        println!("Episode watchlist: {}", watchlist.join(" "));
    }
    let watched = enabled(&status.episode_watched);
    if !watched.is_empty() {
        println!("Episodes watched:  {}", watched.join(" "));
    }
}

fn enabled(map: &BTreeMap<EpisodeKey, bool>) -> Vec<String> {
    map.iter()
        .filter(|(_, set)| **set)
        .map(|(key, _)| key.to_string())
        .collect()
}

const fn on_off(value: bool) -> &'static str {
    if value { "on" } else { "off" }
}

fn display_title(title: &str, series: SeriesId) -> String {
    if title.is_empty() {
        format!("series {series}")
    } else {
        title.to_string()
    }
}
