//! Override link command handlers

use crate::db::OverrideStore;
use crate::domain::{EpisodeRef, SeriesId};
use crate::state::SharedState;

pub async fn cmd_override_set(
    state: &SharedState,
    series: SeriesId,
    season: u32,
    episode: u32,
    links: &[String],
) -> anyhow::Result<()> {
    let episode = EpisodeRef::new(season, episode)?;

    for link in links {
        if url::Url::parse(link).is_err() {
            println!("Invalid URL: {link}");
            return Ok(());
        }
    }

    state.store.set_override(series, episode, links).await?;
    println!(
        "✓ Override saved for series {series} {episode} ({} links)",
        links.len()
    );
    Ok(())
}

pub async fn cmd_override_remove(
    state: &SharedState,
    series: SeriesId,
    season: u32,
    episode: u32,
) -> anyhow::Result<()> {
    let episode = EpisodeRef::new(season, episode)?;

    if state.store.remove_override(series, episode).await? {
        println!("✓ Override removed for series {series} {episode}");
    } else {
        println!("No override for series {series} {episode}");
    }
    Ok(())
}

pub async fn cmd_override_list(state: &SharedState) -> anyhow::Result<()> {
    let documents = state.store.scan().await?;

    if documents.is_empty() {
        println!("No overrides.");
        return Ok(());
    }

    println!("Overrides ({} total)", documents.len());
    println!("{:-<60}", "");
    for doc in documents {
        println!("{:>8}  {}", doc.series, doc.episode);
        for link in &doc.links {
            println!("            {link}");
        }
    }
    Ok(())
}
