//! Global list command handlers

use crate::models::watch::IndexKind;
use crate::state::SharedState;

pub async fn cmd_list(state: &SharedState, kind: IndexKind) -> anyhow::Result<()> {
    let entries = state.watch.index(kind).await;

    if entries.is_empty() {
        println!("Nothing in {}.", kind.key());
        return Ok(());
    }

    println!("{} ({} entries)", kind.key(), entries.len());
    println!("{:-<60}", "");

    for entry in entries {
        let episode = entry
            .episode_info
            .map(|ep| format!(" {ep}"))
            .unwrap_or_default();
        println!(
            "{:>8}  {}{episode}  (added {})",
            entry.id,
            entry.title,
            entry.added_at.format("%Y-%m-%d %H:%M")
        );
    }

    Ok(())
}

pub async fn cmd_continue(state: &SharedState) -> anyhow::Result<()> {
    let entries = state.watch.continue_watching().await;

    if entries.is_empty() {
        println!("Nothing to continue.");
        return Ok(());
    }

    println!("Continue watching");
    println!("{:-<60}", "");

    for entry in entries {
        let progress = entry
            .progress
            .map(|p| format!(" [{p:.0}%]"))
            .unwrap_or_default();
        println!(
            "{:>8}  {} {}{progress}  (last {})",
            entry.id,
            entry.title,
            entry.current_episode,
            entry.last_watched.format("%Y-%m-%d %H:%M")
        );
    }

    Ok(())
}
