//! Episode catalog command handler

use crate::domain::SeriesId;
use crate::state::SharedState;

pub async fn cmd_catalog(
    state: &SharedState,
    series: SeriesId,
    season: Option<u32>,
) -> anyhow::Result<()> {
    let Some(view) = state.load_view(series).await else {
        return Ok(());
    };

    if view.catalog.is_empty() {
        println!("No episodes known for {}.", view.details.name);
        return Ok(());
    }

    println!("{} ({} episodes)", view.details.name, view.catalog.len());
    println!("{:-<60}", "");

    let seasons = match season {
        Some(s) => vec![s],
        None => view.catalog.seasons(),
    };

    for season in seasons {
        let episodes: Vec<String> = view
            .catalog
            .episodes_for_season(season)
            .map(|ep| ep.episode().to_string())
            .collect();

        if episodes.is_empty() {
            println!("Season {season}: no episodes");
        } else {
            println!("Season {season}: {}", episodes.join(" "));
        }
    }

    Ok(())
}
