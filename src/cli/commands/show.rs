//! Show series command handler

use crate::domain::{EpisodeKey, SeriesId};
use crate::models::watch::EpisodeFlag;
use crate::services::SeriesView;
use crate::state::SharedState;

pub async fn cmd_show(
    state: &SharedState,
    series: SeriesId,
    season: Option<u32>,
    episode: Option<u32>,
) -> anyhow::Result<()> {
    let Some(view) = state.load_view(series).await else {
        return Ok(());
    };
    let details = &view.details;

    println!("{}", details.name);
    println!("{:-<60}", "");
    println!("ID:       {}", details.id);
    if let Some(year) = details.first_air_year() {
        println!("Year:     {year}");
    }
    println!("Rating:   {:.1}", details.vote_average);
    println!("Seasons:  {}", details.declared_seasons());
    if !details.genres.is_empty() {
        let genres: Vec<_> = details.genres.iter().map(|g| g.name.as_str()).collect();
        println!("Genres:   {}", genres.join(", "));
    }
    if !details.overview.is_empty() {
        println!();
        println!("{}", details.overview);
    }

    let crew = view.crew();
    if !crew.is_empty() {
        println!();
        println!("Crew");
        for member in crew.iter().take(10) {
            println!("  {} ({})", member.name, member.jobs.join(", "));
        }
    }

    if let Some(trailer) = details
        .videos
        .results
        .iter()
        .find(|v| v.site == "YouTube" && v.video_type == "Trailer")
    {
        println!();
        println!("Trailer:  https://www.youtube.com/watch?v={}", trailer.key);
    }

    let selected = SeriesView::requested_episode(season, episode).or_else(|| {
        view.catalog
            .seasons()
            .first()
            .and_then(|s| view.catalog.first_episode_of(*s))
    });

    let status = state.watch.load(series).await;
    println!();
    println!(
        "Watchlist: {} | Favorite: {} | Watched: {}",
        mark(status.watchlist),
        mark(status.favorite),
        mark(status.watched)
    );

    if let Some(selected) = selected {
        let key: EpisodeKey = selected.key();
        println!(
            "Selected:  {selected} ({key}) | Watchlist: {} | Watched: {}",
            mark(status.episode_flag(EpisodeFlag::Watchlist, selected)),
            mark(status.episode_flag(EpisodeFlag::Watched, selected))
        );
        if !view.catalog.contains(selected) {
            println!("⚠ {selected} is not in the episode catalog");
        }
    }

    Ok(())
}

pub(crate) const fn mark(value: bool) -> &'static str {
    if value { "✓" } else { "-" }
}
