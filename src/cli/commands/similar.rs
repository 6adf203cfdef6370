//! Recommendations command handler

use crate::domain::SeriesId;
use crate::state::SharedState;

pub async fn cmd_similar(state: &SharedState, series: SeriesId) -> anyhow::Result<()> {
    let recommendations = state.series.recommendations(series).await;

    if recommendations.is_empty() {
        println!("No recommendations for series {series}.");
        return Ok(());
    }

    println!("Similar series");
    println!("{:-<60}", "");
    for rec in recommendations {
        println!("{:>8}  {} ({:.1})", rec.id, rec.name, rec.vote_average);
    }

    Ok(())
}
