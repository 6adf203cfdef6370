//! CLI module - Command-line interface for Episodic
//!
//! This module provides a structured CLI using clap for argument parsing.

mod commands;

use clap::{Parser, Subcommand, ValueEnum};

use crate::domain::SeriesId;
use crate::models::watch::{EpisodeFlag, IndexKind, SeriesFlag};

/// Episodic - TV episode availability and watch tracking
#[derive(Parser)]
#[command(name = "episodic")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum Toggle {
    On,
    Off,
}

impl Toggle {
    #[must_use]
    pub const fn value(self) -> bool {
        matches!(self, Self::On)
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create default config file
    #[command(alias = "--init")]
    Init,

    /// Show series details, crew and the selected episode
    #[command(alias = "i")]
    Show {
        /// TMDB series ID
        series: SeriesId,
        #[arg(long)]
        season: Option<u32>,
        #[arg(long)]
        episode: Option<u32>,
    },

    /// List selectable seasons and episodes
    #[command(alias = "eps")]
    Catalog {
        series: SeriesId,
        /// Only list this season
        #[arg(long)]
        season: Option<u32>,
    },

    /// Resolve playable sources for an episode
    Sources {
        series: SeriesId,
        season: u32,
        episode: u32,
    },

    /// Resolve sources and record the episode in continue-watching
    Play {
        series: SeriesId,
        season: u32,
        episode: u32,
        /// Prefer this source over the default (vf, vo, or a player number)
        #[arg(long)]
        source: Option<String>,
        /// Watch progress in percent
        #[arg(long)]
        progress: Option<f32>,
    },

    /// Set a series flag
    Flag {
        series: SeriesId,
        /// watchlist, favorite or watched
        flag: SeriesFlag,
        state: Toggle,
    },

    /// Set an episode flag
    EpisodeFlag {
        series: SeriesId,
        season: u32,
        episode: u32,
        /// watchlist or watched
        flag: EpisodeFlag,
        state: Toggle,
    },

    /// Show stored watch status of a series
    Status { series: SeriesId },

    /// List a global index (watchlist, favorite, watched, episode-watchlist, episode-watched)
    #[command(alias = "ls")]
    List { index: IndexKind },

    /// Show the continue-watching list
    Continue,

    /// Show recommended series
    Similar { series: SeriesId },

    /// Manage per-episode override links
    Override {
        #[command(subcommand)]
        command: OverrideCommands,
    },
}

#[derive(Subcommand)]
pub enum OverrideCommands {
    /// Create or replace the links of an episode
    Set {
        series: SeriesId,
        season: u32,
        episode: u32,
        /// Player URLs, in display order
        links: Vec<String>,
    },
    /// Remove the override document of an episode
    #[command(alias = "rm")]
    Remove {
        series: SeriesId,
        season: u32,
        episode: u32,
    },
    /// List every override document
    #[command(alias = "ls")]
    List,
}

pub use commands::*;
