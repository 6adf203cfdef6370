pub mod cli;
pub mod clients;
pub mod config;
pub mod constants;
pub mod db;
pub mod domain;
pub mod entities;
pub mod models;
pub mod services;
pub mod state;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands, OverrideCommands};
pub use config::Config;
use state::SharedState;

pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let Some(command) = cli.command else {
        print_help();
        return Ok(());
    };

    if matches!(command, Commands::Init) {
        if Config::create_default_if_missing()? {
            println!("✓ Config file created. Edit config.toml and run again.");
        } else {
            println!("Config file already exists.");
        }
        return Ok(());
    }

    let config = Config::load()?;
    config.validate()?;

    init_tracing(&config);

    let state = SharedState::new(config).await?;
    dispatch(&state, command).await
}

fn init_tracing(config: &Config) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.general.log_level));

    let registry = tracing_subscriber::registry().with(env_filter);

    if config.general.log_format == "json" {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

async fn dispatch(state: &SharedState, command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Init => Ok(()),

        Commands::Show {
            series,
            season,
            episode,
        } => cli::cmd_show(state, series, season, episode).await,

        Commands::Catalog { series, season } => cli::cmd_catalog(state, series, season).await,

        Commands::Sources {
            series,
            season,
            episode,
        } => cli::cmd_sources(state, series, season, episode).await,

        Commands::Play {
            series,
            season,
            episode,
            source,
            progress,
        } => cli::cmd_play(state, series, season, episode, source.as_deref(), progress).await,

        Commands::Flag {
            series,
            flag,
            state: toggle,
        } => cli::cmd_flag(state, series, flag, toggle.value()).await,

        Commands::EpisodeFlag {
            series,
            season,
            episode,
            flag,
            state: toggle,
        } => cli::cmd_episode_flag(state, series, season, episode, flag, toggle.value()).await,

        Commands::Status { series } => cli::cmd_status(state, series).await,

        Commands::List { index } => cli::cmd_list(state, index).await,

        Commands::Continue => cli::cmd_continue(state).await,

        Commands::Similar { series } => cli::cmd_similar(state, series).await,

        Commands::Override { command } => match command {
            OverrideCommands::Set {
                series,
                season,
                episode,
                links,
            } => cli::cmd_override_set(state, series, season, episode, &links).await,
            OverrideCommands::Remove {
                series,
                season,
                episode,
            } => cli::cmd_override_remove(state, series, season, episode).await,
            OverrideCommands::List => cli::cmd_override_list(state).await,
        },
    }
}

fn print_help() {
    println!("Episodic - TV episode availability and watch tracking");
    println!();
    println!("USAGE:");
    println!("  episodic <COMMAND> [OPTIONS]");
    println!();
    println!("COMMANDS:");
    println!("  init                              Create default config file");
    println!("  show <id> [--season S --episode E]");
    println!("                                    Show series details and selected episode");
    println!("  catalog <id> [--season S]         List selectable episodes");
    println!("  sources <id> <season> <episode>   Resolve playable sources");
    println!("  play <id> <season> <episode>      Resolve sources and record progress");
    println!("  flag <id> <flag> <on|off>         Set watchlist, favorite or watched");
    println!("  episode-flag <id> <s> <e> <flag> <on|off>");
    println!("                                    Set episode watchlist or watched");
    println!("  status <id>                       Show stored watch status");
    println!("  list <index>                      List a global watch index");
    println!("  continue                          Show the continue-watching list");
    println!("  similar <id>                      Show recommended series");
    println!("  override <set|remove|list>        Manage per-episode override links");
    println!("  help                              Show this help message");
    println!();
    println!("EXAMPLES:");
    println!("  episodic show 1399 --season 2 --episode 3");
    println!("  episodic sources 1399 2 3");
    println!("  episodic episode-flag 1399 2 3 watched on");
    println!("  episodic override set 1399 9 1 https://example.com/player/1");
}
