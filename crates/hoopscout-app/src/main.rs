// hoopscout entry point.
//
// Startup sequence:
// 1. Parse arguments
// 2. Load config
// 3. Initialize tracing (log to file, stdout is reserved for report JSON)
// 4. Build the ratings and game feeds
// 5. Run the subcommand and print its result as pretty JSON

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use chrono::NaiveDate;
use clap::{ArgGroup, Parser, Subcommand};
use hoopscout_app::{lookup, reports};
use hoopscout_core::config::{self, Config, LoggingConfig};
use hoopscout_feeds::{
    CsvSnapshotProvider, EspnClient, GameFeed, KenPomClient, RatingsProvider, ResponseCache,
    TtlCache,
};
use serde::Serialize;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "hoopscout")]
#[command(about = "Basketball scouting, post-game and season analytics reports", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Read ratings tables from CSV snapshots in this directory instead of the live API
    #[arg(long, global = true, env = "HOOPSCOUT_SNAPSHOT_DIR")]
    snapshot_dir: Option<PathBuf>,

    /// Season year (defaults to the configured season)
    #[arg(long, global = true)]
    season: Option<u16>,
}

#[derive(Subcommand, Debug, Clone)]
enum Commands {
    /// Pre-game scout report for a matchup
    Scout {
        #[arg(long)]
        home: String,
        #[arg(long)]
        away: String,
        /// Game date (YYYY-MM-DD), defaults to today
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// Post-game breakdown for the tracked team
    #[command(group(ArgGroup::new("game").required(true).args(["game_id", "date"])))]
    Postgame {
        #[arg(long)]
        game_id: Option<String>,
        /// Look the game up by date (YYYY-MM-DD)
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// Season-to-date report for the tracked team
    Season,

    /// Conference and national dashboard
    League {
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// Scoreboard for a day
    Scoreboard {
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// Most recent completed games for the tracked team
    Recent {
        #[arg(long, default_value = "5")]
        limit: usize,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = config::load_config().context("failed to load configuration")?;
    init_tracing(&config.logging)?;
    info!(
        "Config loaded: team={}, conference={}, season={}",
        config.team.name, config.team.conference, config.season
    );

    let season = cli.season.unwrap_or(config.season);
    let today = chrono::Local::now().date_naive();
    let cache: Arc<dyn ResponseCache> = Arc::new(TtlCache::new());
    let games = EspnClient::new(&config.games, config.cache.clone(), cache.clone())
        .context("failed to build game feed client")?;

    match cli.command {
        Commands::Scout { home, away, date } => {
            let ratings = ratings_provider(&config, cli.snapshot_dir.as_deref(), cache)?;
            let report = reports::generate_scout_report(
                ratings.as_ref(),
                &home,
                &away,
                date.unwrap_or(today),
                season,
            )
            .await
            .context("failed to generate scout report")?;
            print_json(&report)?;
        }
        Commands::Postgame { game_id, date } => {
            let game_id = match (game_id, date) {
                (Some(id), _) => id,
                (None, Some(date)) => {
                    let found = lookup::find_game_on(&games, &config.team, season, date)
                        .await
                        .context("failed to look up game")?;
                    match found {
                        Some(m) => {
                            info!("Found game {}: {}", m.game_id, m.description);
                            m.game_id
                        }
                        None => anyhow::bail!("no {} game found on {}", config.team.name, date),
                    }
                }
                (None, None) => anyhow::bail!("either --game-id or --date is required"),
            };
            let report = reports::generate_postgame_report(&games, &game_id, &config.team.name)
                .await
                .context("failed to generate postgame report")?;
            print_json(&report)?;
        }
        Commands::Season => {
            let ratings = ratings_provider(&config, cli.snapshot_dir.as_deref(), cache)?;
            let report =
                reports::generate_season_report(ratings.as_ref(), &config.team, season, today)
                    .await
                    .context("failed to generate season report")?;
            print_json(&report)?;
        }
        Commands::League { date } => {
            let ratings = ratings_provider(&config, cli.snapshot_dir.as_deref(), cache)?;
            let report = reports::generate_league_dashboard(
                ratings.as_ref(),
                &games,
                &config.team,
                season,
                date.unwrap_or(today),
            )
            .await
            .context("failed to generate league dashboard")?;
            print_json(&report)?;
        }
        Commands::Scoreboard { date } => {
            let events = games
                .scoreboard(date.unwrap_or(today))
                .await
                .context("failed to fetch scoreboard")?;
            print_json(&events)?;
        }
        Commands::Recent { limit } => {
            let recent = lookup::recent_games(&games, &config.team.espn_id, season, limit)
                .await
                .context("failed to fetch schedule")?;
            print_json(&recent)?;
        }
    }

    Ok(())
}

/// CSV snapshots when a directory is given, otherwise the live API.
fn ratings_provider(
    config: &Config,
    snapshot_dir: Option<&Path>,
    cache: Arc<dyn ResponseCache>,
) -> anyhow::Result<Box<dyn RatingsProvider>> {
    if let Some(dir) = snapshot_dir {
        info!("Reading ratings from snapshots in {}", dir.display());
        return Ok(Box::new(CsvSnapshotProvider::new(dir)));
    }
    let api_key = config.credentials.kenpom_api_key.as_deref().unwrap_or("");
    let client = KenPomClient::new(&config.ratings, api_key, config.cache.clone(), cache)
        .context("ratings API is not configured (set KENPOM_API_KEY or use --snapshot-dir)")?;
    Ok(Box::new(client))
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value).context("failed to serialize report")?;
    println!("{json}");
    Ok(())
}

fn init_tracing(logging: &LoggingConfig) -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let log_dir = PathBuf::from(&logging.dir);
    std::fs::create_dir_all(&log_dir)
        .with_context(|| format!("failed to create log directory {}", log_dir.display()))?;

    let log_file = std::fs::File::create(log_dir.join("hoopscout.log"))?;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.filter)),
        )
        .with_writer(log_file)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
