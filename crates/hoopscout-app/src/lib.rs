// Report generation and game lookup over the ratings and game feeds.

pub mod error;
pub mod lookup;
pub mod reports;

pub use error::ReportError;
pub use lookup::{find_game_on, recent_games, GameMatch};
pub use reports::{
    generate_league_dashboard, generate_postgame_report, generate_scout_report,
    generate_season_report, LeagueDashboard, PostgameReport, ScoutReport, SeasonReport,
};
