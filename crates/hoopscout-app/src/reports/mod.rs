// Report assembly: fetch provider data, normalize it, run the analytics and
// return serializable report values with stable keys.

pub mod league;
pub mod postgame;
pub mod scout;
pub mod season;

use hoopscout_analytics::SeasonTables;
use hoopscout_feeds::{Dataset, FeedResult, RatingsProvider, RatingsQuery};

pub use league::{generate_league_dashboard, LeagueDashboard};
pub use postgame::{generate_postgame_report, GameResult, PostgameReport};
pub use scout::{generate_scout_report, ScoutReport};
pub use season::{generate_season_report, SeasonReport, SeasonShooting, TeamProfile};

/// Fetch the five season tables a full team profile is built from.
pub async fn load_season_tables(ratings: &dyn RatingsProvider, year: u16) -> FeedResult<SeasonTables> {
    let query = RatingsQuery::season(year);
    let (ratings_rows, four_factors, misc, point_distribution, height) = tokio::try_join!(
        ratings.table(Dataset::Ratings, &query),
        ratings.table(Dataset::FourFactors, &query),
        ratings.table(Dataset::MiscStats, &query),
        ratings.table(Dataset::PointDistribution, &query),
        ratings.table(Dataset::Height, &query),
    )?;
    Ok(SeasonTables {
        ratings: ratings_rows,
        four_factors,
        misc,
        point_distribution,
        height,
    })
}
