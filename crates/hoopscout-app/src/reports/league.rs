// League dashboard: conference standings, conference Four Factors, the
// national top 25 and the day's scoreboard.

use chrono::NaiveDate;
use hoopscout_analytics::league::{conference_peers, national_top, rows_for_teams};
use hoopscout_analytics::TeamOverview;
use hoopscout_core::config::TrackedTeam;
use hoopscout_core::{find_team_row, RawRow};
use hoopscout_feeds::{Dataset, GameFeed, RatingsProvider, RatingsQuery, ScoreboardGame};
use serde::Serialize;
use tracing::{info, warn};

use crate::error::ReportError;

pub const NATIONAL_TOP_N: usize = 25;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeagueDashboard {
    pub date: NaiveDate,
    pub conference: String,
    pub tracked: TeamOverview,
    pub conf_standings: Vec<RawRow>,
    pub conf_ff: Vec<RawRow>,
    pub national_top: Vec<RawRow>,
    /// Empty when the scoreboard could not be fetched.
    pub scoreboard: Vec<ScoreboardGame>,
}

pub async fn generate_league_dashboard(
    ratings: &dyn RatingsProvider,
    games: &dyn GameFeed,
    team: &TrackedTeam,
    year: u16,
    date: NaiveDate,
) -> Result<LeagueDashboard, ReportError> {
    info!(conference = %team.conference, year, %date, "generating league dashboard");
    let query = RatingsQuery::season(year);
    let (all_ratings, four_factors) = tokio::try_join!(
        ratings.table(Dataset::Ratings, &query),
        ratings.table(Dataset::FourFactors, &query),
    )?;

    let conf_standings = conference_peers(&all_ratings, &team.conference);
    let conf_ff = rows_for_teams(&four_factors, &conf_standings);
    let tracked = TeamOverview::from_row(&team.name, &find_team_row(&all_ratings, &team.name));

    let scoreboard = match games.scoreboard(date).await {
        Ok(events) => events,
        Err(e) => {
            warn!("scoreboard unavailable for {}: {}", date, e);
            Vec::new()
        }
    };

    Ok(LeagueDashboard {
        date,
        conference: team.conference.clone(),
        tracked,
        conf_standings,
        conf_ff,
        national_top: national_top(&all_ratings, NATIONAL_TOP_N),
        scoreboard,
    })
}
