// Pre-game scout report: both teams' season profiles side by side, the
// provider's win-probability prediction and the coaching callouts.

use chrono::NaiveDate;
use hoopscout_analytics::{
    build_callouts, find_prediction, Callout, FullProfile, HeightExperience, SeasonFourFactors,
    ShootingProfile, TeamOverview, WinProbabilityPrediction,
};
use hoopscout_feeds::RatingsProvider;
use serde::Serialize;
use tracing::{info, warn};

use crate::error::ReportError;
use crate::reports::load_season_tables;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoutReport {
    pub home_team: String,
    pub away_team: String,
    pub game_date: NaiveDate,
    pub home_overview: TeamOverview,
    pub away_overview: TeamOverview,
    pub home_ff: SeasonFourFactors,
    pub away_ff: SeasonFourFactors,
    pub home_shooting: ShootingProfile,
    pub away_shooting: ShootingProfile,
    pub home_height: HeightExperience,
    pub away_height: HeightExperience,
    /// Absent when the prediction feed failed or listed no such fixture.
    pub fanmatch: Option<WinProbabilityPrediction>,
    pub callouts: Vec<Callout>,
}

impl ScoutReport {
    fn assemble(
        home: FullProfile,
        away: FullProfile,
        game_date: NaiveDate,
        fanmatch: Option<WinProbabilityPrediction>,
    ) -> Self {
        let callouts = build_callouts(&home, &away);
        ScoutReport {
            home_team: home.overview.team.clone(),
            away_team: away.overview.team.clone(),
            game_date,
            home_overview: home.overview,
            away_overview: away.overview,
            home_ff: home.four_factors,
            away_ff: away.four_factors,
            home_shooting: home.shooting,
            away_shooting: away.shooting,
            home_height: home.height,
            away_height: away.height,
            fanmatch,
            callouts,
        }
    }
}

pub async fn generate_scout_report(
    ratings: &dyn RatingsProvider,
    home_team: &str,
    away_team: &str,
    game_date: NaiveDate,
    year: u16,
) -> Result<ScoutReport, ReportError> {
    info!(home_team, away_team, %game_date, "generating scout report");
    let tables = load_season_tables(ratings, year).await?;

    let fanmatch = match ratings.fanmatch(game_date).await {
        Ok(rows) => find_prediction(&rows, home_team, away_team),
        Err(e) => {
            warn!("fanmatch unavailable for {}: {}", game_date, e);
            None
        }
    };

    let home = FullProfile::from_tables(home_team, &tables);
    let away = FullProfile::from_tables(away_team, &tables);
    Ok(ScoutReport::assemble(home, away, game_date, fanmatch))
}
