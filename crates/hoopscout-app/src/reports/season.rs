// Season intelligence report: the tracked team's profile with national
// percentiles, its conference context and an archive-based efficiency trend.

use chrono::NaiveDate;
use hoopscout_analytics::league::{conference_peers, national_percentile, rows_for_teams};
use hoopscout_analytics::trend::{snapshot_dates, TrendPoint, SNAPSHOT_COUNT};
use hoopscout_analytics::{FullProfile, SeasonFourFactors, ShootingProfile, TeamOverview};
use hoopscout_core::config::TrackedTeam;
use hoopscout_core::{find_team_row, Rank, RawRow};
use hoopscout_feeds::{Dataset, RatingsProvider, RatingsQuery};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::ReportError;
use crate::reports::load_season_tables;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamProfile {
    #[serde(flatten)]
    pub overview: TeamOverview,
    pub conf: String,
    pub experience: f64,
    pub bench: f64,
    pub continuity: f64,
    pub pctile_em: u32,
    pub pctile_oe: u32,
    pub pctile_de: u32,
    pub n_teams: usize,
}

/// Season shooting block, keyed the way dashboards consume it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeasonShooting {
    #[serde(rename = "3pt_pct")]
    pub fg3_pct: f64,
    #[serde(rename = "3pt_rank")]
    pub fg3_rank: Rank,
    #[serde(rename = "2pt_pct")]
    pub fg2_pct: f64,
    #[serde(rename = "2pt_rank")]
    pub fg2_rank: Rank,
    pub ft_pct: f64,
    pub ft_rank: Rank,
    #[serde(rename = "3pa_rate")]
    pub fg3a_rate: f64,
    #[serde(rename = "3pa_rank")]
    pub fg3a_rank: Rank,
    pub assist_rate: f64,
    pub assist_rank: Rank,
    pub steal_rate: f64,
    pub block_pct: f64,
    pub pct_from_3: f64,
    pub pct_from_2: f64,
    pub pct_from_ft: f64,
}

impl From<&ShootingProfile> for SeasonShooting {
    fn from(s: &ShootingProfile) -> Self {
        SeasonShooting {
            fg3_pct: s.fg3_pct,
            fg3_rank: s.rank_fg3,
            fg2_pct: s.fg2_pct,
            fg2_rank: s.rank_fg2,
            ft_pct: s.ft_pct,
            ft_rank: s.rank_ft,
            fg3a_rate: s.f3g_rate,
            fg3a_rank: s.rank_f3g,
            assist_rate: s.assist_rate,
            assist_rank: s.rank_assist,
            steal_rate: s.steal_rate,
            block_pct: s.block_pct,
            pct_from_3: s.pct_from_3,
            pct_from_2: s.pct_from_2,
            pct_from_ft: s.pct_from_ft,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeasonReport {
    pub team_profile: TeamProfile,
    pub ff_profile: SeasonFourFactors,
    pub shooting_profile: SeasonShooting,
    /// Conference members' ratings rows, best AdjEM first.
    pub conf_teams: Vec<RawRow>,
    pub conf_ff: Vec<RawRow>,
    pub conf_ratings: Vec<RawRow>,
    pub efficiency_trend: Vec<TrendPoint>,
}

pub async fn generate_season_report(
    ratings: &dyn RatingsProvider,
    team: &TrackedTeam,
    year: u16,
    today: NaiveDate,
) -> Result<SeasonReport, ReportError> {
    info!(team = %team.name, year, "generating season report");
    let conf_query = RatingsQuery::season(year);
    let (tables, conf_ratings) = tokio::try_join!(
        load_season_tables(ratings, year),
        ratings.table(Dataset::ConferenceRatings, &conf_query),
    )?;

    let profile = FullProfile::from_tables(&team.name, &tables);
    let team_row = find_team_row(&tables.ratings, &team.name);
    let conf = match team_row.text("ConfShort") {
        c if c.is_empty() => team.conference.clone(),
        c => c,
    };

    let n_teams = tables.ratings.len();
    let overview = profile.overview;
    let team_profile = TeamProfile {
        conf: conf.clone(),
        experience: profile.height.experience,
        bench: profile.height.bench,
        continuity: profile.height.continuity,
        pctile_em: national_percentile(overview.rank_em, n_teams),
        pctile_oe: national_percentile(overview.rank_oe, n_teams),
        pctile_de: national_percentile(overview.rank_de, n_teams),
        n_teams,
        overview,
    };

    let conf_teams = conference_peers(&tables.ratings, &conf);
    let conf_ff = rows_for_teams(&tables.four_factors, &conf_teams);
    let efficiency_trend = efficiency_trend(ratings, &team.name, year, today).await;

    Ok(SeasonReport {
        team_profile,
        ff_profile: profile.four_factors,
        shooting_profile: SeasonShooting::from(&profile.shooting),
        conf_teams,
        conf_ff,
        conf_ratings,
        efficiency_trend,
    })
}

/// One point per archive snapshot that lists `team`. Snapshots that fail to
/// load or lack the team are skipped.
pub async fn efficiency_trend(
    ratings: &dyn RatingsProvider,
    team: &str,
    year: u16,
    today: NaiveDate,
) -> Vec<TrendPoint> {
    let mut points = Vec::new();
    for date in snapshot_dates(year, today, SNAPSHOT_COUNT) {
        let rows = match ratings.archive(date, None).await {
            Ok(rows) => rows,
            Err(e) => {
                warn!("skipping archive snapshot {}: {}", date, e);
                continue;
            }
        };
        let row = find_team_row(&rows, team);
        if row.is_empty() {
            warn!("archive snapshot {} has no row for {}", date, team);
            continue;
        }
        points.push(TrendPoint::from_row(date, &row));
    }
    debug!(team, points = points.len(), "built efficiency trend");
    points
}
