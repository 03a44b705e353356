// Post-game report: Four Factors recomputed from the box score, the factor
// battle, player grades and the narrative summary.

use hoopscout_analytics::{
    build_narrative, compute_game_four_factors, factor_battle, grade_players, BoxScoreTeamTotals,
    FactorBattle, GameFourFactors, PlayerGameGrade,
};
use hoopscout_feeds::{BoxScoreSide, FeedError, GameFeed};
use serde::Serialize;
use tracing::info;

use crate::error::ReportError;

/// Name used for the other side when the box score carries only one team.
pub const UNKNOWN_OPPONENT: &str = "Opponent";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum GameResult {
    #[serde(rename = "W")]
    Win,
    #[serde(rename = "L")]
    Loss,
}

impl GameResult {
    /// A tie is not a win.
    pub fn from_scores(tracked: u32, opp: u32) -> Self {
        if tracked > opp {
            GameResult::Win
        } else {
            GameResult::Loss
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            GameResult::Win => "W",
            GameResult::Loss => "L",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostgameReport {
    pub game_id: String,
    #[serde(rename = "sju_team")]
    pub tracked_team: String,
    pub opp_team: String,
    #[serde(rename = "sju_score")]
    pub tracked_score: u32,
    pub opp_score: u32,
    pub result: GameResult,
    #[serde(rename = "sju_ff")]
    pub tracked_ff: GameFourFactors,
    pub opp_ff: GameFourFactors,
    pub ff_battle: FactorBattle,
    pub player_grades: Vec<PlayerGameGrade>,
    pub narrative: String,
}

fn side_four_factors(side: &BoxScoreSide) -> GameFourFactors {
    let mut totals = BoxScoreTeamTotals::from_team_stats(&side.team_stats);
    if side.score > 0 {
        totals.points = Some(f64::from(side.score));
    }
    compute_game_four_factors(&totals)
}

/// Build the report for `tracked_team` from an already fetched box score.
pub fn postgame_from_box_score(
    game_id: &str,
    tracked: &BoxScoreSide,
    opponent: Option<&BoxScoreSide>,
) -> PostgameReport {
    let tracked_ff = side_four_factors(tracked);
    let (opp_team, opp_score, opp_ff) = match opponent {
        Some(side) => (side.name.clone(), side.score, side_four_factors(side)),
        None => (
            UNKNOWN_OPPONENT.to_string(),
            0,
            compute_game_four_factors(&BoxScoreTeamTotals::default()),
        ),
    };

    let ff_battle = factor_battle(&tracked.name, &opp_team, &tracked_ff, &opp_ff);
    let narrative = build_narrative(
        &tracked.name,
        &opp_team,
        tracked.score,
        opp_score,
        &tracked_ff,
        &opp_ff,
    );

    PostgameReport {
        game_id: game_id.to_string(),
        tracked_team: tracked.name.clone(),
        opp_team,
        tracked_score: tracked.score,
        opp_score,
        result: GameResult::from_scores(tracked.score, opp_score),
        tracked_ff,
        opp_ff,
        ff_battle,
        player_grades: grade_players(&tracked.players),
        narrative,
    }
}

pub async fn generate_postgame_report(
    games: &dyn GameFeed,
    game_id: &str,
    tracked_team: &str,
) -> Result<PostgameReport, ReportError> {
    info!(game_id, tracked_team, "generating postgame report");
    let box_score = games.box_score(game_id).await?;
    if box_score.sides().next().is_none() {
        return Err(FeedError::BoxScoreNotFound(game_id.to_string()).into());
    }

    let (tracked, opponent) = box_score
        .split_for(tracked_team)
        .ok_or_else(|| ReportError::TeamNotInGame {
            team: tracked_team.to_string(),
            game_id: game_id.to_string(),
        })?;
    Ok(postgame_from_box_score(game_id, tracked, opponent))
}

#[cfg(test)]
mod tests {
    use super::*;
    use hoopscout_core::RawRow;
    use hoopscout_feeds::HomeAway;
    use serde_json::json;

    fn side(name: &str, home_away: HomeAway, score: u32, stats: serde_json::Value) -> BoxScoreSide {
        BoxScoreSide {
            name: name.to_string(),
            team_id: String::new(),
            home_away,
            score,
            players: Vec::new(),
            team_stats: serde_json::from_value::<RawRow>(stats).unwrap(),
        }
    }

    #[test]
    fn tie_is_a_loss() {
        assert_eq!(GameResult::from_scores(70, 70), GameResult::Loss);
        assert_eq!(GameResult::from_scores(71, 70).label(), "W");
    }

    #[test]
    fn missing_opponent_uses_placeholder() {
        let tracked = side(
            "St. John's Red Storm",
            HomeAway::Home,
            60,
            json!({"fieldGoalsMade": 20, "fieldGoalsAttempted": 50}),
        );
        let report = postgame_from_box_score("1", &tracked, None);
        assert_eq!(report.opp_team, UNKNOWN_OPPONENT);
        assert_eq!(report.opp_score, 0);
        assert_eq!(report.opp_ff.possessions, 0.0);
        assert_eq!(report.result, GameResult::Win);
    }

    #[test]
    fn header_score_drives_points_per_possession() {
        let stats = json!({
            "fieldGoalsMade": 25, "fieldGoalsAttempted": 50,
            "threePointFieldGoalsMade": 5, "freeThrowsMade": 10,
            "freeThrowsAttempted": 20, "offensiveRebounds": 10, "turnovers": 10
        });
        let tracked = side("Home U", HomeAway::Home, 70, stats.clone());
        let other = side("Away U", HomeAway::Away, 50, stats);
        let report = postgame_from_box_score("1", &tracked, Some(&other));
        // 50 - 10 + 10 + 0.475 * 20 = 59.5 possessions.
        assert!((report.tracked_ff.possessions - 59.5).abs() < 1e-9);
        assert!((report.tracked_ff.ppp - 1.176).abs() < 1e-9);
        assert!((report.opp_ff.ppp - 0.840).abs() < 1e-9);
    }

    #[test]
    fn serialized_keys_are_stable() {
        let tracked = side("Home U", HomeAway::Home, 70, json!({}));
        let other = side("Away U", HomeAway::Away, 65, json!({}));
        let value = serde_json::to_value(postgame_from_box_score("9", &tracked, Some(&other))).unwrap();
        for key in [
            "game_id", "sju_team", "opp_team", "sju_score", "opp_score", "result", "sju_ff",
            "opp_ff", "ff_battle", "player_grades", "narrative",
        ] {
            assert!(value.get(key).is_some(), "missing key {key}");
        }
        assert_eq!(value["result"], "W");
    }
}
