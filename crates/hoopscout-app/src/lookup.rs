// Locate the tracked team's games: the game on a given date and the most
// recent completed results.

use chrono::NaiveDate;
use hoopscout_core::config::TrackedTeam;
use hoopscout_feeds::{FeedResult, GameFeed, ScheduledGame};
use serde::Serialize;
use tracing::{debug, warn};

/// A game found for the tracked team, with a one-line description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameMatch {
    pub game_id: String,
    pub description: String,
}

fn score_text(score: Option<u32>) -> String {
    score.map_or_else(|| "-".to_string(), |s| s.to_string())
}

impl GameMatch {
    fn from_scheduled(game: &ScheduledGame) -> Self {
        GameMatch {
            game_id: game.game_id.clone(),
            description: format!(
                "{} at {} ({}-{})",
                game.away_team,
                game.home_team,
                score_text(game.away_score),
                score_text(game.home_score)
            ),
        }
    }
}

/// Find the tracked team's game on `date`: the season schedule is checked
/// first, then that day's scoreboard. A failed schedule fetch falls through
/// to the scoreboard.
pub async fn find_game_on(
    games: &dyn GameFeed,
    team: &TrackedTeam,
    season: u16,
    date: NaiveDate,
) -> FeedResult<Option<GameMatch>> {
    let target = date.format("%Y-%m-%d").to_string();
    match games.team_schedule(&team.espn_id, season).await {
        Ok(schedule) => {
            if let Some(game) = schedule.iter().find(|g| g.date == target) {
                debug!(game_id = %game.game_id, "found game in schedule");
                return Ok(Some(GameMatch::from_scheduled(game)));
            }
        }
        Err(e) => warn!("schedule unavailable for team {}: {}", team.espn_id, e),
    }

    let events = games.scoreboard(date).await?;
    Ok(events
        .iter()
        .find(|e| e.involves(&team.name))
        .map(|e| GameMatch {
            game_id: e.id.clone(),
            description: e.name.clone(),
        }))
}

/// The `n` most recent completed games, newest first.
pub async fn recent_games(
    games: &dyn GameFeed,
    team_id: &str,
    season: u16,
    n: usize,
) -> FeedResult<Vec<ScheduledGame>> {
    let mut completed: Vec<ScheduledGame> = games
        .team_schedule(team_id, season)
        .await?
        .into_iter()
        .filter(|g| g.completed)
        .collect();
    // ISO dates sort lexically.
    completed.sort_by(|a, b| b.date.cmp(&a.date));
    completed.truncate(n);
    Ok(completed)
}
