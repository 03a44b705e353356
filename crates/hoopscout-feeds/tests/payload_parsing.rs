// Parsing of recorded game-feed payloads.

use std::path::PathBuf;

use hoopscout_core::RawRow;
use hoopscout_feeds::games::{parse_box_score, parse_schedule, parse_scoreboard};
use hoopscout_feeds::HomeAway;
use serde_json::Value;

fn fixture(name: &str) -> Value {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name);
    let text = std::fs::read_to_string(&path).unwrap_or_else(|e| panic!("{}: {e}", path.display()));
    serde_json::from_str(&text).unwrap()
}

// ===========================================================================
// Scoreboard
// ===========================================================================

#[test]
fn scoreboard_events() {
    let games = parse_scoreboard(&fixture("scoreboard.json"));
    assert_eq!(games.len(), 2);

    let final_game = &games[0];
    assert_eq!(final_game.id, "401700123");
    assert_eq!(final_game.date, "2026-02-14");
    assert_eq!(final_game.home.name, "St. John's Red Storm");
    assert_eq!(final_game.away.abbreviation, "GTWN");
    assert_eq!(final_game.home_score, Some(78));
    assert_eq!(final_game.away_score, Some(65));
    assert_eq!(final_game.status, "Final");
    assert!(final_game.completed);
    assert!(final_game.involves("st. john's"));

    let upcoming = &games[1];
    assert_eq!(upcoming.home_score, None);
    assert!(!upcoming.completed);
    assert!(!upcoming.involves("Georgetown"));
}

// ===========================================================================
// Schedule
// ===========================================================================

#[test]
fn schedule_games() {
    let games = parse_schedule(&fixture("schedule.json"));
    assert_eq!(games.len(), 3);
    assert_eq!(games[0].date, "2026-01-20");
    assert_eq!(games[0].away_team, "St. John's Red Storm");
    assert_eq!(games[0].away_score, Some(74));
    assert_eq!(games[1].date, "2026-02-14");
    assert!(games[2].neutral);
    assert!(!games[2].completed);
    assert_eq!(games[2].home_score, None);
}

// ===========================================================================
// Box score
// ===========================================================================

#[test]
fn box_score_sides_come_from_header() {
    let bs = parse_box_score("401700123", &fixture("summary.json")).unwrap();
    let home = bs.home.as_ref().unwrap();
    let away = bs.away.as_ref().unwrap();
    assert_eq!(home.name, "St. John's Red Storm");
    assert_eq!(home.team_id, "2599");
    assert_eq!(home.home_away, HomeAway::Home);
    assert_eq!(home.score, 78);
    assert_eq!(away.name, "Georgetown Hoyas");
    assert_eq!(away.score, 65);
}

#[test]
fn box_score_team_stats_expanded() {
    let bs = parse_box_score("401700123", &fixture("summary.json")).unwrap();
    let stats: &RawRow = &bs.home.as_ref().unwrap().team_stats;
    assert_eq!(stats.float("fieldGoalsMade"), 28.0);
    assert_eq!(stats.float("fieldGoalsAttempted"), 59.0);
    assert_eq!(stats.float("threePointFieldGoalsMade"), 8.0);
    assert_eq!(stats.float("freeThrowsAttempted"), 18.0);
    assert_eq!(stats.float("offensiveRebounds"), 10.0);
    assert_eq!(stats.text("fieldGoalsMade-fieldGoalsAttempted"), "28-59");

    let opp = &bs.away.as_ref().unwrap().team_stats;
    assert!(!opp.contains("turnovers"));
    assert_eq!(opp.float("totalTurnovers"), 13.0);
}

#[test]
fn box_score_player_rows() {
    let bs = parse_box_score("401700123", &fixture("summary.json")).unwrap();
    let players = &bs.home.as_ref().unwrap().players;
    assert_eq!(players.len(), 4);
    assert_eq!(players[0].text("name"), "RJ Luis Jr.");
    assert_eq!(players[0].text("position"), "F");
    assert_eq!(players[0].text("FG"), "7-14");
    assert_eq!(players[0].float("PTS"), 20.0);
    assert_eq!(players[2].text("MIN"), "3");
}
