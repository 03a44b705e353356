// Game-event provider: scoreboards, team schedules and box scores from the
// public scoreboard API.
//
// The HTTP layer only fetches JSON; everything about the payload shape lives
// in the `parse_*` functions below so it can be tested against fixtures.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use futures_util::FutureExt;
use hoopscout_core::config::{CacheTtls, ProviderSettings};
use hoopscout_core::{safe_text, RawRow};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::cache::ResponseCache;
use crate::error::{FeedError, FeedResult};

/// Division I group filter on the scoreboard.
const DIVISION_ONE_GROUP: &str = "50";
const SCOREBOARD_LIMIT: &str = "100";
const TEAM_LIST_LIMIT: &str = "500";

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TeamRef {
    pub id: String,
    pub name: String,
    pub abbreviation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreboardGame {
    pub id: String,
    pub name: String,
    /// Eastern calendar date, `YYYY-MM-DD`.
    pub date: String,
    pub home: TeamRef,
    pub away: TeamRef,
    pub home_score: Option<u32>,
    pub away_score: Option<u32>,
    pub status: String,
    pub completed: bool,
}

impl ScoreboardGame {
    /// Either side's display name contains `team` (case-insensitive).
    pub fn involves(&self, team: &str) -> bool {
        let needle = team.trim().to_lowercase();
        !needle.is_empty()
            && (self.home.name.to_lowercase().contains(&needle)
                || self.away.name.to_lowercase().contains(&needle))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScheduledGame {
    pub game_id: String,
    /// Eastern calendar date, `YYYY-MM-DD`.
    pub date: String,
    pub home_team: String,
    pub away_team: String,
    pub home_score: Option<u32>,
    pub away_score: Option<u32>,
    pub completed: bool,
    pub neutral: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HomeAway {
    Home,
    Away,
}

/// One team's half of a box score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoxScoreSide {
    pub name: String,
    pub team_id: String,
    pub home_away: HomeAway,
    pub score: u32,
    /// Player lines keyed by short column label plus `name` and `position`.
    pub players: Vec<RawRow>,
    /// Team totals keyed by stat name, "made-attempted" pairs expanded.
    pub team_stats: RawRow,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoxScore {
    pub game_id: String,
    pub home: Option<BoxScoreSide>,
    pub away: Option<BoxScoreSide>,
}

impl BoxScore {
    pub fn sides(&self) -> impl Iterator<Item = &BoxScoreSide> {
        self.home.iter().chain(self.away.iter())
    }

    /// The side whose name contains `team` (case-insensitive) and the other
    /// side, if present.
    pub fn split_for(&self, team: &str) -> Option<(&BoxScoreSide, Option<&BoxScoreSide>)> {
        let needle = team.trim().to_lowercase();
        if needle.is_empty() {
            return None;
        }
        let tracked = self
            .sides()
            .find(|s| s.name.to_lowercase().contains(&needle))?;
        let other = self.sides().find(|s| s.home_away != tracked.home_away);
        Some((tracked, other))
    }
}

// ---------------------------------------------------------------------------
// Provider trait
// ---------------------------------------------------------------------------

#[async_trait]
pub trait GameFeed: Send + Sync {
    async fn scoreboard(&self, date: NaiveDate) -> FeedResult<Vec<ScoreboardGame>>;

    async fn team_schedule(&self, team_id: &str, season: u16) -> FeedResult<Vec<ScheduledGame>>;

    async fn box_score(&self, game_id: &str) -> FeedResult<BoxScore>;

    async fn search_team(&self, name: &str) -> FeedResult<Option<TeamRef>>;

    fn clear_cache(&self);
}

// ---------------------------------------------------------------------------
// EspnClient
// ---------------------------------------------------------------------------

pub struct EspnClient {
    http: reqwest::Client,
    base_url: String,
    ttls: CacheTtls,
    cache: Arc<dyn ResponseCache>,
}

impl EspnClient {
    pub fn new(settings: &ProviderSettings, ttls: CacheTtls, cache: Arc<dyn ResponseCache>) -> FeedResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(settings.timeout())
            .build()
            .map_err(|source| FeedError::Transport {
                url: settings.base_url.clone(),
                source,
            })?;
        Ok(Self {
            http,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            ttls,
            cache,
        })
    }

    async fn cached_json(
        &self,
        path: String,
        params: Vec<(&'static str, String)>,
        ttl: Duration,
    ) -> FeedResult<Value> {
        let query: Vec<String> = params.iter().map(|(k, v)| format!("{k}={v}")).collect();
        let key = format!("games:{path}?{}", query.join("&"));
        self.cache
            .get_or_fetch(&key, ttl, self.get_json(path, params).boxed())
            .await
    }

    async fn get_json(&self, path: String, params: Vec<(&'static str, String)>) -> FeedResult<Value> {
        let url = format!("{}/{}", self.base_url, path);
        debug!(%url, ?params, "game feed request");
        let resp = self
            .http
            .get(&url)
            .query(&params)
            .send()
            .await
            .map_err(|source| FeedError::Transport {
                url: url.clone(),
                source,
            })?;
        let status = resp.status();
        if !status.is_success() {
            return Err(FeedError::Status {
                url,
                status: status.as_u16(),
            });
        }
        resp.json::<Value>()
            .await
            .map_err(|e| FeedError::malformed(path, e.to_string()))
    }
}

#[async_trait]
impl GameFeed for EspnClient {
    async fn scoreboard(&self, date: NaiveDate) -> FeedResult<Vec<ScoreboardGame>> {
        let params = vec![
            ("dates", date.format("%Y%m%d").to_string()),
            ("groups", DIVISION_ONE_GROUP.to_string()),
            ("limit", SCOREBOARD_LIMIT.to_string()),
        ];
        let body = self
            .cached_json("scoreboard".to_string(), params, self.ttls.scoreboard())
            .await?;
        Ok(parse_scoreboard(&body))
    }

    async fn team_schedule(&self, team_id: &str, season: u16) -> FeedResult<Vec<ScheduledGame>> {
        let path = format!("teams/{team_id}/schedule");
        let body = self
            .cached_json(path, vec![("season", season.to_string())], self.ttls.schedule())
            .await?;
        Ok(parse_schedule(&body))
    }

    async fn box_score(&self, game_id: &str) -> FeedResult<BoxScore> {
        let body = self
            .cached_json(
                "summary".to_string(),
                vec![("event", game_id.to_string())],
                self.ttls.box_score(),
            )
            .await?;
        parse_box_score(game_id, &body)
    }

    async fn search_team(&self, name: &str) -> FeedResult<Option<TeamRef>> {
        let body = self
            .cached_json(
                "teams".to_string(),
                vec![("limit", TEAM_LIST_LIMIT.to_string())],
                self.ttls.static_tables(),
            )
            .await?;
        Ok(parse_team_search(&body, name))
    }

    fn clear_cache(&self) {
        self.cache.clear();
    }
}

// ---------------------------------------------------------------------------
// Payload parsing
// ---------------------------------------------------------------------------

/// Convert a UTC timestamp (`2026-02-15T00:30Z`) to an Eastern calendar date
/// by subtracting five hours. Unparseable input falls back to its first ten
/// characters.
pub fn espn_date_et(raw: &str) -> String {
    let trimmed = raw.trim();
    let parsed = ["%Y-%m-%dT%H:%MZ", "%Y-%m-%dT%H:%M:%SZ"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(trimmed, fmt).ok());
    match parsed {
        Some(utc) => (utc - chrono::Duration::hours(5)).format("%Y-%m-%d").to_string(),
        None => trimmed.chars().take(10).collect(),
    }
}

fn value_at<'a>(v: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter().try_fold(v, |cur, key| cur.get(*key))
}

fn text_at(v: &Value, path: &[&str]) -> String {
    safe_text(value_at(v, path))
}

fn array_at<'a>(v: &'a Value, key: &str) -> &'a [Value] {
    v.get(key)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

fn bool_at(v: &Value, path: &[&str]) -> bool {
    value_at(v, path).and_then(Value::as_bool).unwrap_or(false)
}

/// A score as a number, a numeric string, or an object carrying `value` or
/// `displayValue`. Missing or blank is `None`.
fn parse_score(v: Option<&Value>) -> Option<u32> {
    let n = match v? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        obj @ Value::Object(_) => {
            return parse_score(obj.get("value")).or_else(|| parse_score(obj.get("displayValue")));
        }
        _ => None,
    }?;
    (n.is_finite() && n >= 0.0).then(|| n.round() as u32)
}

fn competitor<'a>(comp: &'a Value, side: &str) -> Option<&'a Value> {
    array_at(comp, "competitors")
        .iter()
        .find(|c| c.get("homeAway").and_then(Value::as_str) == Some(side))
}

fn team_ref(team: Option<&Value>) -> TeamRef {
    let team = team.unwrap_or(&Value::Null);
    TeamRef {
        id: text_at(team, &["id"]),
        name: text_at(team, &["displayName"]),
        abbreviation: text_at(team, &["abbreviation"]),
    }
}

pub fn parse_scoreboard(body: &Value) -> Vec<ScoreboardGame> {
    array_at(body, "events")
        .iter()
        .map(|event| {
            let comp = array_at(event, "competitions").first().unwrap_or(&Value::Null);
            let home = competitor(comp, "home");
            let away = competitor(comp, "away");
            ScoreboardGame {
                id: text_at(event, &["id"]),
                name: text_at(event, &["name"]),
                date: espn_date_et(&text_at(event, &["date"])),
                home: team_ref(home.and_then(|c| c.get("team"))),
                away: team_ref(away.and_then(|c| c.get("team"))),
                home_score: parse_score(home.and_then(|c| c.get("score"))),
                away_score: parse_score(away.and_then(|c| c.get("score"))),
                status: text_at(comp, &["status", "type", "description"]),
                completed: bool_at(comp, &["status", "type", "completed"]),
            }
        })
        .collect()
}

pub fn parse_schedule(body: &Value) -> Vec<ScheduledGame> {
    array_at(body, "events")
        .iter()
        .map(|event| {
            let comp = array_at(event, "competitions").first().unwrap_or(&Value::Null);
            let home = competitor(comp, "home");
            let away = competitor(comp, "away");
            let name_of = |c: Option<&Value>| c.map(|c| text_at(c, &["team", "displayName"])).unwrap_or_default();
            ScheduledGame {
                game_id: text_at(event, &["id"]),
                date: espn_date_et(&text_at(event, &["date"])),
                home_team: name_of(home),
                away_team: name_of(away),
                home_score: parse_score(home.and_then(|c| c.get("score"))),
                away_score: parse_score(away.and_then(|c| c.get("score"))),
                completed: bool_at(comp, &["status", "type", "completed"]),
                neutral: bool_at(comp, &["neutralSite"]),
            }
        })
        .collect()
}

/// Parse a game summary into home and away sides.
///
/// Sides are assigned from the header competitors by team id; a team missing
/// from the header falls back to the box score's own `homeAway`. A summary
/// with no player blocks is `BoxScoreNotFound`.
pub fn parse_box_score(game_id: &str, body: &Value) -> FeedResult<BoxScore> {
    let mut header_side: Vec<(String, HomeAway)> = Vec::new();
    let mut header_score: Vec<(HomeAway, Option<u32>)> = Vec::new();
    for comp in array_at(value_at(body, &["header"]).unwrap_or(&Value::Null), "competitions") {
        for c in array_at(comp, "competitors") {
            let ha = home_away_of(c);
            let tid = text_at(c, &["team", "id"]);
            if !tid.is_empty() {
                header_side.push((tid, ha));
            }
            header_score.push((ha, parse_score(c.get("score"))));
        }
    }

    let boxscore = value_at(body, &["boxscore"]).unwrap_or(&Value::Null);
    let mut result = BoxScore {
        game_id: game_id.to_string(),
        home: None,
        away: None,
    };

    for block in array_at(boxscore, "players") {
        let name = text_at(block, &["team", "displayName"]);
        let tid = text_at(block, &["team", "id"]);
        let ha = header_side
            .iter()
            .find(|(id, _)| !tid.is_empty() && *id == tid)
            .map(|(_, ha)| *ha)
            .unwrap_or_else(|| home_away_of(block));
        let score = header_score
            .iter()
            .find(|(side, _)| *side == ha)
            .and_then(|(_, s)| *s)
            .unwrap_or(0);

        let side = BoxScoreSide {
            players: parse_player_rows(block),
            team_stats: parse_team_stats(boxscore, &tid, &name),
            name,
            team_id: tid,
            home_away: ha,
            score,
        };
        match ha {
            HomeAway::Home => result.home = Some(side),
            HomeAway::Away => result.away = Some(side),
        }
    }

    if result.home.is_none() && result.away.is_none() {
        return Err(FeedError::BoxScoreNotFound(game_id.to_string()));
    }
    Ok(result)
}

fn home_away_of(v: &Value) -> HomeAway {
    match v.get("homeAway").and_then(Value::as_str) {
        Some("home") => HomeAway::Home,
        _ => HomeAway::Away,
    }
}

fn parse_player_rows(block: &Value) -> Vec<RawRow> {
    let mut rows = Vec::new();
    for stat_block in array_at(block, "statistics") {
        let labels: Vec<String> = array_at(stat_block, "labels")
            .iter()
            .map(|l| match l {
                Value::String(s) => s.clone(),
                other => {
                    let short = text_at(other, &["shortDisplayName"]);
                    if short.is_empty() {
                        text_at(other, &["name"])
                    } else {
                        short
                    }
                }
            })
            .collect();

        for athlete in array_at(stat_block, "athletes") {
            let mut row = RawRow::new();
            row.insert("name", text_at(athlete, &["athlete", "displayName"]));
            row.insert("position", text_at(athlete, &["athlete", "position", "abbreviation"]));
            for (label, value) in labels.iter().zip(array_at(athlete, "stats")) {
                row.insert(label.clone(), value.clone());
            }
            rows.push(row);
        }
    }
    rows
}

/// Team totals for the team matching `tid` (or `name`). A stat named
/// `a-b` with a value `x-y` also yields numeric `a = x` and `b = y`.
fn parse_team_stats(boxscore: &Value, tid: &str, name: &str) -> RawRow {
    let mut totals = RawRow::new();
    let matching = array_at(boxscore, "teams").iter().filter(|t| {
        let id = text_at(t, &["team", "id"]);
        (!tid.is_empty() && id == tid) || (!name.is_empty() && text_at(t, &["team", "displayName"]) == name)
    });
    for team in matching {
        for stat in array_at(team, "statistics") {
            let stat_name = text_at(stat, &["name"]);
            if stat_name.is_empty() {
                continue;
            }
            let value = stat
                .get("displayValue")
                .or_else(|| stat.get("value"))
                .cloned()
                .unwrap_or(Value::Null);
            if let (Some((made_key, att_key)), Some(text)) = (stat_name.split_once('-'), value.as_str()) {
                if let Some((made, att)) = split_made_attempted(text) {
                    totals.insert(made_key, made);
                    totals.insert(att_key, att);
                }
            }
            totals.insert(stat_name, value);
        }
    }
    totals
}

fn split_made_attempted(text: &str) -> Option<(f64, f64)> {
    let (made, att) = text.split_once('-')?;
    let made = made.trim().parse::<f64>().ok()?;
    let att = att.trim().parse::<f64>().ok()?;
    Some((made, att))
}

/// First team whose display name or short name contains `query`.
pub fn parse_team_search(body: &Value, query: &str) -> Option<TeamRef> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return None;
    }
    let sports = array_at(body, "sports").first()?;
    let league = array_at(sports, "leagues").first()?;
    array_at(league, "teams")
        .iter()
        .filter_map(|entry| entry.get("team"))
        .find(|t| {
            text_at(t, &["displayName"]).to_lowercase().contains(&needle)
                || text_at(t, &["name"]).to_lowercase().contains(&needle)
        })
        .map(|t| team_ref(Some(t)))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn eastern_date_crosses_midnight() {
        assert_eq!(espn_date_et("2026-02-15T00:30Z"), "2026-02-14");
        assert_eq!(espn_date_et("2026-02-15T17:00Z"), "2026-02-15");
        assert_eq!(espn_date_et("2026-02-15T04:59:59Z"), "2026-02-14");
    }

    #[test]
    fn eastern_date_fallback() {
        assert_eq!(espn_date_et("2026-03-01 TBD"), "2026-03-01");
        assert_eq!(espn_date_et("soon"), "soon");
        assert_eq!(espn_date_et(""), "");
    }

    #[test]
    fn score_shapes() {
        assert_eq!(parse_score(Some(&json!("78"))), Some(78));
        assert_eq!(parse_score(Some(&json!(65.0))), Some(65));
        assert_eq!(parse_score(Some(&json!({"value": 81.0, "displayValue": "81"}))), Some(81));
        assert_eq!(parse_score(Some(&json!({"displayValue": "70"}))), Some(70));
        assert_eq!(parse_score(Some(&json!(""))), None);
        assert_eq!(parse_score(None), None);
    }

    #[test]
    fn made_attempted_split() {
        assert_eq!(split_made_attempted("28-59"), Some((28.0, 59.0)));
        assert_eq!(split_made_attempted("--"), None);
        assert_eq!(split_made_attempted("12"), None);
    }

    #[test]
    fn box_score_without_players_is_not_found() {
        let err = parse_box_score("401", &json!({"header": {}, "boxscore": {"players": []}})).unwrap_err();
        assert!(matches!(err, FeedError::BoxScoreNotFound(ref id) if id == "401"));
    }

    #[test]
    fn box_score_falls_back_to_block_home_away() {
        let body = json!({
            "boxscore": {
                "players": [
                    {"team": {"id": "1", "displayName": "Home U"}, "homeAway": "home", "statistics": []},
                    {"team": {"id": "2", "displayName": "Away St"}, "homeAway": "away", "statistics": []}
                ]
            }
        });
        let bs = parse_box_score("9", &body).unwrap();
        assert_eq!(bs.home.as_ref().unwrap().name, "Home U");
        assert_eq!(bs.away.as_ref().unwrap().name, "Away St");
        assert_eq!(bs.home.as_ref().unwrap().score, 0);
    }

    #[test]
    fn split_for_finds_tracked_and_opponent() {
        let body = json!({
            "boxscore": {
                "players": [
                    {"team": {"id": "1", "displayName": "St. John's Red Storm"}, "homeAway": "home"},
                    {"team": {"id": "2", "displayName": "Georgetown Hoyas"}, "homeAway": "away"}
                ]
            }
        });
        let bs = parse_box_score("9", &body).unwrap();
        let (tracked, opp) = bs.split_for("st. john's").unwrap();
        assert_eq!(tracked.team_id, "1");
        assert_eq!(opp.unwrap().name, "Georgetown Hoyas");
        assert!(bs.split_for("Villanova").is_none());
    }

    #[test]
    fn team_search_matches_short_name() {
        let body = json!({"sports": [{"leagues": [{"teams": [
            {"team": {"id": "2599", "displayName": "St. John's Red Storm", "name": "Red Storm", "abbreviation": "SJU"}},
            {"team": {"id": "46", "displayName": "Georgetown Hoyas", "name": "Hoyas", "abbreviation": "GTWN"}}
        ]}]}]});
        let t = parse_team_search(&body, "hoyas").unwrap();
        assert_eq!(t.id, "46");
        assert_eq!(t.abbreviation, "GTWN");
        assert!(parse_team_search(&body, "Villanova").is_none());
        assert!(parse_team_search(&json!({}), "Hoyas").is_none());
    }
}
