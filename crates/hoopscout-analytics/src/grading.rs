// Per-player efficiency grades from a game's box-score rows.

use hoopscout_core::RawRow;
use serde::{Serialize, Serializer};

use crate::four_factors::round_to;

/// Players below this many minutes are not graded.
pub const MIN_MINUTES: f64 = 5.0;

// ---------------------------------------------------------------------------
// Letter grade
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LetterGrade {
    APlus,
    A,
    B,
    C,
    D,
    F,
}

impl LetterGrade {
    /// Grade an efficiency-per-40 figure.
    pub fn from_eff40(eff: f64) -> Self {
        if eff >= 28.0 {
            LetterGrade::APlus
        } else if eff >= 22.0 {
            LetterGrade::A
        } else if eff >= 16.0 {
            LetterGrade::B
        } else if eff >= 10.0 {
            LetterGrade::C
        } else if eff >= 5.0 {
            LetterGrade::D
        } else {
            LetterGrade::F
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            LetterGrade::APlus => "A+",
            LetterGrade::A => "A",
            LetterGrade::B => "B",
            LetterGrade::C => "C",
            LetterGrade::D => "D",
            LetterGrade::F => "F",
        }
    }
}

impl Serialize for LetterGrade {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// Player grade
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerGameGrade {
    #[serde(rename = "Player")]
    pub player: String,
    #[serde(rename = "POS")]
    pub position: String,
    #[serde(rename = "MIN")]
    pub minutes: f64,
    #[serde(rename = "PTS")]
    pub points: f64,
    #[serde(rename = "AST")]
    pub assists: f64,
    #[serde(rename = "REB")]
    pub rebounds: f64,
    #[serde(rename = "TO")]
    pub turnovers: f64,
    /// PTS / (2·FGA); `None` without field-goal attempts.
    #[serde(rename = "TS%", serialize_with = "serialize_ts")]
    pub true_shooting: Option<f64>,
    #[serde(rename = "Eff/40")]
    pub eff_per_40: f64,
    #[serde(rename = "Grade")]
    pub grade: LetterGrade,
}

impl PlayerGameGrade {
    /// `"54.3%"`, or an em dash when there were no attempts.
    pub fn ts_display(&self) -> String {
        match self.true_shooting {
            Some(ts) => format!("{:.1}%", ts * 100.0),
            None => "\u{2014}".to_string(),
        }
    }
}

fn serialize_ts<S: Serializer>(ts: &Option<f64>, serializer: S) -> Result<S::Ok, S::Error> {
    match ts {
        Some(v) => serializer.serialize_f64(round_to(*v, 3)),
        None => serializer.serialize_str("\u{2014}"),
    }
}

/// Grade every player row with at least [`MIN_MINUTES`], in input order.
pub fn grade_players(rows: &[RawRow]) -> Vec<PlayerGameGrade> {
    rows.iter().filter_map(grade_player).collect()
}

fn grade_player(row: &RawRow) -> Option<PlayerGameGrade> {
    let minutes = parse_minutes(row);
    if minutes < MIN_MINUTES {
        return None;
    }

    let points = row.float("PTS");
    let assists = row.float("AST");
    let rebounds = row.float("REB");
    let turnovers = row.float_or(&["TO", "TOV"]);
    let fga = field_goal_attempts(row);

    let eff = (points + 0.7 * assists + 0.5 * rebounds - turnovers) / minutes * 40.0;
    let true_shooting = (fga > 0.0).then(|| points / (2.0 * fga));

    Some(PlayerGameGrade {
        player: row.text("name"),
        position: row.text("position"),
        minutes,
        points,
        assists,
        rebounds,
        turnovers,
        true_shooting,
        eff_per_40: round_to(eff, 2),
        grade: LetterGrade::from_eff40(eff),
    })
}

/// Whole minutes. Clock-style values keep only the part before the first
/// colon ("3:45" is 3).
fn parse_minutes(row: &RawRow) -> f64 {
    let text = row.text("MIN");
    match text.split_once(':') {
        Some((mins, _)) => mins.trim().parse::<f64>().unwrap_or(0.0).trunc(),
        None => row.float("MIN"),
    }
}

/// `FGA` when present, else the attempts half of a `FG` "made-attempted" cell.
fn field_goal_attempts(row: &RawRow) -> f64 {
    let fga = row.float("FGA");
    if fga > 0.0 {
        return fga;
    }
    row.text("FG")
        .split_once('-')
        .and_then(|(_, att)| att.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
