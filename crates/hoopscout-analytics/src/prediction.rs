// Win-probability lookup in the daily prediction (fanmatch) table.

use hoopscout_core::RawRow;
use serde::Serialize;

/// Predicted outcome for one game, oriented to the caller's home team.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WinProbabilityPrediction {
    pub home_pred: f64,
    pub visitor_pred: f64,
    /// Home win probability, 0–100.
    pub home_wp: f64,
    pub pred_tempo: f64,
    pub thrill: f64,
}

impl WinProbabilityPrediction {
    pub fn from_row(row: &RawRow) -> Self {
        WinProbabilityPrediction {
            home_pred: row.float("HomePred"),
            visitor_pred: row.float("VisitorPred"),
            home_wp: row.float("HomeWP"),
            pred_tempo: row.float("PredTempo"),
            thrill: row.float("ThrillScore"),
        }
    }

    /// The same prediction seen from the other side.
    pub fn mirrored(&self) -> Self {
        WinProbabilityPrediction {
            home_pred: self.visitor_pred,
            visitor_pred: self.home_pred,
            home_wp: 100.0 - self.home_wp,
            pred_tempo: self.pred_tempo,
            thrill: self.thrill,
        }
    }
}

/// Find the prediction for `home` vs `away`. A row matches when both names
/// are contained (case-insensitively) in its `Home` and `Visitor` fields; a
/// row listing the fixture the other way round is mirrored.
pub fn find_prediction(rows: &[RawRow], home: &str, away: &str) -> Option<WinProbabilityPrediction> {
    if let Some(row) = rows.iter().find(|r| lists_fixture(r, home, away)) {
        return Some(WinProbabilityPrediction::from_row(row));
    }
    rows.iter()
        .find(|r| lists_fixture(r, away, home))
        .map(|row| WinProbabilityPrediction::from_row(row).mirrored())
}

fn lists_fixture(row: &RawRow, home: &str, visitor: &str) -> bool {
    row.text_contains_ignore_case("Home", home) && row.text_contains_ignore_case("Visitor", visitor)
}
