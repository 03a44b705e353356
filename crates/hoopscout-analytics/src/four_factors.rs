// Single-game Four Factors from box-score team totals.

use hoopscout_core::RawRow;
use serde::Serialize;

/// Free-throw attempt weight in the possession estimate.
pub const FTA_POSSESSION_WEIGHT: f64 = 0.475;

/// Raw team counting stats for one side of one game.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BoxScoreTeamTotals {
    pub fgm: f64,
    pub fga: f64,
    pub fg3m: f64,
    pub fg3a: f64,
    pub ftm: f64,
    pub fta: f64,
    pub oreb: f64,
    pub dreb: f64,
    pub tov: f64,
    pub points: Option<f64>,
}

impl BoxScoreTeamTotals {
    /// Read totals from a box-score team-stat row. Missing stats are zero;
    /// `turnovers` falls back to `totalTurnovers`; a zero or missing
    /// `points` is treated as absent.
    pub fn from_team_stats(row: &RawRow) -> Self {
        let points = row.float("points");
        BoxScoreTeamTotals {
            fgm: row.float("fieldGoalsMade"),
            fga: row.float("fieldGoalsAttempted"),
            fg3m: row.float("threePointFieldGoalsMade"),
            fg3a: row.float("threePointFieldGoalsAttempted"),
            ftm: row.float("freeThrowsMade"),
            fta: row.float("freeThrowsAttempted"),
            oreb: row.float("offensiveRebounds"),
            dreb: row.float("defensiveRebounds"),
            tov: row.float_or(&["turnovers", "totalTurnovers"]),
            points: (points > 0.0).then_some(points),
        }
    }

    /// Reported points, or 2·FGM + 3PM + FTM when the feed omits them.
    pub fn points_or_derived(&self) -> f64 {
        self.points
            .unwrap_or(2.0 * self.fgm + self.fg3m + self.ftm)
    }

    /// FGA − OREB + TOV + 0.475·FTA, or 0 when there were no field-goal
    /// attempts.
    pub fn possessions(&self) -> f64 {
        if self.fga == 0.0 {
            return 0.0;
        }
        self.fga - self.oreb + self.tov + FTA_POSSESSION_WEIGHT * self.fta
    }
}

/// Four Factors for one side of one game, plus the counts they came from.
///
/// `ft_rate` is FTM/FGA here, unlike the season tables (FTA/FGA).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GameFourFactors {
    pub efg_pct: f64,
    pub to_pct: f64,
    pub or_pct: f64,
    pub ft_rate: f64,
    pub possessions: f64,
    pub ppp: f64,
    pub pts: f64,
    pub fg_made: f64,
    pub fg_att: f64,
    pub fg3_made: f64,
    pub fg3_att: f64,
    pub ft_made: f64,
    pub ft_att: f64,
    pub oreb: f64,
    pub tov: f64,
}

pub fn compute_game_four_factors(t: &BoxScoreTeamTotals) -> GameFourFactors {
    let poss = t.possessions();
    let pts = t.points_or_derived();

    let efg = ratio(t.fgm + 0.5 * t.fg3m, t.fga) * 100.0;
    let to = ratio(t.tov, poss) * 100.0;
    let or = ratio(t.oreb, t.oreb + t.dreb) * 100.0;
    let ft_rate = ratio(t.ftm, t.fga);
    let ppp = ratio(pts, poss);

    GameFourFactors {
        efg_pct: round_to(efg, 1),
        to_pct: round_to(to, 1),
        or_pct: round_to(or, 1),
        ft_rate: round_to(ft_rate, 3),
        possessions: round_to(poss, 1),
        ppp: round_to(ppp, 3),
        pts,
        fg_made: t.fgm,
        fg_att: t.fga,
        fg3_made: t.fg3m,
        fg3_att: t.fg3a,
        ft_made: t.ftm,
        ft_att: t.fta,
        oreb: t.oreb,
        tov: t.tov,
    }
}

fn ratio(num: f64, den: f64) -> f64 {
    if den > 0.0 {
        num / den
    } else {
        0.0
    }
}

/// Round half away from zero to `places` decimals.
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    fn sample() -> BoxScoreTeamTotals {
        BoxScoreTeamTotals {
            fgm: 28.0,
            fga: 59.0,
            fg3m: 8.0,
            fg3a: 22.0,
            ftm: 14.0,
            fta: 18.0,
            oreb: 10.0,
            dreb: 25.0,
            tov: 11.0,
            points: None,
        }
    }

    #[test]
    fn reference_game() {
        let ff = compute_game_four_factors(&sample());
        assert!(approx(sample().possessions(), 68.55));
        assert!((ff.possessions - 68.55).abs() <= 0.05 + 1e-9, "poss = {}", ff.possessions);
        assert!(approx(ff.efg_pct, 54.2));
        assert!(approx(ff.to_pct, 16.0));
        assert!(approx(ff.or_pct, 28.6));
        assert!(approx(ff.ft_rate, 0.237));
        // 2*28 + 8 + 14
        assert!(approx(ff.pts, 78.0));
        assert!(approx(ff.ppp, 1.138));
    }

    #[test]
    fn reported_points_take_precedence() {
        let mut t = sample();
        t.points = Some(80.0);
        let ff = compute_game_four_factors(&t);
        assert!(approx(ff.pts, 80.0));
        assert!(approx(ff.ppp, 1.167));
    }

    #[test]
    fn zero_attempts_zero_everything() {
        let t = BoxScoreTeamTotals {
            tov: 4.0,
            fta: 6.0,
            ..Default::default()
        };
        assert_eq!(t.possessions(), 0.0);
        let ff = compute_game_four_factors(&t);
        assert_eq!(ff.possessions, 0.0);
        assert_eq!(ff.efg_pct, 0.0);
        assert_eq!(ff.to_pct, 0.0);
        assert_eq!(ff.or_pct, 0.0);
        assert_eq!(ff.ft_rate, 0.0);
        assert_eq!(ff.ppp, 0.0);
    }

    #[test]
    fn percentages_stay_in_range() {
        let extremes = [
            BoxScoreTeamTotals { fgm: 40.0, fga: 40.0, fg3m: 0.0, ..Default::default() },
            BoxScoreTeamTotals { fgm: 0.0, fga: 50.0, oreb: 30.0, dreb: 0.0, ..Default::default() },
            BoxScoreTeamTotals { fga: 1.0, oreb: 1.0, tov: 40.0, ..Default::default() },
        ];
        for t in &extremes {
            let ff = compute_game_four_factors(t);
            for pct in [ff.efg_pct, ff.to_pct, ff.or_pct] {
                assert!((0.0..=100.0).contains(&pct), "{pct} out of range for {t:?}");
            }
            assert!(ff.ft_rate >= 0.0);
            assert!(ff.ppp >= 0.0);
        }
    }

    #[test]
    fn totals_from_team_stat_row() {
        let row: RawRow = serde_json::from_value(json!({
            "fieldGoalsMade": 28.0,
            "fieldGoalsAttempted": 59.0,
            "threePointFieldGoalsMade": 8.0,
            "threePointFieldGoalsAttempted": 22.0,
            "freeThrowsMade": "14",
            "freeThrowsAttempted": "18",
            "offensiveRebounds": "10",
            "defensiveRebounds": "25",
            "turnovers": "0",
            "totalTurnovers": "11"
        }))
        .unwrap();
        let t = BoxScoreTeamTotals::from_team_stats(&row);
        assert_eq!(t, sample());
    }

    #[test]
    fn empty_stat_row_is_all_zero() {
        let t = BoxScoreTeamTotals::from_team_stats(&RawRow::new());
        assert_eq!(t, BoxScoreTeamTotals::default());
    }

    #[test]
    fn round_to_places() {
        assert_eq!(round_to(54.237, 1), 54.2);
        assert_eq!(round_to(0.23728, 3), 0.237);
        assert_eq!(round_to(-1.25, 1), -1.3);
    }
}
