// Season efficiency trend: snapshot dates and per-snapshot points.

use chrono::{Duration, NaiveDate};
use hoopscout_core::{Rank, RawRow};
use serde::Serialize;

/// Default number of archive snapshots in a trend.
pub const SNAPSHOT_COUNT: usize = 8;

/// First day of the season ending in `season` (November 1 of the prior year).
pub fn season_start(season: u16) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(i32::from(season) - 1, 11, 1)
}

/// Up to `count` evenly spaced dates from season start through `today`.
/// The step is `max(1, days / count)`; dates after `today` are dropped.
/// Empty when `today` is not after the season start.
pub fn snapshot_dates(season: u16, today: NaiveDate, count: usize) -> Vec<NaiveDate> {
    let Some(start) = season_start(season) else {
        return Vec::new();
    };
    let days = (today - start).num_days();
    if days <= 0 || count == 0 {
        return Vec::new();
    }
    let step = (days / count as i64).max(1);
    (0..count as i64)
        .map(|i| start + Duration::days(i * step))
        .take_while(|d| *d <= today)
        .collect()
}

/// One point in the efficiency trend.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendPoint {
    pub date: NaiveDate,
    #[serde(rename = "AdjEM")]
    pub adj_em: f64,
    #[serde(rename = "RankAdjEM")]
    pub rank_em: Rank,
    #[serde(rename = "AdjOE")]
    pub adj_oe: f64,
    #[serde(rename = "AdjDE")]
    pub adj_de: f64,
}

impl TrendPoint {
    pub fn from_row(date: NaiveDate, row: &RawRow) -> Self {
        TrendPoint {
            date,
            adj_em: row.float("AdjEM"),
            rank_em: row.rank("RankAdjEM"),
            adj_oe: row.float("AdjOE"),
            adj_de: row.float("AdjDE"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn evenly_spaced_from_november() {
        // Nov 1 2025 to Mar 1 2026 is 120 days, step 15.
        let dates = snapshot_dates(2026, ymd(2026, 3, 1), SNAPSHOT_COUNT);
        assert_eq!(dates.len(), 8);
        assert_eq!(dates[0], ymd(2025, 11, 1));
        assert_eq!(dates[1], ymd(2025, 11, 16));
        assert_eq!(dates[7], ymd(2026, 2, 14));
    }

    #[test]
    fn early_season_step_is_one_day() {
        let dates = snapshot_dates(2026, ymd(2025, 11, 4), SNAPSHOT_COUNT);
        assert_eq!(
            dates,
            vec![ymd(2025, 11, 1), ymd(2025, 11, 2), ymd(2025, 11, 3), ymd(2025, 11, 4)]
        );
    }

    #[test]
    fn before_season_is_empty() {
        assert!(snapshot_dates(2026, ymd(2025, 10, 15), SNAPSHOT_COUNT).is_empty());
        assert!(snapshot_dates(2026, ymd(2025, 11, 1), SNAPSHOT_COUNT).is_empty());
    }

    #[test]
    fn trend_point_serializes_provider_keys() {
        let row: RawRow =
            serde_json::from_value(json!({"AdjEM": 20.5, "RankAdjEM": 15, "AdjOE": 115.0, "AdjDE": 94.5}))
                .unwrap();
        let v = serde_json::to_value(TrendPoint::from_row(ymd(2026, 1, 15), &row)).unwrap();
        assert_eq!(
            v,
            json!({"date": "2026-01-15", "AdjEM": 20.5, "RankAdjEM": 15, "AdjOE": 115.0, "AdjDE": 94.5})
        );
    }
}
