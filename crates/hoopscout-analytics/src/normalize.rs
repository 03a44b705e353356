// Metric normalizer: heterogeneous ratings-provider rows to fixed-shape
// season records.
//
// Every read goes through `RawRow`, so a missing or garbled field becomes
// 0.0 (numbers) or the unranked sentinel (ranks). Nothing here can fail.

use hoopscout_core::{find_team_row, Rank, RawRow};
use serde::Serialize;

// ---------------------------------------------------------------------------
// Season tables
// ---------------------------------------------------------------------------

/// The five season-aggregate tables a full team profile is assembled from.
#[derive(Debug, Clone, Default)]
pub struct SeasonTables {
    pub ratings: Vec<RawRow>,
    pub four_factors: Vec<RawRow>,
    pub misc: Vec<RawRow>,
    pub point_distribution: Vec<RawRow>,
    pub height: Vec<RawRow>,
}

// ---------------------------------------------------------------------------
// Team overview
// ---------------------------------------------------------------------------

/// Efficiency ratings summary for one team.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamOverview {
    pub team: String,
    pub record: String,
    pub coach: String,
    /// Points per 100 possessions above an average opponent.
    pub adj_em: f64,
    pub rank_em: Rank,
    pub adj_oe: f64,
    pub rank_oe: Rank,
    pub adj_de: f64,
    pub rank_de: Rank,
    /// Possessions per 40 minutes.
    pub tempo: f64,
    pub rank_tempo: Rank,
    pub luck: f64,
    pub sos: f64,
    pub rank_sos: Rank,
}

impl TeamOverview {
    pub fn from_row(team: &str, row: &RawRow) -> Self {
        TeamOverview {
            team: team.to_string(),
            record: format!("{:.0}-{:.0}", row.float("Wins"), row.float("Losses")),
            coach: row.text("Coach"),
            adj_em: row.float("AdjEM"),
            rank_em: row.rank("RankAdjEM"),
            adj_oe: row.float("AdjOE"),
            rank_oe: row.rank("RankAdjOE"),
            adj_de: row.float("AdjDE"),
            rank_de: row.rank("RankAdjDE"),
            tempo: row.float("AdjTempo"),
            rank_tempo: row.rank("RankAdjTempo"),
            luck: row.float("Luck"),
            sos: row.float("SOS"),
            rank_sos: row.rank("RankSOS"),
        }
    }
}

// ---------------------------------------------------------------------------
// Season Four Factors
// ---------------------------------------------------------------------------

/// Season-aggregate Four Factors as published by the ratings provider.
///
/// Offensive fields describe the team's own possessions; `d_*` fields what
/// it allows (`d_to` is turnovers *forced*). `ft_rate` is the provider's
/// FTA/FGA figure and is not comparable with [`GameFourFactors::ft_rate`].
///
/// [`GameFourFactors::ft_rate`]: crate::four_factors::GameFourFactors
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeasonFourFactors {
    pub efg_pct: f64,
    pub rank_efg: Rank,
    pub to_pct: f64,
    pub rank_to: Rank,
    pub or_pct: f64,
    pub rank_or: Rank,
    pub ft_rate: f64,
    pub rank_ft: Rank,
    pub d_efg: f64,
    pub rank_defg: Rank,
    pub d_to: f64,
    pub rank_dto: Rank,
    pub d_or: f64,
    pub rank_dor: Rank,
    pub d_ft: f64,
    pub rank_dft: Rank,
}

impl SeasonFourFactors {
    pub fn from_row(row: &RawRow) -> Self {
        SeasonFourFactors {
            efg_pct: row.float("eFG_Pct"),
            rank_efg: row.rank("RankeFG_Pct"),
            to_pct: row.float("TO_Pct"),
            rank_to: row.rank("RankTO_Pct"),
            or_pct: row.float("OR_Pct"),
            rank_or: row.rank("RankOR_Pct"),
            ft_rate: row.float("FT_Rate"),
            rank_ft: row.rank("RankFT_Rate"),
            d_efg: row.float("DeFG_Pct"),
            rank_defg: row.rank("RankDeFG_Pct"),
            d_to: row.float("DTO_Pct"),
            rank_dto: row.rank("RankDTO_Pct"),
            d_or: row.float("DOR_Pct"),
            rank_dor: row.rank("RankDOR_Pct"),
            d_ft: row.float("DFT_Rate"),
            rank_dft: row.rank("RankDFT_Rate"),
        }
    }
}

// ---------------------------------------------------------------------------
// Shooting profile
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShootingProfile {
    pub fg3_pct: f64,
    pub rank_fg3: Rank,
    pub fg2_pct: f64,
    pub rank_fg2: Rank,
    pub ft_pct: f64,
    pub rank_ft: Rank,
    pub block_pct: f64,
    pub rank_block: Rank,
    pub steal_rate: f64,
    pub rank_steal: Rank,
    pub assist_rate: f64,
    pub rank_assist: Rank,
    /// Share of field-goal attempts taken from three.
    pub f3g_rate: f64,
    pub rank_f3g: Rank,
    /// Average distance of two-point attempts.
    pub avg2_dist: f64,
    pub pct_from_3: f64,
    pub pct_from_2: f64,
    pub pct_from_ft: f64,
}

impl ShootingProfile {
    /// Combine the misc-stats row with the point-distribution row.
    pub fn from_rows(misc: &RawRow, point_dist: &RawRow) -> Self {
        ShootingProfile {
            fg3_pct: misc.float("FG3Pct"),
            rank_fg3: misc.rank("RankFG3Pct"),
            fg2_pct: misc.float("FG2Pct"),
            rank_fg2: misc.rank("RankFG2Pct"),
            ft_pct: misc.float("FTPct"),
            rank_ft: misc.rank("RankFTPct"),
            block_pct: misc.float("BlockPct"),
            rank_block: misc.rank("RankBlockPct"),
            steal_rate: misc.float("StlRate"),
            rank_steal: misc.rank("RankStlRate"),
            assist_rate: misc.float("ARate"),
            rank_assist: misc.rank("RankARate"),
            f3g_rate: misc.float("F3GRate"),
            rank_f3g: misc.rank("RankF3GRate"),
            avg2_dist: misc.float("Avg2PADist"),
            pct_from_3: point_dist.float("OffFg3"),
            pct_from_2: point_dist.float("OffFg2"),
            pct_from_ft: point_dist.float("OffFt"),
        }
    }

    /// Sum of the point-distribution shares; ≈1.0 (or ≈100) when all three
    /// are populated.
    pub fn point_share_total(&self) -> f64 {
        self.pct_from_3 + self.pct_from_2 + self.pct_from_ft
    }
}

// ---------------------------------------------------------------------------
// Height / experience
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeightExperience {
    pub avg_hgt: f64,
    pub rank_hgt: Rank,
    pub hgt_eff: f64,
    pub rank_heff: Rank,
    /// Minutes-weighted years of experience.
    pub experience: f64,
    pub rank_exp: Rank,
    pub bench: f64,
    pub rank_bench: Rank,
    /// Fraction of minutes returning from last season.
    pub continuity: f64,
}

impl HeightExperience {
    pub fn from_row(row: &RawRow) -> Self {
        HeightExperience {
            avg_hgt: row.float("AvgHgt"),
            rank_hgt: row.rank("AvgHgtRank"),
            hgt_eff: row.float("HgtEff"),
            rank_heff: row.rank("HgtEffRank"),
            experience: row.float("Exp"),
            rank_exp: row.rank("ExpRank"),
            bench: row.float("Bench"),
            rank_bench: row.rank("BenchRank"),
            continuity: row.float("Continuity"),
        }
    }
}

// ---------------------------------------------------------------------------
// Full profile
// ---------------------------------------------------------------------------

/// Everything the callout engine compares for one side of a matchup.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FullProfile {
    pub overview: TeamOverview,
    pub four_factors: SeasonFourFactors,
    pub shooting: ShootingProfile,
    pub height: HeightExperience,
}

impl FullProfile {
    /// Look `team` up in every season table and normalize the matches.
    /// Tables without a matching row contribute all-default values.
    pub fn from_tables(team: &str, tables: &SeasonTables) -> Self {
        let ratings = find_team_row(&tables.ratings, team);
        let ff = find_team_row(&tables.four_factors, team);
        let misc = find_team_row(&tables.misc, team);
        let point_dist = find_team_row(&tables.point_distribution, team);
        let height = find_team_row(&tables.height, team);

        FullProfile {
            overview: TeamOverview::from_row(team, &ratings),
            four_factors: SeasonFourFactors::from_row(&ff),
            shooting: ShootingProfile::from_rows(&misc, &point_dist),
            height: HeightExperience::from_row(&height),
        }
    }

    pub fn team(&self) -> &str {
        &self.overview.team
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use hoopscout_core::UNRANKED;
    use serde_json::json;

    fn row(value: serde_json::Value) -> RawRow {
        serde_json::from_value(value).unwrap()
    }

    fn ratings_row() -> RawRow {
        row(json!({
            "TeamName": "St. John's",
            "Wins": "22", "Losses": 5,
            "Coach": "Rick Pitino",
            "AdjEM": 24.31, "RankAdjEM": 11,
            "AdjOE": "118.2", "RankAdjOE": 30,
            "AdjDE": 93.9, "RankAdjDE": "6",
            "AdjTempo": 69.4, "RankAdjTempo": 120,
            "Luck": 0.031, "SOS": 8.4, "RankSOS": 40
        }))
    }

    #[test]
    fn overview_from_complete_row() {
        let ov = TeamOverview::from_row("St. John's", &ratings_row());
        assert_eq!(ov.record, "22-5");
        assert_eq!(ov.coach, "Rick Pitino");
        assert!((ov.adj_em - 24.31).abs() < 1e-9);
        assert_eq!(ov.rank_em, Rank::new(11));
        assert!((ov.adj_oe - 118.2).abs() < 1e-9);
        assert_eq!(ov.rank_de, Rank::new(6));
        assert!((ov.tempo - 69.4).abs() < 1e-9);
    }

    #[test]
    fn overview_from_empty_row_uses_defaults() {
        let ov = TeamOverview::from_row("Nobody", &RawRow::new());
        assert_eq!(ov.team, "Nobody");
        assert_eq!(ov.record, "0-0");
        assert_eq!(ov.coach, "");
        assert_eq!(ov.adj_em, 0.0);
        assert_eq!(ov.rank_em.value(), UNRANKED);
        assert_eq!(ov.rank_sos.value(), UNRANKED);
    }

    #[test]
    fn four_factors_garbled_fields_degrade() {
        let ff = SeasonFourFactors::from_row(&row(json!({
            "eFG_Pct": "53.1", "RankeFG_Pct": "n/a",
            "TO_Pct": null, "RankTO_Pct": 14,
            "DTO_Pct": 21.4, "RankDTO_Pct": 12
        })));
        assert!((ff.efg_pct - 53.1).abs() < 1e-9);
        assert!(ff.rank_efg.is_unranked());
        assert_eq!(ff.to_pct, 0.0);
        assert_eq!(ff.rank_to, Rank::new(14));
        assert!((ff.d_to - 21.4).abs() < 1e-9);
        assert_eq!(ff.d_or, 0.0);
        assert!(ff.rank_dft.is_unranked());
    }

    #[test]
    fn shooting_combines_misc_and_point_distribution() {
        let misc = row(json!({"FG3Pct": 36.5, "RankFG3Pct": 40, "ARate": 0.61, "RankARate": 22}));
        let pd = row(json!({"OffFg3": 0.31, "OffFg2": 0.51, "OffFt": 0.18}));
        let sh = ShootingProfile::from_rows(&misc, &pd);
        assert_eq!(sh.rank_fg3, Rank::new(40));
        assert!((sh.assist_rate - 0.61).abs() < 1e-9);
        assert!((sh.point_share_total() - 1.0).abs() < 1e-9);
        assert!(sh.rank_block.is_unranked());
    }

    #[test]
    fn full_profile_missing_team_is_all_default() {
        let tables = SeasonTables {
            ratings: vec![ratings_row()],
            ..Default::default()
        };
        let p = FullProfile::from_tables("Georgetown", &tables);
        assert_eq!(p.team(), "Georgetown");
        assert_eq!(p.overview.adj_em, 0.0);
        assert!(p.four_factors.rank_efg.is_unranked());
        assert_eq!(p.height.experience, 0.0);
    }

    #[test]
    fn normalizing_twice_is_identical() {
        let tables = SeasonTables {
            ratings: vec![ratings_row()],
            height: vec![row(json!({"TeamName": "St. John's", "Exp": "2.41", "ExpRank": 9}))],
            ..Default::default()
        };
        let a = FullProfile::from_tables("st. john's", &tables);
        let b = FullProfile::from_tables("st. john's", &tables);
        assert_eq!(a, b);
        assert!((a.height.experience - 2.41).abs() < 1e-9);
    }
}
