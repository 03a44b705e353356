// National and conference context: percentiles, conference peers, top-N.

use std::cmp::Ordering;

use hoopscout_core::{Rank, RawRow};

/// National percentile of `rank` among `total` teams (100 is best).
pub fn national_percentile(rank: Rank, total: usize) -> u32 {
    rank.percentile(total)
}

/// Rows of conference `conf` (matched on `ConfShort`), best AdjEM first.
pub fn conference_peers(ratings: &[RawRow], conf: &str) -> Vec<RawRow> {
    let mut peers: Vec<RawRow> = ratings
        .iter()
        .filter(|r| r.text_eq_ignore_case("ConfShort", conf))
        .cloned()
        .collect();
    peers.sort_by(|a, b| {
        b.float("AdjEM")
            .partial_cmp(&a.float("AdjEM"))
            .unwrap_or(Ordering::Equal)
    });
    peers
}

/// Rows of `table` whose `TeamName` appears in `peers`, in `peers` order.
pub fn rows_for_teams(table: &[RawRow], peers: &[RawRow]) -> Vec<RawRow> {
    peers
        .iter()
        .filter_map(|p| {
            let name = p.text("TeamName");
            table
                .iter()
                .find(|r| r.text_eq_ignore_case("TeamName", &name))
                .cloned()
        })
        .collect()
}

/// The `n` best teams by national AdjEM rank; unranked rows sort last.
pub fn national_top(ratings: &[RawRow], n: usize) -> Vec<RawRow> {
    let mut sorted: Vec<&RawRow> = ratings.iter().collect();
    sorted.sort_by(|a, b| a.rank("RankAdjEM").better_cmp(b.rank("RankAdjEM")));
    sorted.into_iter().take(n).cloned().collect()
}
