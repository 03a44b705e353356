// Shared foundations: configuration and the safe-coercion boundary for
// third-party feed rows.

pub mod coerce;
pub mod config;

pub use coerce::{find_team_row, safe_float, safe_rank, safe_text, Rank, RankTier, RawRow, UNRANKED};
