// Safe-coercion boundary between third-party feed rows and typed records.
//
// Every field read from a provider goes through `RawRow` accessors. They are
// total: a missing key, a null, or a non-numeric string degrades to a
// default instead of failing.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Rank value meaning "unknown / unranked". Always loses rank comparisons.
pub const UNRANKED: u32 = 999;

// ---------------------------------------------------------------------------
// Scalar coercion
// ---------------------------------------------------------------------------

/// Parse a JSON scalar as `f64`, returning 0.0 for anything that is not a
/// finite number or a string holding one.
pub fn safe_float(value: Option<&Value>) -> f64 {
    let parsed = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|v| v.is_finite()).unwrap_or(0.0)
}

/// Parse a JSON scalar as a national rank. Non-positive or unparseable
/// values become [`UNRANKED`].
pub fn safe_rank(value: Option<&Value>) -> Rank {
    let raw = safe_float(value).trunc();
    if raw >= 1.0 && raw < f64::from(u32::MAX) {
        Rank(raw as u32)
    } else {
        Rank::unranked()
    }
}

/// Render a JSON scalar as display text. Null and missing become "".
pub fn safe_text(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}

// ---------------------------------------------------------------------------
// Rank
// ---------------------------------------------------------------------------

/// A national rank where 1 is best. Serializes as a bare integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Rank(u32);

/// Display tier of a national rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankTier {
    Elite,
    Strong,
    Average,
    Weak,
}

impl RankTier {
    pub fn label(&self) -> &'static str {
        match self {
            RankTier::Elite => "elite",
            RankTier::Strong => "strong",
            RankTier::Average => "average",
            RankTier::Weak => "weak",
        }
    }
}

impl Rank {
    /// Build a rank, mapping 0 to [`UNRANKED`].
    pub fn new(value: u32) -> Self {
        if value == 0 {
            Rank::unranked()
        } else {
            Rank(value)
        }
    }

    pub fn unranked() -> Self {
        Rank(UNRANKED)
    }

    pub fn value(&self) -> u32 {
        self.0
    }

    pub fn is_unranked(&self) -> bool {
        self.0 >= UNRANKED
    }

    /// Ranked `n`th or better (rank ≤ n).
    pub fn within(&self, n: u32) -> bool {
        self.0 <= n
    }

    /// Ranked `n`th or worse (rank ≥ n). Unranked always qualifies.
    pub fn at_least(&self, n: u32) -> bool {
        self.0 >= n
    }

    /// True when `self` is strictly better (numerically lower) than `other`.
    pub fn is_better_than(&self, other: Rank) -> bool {
        self.better_cmp(other) == Ordering::Less
    }

    /// Ordering where `Less` means better.
    pub fn better_cmp(&self, other: Rank) -> Ordering {
        self.0.cmp(&other.0)
    }

    /// National percentile on a 0–100 scale where 100 is best:
    /// `round((1 - rank / total) * 100)` clamped to the scale.
    pub fn percentile(&self, total: usize) -> u32 {
        if total == 0 {
            return 0;
        }
        let pct = ((1.0 - f64::from(self.0) / total as f64) * 100.0).round();
        pct.clamp(0.0, 100.0) as u32
    }

    pub fn tier(&self) -> RankTier {
        match self.0 {
            0..=25 => RankTier::Elite,
            26..=75 => RankTier::Strong,
            76..=150 => RankTier::Average,
            _ => RankTier::Weak,
        }
    }
}

impl Default for Rank {
    fn default() -> Self {
        Rank::unranked()
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_unranked() {
            write!(f, "NR")
        } else {
            write!(f, "#{}", self.0)
        }
    }
}

// ---------------------------------------------------------------------------
// RawRow
// ---------------------------------------------------------------------------

/// One heterogeneous provider row: field name to arbitrary JSON scalar.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawRow(Map<String, Value>);

impl RawRow {
    pub fn new() -> Self {
        RawRow(Map::new())
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn float(&self, key: &str) -> f64 {
        safe_float(self.get(key))
    }

    pub fn rank(&self, key: &str) -> Rank {
        safe_rank(self.get(key))
    }

    pub fn text(&self, key: &str) -> String {
        safe_text(self.get(key))
    }

    /// First key that holds a non-zero number, in order, else 0.0.
    pub fn float_or(&self, keys: &[&str]) -> f64 {
        keys.iter()
            .map(|k| self.float(k))
            .find(|v| *v != 0.0)
            .unwrap_or(0.0)
    }

    /// Case-insensitive comparison of a text field against `needle`.
    pub fn text_eq_ignore_case(&self, key: &str, needle: &str) -> bool {
        self.text(key).to_lowercase() == needle.trim().to_lowercase()
    }

    /// Case-insensitive substring test of `needle` within a text field.
    pub fn text_contains_ignore_case(&self, key: &str, needle: &str) -> bool {
        let needle = needle.trim().to_lowercase();
        !needle.is_empty() && self.text(key).to_lowercase().contains(&needle)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }
}

impl From<Map<String, Value>> for RawRow {
    fn from(map: Map<String, Value>) -> Self {
        RawRow(map)
    }
}

impl FromIterator<(String, Value)> for RawRow {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        RawRow(iter.into_iter().collect())
    }
}

/// Find the row for `team` by the `TeamName` field: an exact
/// case-insensitive match wins, otherwise the first row containing the name.
/// Returns an empty row when nothing matches.
pub fn find_team_row<'a>(rows: &'a [RawRow], team: &str) -> std::borrow::Cow<'a, RawRow> {
    let exact = rows.iter().find(|r| r.text_eq_ignore_case("TeamName", team));
    let found = exact.or_else(|| {
        rows.iter()
            .find(|r| r.text_contains_ignore_case("TeamName", team))
    });
    match found {
        Some(row) => std::borrow::Cow::Borrowed(row),
        None => std::borrow::Cow::Owned(RawRow::new()),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(value: Value) -> RawRow {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn safe_float_accepts_numbers_and_numeric_strings() {
        assert_eq!(safe_float(Some(&json!(12.5))), 12.5);
        assert_eq!(safe_float(Some(&json!(7))), 7.0);
        assert_eq!(safe_float(Some(&json!(" 54.2 "))), 54.2);
        assert_eq!(safe_float(Some(&json!("-3"))), -3.0);
    }

    #[test]
    fn safe_float_defaults_to_zero() {
        assert_eq!(safe_float(None), 0.0);
        assert_eq!(safe_float(Some(&Value::Null)), 0.0);
        assert_eq!(safe_float(Some(&json!("n/a"))), 0.0);
        assert_eq!(safe_float(Some(&json!(""))), 0.0);
        assert_eq!(safe_float(Some(&json!(true))), 0.0);
        assert_eq!(safe_float(Some(&json!("NaN"))), 0.0);
        assert_eq!(safe_float(Some(&json!("inf"))), 0.0);
        assert_eq!(safe_float(Some(&json!([1, 2]))), 0.0);
    }

    #[test]
    fn safe_rank_parses_and_truncates() {
        assert_eq!(safe_rank(Some(&json!(17))), Rank::new(17));
        assert_eq!(safe_rank(Some(&json!("42"))), Rank::new(42));
        assert_eq!(safe_rank(Some(&json!(3.9))), Rank::new(3));
    }

    #[test]
    fn safe_rank_defaults_to_unranked() {
        for v in [json!(null), json!("--"), json!(0), json!(-5), json!("")] {
            assert_eq!(safe_rank(Some(&v)), Rank::unranked(), "input {v}");
        }
        assert_eq!(safe_rank(None).value(), UNRANKED);
    }

    #[test]
    fn unranked_always_compares_worse() {
        let unranked = Rank::unranked();
        for r in [1, 50, 200, 362] {
            let ranked = Rank::new(r);
            assert!(ranked.is_better_than(unranked));
            assert!(!unranked.is_better_than(ranked));
        }
        assert!(!unranked.within(362));
        assert!(unranked.at_least(200));
        assert!(!unranked.is_better_than(unranked));
    }

    #[test]
    fn percentile_scale() {
        assert_eq!(Rank::new(1).percentile(364), 100);
        assert_eq!(Rank::new(182).percentile(364), 50);
        assert_eq!(Rank::new(364).percentile(364), 0);
        assert_eq!(Rank::unranked().percentile(364), 0);
        assert_eq!(Rank::new(10).percentile(0), 0);
    }

    #[test]
    fn rank_tiers_and_display() {
        assert_eq!(Rank::new(25).tier(), RankTier::Elite);
        assert_eq!(Rank::new(26).tier(), RankTier::Strong);
        assert_eq!(Rank::new(150).tier(), RankTier::Average);
        assert_eq!(Rank::new(151).tier(), RankTier::Weak);
        assert_eq!(Rank::new(151).tier().label(), "weak");
        assert_eq!(Rank::new(8).to_string(), "#8");
        assert_eq!(Rank::unranked().to_string(), "NR");
    }

    #[test]
    fn rank_serializes_as_integer() {
        let v = serde_json::to_value(Rank::new(12)).unwrap();
        assert_eq!(v, json!(12));
        let back: Rank = serde_json::from_value(json!(999)).unwrap();
        assert!(back.is_unranked());
    }

    #[test]
    fn raw_row_accessors() {
        let r = row(json!({
            "TeamName": "St. John's",
            "AdjEM": "24.3",
            "RankAdjEM": 11,
            "Coach": null,
            "turnovers": 0,
            "totalTurnovers": "13"
        }));
        assert_eq!(r.float("AdjEM"), 24.3);
        assert_eq!(r.rank("RankAdjEM"), Rank::new(11));
        assert_eq!(r.rank("Missing"), Rank::unranked());
        assert_eq!(r.text("Coach"), "");
        assert_eq!(r.text("RankAdjEM"), "11");
        assert_eq!(r.float_or(&["turnovers", "totalTurnovers"]), 13.0);
        assert_eq!(r.float_or(&["nope", "also_nope"]), 0.0);
    }

    #[test]
    fn find_team_row_prefers_exact_match() {
        let rows = vec![
            row(json!({"TeamName": "Texas A&M", "AdjEM": 1})),
            row(json!({"TeamName": "Texas", "AdjEM": 2})),
        ];
        assert_eq!(find_team_row(&rows, "texas").float("AdjEM"), 2.0);
        assert_eq!(find_team_row(&rows, "A&M").float("AdjEM"), 1.0);
    }

    #[test]
    fn find_team_row_missing_yields_empty_row() {
        let rows = vec![row(json!({"TeamName": "Villanova"}))];
        let found = find_team_row(&rows, "Creighton");
        assert!(found.is_empty());
        assert_eq!(found.float("AdjEM"), 0.0);
        assert!(find_team_row(&rows, "").is_empty());
    }
}
