// Post-game "what decided this game" text and the Four Factors battle.

use serde::Serialize;

use crate::four_factors::GameFourFactors;
use crate::gap::reaches;

const SHOOTING_GAP: f64 = 5.0;
const REBOUNDING_GAP: f64 = 8.0;
const TURNOVER_GAP: f64 = 5.0;

// ---------------------------------------------------------------------------
// Four Factors battle
// ---------------------------------------------------------------------------

/// Which side of the post-game comparison won a factor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Tracked,
    Opponent,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FactorResult {
    pub winner: Side,
    /// Display name of the winning team.
    pub winner_team: String,
    /// Both values, e.g. `"St. John's 54.2% vs Georgetown 47.0%"`.
    pub detail: String,
}

/// Winner of each factor. A tie goes to the opponent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FactorBattle {
    #[serde(rename = "eFG%")]
    pub efg: FactorResult,
    #[serde(rename = "TO%")]
    pub to: FactorResult,
    #[serde(rename = "OR%")]
    pub or: FactorResult,
    #[serde(rename = "FT Rate")]
    pub ft_rate: FactorResult,
}

impl FactorBattle {
    pub fn results(&self) -> [&FactorResult; 4] {
        [&self.efg, &self.to, &self.or, &self.ft_rate]
    }

    pub fn tracked_wins(&self) -> usize {
        self.results()
            .iter()
            .filter(|r| r.winner == Side::Tracked)
            .count()
    }
}

pub fn factor_battle(
    tracked: &str,
    opp: &str,
    tracked_ff: &GameFourFactors,
    opp_ff: &GameFourFactors,
) -> FactorBattle {
    let result = |tracked_won: bool, detail: String| FactorResult {
        winner: if tracked_won { Side::Tracked } else { Side::Opponent },
        winner_team: if tracked_won { tracked } else { opp }.to_string(),
        detail,
    };
    let pct = |t: f64, o: f64| format!("{tracked} {t:.1}% vs {opp} {o:.1}%");

    FactorBattle {
        efg: result(
            tracked_ff.efg_pct > opp_ff.efg_pct,
            pct(tracked_ff.efg_pct, opp_ff.efg_pct),
        ),
        // Lower turnover rate wins.
        to: result(
            tracked_ff.to_pct < opp_ff.to_pct,
            pct(tracked_ff.to_pct, opp_ff.to_pct),
        ),
        or: result(
            tracked_ff.or_pct > opp_ff.or_pct,
            pct(tracked_ff.or_pct, opp_ff.or_pct),
        ),
        ft_rate: result(
            tracked_ff.ft_rate > opp_ff.ft_rate,
            format!(
                "{tracked} {:.3} vs {opp} {:.3}",
                tracked_ff.ft_rate, opp_ff.ft_rate
            ),
        ),
    }
}

// ---------------------------------------------------------------------------
// Narrative
// ---------------------------------------------------------------------------

/// Build the plain-English summary for the tracked team's game.
pub fn build_narrative(
    tracked: &str,
    opp: &str,
    tracked_score: u32,
    opp_score: u32,
    tracked_ff: &GameFourFactors,
    opp_ff: &GameFourFactors,
) -> String {
    let battle = factor_battle(tracked, opp, tracked_ff, opp_ff);
    let verb = if tracked_score > opp_score { "won" } else { "lost" };
    let margin = tracked_score.abs_diff(opp_score);

    let mut sentences = vec![format!(
        "{tracked} {verb} {tracked_score}-{opp_score} (margin: {margin} pts). \
         {tracked} won {} of 4 Four Factors.",
        battle.tracked_wins()
    )];

    let (t, o) = (tracked_ff, opp_ff);

    let efg_diff = t.efg_pct - o.efg_pct;
    if reaches(efg_diff.abs(), SHOOTING_GAP) {
        let leader = if efg_diff > 0.0 { tracked } else { opp };
        sentences.push(format!(
            "Shooting was the decisive factor: {leader} shot {:.1}% eFG% vs {:.1}%, a {:.1}-point gap.",
            t.efg_pct.max(o.efg_pct),
            t.efg_pct.min(o.efg_pct),
            efg_diff.abs(),
        ));
    }

    let or_diff = t.or_pct - o.or_pct;
    if reaches(or_diff.abs(), REBOUNDING_GAP) {
        let leader = if or_diff > 0.0 { tracked } else { opp };
        sentences.push(format!(
            "Offensive rebounding was a key battleground: {leader} dominated the glass ({:.1}% vs {:.1}%).",
            t.or_pct.max(o.or_pct),
            t.or_pct.min(o.or_pct),
        ));
    }

    let to_diff = t.to_pct - o.to_pct;
    if reaches(to_diff.abs(), TURNOVER_GAP) {
        let sloppier = if to_diff > 0.0 { tracked } else { opp };
        sentences.push(format!(
            "Turnover margin hurt {sloppier}: {:.1}% TO rate vs {:.1}%.",
            t.to_pct.max(o.to_pct),
            t.to_pct.min(o.to_pct),
        ));
    }

    let ppp_diff = t.ppp - o.ppp;
    let edge = if ppp_diff > 0.0 {
        format!("{tracked} advantage")
    } else if ppp_diff < 0.0 {
        format!("{opp} advantage")
    } else {
        "even".to_string()
    };
    sentences.push(format!(
        "Scoring efficiency: {tracked} {:.3} PPP vs {opp} {:.3} PPP ({ppp_diff:+.3}, {edge}).",
        t.ppp, o.ppp,
    ));

    sentences.join(" ")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
