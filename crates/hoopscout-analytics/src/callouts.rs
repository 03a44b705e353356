// Coaching callouts for a matchup.
//
// A fixed, ordered table of threshold rules compares the two full profiles.
// Per-side rules are evaluated for the home team against the away team and
// then the reverse, so swapping home and away mirrors the output.

use serde::{Serialize, Serializer};

use crate::gap::{exceeds, reaches};
use crate::normalize::FullProfile;

/// Maximum number of callouts in a report.
pub const MAX_CALLOUTS: usize = 8;

// ---------------------------------------------------------------------------
// Priority
// ---------------------------------------------------------------------------

/// Urgency of a callout. Serializes as 1 (critical), 2 or 3 (note).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Priority {
    Critical,
    Important,
    Note,
}

impl Priority {
    pub fn level(&self) -> u8 {
        match self {
            Priority::Critical => 1,
            Priority::Important => 2,
            Priority::Note => 3,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Priority::Critical => "CRITICAL",
            Priority::Important => "IMPORTANT",
            Priority::Note => "NOTE",
        }
    }
}

impl Serialize for Priority {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.level())
    }
}

// ---------------------------------------------------------------------------
// Callout
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Callout {
    pub priority: Priority,
    pub label: String,
    pub detail: String,
}

impl Callout {
    fn new(priority: Priority, label: String, detail: String) -> Self {
        Callout {
            priority,
            label,
            detail,
        }
    }
}

// ---------------------------------------------------------------------------
// Thresholds
// ---------------------------------------------------------------------------

const PACE_GAP: f64 = 3.0;
const GLASS_EDGE: f64 = 3.0;
const SHOOTER_RANK: u32 = 50;
const LEAKY_ARC_RANK: u32 = 200;
const BALL_SECURITY_EDGE: f64 = 3.0;
const FT_RATE_FLOOR: f64 = 0.40;
const FT_RATE_RANK: u32 = 50;
const EFFICIENCY_GAP: f64 = 8.0;
const EXPERIENCE_EDGE: f64 = 0.5;
const ASSIST_RATE_FLOOR: f64 = 0.60;
const ASSIST_RANK: u32 = 50;

// ---------------------------------------------------------------------------
// Rule table
// ---------------------------------------------------------------------------

type RuleFn = fn(&FullProfile, &FullProfile) -> Option<Callout>;

enum Rule {
    /// Evaluated once over (home, away); the rule itself names the sides.
    Matchup(RuleFn),
    /// Evaluated for (home, away) and then (away, home).
    EachSide(RuleFn),
}

const RULES: &[Rule] = &[
    Rule::Matchup(pace_mismatch),
    Rule::EachSide(glass_edge),
    Rule::EachSide(three_point_attack),
    Rule::EachSide(ball_security),
    Rule::EachSide(free_throw_pressure),
    Rule::Matchup(efficiency_gap),
    Rule::EachSide(experience_edge),
    Rule::EachSide(ball_movement),
];

/// Evaluate every rule, order by priority (stable within a priority), and
/// keep at most [`MAX_CALLOUTS`].
pub fn build_callouts(home: &FullProfile, away: &FullProfile) -> Vec<Callout> {
    let mut callouts: Vec<Callout> = Vec::new();
    for rule in RULES {
        match rule {
            Rule::Matchup(f) => callouts.extend(f(home, away)),
            Rule::EachSide(f) => {
                callouts.extend(f(home, away));
                callouts.extend(f(away, home));
            }
        }
    }
    callouts.sort_by_key(|c| c.priority);
    callouts.truncate(MAX_CALLOUTS);
    callouts
}

fn pace_mismatch(a: &FullProfile, b: &FullProfile) -> Option<Callout> {
    let (ta, tb) = (a.overview.tempo, b.overview.tempo);
    let gap = (ta - tb).abs();
    if !reaches(gap, PACE_GAP) {
        return None;
    }
    let (faster, slower) = if ta > tb { (a, b) } else { (b, a) };
    Some(Callout::new(
        Priority::Critical,
        format!("{} Pace Edge", faster.team()),
        format!(
            "{} plays {:.1} poss/40min faster than {} ({:.1} vs {:.1}). \
             The faster team wants transition chances; the slower team wants long half-court possessions.",
            faster.team(),
            gap,
            slower.team(),
            faster.overview.tempo,
            slower.overview.tempo,
        ),
    ))
}

fn glass_edge(side: &FullProfile, opp: &FullProfile) -> Option<Callout> {
    let or = side.four_factors.or_pct;
    let allowed = opp.four_factors.d_or;
    if !exceeds(or - allowed, GLASS_EDGE) {
        return None;
    }
    Some(Callout::new(
        Priority::Critical,
        format!("{} Offensive Glass Edge", side.team()),
        format!(
            "{} OR% {:.1}% vs {} OR% allowed {:.1}%. Second-chance points are there for {}.",
            side.team(),
            or,
            opp.team(),
            allowed,
            side.team(),
        ),
    ))
}

fn three_point_attack(side: &FullProfile, opp: &FullProfile) -> Option<Callout> {
    let shooter_rank = side.shooting.rank_fg3;
    let arc_rank = opp.four_factors.rank_defg;
    if !(shooter_rank.within(SHOOTER_RANK) && arc_rank.at_least(LEAKY_ARC_RANK)) {
        return None;
    }
    Some(Callout::new(
        Priority::Critical,
        format!("{} 3PT Attack", side.team()),
        format!(
            "{} shoots {:.1}% from 3 ({} nationally). {} is {} in eFG% allowed. \
             Expect catch-and-shoot looks from the perimeter.",
            side.team(),
            side.shooting.fg3_pct,
            shooter_rank,
            opp.team(),
            arc_rank,
        ),
    ))
}

fn ball_security(side: &FullProfile, opp: &FullProfile) -> Option<Callout> {
    let to = side.four_factors.to_pct;
    let forced = opp.four_factors.d_to;
    if !exceeds(forced - to, BALL_SECURITY_EDGE) {
        return None;
    }
    Some(Callout::new(
        Priority::Important,
        format!("{} Ball Security", side.team()),
        format!(
            "{} TO% {:.1}% vs {} forcing turnovers on {:.1}% of possessions. \
             {} can beat the pressure by protecting the ball in the half-court.",
            side.team(),
            to,
            opp.team(),
            forced,
            side.team(),
        ),
    ))
}

fn free_throw_pressure(side: &FullProfile, _opp: &FullProfile) -> Option<Callout> {
    let rate = side.four_factors.ft_rate;
    let rank = side.four_factors.rank_ft;
    if !(reaches(rate, FT_RATE_FLOOR) && rank.within(FT_RATE_RANK)) {
        return None;
    }
    Some(Callout::new(
        Priority::Important,
        format!("{} Attacks the Paint", side.team()),
        format!(
            "{} gets to the line at a {:.2} FT rate ({} nationally). \
             Aggressive drives and post-ups will produce free throws.",
            side.team(),
            rate,
            rank,
        ),
    ))
}

fn efficiency_gap(a: &FullProfile, b: &FullProfile) -> Option<Callout> {
    let diff = a.overview.adj_em - b.overview.adj_em;
    if !reaches(diff.abs(), EFFICIENCY_GAP) {
        return None;
    }
    let (better, worse) = if diff > 0.0 { (a, b) } else { (b, a) };
    Some(Callout::new(
        Priority::Important,
        format!("{} Efficiency Edge", better.team()),
        format!(
            "{} has a +{:.1} AdjEM advantage over {} ({:.1} vs {:.1}). \
             The stronger team should control pace and avoid a shoot-out.",
            better.team(),
            diff.abs(),
            worse.team(),
            better.overview.adj_em,
            worse.overview.adj_em,
        ),
    ))
}

fn experience_edge(side: &FullProfile, opp: &FullProfile) -> Option<Callout> {
    let exp = side.height.experience;
    let opp_exp = opp.height.experience;
    if !exceeds(exp - opp_exp, EXPERIENCE_EDGE) {
        return None;
    }
    Some(Callout::new(
        Priority::Note,
        format!("{} Experience Edge", side.team()),
        format!(
            "{} experience rating {:.2} vs {} {:.2}. Expect composure in close late-game situations.",
            side.team(),
            exp,
            opp.team(),
            opp_exp,
        ),
    ))
}

fn ball_movement(side: &FullProfile, _opp: &FullProfile) -> Option<Callout> {
    let rate = side.shooting.assist_rate;
    let rank = side.shooting.rank_assist;
    if !(reaches(rate, ASSIST_RATE_FLOOR) && rank.within(ASSIST_RANK)) {
        return None;
    }
    Some(Callout::new(
        Priority::Note,
        format!("{} Ball Movement", side.team()),
        format!(
            "{} assist rate {:.2} ({} nationally). The offense runs through passing; \
             pressure the ball handler.",
            side.team(),
            rate,
            rank,
        ),
    ))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
