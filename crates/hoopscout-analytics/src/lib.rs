// Derived-metrics engine. Pure functions over normalized provider rows; no
// I/O and no logging.

pub mod callouts;
pub mod four_factors;
pub mod gap;
pub mod grading;
pub mod league;
pub mod narrative;
pub mod normalize;
pub mod prediction;
pub mod trend;

pub use callouts::{build_callouts, Callout, Priority};
pub use four_factors::{compute_game_four_factors, BoxScoreTeamTotals, GameFourFactors};
pub use grading::{grade_players, LetterGrade, PlayerGameGrade};
pub use narrative::{build_narrative, factor_battle, FactorBattle, FactorResult, Side};
pub use normalize::{
    FullProfile, HeightExperience, SeasonFourFactors, SeasonTables, ShootingProfile, TeamOverview,
};
pub use prediction::{find_prediction, WinProbabilityPrediction};
