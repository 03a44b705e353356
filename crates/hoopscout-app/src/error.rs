// Errors surfaced by report generation.

use hoopscout_feeds::FeedError;

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error(transparent)]
    Feed(#[from] FeedError),

    #[error("{team} did not play in game {game_id}")]
    TeamNotInGame { team: String, game_id: String },
}
