// External data feeds: the ratings provider (live API or CSV snapshots), the
// game-event provider and the shared TTL response cache.

pub mod cache;
pub mod error;
pub mod games;
pub mod ratings;
pub mod snapshot;

pub use cache::{NoCache, ResponseCache, TtlCache};
pub use error::{FeedError, FeedResult};
pub use games::{
    BoxScore, BoxScoreSide, EspnClient, GameFeed, HomeAway, ScheduledGame, ScoreboardGame, TeamRef,
};
pub use ratings::{find_team_id, Dataset, KenPomClient, RatingsProvider, RatingsQuery};
pub use snapshot::CsvSnapshotProvider;
