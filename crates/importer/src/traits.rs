use ranking::RawResult;
use storage::UpsertOutcome;
use storage::models::NewTimingResult;

use crate::Result;

/// Where raw device readings for a game come from.
#[async_trait::async_trait]
pub trait ResultSource: Send + Sync {
    async fn fetch_results(&self, game_id: &str) -> Result<Vec<RawResult>>;

    fn name(&self) -> &'static str;
}

/// Where processed standings go.
#[async_trait::async_trait]
pub trait ResultSink: Send + Sync {
    async fn upsert(&self, record: &NewTimingResult) -> Result<UpsertOutcome>;
}
