use storage::models::NewTimingResult;
use storage::{Database, TimingResultRepository, UpsertOutcome};

use crate::Result;
use crate::traits::ResultSink;

/// Persists standings into the `timing_results` table.
pub struct PostgresSink {
    db: Database,
}

impl PostgresSink {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait::async_trait]
impl ResultSink for PostgresSink {
    async fn upsert(&self, record: &NewTimingResult) -> Result<UpsertOutcome> {
        let repo = TimingResultRepository::new(self.db.pool());
        Ok(repo.upsert(record).await?)
    }
}
