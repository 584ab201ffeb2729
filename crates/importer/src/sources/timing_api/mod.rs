mod client;
mod models;
mod transformer;

pub use client::TimingApiClient;
pub use models::*;
pub use transformer::TimingApiTransformer;

use crate::{Result, traits::ResultSource};
use ranking::RawResult;
use tracing::info;

/// Pulls device readings for one game from the timing provider's HTTP API.
pub struct TimingApiSource {
    client: TimingApiClient,
}

impl TimingApiSource {
    pub fn new(client: TimingApiClient) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl ResultSource for TimingApiSource {
    async fn fetch_results(&self, game_id: &str) -> Result<Vec<RawResult>> {
        info!("Fetching timing results for game {}", game_id);
        let api_response = self.client.fetch_game_results(game_id).await?;

        if let Some(status) = &api_response.game.status {
            info!("Game status: {}", status);
        }

        let records = TimingApiTransformer.to_raw_results(api_response);
        info!("Received {} device records", records.len());

        Ok(records)
    }

    fn name(&self) -> &'static str {
        "TimingApi"
    }
}
