use std::time::Duration;

use super::models::ApiResponse;
use crate::error::Result;

pub struct TimingApiClient {
    base_url: String,
    token: Option<String>,
    client: reqwest::Client,
}

impl TimingApiClient {
    pub fn new(base_url: impl Into<String>, token: Option<String>) -> Result<Self> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let client = reqwest::Client::builder()
            .user_agent(concat!("timing-import/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            base_url,
            token,
            client,
        })
    }

    pub async fn fetch_game_results(&self, game_id: &str) -> Result<ApiResponse> {
        let url = format!("{}/games/{}/results", self.base_url, game_id);

        let mut request = self.client.get(&url);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?.error_for_status()?;
        let data = response.json::<ApiResponse>().await?;

        Ok(data)
    }
}
