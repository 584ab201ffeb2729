use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ApiResponse {
    pub game: Game,
    pub results: Vec<DeviceRecord>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Game {
    pub id: ExternalRef,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DeviceRecord {
    pub id: ExternalRef,
    #[serde(rename = "runnerName", default)]
    pub runner_name: Option<String>,
    #[serde(rename = "clubName", default)]
    pub club_name: Option<String>,
    #[serde(rename = "group", default)]
    pub scoring_group: Option<String>,
    #[serde(rename = "teamId", default)]
    pub team_id: Option<ExternalRef>,
    #[serde(rename = "elapsedTime", default)]
    pub elapsed_time: Option<String>,
    #[serde(default)]
    pub verdict: Option<Verdict>,
    #[serde(rename = "reasonCode", default)]
    pub reason_code: Option<String>,
}

/// Identifiers arrive as numbers or strings depending on the device firmware.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum ExternalRef {
    Number(i64),
    Text(String),
}

impl fmt::Display for ExternalRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{}", n),
            Self::Text(s) => write!(f, "{}", s.trim()),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum Verdict {
    Flag(bool),
    Code(i64),
    Text(String),
}
