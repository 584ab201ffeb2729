use chrono::{DateTime, Utc};
use ranking::{ProcessedResult, RaceTime};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::EventContext;

/// A persisted standing, one row per (runner, event, game type).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TimingResult {
    pub result_id: Uuid,
    pub runner_name: String,
    pub event_name: String,
    pub event_type: String,
    pub game_type: String,
    pub game_id: String,
    pub external_id: String,
    pub club_name: String,
    pub scoring_group: String,
    pub team_id: Option<i64>,
    pub elapsed_time_text: Option<String>,
    pub validity: String,
    pub reason_code: Option<String>,
    pub ranking_time_ms: Option<i64>,
    pub position: Option<i32>,
    pub resolved_validity: bool,
    pub display_result: String,
    pub relay_personal_time_ms: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A processed result merged with the caller's event context, ready to upsert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewTimingResult {
    pub runner_name: String,
    pub event_name: String,
    pub event_type: String,
    pub game_type: String,
    pub game_id: String,
    pub external_id: String,
    pub club_name: String,
    pub scoring_group: String,
    pub team_id: Option<i64>,
    pub elapsed_time_text: Option<String>,
    pub validity: String,
    pub reason_code: Option<String>,
    pub ranking_time_ms: Option<i64>,
    pub position: Option<i32>,
    pub resolved_validity: bool,
    pub display_result: String,
    pub relay_personal_time_ms: Option<i64>,
}

impl NewTimingResult {
    pub fn from_processed(result: &ProcessedResult, event: &EventContext) -> Self {
        let raw = &result.raw;

        Self {
            runner_name: raw.runner_name.clone(),
            event_name: event.event_name.clone(),
            event_type: event.event_type.clone(),
            game_type: event.game_type.clone(),
            game_id: raw.game_id.clone(),
            external_id: raw.external_id.clone(),
            club_name: raw.club_name.clone(),
            scoring_group: raw.scoring_group.clone(),
            team_id: raw.team(),
            elapsed_time_text: raw.elapsed_time_text.clone(),
            validity: raw.validity.as_str().to_string(),
            reason_code: raw.reason_code.clone(),
            ranking_time_ms: to_millis_column(result.ranking_time_ms),
            position: result.position.and_then(|p| i32::try_from(p).ok()),
            resolved_validity: result.resolved_validity,
            display_result: result.display_result.clone(),
            relay_personal_time_ms: result.relay_personal_time_ms.and_then(to_millis_column),
        }
    }
}

/// The sentinel is stored as NULL.
fn to_millis_column(time: RaceTime) -> Option<i64> {
    time.millis().and_then(|ms| i64::try_from(ms).ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ranking::{RawResult, Validity};

    fn processed(team_id: Option<i64>) -> ProcessedResult {
        ProcessedResult {
            raw: RawResult {
                external_id: "dev-7".to_string(),
                game_id: "match-42".to_string(),
                runner_name: "Ann Lee".to_string(),
                club_name: "Harriers".to_string(),
                scoring_group: "W21".to_string(),
                team_id,
                elapsed_time_text: Some("05:00".to_string()),
                validity: Validity::Valid,
                reason_code: None,
                unrecognized_verdict: None,
            },
            ranking_time_ms: RaceTime::Finished(660_000),
            position: Some(3),
            resolved_validity: true,
            display_result: "11:00.000".to_string(),
            relay_personal_time_ms: team_id.map(|_| RaceTime::Finished(300_000)),
        }
    }

    fn event() -> EventContext {
        EventContext {
            event_name: "Spring Relays".to_string(),
            event_type: "relay".to_string(),
            game_type: "sprint".to_string(),
        }
    }

    #[test]
    fn test_from_processed_merges_event_context() {
        let record = NewTimingResult::from_processed(&processed(Some(4)), &event());

        assert_eq!(record.runner_name, "Ann Lee");
        assert_eq!(record.event_name, "Spring Relays");
        assert_eq!(record.game_type, "sprint");
        assert_eq!(record.validity, "valid");
        assert_eq!(record.team_id, Some(4));
        assert_eq!(record.ranking_time_ms, Some(660_000));
        assert_eq!(record.position, Some(3));
        assert_eq!(record.relay_personal_time_ms, Some(300_000));
    }

    #[test]
    fn test_sentinel_and_no_team_are_null() {
        let mut result = processed(Some(0));
        result.ranking_time_ms = RaceTime::Unrankable;
        result.position = None;
        result.relay_personal_time_ms = Some(RaceTime::Unrankable);

        let record = NewTimingResult::from_processed(&result, &event());

        assert_eq!(record.team_id, None);
        assert_eq!(record.ranking_time_ms, None);
        assert_eq!(record.position, None);
        assert_eq!(record.relay_personal_time_ms, None);
    }
}
