use serde::Serialize;
use sqlx::PgPool;

use crate::error::Result;
use crate::models::{NewTimingResult, TimingResult};

/// What an upsert did to the stored row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UpsertOutcome {
    Created,
    Updated,
}

/// Repository for timing result rows
pub struct TimingResultRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> TimingResultRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Inserts or replaces the row keyed by (runner name, event name, game type).
    pub async fn upsert(&self, result: &NewTimingResult) -> Result<UpsertOutcome> {
        // xmax is 0 only for rows written by a fresh INSERT.
        let inserted = sqlx::query_scalar::<_, bool>(
            r#"
            INSERT INTO timing_results (
                runner_name, event_name, event_type, game_type, game_id, external_id,
                club_name, scoring_group, team_id, elapsed_time_text, validity, reason_code,
                ranking_time_ms, position, resolved_validity, display_result,
                relay_personal_time_ms
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
            ON CONFLICT (runner_name, event_name, game_type)
            DO UPDATE SET
                event_type = EXCLUDED.event_type,
                game_id = EXCLUDED.game_id,
                external_id = EXCLUDED.external_id,
                club_name = EXCLUDED.club_name,
                scoring_group = EXCLUDED.scoring_group,
                team_id = EXCLUDED.team_id,
                elapsed_time_text = EXCLUDED.elapsed_time_text,
                validity = EXCLUDED.validity,
                reason_code = EXCLUDED.reason_code,
                ranking_time_ms = EXCLUDED.ranking_time_ms,
                position = EXCLUDED.position,
                resolved_validity = EXCLUDED.resolved_validity,
                display_result = EXCLUDED.display_result,
                relay_personal_time_ms = EXCLUDED.relay_personal_time_ms,
                updated_at = CURRENT_TIMESTAMP
            RETURNING (xmax = 0) AS inserted
            "#,
        )
        .bind(&result.runner_name)
        .bind(&result.event_name)
        .bind(&result.event_type)
        .bind(&result.game_type)
        .bind(&result.game_id)
        .bind(&result.external_id)
        .bind(&result.club_name)
        .bind(&result.scoring_group)
        .bind(result.team_id)
        .bind(&result.elapsed_time_text)
        .bind(&result.validity)
        .bind(&result.reason_code)
        .bind(result.ranking_time_ms)
        .bind(result.position)
        .bind(result.resolved_validity)
        .bind(&result.display_result)
        .bind(result.relay_personal_time_ms)
        .fetch_one(self.pool)
        .await?;

        Ok(if inserted {
            UpsertOutcome::Created
        } else {
            UpsertOutcome::Updated
        })
    }

    /// Standings for one event, ranked entries first within each scoring group
    pub async fn list_for_event(
        &self,
        event_name: &str,
        game_type: &str,
    ) -> Result<Vec<TimingResult>> {
        let results = sqlx::query_as::<_, TimingResult>(
            r#"
            SELECT * FROM timing_results
            WHERE event_name = $1 AND game_type = $2
            ORDER BY scoring_group, position ASC NULLS LAST, ranking_time_ms ASC NULLS LAST, runner_name
            "#,
        )
        .bind(event_name)
        .bind(game_type)
        .fetch_all(self.pool)
        .await?;

        Ok(results)
    }
}
