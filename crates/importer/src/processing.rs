use ranking::{MixedGroupPolicy, PipelineOptions, process_batch};
use serde::Serialize;
use storage::UpsertOutcome;
use storage::models::{EventContext, NewTimingResult};
use tracing::{debug, error, info};
use validator::Validate;

use crate::Result;
use crate::filter::ClubFilter;
use crate::traits::{ResultSink, ResultSource};

/// Everything needed to import one game's results into one event.
#[derive(Debug, Clone, Validate)]
pub struct ImportRequest {
    #[validate(custom(function = "validate_not_blank", message = "Game id is required"))]
    pub game_id: String,

    #[validate(custom(
        function = "validate_not_blank",
        message = "Target event name is required"
    ))]
    pub event_name: String,

    pub event_type: String,

    #[validate(custom(function = "validate_not_blank", message = "Game type is required"))]
    pub game_type: String,

    pub club_filter: ClubFilter,

    pub mixed_group_policy: MixedGroupPolicy,
}

fn validate_not_blank(value: &str) -> std::result::Result<(), validator::ValidationError> {
    if value.trim().is_empty() {
        return Err(validator::ValidationError::new("blank"));
    }
    Ok(())
}

impl ImportRequest {
    pub fn event_context(&self) -> EventContext {
        EventContext {
            event_name: self.event_name.trim().to_string(),
            event_type: self.event_type.trim().to_string(),
            game_type: self.game_type.trim().to_string(),
        }
    }

    pub fn pipeline_options(&self) -> PipelineOptions {
        PipelineOptions {
            mixed_group_policy: self.mixed_group_policy,
        }
    }
}

/// Counters reported after an import run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    /// Results produced by the ranking pipeline.
    pub processed: usize,
    /// Readings dropped for lacking a runner name or scoring group.
    pub skipped: usize,
    /// Results held back by the club filter.
    pub filtered: usize,
    pub created: usize,
    pub updated: usize,
    /// Results whose write failed.
    pub failed: usize,
}

impl ImportSummary {
    pub fn persisted(&self) -> usize {
        self.created + self.updated
    }
}

/// Fetches a game's readings, ranks them and writes the standings out.
pub struct ResultImporter<S, K> {
    source: S,
    sink: K,
}

impl<S: ResultSource, K: ResultSink> ResultImporter<S, K> {
    pub fn new(source: S, sink: K) -> Self {
        Self { source, sink }
    }

    /// Runs one import. A bad request or a failed fetch aborts before anything
    /// is written; a failed write is counted and the run moves on.
    pub async fn run(&self, request: &ImportRequest) -> Result<ImportSummary> {
        request.validate()?;

        let event = request.event_context();
        info!(
            "Importing game {} from {} into '{}' ({})",
            request.game_id,
            self.source.name(),
            event.event_name,
            event.game_type
        );

        let records = self.source.fetch_results(request.game_id.trim()).await?;
        let outcome = process_batch(records, &request.pipeline_options());

        let mut summary = ImportSummary {
            processed: outcome.results.len(),
            skipped: outcome.skipped,
            ..Default::default()
        };

        for result in &outcome.results {
            if !request.club_filter.allows(&result.raw.club_name) {
                debug!(
                    "Filtered out {} ({})",
                    result.raw.runner_name, result.raw.club_name
                );
                summary.filtered += 1;
                continue;
            }

            let record = NewTimingResult::from_processed(result, &event);
            match self.sink.upsert(&record).await {
                Ok(UpsertOutcome::Created) => summary.created += 1,
                Ok(UpsertOutcome::Updated) => summary.updated += 1,
                Err(e) => {
                    summary.failed += 1;
                    error!(
                        "Failed to save result for {} (record {}): {}",
                        record.runner_name, record.external_id, e
                    );
                }
            }
        }

        info!(
            "Import finished: {} processed, {} skipped, {} filtered, {} created, {} updated, {} failed",
            summary.processed,
            summary.skipped,
            summary.filtered,
            summary.created,
            summary.updated,
            summary.failed
        );

        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ImporterError;
    use ranking::{RawResult, Validity};
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct MemorySource {
        records: Vec<RawResult>,
        calls: AtomicUsize,
    }

    impl MemorySource {
        fn new(records: Vec<RawResult>) -> Self {
            Self {
                records,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait::async_trait]
    impl ResultSource for MemorySource {
        async fn fetch_results(&self, _game_id: &str) -> Result<Vec<RawResult>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.records.clone())
        }

        fn name(&self) -> &'static str {
            "Memory"
        }
    }

    struct FailingSource;

    #[async_trait::async_trait]
    impl ResultSource for FailingSource {
        async fn fetch_results(&self, _game_id: &str) -> Result<Vec<RawResult>> {
            Err(ImporterError::ImportError("provider unreachable".to_string()))
        }

        fn name(&self) -> &'static str {
            "Failing"
        }
    }

    #[derive(Default)]
    struct MemorySink {
        rows: Mutex<HashMap<(String, String, String), NewTimingResult>>,
        reject_runner: Option<String>,
    }

    #[async_trait::async_trait]
    impl ResultSink for MemorySink {
        async fn upsert(&self, record: &NewTimingResult) -> Result<UpsertOutcome> {
            if self.reject_runner.as_deref() == Some(record.runner_name.as_str()) {
                return Err(ImporterError::ImportError("write rejected".to_string()));
            }

            let key = (
                record.runner_name.clone(),
                record.event_name.clone(),
                record.game_type.clone(),
            );
            let mut rows = self.rows.lock().unwrap();
            Ok(match rows.insert(key, record.clone()) {
                None => UpsertOutcome::Created,
                Some(_) => UpsertOutcome::Updated,
            })
        }
    }

    fn reading(id: &str, runner: &str, club: &str, time: &str) -> RawResult {
        RawResult {
            external_id: id.to_string(),
            game_id: "g1".to_string(),
            runner_name: runner.to_string(),
            club_name: club.to_string(),
            scoring_group: "M21".to_string(),
            team_id: None,
            elapsed_time_text: Some(time.to_string()),
            validity: Validity::Valid,
            reason_code: None,
            unrecognized_verdict: None,
        }
    }

    fn request() -> ImportRequest {
        ImportRequest {
            game_id: "g1".to_string(),
            event_name: "Spring Cup".to_string(),
            event_type: "race".to_string(),
            game_type: "individual".to_string(),
            club_filter: ClubFilter::Any,
            mixed_group_policy: MixedGroupPolicy::default(),
        }
    }

    fn batch() -> Vec<RawResult> {
        vec![
            reading("1", "Ann", "Harriers", "10:00"),
            reading("2", "Bea", "Striders", "09:00"),
            reading("3", "", "Harriers", "08:00"),
        ]
    }

    #[tokio::test]
    async fn test_import_persists_ranked_results() {
        let importer = ResultImporter::new(MemorySource::new(batch()), MemorySink::default());

        let summary = importer.run(&request()).await.unwrap();

        assert_eq!(summary.processed, 2);
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.created, 2);
        assert_eq!(summary.persisted(), 2);

        let rows = importer.sink.rows.lock().unwrap();
        let bea = &rows[&(
            "Bea".to_string(),
            "Spring Cup".to_string(),
            "individual".to_string(),
        )];
        assert_eq!(bea.position, Some(1));
        assert_eq!(bea.event_type, "race");
    }

    #[tokio::test]
    async fn test_rerun_updates_existing_rows() {
        let importer = ResultImporter::new(MemorySource::new(batch()), MemorySink::default());

        importer.run(&request()).await.unwrap();
        let summary = importer.run(&request()).await.unwrap();

        assert_eq!(summary.created, 0);
        assert_eq!(summary.updated, 2);
    }

    #[tokio::test]
    async fn test_club_filter_holds_back_other_clubs() {
        let importer = ResultImporter::new(MemorySource::new(batch()), MemorySink::default());
        let request = ImportRequest {
            club_filter: ClubFilter::whitelist(["harriers"]),
            ..request()
        };

        let summary = importer.run(&request).await.unwrap();

        assert_eq!(summary.filtered, 1);
        assert_eq!(summary.created, 1);
    }

    #[tokio::test]
    async fn test_failed_write_is_counted_and_run_continues() {
        let sink = MemorySink {
            reject_runner: Some("Bea".to_string()),
            ..Default::default()
        };
        let importer = ResultImporter::new(MemorySource::new(batch()), sink);

        let summary = importer.run(&request()).await.unwrap();

        assert_eq!(summary.failed, 1);
        assert_eq!(summary.created, 1);
    }

    #[tokio::test]
    async fn test_missing_event_name_aborts_before_fetch() {
        let importer = ResultImporter::new(MemorySource::new(batch()), MemorySink::default());
        let request = ImportRequest {
            event_name: "   ".to_string(),
            ..request()
        };

        let err = importer.run(&request).await.unwrap_err();

        assert!(matches!(err, ImporterError::ValidationError(_)));
        assert_eq!(importer.source.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_failed_fetch_aborts_run() {
        let importer = ResultImporter::new(FailingSource, MemorySink::default());

        let err = importer.run(&request()).await.unwrap_err();

        assert!(matches!(err, ImporterError::ImportError(_)));
        assert!(importer.sink.rows.lock().unwrap().is_empty());
    }
}
