//! Batch entry point: dedup, classify, aggregate and rank every scoring group.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::classify::{classify, split_by_scoring_group};
use crate::dedup::deduplicate;
use crate::models::{ProcessedResult, RawResult};
use crate::ranker::{Placed, Rankable, rank};
use crate::team::{TeamResult, aggregate};
use crate::time::{RaceTime, format};

/// How individual entries are ranked in a scoring group that also has relay
/// teams.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MixedGroupPolicy {
    /// Individuals compete in the same pool as team totals.
    #[default]
    SharedPool,
    /// Teams and individuals are ranked in two pools within the group.
    SeparatePools,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineOptions {
    pub mixed_group_policy: MixedGroupPolicy,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchOutcome {
    pub results: Vec<ProcessedResult>,
    /// Records dropped for lacking a runner name or scoring group.
    pub skipped: usize,
}

/// Consolidates and ranks one complete batch of device readings.
pub fn process_batch(records: Vec<RawResult>, options: &PipelineOptions) -> BatchOutcome {
    let received = records.len();
    let (keyed, unkeyed): (Vec<RawResult>, Vec<RawResult>) =
        records.into_iter().partition(RawResult::has_identity);

    for record in &unkeyed {
        warn!(
            external_id = %record.external_id,
            "Skipping timing record without runner name or scoring group"
        );
    }

    let mut results = Vec::with_capacity(keyed.len());
    for (scoring_group, entries) in split_by_scoring_group(keyed) {
        let group_results = process_group(entries, options);
        debug!(
            group = %scoring_group,
            entries = group_results.len(),
            ranked = group_results.iter().filter(|r| r.is_ranked()).count(),
            "Ranked scoring group"
        );
        results.extend(group_results);
    }

    info!(
        received,
        processed = results.len(),
        skipped = unkeyed.len(),
        "Processed timing batch"
    );

    BatchOutcome {
        results,
        skipped: unkeyed.len(),
    }
}

fn process_group(entries: Vec<RawResult>, options: &PipelineOptions) -> Vec<ProcessedResult> {
    let participation = classify(deduplicate(entries));
    let has_teams = participation.has_teams();
    let individuals: Vec<Unit> = participation
        .individuals
        .into_iter()
        .map(Unit::individual)
        .collect();

    if !has_teams {
        return into_results(rank(individuals));
    }

    let teams: Vec<Unit> = participation
        .teams
        .into_iter()
        .map(|bucket| Unit::Team(aggregate(bucket)))
        .collect();

    match options.mixed_group_policy {
        MixedGroupPolicy::SharedPool => {
            let mut pool = teams;
            pool.extend(individuals);
            into_results(rank(pool))
        }
        MixedGroupPolicy::SeparatePools => {
            let mut results = into_results(rank(teams));
            results.extend(into_results(rank(individuals)));
            results
        }
    }
}

/// One slot in a standings pool: a lone runner or a whole relay team.
#[derive(Debug)]
enum Unit {
    Individual { entry: RawResult, time: RaceTime },
    Team(TeamResult),
}

impl Unit {
    fn individual(entry: RawResult) -> Self {
        let time = entry.elapsed_time();
        Self::Individual { entry, time }
    }
}

impl Rankable for Unit {
    fn ranking_time(&self) -> RaceTime {
        match self {
            Self::Individual { time, .. } => *time,
            Self::Team(team) => team.total,
        }
    }

    fn is_eligible(&self) -> bool {
        match self {
            Self::Individual { entry, .. } => entry.validity.is_valid(),
            Self::Team(team) => team.valid,
        }
    }
}

fn into_results(placed: Vec<Placed<Unit>>) -> Vec<ProcessedResult> {
    let mut results = Vec::with_capacity(placed.len());

    for Placed { entry, position } in placed {
        match entry {
            Unit::Individual { entry, time } => results.push(ProcessedResult {
                resolved_validity: entry.validity.is_valid(),
                raw: entry,
                ranking_time_ms: time,
                position,
                display_result: format(time),
                relay_personal_time_ms: None,
            }),
            Unit::Team(team) => {
                let display_result = format(team.total);
                results.extend(team.members.into_iter().map(|(member, own_time)| {
                    ProcessedResult {
                        raw: member,
                        ranking_time_ms: team.total,
                        position,
                        resolved_validity: team.valid,
                        display_result: display_result.clone(),
                        relay_personal_time_ms: Some(own_time),
                    }
                }));
            }
        }
    }

    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Validity;

    fn record(
        runner: &str,
        group: &str,
        team_id: Option<i64>,
        time: Option<&str>,
        validity: Validity,
    ) -> RawResult {
        RawResult {
            external_id: format!("{runner}-{group}"),
            game_id: "g1".to_string(),
            runner_name: runner.to_string(),
            club_name: "Harriers".to_string(),
            scoring_group: group.to_string(),
            team_id,
            elapsed_time_text: time.map(str::to_string),
            validity,
            reason_code: None,
            unrecognized_verdict: None,
        }
    }

    fn positions(outcome: &BatchOutcome) -> Vec<(&str, Option<u32>)> {
        outcome
            .results
            .iter()
            .map(|r| (r.raw.runner_name.as_str(), r.position))
            .collect()
    }

    #[test]
    fn test_individual_group_ranks_only_valid_entries() {
        let outcome = process_batch(
            vec![
                record("a", "M21", None, Some("10:00"), Validity::Unknown),
                record("b", "M21", None, Some("11:00"), Validity::Valid),
                record("c", "M21", None, Some("09:00"), Validity::Invalid),
                record("d", "M21", None, Some("12:00"), Validity::Valid),
            ],
            &PipelineOptions::default(),
        );

        assert_eq!(
            positions(&outcome),
            vec![("b", Some(1)), ("d", Some(2)), ("a", None), ("c", None)]
        );
        assert!(!outcome.results[2].resolved_validity);
        assert_eq!(outcome.results[3].display_result, "09:00.000");
    }

    #[test]
    fn test_groups_are_ranked_independently_in_first_seen_order() {
        let outcome = process_batch(
            vec![
                record("w1", "W21", None, Some("20:00"), Validity::Valid),
                record("m1", "M21", None, Some("15:00"), Validity::Valid),
                record("w2", "W21", None, Some("18:00"), Validity::Valid),
            ],
            &PipelineOptions::default(),
        );

        assert_eq!(
            positions(&outcome),
            vec![("w2", Some(1)), ("w1", Some(2)), ("m1", Some(1))]
        );
    }

    #[test]
    fn test_records_without_identity_are_skipped() {
        let outcome = process_batch(
            vec![
                record("", "M21", None, Some("10:00"), Validity::Valid),
                record("a", "  ", None, Some("10:00"), Validity::Valid),
                record("b", "M21", None, Some("10:00"), Validity::Valid),
            ],
            &PipelineOptions::default(),
        );

        assert_eq!(outcome.skipped, 2);
        assert_eq!(positions(&outcome), vec![("b", Some(1))]);
    }

    #[test]
    fn test_team_members_share_team_position() {
        let outcome = process_batch(
            vec![
                record("a1", "Relay", Some(1), Some("05:00"), Validity::Valid),
                record("b1", "Relay", Some(2), Some("04:00"), Validity::Valid),
                record("a2", "Relay", Some(1), Some("06:00"), Validity::Valid),
                record("b2", "Relay", Some(2), Some("04:30"), Validity::Valid),
            ],
            &PipelineOptions::default(),
        );

        assert_eq!(
            positions(&outcome),
            vec![
                ("b1", Some(1)),
                ("b2", Some(1)),
                ("a1", Some(2)),
                ("a2", Some(2)),
            ]
        );

        let a1 = &outcome.results[2];
        assert_eq!(a1.ranking_time_ms, RaceTime::Finished(660_000));
        assert_eq!(a1.display_result, "11:00.000");
        assert_eq!(a1.relay_personal_time_ms, Some(RaceTime::Finished(300_000)));
    }

    #[test]
    fn test_shared_pool_mixes_individuals_with_teams() {
        let outcome = process_batch(
            vec![
                record("a1", "Relay", Some(1), Some("05:00"), Validity::Valid),
                record("a2", "Relay", Some(1), Some("06:00"), Validity::Valid),
                record("solo", "Relay", None, Some("10:00"), Validity::Valid),
            ],
            &PipelineOptions::default(),
        );

        assert_eq!(
            positions(&outcome),
            vec![("solo", Some(1)), ("a1", Some(2)), ("a2", Some(2))]
        );
        assert_eq!(outcome.results[0].relay_personal_time_ms, None);
    }

    #[test]
    fn test_shared_pool_tie_between_team_and_individual() {
        let outcome = process_batch(
            vec![
                record("a1", "Relay", Some(1), Some("05:00"), Validity::Valid),
                record("a2", "Relay", Some(1), Some("05:00"), Validity::Valid),
                record("solo", "Relay", None, Some("10:00"), Validity::Valid),
                record("late", "Relay", None, Some("10:30"), Validity::Valid),
            ],
            &PipelineOptions::default(),
        );

        assert_eq!(
            positions(&outcome),
            vec![
                ("a1", Some(1)),
                ("a2", Some(1)),
                ("solo", Some(1)),
                ("late", Some(3)),
            ]
        );
        assert_eq!(outcome.results[0].ranking_time_ms, outcome.results[2].ranking_time_ms);
    }

    #[test]
    fn test_separate_pools_rank_individuals_apart() {
        let options = PipelineOptions {
            mixed_group_policy: MixedGroupPolicy::SeparatePools,
        };
        let outcome = process_batch(
            vec![
                record("a1", "Relay", Some(1), Some("05:00"), Validity::Valid),
                record("a2", "Relay", Some(1), Some("06:00"), Validity::Valid),
                record("solo", "Relay", None, Some("10:00"), Validity::Valid),
            ],
            &options,
        );

        assert_eq!(
            positions(&outcome),
            vec![("a1", Some(1)), ("a2", Some(1)), ("solo", Some(1))]
        );
    }

    #[test]
    fn test_duplicates_collapse_before_ranking() {
        let outcome = process_batch(
            vec![
                record("a", "M21", None, None, Validity::Unknown),
                record("a", "M21", None, Some("10:00"), Validity::Valid),
                record("b", "M21", None, Some("09:00"), Validity::Valid),
            ],
            &PipelineOptions::default(),
        );

        assert_eq!(positions(&outcome), vec![("b", Some(1)), ("a", Some(2))]);
    }

    #[test]
    fn test_zero_time_is_not_ranked_ahead_of_finishers() {
        let outcome = process_batch(
            vec![
                record("zero", "M21", None, Some("00:00"), Validity::Valid),
                record("real", "M21", None, Some("20:00"), Validity::Valid),
            ],
            &PipelineOptions::default(),
        );

        assert_eq!(positions(&outcome), vec![("real", Some(1)), ("zero", None)]);
        assert_eq!(outcome.results[1].display_result, "DNF");
    }

    #[test]
    fn test_null_position_invariant_holds() {
        let outcome = process_batch(
            vec![
                record("a", "M21", None, Some("10:00"), Validity::Valid),
                record("b", "M21", None, Some("DNF"), Validity::Valid),
                record("c", "M21", None, Some("08:00"), Validity::Invalid),
                record("r1", "Relay", Some(3), Some("05:00"), Validity::Valid),
                record("r2", "Relay", Some(3), None, Validity::Unknown),
                record("s1", "Relay", Some(4), Some("DNF"), Validity::Valid),
            ],
            &PipelineOptions::default(),
        );

        for result in &outcome.results {
            let rankable = result.resolved_validity && result.ranking_time_ms.is_finite();
            assert_eq!(result.position.is_some(), rankable, "{}", result.raw.runner_name);
        }
    }
}
