//! Relay team totals and team-level validity.

use crate::classify::TeamBucket;
use crate::models::RawResult;
use crate::time::RaceTime;

/// A relay team reduced to one ranking unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamResult {
    pub team_id: i64,
    /// Sum of the members' finished times.
    pub total: RaceTime,
    /// True only when every member is `Valid` and the total is finite.
    pub valid: bool,
    /// Each member with their own parsed time.
    pub members: Vec<(RawResult, RaceTime)>,
}

pub fn aggregate(bucket: TeamBucket) -> TeamResult {
    let members: Vec<(RawResult, RaceTime)> = bucket
        .members
        .into_iter()
        .map(|member| {
            let time = member.elapsed_time();
            (member, time)
        })
        .collect();

    let total = team_total(members.iter().map(|(_, time)| *time));
    let all_valid = members.iter().all(|(member, _)| member.validity.is_valid());

    TeamResult {
        team_id: bucket.team_id,
        total,
        valid: all_valid && total.is_finite(),
        members,
    }
}

/// Unfinished legs are left out of the sum; a team with no finished leg has
/// no total at all.
fn team_total(times: impl Iterator<Item = RaceTime>) -> RaceTime {
    let mut finished = times.filter_map(RaceTime::millis).peekable();
    if finished.peek().is_none() {
        return RaceTime::Unrankable;
    }

    finished
        .try_fold(0u64, u64::checked_add)
        .map_or(RaceTime::Unrankable, RaceTime::Finished)
}
