//! Collapses duplicate device readings for the same participation.
//!
//! Devices swapped mid-race can report the same runner twice. The survivor is
//! the reading with the most trusted verdict (see
//! [`RawResult::verdict_priority`]); among equally trusted readings the earliest
//! one wins.

use tracing::debug;

use crate::grouping::Buckets;
use crate::models::{IdentityKey, RawResult};

/// Returns one record per identity key, in first-seen key order.
pub fn deduplicate(records: Vec<RawResult>) -> Vec<RawResult> {
    let buckets: Buckets<IdentityKey, RawResult> = records
        .into_iter()
        .map(|record| (record.identity_key(), record))
        .collect();

    buckets
        .into_iter()
        .filter_map(|(key, group)| select_survivor(&key, group))
        .collect()
}

fn select_survivor(key: &IdentityKey, group: Vec<RawResult>) -> Option<RawResult> {
    let duplicates = group.len();
    // `min_by_key` keeps the first of several equal minimums.
    let survivor = group
        .into_iter()
        .min_by_key(|record| record.verdict_priority())?;

    if duplicates > 1 {
        debug!(
            runner = %key.runner_name,
            club = %key.club_name,
            group = %key.scoring_group,
            duplicates,
            kept = %survivor.external_id,
            validity = survivor.validity.as_str(),
            "Collapsed duplicate timing records"
        );
    }

    Some(survivor)
}
