use crate::grouping::Buckets;
use crate::models::RawResult;

/// Records of one relay team inside a scoring group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamBucket {
    pub team_id: i64,
    pub members: Vec<RawResult>,
}

/// A scoring group split into relay teams and individual entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Participation {
    pub teams: Vec<TeamBucket>,
    pub individuals: Vec<RawResult>,
}

impl Participation {
    pub fn has_teams(&self) -> bool {
        !self.teams.is_empty()
    }
}

/// Partitions a batch by trimmed scoring group, groups in first-seen order.
pub fn split_by_scoring_group(records: Vec<RawResult>) -> Vec<(String, Vec<RawResult>)> {
    let buckets: Buckets<String, RawResult> = records
        .into_iter()
        .map(|record| (record.scoring_group.trim().to_string(), record))
        .collect();

    buckets.into_iter().collect()
}

/// Splits one scoring group's entries into team buckets and individuals.
pub fn classify(entries: Vec<RawResult>) -> Participation {
    let mut teams: Buckets<i64, RawResult> = Buckets::new();
    let mut individuals = Vec::new();

    for entry in entries {
        match entry.team() {
            Some(team_id) => teams.push(team_id, entry),
            None => individuals.push(entry),
        }
    }

    Participation {
        teams: teams
            .into_iter()
            .map(|(team_id, members)| TeamBucket { team_id, members })
            .collect(),
        individuals,
    }
}
