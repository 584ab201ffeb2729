use serde::{Deserialize, Deserializer, Serialize};

use crate::time::RaceTime;

/// Verdict recorded by a timing device for one reading.
///
/// `Unknown` means the device produced no explicit verdict. It is never
/// treated as `Invalid`, but it is not rankable either.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Validity {
    Valid,
    Invalid,
    #[default]
    Unknown,
}

impl Validity {
    /// Trust order of the three verdicts. Lower wins.
    pub fn priority(self) -> u8 {
        match self {
            Self::Valid => 1,
            Self::Invalid => 2,
            Self::Unknown => 3,
        }
    }

    pub fn is_valid(self) -> bool {
        self == Self::Valid
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Valid => "valid",
            Self::Invalid => "invalid",
            Self::Unknown => "unknown",
        }
    }
}

/// One device reading as delivered by the timing provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawResult {
    pub external_id: String,
    pub game_id: String,
    pub runner_name: String,
    #[serde(default)]
    pub club_name: String,
    pub scoring_group: String,
    /// `None`, zero or negative all mean "no team".
    #[serde(default)]
    pub team_id: Option<i64>,
    #[serde(default)]
    pub elapsed_time_text: Option<String>,
    #[serde(default)]
    pub validity: Validity,
    #[serde(default)]
    pub reason_code: Option<String>,
    /// Raw verdict text the device sent that maps to none of the three
    /// verdicts. Such readings carry `Validity::Unknown` but rank below a
    /// plain `Unknown` when duplicates are collapsed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unrecognized_verdict: Option<String>,
}

impl RawResult {
    /// Names are compared trimmed, matching [`RawResult::has_identity`].
    pub fn identity_key(&self) -> IdentityKey {
        IdentityKey {
            game_id: self.game_id.trim().to_string(),
            runner_name: self.runner_name.trim().to_string(),
            club_name: self.club_name.trim().to_string(),
            scoring_group: self.scoring_group.trim().to_string(),
        }
    }

    /// Trust order used when collapsing duplicates. Lower wins; an
    /// unrecognized verdict ranks below every known one.
    pub fn verdict_priority(&self) -> u8 {
        match self.unrecognized_verdict {
            Some(_) => 4,
            None => self.validity.priority(),
        }
    }

    /// Records without a runner or scoring group cannot be keyed or ranked.
    pub fn has_identity(&self) -> bool {
        !self.runner_name.trim().is_empty() && !self.scoring_group.trim().is_empty()
    }

    /// The relay team this reading belongs to, if any.
    pub fn team(&self) -> Option<i64> {
        self.team_id.filter(|id| *id > 0)
    }

    pub fn elapsed_time(&self) -> RaceTime {
        self.elapsed_time_text
            .as_deref()
            .map_or(RaceTime::Unrankable, crate::time::parse)
    }
}

/// Composite key identifying one runner's participation in a game.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IdentityKey {
    pub game_id: String,
    pub runner_name: String,
    pub club_name: String,
    pub scoring_group: String,
}

/// Final standing for one surviving participation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessedResult {
    #[serde(flatten)]
    pub raw: RawResult,
    /// Team total for relay members, own time otherwise.
    pub ranking_time_ms: RaceTime,
    pub position: Option<u32>,
    pub resolved_validity: bool,
    pub display_result: String,
    /// A relay member's own time; `None` outside team participation.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "present_race_time"
    )]
    pub relay_personal_time_ms: Option<RaceTime>,
}

// A present `null` is a relay leg without a finished time, not a missing field.
fn present_race_time<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<RaceTime>, D::Error> {
    RaceTime::deserialize(deserializer).map(Some)
}

impl ProcessedResult {
    pub fn is_ranked(&self) -> bool {
        self.position.is_some()
    }
}
