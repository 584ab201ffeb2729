use super::models::*;
use ranking::{RawResult, Validity};
use tracing::warn;

/// Maps provider payloads onto the engine's [`RawResult`] records.
///
/// Missing names become empty strings; the pipeline's identity check drops
/// those records later and counts them as skipped.
pub struct TimingApiTransformer;

impl TimingApiTransformer {
    pub fn to_raw_results(&self, api_response: ApiResponse) -> Vec<RawResult> {
        let game_id = api_response.game.id.to_string();

        api_response
            .results
            .into_iter()
            .map(|record| self.to_raw_result(&game_id, record))
            .collect()
    }

    fn to_raw_result(&self, game_id: &str, record: DeviceRecord) -> RawResult {
        let external_id = record.id.to_string();
        let (validity, unrecognized_verdict) = match map_verdict(record.verdict.as_ref()) {
            Ok(validity) => (validity, None),
            Err(raw) => {
                warn!(
                    "Unrecognized verdict '{}' on record {}, treating as unknown",
                    raw, external_id
                );
                (Validity::Unknown, Some(raw))
            }
        };

        RawResult {
            team_id: parse_team_id(record.team_id.as_ref()),
            validity,
            unrecognized_verdict,
            external_id,
            game_id: game_id.to_string(),
            runner_name: clean(record.runner_name),
            club_name: clean(record.club_name),
            scoring_group: clean(record.scoring_group),
            elapsed_time_text: record.elapsed_time,
            reason_code: record.reason_code.filter(|code| !code.trim().is_empty()),
        }
    }
}

fn clean(value: Option<String>) -> String {
    value.map(|v| v.trim().to_string()).unwrap_or_default()
}

/// Maps a device verdict onto the three known verdicts, or hands back the raw
/// text when it matches none of them.
fn map_verdict(verdict: Option<&Verdict>) -> std::result::Result<Validity, String> {
    match verdict {
        None => Ok(Validity::Unknown),
        Some(Verdict::Flag(true)) => Ok(Validity::Valid),
        Some(Verdict::Flag(false)) => Ok(Validity::Invalid),
        Some(Verdict::Code(1)) => Ok(Validity::Valid),
        Some(Verdict::Code(0)) => Ok(Validity::Invalid),
        Some(Verdict::Code(code)) => Err(code.to_string()),
        Some(Verdict::Text(text)) => match text.trim().to_lowercase().as_str() {
            "valid" | "ok" | "1" | "true" => Ok(Validity::Valid),
            "invalid" | "dsq" | "dq" | "0" | "false" => Ok(Validity::Invalid),
            "" | "unknown" => Ok(Validity::Unknown),
            _ => Err(text.trim().to_string()),
        },
    }
}

/// Non-numeric team references mean "no team".
fn parse_team_id(team: Option<&ExternalRef>) -> Option<i64> {
    let id = match team? {
        ExternalRef::Number(n) => Some(*n),
        ExternalRef::Text(s) => s.trim().parse::<i64>().ok(),
    };
    id.filter(|id| *id > 0)
}
