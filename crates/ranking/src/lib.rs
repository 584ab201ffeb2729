//! Result consolidation and ranking for timed competitions.
//!
//! Takes one batch of raw device readings for a game and produces final
//! standings per scoring group. Pure and synchronous: no I/O, no state kept
//! between calls.
//!
//! ```rust
//! use ranking::{PipelineOptions, RawResult, Validity, process_batch};
//!
//! let reading = |runner: &str, time: &str| RawResult {
//!     external_id: runner.to_string(),
//!     game_id: "g1".to_string(),
//!     runner_name: runner.to_string(),
//!     club_name: "Harriers".to_string(),
//!     scoring_group: "M21".to_string(),
//!     team_id: None,
//!     elapsed_time_text: Some(time.to_string()),
//!     validity: Validity::Valid,
//!     reason_code: None,
//!     unrecognized_verdict: None,
//! };
//!
//! let outcome = process_batch(
//!     vec![reading("Ann", "20:00"), reading("Bea", "19:59")],
//!     &PipelineOptions::default(),
//! );
//!
//! assert_eq!(outcome.results[0].raw.runner_name, "Bea");
//! assert_eq!(outcome.results[0].position, Some(1));
//! ```

pub mod classify;
pub mod dedup;
pub mod grouping;
pub mod models;
pub mod pipeline;
pub mod ranker;
pub mod team;
pub mod time;

pub use models::{IdentityKey, ProcessedResult, RawResult, Validity};
pub use pipeline::{BatchOutcome, MixedGroupPolicy, PipelineOptions, process_batch};
pub use time::{DNF, RaceTime};
