pub mod error;
pub mod filter;
pub mod processing;
pub mod sink;
pub mod sources;
pub mod traits;

pub use error::{ImporterError, Result};
pub use filter::ClubFilter;
pub use processing::{ImportRequest, ImportSummary, ResultImporter};
pub use sink::PostgresSink;
pub use traits::{ResultSink, ResultSource};

pub use sources::timing_api::{TimingApiClient, TimingApiSource, TimingApiTransformer};
