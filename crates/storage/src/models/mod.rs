mod event_context;
mod timing_result;

pub use event_context::EventContext;
pub use timing_result::{NewTimingResult, TimingResult};
