use serde::{Deserialize, Serialize};

/// Caller-supplied context merged onto every persisted result.
///
/// `event_name` and `game_type` together with the runner name form the
/// durable identity of a stored result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventContext {
    pub event_name: String,
    pub event_type: String,
    pub game_type: String,
}
