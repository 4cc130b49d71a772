//! Change events published to presentation layers

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::TimerSnapshot;

/// Something observable happened to the timer collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum TimerEvent {
    Created(TimerSnapshot),
    Deleted { id: Uuid },
    Updated(TimerSnapshot),
    Completed(TimerSnapshot),
    /// Request for a full-screen flash overlay
    Flash { id: Uuid },
}
