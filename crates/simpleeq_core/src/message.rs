//! Message Types for Thread Communication
//!
//! Commands flow from UI thread -> response monitor thread
//! Events flow from the response monitor thread -> UI thread

use serde::{Deserialize, Serialize};

/// Commands sent from the UI thread to the response monitor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Recompute the curve even if no parameter changed
    Refresh,

    /// Stop the monitor thread
    Shutdown,
}

/// Events sent from the response monitor to the UI thread
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum Event {
    /// Monitor thread started
    Started,

    /// Monitor thread stopped
    Stopped,

    /// Error occurred
    Error { message: String },

    /// Fresh response curve for display
    ResponseUpdated {
        /// Parameter revision the curve was computed from
        revision: u64,
        /// Log-spaced magnitudes in dB from `min_hz` to `max_hz`
        magnitudes_db: Vec<f32>,
    },
}

impl Event {
    /// Create an error event from any error type
    pub fn error<E: std::fmt::Display>(err: E) -> Self {
        Event::Error {
            message: err.to_string(),
        }
    }
}
