//! Error types for thresh-stats

use thiserror::Error;

/// Sliding window errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StatsError {
    /// Timestamp does not resolve to any slot of the current window
    #[error("{timestamp} is outside of the window")]
    OutOfWindow { timestamp: i64 },

    /// Window geometry rejected at construction
    #[error("Invalid window: {0}")]
    InvalidWindow(String),
}

impl StatsError {
    pub fn out_of_window(timestamp: i64) -> Self {
        Self::OutOfWindow { timestamp }
    }

    pub fn invalid_window(msg: impl Into<String>) -> Self {
        Self::InvalidWindow(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, StatsError>;
