//! Error types for thresh-engine

use thiserror::Error;

use thresh_expr::ExprError;
use thresh_stats::StatsError;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Expression error: {0}")]
    Expression(#[from] ExprError),

    #[error("Statistics error: {0}")]
    Stats(#[from] StatsError),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl EngineError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;
