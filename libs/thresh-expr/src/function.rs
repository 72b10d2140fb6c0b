//! Aggregate functions applied to a metric over one period

use serde::{Deserialize, Serialize};
use std::fmt;
use thresh_stats::{Accumulator, StatisticKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AggregateFunction {
    #[serde(alias = "min")]
    Min,
    #[serde(alias = "max")]
    Max,
    #[serde(alias = "sum")]
    Sum,
    #[serde(alias = "count")]
    Count,
    #[serde(alias = "avg")]
    Avg,
    #[serde(alias = "last")]
    Last,
}

impl AggregateFunction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AggregateFunction::Min => "min",
            AggregateFunction::Max => "max",
            AggregateFunction::Sum => "sum",
            AggregateFunction::Count => "count",
            AggregateFunction::Avg => "avg",
            AggregateFunction::Last => "last",
        }
    }

    /// Case-insensitive lookup by function name
    pub fn from_name(name: &str) -> Option<Self> {
        [
            AggregateFunction::Min,
            AggregateFunction::Max,
            AggregateFunction::Sum,
            AggregateFunction::Count,
            AggregateFunction::Avg,
            AggregateFunction::Last,
        ]
        .into_iter()
        .find(|function| function.as_str().eq_ignore_ascii_case(name))
    }

    pub fn statistic_kind(&self) -> StatisticKind {
        match self {
            AggregateFunction::Min => StatisticKind::Min,
            AggregateFunction::Max => StatisticKind::Max,
            AggregateFunction::Sum => StatisticKind::Sum,
            AggregateFunction::Count => StatisticKind::Count,
            AggregateFunction::Avg => StatisticKind::Average,
            AggregateFunction::Last => StatisticKind::Last,
        }
    }

    /// Fresh accumulator computing this function
    pub fn to_statistic(&self) -> Accumulator {
        self.statistic_kind().create()
    }
}

impl fmt::Display for AggregateFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for AggregateFunction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| {
            format!(
                "Invalid aggregate function: '{}'. Valid values: min, max, sum, count, avg, last",
                s
            )
        })
    }
}
