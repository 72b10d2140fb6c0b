//! Comparison and boolean operators

use serde::{Deserialize, Serialize};
use std::fmt;

/// Relational operator comparing an aggregated value against a threshold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AlarmOperator {
    #[serde(alias = "lt")]
    Lt,
    #[serde(alias = "lte")]
    Lte,
    #[serde(alias = "gt")]
    Gt,
    #[serde(alias = "gte")]
    Gte,
}

impl AlarmOperator {
    pub fn symbol(&self) -> &'static str {
        match self {
            AlarmOperator::Lt => "<",
            AlarmOperator::Lte => "<=",
            AlarmOperator::Gt => ">",
            AlarmOperator::Gte => ">=",
        }
    }

    pub fn evaluate(&self, lhs: f64, rhs: f64) -> bool {
        match self {
            AlarmOperator::Lt => lhs < rhs,
            AlarmOperator::Lte => lhs <= rhs,
            AlarmOperator::Gt => lhs > rhs,
            AlarmOperator::Gte => lhs >= rhs,
        }
    }

    /// Operator for the same comparison with its sides swapped
    pub fn reverse(&self) -> Self {
        match self {
            AlarmOperator::Lt => AlarmOperator::Gt,
            AlarmOperator::Lte => AlarmOperator::Gte,
            AlarmOperator::Gt => AlarmOperator::Lt,
            AlarmOperator::Gte => AlarmOperator::Lte,
        }
    }
}

impl fmt::Display for AlarmOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

impl std::str::FromStr for AlarmOperator {
    type Err = String;

    /// Accepts symbols and case-insensitive names
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "<" => return Ok(AlarmOperator::Lt),
            "<=" => return Ok(AlarmOperator::Lte),
            ">" => return Ok(AlarmOperator::Gt),
            ">=" => return Ok(AlarmOperator::Gte),
            _ => {},
        }
        match s.to_lowercase().as_str() {
            "lt" => Ok(AlarmOperator::Lt),
            "lte" => Ok(AlarmOperator::Lte),
            "gt" => Ok(AlarmOperator::Gt),
            "gte" => Ok(AlarmOperator::Gte),
            _ => Err(format!(
                "Invalid alarm operator: '{}'. Valid values: <, <=, >, >=, lt, lte, gt, gte",
                s
            )),
        }
    }
}

/// Connective joining two boolean results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum BooleanOperator {
    #[serde(alias = "and")]
    And,
    #[serde(alias = "or")]
    Or,
}

impl BooleanOperator {
    pub fn as_str(&self) -> &'static str {
        match self {
            BooleanOperator::And => "AND",
            BooleanOperator::Or => "OR",
        }
    }

    pub fn evaluate(&self, lhs: bool, rhs: bool) -> bool {
        match self {
            BooleanOperator::And => lhs && rhs,
            BooleanOperator::Or => lhs || rhs,
        }
    }
}

impl fmt::Display for BooleanOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
