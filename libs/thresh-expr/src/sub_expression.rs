//! AlarmSubExpression - one leaf comparison of an alarm expression

use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::compiler;
use crate::error::{ExprError, Result};
use crate::function::AggregateFunction;
use crate::metric::MetricDefinition;
use crate::operator::AlarmOperator;

pub const DEFAULT_PERIOD: u32 = 60;
pub const DEFAULT_PERIODS: u32 = 1;
pub const DEFAULT_DETERMINISTIC: bool = false;

/// `function(metric, period) operator threshold times periods`
///
/// Equality covers every field. The threshold is compared by bit pattern, so
/// `0.1 + 0.2` and `0.3` are different sub-expressions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AlarmSubExpression {
    function: AggregateFunction,
    metric_definition: MetricDefinition,
    operator: AlarmOperator,
    threshold: f64,
    /// Seconds aggregated into one value
    period: u32,
    /// Consecutive periods that must breach
    periods: u32,
    /// Evaluated every period even without samples
    deterministic: bool,
}

impl AlarmSubExpression {
    pub fn new(
        function: AggregateFunction,
        metric_definition: MetricDefinition,
        operator: AlarmOperator,
        threshold: f64,
        period: u32,
        periods: u32,
        deterministic: bool,
    ) -> Self {
        Self {
            function,
            metric_definition,
            operator,
            threshold,
            period,
            periods,
            deterministic,
        }
    }

    /// Compile a single comparison, rejecting `and`/`or` compounds
    pub fn of(text: &str) -> Result<Self> {
        compiler::compile_single(text)
    }

    /// Whether `value` breaches the threshold
    pub fn evaluate(&self, value: f64) -> bool {
        self.operator.evaluate(value, self.threshold)
    }

    pub fn function(&self) -> AggregateFunction {
        self.function
    }

    pub fn metric_definition(&self) -> &MetricDefinition {
        &self.metric_definition
    }

    pub fn operator(&self) -> AlarmOperator {
        self.operator
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn period(&self) -> u32 {
        self.period
    }

    pub fn periods(&self) -> u32 {
        self.periods
    }

    pub fn is_deterministic(&self) -> bool {
        self.deterministic
    }

    /// Expression text that compiles back to an equal sub-expression
    pub fn to_text(&self) -> String {
        self.to_string()
    }
}

/// Decimal threshold text: never scientific, always with a fractional part
fn format_threshold(threshold: f64) -> String {
    let text = threshold.to_string();
    if text.contains('.') || !threshold.is_finite() {
        text
    } else {
        format!("{}.0", text)
    }
}

impl fmt::Display for AlarmSubExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({}", self.function, self.metric_definition)?;
        if self.period != DEFAULT_PERIOD {
            write!(f, ", {}", self.period)?;
        }
        if self.deterministic {
            f.write_str(", deterministic")?;
        }
        write!(
            f,
            ") {} {}",
            self.operator,
            format_threshold(self.threshold)
        )?;
        if self.periods != DEFAULT_PERIODS {
            write!(f, " times {}", self.periods)?;
        }
        Ok(())
    }
}

impl PartialEq for AlarmSubExpression {
    fn eq(&self, other: &Self) -> bool {
        self.function == other.function
            && self.metric_definition == other.metric_definition
            && self.operator == other.operator
            && self.threshold.to_bits() == other.threshold.to_bits()
            && self.period == other.period
            && self.periods == other.periods
            && self.deterministic == other.deterministic
    }
}

impl Eq for AlarmSubExpression {}

impl Hash for AlarmSubExpression {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.function.hash(state);
        self.metric_definition.hash(state);
        self.operator.hash(state);
        self.threshold.to_bits().hash(state);
        self.period.hash(state);
        self.periods.hash(state);
        self.deterministic.hash(state);
    }
}

impl std::str::FromStr for AlarmSubExpression {
    type Err = ExprError;

    fn from_str(s: &str) -> Result<Self> {
        Self::of(s)
    }
}

impl TryFrom<String> for AlarmSubExpression {
    type Error = ExprError;

    fn try_from(text: String) -> Result<Self> {
        Self::of(&text)
    }
}

impl From<AlarmSubExpression> for String {
    fn from(sub_expression: AlarmSubExpression) -> Self {
        sub_expression.to_string()
    }
}
