//! thresh-expr - Alarm expression language
//!
//! Compiles alarm expressions such as
//! `avg(cpu{instance_id=5}, 60) > 5 times 3 and max(mem) < 4` into a postfix
//! program of sub-expressions and boolean connectives, then evaluates that
//! program from one truth value per sub-expression.
//!
//! # Features
//!
//! - **Sub-expressions**: aggregate function, metric with dimensions, operator,
//!   threshold, period, repeat count and determinism flag
//! - **Compiler**: recursive descent, `and` binds tighter than `or`, parentheses,
//!   reversed comparisons (`5 < avg(cpu)`), quoted dimension values
//! - **Evaluation**: postfix walk over a caller-supplied truth table
//! - **Presentation**: flattened n-ary boolean tree
//!
//! # Example
//!
//! ```rust
//! use std::collections::HashMap;
//! use thresh_expr::{AggregateFunction, AlarmExpression, AlarmSubExpression};
//!
//! let expr = AlarmExpression::new("avg(cpu{host=a}, 120) > 90 times 3 or mem{host=a} > 95").unwrap();
//! let subs = expr.sub_expressions();
//! assert_eq!(subs[0].period(), 120);
//! // A bare metric compares its maximum
//! assert_eq!(subs[1].function(), AggregateFunction::Max);
//!
//! let mut values = HashMap::new();
//! values.insert(subs[0].clone(), false);
//! values.insert(subs[1].clone(), true);
//! assert!(expr.evaluate(&values).unwrap());
//!
//! // Sub-expressions render back to text that compiles to the same value
//! let text = subs[0].to_text();
//! assert_eq!(text, "avg(cpu{host=a}, 120) > 90.0 times 3");
//! assert_eq!(AlarmSubExpression::of(&text).unwrap(), subs[0]);
//! ```

pub mod compiler;
pub mod error;
pub mod expression;
pub mod function;
mod lexer;
pub mod metric;
pub mod operator;
pub mod state;
pub mod sub_expression;
pub mod tree;

// Re-exports for convenience
pub use compiler::{compile, compile_single};
pub use error::{ExprError, Result};
pub use expression::{AlarmExpression, Element};
pub use function::AggregateFunction;
pub use metric::MetricDefinition;
pub use operator::{AlarmOperator, BooleanOperator};
pub use state::{AlarmSeverity, AlarmState};
pub use sub_expression::{
    AlarmSubExpression, DEFAULT_DETERMINISTIC, DEFAULT_PERIOD, DEFAULT_PERIODS,
};
pub use tree::ExpressionTree;
