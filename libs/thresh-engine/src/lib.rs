//! thresh-engine - Alarm threshold evaluation
//!
//! Ties the expression language to windowed statistics: every leaf of an alarm
//! expression gets its own sliding window, samples are routed to the windows whose
//! metric they match, and evaluation combines per-leaf states into an alarm state.
//!
//! # Example
//!
//! ```rust
//! use thresh_engine::{AlarmEvaluator, EngineConfig};
//! use thresh_expr::{AlarmExpression, AlarmState, MetricDefinition};
//!
//! let expression = AlarmExpression::new("avg(cpu{host=a}, 60) > 90").unwrap();
//! let mut evaluator = AlarmEvaluator::new(expression, &EngineConfig::default(), 60).unwrap();
//!
//! let cpu = MetricDefinition::named("cpu").with_dimension("host", "a");
//! assert_eq!(evaluator.add_sample(&cpu, 97.0, 20), 1);
//! assert_eq!(evaluator.evaluate(75).unwrap(), AlarmState::Alarm);
//! ```

pub mod alarm;
pub mod config;
pub mod error;
pub mod logging;
pub mod sub_alarm;

// Re-exports for convenience
pub use alarm::AlarmEvaluator;
pub use config::{load_config, load_config_from_file, EngineConfig, ENV_PREFIX};
pub use error::{EngineError, Result};
pub use logging::init_logging;
pub use sub_alarm::SubAlarmStats;
