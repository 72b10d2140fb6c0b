//! thresh-stats - Time-windowed statistics for threshold alarms
//!
//! Buckets timestamped samples into fixed-width slots and reduces each slot with
//! an accumulator, so an alarm can judge the last N periods of a metric.
//!
//! # Features
//!
//! - **Accumulators**: `sum`, `average`, `min`, `max`, `count`, `last`
//! - **Sliding window**: circular slot array with a view plus future slots
//! - **Late data**: samples are accepted until their slot falls off the window
//!
//! # Example
//!
//! ```rust
//! use thresh_stats::{SlidingWindow, StatisticKind};
//!
//! // One-minute slots, three in view, one ahead for early samples
//! let mut window = SlidingWindow::new(StatisticKind::Average, 60, 3, 1, 180).unwrap();
//! window.add_value(90.0, 130, false);
//! window.add_value(70.0, 150, false);
//!
//! let values = window.get_view_values();
//! assert!(values[0].is_nan());
//! assert_eq!(values[2], 80.0);
//!
//! // Future samples are kept but not yet visible
//! assert!(window.add_value(1.0, 200, false));
//! assert!(!window.add_value(1.0, 240, false));
//! ```

pub mod error;
pub mod statistic;
pub mod time;
pub mod window;

// Re-exports for convenience
pub use error::{Result, StatsError};
pub use statistic::{Accumulator, Average, Count, Last, Max, Min, Statistic, StatisticKind, Sum};
pub use time::TimeResolution;
pub use window::SlidingWindow;
