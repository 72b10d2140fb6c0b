//! Slot accumulators
//!
//! Each slot of a [`SlidingWindow`](crate::SlidingWindow) reduces every sample that
//! lands in it to a single value:
//! - `Sum`: running total
//! - `Average`: running total divided by sample count
//! - `Min` / `Max`: extreme value, seeded by the first sample
//! - `Count`: number of samples, whatever their magnitude
//! - `Last`: value carrying the newest timestamp (not the latest arrival)
//!
//! An accumulator that has not seen a sample reports `NaN`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Common contract of all slot accumulators
pub trait Statistic {
    /// Add a sample observed at `timestamp`
    fn add_value(&mut self, value: f64, timestamp: i64);

    /// Current reduced value, `NaN` until the first sample
    fn value(&self) -> f64;

    /// Forget every sample
    fn reset(&mut self);

    /// Whether at least one sample was added since the last reset
    fn is_initialized(&self) -> bool;
}

/// Accumulator kind selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatisticKind {
    Sum,
    Average,
    Min,
    Max,
    Count,
    Last,
}

impl StatisticKind {
    /// Fresh accumulator of this kind
    pub fn create(self) -> Accumulator {
        Accumulator::new(self)
    }
}

impl fmt::Display for StatisticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StatisticKind::Sum => "sum",
            StatisticKind::Average => "average",
            StatisticKind::Min => "min",
            StatisticKind::Max => "max",
            StatisticKind::Count => "count",
            StatisticKind::Last => "last",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Sum {
    initialized: bool,
    total: f64,
}

impl Statistic for Sum {
    fn add_value(&mut self, value: f64, _timestamp: i64) {
        self.initialized = true;
        self.total += value;
    }

    fn value(&self) -> f64 {
        if self.initialized {
            self.total
        } else {
            f64::NAN
        }
    }

    fn reset(&mut self) {
        *self = Self::default();
    }

    fn is_initialized(&self) -> bool {
        self.initialized
    }
}

#[derive(Debug, Clone, Default)]
pub struct Average {
    initialized: bool,
    total: f64,
    count: u64,
}

impl Statistic for Average {
    fn add_value(&mut self, value: f64, _timestamp: i64) {
        self.initialized = true;
        self.total += value;
        self.count += 1;
    }

    fn value(&self) -> f64 {
        if !self.initialized {
            return f64::NAN;
        }
        if self.count == 0 {
            return 0.0;
        }
        self.total / self.count as f64
    }

    fn reset(&mut self) {
        *self = Self::default();
    }

    fn is_initialized(&self) -> bool {
        self.initialized
    }
}

#[derive(Debug, Clone, Default)]
pub struct Min {
    initialized: bool,
    value: f64,
}

impl Statistic for Min {
    fn add_value(&mut self, value: f64, _timestamp: i64) {
        if !self.initialized {
            self.initialized = true;
            self.value = value;
        } else if value < self.value {
            self.value = value;
        }
    }

    fn value(&self) -> f64 {
        if self.initialized {
            self.value
        } else {
            f64::NAN
        }
    }

    fn reset(&mut self) {
        *self = Self::default();
    }

    fn is_initialized(&self) -> bool {
        self.initialized
    }
}

#[derive(Debug, Clone, Default)]
pub struct Max {
    initialized: bool,
    value: f64,
}

impl Statistic for Max {
    fn add_value(&mut self, value: f64, _timestamp: i64) {
        if !self.initialized {
            self.initialized = true;
            self.value = value;
        } else if value > self.value {
            self.value = value;
        }
    }

    fn value(&self) -> f64 {
        if self.initialized {
            self.value
        } else {
            f64::NAN
        }
    }

    fn reset(&mut self) {
        *self = Self::default();
    }

    fn is_initialized(&self) -> bool {
        self.initialized
    }
}

#[derive(Debug, Clone, Default)]
pub struct Count {
    initialized: bool,
    count: u64,
}

impl Statistic for Count {
    fn add_value(&mut self, _value: f64, _timestamp: i64) {
        self.initialized = true;
        self.count += 1;
    }

    fn value(&self) -> f64 {
        if self.initialized {
            self.count as f64
        } else {
            f64::NAN
        }
    }

    fn reset(&mut self) {
        *self = Self::default();
    }

    fn is_initialized(&self) -> bool {
        self.initialized
    }
}

#[derive(Debug, Clone, Default)]
pub struct Last {
    value: f64,
    /// Newest timestamp accepted since the last reset
    last_timestamp: Option<i64>,
}

impl Statistic for Last {
    fn add_value(&mut self, value: f64, timestamp: i64) {
        // Older or equal timestamps never replace the held value
        let newer = match self.last_timestamp {
            Some(last) => timestamp > last,
            None => true,
        };
        if newer {
            self.value = value;
            self.last_timestamp = Some(timestamp);
        }
    }

    fn value(&self) -> f64 {
        if self.last_timestamp.is_some() {
            self.value
        } else {
            f64::NAN
        }
    }

    fn reset(&mut self) {
        *self = Self::default();
    }

    fn is_initialized(&self) -> bool {
        self.last_timestamp.is_some()
    }
}

/// Accumulator of any kind, dispatched by variant
#[derive(Debug, Clone)]
pub enum Accumulator {
    Sum(Sum),
    Average(Average),
    Min(Min),
    Max(Max),
    Count(Count),
    Last(Last),
}

impl Accumulator {
    pub fn new(kind: StatisticKind) -> Self {
        match kind {
            StatisticKind::Sum => Accumulator::Sum(Sum::default()),
            StatisticKind::Average => Accumulator::Average(Average::default()),
            StatisticKind::Min => Accumulator::Min(Min::default()),
            StatisticKind::Max => Accumulator::Max(Max::default()),
            StatisticKind::Count => Accumulator::Count(Count::default()),
            StatisticKind::Last => Accumulator::Last(Last::default()),
        }
    }

    pub fn kind(&self) -> StatisticKind {
        match self {
            Accumulator::Sum(_) => StatisticKind::Sum,
            Accumulator::Average(_) => StatisticKind::Average,
            Accumulator::Min(_) => StatisticKind::Min,
            Accumulator::Max(_) => StatisticKind::Max,
            Accumulator::Count(_) => StatisticKind::Count,
            Accumulator::Last(_) => StatisticKind::Last,
        }
    }

    fn inner(&self) -> &dyn Statistic {
        match self {
            Accumulator::Sum(s) => s,
            Accumulator::Average(s) => s,
            Accumulator::Min(s) => s,
            Accumulator::Max(s) => s,
            Accumulator::Count(s) => s,
            Accumulator::Last(s) => s,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn Statistic {
        match self {
            Accumulator::Sum(s) => s,
            Accumulator::Average(s) => s,
            Accumulator::Min(s) => s,
            Accumulator::Max(s) => s,
            Accumulator::Count(s) => s,
            Accumulator::Last(s) => s,
        }
    }
}

impl Statistic for Accumulator {
    fn add_value(&mut self, value: f64, timestamp: i64) {
        self.inner_mut().add_value(value, timestamp);
    }

    fn value(&self) -> f64 {
        self.inner().value()
    }

    fn reset(&mut self) {
        self.inner_mut().reset();
    }

    fn is_initialized(&self) -> bool {
        self.inner().is_initialized()
    }
}

impl fmt::Display for Accumulator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value())
    }
}
