//! SlidingWindow - circular array of time slots
//!
//! The window is split into a *view* (the slots callers read when judging a
//! sub-alarm) followed by *future* slots that absorb samples arriving ahead of the
//! view. Time only moves forward: sliding recycles the oldest slot as the newest
//! one, so late samples are accepted until their slot falls off the left edge.
//!
//! ```text
//!  window_start                view_end                  window_end
//!       │   view slot │ view slot │ future slot │ future slot │
//!       └─────────────┴───────────┴─────────────┴─────────────┘
//!                      slot_end == view_end
//! ```
//!
//! Slots are addressed *logically* (0 = oldest) and stored *physically* in a
//! fixed `Vec`; `base_index` is the physical position of logical slot 0.

use std::fmt;

use crate::error::{Result, StatsError};
use crate::statistic::{Accumulator, Statistic, StatisticKind};
use crate::time::TimeResolution;

/// Number of trailing view slots rendered by `Display`
const DISPLAYED_VIEW_SLOTS: usize = 3;

#[derive(Debug, Clone)]
struct Slot {
    /// Start of the time range covered by the slot
    timestamp: i64,
    stat: Accumulator,
}

/// Time-based sliding window of statistics.
///
/// Not thread-safe: a window belongs to exactly one evaluation loop.
///
/// # Example
///
/// ```
/// use thresh_stats::{SlidingWindow, StatisticKind};
///
/// // Three 5s view slots ending at t=20 plus two future slots
/// let mut window = SlidingWindow::new(StatisticKind::Sum, 5, 3, 2, 20).unwrap();
/// window.add_value(2.0, 5, false);
/// window.add_value(3.0, 10, false);
/// assert_eq!(window.get_value(10).unwrap(), 3.0);
///
/// window.slide_view_to(25, 0);
/// assert!(window.get_value(5).is_err());
/// ```
#[derive(Debug, Clone)]
pub struct SlidingWindow {
    resolution: TimeResolution,
    slot_width: i64,
    num_view_slots: usize,
    window_length: i64,
    slots: Vec<Slot>,
    base_index: usize,
    view_end: i64,
    slot_end: i64,
    window_end: i64,
}

impl SlidingWindow {
    /// Create a window using timestamps as given.
    ///
    /// # Arguments
    /// * `kind` - Accumulator used by every slot
    /// * `slot_width` - Time covered by one slot
    /// * `num_view_slots` - Slots visible through the view
    /// * `num_future_slots` - Extra slots beyond the view
    /// * `view_end` - Exclusive end of the view
    pub fn new(
        kind: StatisticKind,
        slot_width: i64,
        num_view_slots: usize,
        num_future_slots: usize,
        view_end: i64,
    ) -> Result<Self> {
        Self::with_resolution(
            kind,
            TimeResolution::Absolute,
            slot_width,
            num_view_slots,
            num_future_slots,
            view_end,
        )
    }

    /// Create a window whose timestamps are truncated to `resolution`
    pub fn with_resolution(
        kind: StatisticKind,
        resolution: TimeResolution,
        slot_width: i64,
        num_view_slots: usize,
        num_future_slots: usize,
        view_end: i64,
    ) -> Result<Self> {
        if slot_width <= 0 {
            return Err(StatsError::invalid_window(format!(
                "slot width must be positive, got {}",
                slot_width
            )));
        }
        if num_view_slots == 0 {
            return Err(StatsError::invalid_window(
                "at least one view slot is required",
            ));
        }

        let capacity = num_view_slots.checked_add(num_future_slots).ok_or_else(|| {
            StatsError::invalid_window("slot count exceeds the addressable range")
        })?;
        let view_end = resolution.adjust(view_end);
        let (window_end, window_length) =
            span(view_end, slot_width, num_future_slots, capacity).ok_or_else(|| {
                StatsError::invalid_window(format!(
                    "{} slots of width {} ending past {} overflow the timestamp range",
                    capacity, slot_width, view_end
                ))
            })?;
        let window_start = window_end - window_length;

        let slots = (0..capacity)
            .map(|i| Slot {
                timestamp: window_start + i as i64 * slot_width,
                stat: kind.create(),
            })
            .collect();

        Ok(Self {
            resolution,
            slot_width,
            num_view_slots,
            window_length,
            slots,
            base_index: 0,
            view_end,
            slot_end: view_end,
            window_end,
        })
    }

    /// Add `value` to the slot covering `timestamp`.
    ///
    /// With `force` the value always lands in the oldest slot, whatever its
    /// timestamp. Without it, a timestamp outside the window is rejected and
    /// `false` is returned.
    pub fn add_value(&mut self, value: f64, timestamp: i64, force: bool) -> bool {
        let index = if force {
            self.physical(0)
        } else {
            match self.index_of_time(timestamp) {
                Some(index) => index,
                None => return false,
            }
        };
        self.slots[index].stat.add_value(value, timestamp);
        true
    }

    /// Physical index of the slot covering `timestamp`, `None` when outside the window
    pub fn index_of_time(&self, timestamp: i64) -> Option<usize> {
        let timestamp = self.resolution.adjust(timestamp);
        let window_start = self.window_start();
        if timestamp < window_start || timestamp >= self.window_end {
            return None;
        }
        let offset = timestamp - window_start;
        Some(self.physical((offset / self.slot_width) as usize))
    }

    /// Whether `timestamp` is far enough past the view end to warrant a slide
    pub fn should_evaluate(&self, timestamp: i64, min_delay: i64) -> bool {
        timestamp > self.view_end.saturating_add(min_delay)
    }

    /// Slide the view toward `timestamp`, resetting every slot recycled on the way.
    ///
    /// No-op unless `timestamp` is more than `min_delay` past the view end. A
    /// partial slot older than `min_delay` counts as a whole slot, so nearly
    /// complete slots get flushed instead of held open.
    pub fn slide_view_to(&mut self, timestamp: i64, min_delay: i64) {
        if !self.should_evaluate(timestamp, min_delay) {
            return;
        }

        let time_diff = timestamp.saturating_sub(self.slot_end);
        let mut slots_to_advance = time_diff / self.slot_width;
        if time_diff % self.slot_width > min_delay {
            slots_to_advance += 1;
        }
        // The window end never moves past the last representable timestamp
        let slots_to_advance =
            slots_to_advance.min((i64::MAX - self.window_end) / self.slot_width);
        if slots_to_advance <= 0 {
            return;
        }

        // Slots lapped more than once carry nothing over: jump straight to the
        // last full rotation
        let capacity = self.slots.len() as i64;
        let skipped = (slots_to_advance - capacity).max(0);
        if skipped > 0 {
            self.base_index = (self.base_index + (skipped % capacity) as usize) % self.slots.len();
            self.slot_end += skipped * self.slot_width;
            self.window_end += skipped * self.slot_width;
        }

        for _ in skipped..slots_to_advance {
            self.base_index = (self.base_index + 1) % self.slots.len();
            let newest = self.physical(self.slots.len() - 1);
            let slot = &mut self.slots[newest];
            slot.timestamp = self.window_end;
            slot.stat.reset();

            self.slot_end += self.slot_width;
            self.window_end += self.slot_width;
        }

        self.view_end += slots_to_advance * self.slot_width;

        tracing::trace!(
            view_end = self.view_end,
            window_end = self.window_end,
            slots = slots_to_advance,
            "Slid window view"
        );
    }

    /// Value of the slot covering `timestamp`
    pub fn get_value(&self, timestamp: i64) -> Result<f64> {
        let index = self
            .index_of_time(timestamp)
            .ok_or_else(|| StatsError::out_of_window(self.resolution.adjust(timestamp)))?;
        Ok(self.slots[index].stat.value())
    }

    /// Values from the oldest slot up to and including the slot covering `timestamp`.
    /// Slots without samples yield `NaN`.
    pub fn get_values_up_to(&self, timestamp: i64) -> Result<Vec<f64>> {
        let end = self
            .index_of_time(timestamp)
            .ok_or_else(|| StatsError::out_of_window(self.resolution.adjust(timestamp)))?;
        Ok(self.values(self.logical(end) + 1))
    }

    /// Values of the view, oldest to newest
    pub fn get_view_values(&self) -> Vec<f64> {
        self.values(self.num_view_slots)
    }

    /// Values of the whole window including future slots, oldest to newest
    pub fn get_window_values(&self) -> Vec<f64> {
        self.values(self.slots.len())
    }

    /// Exclusive end timestamp of every view slot, oldest to newest
    pub fn view_timestamps(&self) -> Vec<i64> {
        let first = self.window_start() + self.slot_width;
        (0..self.num_view_slots)
            .map(|i| first + i as i64 * self.slot_width)
            .collect()
    }

    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    pub fn slot_width(&self) -> i64 {
        self.slot_width
    }

    pub fn view_end(&self) -> i64 {
        self.view_end
    }

    pub fn window_start(&self) -> i64 {
        self.window_end - self.window_length
    }

    pub fn window_end(&self) -> i64 {
        self.window_end
    }

    /// Physical position of the `logical` slot (0 = oldest)
    fn physical(&self, logical: usize) -> usize {
        debug_assert!(logical < self.slots.len());
        (self.base_index + logical) % self.slots.len()
    }

    /// Logical position (0 = oldest) of the `physical` slot
    fn logical(&self, physical: usize) -> usize {
        debug_assert!(physical < self.slots.len());
        (physical + self.slots.len() - self.base_index) % self.slots.len()
    }

    fn values(&self, count: usize) -> Vec<f64> {
        (0..count)
            .map(|logical| self.slots[self.physical(logical)].stat.value())
            .collect()
    }
}

/// `(window_end, window_length)` of a fresh window, `None` on overflow
fn span(
    view_end: i64,
    slot_width: i64,
    num_future_slots: usize,
    capacity: usize,
) -> Option<(i64, i64)> {
    let future_length = i64::try_from(num_future_slots)
        .ok()?
        .checked_mul(slot_width)?;
    let window_end = view_end.checked_add(future_length)?;
    let window_length = i64::try_from(capacity).ok()?.checked_mul(slot_width)?;
    window_end.checked_sub(window_length)?;
    Some((window_end, window_length))
}

impl fmt::Display for SlidingWindow {
    /// Logical view of the window, view slots in parentheses
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SlidingWindow resolution = {} slot_width = {} view_end = {} slot_end = {} [(",
            self.resolution, self.slot_width, self.view_end, self.slot_end
        )?;

        let start = self.num_view_slots.saturating_sub(DISPLAYED_VIEW_SLOTS);
        if start != 0 {
            f.write_str("... ")?;
        }
        for logical in start..self.slots.len() {
            if logical == self.num_view_slots {
                f.write_str("), ")?;
            } else if logical != start {
                f.write_str(", ")?;
            }
            let slot = &self.slots[self.physical(logical)];
            write!(f, "{}={}", slot.timestamp, slot.stat)?;
        }
        if self.num_view_slots == self.slots.len() {
            f.write_str(")")?;
        }
        f.write_str("]")
    }
}
