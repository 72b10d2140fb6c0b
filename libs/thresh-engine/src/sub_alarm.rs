//! Windowed statistics and state of a single sub-expression

use thresh_expr::{AlarmState, AlarmSubExpression};
use thresh_stats::SlidingWindow;

use crate::config::EngineConfig;
use crate::error::Result;

/// Sliding window of one sub-expression plus its last evaluated state.
///
/// The view holds `periods` slots of `period` seconds each, aggregated with the
/// sub-expression's function.
#[derive(Debug, Clone)]
pub struct SubAlarmStats {
    sub_expression: AlarmSubExpression,
    window: SlidingWindow,
    min_delay: i64,
    state: AlarmState,
}

impl SubAlarmStats {
    /// Create statistics whose view ends at `view_end`
    pub fn new(
        sub_expression: AlarmSubExpression,
        config: &EngineConfig,
        view_end: i64,
    ) -> Result<Self> {
        let window = SlidingWindow::with_resolution(
            sub_expression.function().statistic_kind(),
            config.resolution,
            i64::from(sub_expression.period()) * config.time_unit(),
            sub_expression.periods() as usize,
            config.num_future_slots,
            view_end,
        )?;

        Ok(Self {
            sub_expression,
            window,
            min_delay: config.min_delay(),
            state: AlarmState::Undetermined,
        })
    }

    /// Add a sample; `false` when `timestamp` falls outside the window
    pub fn add_value(&mut self, value: f64, timestamp: i64) -> bool {
        self.window.add_value(value, timestamp, false)
    }

    /// Evaluate the completed view and slide past it.
    ///
    /// Until `now` is more than the configured delay past the view end, the
    /// previous state is returned unchanged.
    pub fn evaluate(&mut self, now: i64) -> AlarmState {
        if !self.window.should_evaluate(now, self.min_delay) {
            return self.state;
        }

        self.state = self.view_state();
        self.window.slide_view_to(now, self.min_delay);
        self.state
    }

    fn view_state(&self) -> AlarmState {
        let mut breached = false;
        let mut has_empty_slots = false;

        for value in self.window.get_view_values() {
            if value.is_nan() {
                has_empty_slots = true;
            } else if self.sub_expression.evaluate(value) {
                breached = true;
            } else {
                return AlarmState::Ok;
            }
        }

        if breached && !has_empty_slots {
            AlarmState::Alarm
        } else if !breached && self.sub_expression.is_deterministic() {
            AlarmState::Ok
        } else {
            AlarmState::Undetermined
        }
    }

    /// State computed by the last evaluation, `Undetermined` before the first
    pub fn state(&self) -> AlarmState {
        self.state
    }

    pub fn sub_expression(&self) -> &AlarmSubExpression {
        &self.sub_expression
    }

    pub fn window(&self) -> &SlidingWindow {
        &self.window
    }
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable
mod tests {
    use super::*;

    fn stats(text: &str, view_end: i64) -> SubAlarmStats {
        SubAlarmStats::new(
            AlarmSubExpression::of(text).unwrap(),
            &EngineConfig::default(),
            view_end,
        )
        .unwrap()
    }

    #[test]
    fn test_window_shape_follows_sub_expression() {
        let stats = stats("avg(cpu, 60) > 90 times 3", 180);
        assert_eq!(stats.window().slot_width(), 60);
        assert_eq!(stats.window().slot_count(), 5);
        assert_eq!(stats.window().view_end(), 180);
        assert_eq!(stats.window().window_start(), 0);
        assert_eq!(stats.state(), AlarmState::Undetermined);
    }

    #[test]
    fn test_alarm_when_every_slot_breaches() {
        let mut stats = stats("avg(cpu, 60) > 90 times 3", 180);
        for (value, timestamp) in [(95.0, 10), (99.0, 70), (91.0, 130)] {
            assert!(stats.add_value(value, timestamp));
        }

        // Within the delay nothing is evaluated
        assert_eq!(stats.evaluate(185), AlarmState::Undetermined);
        assert_eq!(stats.evaluate(195), AlarmState::Alarm);
        assert_eq!(stats.state(), AlarmState::Alarm);
        assert_eq!(stats.window().view_end(), 240);
    }

    #[test]
    fn test_ok_when_any_slot_clears() {
        let mut stats = stats("avg(cpu, 60) > 90 times 3", 180);
        stats.add_value(95.0, 10);
        stats.add_value(50.0, 130);

        assert_eq!(stats.evaluate(195), AlarmState::Ok);
    }

    #[test]
    fn test_undetermined_with_empty_slots() {
        let mut stats = stats("avg(cpu, 60) > 90 times 3", 180);
        stats.add_value(95.0, 10);
        stats.add_value(95.0, 130);

        assert_eq!(stats.evaluate(195), AlarmState::Undetermined);
    }

    #[test]
    fn test_deterministic_without_data_is_ok() {
        let mut stats = stats("count(log.error{}, deterministic, 60) > 5", 60);
        assert_eq!(stats.evaluate(75), AlarmState::Ok);

        let mut plain = self::stats("count(log.error{}, 60) > 5", 60);
        assert_eq!(plain.evaluate(75), AlarmState::Undetermined);
    }

    #[test]
    fn test_state_retained_until_next_view() {
        let mut stats = stats("max(cpu, 60) > 90", 60);
        stats.add_value(99.0, 30);
        assert_eq!(stats.evaluate(75), AlarmState::Alarm);

        // View now ends at 120; the old slot slid out of view
        assert_eq!(stats.evaluate(100), AlarmState::Alarm);
        stats.add_value(10.0, 90);
        assert_eq!(stats.evaluate(131), AlarmState::Ok);
    }

    #[test]
    fn test_oversized_window_is_an_error() {
        let config = EngineConfig {
            resolution: thresh_stats::TimeResolution::Seconds,
            ..Default::default()
        };
        let sub_expression = AlarmSubExpression::of("avg(m, 4294967295) > 1 times 2200000").unwrap();

        let err = SubAlarmStats::new(sub_expression, &config, 0).unwrap_err();
        assert!(matches!(
            err,
            crate::error::EngineError::Stats(thresh_stats::StatsError::InvalidWindow(_))
        ));
    }

    #[test]
    fn test_rejects_samples_outside_window() {
        let mut stats = stats("sum(bytes, 60) > 1000", 60);
        // Window covers [0, 180)
        assert!(!stats.add_value(1.0, -1));
        assert!(stats.add_value(1.0, 179));
        assert!(!stats.add_value(1.0, 180));
        assert!(!stats.add_value(1.0, i64::MIN));
        assert!(!stats.add_value(1.0, i64::MAX));
    }
}
