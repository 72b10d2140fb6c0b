//! Alarm evaluation over a compiled expression

use rustc_hash::FxHashMap;

use thresh_expr::{
    AlarmExpression, AlarmSeverity, AlarmState, AlarmSubExpression, MetricDefinition,
};

use crate::config::EngineConfig;
use crate::error::Result;
use crate::sub_alarm::SubAlarmStats;

/// Evaluates one alarm expression from the samples routed into it.
///
/// Holds a [`SubAlarmStats`] per leaf of the expression, in leaf order.
#[derive(Debug, Clone)]
pub struct AlarmEvaluator {
    expression: AlarmExpression,
    severity: AlarmSeverity,
    sub_alarms: Vec<SubAlarmStats>,
    state: AlarmState,
}

impl AlarmEvaluator {
    pub fn new(expression: AlarmExpression, config: &EngineConfig, view_end: i64) -> Result<Self> {
        let sub_alarms = expression
            .sub_expressions()
            .iter()
            .map(|sub_expression| SubAlarmStats::new(sub_expression.clone(), config, view_end))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            expression,
            severity: AlarmSeverity::default(),
            sub_alarms,
            state: AlarmState::Undetermined,
        })
    }

    /// Severity reported with every state change, `LOW` unless set
    pub fn with_severity(mut self, severity: AlarmSeverity) -> Self {
        self.severity = severity;
        self
    }

    /// Route a sample to every sub-alarm whose metric matches it.
    ///
    /// Returns the number of windows that accepted the sample.
    pub fn add_sample(&mut self, metric: &MetricDefinition, value: f64, timestamp: i64) -> usize {
        self.sub_alarms
            .iter_mut()
            .filter(|sub_alarm| sub_alarm.sub_expression().metric_definition().matches(metric))
            .map(|sub_alarm| sub_alarm.add_value(value, timestamp))
            .filter(|accepted| *accepted)
            .count()
    }

    /// Evaluate every sub-alarm at `now` and combine their states.
    ///
    /// ALARM when the expression holds with `state == ALARM` per leaf; otherwise
    /// UNDETERMINED while any sub-alarm is undetermined, else OK.
    pub fn evaluate(&mut self, now: i64) -> Result<AlarmState> {
        let mut values: FxHashMap<AlarmSubExpression, bool> = FxHashMap::default();
        let mut undetermined = false;

        for sub_alarm in &mut self.sub_alarms {
            let state = sub_alarm.evaluate(now);
            undetermined |= state == AlarmState::Undetermined;
            values.insert(sub_alarm.sub_expression().clone(), state == AlarmState::Alarm);
        }

        let new_state = if self.expression.evaluate(&values)? {
            AlarmState::Alarm
        } else if undetermined {
            AlarmState::Undetermined
        } else {
            AlarmState::Ok
        };

        if new_state != self.state {
            tracing::info!(
                expression = %self.expression,
                severity = %self.severity,
                from = %self.state,
                to = %new_state,
                "Alarm state changed"
            );
            self.state = new_state;
        }
        Ok(new_state)
    }

    pub fn state(&self) -> AlarmState {
        self.state
    }

    pub fn severity(&self) -> AlarmSeverity {
        self.severity
    }

    pub fn expression(&self) -> &AlarmExpression {
        &self.expression
    }

    /// Per-leaf statistics, in leaf order
    pub fn sub_alarms(&self) -> &[SubAlarmStats] {
        &self.sub_alarms
    }
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable
mod tests {
    use super::*;
    use tracing_test::traced_test;

    fn evaluator(text: &str) -> AlarmEvaluator {
        AlarmEvaluator::new(
            AlarmExpression::new(text).unwrap(),
            &EngineConfig::default(),
            60,
        )
        .unwrap()
    }

    #[test]
    fn test_one_sub_alarm_per_leaf() {
        let evaluator = evaluator("max(cpu) > 90 or max(mem) > 80 and max(disk) > 70");
        assert_eq!(evaluator.sub_alarms().len(), 3);
        assert_eq!(evaluator.state(), AlarmState::Undetermined);
        assert_eq!(evaluator.severity(), AlarmSeverity::Low);
    }

    #[test]
    fn test_samples_routed_by_metric() {
        let mut evaluator = evaluator("max(cpu{host=a}) > 90 or avg(cpu) > 50");
        let host_a = MetricDefinition::named("cpu").with_dimension("host", "a");
        let host_b = MetricDefinition::named("cpu").with_dimension("host", "b");

        assert_eq!(evaluator.add_sample(&host_a, 95.0, 30), 2);
        assert_eq!(evaluator.add_sample(&host_b, 95.0, 30), 1);
        assert_eq!(evaluator.add_sample(&MetricDefinition::named("mem"), 1.0, 30), 0);
        // Outside every window
        assert_eq!(evaluator.add_sample(&host_a, 95.0, 1_000), 0);
    }

    #[test]
    #[traced_test]
    fn test_alarm_and_recovery() {
        let mut evaluator = evaluator("max(cpu) > 90 and max(mem) > 80");
        let cpu = MetricDefinition::named("cpu");
        let mem = MetricDefinition::named("mem");

        evaluator.add_sample(&cpu, 95.0, 30);
        evaluator.add_sample(&mem, 85.0, 30);
        assert_eq!(evaluator.evaluate(75).unwrap(), AlarmState::Alarm);
        assert!(logs_contain("Alarm state changed"));

        evaluator.add_sample(&cpu, 10.0, 90);
        evaluator.add_sample(&mem, 85.0, 90);
        assert_eq!(evaluator.evaluate(131).unwrap(), AlarmState::Ok);
        assert_eq!(evaluator.state(), AlarmState::Ok);
    }

    #[test]
    #[traced_test]
    fn test_severity_reported_on_transition() {
        let mut evaluator =
            evaluator("max(disk) > 95").with_severity(AlarmSeverity::Critical);
        assert_eq!(evaluator.severity(), AlarmSeverity::Critical);

        evaluator.add_sample(&MetricDefinition::named("disk"), 99.0, 30);
        assert_eq!(evaluator.evaluate(75).unwrap(), AlarmState::Alarm);
        assert!(logs_contain("severity=CRITICAL"));
    }

    #[test]
    fn test_undetermined_while_data_missing() {
        let mut evaluator = evaluator("max(cpu) > 90 and max(mem) > 80");
        evaluator.add_sample(&MetricDefinition::named("cpu"), 95.0, 30);

        assert_eq!(evaluator.evaluate(75).unwrap(), AlarmState::Undetermined);
    }

    #[test]
    fn test_or_alarms_despite_missing_data() {
        let mut evaluator = evaluator("max(cpu) > 90 or max(mem) > 80");
        evaluator.add_sample(&MetricDefinition::named("cpu"), 95.0, 30);

        assert_eq!(evaluator.evaluate(75).unwrap(), AlarmState::Alarm);
    }
}
