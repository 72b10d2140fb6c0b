//! Streaming evaluation with millisecond timestamps and file configuration

#![allow(clippy::disallowed_methods)] // Integration test - unwrap is acceptable

use tempfile::TempDir;
use thresh_engine::{init_logging, load_config_from_file, AlarmEvaluator, EngineConfig};
use thresh_expr::{AlarmExpression, AlarmState, MetricDefinition};
use thresh_stats::TimeResolution;

const SECOND: i64 = 1_000;
const MINUTE: i64 = 60 * SECOND;

fn millisecond_config() -> EngineConfig {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("engine.yaml");
    std::fs::write(
        &path,
        "resolution: seconds\nmin_delay_secs: 10\nnum_future_slots: 2\n",
    )
    .unwrap();
    load_config_from_file(&path).unwrap()
}

#[test]
fn test_compound_alarm_over_time() {
    let config = millisecond_config();
    assert_eq!(config.resolution, TimeResolution::Seconds);

    let expression = AlarmExpression::new(
        "avg(cpu{host=web1}, 60) > 80 times 2 or count(errors{}, deterministic, 60) > 3",
    )
    .unwrap();
    let mut evaluator = AlarmEvaluator::new(expression, &config, 2 * MINUTE).unwrap();

    let cpu = MetricDefinition::named("cpu")
        .with_dimension("host", "web1")
        .with_dimension("region", "east");
    let errors = MetricDefinition::named("errors");

    assert_eq!(evaluator.add_sample(&cpu, 85.0, 10 * SECOND + 500), 1);
    assert_eq!(evaluator.add_sample(&cpu, 90.0, MINUTE + 250), 1);

    // Grace period not yet over
    assert_eq!(
        evaluator.evaluate(2 * MINUTE + 10 * SECOND).unwrap(),
        AlarmState::Undetermined
    );
    // cpu breaches both periods; no errors reads as OK for a deterministic count
    assert_eq!(
        evaluator.evaluate(2 * MINUTE + 10 * SECOND + 1).unwrap(),
        AlarmState::Alarm
    );
    assert_eq!(evaluator.sub_alarms()[0].window().view_end(), 3 * MINUTE);

    evaluator.add_sample(&cpu, 20.0, 2 * MINUTE + 10 * SECOND);
    assert_eq!(
        evaluator.evaluate(3 * MINUTE + 10 * SECOND + 1).unwrap(),
        AlarmState::Ok
    );

    for offset in 0..4 {
        assert_eq!(evaluator.add_sample(&errors, 1.0, 3 * MINUTE + 20 * SECOND + offset), 1);
    }
    assert_eq!(
        evaluator.evaluate(4 * MINUTE + 10 * SECOND + 1).unwrap(),
        AlarmState::Alarm
    );
    assert_eq!(evaluator.sub_alarms()[0].state(), AlarmState::Ok);
    assert_eq!(evaluator.sub_alarms()[1].state(), AlarmState::Alarm);
}

#[test]
fn test_late_samples_are_dropped() {
    let config = millisecond_config();
    let expression = AlarmExpression::new("max(latency, 60) > 500").unwrap();
    let mut evaluator = AlarmEvaluator::new(expression, &config, MINUTE).unwrap();
    let latency = MetricDefinition::named("latency");

    evaluator.add_sample(&latency, 700.0, 30 * SECOND);
    assert_eq!(
        evaluator.evaluate(MINUTE + 11 * SECOND).unwrap(),
        AlarmState::Alarm
    );

    // The window now starts one minute later
    assert_eq!(evaluator.add_sample(&latency, 900.0, 59 * SECOND), 0);
    assert_eq!(evaluator.add_sample(&latency, 100.0, MINUTE + 30 * SECOND), 1);
    assert_eq!(
        evaluator.evaluate(2 * MINUTE + 11 * SECOND).unwrap(),
        AlarmState::Ok
    );
}

#[test]
fn test_logging_initializes_once() {
    assert!(init_logging("info,thresh_engine=debug").is_ok());
    assert!(init_logging("info").is_err());
}
