//! Streaming scenarios for SlidingWindow

#![allow(clippy::disallowed_methods)] // Integration test - unwrap is acceptable

use thresh_stats::{SlidingWindow, StatisticKind, StatsError, TimeResolution};

const MINUTE: i64 = 60_000;

/// Feed one sample every 10s, sliding the view after each minute boundary
#[test]
fn test_minute_averages_over_stream() {
    let mut window = SlidingWindow::with_resolution(
        StatisticKind::Average,
        TimeResolution::Seconds,
        MINUTE,
        3,
        2,
        3 * MINUTE,
    )
    .unwrap();
    assert_eq!(window.window_start(), 0);

    for minute in 0..3 {
        for tick in 0..6 {
            let ts = minute * MINUTE + tick * 10_000 + 250;
            assert!(window.add_value((minute + 1) as f64 * 10.0, ts, false));
        }
    }
    assert_eq!(window.get_view_values(), vec![10.0, 20.0, 30.0]);

    // Samples for the next minute land in a future slot first
    for tick in 0..6 {
        assert!(window.add_value(40.0, 3 * MINUTE + tick * 10_000, false));
    }
    assert_eq!(window.get_view_values(), vec![10.0, 20.0, 30.0]);

    window.slide_view_to(4 * MINUTE, 1_000);
    assert_eq!(window.get_view_values(), vec![20.0, 30.0, 40.0]);
    assert_eq!(
        window.view_timestamps(),
        vec![2 * MINUTE, 3 * MINUTE, 4 * MINUTE]
    );
}

#[test]
fn test_late_sample_accepted_until_slot_expires() {
    let mut window = SlidingWindow::new(StatisticKind::Count, 10, 2, 1, 20).unwrap();

    window.slide_view_to(30, 0);
    // Slot [10, 20) is still the oldest view slot
    assert!(window.add_value(1.0, 15, false));
    assert_eq!(window.get_value(15).unwrap(), 1.0);

    window.slide_view_to(40, 0);
    assert!(!window.add_value(1.0, 15, false));
    assert_eq!(
        window.get_value(15),
        Err(StatsError::OutOfWindow { timestamp: 15 })
    );
}

#[test]
fn test_min_delay_holds_partial_slot_open() {
    let mut window = SlidingWindow::new(StatisticKind::Max, 60, 1, 1, 60).unwrap();

    // 20s into the next slot with 30s delay: not yet
    assert!(!window.should_evaluate(80, 30));
    window.slide_view_to(80, 30);
    assert_eq!(window.view_end(), 60);

    // 40s into the slot, beyond the delay: the partial slot counts as whole
    assert!(window.should_evaluate(100, 30));
    window.slide_view_to(100, 30);
    assert_eq!(window.view_end(), 120);
}

#[test]
fn test_last_follows_timestamps_not_arrival() {
    let mut window = SlidingWindow::new(StatisticKind::Last, 60, 1, 0, 60).unwrap();
    window.add_value(3.0, 50, false);
    window.add_value(1.0, 10, false);
    window.add_value(2.0, 30, false);
    assert_eq!(window.get_view_values(), vec![3.0]);
}

#[test]
fn test_display_reflects_slides() {
    let mut window = SlidingWindow::new(StatisticKind::Sum, 5, 2, 1, 10).unwrap();
    window.add_value(1.5, 7, false);
    window.slide_view_to(15, 0);
    assert_eq!(
        window.to_string(),
        "SlidingWindow resolution = absolute slot_width = 5 view_end = 15 slot_end = 15 \
         [(5=1.5, 10=NaN), 15=NaN]"
    );
}
