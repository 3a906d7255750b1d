#![cfg(test)]

use std::time::Duration;

use rivulet::core::Runtime;
use rivulet::demos;

#[test]
fn hundred_thousand_threads_wake_on_one_binding() {
    let runtime = Runtime::default();

    let num_completed = demos::fan_out(&runtime, 100_000, Some(Duration::from_secs(120))).unwrap();

    assert_eq!(100_000, num_completed);
    assert_eq!(0, runtime.num_live_threads());
    assert_eq!(100_000, runtime.statistics().num_terminated);
    // Only the shared gate; threads take no room in the store.
    assert_eq!(1, runtime.store().len());
}

#[test]
fn pipeline_streams_through_partial_lists() {
    let runtime = Runtime::default();

    let sum = demos::pipeline(&runtime, 10_000, Some(Duration::from_secs(60))).unwrap();

    assert_eq!(Some(50_005_000), sum);
}
