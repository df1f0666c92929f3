// Counter-delta tracker tests

use hostconsole::rates::RateTracker;
use std::sync::Arc;
use std::time::{Duration, Instant};

#[test]
fn test_first_call_reports_zero_and_stores_baseline() {
    let tracker = RateTracker::new();
    let (a, b) = tracker.rate(1_000, 2_000, Instant::now());
    assert_eq!(a, 0.0);
    assert_eq!(b, 0.0);
    assert_eq!(tracker.last_sample(), Some((1_000, 2_000)));
}

#[test]
fn test_rate_is_delta_over_elapsed() {
    let tracker = RateTracker::new();
    let t0 = Instant::now();
    tracker.rate(1_000, 500, t0);
    let (a, b) = tracker.rate(11_000, 2_500, t0 + Duration::from_secs(2));
    assert_eq!(a, 5_000.0);
    assert_eq!(b, 1_000.0);
}

#[test]
fn test_interval_floored_to_one_second() {
    let tracker = RateTracker::new();
    let t0 = Instant::now();
    tracker.rate(0, 0, t0);
    // 100ms apart: divides by the 1s floor, never by ~0.1
    let (a, _) = tracker.rate(4_096, 0, t0 + Duration::from_millis(100));
    assert_eq!(a, 4_096.0);
}

#[test]
fn test_counter_reset_clamps_to_zero() {
    let tracker = RateTracker::new();
    let t0 = Instant::now();
    tracker.rate(10_000, 10_000, t0);
    let (a, b) = tracker.rate(100, 20_000, t0 + Duration::from_secs(5));
    assert_eq!(a, 0.0, "decreasing counter must clamp, not go negative");
    assert_eq!(b, 2_000.0);
}

#[test]
fn test_baseline_rolls_forward_each_call() {
    let tracker = RateTracker::new();
    let t0 = Instant::now();
    tracker.rate(0, 0, t0);
    tracker.rate(1_000, 1_000, t0 + Duration::from_secs(1));
    // Deltas come from the previous call, not the original baseline.
    let (a, b) = tracker.rate(1_500, 3_000, t0 + Duration::from_secs(2));
    assert_eq!(a, 500.0);
    assert_eq!(b, 2_000.0);
    assert_eq!(tracker.last_sample(), Some((1_500, 3_000)));
}

#[test]
fn test_sequence_matches_pairwise_delta_property() {
    let tracker = RateTracker::new();
    let t0 = Instant::now();
    let samples: [(u64, u64); 4] = [(0, 0), (1_024, 2_048), (4_096, 2_048), (4_096, 10_240)];
    let mut previous: Option<(u64, u64, u64)> = None;
    for (i, (a, b)) in samples.iter().enumerate() {
        let secs = (i as u64) * 3;
        let (ra, rb) = tracker.rate(*a, *b, t0 + Duration::from_secs(secs));
        match previous {
            None => {
                assert_eq!((ra, rb), (0.0, 0.0));
            }
            Some((pa, pb, psecs)) => {
                let elapsed = ((secs - psecs) as f64).max(1.0);
                assert_eq!(ra, (a - pa) as f64 / elapsed);
                assert_eq!(rb, (b - pb) as f64 / elapsed);
            }
        }
        previous = Some((*a, *b, secs));
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn test_concurrent_callers_do_not_corrupt_baseline() {
    let tracker = Arc::new(RateTracker::new());
    let mut handles = Vec::new();
    for i in 0..32u64 {
        let tracker = tracker.clone();
        handles.push(tokio::spawn(async move {
            tracker.rate(i * 100, i * 200, Instant::now());
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }
    // The stored baseline is whatever sample completed last: it must be one
    // of the submitted pairs, never a torn mix of two.
    let (a, b) = tracker.last_sample().expect("baseline stored");
    assert_eq!(b, a * 2, "baseline must come from a single sample");
    assert!(a % 100 == 0 && a / 100 < 32);
}
