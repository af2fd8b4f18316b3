//! Property tests for counter and histogram bookkeeping

mod common;

use common::{buckets, sample_sum};
use proptest::prelude::*;
use slowtask::metrics::{MetricsRegistry, REQUEST_DURATION_SECONDS, REQUESTS_TOTAL, RequestLabels};

const LABELS: RequestLabels<'static> = RequestLabels {
    method: "GET",
    route: "/slow",
    status_code: "200",
};

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn histogram_buckets_are_cumulative(values in prop::collection::vec(0.0f64..6.0, 1..50)) {
        let metrics = MetricsRegistry::new().unwrap();
        for v in &values {
            metrics.observe_histogram(REQUEST_DURATION_SECONDS, LABELS, *v).unwrap();
        }

        let exposition = metrics.render().unwrap();
        let series = buckets(&exposition, REQUEST_DURATION_SECONDS, &["route=\"/slow\""]);
        let n = values.len() as u64;
        let max = values.iter().cloned().fold(f64::MIN, f64::max);

        prop_assert_eq!(series.len(), metrics.buckets().len() + 1);
        for pair in series.windows(2) {
            prop_assert!(pair[0].0 < pair[1].0, "bounds ascend");
            prop_assert!(pair[0].1 <= pair[1].1, "counts never decrease");
        }
        for (le, count) in &series {
            let expected = values.iter().filter(|v| **v <= *le).count() as u64;
            prop_assert_eq!(*count, expected);
            if *le >= max {
                prop_assert_eq!(*count, n);
            }
        }

        let (count, sum) = metrics.histogram_totals(REQUEST_DURATION_SECONDS, LABELS).unwrap();
        prop_assert_eq!(count, n);
        prop_assert!((sum - values.iter().sum::<f64>()).abs() < 1e-6);
    }

    #[test]
    fn counter_equals_number_of_increments(k in 0u64..500, other in 0u64..50) {
        let metrics = MetricsRegistry::new().unwrap();
        let elsewhere = RequestLabels::new("GET", "/", "200");
        for _ in 0..k {
            metrics.increment_counter(REQUESTS_TOTAL, LABELS).unwrap();
        }
        for _ in 0..other {
            metrics.increment_counter(REQUESTS_TOTAL, elsewhere).unwrap();
        }

        // A series that was never incremented does not exist yet.
        let expected = |n: u64| (n > 0).then_some(n);
        prop_assert_eq!(metrics.counter_value(REQUESTS_TOTAL, LABELS), expected(k));
        prop_assert_eq!(metrics.counter_value(REQUESTS_TOTAL, elsewhere), expected(other));

        let exposition = metrics.render().unwrap();
        prop_assert_eq!(
            sample_sum(&exposition, REQUESTS_TOTAL, &["route=\"/slow\""]),
            k as f64
        );
    }
}
