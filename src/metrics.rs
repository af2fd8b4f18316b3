//! Prometheus metrics collection for slowtask
//!
//! This module tracks, per request:
//! - Request counts by method, route and status code
//! - Request latency by method, route and status code
//!
//! Metrics are exposed via the `/metrics` endpoint in Prometheus text format.
//!
//! Metric families are created the first time a name is used and then live
//! for as long as the registry does. Individual label combinations are never
//! removed.

use prometheus::proto::{Metric, MetricFamily};
use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder,
};
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

/// Counter of handled requests
pub const REQUESTS_TOTAL: &str = "http_requests_total";

/// Histogram of request latency
pub const REQUEST_DURATION_SECONDS: &str = "http_request_duration_seconds";

/// Label keys, in the order values are passed to [`RequestLabels`]
pub const LABEL_NAMES: [&str; 3] = ["method", "route", "status_code"];

/// Default latency buckets in seconds
///
/// Every simulated task duration (100ms - 3s) is itself a bound, so two
/// different task durations never share a bucket. Real requests add some
/// overhead on top of the task and land one bucket above its duration.
pub const DEFAULT_BUCKETS: [f64; 14] = [
    0.005, 0.01, 0.05, 0.1, 0.15, 0.2, 0.25, 0.3, 0.5, 1.0, 1.5, 2.0, 3.0, 5.0,
];

/// Label values identifying one request series
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestLabels<'a> {
    pub method: &'a str,
    /// Raw request path, not normalized
    pub route: &'a str,
    pub status_code: &'a str,
}

impl<'a> RequestLabels<'a> {
    pub fn new(method: &'a str, route: &'a str, status_code: &'a str) -> Self {
        Self {
            method,
            route,
            status_code,
        }
    }

    fn values(&self) -> [&'a str; 3] {
        [self.method, self.route, self.status_code]
    }
}

/// Metrics registry for the service
///
/// Owns a Prometheus [`Registry`] plus every counter and histogram family
/// recorded so far. Shared through `Arc` by the middleware and the
/// `/metrics` handler.
///
/// The metric vectors are internally atomic. `recording` is held shared by
/// every write and exclusively by every read, so a scrape never sees a
/// request counted but not yet timed. `counters`/`histograms` only guard
/// creation of new families.
pub struct MetricsRegistry {
    registry: Registry,
    buckets: Vec<f64>,
    recording: RwLock<()>,
    counters: RwLock<HashMap<String, IntCounterVec>>,
    histograms: RwLock<HashMap<String, HistogramVec>>,
}

impl MetricsRegistry {
    /// Create a registry with [`DEFAULT_BUCKETS`]
    ///
    /// # Errors
    ///
    /// Returns an error if metric registration fails.
    pub fn new() -> Result<Self, prometheus::Error> {
        Self::with_buckets(DEFAULT_BUCKETS.to_vec())
    }

    /// Create a registry whose histograms use `buckets` as upper bounds
    ///
    /// The request counter and latency histogram are registered up front so
    /// their HELP text is fixed; on Linux the process collector is added as
    /// well (CPU time, resident memory, open file descriptors).
    ///
    /// # Errors
    ///
    /// Returns an error if `buckets` is empty or not strictly increasing,
    /// or if registration fails.
    pub fn with_buckets(buckets: Vec<f64>) -> Result<Self, prometheus::Error> {
        if buckets.is_empty() {
            return Err(prometheus::Error::Msg(
                "histogram needs at least one bucket".to_string(),
            ));
        }
        if buckets.windows(2).any(|pair| pair[0] >= pair[1]) {
            return Err(prometheus::Error::Msg(format!(
                "histogram buckets must be strictly increasing, got: {:?}",
                buckets
            )));
        }

        let metrics = Self {
            registry: Registry::new(),
            buckets,
            recording: RwLock::new(()),
            counters: RwLock::new(HashMap::new()),
            histograms: RwLock::new(HashMap::new()),
        };

        metrics.counter(REQUESTS_TOTAL)?;
        metrics.histogram(REQUEST_DURATION_SECONDS)?;

        #[cfg(target_os = "linux")]
        metrics.registry.register(Box::new(
            prometheus::process_collector::ProcessCollector::for_self(),
        ))?;

        Ok(metrics)
    }

    /// Histogram bucket upper bounds, ascending
    pub fn buckets(&self) -> &[f64] {
        &self.buckets
    }

    /// Add one to the counter `name` for `labels`
    ///
    /// Creates the family and the labeled series on first use.
    ///
    /// # Errors
    ///
    /// Returns an error if `name` is not a valid metric name or is already
    /// registered as a histogram.
    pub fn increment_counter(
        &self,
        name: &str,
        labels: RequestLabels<'_>,
    ) -> Result<(), prometheus::Error> {
        let _recording = self.recording.read().unwrap_or_else(PoisonError::into_inner);
        self.inc(name, labels)
    }

    /// Record `value` in the histogram `name` for `labels`
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `value` is NaN, infinite, or negative
    /// - `name` is invalid or already registered as a counter
    pub fn observe_histogram(
        &self,
        name: &str,
        labels: RequestLabels<'_>,
        value: f64,
    ) -> Result<(), prometheus::Error> {
        let _recording = self.recording.read().unwrap_or_else(PoisonError::into_inner);
        self.observe(name, labels, value)
    }

    /// Record one handled request: a count and its latency
    ///
    /// # Errors
    ///
    /// Returns the first recording error. The value is checked before
    /// anything is written, so an invalid duration leaves both series alone.
    ///
    /// Both updates happen under one shared `recording` guard: a concurrent
    /// [`render`](Self::render) sees either neither or both.
    pub fn record_request(
        &self,
        labels: RequestLabels<'_>,
        elapsed_seconds: f64,
    ) -> Result<(), prometheus::Error> {
        check_observation(elapsed_seconds)?;

        let _recording = self.recording.read().unwrap_or_else(PoisonError::into_inner);
        self.inc(REQUESTS_TOTAL, labels)?;
        self.observe(REQUEST_DURATION_SECONDS, labels, elapsed_seconds)
    }

    /// Current value of a counter series
    ///
    /// Returns `None` if the series has never been recorded. Reading never
    /// creates a series.
    pub fn counter_value(&self, name: &str, labels: RequestLabels<'_>) -> Option<u64> {
        self.with_series(name, labels, |m| m.counter.value.unwrap_or(0.0) as u64)
    }

    /// Sum of a counter across every label combination
    pub fn counter_total(&self, name: &str) -> u64 {
        self.snapshot()
            .iter()
            .find(|mf| mf.name() == name)
            .map(|mf| {
                mf.get_metric()
                    .iter()
                    .map(|m| m.counter.value.unwrap_or(0.0) as u64)
                    .sum()
            })
            .unwrap_or(0)
    }

    /// Number of observations and their sum for a histogram series
    ///
    /// Returns `None` if the series has never been recorded.
    pub fn histogram_totals(&self, name: &str, labels: RequestLabels<'_>) -> Option<(u64, f64)> {
        self.with_series(name, labels, |m| {
            (
                m.histogram.sample_count.unwrap_or(0),
                m.histogram.sample_sum.unwrap_or(0.0),
            )
        })
    }

    /// Encode every known series in Prometheus text format
    ///
    /// Families come out sorted by name and series sorted by label values,
    /// so the output for a given state is stable.
    ///
    /// # Errors
    ///
    /// Returns an error if metric encoding fails.
    pub fn render(&self) -> Result<String, prometheus::Error> {
        let metric_families = self.snapshot();

        tracing::debug!(
            metric_family_count = metric_families.len(),
            "Encoding metrics to Prometheus text format"
        );

        let mut buffer = Vec::new();
        TextEncoder::new()
            .encode(&metric_families, &mut buffer)
            .inspect_err(|e| tracing::error!(error = %e, "Prometheus text encoder failed"))?;

        String::from_utf8(buffer).map_err(|e| {
            prometheus::Error::Msg(format!("Prometheus encoder produced invalid UTF-8: {}", e))
        })
    }

    /// Content type to send alongside [`render`](Self::render)
    pub fn content_type(&self) -> &'static str {
        prometheus::TEXT_FORMAT
    }

    /// Gather every family while no recording is in flight
    fn snapshot(&self) -> Vec<MetricFamily> {
        let _recording = self.recording.write().unwrap_or_else(PoisonError::into_inner);
        self.registry.gather()
    }

    fn with_series<T>(
        &self,
        name: &str,
        labels: RequestLabels<'_>,
        read: impl FnOnce(&Metric) -> T,
    ) -> Option<T> {
        let wanted = labels.values();
        let families = self.snapshot();
        let family = families.iter().find(|mf| mf.name() == name)?;
        family
            .get_metric()
            .iter()
            .find(|m| has_labels(m, &wanted))
            .map(read)
    }

    fn inc(&self, name: &str, labels: RequestLabels<'_>) -> Result<(), prometheus::Error> {
        self.counter(name)?
            .get_metric_with_label_values(&labels.values())?
            .inc();
        Ok(())
    }

    fn observe(
        &self,
        name: &str,
        labels: RequestLabels<'_>,
        value: f64,
    ) -> Result<(), prometheus::Error> {
        check_observation(value)?;
        self.histogram(name)?
            .get_metric_with_label_values(&labels.values())?
            .observe(value);
        Ok(())
    }

    fn counter(&self, name: &str) -> Result<IntCounterVec, prometheus::Error> {
        if let Some(family) = self
            .counters
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
        {
            return Ok(family.clone());
        }

        let mut counters = self.counters.write().unwrap_or_else(PoisonError::into_inner);
        // Another request may have created it between the two locks.
        if let Some(family) = counters.get(name) {
            return Ok(family.clone());
        }

        let family = IntCounterVec::new(Opts::new(name, help_text(name)), &LABEL_NAMES)?;
        self.registry.register(Box::new(family.clone()))?;
        counters.insert(name.to_string(), family.clone());
        Ok(family)
    }

    fn histogram(&self, name: &str) -> Result<HistogramVec, prometheus::Error> {
        if let Some(family) = self
            .histograms
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
        {
            return Ok(family.clone());
        }

        let mut histograms = self
            .histograms
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(family) = histograms.get(name) {
            return Ok(family.clone());
        }

        let family = HistogramVec::new(
            HistogramOpts::new(name, help_text(name)).buckets(self.buckets.clone()),
            &LABEL_NAMES,
        )?;
        self.registry.register(Box::new(family.clone()))?;
        histograms.insert(name.to_string(), family.clone());
        Ok(family)
    }
}

// NaN poisons the sum; negative values have no bucket meaning here.
fn check_observation(value: f64) -> Result<(), prometheus::Error> {
    if !value.is_finite() || value < 0.0 {
        return Err(prometheus::Error::Msg(format!(
            "Histogram value must be finite and non-negative, got: {}",
            value
        )));
    }
    Ok(())
}

fn has_labels(metric: &Metric, wanted: &[&str; 3]) -> bool {
    LABEL_NAMES.iter().zip(wanted).all(|(key, value)| {
        metric
            .label
            .iter()
            .any(|pair| pair.name() == *key && pair.value() == *value)
    })
}

fn help_text(name: &str) -> String {
    match name {
        REQUESTS_TOTAL => "Total number of HTTP requests by method, route and status code".into(),
        REQUEST_DURATION_SECONDS => {
            "HTTP request latency in seconds by method, route and status code".into()
        }
        other => format!("{} by method, route and status code", other),
    }
}
