//! Metrics registry for goapp.
//!
//! All metrics follow Prometheus naming conventions:
//! - `goapp_` prefix
//! - `_total` suffix for counters
//!
//! # Registry
//!
//! Each [`MetricsRegistry`] owns its own Prometheus recorder instead of
//! installing one globally, so every test can build an isolated registry.
//! Declaring the same family name twice is a configuration error.
//!
//! # Cardinality
//!
//! Labels are bounded:
//! - `course`: constant `fullcycle`
//! - `handler`: 2 values (home, contact)

use crate::errors::MetricsError;
use metrics::{Counter, Gauge, Histogram, Key, Label, Level, Metadata, Recorder};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle, PrometheusRecorder};
use std::collections::HashSet;

/// Gauge of simulated online users.
pub const ONLINE_USERS: &str = "goapp_online_users";

/// Counter of completed requests to instrumented handlers.
pub const HTTP_REQUESTS_TOTAL: &str = "goapp_http_requests_total";

/// Histogram of instrumented handler durations, in seconds.
pub const HTTP_REQUESTS_DURATION: &str = "goapp_http_requests_duration";

/// Label naming the handler that produced a duration observation.
pub const HANDLER_LABEL: &str = "handler";

/// Conventional Prometheus client default buckets, in seconds.
pub const DEFAULT_BUCKETS: &[f64] = &[
    0.005, 0.010, 0.025, 0.050, 0.100, 0.250, 0.500, 1.000, 2.500, 5.000, 10.000,
];

static COURSE_LABELS: [Label; 1] = [Label::from_static_parts("course", "fullcycle")];

static METADATA: Metadata<'static> =
    Metadata::new(module_path!(), Level::INFO, Some(module_path!()));

// ============================================================================
// Registry
// ============================================================================

/// One Prometheus recorder plus the names of the families declared on it.
pub struct MetricsRegistry {
    recorder: PrometheusRecorder,
    handle: PrometheusHandle,
    registered: HashSet<&'static str>,
}

impl MetricsRegistry {
    /// Registry whose histograms use [`DEFAULT_BUCKETS`].
    pub fn new() -> Result<Self, MetricsError> {
        Self::with_buckets(DEFAULT_BUCKETS)
    }

    /// Registry whose histograms use the given bucket upper bounds.
    ///
    /// # Errors
    ///
    /// Returns `MetricsError::BucketConfiguration` if the buckets are empty,
    /// non-finite or not strictly increasing.
    pub fn with_buckets(buckets: &[f64]) -> Result<Self, MetricsError> {
        if buckets.iter().any(|b| !b.is_finite()) {
            return Err(MetricsError::BucketConfiguration(
                "bucket bounds must be finite".to_string(),
            ));
        }
        if buckets.windows(2).any(|w| matches!(w, [a, b] if a >= b)) {
            return Err(MetricsError::BucketConfiguration(
                "bucket bounds must be strictly increasing".to_string(),
            ));
        }

        let recorder = PrometheusBuilder::new()
            .set_buckets(buckets)
            .map_err(|e| MetricsError::BucketConfiguration(e.to_string()))?
            .build_recorder();

        Ok(Self {
            handle: recorder.handle(),
            recorder,
            registered: HashSet::new(),
        })
    }

    /// Declare a gauge family and return its single series.
    pub fn register_gauge(
        &mut self,
        name: &'static str,
        help: &'static str,
        labels: &'static [Label],
    ) -> Result<Gauge, MetricsError> {
        self.claim(name)?;
        self.recorder.describe_gauge(name.into(), None, help.into());
        Ok(self
            .recorder
            .register_gauge(&Key::from_static_parts(name, labels), &METADATA))
    }

    /// Declare an unlabelled counter family and return its series.
    pub fn register_counter(
        &mut self,
        name: &'static str,
        help: &'static str,
    ) -> Result<Counter, MetricsError> {
        self.claim(name)?;
        self.recorder.describe_counter(name.into(), None, help.into());
        Ok(self
            .recorder
            .register_counter(&Key::from_static_name(name), &METADATA))
    }

    /// Declare a histogram family. Series are resolved per label value
    /// with [`MetricsRegistry::histogram`].
    pub fn register_histogram(
        &mut self,
        name: &'static str,
        help: &'static str,
    ) -> Result<(), MetricsError> {
        self.claim(name)?;
        self.recorder.describe_histogram(name.into(), None, help.into());
        Ok(())
    }

    /// Handle to one histogram series.
    pub fn histogram(&self, key: &Key) -> Histogram {
        self.recorder.register_histogram(key, &METADATA)
    }

    /// Render every family in Prometheus text exposition format.
    pub fn render(&self) -> String {
        self.handle.render()
    }

    /// Drain buffered histogram samples into their buckets.
    pub fn run_upkeep(&self) {
        self.handle.run_upkeep();
    }

    fn claim(&mut self, name: &'static str) -> Result<(), MetricsError> {
        if !self.registered.insert(name) {
            return Err(MetricsError::DuplicateRegistration(name.to_string()));
        }
        Ok(())
    }
}

// ============================================================================
// goapp instruments
// ============================================================================

/// The three goapp instruments, created once at startup.
pub struct GoappMetrics {
    registry: MetricsRegistry,
    online_users: Gauge,
    requests_total: Counter,
}

impl GoappMetrics {
    /// Register the online-users gauge, the request counter and the request
    /// duration histogram on a fresh registry.
    ///
    /// # Errors
    ///
    /// Fails fast on any registration error, before traffic is served.
    pub fn new() -> Result<Self, MetricsError> {
        let mut registry = MetricsRegistry::new()?;

        let online_users = registry.register_gauge(ONLINE_USERS, "Online users", &COURSE_LABELS)?;
        let requests_total =
            registry.register_counter(HTTP_REQUESTS_TOTAL, "Count of all HTTP requests for goapp")?;
        registry.register_histogram(
            HTTP_REQUESTS_DURATION,
            "Duration in seconds of all HTTP requests",
        )?;

        Ok(Self {
            registry,
            online_users,
            requests_total,
        })
    }

    /// Overwrite the online-users gauge. Last write wins.
    pub fn set_online_users(&self, value: u32) {
        self.online_users.set(f64::from(value));
    }

    /// Shared handle to the request counter.
    pub fn requests_counter(&self) -> Counter {
        self.requests_total.clone()
    }

    /// Duration histogram series for one handler.
    pub fn request_duration(&self, handler: &str) -> Histogram {
        let key = Key::from_parts(
            HTTP_REQUESTS_DURATION,
            vec![Label::new(HANDLER_LABEL, handler.to_string())],
        );
        self.registry.histogram(&key)
    }

    pub fn render(&self) -> String {
        self.registry.render()
    }

    pub fn run_upkeep(&self) {
        self.registry.run_upkeep();
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn sample_value(rendered: &str, prefix: &str) -> Option<f64> {
        rendered
            .lines()
            .find(|line| line.starts_with(prefix))?
            .rsplit(' ')
            .next()?
            .parse()
            .ok()
    }

    #[test]
    fn test_goapp_metrics_registers_three_families() {
        let metrics = GoappMetrics::new().expect("registry should build");
        metrics.set_online_users(42);
        metrics.requests_counter().increment(1);
        metrics.request_duration("home").record(0.12);

        let rendered = metrics.render();
        assert!(rendered.contains("# TYPE goapp_online_users gauge"));
        assert!(rendered.contains("# TYPE goapp_http_requests_total counter"));
        assert!(rendered.contains("# TYPE goapp_http_requests_duration histogram"));
        assert!(rendered.contains("# HELP goapp_online_users Online users"));
        assert!(rendered.contains(
            "# HELP goapp_http_requests_total Count of all HTTP requests for goapp"
        ));
    }

    #[test]
    fn test_online_users_carries_course_label() {
        let metrics = GoappMetrics::new().unwrap();
        metrics.set_online_users(1999);

        let rendered = metrics.render();
        assert_eq!(
            sample_value(&rendered, "goapp_online_users{course=\"fullcycle\"}"),
            Some(1999.0)
        );
    }

    #[test]
    fn test_online_users_last_write_wins() {
        let metrics = GoappMetrics::new().unwrap();
        metrics.set_online_users(10);
        metrics.set_online_users(700);
        metrics.set_online_users(3);

        let rendered = metrics.render();
        assert_eq!(
            sample_value(&rendered, "goapp_online_users{course=\"fullcycle\"}"),
            Some(3.0)
        );
    }

    #[test]
    fn test_request_counter_handles_share_one_series() {
        let metrics = GoappMetrics::new().unwrap();
        let first = metrics.requests_counter();
        let second = metrics.requests_counter();
        for _ in 0..5 {
            first.increment(1);
        }
        second.increment(2);

        let rendered = metrics.render();
        assert_eq!(sample_value(&rendered, "goapp_http_requests_total "), Some(7.0));
    }

    #[test]
    fn test_request_counter_concurrent_increments_are_not_lost() {
        let metrics = GoappMetrics::new().unwrap();
        let threads: Vec<_> = (0..8)
            .map(|_| {
                let counter = metrics.requests_counter();
                std::thread::spawn(move || {
                    for _ in 0..1000 {
                        counter.increment(1);
                    }
                })
            })
            .collect();
        for t in threads {
            t.join().unwrap();
        }

        let rendered = metrics.render();
        assert_eq!(
            sample_value(&rendered, "goapp_http_requests_total "),
            Some(8000.0)
        );
    }

    #[test]
    fn test_request_duration_is_split_by_handler() {
        let metrics = GoappMetrics::new().unwrap();
        metrics.request_duration("home").record(0.003);
        metrics.request_duration("home").record(0.7);
        metrics.request_duration("contact").record(4.2);

        let rendered = metrics.render();
        assert_eq!(
            sample_value(
                &rendered,
                "goapp_http_requests_duration_count{handler=\"home\"}"
            ),
            Some(2.0)
        );
        assert_eq!(
            sample_value(
                &rendered,
                "goapp_http_requests_duration_count{handler=\"contact\"}"
            ),
            Some(1.0)
        );
        // 3ms falls in the first bucket, 700ms does not
        assert_eq!(
            sample_value(
                &rendered,
                "goapp_http_requests_duration_bucket{handler=\"home\",le=\"0.005\"}"
            ),
            Some(1.0)
        );
        assert_eq!(
            sample_value(
                &rendered,
                "goapp_http_requests_duration_bucket{handler=\"contact\",le=\"5\"}"
            ),
            Some(1.0)
        );
    }

    #[test]
    fn test_duplicate_registration_is_rejected() {
        let mut registry = MetricsRegistry::new().unwrap();
        registry
            .register_counter(HTTP_REQUESTS_TOTAL, "first")
            .unwrap();

        let result = registry.register_gauge(HTTP_REQUESTS_TOTAL, "second", &[]);
        assert!(matches!(
            result,
            Err(MetricsError::DuplicateRegistration(name)) if name == HTTP_REQUESTS_TOTAL
        ));

        let result = registry.register_histogram(HTTP_REQUESTS_TOTAL, "third");
        assert!(matches!(
            result,
            Err(MetricsError::DuplicateRegistration(_))
        ));
    }

    #[test]
    fn test_invalid_buckets_are_rejected() {
        assert!(matches!(
            MetricsRegistry::with_buckets(&[]),
            Err(MetricsError::BucketConfiguration(_))
        ));
        assert!(matches!(
            MetricsRegistry::with_buckets(&[0.5, 0.1]),
            Err(MetricsError::BucketConfiguration(_))
        ));
        assert!(matches!(
            MetricsRegistry::with_buckets(&[0.1, f64::INFINITY]),
            Err(MetricsError::BucketConfiguration(_))
        ));
    }

    #[test]
    fn test_registries_are_isolated() {
        let first = GoappMetrics::new().unwrap();
        let second = GoappMetrics::new().unwrap();
        first.requests_counter().increment(1);

        assert_eq!(
            sample_value(&first.render(), "goapp_http_requests_total "),
            Some(1.0)
        );
        assert_eq!(
            sample_value(&second.render(), "goapp_http_requests_total "),
            Some(0.0)
        );
    }

    #[test]
    fn test_run_upkeep_keeps_observations() {
        let metrics = GoappMetrics::new().unwrap();
        metrics.request_duration("contact").record(1.0);
        metrics.run_upkeep();

        assert_eq!(
            sample_value(
                &metrics.render(),
                "goapp_http_requests_duration_count{handler=\"contact\"}"
            ),
            Some(1.0)
        );
    }
}
