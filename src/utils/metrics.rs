#![forbid(unsafe_code)]

use prometheus::{Encoder, IntCounterVec, Opts, Registry, TextEncoder};
use std::fmt;

use crate::utils::errors::Errors;

// ***************************************************************************
//                                Constants
// ***************************************************************************
const REQUESTS_TOTAL      : &str = "app_requests_total";
const REQUESTS_TOTAL_HELP : &str = "Total number of HTTP requests";
const QUERIES_TOTAL       : &str = "db_query_total";
const QUERIES_TOTAL_HELP  : &str = "Total number of database queries";

// ***************************************************************************
//                                 Metrics
// ***************************************************************************
/** Process-wide counters.  Each Metrics value owns its own registry rather
 * than using the prometheus default one, so independent instances never see
 * each other's samples.  Counter increments are atomic, so a single instance
 * can be shared across concurrently running handlers.
 */
pub struct Metrics {
    registry: Registry,
    requests: IntCounterVec,
    queries: IntCounterVec,
}

impl Metrics {
    /// Create the registry and register both counter families.
    pub fn new() -> Result<Self, Errors> {
        let registry = Registry::new();

        let requests = IntCounterVec::new(
            Opts::new(REQUESTS_TOTAL, REQUESTS_TOTAL_HELP),
            &["endpoint", "method", "status_code"],
        )?;
        registry.register(Box::new(requests.clone()))?;

        let queries = IntCounterVec::new(
            Opts::new(QUERIES_TOTAL, QUERIES_TOTAL_HELP),
            &["query"],
        )?;
        registry.register(Box::new(queries.clone()))?;

        Ok(Self {registry, requests, queries})
    }

    /// Count one completed request.
    pub fn record_request(&self, endpoint: &str, method: &str, status_code: u16) {
        let status = status_code.to_string();
        self.requests.with_label_values(&[endpoint, method, status.as_str()]).inc();
    }

    /// Count one query, keyed by its literal text.  Call before executing.
    pub fn record_query(&self, query: &str) {
        self.queries.with_label_values(&[query]).inc();
    }

    #[cfg(test)]
    pub fn request_count(&self, endpoint: &str, method: &str, status_code: u16) -> u64 {
        let status = status_code.to_string();
        self.requests.with_label_values(&[endpoint, method, status.as_str()]).get()
    }

    #[cfg(test)]
    pub fn query_count(&self, query: &str) -> u64 {
        self.queries.with_label_values(&[query]).get()
    }

    /// Render every registered family in the prometheus text format.
    pub fn render(&self) -> Result<String, Errors> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer)
            .map_err(|e| Errors::MetricsError(prometheus::Error::Msg(e.to_string())))
    }

    /// The content type matching `render`'s output.
    pub fn content_type(&self) -> &'static str {
        prometheus::TEXT_FORMAT
    }
}

impl fmt::Debug for Metrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Metrics")
            .field("families", &[REQUESTS_TOTAL, QUERIES_TOTAL])
            .finish()
    }
}

// ***************************************************************************
//                                  Tests
// ***************************************************************************
#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use crate::utils::metrics::Metrics;

    #[test]
    fn counters_start_at_zero() {
        let metrics = Metrics::new().unwrap();
        assert_eq!(metrics.request_count("/", "GET", 200), 0);
        assert_eq!(metrics.query_count("SELECT 1"), 0);
    }

    #[test]
    fn label_sets_are_independent() {
        let metrics = Metrics::new().unwrap();
        metrics.record_request("/", "GET", 200);
        metrics.record_request("/", "GET", 200);
        metrics.record_request("/users", "GET", 200);
        assert_eq!(metrics.request_count("/", "GET", 200), 2);
        assert_eq!(metrics.request_count("/users", "GET", 200), 1);
        assert_eq!(metrics.request_count("/users", "GET", 500), 0);
    }

    #[test]
    fn instances_do_not_share_state() {
        let first = Metrics::new().unwrap();
        let second = Metrics::new().unwrap();
        first.record_query("SELECT 1");
        assert_eq!(first.query_count("SELECT 1"), 1);
        assert_eq!(second.query_count("SELECT 1"), 0);
    }

    #[test]
    fn render_uses_exposition_lines() {
        let metrics = Metrics::new().unwrap();
        for _ in 0..3 {
            metrics.record_request("/", "GET", 200);
        }
        metrics.record_query("SELECT id, name, email FROM users");

        let text = metrics.render().unwrap();
        assert!(text.contains("# TYPE app_requests_total counter"));
        assert!(text.contains("app_requests_total{endpoint=\"/\",method=\"GET\",status_code=\"200\"} 3"));
        assert!(text.contains("db_query_total{query=\"SELECT id, name, email FROM users\"} 1"));
        assert!(metrics.content_type().starts_with("text/plain"));
    }

    #[test]
    fn concurrent_increments_are_not_lost() {
        let metrics = Arc::new(Metrics::new().unwrap());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let m = Arc::clone(&metrics);
                std::thread::spawn(move || {
                    for _ in 0..1000 {
                        m.record_request("/", "GET", 200);
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(metrics.request_count("/", "GET", 200), 8000);
    }
}
