//! Per-route request counters in the Prometheus text exposition format.
//!
//! The recorder is owned by the counter rather than installed as the global
//! `metrics` recorder, so every `HitCounter` (one per app state) keeps its own
//! tally for the lifetime of the process.

use metrics::{counter, describe_counter, with_local_recorder};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle, PrometheusRecorder};
use std::sync::Arc;

/// Metric name for the request counter.
pub const HIT_COUNTER: &str = "hit_counter";

/// Content type of the rendered exposition.
pub const EXPOSITION_CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

/// Process-wide hit counter keyed by (method, endpoint).
#[derive(Clone)]
pub struct HitCounter {
    recorder: Arc<PrometheusRecorder>,
    handle: PrometheusHandle,
}

impl HitCounter {
    pub fn new() -> Self {
        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();

        with_local_recorder(&recorder, || {
            describe_counter!(HIT_COUNTER, "A url request hit counter.");
        });

        Self {
            recorder: Arc::new(recorder),
            handle,
        }
    }

    /// Adds one hit for the key, creating it at 1 if absent.
    pub fn increment(&self, method: &str, endpoint: &str) {
        with_local_recorder(&*self.recorder, || {
            counter!(
                HIT_COUNTER,
                "method" => method.to_string(),
                "endpoint" => endpoint.to_string()
            )
            .increment(1);
        });
    }

    /// Renders every counter as `name{labels} value` lines.
    pub fn render_all(&self) -> String {
        self.handle.render()
    }
}

impl Default for HitCounter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
pub(crate) fn hits_in(exposition: &str, method: &str, endpoint: &str) -> Option<u64> {
    let method_label = format!("method=\"{}\"", method);
    let endpoint_label = format!("endpoint=\"{}\"", endpoint);
    exposition
        .lines()
        .filter(|line| line.starts_with(HIT_COUNTER) && !line.starts_with('#'))
        .find(|line| line.contains(&method_label) && line.contains(&endpoint_label))
        .and_then(|line| line.rsplit(' ').next())
        .and_then(|value| value.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_counter_renders_no_samples() {
        let hits = HitCounter::new();
        assert_eq!(hits_in(&hits.render_all(), "GET", "index"), None);
    }

    #[test]
    fn test_increment_creates_and_accumulates() {
        let hits = HitCounter::new();
        hits.increment("GET", "health");
        hits.increment("GET", "health");
        hits.increment("POST", "validate");

        let rendered = hits.render_all();
        assert_eq!(hits_in(&rendered, "GET", "health"), Some(2));
        assert_eq!(hits_in(&rendered, "POST", "validate"), Some(1));
        assert_eq!(hits_in(&rendered, "GET", "validate"), None);
    }

    #[test]
    fn test_render_is_line_oriented() {
        let hits = HitCounter::new();
        hits.increment("GET", "lookup");

        let rendered = hits.render_all();
        assert!(rendered.contains("# TYPE hit_counter counter"));
        let sample = rendered
            .lines()
            .find(|line| line.starts_with("hit_counter{"))
            .unwrap();
        assert!(sample.ends_with(" 1"));
    }

    #[test]
    fn test_counters_are_independent_per_instance() {
        let first = HitCounter::new();
        let second = HitCounter::new();
        first.increment("GET", "index");

        assert_eq!(hits_in(&first.render_all(), "GET", "index"), Some(1));
        assert_eq!(hits_in(&second.render_all(), "GET", "index"), None);
    }

    #[test]
    fn test_concurrent_increments() {
        let hits = HitCounter::new();
        let threads: Vec<_> = (0..8)
            .map(|_| {
                let hits = hits.clone();
                std::thread::spawn(move || {
                    for _ in 0..250 {
                        hits.increment("GET", "history");
                    }
                })
            })
            .collect();
        for t in threads {
            t.join().unwrap();
        }

        assert_eq!(hits_in(&hits.render_all(), "GET", "history"), Some(2000));
    }
}
