//! Exporter self-observation counters.

use prometheus::{IntCounter, IntCounterVec, Opts, Registry};

use copilot_core::{FailureReason, Recorder};

use crate::error::{MetricsError, MetricsResult};

/// Volume and failure counters for the exporter itself.
pub struct ExporterCounters {
    upstream_attempted: IntCounter,
    upstream_failed: IntCounterVec,
    requests_total: IntCounter,
    cache_hits: IntCounter,
}

impl ExporterCounters {
    pub fn new(registry: &Registry) -> MetricsResult<Self> {
        let upstream_attempted = IntCounter::new(
            "copilot_exporter_github_api_requests_total",
            "Total number of requests to Github metrics Api",
        )
        .map_err(register_err("copilot_exporter_github_api_requests_total"))?;

        let upstream_failed = IntCounterVec::new(
            Opts::new(
                "copilot_exporter_requests_failed_total",
                "Number of failed or empty responses from the Copilot metrics fetch",
            ),
            &["status_code"],
        )
        .map_err(register_err("copilot_exporter_requests_failed_total"))?;

        let requests_total = IntCounter::new(
            "copilot_exporter_requests_total",
            "Total number of metrics refresh requests",
        )
        .map_err(register_err("copilot_exporter_requests_total"))?;

        let cache_hits = IntCounter::new(
            "copilot_exporter_cache_hits_total",
            "Total number of refreshes served from the snapshot cache",
        )
        .map_err(register_err("copilot_exporter_cache_hits_total"))?;

        registry
            .register(Box::new(upstream_attempted.clone()))
            .map_err(register_err("copilot_exporter_github_api_requests_total"))?;
        registry
            .register(Box::new(upstream_failed.clone()))
            .map_err(register_err("copilot_exporter_requests_failed_total"))?;
        registry
            .register(Box::new(requests_total.clone()))
            .map_err(register_err("copilot_exporter_requests_total"))?;
        registry
            .register(Box::new(cache_hits.clone()))
            .map_err(register_err("copilot_exporter_cache_hits_total"))?;

        Ok(Self {
            upstream_attempted,
            upstream_failed,
            requests_total,
            cache_hits,
        })
    }

    /// One per inbound refresh request.
    pub fn request_received(&self) {
        self.requests_total.inc();
    }

    pub fn requests_total(&self) -> u64 {
        self.requests_total.get()
    }

    pub fn upstream_attempted_total(&self) -> u64 {
        self.upstream_attempted.get()
    }

    pub fn cache_hits_total(&self) -> u64 {
        self.cache_hits.get()
    }

    /// Failures recorded under `reason`.
    pub fn failures(&self, reason: FailureReason) -> u64 {
        self.upstream_failed
            .with_label_values(&[reason.label().as_str()])
            .get()
    }
}

impl Recorder for ExporterCounters {
    fn upstream_attempted(&self) {
        self.upstream_attempted.inc();
    }

    fn upstream_failed(&self, reason: FailureReason) {
        self.upstream_failed
            .with_label_values(&[reason.label().as_str()])
            .inc();
    }

    fn cache_hit(&self) {
        self.cache_hits.inc();
    }
}

fn register_err(name: &'static str) -> impl Fn(prometheus::Error) -> MetricsError {
    move |source| MetricsError::Register {
        name: name.to_string(),
        source,
    }
}
