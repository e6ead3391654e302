//! copilot-metrics — Prometheus side of the Copilot exporter.
//!
//! # Architecture
//!
//! ```text
//! ExporterMetrics (owns one Registry)
//!   ├── GaugeSink        ← record_all(rows) per refresh
//!   ├── ExporterCounters ← Recorder events from fetcher and cache
//!   └── render()         → text/plain exposition for /metrics
//! ```
//!
//! Every `ExporterMetrics` owns a fresh registry; nothing is process-global.

pub mod counters;
pub mod error;
pub mod sink;

use std::sync::Arc;

use prometheus::{Encoder, Registry, TextEncoder};

pub use counters::ExporterCounters;
pub use error::{MetricsError, MetricsResult};
pub use sink::GaugeSink;

/// Registry plus everything registered in it.
pub struct ExporterMetrics {
    registry: Registry,
    pub sink: GaugeSink,
    pub counters: Arc<ExporterCounters>,
}

impl ExporterMetrics {
    pub fn new() -> MetricsResult<Self> {
        let registry = Registry::new();
        let sink = GaugeSink::new(&registry)?;
        let counters = Arc::new(ExporterCounters::new(&registry)?);
        Ok(Self {
            registry,
            sink,
            counters,
        })
    }

    /// Render every registered family in the text exposition format.
    pub fn render(&self) -> MetricsResult<String> {
        let encoder = TextEncoder::new();
        let mut buf = Vec::new();
        encoder
            .encode(&self.registry.gather(), &mut buf)
            .map_err(MetricsError::Encode)?;
        Ok(String::from_utf8(buf)?)
    }

    /// Content type matching [`ExporterMetrics::render`].
    pub fn content_type(&self) -> String {
        TextEncoder::new().format_type().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use copilot_core::{FailureReason, MetricName, MetricValue, ObservationRow, Recorder, Stream};

    #[test]
    fn render_includes_recorded_rows() {
        let metrics = ExporterMetrics::new().unwrap();
        metrics.sink.record_all(&[ObservationRow {
            stream: Some(Stream::CopilotIdeChat),
            editor: "vscode".to_string(),
            language: String::new(),
            metric: MetricName::TotalChats,
            value: MetricValue::Number(7.0),
            org: "acme".to_string(),
        }]);

        let output = metrics.render().unwrap();
        assert!(output.contains("# HELP total_chats GitHub Copilot metric: total_chats"));
        assert!(output.contains("# TYPE total_chats gauge"));
        let line = output
            .lines()
            .find(|l| l.starts_with("total_chats{"))
            .expect("total_chats series");
        assert!(line.contains("editor=\"vscode\""));
        assert!(line.contains("stream=\"copilot_ide_chat\""));
        assert!(line.contains("org=\"acme\""));
        assert!(line.ends_with(" 7"));
    }

    #[test]
    fn render_includes_counters() {
        let metrics = ExporterMetrics::new().unwrap();
        metrics.counters.request_received();
        metrics.counters.upstream_failed(FailureReason::Status(502));

        let output = metrics.render().unwrap();
        assert!(output.contains("copilot_exporter_requests_total 1"));
        assert!(output.contains("copilot_exporter_requests_failed_total{status_code=\"502\"} 1"));
    }

    #[test]
    fn content_type_is_text_format() {
        let metrics = ExporterMetrics::new().unwrap();
        assert!(metrics.content_type().starts_with("text/plain"));
    }
}
