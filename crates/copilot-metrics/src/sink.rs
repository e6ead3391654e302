//! Gauge sink: one labeled gauge per recognized Copilot metric.
//!
//! Keeps the last value written per (editor, language, stream, org) tuple.
//! Series are never removed: a label combination that disappears from a
//! later snapshot keeps its last value.

use std::collections::BTreeMap;
use std::sync::{Mutex, PoisonError};

use prometheus::{GaugeVec, Opts, Registry};
use tracing::debug;

use copilot_core::{MetricName, ObservationRow};

use crate::error::{MetricsError, MetricsResult};

/// Label names, in the order of [`ObservationRow::label_values`].
pub const LABELS: [&str; 4] = ["editor", "language", "stream", "org"];

/// Last-value-wins store for observation rows.
pub struct GaugeSink {
    gauges: BTreeMap<MetricName, GaugeVec>,
    /// Serializes batches so concurrent refreshes never interleave.
    batch: Mutex<()>,
}

impl GaugeSink {
    /// Create the ten gauges and register them with `registry`.
    pub fn new(registry: &Registry) -> MetricsResult<Self> {
        let mut gauges = BTreeMap::new();
        for metric in MetricName::ALL {
            let name = metric.as_str();
            let opts = Opts::new(name, format!("GitHub Copilot metric: {name}"));
            let gauge = GaugeVec::new(opts, &LABELS).map_err(|source| MetricsError::Register {
                name: name.to_string(),
                source,
            })?;
            registry
                .register(Box::new(gauge.clone()))
                .map_err(|source| MetricsError::Register {
                    name: name.to_string(),
                    source,
                })?;
            gauges.insert(metric, gauge);
        }
        Ok(Self {
            gauges,
            batch: Mutex::new(()),
        })
    }

    /// Record one row.
    pub fn record(&self, row: &ObservationRow) {
        if let Some(gauge) = self.gauges.get(&row.metric) {
            gauge
                .with_label_values(&row.label_values())
                .set(row.value.as_f64());
        }
    }

    /// Record a batch of rows as one uninterrupted sequence.
    pub fn record_all(&self, rows: &[ObservationRow]) {
        let _guard = self.batch.lock().unwrap_or_else(PoisonError::into_inner);
        for row in rows {
            self.record(row);
        }
        debug!(rows = rows.len(), "gauges updated");
    }

    /// Current value of a series (creates it at 0 if absent).
    #[cfg(test)]
    pub(crate) fn value(&self, metric: MetricName, labels: [&str; 4]) -> f64 {
        self.gauges[&metric].with_label_values(&labels).get()
    }
}
