//! Refresh pipeline: cache → fetch → flatten → gauge sink.

use std::sync::Arc;
use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::info;

use copilot_core::Recorder;
use copilot_fetch::{DEFAULT_TTL, FetchError, Fetcher, FetcherConfig, FreshnessCache};
use copilot_metrics::{ExporterMetrics, MetricsError};

/// Settings the pipeline needs besides the upstream connection.
#[derive(Debug, Clone)]
pub struct ExporterConfig {
    /// GitHub token. Absence is reported on each refresh, not at startup.
    pub credential: Option<String>,
    /// Enterprise or organization slug.
    pub org: Option<String>,
    pub cache_ttl: Duration,
}

impl Default for ExporterConfig {
    fn default() -> Self {
        Self {
            credential: None,
            org: None,
            cache_ttl: DEFAULT_TTL,
        }
    }
}

/// Errors raised while assembling an [`Exporter`].
#[derive(Debug, Error)]
pub enum BuildError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Metrics(#[from] MetricsError),
}

/// Owns every stateful piece of one exporter instance.
pub struct Exporter {
    config: ExporterConfig,
    fetcher: Fetcher,
    cache: FreshnessCache,
    metrics: ExporterMetrics,
}

impl Exporter {
    pub fn new(config: ExporterConfig, upstream: FetcherConfig) -> Result<Self, BuildError> {
        let metrics = ExporterMetrics::new()?;
        let recorder: Arc<dyn Recorder> = metrics.counters.clone();
        let fetcher = Fetcher::new(upstream, Arc::clone(&recorder))?;
        let cache = FreshnessCache::new(recorder);
        Ok(Self {
            config,
            fetcher,
            cache,
            metrics,
        })
    }

    pub fn metrics(&self) -> &ExporterMetrics {
        &self.metrics
    }

    /// Bring the gauges up to date with a fresh-enough snapshot.
    ///
    /// Returns the number of rows written. Fails only on missing
    /// credential or organization.
    pub async fn refresh(&self) -> Result<usize, FetchError> {
        let credential = self.config.credential.as_deref().unwrap_or_default();
        let org = self.config.org.as_deref().unwrap_or_default();

        let snapshot = self
            .cache
            .get_or_refresh(Instant::now(), self.config.cache_ttl, || {
                self.fetcher.fetch(credential, org)
            })
            .await?;

        let rows = copilot_normalize::flatten(&snapshot);
        self.metrics.sink.record_all(&rows);
        info!(%org, rows = rows.len(), "metrics refreshed");
        Ok(rows.len())
    }
}
