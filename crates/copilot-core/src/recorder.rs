//! Failure classification and the counter seam used by fetcher and cache.

use std::fmt;

/// Why a fetch produced no usable snapshot.
///
/// The label form is what ends up in the `status_code` counter label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureReason {
    /// Credential or organization missing.
    ConfigMissing,
    /// Connection error, timeout, or a body that could not be read.
    Transport,
    /// Upstream answered with this status: non-2xx, or 2xx with an
    /// unusable body.
    Status(u16),
    /// Synthetic failure from the test endpoint.
    Test,
}

impl FailureReason {
    pub fn label(&self) -> String {
        match self {
            FailureReason::ConfigMissing => "env_missing".to_string(),
            FailureReason::Transport => "request_exception".to_string(),
            FailureReason::Status(code) => code.to_string(),
            FailureReason::Test => "test".to_string(),
        }
    }
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

/// Receives the fetch and cache events that drive the exporter's counters.
///
/// All methods default to no-ops so tests can implement only what they
/// observe.
pub trait Recorder: Send + Sync {
    /// One call per fetch invocation, before anything else happens.
    fn upstream_attempted(&self) {}

    fn upstream_failed(&self, _reason: FailureReason) {}

    fn cache_hit(&self) {}

    fn cache_miss(&self) {}
}

/// Recorder that drops every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopRecorder;

impl Recorder for NoopRecorder {}
