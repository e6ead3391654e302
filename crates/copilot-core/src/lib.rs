//! copilot-core — shared types for the Copilot metrics exporter.
//!
//! The upstream snapshot is modeled as a typed tree ([`Snapshot`]) so the
//! normalizer's traversal is checked by the compiler rather than driven by
//! string keys. Flattened output is a sequence of [`ObservationRow`]s over
//! the closed [`MetricName`] set.

pub mod error;
pub mod metric;
pub mod recorder;
pub mod row;
pub mod snapshot;

pub use error::ConfigError;
pub use metric::{MetricName, MetricValue};
pub use recorder::{FailureReason, NoopRecorder, Recorder};
pub use row::{ObservationRow, Stream};
pub use snapshot::*;
