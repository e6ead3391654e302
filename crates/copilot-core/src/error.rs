//! Error types shared across the exporter crates.

use thiserror::Error;

/// A required setting is absent. Fatal to the refresh attempt and always
/// surfaced to the caller, never folded into an empty snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("missing credential: GHC_TOKEN must be set")]
    MissingCredential,

    #[error("missing organization: ORG must be set")]
    MissingOrganization,
}
