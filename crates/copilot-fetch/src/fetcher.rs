//! Upstream fetch of the latest Copilot metrics snapshot.
//!
//! Performs one authenticated GET against the GitHub Copilot metrics API
//! with a bounded timeout. Every outcome other than a missing credential or
//! organization degrades to an empty [`Snapshot`] plus a classified failure
//! event; nothing is retried.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{ACCEPT, USER_AGENT};
use serde_json::Value;
use tracing::{debug, error, info, warn};

use copilot_core::{ConfigError, FailureReason, Recorder, Snapshot};

use crate::error::{FetchError, FetchResult};

/// Upper bound on a single upstream call.
pub const MAX_TIMEOUT: Duration = Duration::from_secs(10);

/// Public GitHub REST endpoint.
pub const DEFAULT_API_BASE: &str = "https://api.github.com";

/// Value of the `X-GitHub-Api-Version` header.
pub const API_VERSION: &str = "2022-11-28";

const GITHUB_JSON: &str = "application/vnd.github+json";

/// Whether the organization identifier names an enterprise or an org.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MetricsScope {
    #[default]
    Enterprise,
    Organization,
}

impl MetricsScope {
    fn path_segment(&self) -> &'static str {
        match self {
            MetricsScope::Enterprise => "enterprises",
            MetricsScope::Organization => "orgs",
        }
    }
}

impl FromStr for MetricsScope {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "enterprise" | "enterprises" => Ok(MetricsScope::Enterprise),
            "org" | "orgs" | "organization" => Ok(MetricsScope::Organization),
            other => Err(format!(
                "unknown scope '{other}', expected 'enterprise' or 'organization'"
            )),
        }
    }
}

impl fmt::Display for MetricsScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricsScope::Enterprise => f.write_str("enterprise"),
            MetricsScope::Organization => f.write_str("organization"),
        }
    }
}

/// Upstream connection settings.
#[derive(Debug, Clone)]
pub struct FetcherConfig {
    /// Base URL without trailing slash, e.g. `https://api.github.com`.
    pub api_base: String,
    pub scope: MetricsScope,
    /// Per-request timeout; clamped to [`MAX_TIMEOUT`].
    pub timeout: Duration,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            scope: MetricsScope::default(),
            timeout: MAX_TIMEOUT,
        }
    }
}

/// Client for the Copilot metrics endpoint.
pub struct Fetcher {
    client: reqwest::Client,
    config: FetcherConfig,
    recorder: Arc<dyn Recorder>,
}

impl Fetcher {
    /// Build a fetcher. Fails only if the HTTP client cannot be constructed.
    pub fn new(config: FetcherConfig, recorder: Arc<dyn Recorder>) -> FetchResult<Self> {
        let timeout = config.timeout.min(MAX_TIMEOUT);
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()
            .map_err(FetchError::Client)?;
        Ok(Self {
            client,
            config,
            recorder,
        })
    }

    /// Metrics URL for `org` under the configured scope.
    pub fn metrics_url(&self, org: &str) -> String {
        format!(
            "{}/{}/{}/copilot/metrics",
            self.config.api_base.trim_end_matches('/'),
            self.config.scope.path_segment(),
            org
        )
    }

    /// Fetch the most recent snapshot for `org`.
    ///
    /// Returns `Err` only for a missing credential or organization, in which
    /// case no request is sent. Transport errors, non-2xx statuses and
    /// unusable bodies yield `Ok(Snapshot::empty(org))`.
    pub async fn fetch(&self, credential: &str, org: &str) -> FetchResult<Snapshot> {
        self.recorder.upstream_attempted();

        if credential.is_empty() || org.is_empty() {
            let err = if credential.is_empty() {
                ConfigError::MissingCredential
            } else {
                ConfigError::MissingOrganization
            };
            error!(error = %err, "refusing to fetch Copilot metrics");
            self.recorder.upstream_failed(FailureReason::ConfigMissing);
            return Err(err.into());
        }

        let url = self.metrics_url(org);
        info!(%url, %org, "fetching Copilot metrics");

        let response = match self
            .client
            .get(&url)
            .bearer_auth(credential)
            .header(ACCEPT, GITHUB_JSON)
            .header("X-GitHub-Api-Version", API_VERSION)
            .header(USER_AGENT, concat!("copilot-exporter/", env!("CARGO_PKG_VERSION")))
            .send()
            .await
        {
            Ok(resp) => resp,
            Err(e) => {
                warn!(error = %e, %url, timed_out = e.is_timeout(), "upstream request failed");
                return Ok(self.degraded(org, FailureReason::Transport));
            }
        };

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(%status, %url, body = %body, "upstream returned non-2xx");
            return Ok(self.degraded(org, FailureReason::Status(status.as_u16())));
        }

        let body = match response.bytes().await {
            Ok(body) => body,
            Err(e) => {
                warn!(error = %e, %url, "failed to read upstream body");
                return Ok(self.degraded(org, FailureReason::Transport));
            }
        };

        match decode_body(&body) {
            Decoded::Latest { mut snapshot, entries } => {
                snapshot.org = org.to_string();
                info!(%org, entries, date = ?snapshot.date, "fetched Copilot metrics");
                debug!(?snapshot, "latest snapshot");
                Ok(snapshot)
            }
            Decoded::NoData => {
                warn!(%status, %org, "upstream returned no metrics entries");
                Ok(self.degraded(org, FailureReason::Status(status.as_u16())))
            }
            Decoded::Malformed(reason) => {
                error!(%status, %org, %reason, "upstream body is not a metrics document");
                Ok(self.degraded(org, FailureReason::Status(status.as_u16())))
            }
        }
    }

    fn degraded(&self, org: &str, reason: FailureReason) -> Snapshot {
        self.recorder.upstream_failed(reason);
        Snapshot::empty(org)
    }
}

/// Result of interpreting a 2xx response body.
#[derive(Debug)]
enum Decoded {
    /// The chosen entry and how many entries the body held.
    Latest { snapshot: Snapshot, entries: usize },
    /// Absent body, `null`, `[]` or a top-level `{}`.
    NoData,
    Malformed(String),
}

/// Pick the latest snapshot out of a response body.
///
/// A list is assumed to be in ascending chronological order, so its last
/// element is taken. The upstream API documents no ordering guarantee.
fn decode_body(body: &[u8]) -> Decoded {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Decoded::NoData;
    }

    let value: Value = match serde_json::from_slice(body) {
        Ok(v) => v,
        Err(e) => return Decoded::Malformed(format!("invalid JSON: {e}")),
    };

    let (latest, entries) = match value {
        Value::Array(mut items) => {
            let entries = items.len();
            match items.pop() {
                Some(last) => (last, entries),
                None => return Decoded::NoData,
            }
        }
        Value::Null => return Decoded::NoData,
        Value::Object(map) if map.is_empty() => return Decoded::NoData,
        other => (other, 1),
    };

    // An empty entry inside a non-empty list is still data: it flattens to
    // no rows but is not a failure.
    if !latest.is_object() {
        return Decoded::Malformed(format!("expected an object, got {latest}"));
    }

    match serde_json::from_value::<Snapshot>(latest) {
        Ok(snapshot) => Decoded::Latest { snapshot, entries },
        Err(e) => Decoded::Malformed(format!("unexpected field type: {e}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use copilot_core::NoopRecorder;

    fn fetcher(config: FetcherConfig) -> Fetcher {
        Fetcher::new(config, Arc::new(NoopRecorder)).unwrap()
    }

    #[test]
    fn decode_takes_last_list_element() {
        let body = br#"[{"total_active_users": 10}, {"total_active_users": 20}]"#;
        match decode_body(body) {
            Decoded::Latest { snapshot, entries } => {
                assert_eq!(entries, 2);
                assert_eq!(snapshot.total_active_users, Some(20.0));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn decode_single_object() {
        match decode_body(br#"{"total_engaged_users": 3}"#) {
            Decoded::Latest { snapshot, entries } => {
                assert_eq!(entries, 1);
                assert_eq!(snapshot.total_engaged_users, Some(3.0));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn decode_no_data_shapes() {
        let bodies: [&[u8]; 5] = [b"", b"  \n", b"[]", b"{}", b"null"];
        for body in bodies {
            assert!(
                matches!(decode_body(body), Decoded::NoData),
                "body {:?}",
                String::from_utf8_lossy(body)
            );
        }
    }

    #[test]
    fn decode_empty_entry_in_list_is_data() {
        match decode_body(b"[{}]") {
            Decoded::Latest { snapshot, entries } => {
                assert_eq!(entries, 1);
                assert!(snapshot.is_empty());
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn decode_null_editor_name_keeps_snapshot() {
        let body = br#"{
            "total_active_users": 42,
            "copilot_ide_chat": {
                "editors": [{ "name": null, "models": [{ "total_chats": 7 }] }]
            }
        }"#;
        match decode_body(body) {
            Decoded::Latest { snapshot, .. } => {
                assert_eq!(snapshot.total_active_users, Some(42.0));
                let chat = snapshot.copilot_ide_chat.unwrap();
                assert_eq!(chat.editors[0].name, "");
                assert_eq!(chat.editors[0].models[0].total_chats, Some(7.0));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn decode_malformed_shapes() {
        let bodies: [&[u8]; 4] = [
            b"<html>rate limited</html>",
            b"42",
            b"[1, 2]",
            br#"{"total_active_users": "lots"}"#,
        ];
        for body in bodies {
            assert!(
                matches!(decode_body(body), Decoded::Malformed(_)),
                "body {:?}",
                String::from_utf8_lossy(body)
            );
        }
    }

    #[test]
    fn url_follows_scope() {
        let enterprise = fetcher(FetcherConfig::default());
        assert_eq!(
            enterprise.metrics_url("acme"),
            "https://api.github.com/enterprises/acme/copilot/metrics"
        );

        let org = fetcher(FetcherConfig {
            api_base: "http://localhost:9000/".to_string(),
            scope: MetricsScope::Organization,
            timeout: Duration::from_secs(1),
        });
        assert_eq!(
            org.metrics_url("acme"),
            "http://localhost:9000/orgs/acme/copilot/metrics"
        );
    }

    #[test]
    fn scope_parses_aliases() {
        assert_eq!("enterprise".parse::<MetricsScope>(), Ok(MetricsScope::Enterprise));
        assert_eq!("Org".parse::<MetricsScope>(), Ok(MetricsScope::Organization));
        assert!("team".parse::<MetricsScope>().is_err());
    }

    #[tokio::test]
    async fn missing_organization_is_config_error() {
        let f = fetcher(FetcherConfig::default());
        let err = f.fetch("token", "").await.unwrap_err();
        assert!(matches!(
            err,
            FetchError::Config(ConfigError::MissingOrganization)
        ));
        assert!(err.is_configuration());
    }
}
