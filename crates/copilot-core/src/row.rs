//! Flattened observation rows.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::metric::{MetricName, MetricValue};

/// Top-level metric grouping a row came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stream {
    CopilotDotcomChat,
    CopilotDotcomPullRequests,
    CopilotIdeChat,
    CopilotIdeCodeCompletions,
}

impl Stream {
    /// Label value, identical to the upstream JSON key.
    pub fn as_str(&self) -> &'static str {
        match self {
            Stream::CopilotDotcomChat => "copilot_dotcom_chat",
            Stream::CopilotDotcomPullRequests => "copilot_dotcom_pull_requests",
            Stream::CopilotIdeChat => "copilot_ide_chat",
            Stream::CopilotIdeCodeCompletions => "copilot_ide_code_completions",
        }
    }
}

impl fmt::Display for Stream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One flattened (stream, editor, language, metric, value, org) tuple.
///
/// `stream` is `None` for snapshot-level totals; `editor` and `language` are
/// empty when not applicable to the value's position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObservationRow {
    pub stream: Option<Stream>,
    pub editor: String,
    pub language: String,
    pub metric: MetricName,
    pub value: MetricValue,
    pub org: String,
}

impl ObservationRow {
    /// Stream label, empty for snapshot-level totals.
    pub fn stream_label(&self) -> &'static str {
        self.stream.map(|s| s.as_str()).unwrap_or("")
    }

    /// Label values in gauge label order: editor, language, stream, org.
    pub fn label_values(&self) -> [&str; 4] {
        [
            self.editor.as_str(),
            self.language.as_str(),
            self.stream_label(),
            self.org.as_str(),
        ]
    }
}
