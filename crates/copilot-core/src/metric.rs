//! The closed set of recognized Copilot metric names and their values.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One of the ten metric names the exporter publishes as a gauge.
///
/// Anything else in the upstream payload is inert and never becomes a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricName {
    TotalEngagedUsers,
    IsCustomModel,
    TotalChatCopyEvents,
    TotalChatInsertionEvents,
    TotalChats,
    TotalCodeAcceptances,
    TotalCodeLinesAccepted,
    TotalCodeLinesSuggested,
    TotalCodeSuggestions,
    TotalActiveUsers,
}

impl MetricName {
    /// Canonical order, also the order used for flat stream records.
    pub const ALL: [MetricName; 10] = [
        MetricName::TotalEngagedUsers,
        MetricName::IsCustomModel,
        MetricName::TotalChatCopyEvents,
        MetricName::TotalChatInsertionEvents,
        MetricName::TotalChats,
        MetricName::TotalCodeAcceptances,
        MetricName::TotalCodeLinesAccepted,
        MetricName::TotalCodeLinesSuggested,
        MetricName::TotalCodeSuggestions,
        MetricName::TotalActiveUsers,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MetricName::TotalEngagedUsers => "total_engaged_users",
            MetricName::IsCustomModel => "is_custom_model",
            MetricName::TotalChatCopyEvents => "total_chat_copy_events",
            MetricName::TotalChatInsertionEvents => "total_chat_insertion_events",
            MetricName::TotalChats => "total_chats",
            MetricName::TotalCodeAcceptances => "total_code_acceptances",
            MetricName::TotalCodeLinesAccepted => "total_code_lines_accepted",
            MetricName::TotalCodeLinesSuggested => "total_code_lines_suggested",
            MetricName::TotalCodeSuggestions => "total_code_suggestions",
            MetricName::TotalActiveUsers => "total_active_users",
        }
    }

    /// Look up a metric by its wire name.
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.as_str() == name)
    }
}

impl fmt::Display for MetricName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The value carried by an observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetricValue {
    /// The custom-model flag.
    Flag(bool),
    /// Every other metric is a count.
    Number(f64),
}

impl MetricValue {
    /// Gauge representation: flags become 1.0 / 0.0.
    pub fn as_f64(&self) -> f64 {
        match *self {
            MetricValue::Flag(true) => 1.0,
            MetricValue::Flag(false) => 0.0,
            MetricValue::Number(n) => n,
        }
    }
}

impl From<f64> for MetricValue {
    fn from(n: f64) -> Self {
        MetricValue::Number(n)
    }
}

impl From<bool> for MetricValue {
    fn from(flag: bool) -> Self {
        MetricValue::Flag(flag)
    }
}
