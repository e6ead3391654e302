//! Typed model of one Copilot metrics snapshot.
//!
//! Mirrors the upstream JSON document as a tree of optional fields. Every
//! scalar is `Option`: a missing key and an explicit zero are different
//! things and must stay different all the way to the gauge sink. Keys the
//! model does not name are ignored during deserialization. A `null` label
//! or list decodes as empty rather than rejecting the whole snapshot.

use serde::{Deserialize, Deserializer, Serialize};

use crate::metric::{MetricName, MetricValue};

/// One fetched, possibly-empty unit of upstream metrics data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Snapshot {
    /// Organization the snapshot was fetched for. Not part of the upstream
    /// payload; attached by the fetcher.
    pub org: String,
    /// Day the snapshot describes (`YYYY-MM-DD`). Informational only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_active_users: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_engaged_users: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub copilot_dotcom_chat: Option<StreamTotals>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub copilot_dotcom_pull_requests: Option<StreamTotals>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub copilot_ide_chat: Option<IdeChat>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub copilot_ide_code_completions: Option<IdeCodeCompletions>,
}

impl Snapshot {
    /// The "no data available" snapshot for `org`.
    pub fn empty(org: impl Into<String>) -> Self {
        Self {
            org: org.into(),
            ..Self::default()
        }
    }

    /// True when no recognized field is present.
    pub fn is_empty(&self) -> bool {
        self.total_active_users.is_none()
            && self.total_engaged_users.is_none()
            && self.copilot_dotcom_chat.is_none()
            && self.copilot_dotcom_pull_requests.is_none()
            && self.copilot_ide_chat.is_none()
            && self.copilot_ide_code_completions.is_none()
    }
}

/// A flat stream record (`copilot_dotcom_chat`, `copilot_dotcom_pull_requests`)
/// holding any subset of the recognized metrics directly as scalars.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamTotals {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_engaged_users: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_custom_model: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_chat_copy_events: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_chat_insertion_events: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_chats: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_code_acceptances: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_code_lines_accepted: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_code_lines_suggested: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_code_suggestions: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_active_users: Option<f64>,
}

impl StreamTotals {
    /// Value of `metric` in this record, if present.
    pub fn get(&self, metric: MetricName) -> Option<MetricValue> {
        let number = match metric {
            MetricName::IsCustomModel => return self.is_custom_model.map(MetricValue::Flag),
            MetricName::TotalEngagedUsers => self.total_engaged_users,
            MetricName::TotalChatCopyEvents => self.total_chat_copy_events,
            MetricName::TotalChatInsertionEvents => self.total_chat_insertion_events,
            MetricName::TotalChats => self.total_chats,
            MetricName::TotalCodeAcceptances => self.total_code_acceptances,
            MetricName::TotalCodeLinesAccepted => self.total_code_lines_accepted,
            MetricName::TotalCodeLinesSuggested => self.total_code_lines_suggested,
            MetricName::TotalCodeSuggestions => self.total_code_suggestions,
            MetricName::TotalActiveUsers => self.total_active_users,
        };
        number.map(MetricValue::Number)
    }

    /// Present values in canonical metric order.
    pub fn present(&self) -> impl Iterator<Item = (MetricName, MetricValue)> + '_ {
        MetricName::ALL
            .into_iter()
            .filter_map(|metric| self.get(metric).map(|value| (metric, value)))
    }
}

// ── IDE streams ────────────────────────────────────────────────────

/// `null` where a label or list is expected reads as the empty value.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// An editor entry; `M` is the model shape of the enclosing stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(deserialize = "M: Deserialize<'de>"))]
pub struct Editor<M> {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_engaged_users: Option<f64>,
    #[serde(default = "Vec::new", deserialize_with = "null_as_default")]
    pub models: Vec<M>,
}

impl<M> Editor<M> {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            total_engaged_users: None,
            models: Vec::new(),
        }
    }
}

/// `copilot_ide_chat`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IdeChat {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_engaged_users: Option<f64>,
    #[serde(deserialize_with = "null_as_default")]
    pub editors: Vec<Editor<ChatModel>>,
}

/// A model under an IDE chat editor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatModel {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_custom_model: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_chat_copy_events: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_chat_insertion_events: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_chats: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_engaged_users: Option<f64>,
}

/// `copilot_ide_code_completions`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IdeCodeCompletions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_engaged_users: Option<f64>,
    #[serde(deserialize_with = "null_as_default")]
    pub editors: Vec<Editor<CompletionModel>>,
    /// Per-language engagement across all editors.
    #[serde(deserialize_with = "null_as_default")]
    pub languages: Vec<LanguageSummary>,
}

/// A model under a code-completions editor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompletionModel {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_custom_model: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_engaged_users: Option<f64>,
    #[serde(deserialize_with = "null_as_default")]
    pub languages: Vec<CompletionLanguage>,
}

/// Completion counts for one language under one editor/model.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompletionLanguage {
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_code_acceptances: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_code_lines_accepted: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_code_lines_suggested: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_code_suggestions: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_engaged_users: Option<f64>,
}

/// Stream-level language summary (no editor dimension).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LanguageSummary {
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_engaged_users: Option<f64>,
}
