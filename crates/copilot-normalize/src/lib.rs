//! copilot-normalize — flattens a [`Snapshot`] into observation rows.
//!
//! # Traversal order
//!
//! ```text
//! copilot_dotcom_chat, copilot_dotcom_pull_requests   flat scalars
//! copilot_ide_chat
//!   ├── stream engagement
//!   └── editors → engagement, models → custom flag + chat events
//! copilot_ide_code_completions
//!   ├── stream engagement
//!   ├── editors → engagement, models → custom flag + engagement,
//!   │                                  languages → completion counts
//!   └── language summary → engagement (no editor label)
//! total_active_users, total_engaged_users              snapshot totals
//! ```
//!
//! The order is fixed so output is reproducible; the gauge sink is keyed by
//! labels and does not depend on it. Absent scalars produce no row.

use copilot_core::{
    ChatModel, CompletionLanguage, CompletionModel, Editor, IdeChat, IdeCodeCompletions,
    MetricName, MetricValue, ObservationRow, Snapshot, Stream, StreamTotals,
};

/// Flatten a snapshot. Pure and deterministic; empty in, empty out.
pub fn flatten(snapshot: &Snapshot) -> Vec<ObservationRow> {
    let mut rows = RowWriter::new(&snapshot.org);

    for (stream, totals) in [
        (Stream::CopilotDotcomChat, &snapshot.copilot_dotcom_chat),
        (
            Stream::CopilotDotcomPullRequests,
            &snapshot.copilot_dotcom_pull_requests,
        ),
    ] {
        if let Some(totals) = totals {
            rows.stream_totals(stream, totals);
        }
    }

    if let Some(chat) = &snapshot.copilot_ide_chat {
        rows.ide_chat(chat);
    }

    if let Some(completions) = &snapshot.copilot_ide_code_completions {
        rows.ide_code_completions(completions);
    }

    rows.scalar(None, "", "", MetricName::TotalActiveUsers, snapshot.total_active_users);
    rows.scalar(None, "", "", MetricName::TotalEngagedUsers, snapshot.total_engaged_users);

    rows.finish()
}

/// Accumulates rows for one organization.
struct RowWriter<'a> {
    org: &'a str,
    rows: Vec<ObservationRow>,
}

impl<'a> RowWriter<'a> {
    fn new(org: &'a str) -> Self {
        Self {
            org,
            rows: Vec::new(),
        }
    }

    fn finish(self) -> Vec<ObservationRow> {
        self.rows
    }

    fn push(
        &mut self,
        stream: Option<Stream>,
        editor: &str,
        language: &str,
        metric: MetricName,
        value: MetricValue,
    ) {
        self.rows.push(ObservationRow {
            stream,
            editor: editor.to_string(),
            language: language.to_string(),
            metric,
            value,
            org: self.org.to_string(),
        });
    }

    /// Push a numeric scalar if present.
    fn scalar(
        &mut self,
        stream: Option<Stream>,
        editor: &str,
        language: &str,
        metric: MetricName,
        value: Option<f64>,
    ) {
        if let Some(n) = value {
            self.push(stream, editor, language, metric, MetricValue::Number(n));
        }
    }

    fn custom_flag(&mut self, stream: Stream, editor: &str, flag: Option<bool>) {
        if let Some(flag) = flag {
            self.push(
                Some(stream),
                editor,
                "",
                MetricName::IsCustomModel,
                MetricValue::Flag(flag),
            );
        }
    }

    fn stream_totals(&mut self, stream: Stream, totals: &StreamTotals) {
        for (metric, value) in totals.present() {
            self.push(Some(stream), "", "", metric, value);
        }
    }

    fn ide_chat(&mut self, chat: &IdeChat) {
        let stream = Some(Stream::CopilotIdeChat);
        self.scalar(stream, "", "", MetricName::TotalEngagedUsers, chat.total_engaged_users);

        for editor in &chat.editors {
            self.editor_engagement(Stream::CopilotIdeChat, editor);
            for model in &editor.models {
                self.chat_model(&editor.name, model);
            }
        }
    }

    fn chat_model(&mut self, editor: &str, model: &ChatModel) {
        let stream = Some(Stream::CopilotIdeChat);
        self.custom_flag(Stream::CopilotIdeChat, editor, model.is_custom_model);
        self.scalar(
            stream,
            editor,
            "",
            MetricName::TotalChatCopyEvents,
            model.total_chat_copy_events,
        );
        self.scalar(
            stream,
            editor,
            "",
            MetricName::TotalChatInsertionEvents,
            model.total_chat_insertion_events,
        );
        self.scalar(stream, editor, "", MetricName::TotalChats, model.total_chats);
        self.scalar(stream, editor, "", MetricName::TotalEngagedUsers, model.total_engaged_users);
    }

    fn ide_code_completions(&mut self, completions: &IdeCodeCompletions) {
        let stream = Some(Stream::CopilotIdeCodeCompletions);
        self.scalar(
            stream,
            "",
            "",
            MetricName::TotalEngagedUsers,
            completions.total_engaged_users,
        );

        for editor in &completions.editors {
            self.editor_engagement(Stream::CopilotIdeCodeCompletions, editor);
            for model in &editor.models {
                self.completion_model(&editor.name, model);
            }
        }

        // Coarser aggregate than the per-editor language rows.
        for language in &completions.languages {
            self.scalar(
                stream,
                "",
                &language.name,
                MetricName::TotalEngagedUsers,
                language.total_engaged_users,
            );
        }
    }

    fn completion_model(&mut self, editor: &str, model: &CompletionModel) {
        let stream = Stream::CopilotIdeCodeCompletions;
        self.custom_flag(stream, editor, model.is_custom_model);
        self.scalar(
            Some(stream),
            editor,
            "",
            MetricName::TotalEngagedUsers,
            model.total_engaged_users,
        );
        for language in &model.languages {
            self.completion_language(editor, language);
        }
    }

    fn completion_language(&mut self, editor: &str, language: &CompletionLanguage) {
        let stream = Some(Stream::CopilotIdeCodeCompletions);
        let name = language.name.as_str();
        for (metric, value) in [
            (MetricName::TotalCodeAcceptances, language.total_code_acceptances),
            (MetricName::TotalCodeLinesAccepted, language.total_code_lines_accepted),
            (MetricName::TotalCodeLinesSuggested, language.total_code_lines_suggested),
            (MetricName::TotalCodeSuggestions, language.total_code_suggestions),
            (MetricName::TotalEngagedUsers, language.total_engaged_users),
        ] {
            self.scalar(stream, editor, name, metric, value);
        }
    }

    fn editor_engagement<M>(&mut self, stream: Stream, editor: &Editor<M>) {
        self.scalar(
            Some(stream),
            &editor.name,
            "",
            MetricName::TotalEngagedUsers,
            editor.total_engaged_users,
        );
    }
}
