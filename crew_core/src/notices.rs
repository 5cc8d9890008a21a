use std::collections::VecDeque;

use serde::Serialize;

pub const CONNECTION_PROBLEM: &str = "Connection problem, retrying…";

/// Where a notice should be shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeScope {
    Global,
    KillPicker,
    ReportPicker,
    Meeting,
    Lobby,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub scope: NoticeScope,
    pub level: NoticeLevel,
    pub text: String,
}

/// Bounded notice history, newest first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoticeLog {
    entries: VecDeque<Notice>,
    max_entries: usize,
}

impl Default for NoticeLog {
    fn default() -> Self {
        Self::with_capacity(8)
    }
}

impl NoticeLog {
    pub fn with_capacity(max_entries: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            max_entries: max_entries.max(1),
        }
    }

    pub fn push<S: Into<String>>(&mut self, scope: NoticeScope, level: NoticeLevel, text: S) {
        let text: String = text.into();
        let text = text.trim_end();
        if text.is_empty() {
            return;
        }
        // Repeated transport failures collapse into the newest entry.
        if let Some(front) = self.entries.front() {
            if front.scope == scope && front.level == level && front.text == text {
                return;
            }
        }
        self.entries.push_front(Notice {
            scope,
            level,
            text: text.to_string(),
        });
        while self.entries.len() > self.max_entries {
            self.entries.pop_back();
        }
    }

    pub fn info<S: Into<String>>(&mut self, scope: NoticeScope, text: S) {
        self.push(scope, NoticeLevel::Info, text);
    }

    pub fn error<S: Into<String>>(&mut self, scope: NoticeScope, text: S) {
        self.push(scope, NoticeLevel::Error, text);
    }

    pub fn latest(&self, scope: NoticeScope) -> Option<&Notice> {
        self.entries.iter().find(|notice| notice.scope == scope)
    }

    pub fn clear_scope(&mut self, scope: NoticeScope) {
        self.entries.retain(|notice| notice.scope != scope);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Notice> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
