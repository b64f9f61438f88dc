//! Event types for the AutomaZap event bus.
//!
//! `AppEvent` is the unified event type broadcast by the store and the
//! account services. All variants are Clone + Send + Sync for use with
//! tokio broadcast channels.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::bot::{BotId, Integration};
use crate::message::Message;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Success,
    Info,
    Error,
}

/// A user-facing notification (rendered as a toast by a UI, or a styled
/// line by the CLI).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Notice {
    pub fn success(title: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            title: title.into(),
            description: None,
        }
    }

    pub fn info(title: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            title: title.into(),
            description: None,
        }
    }

    pub fn error(title: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            title: title.into(),
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Events emitted by the store and services.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AppEvent {
    /// Something the user should be told about.
    Notice(Notice),

    /// The view should move to `path` (e.g. `/dashboard` after bot creation).
    Navigate { path: String },

    BotCreated { bot_id: BotId },

    BotUpdated { bot_id: BotId },

    /// A bot and everything hanging off it was removed.
    BotDeleted { bot_id: BotId, messages_removed: usize },

    /// A message (user or synthetic reply) was appended to a thread.
    MessageAppended { message: Message },

    /// The delayed step of a send failed; the user message stays applied.
    ReplyFailed {
        task_id: Uuid,
        bot_id: BotId,
        user_message_id: Uuid,
        error: String,
    },

    IntegrationChanged { bot_id: BotId, integration: Integration },

    /// The logged-in profile changed (login, signup, logout, update).
    ProfileChanged { user_id: Option<String> },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notice_builders() {
        let n = Notice::error("Bot não encontrado!").with_description("id desconhecido");
        assert_eq!(n.level, NoticeLevel::Error);
        assert_eq!(n.description.as_deref(), Some("id desconhecido"));
    }

    #[test]
    fn test_event_tagged_serialization() {
        let event = AppEvent::Navigate {
            path: "/dashboard".to_string(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "navigate");
        assert_eq!(json["path"], "/dashboard");
    }
}
