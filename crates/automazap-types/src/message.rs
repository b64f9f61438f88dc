//! Chat message types.
//!
//! Messages are created in pairs by the store: the end user's message
//! and, after a delay, the bot's synthetic reply.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use std::fmt;

use crate::bot::BotId;
use crate::user::UserId;

/// Delivery status of a message.
///
/// The mock store stamps every message `Sent` and never advances it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryStatus {
    Sent,
    Delivered,
    Read,
    Failed,
}

impl fmt::Display for DeliveryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeliveryStatus::Sent => write!(f, "sent"),
            DeliveryStatus::Delivered => write!(f, "delivered"),
            DeliveryStatus::Read => write!(f, "read"),
            DeliveryStatus::Failed => write!(f, "failed"),
        }
    }
}

impl Default for DeliveryStatus {
    fn default() -> Self {
        DeliveryStatus::Sent
    }
}

/// A single message in a bot/user thread.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: Uuid,
    pub bot_id: BotId,
    pub user_id: UserId,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    /// `true` for messages typed by the end user, `false` for bot replies.
    pub is_user_message: bool,
    pub status: DeliveryStatus,
}

impl Message {
    /// Build a message stamped now with status `Sent`.
    pub fn new(bot_id: BotId, user_id: UserId, content: String, is_user_message: bool) -> Self {
        Self {
            id: Uuid::now_v7(),
            bot_id,
            user_id,
            content,
            timestamp: Utc::now(),
            is_user_message,
            status: DeliveryStatus::Sent,
        }
    }
}
