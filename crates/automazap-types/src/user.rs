//! End users of a bot (the people chatting with it), distinct from the
//! account holder who manages bots.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use std::collections::HashMap;
use std::fmt;

use crate::bot::BotId;

/// Identifier of an end user. Chosen by the channel (phone number, widget
/// session id, ...), so it is an opaque string rather than a UUID.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub String);

impl UserId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for UserId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for UserId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Per-bot interaction counters for one end user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BotInteraction {
    pub message_count: u64,
    pub last_interaction: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndUser {
    pub id: UserId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_interaction: Option<DateTime<Utc>>,
    pub total_interactions: u64,
    #[serde(default)]
    pub bot_interactions: HashMap<BotId, BotInteraction>,
}

impl EndUser {
    /// A user record created on first contact, with no interactions yet.
    pub fn first_contact(id: UserId) -> Self {
        let name = format!("Usuário {id}");
        Self {
            id,
            name,
            phone_number: None,
            email: None,
            last_interaction: None,
            total_interactions: 0,
            bot_interactions: HashMap::new(),
        }
    }

    pub fn has_talked_to(&self, bot_id: &BotId) -> bool {
        self.bot_interactions.contains_key(bot_id)
    }

    /// Case-insensitive match of `term` against name, phone and email.
    pub fn matches(&self, term: &str) -> bool {
        let term = term.to_lowercase();
        self.name.to_lowercase().contains(&term)
            || self
                .phone_number
                .as_deref()
                .is_some_and(|p| p.to_lowercase().contains(&term))
            || self
                .email
                .as_deref()
                .is_some_and(|e| e.to_lowercase().contains(&term))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_contact_is_empty() {
        let user = EndUser::first_contact(UserId::from("u1"));
        assert_eq!(user.name, "Usuário u1");
        assert_eq!(user.total_interactions, 0);
        assert!(user.bot_interactions.is_empty());
        assert!(user.last_interaction.is_none());
    }

    #[test]
    fn test_matches_contact_fields() {
        let mut user = EndUser::first_contact(UserId::from("u1"));
        user.name = "Maria Silva".to_string();
        user.phone_number = Some("+55 11 99999-0000".to_string());
        user.email = Some("maria@example.com".to_string());

        assert!(user.matches("maria"));
        assert!(user.matches("SILVA"));
        assert!(user.matches("99999"));
        assert!(user.matches("example.com"));
        assert!(!user.matches("joão"));
    }

    #[test]
    fn test_bot_interactions_serialize_keyed_by_bot_id() {
        let bot_id = BotId::new();
        let mut user = EndUser::first_contact(UserId::from("u1"));
        user.bot_interactions.insert(
            bot_id,
            BotInteraction {
                message_count: 3,
                last_interaction: Utc::now(),
            },
        );
        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(
            json["botInteractions"][bot_id.to_string()]["messageCount"],
            3
        );
    }
}
