use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use std::fmt;
use std::str::FromStr;

/// Unique identifier for a bot, wrapping a UUID v7 (time-sortable).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BotId(pub Uuid);

impl BotId {
    /// Create a new BotId using UUID v7 (time-sortable, guaranteed ordering).
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Create a BotId from an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Default for BotId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for BotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for BotId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// A configured chatbot.
///
/// Serialized with the camelCase field names the dashboard expects
/// (`isActive`, `welcomeMessage`, `responseTime`, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bot {
    pub id: BotId,
    pub name: String,
    pub description: String,
    pub personality: Personality,
    pub created_at: DateTime<Utc>,
    /// Active bots answer messages; inactive ones show as offline.
    pub is_active: bool,
    pub stats: BotStats,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub welcome_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<Language>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_time: Option<ResponseSpeed>,
    /// Training material attached to the bot (descriptive only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub knowledge_base: Option<KnowledgeBase>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub integration: Option<Integration>,
    /// Model label shown in settings. No model is ever called.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_model: Option<AiModel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<String>,
}

impl Bot {
    /// Response speed, falling back to `Normal` when unset.
    pub fn speed(&self) -> ResponseSpeed {
        self.response_time.unwrap_or_default()
    }
}

/// Aggregate counters shown on the dashboard card.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BotStats {
    pub messages: u64,
    pub users: u64,
}

/// Response style applied to reply template selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Personality {
    #[serde(rename = "Formal")]
    Formal,
    #[serde(rename = "Amigável")]
    Friendly,
    #[serde(rename = "Divertido")]
    Playful,
}

impl Personality {
    pub const ALL: [Personality; 3] = [
        Personality::Formal,
        Personality::Friendly,
        Personality::Playful,
    ];
}

impl fmt::Display for Personality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Personality::Formal => write!(f, "Formal"),
            Personality::Friendly => write!(f, "Amigável"),
            Personality::Playful => write!(f, "Divertido"),
        }
    }
}

impl FromStr for Personality {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "formal" => Ok(Personality::Formal),
            "amigável" | "amigavel" | "friendly" => Ok(Personality::Friendly),
            "divertido" | "playful" => Ok(Personality::Playful),
            other => Err(format!("invalid personality: '{other}'")),
        }
    }
}

impl Default for Personality {
    fn default() -> Self {
        Personality::Friendly
    }
}

/// Conversation language tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Language {
    #[serde(rename = "pt-BR")]
    PtBr,
    #[serde(rename = "en-US")]
    EnUs,
    #[serde(rename = "es-ES")]
    EsEs,
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Language::PtBr => write!(f, "pt-BR"),
            Language::EnUs => write!(f, "en-US"),
            Language::EsEs => write!(f, "es-ES"),
        }
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pt-br" => Ok(Language::PtBr),
            "en-us" => Ok(Language::EnUs),
            "es-es" => Ok(Language::EsEs),
            other => Err(format!("invalid language: '{other}'")),
        }
    }
}

impl Default for Language {
    fn default() -> Self {
        Language::PtBr
    }
}

/// Response-speed tier. Each tier maps to a reply delay in the store config.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ResponseSpeed {
    #[serde(rename = "Rápido")]
    Fast,
    #[serde(rename = "Normal")]
    Normal,
    #[serde(rename = "Detalhado")]
    Detailed,
}

impl fmt::Display for ResponseSpeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResponseSpeed::Fast => write!(f, "Rápido"),
            ResponseSpeed::Normal => write!(f, "Normal"),
            ResponseSpeed::Detailed => write!(f, "Detalhado"),
        }
    }
}

impl FromStr for ResponseSpeed {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "rápido" | "rapido" | "fast" => Ok(ResponseSpeed::Fast),
            "normal" => Ok(ResponseSpeed::Normal),
            "detalhado" | "detailed" => Ok(ResponseSpeed::Detailed),
            other => Err(format!("invalid response speed: '{other}'")),
        }
    }
}

impl Default for ResponseSpeed {
    fn default() -> Self {
        ResponseSpeed::Normal
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AiModel {
    #[serde(rename = "gpt-3.5-turbo")]
    Gpt35Turbo,
    #[serde(rename = "gpt-4")]
    Gpt4,
    #[serde(rename = "claude-3")]
    Claude3,
    #[serde(rename = "gemini-pro")]
    GeminiPro,
}

impl fmt::Display for AiModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AiModel::Gpt35Turbo => write!(f, "gpt-3.5-turbo"),
            AiModel::Gpt4 => write!(f, "gpt-4"),
            AiModel::Claude3 => write!(f, "claude-3"),
            AiModel::GeminiPro => write!(f, "gemini-pro"),
        }
    }
}

/// Where the bot's training material comes from (creation wizard choice).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KnowledgeSource {
    Files,
    Conversation,
    Websites,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnowledgeBase {
    #[serde(default)]
    pub files: Vec<String>,
    #[serde(default)]
    pub conversations: Vec<String>,
    #[serde(default)]
    pub websites: Vec<String>,
}

/// Messaging channel a bot is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntegrationKind {
    Whatsapp,
    Telegram,
    Website,
}

impl fmt::Display for IntegrationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IntegrationKind::Whatsapp => write!(f, "whatsapp"),
            IntegrationKind::Telegram => write!(f, "telegram"),
            IntegrationKind::Website => write!(f, "website"),
        }
    }
}

impl FromStr for IntegrationKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "whatsapp" => Ok(IntegrationKind::Whatsapp),
            "telegram" => Ok(IntegrationKind::Telegram),
            "website" => Ok(IntegrationKind::Website),
            other => Err(format!("invalid integration type: '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntegrationStatus {
    Connected,
    Pending,
    Disconnected,
}

impl fmt::Display for IntegrationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IntegrationStatus::Connected => write!(f, "connected"),
            IntegrationStatus::Pending => write!(f, "pending"),
            IntegrationStatus::Disconnected => write!(f, "disconnected"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Integration {
    #[serde(rename = "type")]
    pub kind: IntegrationKind,
    pub status: IntegrationStatus,
}

/// Request to create a new bot. Only `name` and `description` are required --
/// everything else gets defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBotRequest {
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub personality: Option<Personality>,
    #[serde(default)]
    pub knowledge_source: Option<KnowledgeSource>,
    #[serde(default)]
    pub welcome_message: Option<String>,
    #[serde(default)]
    pub language: Option<Language>,
    #[serde(default)]
    pub response_time: Option<ResponseSpeed>,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub ai_model: Option<AiModel>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
}

impl CreateBotRequest {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            ..Default::default()
        }
    }
}

/// Partial update for a bot. `None` fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBotRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub personality: Option<Personality>,
    #[serde(default)]
    pub is_active: Option<bool>,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub welcome_message: Option<String>,
    #[serde(default)]
    pub language: Option<Language>,
    #[serde(default)]
    pub response_time: Option<ResponseSpeed>,
    #[serde(default)]
    pub knowledge_base: Option<KnowledgeBase>,
    #[serde(default)]
    pub integration: Option<Integration>,
    #[serde(default)]
    pub ai_model: Option<AiModel>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
}

/// Default greeting for a bot that was created without one.
pub fn default_welcome_message(name: &str) -> String {
    format!("Olá! Sou o {name}, como posso ajudar?")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bot_id_display() {
        let id = BotId::new();
        let s = id.to_string();
        let parsed: BotId = s.parse().unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn test_personality_serializes_as_label() {
        let json = serde_json::to_string(&Personality::Friendly).unwrap();
        assert_eq!(json, "\"Amigável\"");
        let parsed: Personality = serde_json::from_str("\"Divertido\"").unwrap();
        assert_eq!(parsed, Personality::Playful);
    }

    #[test]
    fn test_personality_from_str_accepts_aliases() {
        assert_eq!("amigavel".parse::<Personality>().unwrap(), Personality::Friendly);
        assert_eq!("FORMAL".parse::<Personality>().unwrap(), Personality::Formal);
        assert!("grumpy".parse::<Personality>().is_err());
    }

    #[test]
    fn test_defaults() {
        assert_eq!(Personality::default(), Personality::Friendly);
        assert_eq!(Language::default(), Language::PtBr);
        assert_eq!(ResponseSpeed::default(), ResponseSpeed::Normal);
    }

    #[test]
    fn test_response_speed_ordering() {
        assert!(ResponseSpeed::Fast < ResponseSpeed::Normal);
        assert!(ResponseSpeed::Normal < ResponseSpeed::Detailed);
    }

    #[test]
    fn test_default_welcome_message() {
        assert_eq!(
            default_welcome_message("Luna"),
            "Olá! Sou o Luna, como posso ajudar?"
        );
    }

    #[test]
    fn test_bot_serializes_camel_case() {
        let bot = Bot {
            id: BotId::new(),
            name: "Luna".to_string(),
            description: "d".to_string(),
            personality: Personality::Formal,
            created_at: Utc::now(),
            is_active: true,
            stats: BotStats::default(),
            avatar: None,
            welcome_message: Some("oi".to_string()),
            language: Some(Language::EnUs),
            response_time: Some(ResponseSpeed::Fast),
            knowledge_base: None,
            integration: Some(Integration {
                kind: IntegrationKind::Whatsapp,
                status: IntegrationStatus::Pending,
            }),
            ai_model: None,
            tags: None,
            owner_id: None,
        };
        let json = serde_json::to_value(&bot).unwrap();
        assert_eq!(json["isActive"], true);
        assert_eq!(json["welcomeMessage"], "oi");
        assert_eq!(json["responseTime"], "Rápido");
        assert_eq!(json["language"], "en-US");
        assert_eq!(json["integration"]["type"], "whatsapp");
        assert!(json.get("avatar").is_none());
    }

    #[test]
    fn test_create_request_deserializes_with_defaults() {
        let req: CreateBotRequest =
            serde_json::from_str(r#"{"name":"X","description":"d"}"#).unwrap();
        assert_eq!(req.name, "X");
        assert!(req.personality.is_none());
        assert!(req.response_time.is_none());
    }
}
