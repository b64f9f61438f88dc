use serde::{Deserialize, Serialize};

/// Feature flags bundled with a plan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanIncludes {
    pub file_upload: bool,
    pub api_access: bool,
    pub priority_support: bool,
    pub advanced_analytics: bool,
    pub custom_branding: bool,
    pub multi_language: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionPlan {
    pub id: String,
    pub name: String,
    /// Monthly price in BRL.
    pub price: u32,
    pub features: Vec<String>,
    /// Maximum active bots. `None` means unlimited.
    pub bot_limit: Option<u32>,
    /// Messages per month.
    pub message_limit: u32,
    pub includes: PlanIncludes,
}

impl SubscriptionPlan {
    pub fn is_free(&self) -> bool {
        self.price == 0
    }

    pub fn allows_bots(&self, count: u32) -> bool {
        self.bot_limit.is_none_or(|limit| count <= limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan(bot_limit: Option<u32>) -> SubscriptionPlan {
        SubscriptionPlan {
            id: "p".to_string(),
            name: "P".to_string(),
            price: 0,
            features: Vec::new(),
            bot_limit,
            message_limit: 100,
            includes: PlanIncludes::default(),
        }
    }

    #[test]
    fn test_allows_bots() {
        assert!(plan(Some(1)).allows_bots(1));
        assert!(!plan(Some(1)).allows_bots(2));
        assert!(plan(None).allows_bots(1_000));
    }
}
