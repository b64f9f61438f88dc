//! Account-holder profile (the person managing bots, not their end users).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionStatus {
    Trial,
    Active,
    Expired,
    Canceled,
}

impl fmt::Display for SubscriptionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubscriptionStatus::Trial => write!(f, "trial"),
            SubscriptionStatus::Active => write!(f, "active"),
            SubscriptionStatus::Expired => write!(f, "expired"),
            SubscriptionStatus::Canceled => write!(f, "canceled"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentKind {
    CreditCard,
    Paypal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentMethod {
    #[serde(rename = "type")]
    pub kind: PaymentKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_four: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry_date: Option<String>,
}

/// The logged-in account. This is the single object kept in session storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    pub email: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    pub subscription_status: SubscriptionStatus,
    /// Id of the subscribed plan.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subscription_plan: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subscription_end_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_login: Option<DateTime<Utc>>,
    pub bots_created: u64,
    pub messages_used: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<PaymentMethod>,
}

/// Partial profile update. `None` fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub subscription_status: Option<SubscriptionStatus>,
    #[serde(default)]
    pub subscription_plan: Option<String>,
    #[serde(default)]
    pub subscription_end_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub payment_method: Option<PaymentMethod>,
}

impl UserProfile {
    /// Shallow-merge `update` into this profile.
    pub fn apply(&mut self, update: ProfileUpdate) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(email) = update.email {
            self.email = email;
        }
        if let Some(company) = update.company {
            self.company = Some(company);
        }
        if let Some(status) = update.subscription_status {
            self.subscription_status = status;
        }
        if let Some(plan) = update.subscription_plan {
            self.subscription_plan = Some(plan);
        }
        if let Some(end) = update.subscription_end_date {
            self.subscription_end_date = Some(end);
        }
        if let Some(payment) = update.payment_method {
            self.payment_method = Some(payment);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> UserProfile {
        UserProfile {
            id: "user-1".to_string(),
            email: "demo@example.com".to_string(),
            name: "Demo User".to_string(),
            company: None,
            subscription_status: SubscriptionStatus::Trial,
            subscription_plan: None,
            subscription_end_date: None,
            created_at: Utc::now(),
            last_login: None,
            bots_created: 0,
            messages_used: 0,
            payment_method: None,
        }
    }

    #[test]
    fn test_apply_merges_only_set_fields() {
        let mut p = profile();
        p.apply(ProfileUpdate {
            company: Some("Acme".to_string()),
            subscription_status: Some(SubscriptionStatus::Active),
            ..Default::default()
        });
        assert_eq!(p.company.as_deref(), Some("Acme"));
        assert_eq!(p.subscription_status, SubscriptionStatus::Active);
        assert_eq!(p.name, "Demo User");
    }

    #[test]
    fn test_profile_json_roundtrip() {
        let mut p = profile();
        p.payment_method = Some(PaymentMethod {
            kind: PaymentKind::CreditCard,
            last_four: Some("4242".to_string()),
            expiry_date: Some("12/24".to_string()),
        });
        let json = serde_json::to_string(&p).unwrap();
        assert!(json.contains("\"subscriptionStatus\":\"trial\""));
        assert!(json.contains("\"type\":\"credit_card\""));
        let parsed: UserProfile = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, p);
    }
}
