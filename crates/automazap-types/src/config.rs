//! Application configuration types for AutomaZap.
//!
//! `AppConfig` represents the top-level `config.toml` that controls the
//! simulated delays of the mock store and services.

use serde::{Deserialize, Serialize};

use std::time::Duration;

use crate::bot::ResponseSpeed;

/// Top-level configuration.
///
/// Loaded from `~/.automazap/config.toml`. All fields have sensible defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Reply delay per response-speed tier.
    #[serde(default)]
    pub reply_delays: ReplyDelays,

    /// How long the simulated WhatsApp QR pairing takes.
    #[serde(default = "default_integration_connect_ms")]
    pub integration_connect_ms: u64,

    /// Simulated login/signup round trip.
    #[serde(default = "default_auth_delay_ms")]
    pub auth_delay_ms: u64,

    /// Simulated profile update round trip.
    #[serde(default = "default_profile_delay_ms")]
    pub profile_delay_ms: u64,

    /// Simulated payment processing.
    #[serde(default = "default_payment_delay_ms")]
    pub payment_delay_ms: u64,

    /// Simulated subscription cancellation.
    #[serde(default = "default_cancel_delay_ms")]
    pub cancel_delay_ms: u64,

    /// Capacity of the broadcast event channel.
    #[serde(default = "default_event_capacity")]
    pub event_capacity: usize,
}

fn default_integration_connect_ms() -> u64 {
    3_000
}

fn default_auth_delay_ms() -> u64 {
    800
}

fn default_profile_delay_ms() -> u64 {
    500
}

fn default_payment_delay_ms() -> u64 {
    2_000
}

fn default_cancel_delay_ms() -> u64 {
    1_000
}

fn default_event_capacity() -> usize {
    256
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            reply_delays: ReplyDelays::default(),
            integration_connect_ms: default_integration_connect_ms(),
            auth_delay_ms: default_auth_delay_ms(),
            profile_delay_ms: default_profile_delay_ms(),
            payment_delay_ms: default_payment_delay_ms(),
            cancel_delay_ms: default_cancel_delay_ms(),
            event_capacity: default_event_capacity(),
        }
    }
}

impl AppConfig {
    pub fn integration_connect_delay(&self) -> Duration {
        Duration::from_millis(self.integration_connect_ms)
    }

    pub fn auth_delay(&self) -> Duration {
        Duration::from_millis(self.auth_delay_ms)
    }

    pub fn profile_delay(&self) -> Duration {
        Duration::from_millis(self.profile_delay_ms)
    }

    pub fn payment_delay(&self) -> Duration {
        Duration::from_millis(self.payment_delay_ms)
    }

    pub fn cancel_delay(&self) -> Duration {
        Duration::from_millis(self.cancel_delay_ms)
    }

    /// A config with every delay set to zero (tests, scripted demos).
    pub fn instant() -> Self {
        Self {
            reply_delays: ReplyDelays {
                fast_ms: 0,
                normal_ms: 0,
                detailed_ms: 0,
            },
            integration_connect_ms: 0,
            auth_delay_ms: 0,
            profile_delay_ms: 0,
            payment_delay_ms: 0,
            cancel_delay_ms: 0,
            event_capacity: default_event_capacity(),
        }
    }
}

/// Milliseconds to wait before a synthetic reply, per speed tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplyDelays {
    #[serde(default = "default_fast_ms")]
    pub fast_ms: u64,
    #[serde(default = "default_normal_ms")]
    pub normal_ms: u64,
    #[serde(default = "default_detailed_ms")]
    pub detailed_ms: u64,
}

fn default_fast_ms() -> u64 {
    500
}

fn default_normal_ms() -> u64 {
    1_000
}

fn default_detailed_ms() -> u64 {
    2_000
}

impl Default for ReplyDelays {
    fn default() -> Self {
        Self {
            fast_ms: default_fast_ms(),
            normal_ms: default_normal_ms(),
            detailed_ms: default_detailed_ms(),
        }
    }
}

impl ReplyDelays {
    pub fn for_speed(&self, speed: ResponseSpeed) -> Duration {
        let ms = match speed {
            ResponseSpeed::Fast => self.fast_ms,
            ResponseSpeed::Normal => self.normal_ms,
            ResponseSpeed::Detailed => self.detailed_ms,
        };
        Duration::from_millis(ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_config_default_values() {
        let config = AppConfig::default();
        assert_eq!(config.reply_delays.fast_ms, 500);
        assert_eq!(config.reply_delays.normal_ms, 1_000);
        assert_eq!(config.reply_delays.detailed_ms, 2_000);
        assert_eq!(config.integration_connect_ms, 3_000);
        assert_eq!(config.event_capacity, 256);
    }

    #[test]
    fn test_app_config_deserialize_with_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_app_config_deserialize_partial_table() {
        let toml_str = r#"
payment_delay_ms = 10

[reply_delays]
fast_ms = 50
"#;
        let config: AppConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.payment_delay_ms, 10);
        assert_eq!(config.reply_delays.fast_ms, 50);
        assert_eq!(config.reply_delays.normal_ms, 1_000);
        assert_eq!(config.auth_delay_ms, 800);
    }

    #[test]
    fn test_reply_delays_increase_with_tier() {
        let delays = ReplyDelays::default();
        assert!(delays.for_speed(ResponseSpeed::Fast) < delays.for_speed(ResponseSpeed::Normal));
        assert!(
            delays.for_speed(ResponseSpeed::Normal) < delays.for_speed(ResponseSpeed::Detailed)
        );
    }

    #[test]
    fn test_instant_has_no_delays() {
        let config = AppConfig::instant();
        assert_eq!(config.reply_delays.for_speed(ResponseSpeed::Detailed), Duration::ZERO);
        assert_eq!(config.payment_delay(), Duration::ZERO);
    }
}
