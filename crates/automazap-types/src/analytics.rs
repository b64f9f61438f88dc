//! Per-bot analytics record.
//!
//! Daily counters are maintained by the store as messages flow. The
//! top-question list and satisfaction score are static seed data.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::bot::BotId;

/// Message and user counts for a single calendar day (UTC).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyStat {
    /// Serialized as `YYYY-MM-DD`.
    pub date: NaiveDate,
    pub message_count: u64,
    pub user_count: u64,
    /// Reply latency observed that day, in seconds.
    pub response_time: f64,
}

impl DailyStat {
    pub fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            message_count: 0,
            user_count: 0,
            response_time: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopQuestion {
    pub question: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BotAnalytics {
    pub bot_id: BotId,
    /// Kept sorted by ascending date, at most one entry per day.
    pub daily_stats: Vec<DailyStat>,
    pub top_questions: Vec<TopQuestion>,
    /// Satisfaction score on a 0-100 scale.
    pub user_satisfaction: f64,
    /// Mean reply latency in seconds.
    pub average_response_time: f64,
}

impl BotAnalytics {
    /// Empty record seeded when a bot is created.
    pub fn empty(bot_id: BotId) -> Self {
        Self {
            bot_id,
            daily_stats: Vec::new(),
            top_questions: Vec::new(),
            user_satisfaction: 0.0,
            average_response_time: 0.0,
        }
    }

    /// Get the stat entry for `date`, inserting an empty one at its sorted
    /// position if the day has no entry yet.
    pub fn day_mut(&mut self, date: NaiveDate) -> &mut DailyStat {
        let idx = match self.daily_stats.binary_search_by(|s| s.date.cmp(&date)) {
            Ok(idx) => idx,
            Err(idx) => {
                self.daily_stats.insert(idx, DailyStat::empty(date));
                idx
            }
        };
        &mut self.daily_stats[idx]
    }

    pub fn day(&self, date: NaiveDate) -> Option<&DailyStat> {
        self.daily_stats.iter().find(|s| s.date == date)
    }

    pub fn total_messages(&self) -> u64 {
        self.daily_stats.iter().map(|s| s.message_count).sum()
    }
}
