//! Demonstration data: the sample sales bot, a few of its end users, and
//! a week of analytics.

use std::collections::HashMap;

use automazap_types::analytics::{BotAnalytics, DailyStat, TopQuestion};
use automazap_types::bot::{Bot, BotId, BotStats, Language, Personality, ResponseSpeed};
use automazap_types::user::{BotInteraction, EndUser, UserId};
use chrono::{DateTime, Duration, TimeZone, Utc};
use uuid::Uuid;

/// Fixed id of the demo bot, stable across processes.
pub const DEMO_BOT_ID: BotId = BotId(Uuid::from_u128(0x0196_5f0e_d000_7000_8000_00de_7000_0001));

const DEMO_DAILY_MESSAGES: [u64; 7] = [28, 35, 31, 42, 38, 33, 38];
const DEMO_DAILY_USERS: [u64; 7] = [5, 7, 6, 9, 8, 6, 7];
const DEMO_DAILY_RESPONSE: [f64; 7] = [1.2, 1.1, 1.3, 1.0, 1.2, 1.1, 1.0];

pub(crate) fn demo_bot(created_at: DateTime<Utc>) -> Bot {
    Bot {
        id: DEMO_BOT_ID,
        name: "Assistente de Vendas".to_string(),
        description: "Um bot para ajudar com vendas e atendimento ao cliente".to_string(),
        personality: Personality::Friendly,
        created_at,
        is_active: true,
        stats: BotStats {
            messages: 245,
            users: 18,
        },
        avatar: None,
        welcome_message: Some(
            "Olá! Como posso ajudar com suas dúvidas sobre nossos produtos?".to_string(),
        ),
        language: Some(Language::PtBr),
        response_time: Some(ResponseSpeed::Normal),
        knowledge_base: None,
        integration: None,
        ai_model: None,
        tags: None,
        owner_id: None,
    }
}

/// The demo bot's creation date.
pub(crate) fn demo_created_at() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 4, 23, 0, 0, 0)
        .single()
        .unwrap_or_else(Utc::now)
}

/// Seven days of analytics ending on `today`.
pub(crate) fn demo_analytics(bot_id: BotId, today: DateTime<Utc>) -> BotAnalytics {
    let first_day = today.date_naive() - Duration::days(6);
    let daily_stats = (0..7)
        .map(|i| DailyStat {
            date: first_day + Duration::days(i as i64),
            message_count: DEMO_DAILY_MESSAGES[i],
            user_count: DEMO_DAILY_USERS[i],
            response_time: DEMO_DAILY_RESPONSE[i],
        })
        .collect();

    let top_questions = [
        ("Qual o prazo de entrega?", 42),
        ("Quais as formas de pagamento?", 35),
        ("Vocês têm loja física?", 21),
        ("Como faço para trocar um produto?", 17),
        ("Tem desconto para compras em quantidade?", 12),
    ]
    .into_iter()
    .map(|(question, count)| TopQuestion {
        question: question.to_string(),
        count,
    })
    .collect();

    BotAnalytics {
        bot_id,
        daily_stats,
        top_questions,
        user_satisfaction: 92.0,
        average_response_time: 1.1,
    }
}

/// End users who have already talked to the demo bot.
pub(crate) fn demo_users(bot_id: BotId, now: DateTime<Utc>) -> Vec<EndUser> {
    [
        ("user-maria", "Maria Silva", "+55 11 98765-4321", "maria.silva@example.com", 34),
        ("user-joao", "João Santos", "+55 21 99876-5432", "joao.santos@example.com", 21),
        ("user-ana", "Ana Oliveira", "+55 31 97654-3210", "ana.oliveira@example.com", 12),
    ]
    .into_iter()
    .enumerate()
    .map(|(i, (id, name, phone, email, count))| {
        let last = now - Duration::hours(3 * (i as i64 + 1));
        let mut bot_interactions = HashMap::new();
        bot_interactions.insert(
            bot_id,
            BotInteraction {
                message_count: count,
                last_interaction: last,
            },
        );
        EndUser {
            id: UserId::from(id),
            name: name.to_string(),
            phone_number: Some(phone.to_string()),
            email: Some(email.to_string()),
            last_interaction: Some(last),
            total_interactions: count,
            bot_interactions,
        }
    })
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_analytics_cover_a_week_ending_today() {
        let now = Utc::now();
        let analytics = demo_analytics(BotId::new(), now);
        assert_eq!(analytics.daily_stats.len(), 7);
        assert_eq!(
            analytics.daily_stats.last().map(|s| s.date),
            Some(now.date_naive())
        );
        assert!(analytics
            .daily_stats
            .windows(2)
            .all(|w| w[0].date < w[1].date));
    }

    #[test]
    fn demo_bot_id_is_stable() {
        assert_eq!(demo_bot(demo_created_at()).id, DEMO_BOT_ID);
        assert_eq!(
            DEMO_BOT_ID.to_string().parse::<BotId>().unwrap(),
            demo_bot(Utc::now()).id
        );
    }

    #[test]
    fn demo_users_reference_demo_bot() {
        let bot = demo_bot(demo_created_at());
        let users = demo_users(bot.id, Utc::now());
        assert!(users.iter().all(|u| u.has_talked_to(&bot.id)));
    }
}
