//! In-memory bot/session store.
//!
//! `BotStore` owns the bot registry, message threads, end-user records and
//! per-bot analytics. It is constructed once per application session and
//! shared by cloning (all clones see the same state). Every operation holds
//! a single write lock for its state transition, so each transition is
//! applied atomically with respect to the others.
//!
//! The only suspension points are the delayed steps: the synthetic reply
//! after `send_message` and the simulated integration pairing. Both run as
//! spawned tasks with cancellation tokens; see [`PendingTask`].

mod seed;
mod task;

use std::sync::Arc;
use std::time::Duration;

use automazap_types::analytics::BotAnalytics;
use automazap_types::bot::{
    Bot, BotId, BotStats, CreateBotRequest, Integration, IntegrationKind, IntegrationStatus,
    KnowledgeBase, UpdateBotRequest, default_welcome_message,
};
use automazap_types::config::{AppConfig, ReplyDelays};
use automazap_types::error::StoreError;
use automazap_types::event::{AppEvent, Notice};
use automazap_types::message::Message;
use automazap_types::user::{BotInteraction, EndUser, UserId};
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::event::EventBus;
use crate::reply::{self, ReplySource, START_CONVERSATION};

pub use seed::DEMO_BOT_ID;
pub use task::{PendingReply, PendingTask};
use task::TaskRegistry;

const EMBED_SCRIPT_URL: &str = "https://automazap.com/embed.js";

/// Delays used by the store's simulated background work.
#[derive(Debug, Clone, Copy)]
pub struct StoreTimings {
    pub reply_delays: ReplyDelays,
    pub integration_connect: Duration,
}

impl Default for StoreTimings {
    fn default() -> Self {
        Self::from_config(&AppConfig::default())
    }
}

impl StoreTimings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            reply_delays: config.reply_delays,
            integration_connect: config.integration_connect_delay(),
        }
    }
}

#[derive(Debug, Default)]
struct StoreState {
    bots: Vec<Bot>,
    messages: Vec<Message>,
    users: Vec<EndUser>,
    analytics: Vec<BotAnalytics>,
}

impl StoreState {
    fn bot(&self, id: &BotId) -> Option<&Bot> {
        self.bots.iter().find(|b| &b.id == id)
    }

    fn bot_mut(&mut self, id: &BotId) -> Option<&mut Bot> {
        self.bots.iter_mut().find(|b| &b.id == id)
    }

    /// Analytics record for `bot_id`, created empty if missing.
    fn analytics_mut(&mut self, bot_id: &BotId) -> &mut BotAnalytics {
        let idx = match self.analytics.iter().position(|a| &a.bot_id == bot_id) {
            Some(idx) => idx,
            None => {
                self.analytics.push(BotAnalytics::empty(*bot_id));
                self.analytics.len() - 1
            }
        };
        &mut self.analytics[idx]
    }

    /// User record for `user_id`, created on first contact.
    fn user_mut(&mut self, user_id: &UserId) -> &mut EndUser {
        let idx = match self.users.iter().position(|u| &u.id == user_id) {
            Some(idx) => idx,
            None => {
                debug!(user_id = %user_id, "Creating user record on first contact");
                self.users.push(EndUser::first_contact(user_id.clone()));
                self.users.len() - 1
            }
        };
        &mut self.users[idx]
    }
}

struct StoreInner {
    state: RwLock<StoreState>,
    events: EventBus,
    replies: Arc<dyn ReplySource>,
    timings: StoreTimings,
    tasks: TaskRegistry,
    /// Parent of every task token; cancelled by [`BotStore::shutdown`].
    root: CancellationToken,
}

/// Shared handle to the in-memory store.
#[derive(Clone)]
pub struct BotStore {
    inner: Arc<StoreInner>,
}

impl std::fmt::Debug for BotStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BotStore")
            .field("pending_tasks", &self.inner.tasks.len())
            .finish()
    }
}

impl BotStore {
    /// Create an empty store.
    pub fn new(events: EventBus, replies: Arc<dyn ReplySource>, timings: StoreTimings) -> Self {
        Self {
            inner: Arc::new(StoreInner {
                state: RwLock::new(StoreState::default()),
                events,
                replies,
                timings,
                tasks: TaskRegistry::default(),
                root: CancellationToken::new(),
            }),
        }
    }

    pub fn events(&self) -> &EventBus {
        &self.inner.events
    }

    /// Insert the demonstration bot, its end users and a week of analytics.
    /// Seeding an already seeded store returns the existing demo bot.
    pub async fn seed_demo(&self) -> Bot {
        let now = Utc::now();
        let bot = seed::demo_bot(seed::demo_created_at());
        let mut state = self.inner.state.write().await;
        if let Some(existing) = state.bot(&bot.id) {
            return existing.clone();
        }
        state.analytics.push(seed::demo_analytics(bot.id, now));
        state.users.extend(seed::demo_users(bot.id, now));
        state.bots.push(bot.clone());
        info!(bot_id = %bot.id, "Seeded demo bot");
        bot
    }

    // --- Bot CRUD ---

    /// Create a bot from `request`, filling in defaults, and seed its
    /// analytics record. Emits a success notice and a redirect to the
    /// dashboard.
    pub async fn create_bot(&self, request: CreateBotRequest) -> Bot {
        let welcome_message = request
            .welcome_message
            .unwrap_or_else(|| default_welcome_message(&request.name));

        let bot = Bot {
            id: BotId::new(),
            name: request.name,
            description: request.description,
            personality: request.personality.unwrap_or_default(),
            created_at: Utc::now(),
            is_active: true,
            stats: BotStats::default(),
            avatar: request.avatar,
            welcome_message: Some(welcome_message),
            language: Some(request.language.unwrap_or_default()),
            response_time: Some(request.response_time.unwrap_or_default()),
            knowledge_base: request.knowledge_source.map(|_| KnowledgeBase::default()),
            integration: None,
            ai_model: request.ai_model,
            tags: request.tags,
            owner_id: None,
        };

        {
            let mut state = self.inner.state.write().await;
            state.bots.push(bot.clone());
            state.analytics.push(BotAnalytics::empty(bot.id));
        }

        info!(bot_id = %bot.id, name = %bot.name, "Bot created");
        self.inner.events.publish(AppEvent::BotCreated { bot_id: bot.id });
        self.inner.events.notify(Notice::success("Bot criado com sucesso!"));
        self.inner.events.navigate("/dashboard");
        bot
    }

    /// Delete a bot together with its messages and analytics, cancelling any
    /// reply still pending for it. Returns `false` if the bot did not exist.
    pub async fn delete_bot(&self, id: &BotId) -> bool {
        let messages_removed = {
            let mut state = self.inner.state.write().await;
            let before = state.bots.len();
            state.bots.retain(|b| &b.id != id);
            if state.bots.len() == before {
                debug!(bot_id = %id, "Delete requested for unknown bot");
                return false;
            }

            let messages_before = state.messages.len();
            state.messages.retain(|m| &m.bot_id != id);
            state.analytics.retain(|a| &a.bot_id != id);
            // Cancel under the lock so no pending reply can slip in afterwards.
            let cancelled = self.inner.tasks.cancel_for_bot(id);
            if cancelled > 0 {
                debug!(bot_id = %id, cancelled, "Cancelled pending tasks for deleted bot");
            }
            messages_before - state.messages.len()
        };

        info!(bot_id = %id, messages_removed, "Bot deleted");
        self.inner.events.publish(AppEvent::BotDeleted {
            bot_id: *id,
            messages_removed,
        });
        self.inner.events.notify(Notice::success("Bot excluído com sucesso!"));
        true
    }

    pub async fn get_bot(&self, id: &BotId) -> Option<Bot> {
        self.inner.state.read().await.bot(id).cloned()
    }

    /// All bots in creation order.
    pub async fn list_bots(&self) -> Vec<Bot> {
        self.inner.state.read().await.bots.clone()
    }

    pub async fn get_user(&self, id: &UserId) -> Option<EndUser> {
        self.inner
            .state
            .read()
            .await
            .users
            .iter()
            .find(|u| &u.id == id)
            .cloned()
    }

    pub async fn list_users(&self) -> Vec<EndUser> {
        self.inner.state.read().await.users.clone()
    }

    pub async fn get_bot_analytics(&self, bot_id: &BotId) -> Option<BotAnalytics> {
        self.inner
            .state
            .read()
            .await
            .analytics
            .iter()
            .find(|a| &a.bot_id == bot_id)
            .cloned()
    }

    /// Shallow-merge `update` into the bot. Returns the updated bot, or
    /// `None` (plus a not-found notice) if there is no such bot.
    pub async fn update_bot(&self, id: &BotId, update: UpdateBotRequest) -> Option<Bot> {
        let updated = {
            let mut state = self.inner.state.write().await;
            state.bot_mut(id).map(|bot| {
                apply_update(bot, update);
                bot.clone()
            })
        };

        match updated {
            Some(bot) => {
                info!(bot_id = %id, "Bot updated");
                self.inner.events.publish(AppEvent::BotUpdated { bot_id: *id });
                self.inner
                    .events
                    .notify(Notice::success("Bot atualizado com sucesso!"));
                Some(bot)
            }
            None => {
                self.not_found(id);
                None
            }
        }
    }

    /// Flip the bot's active flag. Returns the new value, or `None` if the
    /// bot does not exist.
    pub async fn toggle_bot_status(&self, id: &BotId) -> Option<bool> {
        let toggled = {
            let mut state = self.inner.state.write().await;
            state.bot_mut(id).map(|bot| {
                bot.is_active = !bot.is_active;
                bot.is_active
            })
        };

        match toggled {
            Some(is_active) => {
                info!(bot_id = %id, is_active, "Bot status toggled");
                self.inner.events.publish(AppEvent::BotUpdated { bot_id: *id });
                let title = if is_active {
                    "Bot ativado com sucesso!"
                } else {
                    "Bot desativado com sucesso!"
                };
                self.inner.events.notify(Notice::success(title));
                Some(is_active)
            }
            None => {
                self.not_found(id);
                None
            }
        }
    }

    fn not_found(&self, id: &BotId) {
        warn!(bot_id = %id, "Bot not found");
        self.inner.events.notify(Notice::error("Bot não encontrado!"));
    }

    // --- Messaging ---

    /// Send `content` from `user_id` to the bot, scheduling the reply under
    /// the store's own lifetime.
    pub async fn send_message(
        &self,
        bot_id: &BotId,
        content: &str,
        user_id: &UserId,
    ) -> Result<PendingReply, StoreError> {
        let root = self.inner.root.clone();
        self.send_message_in(&root, bot_id, content, user_id).await
    }

    /// Send `content` from `user_id` to the bot.
    ///
    /// The user message and all counters are applied before this returns.
    /// The synthetic reply is scheduled under a child of `scope`: cancelling
    /// `scope` (e.g. when the chat view closes) drops the reply.
    ///
    /// The user-side update is not rolled back if the reply later fails.
    pub async fn send_message_in(
        &self,
        scope: &CancellationToken,
        bot_id: &BotId,
        content: &str,
        user_id: &UserId,
    ) -> Result<PendingReply, StoreError> {
        let now = Utc::now();
        let today = now.date_naive();

        let (user_message, speed) = {
            let mut state = self.inner.state.write().await;
            let Some(speed) = state.bot(bot_id).map(Bot::speed) else {
                drop(state);
                self.not_found(bot_id);
                return Err(StoreError::BotNotFound(*bot_id));
            };

            let (first_with_bot, first_today) = {
                let user = state.user_mut(user_id);
                let previous = user.bot_interactions.get(bot_id);
                let first_with_bot = previous.is_none();
                let first_today =
                    previous.is_none_or(|i| i.last_interaction.date_naive() != today);

                user.total_interactions += 1;
                user.last_interaction = Some(now);
                let interaction = user
                    .bot_interactions
                    .entry(*bot_id)
                    .or_insert(BotInteraction {
                        message_count: 0,
                        last_interaction: now,
                    });
                interaction.message_count += 1;
                interaction.last_interaction = now;
                (first_with_bot, first_today)
            };

            let mut message = Message::new(*bot_id, user_id.clone(), content.to_string(), true);
            message.timestamp = now;
            state.messages.push(message.clone());

            if let Some(bot) = state.bot_mut(bot_id) {
                bot.stats.messages += 1;
                if first_with_bot {
                    bot.stats.users += 1;
                }
            }

            let day = state.analytics_mut(bot_id).day_mut(today);
            day.message_count += 1;
            if first_today {
                day.user_count += 1;
            }

            (message, speed)
        };

        debug!(bot_id = %bot_id, user_id = %user_id, "User message appended");
        self.inner.events.publish(AppEvent::MessageAppended {
            message: user_message.clone(),
        });

        let delay = self.inner.timings.reply_delays.for_speed(speed);
        let task = self.schedule_reply(scope, user_message.clone(), delay);
        Ok(PendingReply::new(user_message, task))
    }

    fn schedule_reply(
        &self,
        scope: &CancellationToken,
        user_message: Message,
        delay: Duration,
    ) -> PendingTask<Message> {
        let task_id = Uuid::now_v7();
        let token = scope.child_token();
        let bot_id = user_message.bot_id;
        self.inner.tasks.insert(task_id, bot_id, token.clone());
        debug!(%task_id, bot_id = %bot_id, delay_ms = delay.as_millis() as u64, "Reply scheduled");

        let store = self.clone();
        let task_token = token.clone();
        let handle = tokio::spawn(async move {
            let _registered = Registered::new(&store, task_id);
            let outcome = tokio::select! {
                biased;
                _ = task_token.cancelled() => Err(StoreError::Cancelled),
                _ = tokio::time::sleep(delay) => {
                    let (step_store, step_token, step_message) =
                        (store.clone(), task_token.clone(), user_message.clone());
                    run_step(async move {
                        step_store.append_reply(&step_token, &step_message).await
                    })
                    .await
                }
            };

            match &outcome {
                Ok(reply) => {
                    store.inner.events.publish(AppEvent::MessageAppended {
                        message: reply.clone(),
                    });
                }
                Err(StoreError::Cancelled) => {
                    debug!(%task_id, bot_id = %bot_id, "Reply cancelled");
                }
                Err(err) => {
                    error!(%task_id, bot_id = %bot_id, error = %err, "Reply failed");
                    store.inner.events.publish(AppEvent::ReplyFailed {
                        task_id,
                        bot_id,
                        user_message_id: user_message.id,
                        error: err.to_string(),
                    });
                    store.inner.events.notify(
                        Notice::error("Erro ao enviar mensagem")
                            .with_description("Não foi possível obter a resposta do bot."),
                    );
                }
            }
            outcome
        });

        PendingTask::new(task_id, token, handle)
    }

    /// Append the synthetic reply for `user_message`.
    async fn append_reply(
        &self,
        token: &CancellationToken,
        user_message: &Message,
    ) -> Result<Message, StoreError> {
        let bot_id = user_message.bot_id;
        let mut state = self.inner.state.write().await;
        if token.is_cancelled() {
            return Err(StoreError::Cancelled);
        }

        let bot = state.bot(&bot_id).ok_or(StoreError::BotNotFound(bot_id))?;
        let content = match (&bot.welcome_message, user_message.content.as_str()) {
            (Some(welcome), START_CONVERSATION) => welcome.clone(),
            _ => {
                let seed = self.inner.replies.next_seed();
                reply::select_reply(bot.personality, seed).to_string()
            }
        };

        let reply = Message::new(bot_id, user_message.user_id.clone(), content, false);
        let latency = seconds_between(user_message.timestamp, reply.timestamp);
        state.messages.push(reply.clone());

        if let Some(bot) = state.bot_mut(&bot_id) {
            bot.stats.messages += 1;
        }
        record_latency(
            state.analytics_mut(&bot_id),
            reply.timestamp,
            latency,
        );

        debug!(bot_id = %bot_id, user_id = %reply.user_id, "Reply appended");
        Ok(reply)
    }

    /// Messages for a bot, optionally narrowed to one user, in ascending
    /// timestamp order (insertion order breaks ties).
    pub async fn get_messages(&self, bot_id: &BotId, user_id: Option<&UserId>) -> Vec<Message> {
        let state = self.inner.state.read().await;
        let mut messages: Vec<Message> = state
            .messages
            .iter()
            .filter(|m| &m.bot_id == bot_id)
            .filter(|m| user_id.is_none_or(|u| &m.user_id == u))
            .cloned()
            .collect();
        messages.sort_by_key(|m| m.timestamp);
        messages
    }

    /// End users who have talked to the bot.
    pub async fn get_bot_users(&self, bot_id: &BotId) -> Vec<EndUser> {
        self.inner
            .state
            .read()
            .await
            .users
            .iter()
            .filter(|u| u.has_talked_to(bot_id))
            .cloned()
            .collect()
    }

    /// End users of the bot whose name, phone or email contains `term`.
    pub async fn search_bot_users(&self, bot_id: &BotId, term: &str) -> Vec<EndUser> {
        let term = term.trim();
        self.get_bot_users(bot_id)
            .await
            .into_iter()
            .filter(|u| term.is_empty() || u.matches(term))
            .collect()
    }

    // --- Integrations ---

    /// Start pairing the bot with a channel. The integration is `pending`
    /// immediately and becomes `connected` once the simulated pairing delay
    /// elapses.
    pub async fn connect_integration(
        &self,
        bot_id: &BotId,
        kind: IntegrationKind,
    ) -> Result<PendingTask<Integration>, StoreError> {
        let pending = Integration {
            kind,
            status: IntegrationStatus::Pending,
        };
        if !self.set_integration(bot_id, pending).await {
            self.not_found(bot_id);
            return Err(StoreError::BotNotFound(*bot_id));
        }
        info!(bot_id = %bot_id, %kind, "Integration pairing started");

        let task_id = Uuid::now_v7();
        let token = self.inner.root.child_token();
        self.inner.tasks.insert(task_id, *bot_id, token.clone());

        let store = self.clone();
        let bot_id = *bot_id;
        let delay = self.inner.timings.integration_connect;
        let task_token = token.clone();
        let handle = tokio::spawn(async move {
            let _registered = Registered::new(&store, task_id);
            let outcome = tokio::select! {
                biased;
                _ = task_token.cancelled() => Err(StoreError::Cancelled),
                _ = tokio::time::sleep(delay) => {
                    let step_store = store.clone();
                    run_step(async move {
                        let connected = Integration {
                            kind,
                            status: IntegrationStatus::Connected,
                        };
                        if step_store.set_integration(&bot_id, connected).await {
                            Ok(connected)
                        } else {
                            Err(StoreError::BotNotFound(bot_id))
                        }
                    })
                    .await
                }
            };

            match &outcome {
                Ok(_) => {
                    info!(bot_id = %bot_id, %kind, "Integration connected");
                    store
                        .inner
                        .events
                        .notify(Notice::success(format!("{} conectado com sucesso!", kind_label(kind))));
                }
                Err(StoreError::Cancelled) => {
                    debug!(bot_id = %bot_id, "Integration pairing cancelled");
                }
                Err(err) => {
                    error!(bot_id = %bot_id, error = %err, "Integration pairing failed");
                    store.inner.events.notify(Notice::error("Erro ao conectar integração"));
                }
            }
            outcome
        });

        Ok(PendingTask::new(task_id, token, handle))
    }

    /// Mark the bot's integration as disconnected. Returns `false` if the bot
    /// does not exist or has no integration.
    pub async fn disconnect_integration(&self, bot_id: &BotId) -> bool {
        let current = self.get_bot(bot_id).await.and_then(|b| b.integration);
        match current {
            Some(integration) => {
                self.set_integration(
                    bot_id,
                    Integration {
                        status: IntegrationStatus::Disconnected,
                        ..integration
                    },
                )
                .await
            }
            None => false,
        }
    }

    async fn set_integration(&self, bot_id: &BotId, integration: Integration) -> bool {
        let applied = {
            let mut state = self.inner.state.write().await;
            match state.bot_mut(bot_id) {
                Some(bot) => {
                    bot.integration = Some(integration);
                    true
                }
                None => false,
            }
        };
        if applied {
            self.inner.events.publish(AppEvent::IntegrationChanged {
                bot_id: *bot_id,
                integration,
            });
        }
        applied
    }

    /// Script tag that embeds the bot's chat widget in a website.
    pub async fn embed_snippet(&self, bot_id: &BotId) -> Option<String> {
        self.get_bot(bot_id).await.map(|bot| embed_snippet_for(&bot.id))
    }

    // --- Lifecycle ---

    /// Number of delayed tasks still in flight.
    pub fn pending_tasks(&self) -> usize {
        self.inner.tasks.len()
    }

    /// Cancel every pending task. The store stays usable, but replies
    /// scheduled through [`send_message`](Self::send_message) afterwards are
    /// dropped immediately.
    pub fn shutdown(&self) {
        info!(pending = self.inner.tasks.len(), "Store shutting down");
        self.inner.root.cancel();
    }
}

/// Removes a task's registry entry when its future finishes or unwinds.
struct Registered {
    inner: Arc<StoreInner>,
    task_id: Uuid,
}

impl Registered {
    fn new(store: &BotStore, task_id: Uuid) -> Self {
        Self {
            inner: Arc::clone(&store.inner),
            task_id,
        }
    }
}

impl Drop for Registered {
    fn drop(&mut self) {
        self.inner.tasks.remove(&self.task_id);
    }
}

/// Run a delayed step on its own task so a panic inside it comes back as
/// `StoreError::TaskFailed` instead of unwinding through the caller.
async fn run_step<T, F>(step: F) -> Result<T, StoreError>
where
    F: Future<Output = Result<T, StoreError>> + Send + 'static,
    T: Send + 'static,
{
    tokio::spawn(step)
        .await
        .unwrap_or_else(|e| Err(StoreError::TaskFailed(e.to_string())))
}

fn apply_update(bot: &mut Bot, update: UpdateBotRequest) {
    if let Some(name) = update.name {
        bot.name = name;
    }
    if let Some(description) = update.description {
        bot.description = description;
    }
    if let Some(personality) = update.personality {
        bot.personality = personality;
    }
    if let Some(is_active) = update.is_active {
        bot.is_active = is_active;
    }
    if let Some(avatar) = update.avatar {
        bot.avatar = Some(avatar);
    }
    if let Some(welcome_message) = update.welcome_message {
        bot.welcome_message = Some(welcome_message);
    }
    if let Some(language) = update.language {
        bot.language = Some(language);
    }
    if let Some(response_time) = update.response_time {
        bot.response_time = Some(response_time);
    }
    if let Some(knowledge_base) = update.knowledge_base {
        bot.knowledge_base = Some(knowledge_base);
    }
    if let Some(integration) = update.integration {
        bot.integration = Some(integration);
    }
    if let Some(ai_model) = update.ai_model {
        bot.ai_model = Some(ai_model);
    }
    if let Some(tags) = update.tags {
        bot.tags = Some(tags);
    }
}

fn seconds_between(start: DateTime<Utc>, end: DateTime<Utc>) -> f64 {
    (end - start).num_milliseconds().max(0) as f64 / 1000.0
}

/// Record a reply latency on the day's entry and refresh the overall mean
/// over days that have one.
fn record_latency(analytics: &mut BotAnalytics, at: DateTime<Utc>, latency: f64) {
    if latency <= 0.0 {
        return;
    }
    analytics.day_mut(at.date_naive()).response_time = latency;
    let (sum, days) = analytics
        .daily_stats
        .iter()
        .filter(|s| s.response_time > 0.0)
        .fold((0.0, 0u32), |(sum, n), s| (sum + s.response_time, n + 1));
    if days > 0 {
        analytics.average_response_time = sum / f64::from(days);
    }
}

fn kind_label(kind: IntegrationKind) -> &'static str {
    match kind {
        IntegrationKind::Whatsapp => "WhatsApp",
        IntegrationKind::Telegram => "Telegram",
        IntegrationKind::Website => "Website",
    }
}

pub fn embed_snippet_for(bot_id: &BotId) -> String {
    format!(r#"<script src="{EMBED_SCRIPT_URL}" data-bot-id="{bot_id}"></script>"#)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reply::SequentialReplies;
    use automazap_types::bot::{Personality, ResponseSpeed};
    use automazap_types::event::NoticeLevel;
    use tokio::sync::broadcast;

    fn store() -> BotStore {
        BotStore::new(
            EventBus::new(64),
            Arc::new(SequentialReplies::starting_at(0)),
            StoreTimings::default(),
        )
    }

    fn drain(rx: &mut broadcast::Receiver<AppEvent>) -> Vec<AppEvent> {
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        events
    }

    #[tokio::test]
    async fn create_bot_applies_defaults() {
        let store = store();
        let bot = store.create_bot(CreateBotRequest::new("Luna", "d")).await;

        assert_eq!(bot.personality, Personality::Friendly);
        assert_eq!(bot.stats, BotStats::default());
        assert!(bot.is_active);
        assert_eq!(
            bot.welcome_message.as_deref(),
            Some("Olá! Sou o Luna, como posso ajudar?")
        );
        assert_eq!(bot.response_time, Some(ResponseSpeed::Normal));
        assert!(store.get_bot_analytics(&bot.id).await.is_some());
    }

    #[tokio::test]
    async fn create_bot_redirects_to_dashboard() {
        let store = store();
        let mut rx = store.events().subscribe();
        store.create_bot(CreateBotRequest::new("Luna", "d")).await;

        let events = drain(&mut rx);
        assert!(events
            .iter()
            .any(|e| matches!(e, AppEvent::Navigate { path } if path == "/dashboard")));
        assert!(events
            .iter()
            .any(|e| matches!(e, AppEvent::Notice(n) if n.level == NoticeLevel::Success)));
    }

    #[tokio::test]
    async fn created_bots_get_distinct_ids() {
        let store = store();
        let a = store.create_bot(CreateBotRequest::new("A", "d")).await;
        let b = store.create_bot(CreateBotRequest::new("A", "d")).await;
        assert_ne!(a.id, b.id);
        assert_eq!(store.list_bots().await.len(), 2);
    }

    #[tokio::test]
    async fn update_merges_only_given_fields() {
        let store = store();
        let bot = store.create_bot(CreateBotRequest::new("Luna", "d")).await;

        let updated = store
            .update_bot(
                &bot.id,
                UpdateBotRequest {
                    description: Some("nova".to_string()),
                    response_time: Some(ResponseSpeed::Fast),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.name, "Luna");
        assert_eq!(updated.description, "nova");
        assert_eq!(updated.response_time, Some(ResponseSpeed::Fast));
    }

    #[tokio::test]
    async fn update_unknown_bot_leaves_store_unchanged() {
        let store = store();
        store.create_bot(CreateBotRequest::new("Luna", "d")).await;
        let before = store.list_bots().await;
        let mut rx = store.events().subscribe();

        let result = store
            .update_bot(
                &BotId::new(),
                UpdateBotRequest {
                    name: Some("x".to_string()),
                    ..Default::default()
                },
            )
            .await;

        assert!(result.is_none());
        assert_eq!(store.list_bots().await, before);
        let events = drain(&mut rx);
        assert!(matches!(
            events.as_slice(),
            [AppEvent::Notice(n)] if n.level == NoticeLevel::Error
        ));
    }

    #[tokio::test]
    async fn toggle_flips_active_flag() {
        let store = store();
        let bot = store.create_bot(CreateBotRequest::new("Luna", "d")).await;

        assert_eq!(store.toggle_bot_status(&bot.id).await, Some(false));
        assert_eq!(store.toggle_bot_status(&bot.id).await, Some(true));
        assert_eq!(store.toggle_bot_status(&BotId::new()).await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn send_message_appends_user_message_then_reply() {
        let store = store();
        let bot = store.create_bot(CreateBotRequest::new("X", "d")).await;
        let user = UserId::from("u1");

        let pending = store.send_message(&bot.id, "oi", &user).await.unwrap();
        assert!(pending.user_message().is_user_message);
        assert_eq!(store.get_messages(&bot.id, Some(&user)).await.len(), 1);

        let reply = pending.wait().await.unwrap();
        assert!(!reply.is_user_message);
        assert_eq!(reply.content, reply::select_reply(Personality::Friendly, 0));

        let messages = store.get_messages(&bot.id, Some(&user)).await;
        assert_eq!(messages.len(), 2);
        assert!(messages[0].is_user_message);
        assert!(!messages[1].is_user_message);
        assert_eq!(store.get_bot(&bot.id).await.unwrap().stats.messages, 2);
        assert_eq!(store.pending_tasks(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn send_message_updates_user_and_analytics() {
        let store = store();
        let bot = store.create_bot(CreateBotRequest::new("X", "d")).await;
        let user = UserId::from("u1");

        store.send_message(&bot.id, "a", &user).await.unwrap();
        store.send_message(&bot.id, "b", &user).await.unwrap();

        let record = store.get_user(&user).await.unwrap();
        assert_eq!(record.total_interactions, 2);
        assert_eq!(record.bot_interactions[&bot.id].message_count, 2);

        let bot_now = store.get_bot(&bot.id).await.unwrap();
        assert_eq!(bot_now.stats.users, 1);

        let analytics = store.get_bot_analytics(&bot.id).await.unwrap();
        let today = analytics.day(Utc::now().date_naive()).unwrap();
        assert_eq!(today.message_count, 2);
        assert_eq!(today.user_count, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn start_conversation_replies_with_welcome_message() {
        let store = store();
        let bot = store.create_bot(CreateBotRequest::new("Luna", "d")).await;

        let reply = store
            .send_message(&bot.id, START_CONVERSATION, &UserId::from("u1"))
            .await
            .unwrap()
            .wait()
            .await
            .unwrap();

        assert_eq!(reply.content, "Olá! Sou o Luna, como posso ajudar?");
    }

    #[tokio::test]
    async fn send_to_unknown_bot_fails_without_side_effects() {
        let store = store();
        let user = UserId::from("u1");
        let err = store.send_message(&BotId::new(), "oi", &user).await.unwrap_err();
        assert!(matches!(err, StoreError::BotNotFound(_)));
        assert!(store.get_user(&user).await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_reply_never_appends() {
        let store = store();
        let bot = store.create_bot(CreateBotRequest::new("X", "d")).await;
        let user = UserId::from("u1");

        let pending = store.send_message(&bot.id, "oi", &user).await.unwrap();
        pending.cancel();

        assert!(matches!(pending.wait().await, Err(StoreError::Cancelled)));
        assert_eq!(store.get_messages(&bot.id, None).await.len(), 1);
        assert_eq!(store.get_bot(&bot.id).await.unwrap().stats.messages, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn cancelling_scope_drops_all_its_replies() {
        let store = store();
        let bot = store.create_bot(CreateBotRequest::new("X", "d")).await;
        let view = CancellationToken::new();

        let a = store
            .send_message_in(&view, &bot.id, "a", &UserId::from("u1"))
            .await
            .unwrap();
        let b = store
            .send_message_in(&view, &bot.id, "b", &UserId::from("u2"))
            .await
            .unwrap();
        view.cancel();

        assert!(matches!(a.wait().await, Err(StoreError::Cancelled)));
        assert!(matches!(b.wait().await, Err(StoreError::Cancelled)));
        assert_eq!(store.get_messages(&bot.id, None).await.len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn delete_cascades_and_discards_pending_reply() {
        let store = store();
        let bot = store
            .create_bot(CreateBotRequest {
                response_time: Some(ResponseSpeed::Detailed),
                ..CreateBotRequest::new("X", "d")
            })
            .await;
        let other = store.create_bot(CreateBotRequest::new("Y", "d")).await;
        let user = UserId::from("u1");

        let pending = store.send_message(&bot.id, "oi", &user).await.unwrap();
        store
            .send_message(&other.id, "oi", &user)
            .await
            .unwrap()
            .wait()
            .await
            .unwrap();

        assert!(store.delete_bot(&bot.id).await);
        assert!(matches!(pending.wait().await, Err(StoreError::Cancelled)));

        assert!(store.get_bot(&bot.id).await.is_none());
        assert!(store.get_bot_analytics(&bot.id).await.is_none());
        assert!(store.get_messages(&bot.id, None).await.is_empty());
        assert_eq!(store.get_messages(&other.id, None).await.len(), 2);
    }

    #[tokio::test]
    async fn seed_demo_uses_fixed_id_once() {
        let store = store();
        let first = store.seed_demo().await;
        let again = store.seed_demo().await;
        assert_eq!(first.id, DEMO_BOT_ID);
        assert_eq!(again.id, DEMO_BOT_ID);
        assert_eq!(store.list_bots().await.len(), 1);
        assert_eq!(store.list_users().await.len(), 3);
    }

    #[tokio::test]
    async fn delete_unknown_bot_is_noop() {
        let store = store();
        store.create_bot(CreateBotRequest::new("X", "d")).await;
        assert!(!store.delete_bot(&BotId::new()).await);
        assert_eq!(store.list_bots().await.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn bot_users_and_search() {
        let store = store();
        let demo = store.seed_demo().await;
        let fresh = store.create_bot(CreateBotRequest::new("X", "d")).await;
        store
            .send_message(&fresh.id, "oi", &UserId::from("walk-in"))
            .await
            .unwrap();

        assert_eq!(store.get_bot_users(&demo.id).await.len(), 3);
        assert_eq!(store.get_bot_users(&fresh.id).await.len(), 1);

        let found = store.search_bot_users(&demo.id, "silva").await;
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "Maria Silva");
        assert_eq!(store.search_bot_users(&demo.id, "  ").await.len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn connect_integration_goes_pending_then_connected() {
        let store = store();
        let bot = store.create_bot(CreateBotRequest::new("X", "d")).await;

        let task = store
            .connect_integration(&bot.id, IntegrationKind::Whatsapp)
            .await
            .unwrap();
        let pending = store.get_bot(&bot.id).await.unwrap().integration.unwrap();
        assert_eq!(pending.status, IntegrationStatus::Pending);

        let connected = task.wait().await.unwrap();
        assert_eq!(connected.status, IntegrationStatus::Connected);
        assert_eq!(
            store.get_bot(&bot.id).await.unwrap().integration,
            Some(connected)
        );

        assert!(store.disconnect_integration(&bot.id).await);
        assert_eq!(
            store.get_bot(&bot.id).await.unwrap().integration.unwrap().status,
            IntegrationStatus::Disconnected
        );
    }

    #[tokio::test]
    async fn embed_snippet_names_bot() {
        let store = store();
        let bot = store.create_bot(CreateBotRequest::new("X", "d")).await;
        let snippet = store.embed_snippet(&bot.id).await.unwrap();
        assert_eq!(
            snippet,
            format!(
                r#"<script src="https://automazap.com/embed.js" data-bot-id="{}"></script>"#,
                bot.id
            )
        );
        assert!(store.embed_snippet(&BotId::new()).await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_cancels_pending_replies() {
        let store = store();
        let bot = store.create_bot(CreateBotRequest::new("X", "d")).await;
        let pending = store
            .send_message(&bot.id, "oi", &UserId::from("u1"))
            .await
            .unwrap();

        store.shutdown();
        assert!(matches!(pending.wait().await, Err(StoreError::Cancelled)));
    }

    struct BrokenReplies;

    impl ReplySource for BrokenReplies {
        fn next_seed(&self) -> u64 {
            panic!("seed source unavailable")
        }
    }

    #[tokio::test(start_paused = true)]
    async fn failed_reply_reports_error_and_frees_task() {
        let store = BotStore::new(
            EventBus::new(64),
            Arc::new(BrokenReplies),
            StoreTimings::default(),
        );
        let bot = store.create_bot(CreateBotRequest::new("X", "d")).await;
        let user = UserId::from("u1");
        let mut rx = store.events().subscribe();

        let pending = store.send_message(&bot.id, "oi", &user).await.unwrap();
        let user_message_id = pending.user_message().id;
        assert!(matches!(pending.wait().await, Err(StoreError::TaskFailed(_))));

        let events = drain(&mut rx);
        let failures: Vec<_> = events
            .iter()
            .filter_map(|e| match e {
                AppEvent::ReplyFailed {
                    user_message_id, ..
                } => Some(*user_message_id),
                _ => None,
            })
            .collect();
        assert_eq!(failures, vec![user_message_id]);
        let error_notices: Vec<_> = events
            .iter()
            .filter_map(|e| match e {
                AppEvent::Notice(n) if n.level == NoticeLevel::Error => Some(n.title.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(error_notices, vec!["Erro ao enviar mensagem"]);
        assert_eq!(store.pending_tasks(), 0);

        // The user message stays applied.
        assert_eq!(store.get_messages(&bot.id, Some(&user)).await.len(), 1);
        assert_eq!(store.get_bot(&bot.id).await.unwrap().stats.messages, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_tasks_leave_registry() {
        let store = store();
        let bot = store.create_bot(CreateBotRequest::new("X", "d")).await;
        let reply = store
            .send_message(&bot.id, "oi", &UserId::from("u1"))
            .await
            .unwrap();
        let pairing = store
            .connect_integration(&bot.id, IntegrationKind::Telegram)
            .await
            .unwrap();
        assert_eq!(store.pending_tasks(), 2);

        reply.cancel();
        pairing.cancel();
        assert!(matches!(reply.wait().await, Err(StoreError::Cancelled)));
        assert!(matches!(pairing.wait().await, Err(StoreError::Cancelled)));
        assert_eq!(store.pending_tasks(), 0);
    }

    #[test]
    fn default_timings_match_default_config() {
        let timings = StoreTimings::default();
        let config = AppConfig::default();
        assert_eq!(timings.reply_delays, config.reply_delays);
        assert_eq!(timings.integration_connect, config.integration_connect_delay());
        assert!(timings.integration_connect > Duration::ZERO);
    }

    #[test]
    fn record_latency_averages_days_with_samples() {
        let mut analytics = BotAnalytics::empty(BotId::new());
        let now = Utc::now();
        record_latency(&mut analytics, now - chrono::Duration::days(1), 1.0);
        record_latency(&mut analytics, now, 3.0);
        record_latency(&mut analytics, now, 0.0);
        assert!((analytics.average_response_time - 2.0).abs() < f64::EPSILON);
    }
}
