//! Application state wiring the store and services together.
//!
//! Services are generic over `SessionStorage`; AppState pins them to the
//! file-backed implementation in the data directory.

use std::path::PathBuf;
use std::sync::Arc;

use automazap_core::account::{AccountService, SubscriptionService};
use automazap_core::event::EventBus;
use automazap_core::reply::RandomReplies;
use automazap_core::store::{BotStore, StoreTimings};
use automazap_infra::config::load_app_config;
use automazap_infra::filesystem::resolve_data_dir;
use automazap_infra::session::FileSessionStorage;

pub type ConcreteAccountService = AccountService<FileSessionStorage>;
pub type ConcreteSubscriptionService = SubscriptionService<FileSessionStorage>;

/// Shared application state for CLI commands.
#[derive(Clone)]
pub struct AppState {
    pub store: BotStore,
    pub account: Arc<ConcreteAccountService>,
    pub subscriptions: Arc<ConcreteSubscriptionService>,
    pub events: EventBus,
}

impl AppState {
    /// Load config, seed the demo bot and restore any saved session.
    pub async fn init() -> anyhow::Result<Self> {
        let data_dir = resolve_data_dir();
        tokio::fs::create_dir_all(&data_dir).await?;
        Self::init_in(data_dir).await
    }

    pub async fn init_in(data_dir: PathBuf) -> anyhow::Result<Self> {
        let config = load_app_config(&data_dir).await;
        let events = EventBus::new(config.event_capacity);

        let store = BotStore::new(
            events.clone(),
            Arc::new(RandomReplies),
            StoreTimings::from_config(&config),
        );
        store.seed_demo().await;

        let account = Arc::new(AccountService::new(
            FileSessionStorage::new(&data_dir),
            events.clone(),
            &config,
        ));
        account.restore().await?;

        let subscriptions = Arc::new(SubscriptionService::new(
            Arc::clone(&account),
            events.clone(),
            &config,
        ));

        Ok(Self {
            store,
            account,
            subscriptions,
            events,
        })
    }
}
