//! Account service: login, signup, logout and profile updates.
//!
//! AccountService keeps the mock account table and the signed-in profile.
//! Every successful change to the profile is written to session storage
//! under [`SESSION_KEY`] so the next process can [`restore`] it.
//!
//! [`restore`]: AccountService::restore

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use automazap_types::account::{
    PaymentKind, PaymentMethod, ProfileUpdate, SubscriptionStatus, UserProfile,
};
use automazap_types::config::AppConfig;
use automazap_types::error::{AccountError, StorageError};
use automazap_types::event::{AppEvent, Notice};
use chrono::{Duration as ChronoDuration, Utc};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::event::EventBus;
use crate::storage::{SESSION_KEY, SessionStorage};

const TRIAL_DAYS: i64 = 14;

/// Seed accounts the mock backend knows about.
fn mock_accounts() -> Vec<UserProfile> {
    let now = Utc::now();
    vec![UserProfile {
        id: "user-1".to_string(),
        email: "demo@example.com".to_string(),
        name: "Demo User".to_string(),
        company: Some("Demo Company".to_string()),
        subscription_status: SubscriptionStatus::Active,
        subscription_plan: Some("pro".to_string()),
        subscription_end_date: Some(now + ChronoDuration::days(30)),
        created_at: now,
        last_login: Some(now),
        bots_created: 3,
        messages_used: 1250,
        payment_method: Some(PaymentMethod {
            kind: PaymentKind::CreditCard,
            last_four: Some("4242".to_string()),
            expiry_date: Some("12/24".to_string()),
        }),
    }]
}

/// Resets the loading flag when dropped.
pub(super) struct Busy<'a>(&'a AtomicBool);

impl<'a> Busy<'a> {
    pub(super) fn start(flag: &'a AtomicBool) -> Self {
        flag.store(true, Ordering::SeqCst);
        Self(flag)
    }
}

impl Drop for Busy<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Mock authentication and profile management.
///
/// Generic over `SessionStorage` so tests run against memory and the CLI
/// against files.
pub struct AccountService<S: SessionStorage> {
    storage: S,
    events: EventBus,
    auth_delay: Duration,
    profile_delay: Duration,
    accounts: RwLock<Vec<UserProfile>>,
    current: RwLock<Option<UserProfile>>,
    loading: AtomicBool,
}

impl<S: SessionStorage> AccountService<S> {
    pub fn new(storage: S, events: EventBus, config: &AppConfig) -> Self {
        Self {
            storage,
            events,
            auth_delay: config.auth_delay(),
            profile_delay: config.profile_delay(),
            accounts: RwLock::new(mock_accounts()),
            current: RwLock::new(None),
            loading: AtomicBool::new(false),
        }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Load the persisted session, if any.
    ///
    /// A stored value that no longer parses is discarded and treated as
    /// logged out.
    pub async fn restore(&self) -> Result<Option<UserProfile>, AccountError> {
        let Some(raw) = self.storage.get(SESSION_KEY).await? else {
            debug!("No stored session");
            return Ok(None);
        };

        match serde_json::from_str::<UserProfile>(&raw) {
            Ok(profile) => {
                debug!(user_id = %profile.id, "Session restored");
                *self.current.write().await = Some(profile.clone());
                Ok(Some(profile))
            }
            Err(e) => {
                warn!(error = %e, "Discarding unreadable stored session");
                self.storage.remove(SESSION_KEY).await?;
                Ok(None)
            }
        }
    }

    /// The signed-in profile, if any.
    pub async fn current(&self) -> Option<UserProfile> {
        self.current.read().await.clone()
    }

    pub async fn is_authenticated(&self) -> bool {
        self.current.read().await.is_some()
    }

    /// True while a login, signup or profile update is in flight.
    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::SeqCst)
    }

    /// Sign in as an existing account. The password is not checked.
    pub async fn login(&self, email: &str, _password: &str) -> Result<UserProfile, AccountError> {
        let _busy = Busy::start(&self.loading);
        tokio::time::sleep(self.auth_delay).await;

        let found = self
            .accounts
            .read()
            .await
            .iter()
            .find(|a| a.email == email)
            .cloned();

        let result = match found {
            Some(mut profile) => {
                profile.last_login = Some(Utc::now());
                self.sign_in(profile).await
            }
            None => Err(AccountError::UserNotFound),
        };

        match &result {
            Ok(profile) => {
                info!(user_id = %profile.id, "Logged in");
                self.events.notify(
                    Notice::success("Login realizado com sucesso")
                        .with_description(format!("Bem-vindo de volta, {}!", profile.name)),
                );
                self.events.navigate("/dashboard");
            }
            Err(e) => {
                warn!(email, error = %e, "Login failed");
                self.events
                    .notify(Notice::error("Erro no login").with_description(e.to_string()));
            }
        }
        result
    }

    /// Create a trial account and sign in as it.
    pub async fn signup(
        &self,
        email: &str,
        _password: &str,
        name: &str,
    ) -> Result<UserProfile, AccountError> {
        let _busy = Busy::start(&self.loading);
        tokio::time::sleep(self.auth_delay).await;

        let result = self.create_account(email, name).await;
        let result = match result {
            Ok(profile) => self.sign_in(profile).await,
            Err(e) => Err(e),
        };

        match &result {
            Ok(profile) => {
                info!(user_id = %profile.id, "Account created");
                self.events.notify(
                    Notice::success("Cadastro realizado com sucesso").with_description(
                        "Sua conta foi criada e você já pode começar a usar o AutomaZap!",
                    ),
                );
                self.events.navigate("/dashboard");
            }
            Err(e) => {
                warn!(email, error = %e, "Signup failed");
                self.events
                    .notify(Notice::error("Erro no cadastro").with_description(e.to_string()));
            }
        }
        result
    }

    async fn create_account(&self, email: &str, name: &str) -> Result<UserProfile, AccountError> {
        let mut accounts = self.accounts.write().await;
        if accounts.iter().any(|a| a.email == email) {
            return Err(AccountError::EmailInUse);
        }

        let now = Utc::now();
        let profile = UserProfile {
            id: format!("user-{}", now.timestamp_millis()),
            email: email.to_string(),
            name: name.to_string(),
            company: None,
            subscription_status: SubscriptionStatus::Trial,
            subscription_plan: None,
            subscription_end_date: Some(now + ChronoDuration::days(TRIAL_DAYS)),
            created_at: now,
            last_login: Some(now),
            bots_created: 0,
            messages_used: 0,
            payment_method: None,
        };
        accounts.push(profile.clone());
        Ok(profile)
    }

    /// Sign out and forget the stored session.
    pub async fn logout(&self) -> Result<(), AccountError> {
        let previous = self.current.write().await.take();
        self.storage.remove(SESSION_KEY).await?;

        info!(user_id = ?previous.as_ref().map(|p| &p.id), "Logged out");
        self.events.publish(AppEvent::ProfileChanged { user_id: None });
        self.events.navigate("/");
        self.events.notify(
            Notice::success("Logout realizado com sucesso").with_description("Volte em breve!"),
        );
        Ok(())
    }

    /// Shallow-merge `update` into the signed-in profile and persist it.
    pub async fn update_profile(&self, update: ProfileUpdate) -> Result<UserProfile, AccountError> {
        let _busy = Busy::start(&self.loading);
        tokio::time::sleep(self.profile_delay).await;

        let result = match self.current().await {
            Some(mut profile) => {
                profile.apply(update);
                self.sign_in(profile).await
            }
            None => Err(AccountError::NotAuthenticated),
        };

        match &result {
            Ok(profile) => {
                info!(user_id = %profile.id, "Profile updated");
                self.events.notify(
                    Notice::success("Perfil atualizado")
                        .with_description("Suas informações foram atualizadas com sucesso"),
                );
            }
            Err(e) => {
                warn!(error = %e, "Profile update failed");
                self.events.notify(
                    Notice::error("Erro ao atualizar perfil").with_description(e.to_string()),
                );
            }
        }
        result
    }

    /// Persist `profile` and make it the signed-in one.
    async fn sign_in(&self, profile: UserProfile) -> Result<UserProfile, AccountError> {
        let raw = serde_json::to_string(&profile)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        self.storage.set(SESSION_KEY, &raw).await?;
        *self.current.write().await = Some(profile.clone());
        self.events.publish(AppEvent::ProfileChanged {
            user_id: Some(profile.id.clone()),
        });
        Ok(profile)
    }
}
