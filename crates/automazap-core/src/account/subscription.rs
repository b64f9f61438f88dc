//! Plan catalogue and simulated subscription billing.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use automazap_types::account::{ProfileUpdate, SubscriptionStatus, UserProfile};
use automazap_types::config::AppConfig;
use automazap_types::error::SubscriptionError;
use automazap_types::event::Notice;
use automazap_types::plan::{PlanIncludes, SubscriptionPlan};
use chrono::{Duration as ChronoDuration, Months, Utc};
use tracing::{info, warn};

use super::service::Busy;
use crate::account::AccountService;
use crate::event::EventBus;
use crate::storage::SessionStorage;

const FREE_PLAN_ID: &str = "free";

fn plan(
    id: &str,
    name: &str,
    price: u32,
    features: &[&str],
    bot_limit: Option<u32>,
    message_limit: u32,
    includes: PlanIncludes,
) -> SubscriptionPlan {
    SubscriptionPlan {
        id: id.to_string(),
        name: name.to_string(),
        price,
        features: features.iter().map(|f| f.to_string()).collect(),
        bot_limit,
        message_limit,
        includes,
    }
}

/// The three plans on sale, cheapest first.
pub fn default_plans() -> Vec<SubscriptionPlan> {
    vec![
        plan(
            FREE_PLAN_ID,
            "Gratuito",
            0,
            &[
                "1 bot ativo",
                "100 mensagens/mês",
                "Respostas básicas",
                "Documentação e suporte comunitário",
            ],
            Some(1),
            100,
            PlanIncludes::default(),
        ),
        plan(
            "pro",
            "Profissional",
            99,
            &[
                "5 bots ativos",
                "5.000 mensagens/mês",
                "Respostas avançadas com contexto",
                "Upload de documentos (PDFs, textos)",
                "Suporte por e-mail",
            ],
            Some(5),
            5_000,
            PlanIncludes {
                file_upload: true,
                api_access: true,
                priority_support: false,
                advanced_analytics: true,
                custom_branding: false,
                multi_language: true,
            },
        ),
        plan(
            "enterprise",
            "Empresarial",
            249,
            &[
                "Bots ilimitados",
                "20.000 mensagens/mês",
                "IA avançada personalizada",
                "Upload ilimitado de materiais",
                "Integrações personalizadas",
                "Suporte prioritário",
            ],
            None,
            20_000,
            PlanIncludes {
                file_upload: true,
                api_access: true,
                priority_support: true,
                advanced_analytics: true,
                custom_branding: true,
                multi_language: true,
            },
        ),
    ]
}

/// Subscribes the signed-in account to plans and cancels subscriptions.
///
/// Profile changes go through [`AccountService::update_profile`], so they are
/// persisted the same way as any other profile edit.
pub struct SubscriptionService<S: SessionStorage> {
    account: Arc<AccountService<S>>,
    events: EventBus,
    plans: Vec<SubscriptionPlan>,
    payment_delay: Duration,
    cancel_delay: Duration,
    processing: AtomicBool,
}

impl<S: SessionStorage> SubscriptionService<S> {
    pub fn new(account: Arc<AccountService<S>>, events: EventBus, config: &AppConfig) -> Self {
        Self {
            account,
            events,
            plans: default_plans(),
            payment_delay: config.payment_delay(),
            cancel_delay: config.cancel_delay(),
            processing: AtomicBool::new(false),
        }
    }

    pub fn plans(&self) -> &[SubscriptionPlan] {
        &self.plans
    }

    pub fn plan(&self, id: &str) -> Option<&SubscriptionPlan> {
        self.plans.iter().find(|p| p.id == id)
    }

    fn free_plan(&self) -> &SubscriptionPlan {
        self.plan(FREE_PLAN_ID).unwrap_or(&self.plans[0])
    }

    /// The signed-in account's plan. Falls back to the free plan when nobody
    /// is signed in or the account has no known plan.
    pub async fn current_plan(&self) -> &SubscriptionPlan {
        self.account
            .current()
            .await
            .and_then(|p| p.subscription_plan)
            .and_then(|id| self.plan(&id))
            .unwrap_or_else(|| self.free_plan())
    }

    /// True while a payment or cancellation is being processed.
    pub fn is_processing_payment(&self) -> bool {
        self.processing.load(Ordering::SeqCst)
    }

    /// Subscribe the signed-in account to `plan_id` for one month.
    pub async fn subscribe_to_plan(&self, plan_id: &str) -> Result<UserProfile, SubscriptionError> {
        if !self.account.is_authenticated().await {
            return Err(self.reject("Erro na assinatura", SubscriptionError::NotAuthenticated));
        }
        let Some(plan) = self.plan(plan_id) else {
            return Err(self.reject(
                "Erro na assinatura",
                SubscriptionError::PlanNotFound(plan_id.to_string()),
            ));
        };

        let result = {
            let _busy = Busy::start(&self.processing);
            tokio::time::sleep(self.payment_delay).await;

            let now = Utc::now();
            let end = now
                .checked_add_months(Months::new(1))
                .unwrap_or(now + ChronoDuration::days(30));
            self.account
                .update_profile(ProfileUpdate {
                    subscription_status: Some(SubscriptionStatus::Active),
                    subscription_plan: Some(plan.id.clone()),
                    subscription_end_date: Some(end),
                    ..Default::default()
                })
                .await
        };

        match result {
            Ok(profile) => {
                info!(user_id = %profile.id, plan = %plan.id, "Subscribed to plan");
                self.events.notify(
                    Notice::success("Assinatura realizada com sucesso")
                        .with_description(format!("Você agora é assinante do plano {}", plan.name)),
                );
                Ok(profile)
            }
            Err(e) => {
                warn!(plan = %plan.id, error = %e, "Payment failed");
                self.events.notify(Notice::error("Erro ao processar pagamento").with_description(
                    "Não foi possível completar sua assinatura. Por favor, tente novamente.",
                ));
                Err(e.into())
            }
        }
    }

    /// Cancel the signed-in account's active subscription. Access continues
    /// until the paid period ends.
    pub async fn cancel_subscription(&self) -> Result<UserProfile, SubscriptionError> {
        let active = self
            .account
            .current()
            .await
            .is_some_and(|p| p.subscription_status == SubscriptionStatus::Active);
        if !active {
            return Err(self.reject("Erro ao cancelar", SubscriptionError::NoActiveSubscription));
        }

        let result = {
            let _busy = Busy::start(&self.processing);
            tokio::time::sleep(self.cancel_delay).await;
            self.account
                .update_profile(ProfileUpdate {
                    subscription_status: Some(SubscriptionStatus::Canceled),
                    ..Default::default()
                })
                .await
        };

        match result {
            Ok(profile) => {
                info!(user_id = %profile.id, "Subscription canceled");
                self.events.notify(Notice::success("Assinatura cancelada").with_description(
                    "Sua assinatura foi cancelada com sucesso. Você ainda terá acesso até o fim do período pago.",
                ));
                Ok(profile)
            }
            Err(e) => {
                warn!(error = %e, "Cancellation failed");
                self.events.notify(
                    Notice::error("Erro ao cancelar assinatura").with_description(
                        "Não foi possível cancelar sua assinatura. Por favor, tente novamente.",
                    ),
                );
                Err(e.into())
            }
        }
    }

    fn reject(&self, title: &str, err: SubscriptionError) -> SubscriptionError {
        warn!(error = %err, "Subscription request rejected");
        self.events
            .notify(Notice::error(title).with_description(err.to_string()));
        err
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemorySessionStorage;

    fn services() -> (
        Arc<AccountService<MemorySessionStorage>>,
        SubscriptionService<MemorySessionStorage>,
    ) {
        services_with(AppConfig::instant())
    }

    fn services_with(
        config: AppConfig,
    ) -> (
        Arc<AccountService<MemorySessionStorage>>,
        SubscriptionService<MemorySessionStorage>,
    ) {
        let events = EventBus::new(64);
        let account = Arc::new(AccountService::new(
            MemorySessionStorage::new(),
            events.clone(),
            &config,
        ));
        let subs = SubscriptionService::new(Arc::clone(&account), events, &config);
        (account, subs)
    }

    #[test]
    fn catalogue_matches_pricing() {
        let plans = default_plans();
        let ids: Vec<_> = plans.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, ["free", "pro", "enterprise"]);
        assert!(plans[0].is_free());
        assert_eq!(plans[1].bot_limit, Some(5));
        assert_eq!(plans[2].bot_limit, None);
        assert_eq!(plans[2].message_limit, 20_000);
    }

    #[tokio::test]
    async fn current_plan_defaults_to_free() {
        let (_, subs) = services();
        assert_eq!(subs.current_plan().await.id, "free");
    }

    #[tokio::test]
    async fn subscribe_requires_login() {
        let (_, subs) = services();
        let err = subs.subscribe_to_plan("pro").await.unwrap_err();
        assert!(matches!(err, SubscriptionError::NotAuthenticated));
    }

    #[tokio::test]
    async fn subscribe_unknown_plan_fails() {
        let (account, subs) = services();
        account.signup("a@example.com", "pw", "A").await.unwrap();
        let err = subs.subscribe_to_plan("platinum").await.unwrap_err();
        assert!(matches!(err, SubscriptionError::PlanNotFound(id) if id == "platinum"));
    }

    #[tokio::test]
    async fn subscribe_then_cancel() {
        let (account, subs) = services();
        let trial = account.signup("a@example.com", "pw", "A").await.unwrap();
        assert!(matches!(
            subs.cancel_subscription().await,
            Err(SubscriptionError::NoActiveSubscription)
        ));

        let active = subs.subscribe_to_plan("enterprise").await.unwrap();
        assert_eq!(active.subscription_status, SubscriptionStatus::Active);
        assert_eq!(active.subscription_plan.as_deref(), Some("enterprise"));
        assert!(active.subscription_end_date > trial.subscription_end_date);
        assert_eq!(subs.current_plan().await.name, "Empresarial");
        assert!(!subs.is_processing_payment());

        let canceled = subs.cancel_subscription().await.unwrap();
        assert_eq!(canceled.subscription_status, SubscriptionStatus::Canceled);
        assert_eq!(canceled.subscription_plan.as_deref(), Some("enterprise"));
    }

    #[tokio::test(start_paused = true)]
    async fn abandoned_payment_clears_processing_flag() {
        let (account, subs) = services_with(AppConfig::default());
        account.signup("a@example.com", "pw", "A").await.unwrap();

        let payment = subs.subscribe_to_plan("pro");
        let timed_out = tokio::time::timeout(Duration::from_millis(1), payment).await;
        assert!(timed_out.is_err());
        assert!(!subs.is_processing_payment());
        assert_eq!(
            account.current().await.unwrap().subscription_status,
            SubscriptionStatus::Trial
        );
    }
}
