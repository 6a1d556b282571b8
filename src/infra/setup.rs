use std::sync::Arc;

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::{
    adapters::{
        api::HttpBillingApi,
        provider::{DummyConfirmer, StripeConfirmer},
    },
    application::{
        ports::{billing_api::BillingApi, payment_confirmer::PaymentConfirmer},
        use_cases::{plan_change::PlanChangeOrchestrator, subscription_store::SubscriptionStore},
    },
    domain::entities::payment_scenario::PaymentScenario,
    infra::{config::AppConfig, session::SessionContext},
};

/// Wire the billing stack for one authenticated session.
pub fn init_billing(config: &AppConfig, session: SessionContext) -> SubscriptionStore {
    let account_id = session.account_id();
    let api: Arc<dyn BillingApi> =
        Arc::new(HttpBillingApi::new(config.api_base.clone(), session));

    let confirmer: Arc<dyn PaymentConfirmer> = if config.use_dummy_payments {
        Arc::new(DummyConfirmer::new(PaymentScenario::Success))
    } else {
        Arc::new(StripeConfirmer::new(config.publishable_key.clone()))
    };

    let orchestrator = PlanChangeOrchestrator::new(api.clone(), confirmer);
    SubscriptionStore::new(api, orchestrator, account_id)
}

pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "monetra_billing=debug".into());

    let console_layer = fmt::layer()
        .with_target(false)
        .with_level(true)
        .pretty();

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .try_init()
        .ok();
}
