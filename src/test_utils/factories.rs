//! Fixture builders for billing tests.

use chrono::{Duration, Utc};
use uuid::Uuid;

use crate::{
    application::ports::billing_api::PlanChangeResponse,
    domain::entities::{
        payment_method::PaymentMethodRef,
        subscription_plan::SubscriptionPlan,
        user_subscription::{SubscriptionStatus, UserSubscription},
    },
};

pub fn active_subscription(account_id: Uuid, plan_id: &str) -> UserSubscription {
    let now = Utc::now();
    UserSubscription {
        id: format!("sub_{}", &account_id.simple().to_string()[..8]),
        account_id,
        plan_id: Some(plan_id.to_string()),
        status: SubscriptionStatus::Active,
        current_period_start: Some(now),
        current_period_end: Some(now + Duration::days(30)),
        cancel_at_period_end: false,
        canceled_at: None,
    }
}

pub fn plan(id: &str, price_cents: i64) -> SubscriptionPlan {
    SubscriptionPlan {
        id: id.to_string(),
        name: id.trim_start_matches("plan_").to_string(),
        price_cents,
        currency: "usd".to_string(),
        interval: "month".to_string(),
        interval_count: 1,
        features: vec![],
    }
}

pub fn payment_method(id: &str, brand: &str, last4: &str, is_default: bool) -> PaymentMethodRef {
    PaymentMethodRef {
        id: id.to_string(),
        brand: brand.to_string(),
        last4: last4.to_string(),
        exp_month: 12,
        exp_year: 2030,
        is_default,
    }
}

/// Backend plan-change response. The payment intent id is derived from the
/// client secret the way the provider formats them (`pi_x_secret_y`).
pub fn plan_change_response(
    subscription_id: &str,
    payment_required: bool,
    client_secret: Option<&str>,
    amount_cents: i64,
) -> PlanChangeResponse {
    let payment_intent_id = client_secret
        .and_then(|s| s.split("_secret").next())
        .map(str::to_string);
    PlanChangeResponse {
        subscription_id: subscription_id.to_string(),
        status: if payment_required {
            SubscriptionStatus::Incomplete
        } else {
            SubscriptionStatus::Active
        },
        payment_required,
        client_secret: client_secret.map(str::to_string),
        payment_intent_id,
        amount_cents,
        currency: "usd".to_string(),
    }
}
