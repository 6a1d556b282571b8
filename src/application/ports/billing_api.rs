use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    app_error::AppResult,
    domain::entities::{
        payment_method::PaymentMethodRef, subscription_plan::SubscriptionPlan,
        user_subscription::{SubscriptionStatus, UserSubscription},
    },
};

// ============================================================================
// Port Types - wire shapes for the Monetra backend
// ============================================================================

/// Request body for the upgrade / downgrade endpoints.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanChangeRequest {
    pub account_id: Uuid,
    pub plan_id: String,
    pub payment_method_id: Option<String>,
    /// Where the provider should send the user back after a 3-D Secure
    /// challenge.
    pub return_url: Option<String>,
}

/// Backend response to a plan change request.
///
/// `payment_required` together with a client secret means the card needs a
/// client-side confirmation step before the subscription activates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanChangeResponse {
    pub subscription_id: String,
    pub status: SubscriptionStatus,
    pub payment_required: bool,
    pub client_secret: Option<String>,
    pub payment_intent_id: Option<String>,
    pub amount_cents: i64,
    pub currency: String,
}

/// Backend-computed billing impact of a prospective plan change.
///
/// Relayed verbatim to the UI. The client never computes proration itself;
/// the backend's number is the only one shown.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanChangePreview {
    pub plan_id: String,
    /// Positive for an immediate charge, negative for a credit.
    pub prorated_amount_cents: i64,
    pub currency: String,
    pub effective_at: chrono::DateTime<chrono::Utc>,
}

/// Backend acknowledgement of a finalized or lifecycle-changed subscription.
/// Only the subscription id is used by callers; everything else is superseded
/// by the authoritative refetch.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionResponse {
    pub subscription_id: String,
    pub status: SubscriptionStatus,
}

// ============================================================================
// Billing API Port
// ============================================================================

/// The Monetra backend's subscription surface.
///
/// All writes go through these endpoints; the client holds no authoritative
/// state. Implementations: `HttpBillingApi` (reqwest, bearer token) and the
/// in-memory mock in `test_utils`.
#[async_trait]
pub trait BillingApi: Send + Sync {
    /// `POST /api/user/subscriptions/upgrade`
    async fn upgrade(&self, req: &PlanChangeRequest) -> AppResult<PlanChangeResponse>;

    /// `POST /api/user/subscriptions/downgrade`
    async fn downgrade(&self, req: &PlanChangeRequest) -> AppResult<PlanChangeResponse>;

    /// `POST /api/user/subscriptions/preview`
    ///
    /// Billing impact of switching to `plan_id`, computed by the backend.
    async fn preview_plan_change(
        &self,
        account_id: Uuid,
        plan_id: &str,
    ) -> AppResult<PlanChangePreview>;

    /// `POST /api/user/subscriptions/confirm-payment`
    ///
    /// Marks the subscription active given a confirmed payment intent. The
    /// backend is the source of truth; callers discard the result except for
    /// the subscription id.
    async fn finalize_payment(
        &self,
        payment_intent_id: &str,
        subscription_id: &str,
    ) -> AppResult<SubscriptionResponse>;

    /// `POST /api/user/subscriptions/fetch`. `None` when the account has no
    /// subscription record.
    async fn fetch_subscription(&self, account_id: Uuid) -> AppResult<Option<UserSubscription>>;

    /// `POST /api/user/subscriptions/cancel`
    async fn cancel(&self, account_id: Uuid) -> AppResult<SubscriptionResponse>;

    /// `POST /api/user/subscriptions/reactivate`
    async fn reactivate(&self, account_id: Uuid) -> AppResult<SubscriptionResponse>;

    /// `POST /api/user/payment-methods/fetch`
    async fn fetch_payment_methods(&self, account_id: Uuid) -> AppResult<Vec<PaymentMethodRef>>;

    /// `POST /api/plans/fetch`
    async fn fetch_plans(&self) -> AppResult<Vec<SubscriptionPlan>>;
}
