use std::sync::Arc;

use crate::{
    app_error::{AppError, AppResult},
    application::ports::{
        billing_api::{BillingApi, PlanChangeRequest, SubscriptionResponse},
        payment_confirmer::{
            ALREADY_CONFIRMED_CODE, ConfirmOutcome, PaymentConfirmer, PaymentIntentInfo,
            PaymentIntentStatus,
        },
    },
    domain::entities::subscription_intent::{IntentStatus, PaymentFailure, SubscriptionIntent},
};

/// Direction of a plan change. Upgrades may require an immediate prorated
/// charge; downgrades take effect at the period boundary and never do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanChangeKind {
    Upgrade,
    Downgrade,
}

/// Drives a single subscription change from user selection to a confirmed
/// (or failed) terminal state.
///
/// Steps run strictly sequentially: request the change from the backend,
/// confirm the payment client-side if required, then finalize against the
/// backend. The caller re-fetches the authoritative subscription record
/// afterwards; the intent returned here is never treated as truth.
///
/// There is no retry loop. The single exception is the already-confirmed
/// idempotency check in `confirm_payment`, which covers a double-clicked pay
/// button racing against its own first confirmation.
#[derive(Clone)]
pub struct PlanChangeOrchestrator {
    api: Arc<dyn BillingApi>,
    confirmer: Arc<dyn PaymentConfirmer>,
}

impl PlanChangeOrchestrator {
    pub fn new(api: Arc<dyn BillingApi>, confirmer: Arc<dyn PaymentConfirmer>) -> Self {
        Self { api, confirmer }
    }

    /// Request a plan change from the backend.
    ///
    /// When the response carries `payment_required` and a client secret, the
    /// intent comes back as `RequiresAction` and the caller must run
    /// `confirm_payment`. Otherwise the card was already confirmed and the
    /// intent is `Succeeded` immediately; no finalize call is needed.
    pub async fn request_plan_change(
        &self,
        account_id: uuid::Uuid,
        plan_id: &str,
        kind: PlanChangeKind,
        payment_method_id: Option<&str>,
        return_url: Option<&str>,
    ) -> AppResult<SubscriptionIntent> {
        let req = PlanChangeRequest {
            account_id,
            plan_id: plan_id.to_string(),
            payment_method_id: payment_method_id.map(str::to_string),
            return_url: return_url.map(str::to_string),
        };

        let resp = match kind {
            PlanChangeKind::Upgrade => self.api.upgrade(&req).await?,
            PlanChangeKind::Downgrade => self.api.downgrade(&req).await?,
        };

        let status = if resp.payment_required && resp.client_secret.is_some() {
            IntentStatus::RequiresAction
        } else {
            IntentStatus::Succeeded
        };

        tracing::debug!(
            subscription_id = %resp.subscription_id,
            plan_id = %plan_id,
            status = ?status,
            "Plan change requested"
        );

        Ok(SubscriptionIntent {
            subscription_id: resp.subscription_id,
            status,
            client_secret: resp.client_secret,
            payment_intent_id: resp.payment_intent_id,
            plan_id: req.plan_id,
            amount_cents: resp.amount_cents,
            currency: resp.currency,
            failure: None,
        })
    }

    /// Confirm the intent's payment with the provider.
    ///
    /// Terminal provider failures map the decline code to a user-readable
    /// message and mark the intent `Failed` without finalizing. A
    /// `requires_action` outcome returns the intent unchanged; the return-URL
    /// callback resumes the flow via `resume_after_redirect`. On success,
    /// finalize runs exactly once before the intent is marked `Succeeded`.
    pub async fn confirm_payment(
        &self,
        intent: SubscriptionIntent,
        payment_method_id: Option<&str>,
        return_url: Option<&str>,
    ) -> AppResult<SubscriptionIntent> {
        if intent.status == IntentStatus::Succeeded {
            return Ok(intent);
        }

        let client_secret = intent.client_secret.clone().ok_or_else(|| {
            AppError::InvalidInput("This plan change does not require payment confirmation".into())
        })?;

        let outcome = self
            .confirmer
            .confirm_card_payment(&client_secret, payment_method_id, return_url)
            .await?;

        match outcome {
            ConfirmOutcome::Succeeded(pi) => self.complete(intent, pi).await,
            ConfirmOutcome::RequiresAction(pi) => {
                tracing::debug!(
                    payment_intent = %pi.id,
                    "Payment requires additional authentication"
                );
                let mut intent = intent;
                intent.status = IntentStatus::RequiresAction;
                intent.payment_intent_id = Some(pi.id);
                Ok(intent)
            }
            ConfirmOutcome::Failed { code, message }
                if code.as_deref() == Some(ALREADY_CONFIRMED_CODE) =>
            {
                // Double-click race: the intent may already have succeeded
                // under a concurrent confirmation. Check before failing.
                let pi = self.confirmer.retrieve_payment_intent(&client_secret).await?;
                if pi.status == PaymentIntentStatus::Succeeded {
                    tracing::debug!(
                        payment_intent = %pi.id,
                        "Intent already confirmed; treating as success"
                    );
                    self.complete(intent, pi).await
                } else {
                    Ok(intent.failed(PaymentFailure::from_provider(code, &message)))
                }
            }
            ConfirmOutcome::Failed { code, message } => {
                tracing::warn!(
                    subscription_id = %intent.subscription_id,
                    code = code.as_deref().unwrap_or("unknown"),
                    "Payment confirmation failed"
                );
                Ok(intent.failed(PaymentFailure::from_provider(code, &message)))
            }
        }
    }

    /// Resume a flow interrupted by an external authentication redirect.
    ///
    /// Retrieves the intent's current provider state: `succeeded` completes
    /// the flow, a still-pending state returns the intent unchanged, and a
    /// failed/abandoned challenge marks it `Failed`.
    pub async fn resume_after_redirect(
        &self,
        intent: SubscriptionIntent,
    ) -> AppResult<SubscriptionIntent> {
        if intent.is_settled() {
            return Ok(intent);
        }

        let client_secret = intent.client_secret.clone().ok_or_else(|| {
            AppError::InvalidInput("Intent has no client secret to resume from".into())
        })?;

        let pi = self.confirmer.retrieve_payment_intent(&client_secret).await?;
        match pi.status {
            PaymentIntentStatus::Succeeded => self.complete(intent, pi).await,
            PaymentIntentStatus::RequiresAction
            | PaymentIntentStatus::RequiresConfirmation
            | PaymentIntentStatus::Processing => Ok(intent),
            PaymentIntentStatus::RequiresPaymentMethod | PaymentIntentStatus::Canceled => {
                Ok(intent.failed(PaymentFailure::from_provider(
                    None,
                    "Your payment was not completed.",
                )))
            }
        }
    }

    /// Tell the backend the payment is confirmed. The backend is the source
    /// of truth; callers discard the result except for the subscription id,
    /// which drives the authoritative refetch.
    pub async fn finalize(
        &self,
        payment_intent_id: &str,
        subscription_id: &str,
    ) -> AppResult<SubscriptionResponse> {
        self.api
            .finalize_payment(payment_intent_id, subscription_id)
            .await
    }

    async fn complete(
        &self,
        intent: SubscriptionIntent,
        pi: PaymentIntentInfo,
    ) -> AppResult<SubscriptionIntent> {
        self.finalize(&pi.id, &intent.subscription_id).await?;
        let mut intent = intent.succeeded();
        intent.payment_intent_id = Some(pi.id);
        Ok(intent)
    }
}
