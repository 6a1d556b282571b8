use std::sync::Arc;

use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    app_error::AppResult,
    application::{
        ports::billing_api::{BillingApi, PlanChangePreview},
        use_cases::plan_change::{PlanChangeKind, PlanChangeOrchestrator},
    },
    domain::entities::{
        payment_method::PaymentMethodRef,
        subscription_intent::SubscriptionIntent,
        subscription_plan::SubscriptionPlan,
        user_subscription::UserSubscription,
    },
};

/// One consistent snapshot of the account's billing state.
#[derive(Debug, Clone)]
pub struct SubscriptionView {
    pub subscription: UserSubscription,
    pub payment_methods: Vec<PaymentMethodRef>,
    pub plans: Vec<SubscriptionPlan>,
    pub loaded_at: chrono::DateTime<chrono::Utc>,
}

impl SubscriptionView {
    pub fn current_plan(&self) -> Option<&SubscriptionPlan> {
        let plan_id = self.subscription.plan_id.as_deref()?;
        self.plans.iter().find(|p| p.id == plan_id)
    }

    pub fn default_payment_method(&self) -> Option<&PaymentMethodRef> {
        self.payment_methods
            .iter()
            .find(|pm| pm.is_default)
            .or_else(|| self.payment_methods.first())
    }
}

/// The account's billing state, refreshed from the backend after every write.
///
/// The backend is the only writer of subscription state. This store runs
/// mutations through the backend and then re-fetches; it never mutates its
/// snapshot in place. Partial read failures degrade instead of blanking the
/// view: a missing subscription becomes an inactive placeholder and failed
/// payment-method or plan fetches keep the previous lists.
pub struct SubscriptionStore {
    api: Arc<dyn BillingApi>,
    orchestrator: PlanChangeOrchestrator,
    account_id: Uuid,
    view: RwLock<Option<SubscriptionView>>,
}

impl SubscriptionStore {
    pub fn new(
        api: Arc<dyn BillingApi>,
        orchestrator: PlanChangeOrchestrator,
        account_id: Uuid,
    ) -> Self {
        Self {
            api,
            orchestrator,
            account_id,
            view: RwLock::new(None),
        }
    }

    pub fn account_id(&self) -> Uuid {
        self.account_id
    }

    /// Latest snapshot, if one has been loaded.
    pub async fn current(&self) -> Option<SubscriptionView> {
        self.view.read().await.clone()
    }

    /// Fetch subscription, payment methods, and plans in parallel and replace
    /// the snapshot.
    ///
    /// Tolerates partial failure: an account without a subscription record
    /// renders as an inactive placeholder, and a failed payment-method or plan
    /// fetch falls back to the previously loaded list (empty on first load).
    pub async fn load(&self) -> AppResult<SubscriptionView> {
        let (subscription, payment_methods, plans) = tokio::join!(
            self.api.fetch_subscription(self.account_id),
            self.api.fetch_payment_methods(self.account_id),
            self.api.fetch_plans(),
        );

        let subscription = subscription?
            .unwrap_or_else(|| UserSubscription::inactive_placeholder(self.account_id));

        let previous = self.view.read().await.clone();
        let payment_methods = match payment_methods {
            Ok(pms) => pms,
            Err(e) => {
                tracing::warn!(error = %e, "Payment method fetch failed; keeping previous list");
                previous
                    .as_ref()
                    .map(|v| v.payment_methods.clone())
                    .unwrap_or_default()
            }
        };
        let plans = match plans {
            Ok(plans) => plans,
            Err(e) => {
                tracing::warn!(error = %e, "Plan fetch failed; keeping previous list");
                previous.map(|v| v.plans).unwrap_or_default()
            }
        };

        let view = SubscriptionView {
            subscription,
            payment_methods,
            plans,
            loaded_at: chrono::Utc::now(),
        };

        tracing::debug!(
            account_id = %self.account_id,
            status = view.subscription.status.as_str(),
            payment_methods = view.payment_methods.len(),
            "Billing state loaded"
        );

        *self.view.write().await = Some(view.clone());
        Ok(view)
    }

    /// Re-run `load`. Called after every mutating operation.
    pub async fn refresh(&self) -> AppResult<SubscriptionView> {
        self.load().await
    }

    /// Backend-computed billing impact of switching to `plan_id`. Read-only;
    /// the client never approximates proration itself.
    pub async fn preview_change(&self, plan_id: &str) -> AppResult<PlanChangePreview> {
        self.api.preview_plan_change(self.account_id, plan_id).await
    }

    /// Start a plan change. Returns the in-flight intent; if no payment
    /// confirmation is needed the intent is already settled and the snapshot
    /// has been refreshed.
    pub async fn change_plan(
        &self,
        plan_id: &str,
        payment_method_id: Option<&str>,
        return_url: Option<&str>,
    ) -> AppResult<SubscriptionIntent> {
        let kind = self.change_kind(plan_id).await;
        let result = self
            .orchestrator
            .request_plan_change(self.account_id, plan_id, kind, payment_method_id, return_url)
            .await;
        let _ = self.refresh_after_mutation("change_plan").await;
        result
    }

    /// Confirm the pending payment for an in-flight intent and refresh.
    pub async fn confirm_payment(
        &self,
        intent: SubscriptionIntent,
        payment_method_id: Option<&str>,
        return_url: Option<&str>,
    ) -> AppResult<SubscriptionIntent> {
        let result = self
            .orchestrator
            .confirm_payment(intent, payment_method_id, return_url)
            .await;
        let _ = self.refresh_after_mutation("confirm_payment").await;
        result
    }

    /// Settle an intent after the user returns from an authentication
    /// redirect, then refresh.
    pub async fn resume_after_redirect(
        &self,
        intent: SubscriptionIntent,
    ) -> AppResult<SubscriptionIntent> {
        let result = self.orchestrator.resume_after_redirect(intent).await;
        let _ = self.refresh_after_mutation("resume_after_redirect").await;
        result
    }

    /// Cancel at period end, then refresh.
    pub async fn cancel(&self) -> AppResult<SubscriptionView> {
        let result = self.api.cancel(self.account_id).await;
        let view = self.refresh_after_mutation("cancel").await;
        result?;
        view
    }

    /// Undo a pending cancellation, then refresh.
    pub async fn reactivate(&self) -> AppResult<SubscriptionView> {
        let result = self.api.reactivate(self.account_id).await;
        let view = self.refresh_after_mutation("reactivate").await;
        result?;
        view
    }

    /// A change to a cheaper plan is a downgrade; anything else (including an
    /// unknown plan or no loaded snapshot) is treated as an upgrade and priced
    /// by the backend.
    async fn change_kind(&self, target_plan_id: &str) -> PlanChangeKind {
        let view = self.view.read().await;
        let Some(view) = view.as_ref() else {
            return PlanChangeKind::Upgrade;
        };
        let (Some(current), Some(target)) = (
            view.current_plan(),
            view.plans.iter().find(|p| p.id == target_plan_id),
        ) else {
            return PlanChangeKind::Upgrade;
        };
        if target.price_cents < current.price_cents {
            PlanChangeKind::Downgrade
        } else {
            PlanChangeKind::Upgrade
        }
    }

    /// Refresh unconditionally after a mutation. A refresh failure is logged
    /// but never masks the mutation's own result.
    async fn refresh_after_mutation(&self, op: &str) -> AppResult<SubscriptionView> {
        match self.refresh().await {
            Ok(view) => Ok(view),
            Err(e) => {
                tracing::warn!(op, error = %e, "Refresh after mutation failed");
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        application::ports::{
            billing_api::PlanChangePreview,
            payment_confirmer::{ConfirmOutcome, PaymentIntentInfo, PaymentIntentStatus},
        },
        domain::entities::{
            subscription_intent::IntentStatus, user_subscription::SubscriptionStatus,
        },
        test_utils::{
            MockBillingApi, ScriptedConfirmer, active_subscription, payment_method, plan,
            plan_change_response,
        },
    };

    fn store(api: Arc<MockBillingApi>, confirmer: Arc<ScriptedConfirmer>) -> SubscriptionStore {
        let account_id = api.account_id();
        let orchestrator = PlanChangeOrchestrator::new(api.clone(), confirmer);
        SubscriptionStore::new(api, orchestrator, account_id)
    }

    #[tokio::test]
    async fn test_load_assembles_full_view() {
        let api = Arc::new(MockBillingApi::new());
        api.set_subscription(active_subscription(api.account_id(), "plan_basic"));
        api.set_payment_methods(vec![payment_method("pm_1", "visa", "4242", true)]);
        api.set_plans(vec![plan("plan_basic", 499), plan("plan_pro", 1299)]);
        let store = store(api, Arc::new(ScriptedConfirmer::new()));

        let view = store.load().await.unwrap();
        assert_eq!(view.subscription.status, SubscriptionStatus::Active);
        assert_eq!(view.current_plan().unwrap().id, "plan_basic");
        assert_eq!(view.default_payment_method().unwrap().id, "pm_1");
        assert!(store.current().await.is_some());
    }

    #[tokio::test]
    async fn test_load_without_subscription_synthesizes_placeholder() {
        let api = Arc::new(MockBillingApi::new());
        api.set_plans(vec![plan("plan_basic", 499)]);
        let store = store(api, Arc::new(ScriptedConfirmer::new()));

        let view = store.load().await.unwrap();
        assert!(view.subscription.is_placeholder());
        assert_eq!(view.subscription.status, SubscriptionStatus::Inactive);
        assert!(view.payment_methods.is_empty());
    }

    #[tokio::test]
    async fn test_load_tolerates_payment_method_failure() {
        let api = Arc::new(MockBillingApi::new());
        api.set_subscription(active_subscription(api.account_id(), "plan_basic"));
        api.set_plans(vec![plan("plan_basic", 499)]);
        api.fail_payment_methods();
        let store = store(api, Arc::new(ScriptedConfirmer::new()));

        // The page still renders with what could be fetched.
        let view = store.load().await.unwrap();
        assert_eq!(view.subscription.status, SubscriptionStatus::Active);
        assert!(view.payment_methods.is_empty());
        assert_eq!(view.plans.len(), 1);
    }

    #[tokio::test]
    async fn test_cancel_refreshes_from_backend_truth() {
        let api = Arc::new(MockBillingApi::new());
        api.set_subscription(active_subscription(api.account_id(), "plan_basic"));
        api.set_plans(vec![plan("plan_basic", 499)]);
        let store = store(api.clone(), Arc::new(ScriptedConfirmer::new()));
        store.load().await.unwrap();

        let view = store.cancel().await.unwrap();
        assert!(view.subscription.cancel_at_period_end);
        // One load + one post-cancel refresh.
        assert_eq!(api.fetch_subscription_calls(), 2);
    }

    #[tokio::test]
    async fn test_reactivate_refreshes_from_backend_truth() {
        let api = Arc::new(MockBillingApi::new());
        let mut sub = active_subscription(api.account_id(), "plan_basic");
        sub.cancel_at_period_end = true;
        api.set_subscription(sub);
        let store = store(api.clone(), Arc::new(ScriptedConfirmer::new()));
        store.load().await.unwrap();

        let view = store.reactivate().await.unwrap();
        assert!(!view.subscription.cancel_at_period_end);
        assert_eq!(api.fetch_subscription_calls(), 2);
    }

    #[tokio::test]
    async fn test_failed_confirmation_still_refreshes() {
        let api = Arc::new(MockBillingApi::new());
        api.set_subscription(active_subscription(api.account_id(), "plan_basic"));
        api.script_upgrade(plan_change_response(
            "sub_1",
            true,
            Some("pi_1_secret_x"),
            1299,
        ));
        let confirmer = Arc::new(ScriptedConfirmer::new());
        confirmer.script_confirm(ConfirmOutcome::Failed {
            code: Some("card_declined".into()),
            message: "declined".into(),
        });
        let store = store(api.clone(), confirmer);
        store.load().await.unwrap();
        let loads_before = api.fetch_subscription_calls();

        let intent = store.change_plan("plan_pro", Some("pm_1"), None).await.unwrap();
        let intent = store.confirm_payment(intent, Some("pm_1"), None).await.unwrap();

        assert_eq!(intent.status, IntentStatus::Failed);
        // change_plan and confirm_payment each refresh, success or not.
        assert_eq!(api.fetch_subscription_calls(), loads_before + 2);
    }

    #[tokio::test]
    async fn test_preview_relays_backend_calculation() {
        let api = Arc::new(MockBillingApi::new());
        api.script_preview(PlanChangePreview {
            plan_id: "plan_pro".into(),
            prorated_amount_cents: 850,
            currency: "usd".into(),
            effective_at: chrono::Utc::now(),
        });
        let store = store(api.clone(), Arc::new(ScriptedConfirmer::new()));
        let loads_before = api.fetch_subscription_calls();

        let preview = store.preview_change("plan_pro").await.unwrap();
        assert_eq!(preview.prorated_amount_cents, 850);
        // Previews are reads; they never trigger a refresh.
        assert_eq!(api.fetch_subscription_calls(), loads_before);
    }

    #[tokio::test]
    async fn test_downgrade_picked_for_cheaper_plan() {
        let api = Arc::new(MockBillingApi::new());
        api.set_subscription(active_subscription(api.account_id(), "plan_pro"));
        api.set_plans(vec![plan("plan_basic", 499), plan("plan_pro", 1299)]);
        api.script_downgrade(plan_change_response("sub_1", false, None, 499));
        let store = store(api.clone(), Arc::new(ScriptedConfirmer::new()));
        store.load().await.unwrap();

        let intent = store.change_plan("plan_basic", None, None).await.unwrap();
        assert_eq!(intent.status, IntentStatus::Succeeded);
        assert_eq!(api.downgrade_calls(), 1);
        assert_eq!(api.upgrade_calls(), 0);
    }

    #[tokio::test]
    async fn test_full_upgrade_flow_settles_and_refreshes() {
        let api = Arc::new(MockBillingApi::new());
        api.set_subscription(active_subscription(api.account_id(), "plan_basic"));
        api.set_plans(vec![plan("plan_basic", 499), plan("plan_pro", 1299)]);
        api.script_upgrade(plan_change_response(
            "sub_1",
            true,
            Some("pi_1_secret_x"),
            1299,
        ));
        let confirmer = Arc::new(ScriptedConfirmer::new());
        confirmer.script_confirm(ConfirmOutcome::Succeeded(PaymentIntentInfo {
            id: "pi_1".into(),
            status: PaymentIntentStatus::Succeeded,
            client_secret: Some("pi_1_secret_x".into()),
        }));
        let store = store(api.clone(), confirmer);
        store.load().await.unwrap();

        let intent = store.change_plan("plan_pro", Some("pm_1"), None).await.unwrap();
        assert_eq!(intent.status, IntentStatus::RequiresAction);

        let intent = store.confirm_payment(intent, Some("pm_1"), None).await.unwrap();
        assert_eq!(intent.status, IntentStatus::Succeeded);
        assert_eq!(api.finalize_calls(), 1);
        assert!(store.current().await.is_some());
    }
}
