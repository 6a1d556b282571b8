//! In-memory doubles for the billing ports.
//!
//! `MockBillingApi` keeps backend state behind mutexes so tests can observe
//! exactly which endpoints a flow touched; `ScriptedConfirmer` replays a queue
//! of provider outcomes.

use std::{
    collections::VecDeque,
    sync::{
        Mutex,
        atomic::{AtomicUsize, Ordering},
    },
};

use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    app_error::{AppError, AppResult},
    application::ports::{
        billing_api::{
            BillingApi, PlanChangePreview, PlanChangeRequest, PlanChangeResponse,
            SubscriptionResponse,
        },
        payment_confirmer::{ConfirmOutcome, PaymentConfirmer, PaymentIntentInfo},
    },
    domain::entities::{
        payment_method::PaymentMethodRef,
        subscription_plan::SubscriptionPlan,
        user_subscription::{SubscriptionStatus, UserSubscription},
    },
};

// ============================================================================
// MockBillingApi
// ============================================================================

#[derive(Default)]
pub struct MockBillingApi {
    account_id: Uuid,
    subscription: Mutex<Option<UserSubscription>>,
    payment_methods: Mutex<Vec<PaymentMethodRef>>,
    plans: Mutex<Vec<SubscriptionPlan>>,
    upgrade_responses: Mutex<VecDeque<PlanChangeResponse>>,
    downgrade_responses: Mutex<VecDeque<PlanChangeResponse>>,
    previews: Mutex<VecDeque<PlanChangePreview>>,
    payment_methods_fail: Mutex<bool>,
    upgrade_count: AtomicUsize,
    downgrade_count: AtomicUsize,
    finalize_count: AtomicUsize,
    fetch_subscription_count: AtomicUsize,
}

impl MockBillingApi {
    pub fn new() -> Self {
        Self {
            account_id: Uuid::new_v4(),
            ..Default::default()
        }
    }

    pub fn account_id(&self) -> Uuid {
        self.account_id
    }

    pub fn set_subscription(&self, sub: UserSubscription) {
        *self.subscription.lock().unwrap() = Some(sub);
    }

    pub fn set_payment_methods(&self, pms: Vec<PaymentMethodRef>) {
        *self.payment_methods.lock().unwrap() = pms;
    }

    pub fn set_plans(&self, plans: Vec<SubscriptionPlan>) {
        *self.plans.lock().unwrap() = plans;
    }

    /// Make every `fetch_payment_methods` call fail.
    pub fn fail_payment_methods(&self) {
        *self.payment_methods_fail.lock().unwrap() = true;
    }

    /// Queue a response for the next `upgrade` call.
    pub fn script_upgrade(&self, resp: PlanChangeResponse) {
        self.upgrade_responses.lock().unwrap().push_back(resp);
    }

    /// Queue a response for the next `downgrade` call.
    pub fn script_downgrade(&self, resp: PlanChangeResponse) {
        self.downgrade_responses.lock().unwrap().push_back(resp);
    }

    /// Queue a response for the next `preview_plan_change` call.
    pub fn script_preview(&self, preview: PlanChangePreview) {
        self.previews.lock().unwrap().push_back(preview);
    }

    pub fn upgrade_calls(&self) -> usize {
        self.upgrade_count.load(Ordering::SeqCst)
    }

    pub fn downgrade_calls(&self) -> usize {
        self.downgrade_count.load(Ordering::SeqCst)
    }

    pub fn finalize_calls(&self) -> usize {
        self.finalize_count.load(Ordering::SeqCst)
    }

    pub fn fetch_subscription_calls(&self) -> usize {
        self.fetch_subscription_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BillingApi for MockBillingApi {
    async fn upgrade(&self, _req: &PlanChangeRequest) -> AppResult<PlanChangeResponse> {
        self.upgrade_count.fetch_add(1, Ordering::SeqCst);
        self.upgrade_responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| AppError::Internal("no scripted upgrade response".into()))
    }

    async fn downgrade(&self, _req: &PlanChangeRequest) -> AppResult<PlanChangeResponse> {
        self.downgrade_count.fetch_add(1, Ordering::SeqCst);
        self.downgrade_responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| AppError::Internal("no scripted downgrade response".into()))
    }

    async fn preview_plan_change(
        &self,
        _account_id: Uuid,
        _plan_id: &str,
    ) -> AppResult<PlanChangePreview> {
        self.previews
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| AppError::Internal("no scripted preview".into()))
    }

    async fn finalize_payment(
        &self,
        _payment_intent_id: &str,
        subscription_id: &str,
    ) -> AppResult<SubscriptionResponse> {
        self.finalize_count.fetch_add(1, Ordering::SeqCst);
        Ok(SubscriptionResponse {
            subscription_id: subscription_id.to_string(),
            status: SubscriptionStatus::Active,
        })
    }

    async fn fetch_subscription(&self, _account_id: Uuid) -> AppResult<Option<UserSubscription>> {
        self.fetch_subscription_count.fetch_add(1, Ordering::SeqCst);
        Ok(self.subscription.lock().unwrap().clone())
    }

    async fn cancel(&self, _account_id: Uuid) -> AppResult<SubscriptionResponse> {
        let mut sub = self.subscription.lock().unwrap();
        let sub = sub
            .as_mut()
            .ok_or(AppError::NotFound)?;
        sub.cancel_at_period_end = true;
        Ok(SubscriptionResponse {
            subscription_id: sub.id.clone(),
            status: sub.status,
        })
    }

    async fn reactivate(&self, _account_id: Uuid) -> AppResult<SubscriptionResponse> {
        let mut sub = self.subscription.lock().unwrap();
        let sub = sub
            .as_mut()
            .ok_or(AppError::NotFound)?;
        sub.cancel_at_period_end = false;
        sub.canceled_at = None;
        Ok(SubscriptionResponse {
            subscription_id: sub.id.clone(),
            status: sub.status,
        })
    }

    async fn fetch_payment_methods(&self, _account_id: Uuid) -> AppResult<Vec<PaymentMethodRef>> {
        if *self.payment_methods_fail.lock().unwrap() {
            return Err(AppError::Internal("payment method fetch unavailable".into()));
        }
        Ok(self.payment_methods.lock().unwrap().clone())
    }

    async fn fetch_plans(&self) -> AppResult<Vec<SubscriptionPlan>> {
        Ok(self.plans.lock().unwrap().clone())
    }
}

// ============================================================================
// ScriptedConfirmer
// ============================================================================

/// Payment confirmer that replays queued outcomes in order.
#[derive(Default)]
pub struct ScriptedConfirmer {
    confirm_outcomes: Mutex<VecDeque<ConfirmOutcome>>,
    retrieve_results: Mutex<VecDeque<PaymentIntentInfo>>,
    confirm_count: AtomicUsize,
    retrieve_count: AtomicUsize,
}

impl ScriptedConfirmer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn script_confirm(&self, outcome: ConfirmOutcome) {
        self.confirm_outcomes.lock().unwrap().push_back(outcome);
    }

    pub fn script_retrieve(&self, info: PaymentIntentInfo) {
        self.retrieve_results.lock().unwrap().push_back(info);
    }

    pub fn confirm_calls(&self) -> usize {
        self.confirm_count.load(Ordering::SeqCst)
    }

    pub fn retrieve_calls(&self) -> usize {
        self.retrieve_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PaymentConfirmer for ScriptedConfirmer {
    async fn confirm_card_payment(
        &self,
        _client_secret: &str,
        _payment_method: Option<&str>,
        _return_url: Option<&str>,
    ) -> AppResult<ConfirmOutcome> {
        self.confirm_count.fetch_add(1, Ordering::SeqCst);
        self.confirm_outcomes
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| AppError::Internal("no scripted confirm outcome".into()))
    }

    async fn retrieve_payment_intent(&self, client_secret: &str) -> AppResult<PaymentIntentInfo> {
        self.retrieve_count.fetch_add(1, Ordering::SeqCst);
        self.retrieve_results
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| {
                AppError::Internal(format!("no scripted intent for secret {client_secret}"))
            })
    }
}
