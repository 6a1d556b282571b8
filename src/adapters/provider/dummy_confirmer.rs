//! Simulated payment confirmer for local development and tests.
//!
//! No external calls: outcomes are driven by a configured `PaymentScenario`,
//! and per-secret state is tracked so repeated confirmations behave like the
//! real provider (a second confirm of a settled intent reports the
//! already-confirmed error).

use std::{collections::HashMap, sync::Mutex};

use async_trait::async_trait;

use crate::{
    app_error::AppResult,
    application::ports::payment_confirmer::{
        ALREADY_CONFIRMED_CODE, ConfirmOutcome, PaymentConfirmer, PaymentIntentInfo,
        PaymentIntentStatus,
    },
    domain::entities::payment_scenario::PaymentScenario,
};

pub struct DummyConfirmer {
    scenario: PaymentScenario,
    intents: Mutex<HashMap<String, PaymentIntentStatus>>,
}

impl DummyConfirmer {
    pub fn new(scenario: PaymentScenario) -> Self {
        Self {
            scenario,
            intents: Mutex::new(HashMap::new()),
        }
    }

    /// Mark a pending 3-D Secure challenge as passed, as if the user
    /// completed it in the provider's popup.
    pub fn complete_challenge(&self, client_secret: &str) {
        self.intents
            .lock()
            .unwrap()
            .insert(client_secret.to_string(), PaymentIntentStatus::Succeeded);
    }

    /// Mark a pending 3-D Secure challenge as abandoned.
    pub fn abandon_challenge(&self, client_secret: &str) {
        self.intents
            .lock()
            .unwrap()
            .insert(client_secret.to_string(), PaymentIntentStatus::Canceled);
    }

    fn intent_id(client_secret: &str) -> String {
        client_secret
            .split_once("_secret")
            .map(|(id, _)| id.to_string())
            .unwrap_or_else(|| format!("dummy_pi_{client_secret}"))
    }

    fn info(client_secret: &str, status: PaymentIntentStatus) -> PaymentIntentInfo {
        PaymentIntentInfo {
            id: Self::intent_id(client_secret),
            status,
            client_secret: Some(client_secret.to_string()),
        }
    }
}

#[async_trait]
impl PaymentConfirmer for DummyConfirmer {
    async fn confirm_card_payment(
        &self,
        client_secret: &str,
        _payment_method: Option<&str>,
        _return_url: Option<&str>,
    ) -> AppResult<ConfirmOutcome> {
        let mut intents = self.intents.lock().unwrap();

        if let Some(status) = intents.get(client_secret)
            && matches!(
                status,
                PaymentIntentStatus::Succeeded | PaymentIntentStatus::Canceled
            )
        {
            return Ok(ConfirmOutcome::Failed {
                code: Some(ALREADY_CONFIRMED_CODE.to_string()),
                message: format!(
                    "You cannot confirm this PaymentIntent because it is already in the {:?} state.",
                    status
                ),
            });
        }

        tracing::debug!(
            scenario = %self.scenario,
            "Dummy: confirming card payment"
        );

        if let Some(code) = self.scenario.decline_code() {
            intents.insert(client_secret.to_string(), PaymentIntentStatus::RequiresPaymentMethod);
            return Ok(ConfirmOutcome::Failed {
                code: Some(code.as_ref().to_string()),
                message: code.user_message().to_string(),
            });
        }

        if self.scenario.requires_action() {
            intents.insert(client_secret.to_string(), PaymentIntentStatus::RequiresAction);
            return Ok(ConfirmOutcome::RequiresAction(Self::info(
                client_secret,
                PaymentIntentStatus::RequiresAction,
            )));
        }

        intents.insert(client_secret.to_string(), PaymentIntentStatus::Succeeded);
        Ok(ConfirmOutcome::Succeeded(Self::info(
            client_secret,
            PaymentIntentStatus::Succeeded,
        )))
    }

    async fn retrieve_payment_intent(&self, client_secret: &str) -> AppResult<PaymentIntentInfo> {
        let status = self
            .intents
            .lock()
            .unwrap()
            .get(client_secret)
            .copied()
            .unwrap_or(PaymentIntentStatus::RequiresConfirmation);
        Ok(Self::info(client_secret, status))
    }
}
