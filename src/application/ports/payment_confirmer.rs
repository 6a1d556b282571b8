use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::app_error::AppResult;

/// Provider code reported when an intent that is already in a terminal state
/// is confirmed again (e.g. a double-clicked pay button).
pub const ALREADY_CONFIRMED_CODE: &str = "payment_intent_unexpected_state";

/// Provider-side status of a payment intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentIntentStatus {
    RequiresPaymentMethod,
    RequiresConfirmation,
    RequiresAction,
    Processing,
    Succeeded,
    Canceled,
}

impl PaymentIntentStatus {
    pub fn from_str(s: &str) -> Self {
        match s {
            "requires_payment_method" => PaymentIntentStatus::RequiresPaymentMethod,
            "requires_confirmation" => PaymentIntentStatus::RequiresConfirmation,
            "requires_action" => PaymentIntentStatus::RequiresAction,
            "processing" => PaymentIntentStatus::Processing,
            "succeeded" => PaymentIntentStatus::Succeeded,
            _ => PaymentIntentStatus::Canceled,
        }
    }
}

/// Snapshot of a provider-side payment intent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentIntentInfo {
    pub id: String,
    pub status: PaymentIntentStatus,
    pub client_secret: Option<String>,
}

/// Outcome of a client-side confirmation attempt.
///
/// `Failed` is terminal from the provider's point of view; the orchestrator
/// still inspects the code for the already-confirmed idempotency race.
#[derive(Debug, Clone)]
pub enum ConfirmOutcome {
    Succeeded(PaymentIntentInfo),
    /// Additional authentication required; the caller must redirect the user
    /// and resume via the return URL.
    RequiresAction(PaymentIntentInfo),
    Failed {
        code: Option<String>,
        message: String,
    },
}

/// Client-side payment confirmation, 3-D Secure capable.
///
/// Implementations: `StripeConfirmer` (publishable key + client secret against
/// the provider's REST API) and `DummyConfirmer` (local simulation).
#[async_trait]
pub trait PaymentConfirmer: Send + Sync {
    /// Confirm a card payment with the intent's client secret.
    async fn confirm_card_payment(
        &self,
        client_secret: &str,
        payment_method: Option<&str>,
        return_url: Option<&str>,
    ) -> AppResult<ConfirmOutcome>;

    /// Retrieve the current state of a payment intent by its client secret.
    async fn retrieve_payment_intent(&self, client_secret: &str) -> AppResult<PaymentIntentInfo>;
}
