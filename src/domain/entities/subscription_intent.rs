use serde::{Deserialize, Serialize};

use super::decline_code::DeclineCode;

/// State of an in-flight plan change.
///
/// Transitions are owned by the orchestrator:
/// `Pending -> Succeeded` (no confirmation needed),
/// `Pending -> RequiresAction -> Succeeded | Failed` (3-D Secure path).
/// `Succeeded` and `Failed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentStatus {
    Pending,
    RequiresAction,
    Succeeded,
    Failed,
}

impl IntentStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, IntentStatus::Succeeded | IntentStatus::Failed)
    }
}

/// What went wrong with a payment, mapped to a user-visible message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentFailure {
    /// Raw provider code, if any (e.g. "card_declined").
    pub code: Option<String>,
    /// User-visible message: fixed string for known codes, provider's raw
    /// message otherwise.
    pub message: String,
}

impl PaymentFailure {
    pub fn from_provider(code: Option<String>, raw_message: &str) -> Self {
        let message = DeclineCode::message_for(code.as_deref(), raw_message);
        Self { code, message }
    }
}

/// An in-flight plan change, from user selection to terminal state.
///
/// Not persisted: once the backend's authoritative subscription record is
/// re-fetched, the intent is discarded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscriptionIntent {
    pub subscription_id: String,
    pub status: IntentStatus,
    pub client_secret: Option<String>,
    pub payment_intent_id: Option<String>,
    pub plan_id: String,
    pub amount_cents: i64,
    pub currency: String,
    pub failure: Option<PaymentFailure>,
}

impl SubscriptionIntent {
    pub fn requires_action(&self) -> bool {
        self.status == IntentStatus::RequiresAction
    }

    pub fn is_settled(&self) -> bool {
        self.status.is_terminal()
    }

    pub(crate) fn succeeded(mut self) -> Self {
        self.status = IntentStatus::Succeeded;
        self.failure = None;
        self
    }

    pub(crate) fn failed(mut self, failure: PaymentFailure) -> Self {
        self.status = IntentStatus::Failed;
        self.failure = Some(failure);
        self
    }
}
