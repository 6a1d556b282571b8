use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

use super::decline_code::DeclineCode;

/// Payment scenario for the dummy confirmer.
/// Simulates different confirmation outcomes for local development and tests.
/// Matches a subset of Stripe's test card behaviors.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, AsRefStr, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[derive(Default)]
pub enum PaymentScenario {
    /// Confirmation succeeds immediately (Stripe test card: 4242424242424242)
    #[default]
    Success,
    /// Card is declined (Stripe test card: 4000000000000002)
    Decline,
    /// Insufficient funds (Stripe test card: 4000000000009995)
    InsufficientFunds,
    /// Requires 3-D Secure authentication (Stripe test card: 4000000000003220)
    ThreeDSecure,
    /// Card is expired (Stripe test card: 4000000000000069)
    ExpiredCard,
    /// Incorrect CVC (Stripe test card: 4000000000000127)
    IncorrectCvc,
    /// Processing error (Stripe test card: 4000000000000119)
    ProcessingError,
}

impl PaymentScenario {
    /// The decline code this scenario reports, if it fails.
    pub fn decline_code(&self) -> Option<DeclineCode> {
        match self {
            PaymentScenario::Success | PaymentScenario::ThreeDSecure => None,
            PaymentScenario::Decline => Some(DeclineCode::CardDeclined),
            PaymentScenario::InsufficientFunds => Some(DeclineCode::InsufficientFunds),
            PaymentScenario::ExpiredCard => Some(DeclineCode::ExpiredCard),
            PaymentScenario::IncorrectCvc => Some(DeclineCode::IncorrectCvc),
            PaymentScenario::ProcessingError => Some(DeclineCode::ProcessingError),
        }
    }

    /// Whether this scenario requires a 3-D Secure challenge before succeeding.
    pub fn requires_action(&self) -> bool {
        matches!(self, PaymentScenario::ThreeDSecure)
    }

    pub fn is_failure(&self) -> bool {
        self.decline_code().is_some()
    }

    /// All available scenarios.
    pub fn all() -> &'static [PaymentScenario] {
        &[
            PaymentScenario::Success,
            PaymentScenario::Decline,
            PaymentScenario::InsufficientFunds,
            PaymentScenario::ThreeDSecure,
            PaymentScenario::ExpiredCard,
            PaymentScenario::IncorrectCvc,
            PaymentScenario::ProcessingError,
        ]
    }
}
