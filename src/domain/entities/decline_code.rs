use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

/// Known card decline / payment error codes reported by the payment provider.
///
/// These are the codes the UI maps to fixed human-readable strings. Anything
/// outside this set is surfaced with the provider's raw message instead.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, AsRefStr, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum DeclineCode {
    CardDeclined,
    ExpiredCard,
    InsufficientFunds,
    IncorrectCvc,
    ProcessingError,
}

impl DeclineCode {
    /// Fixed user-visible message for this code.
    pub fn user_message(&self) -> &'static str {
        match self {
            DeclineCode::CardDeclined => "Your card was declined.",
            DeclineCode::ExpiredCard => "Your card has expired.",
            DeclineCode::InsufficientFunds => "Your card has insufficient funds.",
            DeclineCode::IncorrectCvc => "Your card's security code is incorrect.",
            DeclineCode::ProcessingError => {
                "An error occurred while processing your card. Try again in a little while."
            }
        }
    }

    /// Map a raw provider code to a user-visible message, falling back to the
    /// provider's own message for codes we don't recognize.
    pub fn message_for(code: Option<&str>, raw_message: &str) -> String {
        code.and_then(|c| c.parse::<DeclineCode>().ok())
            .map(|c| c.user_message().to_string())
            .unwrap_or_else(|| raw_message.to_string())
    }

    /// All known decline codes.
    pub fn all() -> &'static [DeclineCode] {
        &[
            DeclineCode::CardDeclined,
            DeclineCode::ExpiredCard,
            DeclineCode::InsufficientFunds,
            DeclineCode::IncorrectCvc,
            DeclineCode::ProcessingError,
        ]
    }
}
