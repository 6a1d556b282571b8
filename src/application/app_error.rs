use thiserror::Error;

use crate::domain::entities::decline_code::DeclineCode;

/// Closed error type for the billing client.
///
/// Two classes matter to the UI: `PaymentDeclined` (card declined, expired,
/// insufficient funds, CVC, processing) and everything else, which is internal.
/// Callers pattern-match on this enum instead of probing dynamic error shapes.
#[derive(Error, Debug)]
pub enum AppError {
    /// The provider rejected the payment with a terminal card error.
    #[error("Payment declined: {message}")]
    PaymentDeclined {
        code: Option<String>,
        message: String,
    },

    /// Structured error body returned by the Monetra backend.
    #[error("API error {status}: {message}")]
    Api {
        status: u16,
        code: String,
        message: String,
    },

    /// Transport-level failure (DNS, TLS, timeout, connection reset).
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Not found")]
    NotFound,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn payment_declined(code: Option<String>, raw_message: &str) -> Self {
        let message = DeclineCode::message_for(code.as_deref(), raw_message);
        AppError::PaymentDeclined { code, message }
    }

    /// True for the `payment_error` class; false for internal errors.
    pub fn is_payment_error(&self) -> bool {
        matches!(self, AppError::PaymentDeclined { .. })
    }

    /// Message suitable for direct display to the user.
    ///
    /// Payment errors carry their mapped message; everything else collapses to
    /// a generic string so internals never leak into the UI.
    pub fn user_message(&self) -> String {
        match self {
            AppError::PaymentDeclined { message, .. } => message.clone(),
            AppError::Api { message, .. } => message.clone(),
            _ => "Something went wrong. Please try again.".to_string(),
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;
