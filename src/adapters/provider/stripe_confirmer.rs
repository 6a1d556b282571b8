//! Client-side Stripe confirmation with a publishable key.
//!
//! This is the key-scoped subset of the payment intents API that Stripe.js
//! uses in the browser: a publishable key plus the intent's client secret is
//! enough to confirm or retrieve that one intent, and nothing else.

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use crate::{
    app_error::{AppError, AppResult},
    application::ports::payment_confirmer::{
        ConfirmOutcome, PaymentConfirmer, PaymentIntentInfo, PaymentIntentStatus,
    },
    infra::http_client,
};

const STRIPE_API_BASE: &str = "https://api.stripe.com/v1";

#[derive(Debug, Deserialize)]
struct StripePaymentIntent {
    id: String,
    status: String,
    client_secret: Option<String>,
    last_payment_error: Option<StripePaymentError>,
}

#[derive(Debug, Deserialize)]
struct StripePaymentError {
    code: Option<String>,
    decline_code: Option<String>,
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StripeErrorResponse {
    error: StripeErrorDetail,
}

#[derive(Debug, Deserialize)]
struct StripeErrorDetail {
    #[serde(rename = "type")]
    error_type: String,
    code: Option<String>,
    decline_code: Option<String>,
    message: Option<String>,
}

#[derive(Clone)]
pub struct StripeConfirmer {
    client: Client,
    publishable_key: SecretString,
}

impl StripeConfirmer {
    pub fn new(publishable_key: SecretString) -> Self {
        Self {
            client: http_client::build_client(),
            publishable_key,
        }
    }

    fn key(&self) -> &str {
        self.publishable_key.expose_secret()
    }
}

/// Client secrets are formatted `pi_xxx_secret_yyy`; the intent id is the
/// part before `_secret`.
fn intent_id_from_secret(client_secret: &str) -> AppResult<&str> {
    client_secret
        .split_once("_secret")
        .map(|(id, _)| id)
        .filter(|id| !id.is_empty())
        .ok_or_else(|| AppError::InvalidInput("Malformed payment intent client secret".into()))
}

fn info_from_intent(pi: StripePaymentIntent) -> PaymentIntentInfo {
    PaymentIntentInfo {
        id: pi.id,
        status: PaymentIntentStatus::from_str(&pi.status),
        client_secret: pi.client_secret,
    }
}

fn outcome_from_intent(pi: StripePaymentIntent) -> ConfirmOutcome {
    match PaymentIntentStatus::from_str(&pi.status) {
        PaymentIntentStatus::Succeeded => ConfirmOutcome::Succeeded(info_from_intent(pi)),
        PaymentIntentStatus::RequiresAction | PaymentIntentStatus::RequiresConfirmation => {
            ConfirmOutcome::RequiresAction(info_from_intent(pi))
        }
        _ => {
            let (code, message) = match pi.last_payment_error {
                Some(err) => (
                    err.decline_code.or(err.code),
                    err.message
                        .unwrap_or_else(|| "Your payment could not be completed.".to_string()),
                ),
                None => (None, "Your payment could not be completed.".to_string()),
            };
            ConfirmOutcome::Failed { code, message }
        }
    }
}

/// Map a non-2xx Stripe body to an outcome or error.
///
/// Card errors and the already-confirmed state are expected flow outcomes,
/// not transport failures; everything else bubbles up as an error.
fn outcome_from_error_body(status: u16, body: &str) -> AppResult<ConfirmOutcome> {
    let Ok(parsed) = serde_json::from_str::<StripeErrorResponse>(body) else {
        return Err(AppError::Internal(format!(
            "Stripe API error: {} - {}",
            status, body
        )));
    };
    let err = parsed.error;
    let message = err
        .message
        .unwrap_or_else(|| "Your payment could not be completed.".to_string());

    match err.error_type.as_str() {
        "card_error" => Ok(ConfirmOutcome::Failed {
            code: err.decline_code.or(err.code),
            message,
        }),
        // Confirming an intent that already reached a terminal state.
        _ if err.code.as_deref() == Some("payment_intent_unexpected_state") => {
            Ok(ConfirmOutcome::Failed {
                code: err.code,
                message,
            })
        }
        _ => Err(AppError::Internal(format!("Stripe error: {}", message))),
    }
}

#[async_trait]
impl PaymentConfirmer for StripeConfirmer {
    async fn confirm_card_payment(
        &self,
        client_secret: &str,
        payment_method: Option<&str>,
        return_url: Option<&str>,
    ) -> AppResult<ConfirmOutcome> {
        let intent_id = intent_id_from_secret(client_secret)?;

        let mut params: Vec<(&str, String)> = vec![
            ("client_secret", client_secret.to_string()),
            ("key", self.key().to_string()),
        ];
        if let Some(pm) = payment_method {
            params.push(("payment_method", pm.to_string()));
        }
        if let Some(url) = return_url {
            params.push(("return_url", url.to_string()));
        }

        let response = self
            .client
            .post(format!(
                "{}/payment_intents/{}/confirm",
                STRIPE_API_BASE, intent_id
            ))
            .form(&params)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            tracing::debug!(status = %status, intent_id, "Stripe confirm rejected");
            return outcome_from_error_body(status.as_u16(), &body);
        }

        let pi: StripePaymentIntent = serde_json::from_str(&body).map_err(|e| {
            tracing::error!(error = %e, "Failed to parse Stripe payment intent");
            AppError::Internal(format!("Failed to parse Stripe response: {}", e))
        })?;
        Ok(outcome_from_intent(pi))
    }

    async fn retrieve_payment_intent(&self, client_secret: &str) -> AppResult<PaymentIntentInfo> {
        let intent_id = intent_id_from_secret(client_secret)?;

        let response = self
            .client
            .get(format!("{}/payment_intents/{}", STRIPE_API_BASE, intent_id))
            .query(&[("client_secret", client_secret), ("key", self.key())])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            tracing::error!(status = %status, body = %body, "Stripe retrieve failed");
            return Err(AppError::Internal(format!(
                "Stripe API error: {} - {}",
                status, body
            )));
        }

        let pi: StripePaymentIntent = serde_json::from_str(&body).map_err(|e| {
            AppError::Internal(format!("Failed to parse Stripe response: {}", e))
        })?;
        Ok(info_from_intent(pi))
    }
}
