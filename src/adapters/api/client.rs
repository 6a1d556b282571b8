//! Reqwest adapter for the Monetra backend's subscription endpoints.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use url::Url;
use uuid::Uuid;

use crate::{
    app_error::{AppError, AppResult},
    application::ports::billing_api::{
        BillingApi, PlanChangePreview, PlanChangeRequest, PlanChangeResponse, SubscriptionResponse,
    },
    domain::entities::{
        payment_method::PaymentMethodRef, subscription_plan::SubscriptionPlan,
        user_subscription::UserSubscription,
    },
    infra::{http_client, session::SessionContext},
};

/// Error body the backend returns for non-2xx responses.
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    code: String,
    message: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AccountBody {
    account_id: Uuid,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PreviewBody<'a> {
    account_id: Uuid,
    plan_id: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FinalizeBody<'a> {
    payment_intent_id: &'a str,
    subscription_id: &'a str,
}

/// `BillingApi` over HTTP, authenticated with the session's bearer token.
#[derive(Clone)]
pub struct HttpBillingApi {
    client: Client,
    base: Url,
    session: SessionContext,
}

impl HttpBillingApi {
    pub fn new(base: Url, session: SessionContext) -> Self {
        Self {
            client: http_client::build_client(),
            base,
            session,
        }
    }

    /// Construct with a caller-supplied client (custom timeouts, proxies).
    pub fn with_client(client: Client, base: Url, session: SessionContext) -> Self {
        Self {
            client,
            base,
            session,
        }
    }

    async fn post<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> AppResult<T> {
        let url = self
            .base
            .join(path)
            .map_err(|e| AppError::Config(format!("Invalid API path {path}: {e}")))?;

        let response = self
            .client
            .post(url)
            .bearer_auth(self.session.bearer_token())
            .json(body)
            .send()
            .await?;

        handle_response(response).await
    }
}

async fn handle_response<T: DeserializeOwned>(response: reqwest::Response) -> AppResult<T> {
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        tracing::error!(status = %status, body = %body, "Backend API error");

        if let Ok(error) = serde_json::from_str::<ApiErrorBody>(&body) {
            return Err(AppError::Api {
                status: status.as_u16(),
                code: error.code,
                message: error.message,
            });
        }

        return Err(AppError::Internal(format!(
            "Backend API error: {} - {}",
            status, body
        )));
    }

    serde_json::from_str(&body).map_err(|e| {
        tracing::error!(body = %body, error = %e, "Failed to parse backend response");
        AppError::Internal(format!("Failed to parse backend response: {}", e))
    })
}

#[async_trait]
impl BillingApi for HttpBillingApi {
    async fn upgrade(&self, req: &PlanChangeRequest) -> AppResult<PlanChangeResponse> {
        self.post("api/user/subscriptions/upgrade", req).await
    }

    async fn downgrade(&self, req: &PlanChangeRequest) -> AppResult<PlanChangeResponse> {
        self.post("api/user/subscriptions/downgrade", req).await
    }

    async fn preview_plan_change(
        &self,
        account_id: Uuid,
        plan_id: &str,
    ) -> AppResult<PlanChangePreview> {
        let body = PreviewBody {
            account_id,
            plan_id,
        };
        self.post("api/user/subscriptions/preview", &body).await
    }

    async fn finalize_payment(
        &self,
        payment_intent_id: &str,
        subscription_id: &str,
    ) -> AppResult<SubscriptionResponse> {
        let body = FinalizeBody {
            payment_intent_id,
            subscription_id,
        };
        self.post("api/user/subscriptions/confirm-payment", &body)
            .await
    }

    async fn fetch_subscription(&self, account_id: Uuid) -> AppResult<Option<UserSubscription>> {
        let body = AccountBody { account_id };
        match self
            .post::<_, UserSubscription>("api/user/subscriptions/fetch", &body)
            .await
        {
            Ok(sub) => Ok(Some(sub)),
            // No subscription record yet is a normal state for free accounts.
            Err(AppError::Api { status: 404, .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn cancel(&self, account_id: Uuid) -> AppResult<SubscriptionResponse> {
        let body = AccountBody { account_id };
        self.post("api/user/subscriptions/cancel", &body).await
    }

    async fn reactivate(&self, account_id: Uuid) -> AppResult<SubscriptionResponse> {
        let body = AccountBody { account_id };
        self.post("api/user/subscriptions/reactivate", &body).await
    }

    async fn fetch_payment_methods(&self, account_id: Uuid) -> AppResult<Vec<PaymentMethodRef>> {
        let body = AccountBody { account_id };
        self.post("api/user/payment-methods/fetch", &body).await
    }

    async fn fetch_plans(&self) -> AppResult<Vec<SubscriptionPlan>> {
        self.post("api/plans/fetch", &serde_json::json!({})).await
    }
}
