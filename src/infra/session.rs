use secrecy::{ExposeSecret, SecretString};
use uuid::Uuid;

use crate::app_error::{AppError, AppResult};

/// Authenticated session handed explicitly to the adapters that need it.
///
/// There is no ambient global session: every `HttpBillingApi` holds the
/// context it was constructed with, and a signed-out user simply has no
/// adapter. This keeps "who is this request for" visible at every call site.
#[derive(Clone)]
pub struct SessionContext {
    account_id: Uuid,
    access_token: SecretString,
}

impl SessionContext {
    pub fn new(account_id: Uuid, access_token: SecretString) -> AppResult<Self> {
        if access_token.expose_secret().is_empty() {
            return Err(AppError::Config("access token must not be empty".into()));
        }
        Ok(Self {
            account_id,
            access_token,
        })
    }

    pub fn account_id(&self) -> Uuid {
        self.account_id
    }

    pub(crate) fn bearer_token(&self) -> &str {
        self.access_token.expose_secret()
    }
}

impl std::fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionContext")
            .field("account_id", &self.account_id)
            .field("access_token", &"[REDACTED]")
            .finish()
    }
}
