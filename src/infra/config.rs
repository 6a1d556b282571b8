use env_helpers::{get_env, get_env_default};
use secrecy::SecretString;
use url::Url;

/// Runtime configuration for the billing client, read from the environment.
pub struct AppConfig {
    /// Base URL of the Monetra backend, e.g. "https://api.monetra.app".
    pub api_base: Url,
    /// Provider publishable key. Safe to embed client-side, but still kept out
    /// of logs.
    pub publishable_key: SecretString,
    /// Where the provider redirects after a 3-D Secure challenge.
    pub return_url: Option<Url>,
    /// Use the simulated payment confirmer instead of the real provider.
    pub use_dummy_payments: bool,
}

impl AppConfig {
    pub fn from_env() -> Self {
        // Load .env in development; a missing file is fine.
        dotenvy::dotenv().ok();

        let api_base: Url = get_env("MONETRA_API_BASE");
        let publishable_key: SecretString =
            SecretString::new(get_env::<String>("STRIPE_PUBLISHABLE_KEY").into());
        let return_url: Option<Url> = std::env::var("PAYMENT_RETURN_URL")
            .ok()
            .and_then(|s| s.parse().ok());
        let use_dummy_payments: bool = get_env_default("USE_DUMMY_PAYMENTS", false);

        Self {
            api_base,
            publishable_key,
            return_url,
            use_dummy_payments,
        }
    }
}
