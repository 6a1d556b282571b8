pub mod billing_api;
pub mod payment_confirmer;
