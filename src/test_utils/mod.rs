pub mod billing_mocks;
pub mod factories;

pub use billing_mocks::{MockBillingApi, ScriptedConfirmer};
pub use factories::{active_subscription, payment_method, plan, plan_change_response};
