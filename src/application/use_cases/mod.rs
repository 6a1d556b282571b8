pub mod plan_change;
pub mod subscription_store;
