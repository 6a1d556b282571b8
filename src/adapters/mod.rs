pub mod api;
pub mod provider;
