pub mod dummy_confirmer;
pub mod stripe_confirmer;

pub use dummy_confirmer::DummyConfirmer;
pub use stripe_confirmer::StripeConfirmer;
